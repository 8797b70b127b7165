//! Bridge port (`bridge_slave`) options and statistics.

use std::io;

use super::{
    KindHandler, Operation, ParseOptions, ParseXstats, PrintHelp, PrintOptions, PrintXstats,
    XstatsFilter, next_value,
};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::table::AttrTable;
use crate::netlink::types::bridge::*;
use crate::netlink::types::stats::{IFLA_STATS_LINK_XSTATS_SLAVE, LINK_XSTATS_TYPE_BRIDGE, LINK_XSTATS_TYPE_MAX};
use crate::output::{Field, FieldSink, FieldValue};
use crate::util::names::{port_state_id, port_state_name};
use crate::util::parse::{get_u8, get_u16, get_u32, matches};

const USAGE: &str = "\
Usage: ... bridge_slave [ fdb_flush ]
                        [ state STATE ]
                        [ priority PRIO ]
                        [ cost COST ]
                        [ guard {on | off} ]
                        [ hairpin {on | off} ]
                        [ fastleave {on | off} ]
                        [ root_block {on | off} ]
                        [ learning {on | off} ]
                        [ flood {on | off} ]
                        [ proxy_arp {on | off} ]
                        [ proxy_arp_wifi {on | off} ]
                        [ mcast_router MULTICAST_ROUTER ]
                        [ mcast_fast_leave {on | off} ]
                        [ mcast_flood {on | off} ]
                        [ group_fwd_mask MASK ]
                        [ neigh_suppress {on | off} ]
                        [ vlan_tunnel {on | off} ]
";

const XSTATS_USAGE: &str = "Usage: ip link xstats type bridge_slave [ dev DEVICE ] [ stp | mcast | igmp ]\n";

/// Boolean port options and the attribute each one sets.
const ON_OFF_OPTIONS: &[(&str, u16)] = &[
    ("guard", IFLA_BRPORT_GUARD),
    ("hairpin", IFLA_BRPORT_MODE),
    ("fastleave", IFLA_BRPORT_FAST_LEAVE),
    ("root_block", IFLA_BRPORT_PROTECT),
    ("learning", IFLA_BRPORT_LEARNING),
    ("flood", IFLA_BRPORT_UNICAST_FLOOD),
    ("proxy_arp", IFLA_BRPORT_PROXYARP),
    ("proxy_arp_wifi", IFLA_BRPORT_PROXYARP_WIFI),
    ("mcast_fast_leave", IFLA_BRPORT_FAST_LEAVE),
    ("mcast_flood", IFLA_BRPORT_MCAST_FLOOD),
    ("neigh_suppress", IFLA_BRPORT_NEIGH_SUPPRESS),
    ("vlan_tunnel", IFLA_BRPORT_VLAN_TUNNEL),
];

/// Option keywords in the order abbreviations are resolved.
const KEYWORDS: &[&str] = &[
    "fdb_flush",
    "state",
    "priority",
    "cost",
    "hairpin",
    "guard",
    "root_block",
    "fastleave",
    "learning",
    "flood",
    "mcast_flood",
    "proxy_arp",
    "proxy_arp_wifi",
    "mcast_router",
    "mcast_fast_leave",
    "neigh_suppress",
    "group_fwd_mask",
    "vlan_tunnel",
    "help",
];

/// Names of well-known bits in the group forward mask.
const FWD_MASK_NAMES: [(u32, &str); 3] = [(0, "stp"), (2, "lacp"), (14, "lldp")];

/// Clock rate of the timer attributes.
const USER_HZ: u64 = 100;

/// Handler for ports enslaved to a bridge.
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeSlave;

impl KindHandler for BridgeSlave {
    fn kind(&self) -> &'static str {
        "bridge_slave"
    }

    fn max_attr(&self) -> u16 {
        IFLA_BRPORT_MAX
    }

    fn option_parser(&self) -> Option<&dyn ParseOptions> {
        Some(self)
    }

    fn option_printer(&self) -> Option<&dyn PrintOptions> {
        Some(self)
    }

    fn help(&self) -> Option<&dyn PrintHelp> {
        Some(self)
    }

    fn xstats_parser(&self) -> Option<&dyn ParseXstats> {
        Some(self)
    }

    fn xstats_printer(&self) -> Option<&dyn PrintXstats> {
        Some(self)
    }
}

fn parse_on_off(option: &str, value: &str) -> Result<u8> {
    match value {
        "on" => Ok(1),
        "off" => Ok(0),
        _ => Err(Error::invalid_arg(option, value, "should be \"on\" or \"off\"")),
    }
}

fn parse_state(value: &str) -> Result<u8> {
    port_state_id(value)
        .map(Ok)
        .unwrap_or_else(|| get_u8(value))
        .map_err(|_| Error::invalid_arg("state", value, "state is invalid"))
}

impl ParseOptions for BridgeSlave {
    fn parse_options(&self, _op: Operation, args: &[String], msg: &mut MessageBuilder) -> Result<()> {
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            let Some(&keyword) = KEYWORDS.iter().find(|k| matches(arg, k)) else {
                return Err(Error::UnknownOption {
                    kind: self.kind().to_string(),
                    option: arg.to_string(),
                });
            };
            if let Some(&(name, attr)) = ON_OFF_OPTIONS.iter().find(|(name, _)| *name == keyword) {
                let value = next_value(&mut args, name)?;
                msg.append_attr_u8(attr, parse_on_off(name, value)?)?;
                continue;
            }
            match keyword {
                "fdb_flush" => msg.append_attr_empty(IFLA_BRPORT_FLUSH)?,
                "state" => {
                    let value = next_value(&mut args, keyword)?;
                    msg.append_attr_u8(IFLA_BRPORT_STATE, parse_state(value)?)?;
                }
                "priority" => {
                    let value = next_value(&mut args, keyword)?;
                    let prio = get_u16(value)
                        .map_err(|_| Error::invalid_arg(keyword, value, "priority is invalid"))?;
                    msg.append_attr_u16(IFLA_BRPORT_PRIORITY, prio)?;
                }
                "cost" => {
                    let value = next_value(&mut args, keyword)?;
                    let cost = get_u32(value)
                        .map_err(|_| Error::invalid_arg(keyword, value, "cost is invalid"))?;
                    msg.append_attr_u32(IFLA_BRPORT_COST, cost)?;
                }
                "mcast_router" => {
                    let value = next_value(&mut args, keyword)?;
                    let router = get_u8(value)
                        .map_err(|_| Error::invalid_arg(keyword, value, "invalid mcast_router"))?;
                    msg.append_attr_u8(IFLA_BRPORT_MULTICAST_ROUTER, router)?;
                }
                "group_fwd_mask" => {
                    let value = next_value(&mut args, keyword)?;
                    let mask = get_u16(value)
                        .map_err(|_| Error::invalid_arg(keyword, value, "invalid group_fwd_mask"))?;
                    msg.append_attr_u16(IFLA_BRPORT_GROUP_FWD_MASK, mask)?;
                }
                "help" => return Err(Error::HelpRequested(self.kind().to_string())),
                _ => {
                    return Err(Error::UnknownOption {
                        kind: self.kind().to_string(),
                        option: keyword.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Comma separated names of the bits set in a group forward mask.
fn fwd_mask_str(mask: u16) -> String {
    let parts: Vec<String> = (0..16)
        .filter(|bit| mask & (1 << bit) != 0)
        .map(|bit| {
            FWD_MASK_NAMES
                .iter()
                .find(|(b, _)| *b == bit)
                .map_or_else(|| format!("{:#x}", 1u32 << bit), |(_, name)| name.to_string())
        })
        .collect();
    if parts.is_empty() {
        "0x0".to_string()
    } else {
        parts.join(",")
    }
}

fn on_off(attrs: &AttrTable<'_>, sink: &mut dyn FieldSink, attr: u16, name: &str) -> Result<()> {
    if let Some(a) = attrs.get(attr) {
        sink.field(Field::any(name, FieldValue::OnOff(a.u8()? != 0)))?;
    }
    Ok(())
}

fn jiffies_to_centis(jiffies: u64) -> u64 {
    jiffies.saturating_mul(100) / USER_HZ
}

impl PrintOptions for BridgeSlave {
    fn print_options(&self, attrs: &AttrTable<'_>, sink: &mut dyn FieldSink) -> Result<()> {
        if let Some(a) = attrs.get(IFLA_BRPORT_STATE) {
            let state = a.u8()?;
            match port_state_name(state) {
                Some(name) => sink.field(Field::any("state", FieldValue::Str(name.into())))?,
                None => {
                    sink.field(Field::json("state_index", FieldValue::Int(state.into())))?;
                    sink.field(Field::text("state", FieldValue::Str(format!("({state})"))))?;
                }
            }
        }
        if let Some(a) = attrs.get(IFLA_BRPORT_PRIORITY) {
            sink.field(Field::any("priority", FieldValue::Int(a.u16()?.into())))?;
        }
        if let Some(a) = attrs.get(IFLA_BRPORT_COST) {
            sink.field(Field::any("cost", FieldValue::Int(a.u32()?.into())))?;
        }

        on_off(attrs, sink, IFLA_BRPORT_MODE, "hairpin")?;
        on_off(attrs, sink, IFLA_BRPORT_GUARD, "guard")?;
        on_off(attrs, sink, IFLA_BRPORT_PROTECT, "root_block")?;
        on_off(attrs, sink, IFLA_BRPORT_FAST_LEAVE, "fastleave")?;
        on_off(attrs, sink, IFLA_BRPORT_LEARNING, "learning")?;
        on_off(attrs, sink, IFLA_BRPORT_UNICAST_FLOOD, "flood")?;

        if let Some(a) = attrs.get(IFLA_BRPORT_ID) {
            sink.field(Field::new("id", "port_id", FieldValue::Hex(a.u16()?.into())))?;
        }
        if let Some(a) = attrs.get(IFLA_BRPORT_NO) {
            sink.field(Field::new("no", "port_no", FieldValue::Hex(a.u16()?.into())))?;
        }
        if let Some(a) = attrs.get(IFLA_BRPORT_DESIGNATED_PORT) {
            sink.field(Field::any("designated_port", FieldValue::Uint(a.u16()?.into())))?;
        }
        if let Some(a) = attrs.get(IFLA_BRPORT_DESIGNATED_COST) {
            sink.field(Field::any("designated_cost", FieldValue::Uint(a.u16()?.into())))?;
        }
        if let Some(a) = attrs.get(IFLA_BRPORT_BRIDGE_ID) {
            let id = BridgeId::from_bytes(a.payload())?;
            sink.field(Field::new("bridge_id", "designated_bridge", FieldValue::Str(id.to_string())))?;
        }
        if let Some(a) = attrs.get(IFLA_BRPORT_ROOT_ID) {
            let id = BridgeId::from_bytes(a.payload())?;
            sink.field(Field::new("root_id", "designated_root", FieldValue::Str(id.to_string())))?;
        }

        for (attr, name) in [
            (IFLA_BRPORT_HOLD_TIMER, "hold_timer"),
            (IFLA_BRPORT_MESSAGE_AGE_TIMER, "message_age_timer"),
            (IFLA_BRPORT_FORWARD_DELAY_TIMER, "forward_delay_timer"),
        ] {
            if let Some(a) = attrs.get(attr) {
                let centis = jiffies_to_centis(a.u64()?);
                sink.field(Field::any(name, FieldValue::Centiseconds(centis)))?;
            }
        }

        if let Some(a) = attrs.get(IFLA_BRPORT_TOPOLOGY_CHANGE_ACK) {
            sink.field(Field::any("topology_change_ack", FieldValue::Uint(a.u8()?.into())))?;
        }
        if let Some(a) = attrs.get(IFLA_BRPORT_CONFIG_PENDING) {
            sink.field(Field::any("config_pending", FieldValue::Uint(a.u8()?.into())))?;
        }
        on_off(attrs, sink, IFLA_BRPORT_PROXYARP, "proxy_arp")?;
        on_off(attrs, sink, IFLA_BRPORT_PROXYARP_WIFI, "proxy_arp_wifi")?;
        if let Some(a) = attrs.get(IFLA_BRPORT_MULTICAST_ROUTER) {
            sink.field(Field::new(
                "multicast_router",
                "mcast_router",
                FieldValue::Uint(a.u8()?.into()),
            ))?;
        }
        // Already reported as "fastleave" in JSON.
        if let Some(a) = attrs.get(IFLA_BRPORT_FAST_LEAVE) {
            sink.field(Field::text("mcast_fast_leave", FieldValue::OnOff(a.u8()? != 0)))?;
        }
        on_off(attrs, sink, IFLA_BRPORT_MCAST_FLOOD, "mcast_flood")?;
        on_off(attrs, sink, IFLA_BRPORT_NEIGH_SUPPRESS, "neigh_suppress")?;
        if let Some(a) = attrs.get(IFLA_BRPORT_GROUP_FWD_MASK) {
            let mask = a.u16()?;
            sink.field(Field::any("group_fwd_mask", FieldValue::Hex(mask.into())))?;
            sink.field(Field::any("group_fwd_mask_str", FieldValue::Str(fwd_mask_str(mask))))?;
        }
        on_off(attrs, sink, IFLA_BRPORT_VLAN_TUNNEL, "vlan_tunnel")?;
        Ok(())
    }
}

impl PrintHelp for BridgeSlave {
    fn print_help(&self, out: &mut dyn io::Write) -> io::Result<()> {
        out.write_all(USAGE.as_bytes())
    }
}

fn print_stp(stats: &BridgeStpXstats, sink: &mut dyn FieldSink) -> Result<()> {
    sink.line_break()?;
    sink.open_object(Some("stp"))?;
    sink.field(Field::bare(FieldValue::Str("STP:".into())))?;
    for (key, value) in [
        ("rx_bpdu", stats.rx_bpdu),
        ("tx_bpdu", stats.tx_bpdu),
        ("rx_tcn", stats.rx_tcn),
        ("tx_tcn", stats.tx_tcn),
        ("transition_blk", stats.transition_blk),
        ("transition_fwd", stats.transition_fwd),
    ] {
        sink.field(Field::any(key, FieldValue::Uint(value)))?;
    }
    sink.close_object()
}

fn print_mcast(stats: &BrMcastStats, sink: &mut dyn FieldSink) -> Result<()> {
    sink.line_break()?;
    sink.open_object(Some("multicast"))?;
    sink.field(Field::bare(FieldValue::Str("multicast:".into())))?;
    for (name, pair) in stats.pairs() {
        let rx = format!("{name}_rx");
        let tx = format!("{name}_tx");
        sink.field(Field::any(&rx, FieldValue::Uint(pair.rx)))?;
        sink.field(Field::any(&tx, FieldValue::Uint(pair.tx)))?;
    }
    sink.field(Field::any("igmp_parse_errors", FieldValue::Uint(stats.igmp_parse_errors)))?;
    sink.field(Field::any("mld_parse_errors", FieldValue::Uint(stats.mld_parse_errors)))?;
    sink.close_object()
}

impl ParseXstats for BridgeSlave {
    fn print_xstats_help(&self, out: &mut dyn io::Write) -> io::Result<()> {
        out.write_all(XSTATS_USAGE.as_bytes())
    }

    fn parse_xstats(&self, args: &[String]) -> Result<XstatsFilter> {
        let mut filter = XstatsFilter::default();
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "igmp" | "mcast" => filter.group = Some(BRIDGE_XSTATS_MCAST),
                "stp" => filter.group = Some(BRIDGE_XSTATS_STP),
                "dev" => filter.dev = Some(next_value(&mut args, "dev")?.to_string()),
                "help" => return Err(Error::HelpRequested(self.kind().to_string())),
                other => {
                    return Err(Error::UnknownOption {
                        kind: self.kind().to_string(),
                        option: other.to_string(),
                    });
                }
            }
        }
        Ok(filter)
    }
}

impl PrintXstats for BridgeSlave {
    fn stats_attr(&self) -> u16 {
        IFLA_STATS_LINK_XSTATS_SLAVE
    }

    fn print_xstats(
        &self,
        data: &[u8],
        filter: &XstatsFilter,
        sink: &mut dyn FieldSink,
    ) -> Result<()> {
        let containers = AttrTable::parse(data, LINK_XSTATS_TYPE_MAX)?;
        let Some(bridge) = containers.get(LINK_XSTATS_TYPE_BRIDGE) else {
            return Ok(());
        };
        let stats = bridge.nested(BRIDGE_XSTATS_MAX)?;
        let wants = |group: u16| filter.group.is_none_or(|g| g == group);

        if wants(BRIDGE_XSTATS_MCAST)
            && let Some(a) = stats.get(BRIDGE_XSTATS_MCAST)
        {
            print_mcast(&BrMcastStats::from_bytes(a.payload())?, sink)?;
        }
        if wants(BRIDGE_XSTATS_STP)
            && let Some(a) = stats.get(BRIDGE_XSTATS_STP)
        {
            print_stp(&BridgeStpXstats::from_bytes(a.payload())?, sink)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::args;
    use crate::netlink::builder::ack_request;
    use crate::output::{JsonSink, TextSink};
    use zerocopy::IntoBytes;

    fn parse(list: &[&str]) -> Result<MessageBuilder> {
        let mut msg = ack_request(0);
        BridgeSlave.parse_options(Operation::Set, &args(list), &mut msg)?;
        Ok(msg)
    }

    fn table(msg: &MessageBuilder) -> AttrTable<'_> {
        AttrTable::parse(msg.attributes(0), IFLA_BRPORT_MAX).unwrap()
    }

    fn render(attrs: &[u8], json: bool) -> String {
        let attrs = AttrTable::parse(attrs, IFLA_BRPORT_MAX).unwrap();
        let out = if json {
            let mut sink = JsonSink::new(Vec::new());
            sink.open_object(None).unwrap();
            BridgeSlave.print_options(&attrs, &mut sink).unwrap();
            sink.close_object().unwrap();
            sink.finish().unwrap();
            sink.into_inner()
        } else {
            let mut sink = TextSink::new(Vec::new());
            sink.open_object(None).unwrap();
            BridgeSlave.print_options(&attrs, &mut sink).unwrap();
            sink.close_object().unwrap();
            sink.finish().unwrap();
            sink.into_inner()
        };
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_hairpin_on() {
        let msg = parse(&["hairpin", "on"]).unwrap();
        assert_eq!(table(&msg).get(IFLA_BRPORT_MODE).unwrap().u8().unwrap(), 1);
    }

    #[test]
    fn test_on_off_rejects_other_values() {
        let err = parse(&["hairpin", "maybe"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { ref option, .. } if option == "hairpin"));
        assert!(err.to_string().contains("should be \"on\" or \"off\""));
        assert!(parse(&["learning", "1"]).is_err());
    }

    #[test]
    fn test_full_option_list() {
        let msg = parse(&[
            "fdb_flush", "state", "forwarding", "priority", "32", "cost", "0x100",
            "guard", "off", "mcast_fast_leave", "on", "mcast_router", "2",
            "group_fwd_mask", "0x4001", "vlan_tunnel", "on",
        ])
        .unwrap();
        let t = table(&msg);
        assert!(t.get(IFLA_BRPORT_FLUSH).unwrap().payload().is_empty());
        assert_eq!(t.get(IFLA_BRPORT_STATE).unwrap().u8().unwrap(), 3);
        assert_eq!(t.get(IFLA_BRPORT_PRIORITY).unwrap().u16().unwrap(), 32);
        assert_eq!(t.get(IFLA_BRPORT_COST).unwrap().u32().unwrap(), 256);
        assert_eq!(t.get(IFLA_BRPORT_GUARD).unwrap().u8().unwrap(), 0);
        assert_eq!(t.get(IFLA_BRPORT_FAST_LEAVE).unwrap().u8().unwrap(), 1);
        assert_eq!(t.get(IFLA_BRPORT_MULTICAST_ROUTER).unwrap().u8().unwrap(), 2);
        assert_eq!(t.get(IFLA_BRPORT_GROUP_FWD_MASK).unwrap().u16().unwrap(), 0x4001);
        assert_eq!(t.get(IFLA_BRPORT_VLAN_TUNNEL).unwrap().u8().unwrap(), 1);
    }

    #[test]
    fn test_numbers_are_width_checked() {
        let err = parse(&["priority", "65536"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value \"65536\" for \"priority\": priority is invalid"
        );
        assert!(parse(&["state", "256"]).is_err());
        assert!(parse(&["state", "sleeping"]).is_err());
        assert!(parse(&["mcast_router", "-1"]).is_err());
        assert!(parse(&["group_fwd_mask", "0x10000"]).is_err());
    }

    #[test]
    fn test_unknown_keyword_and_help() {
        let err = parse(&["cost", "5", "bogus"]).unwrap_err();
        assert_eq!(err.to_string(), "bridge_slave: unknown option \"bogus\"?");
        assert!(matches!(parse(&["help"]), Err(Error::HelpRequested(_))));
        assert!(matches!(parse(&["cost"]), Err(Error::MissingArgument(ref k)) if k == "cost"));
    }

    #[test]
    fn test_abbreviated_keywords() {
        let msg = parse(&["hair", "on", "prio", "3", "c", "7", "mcast_r", "1"]).unwrap();
        let t = table(&msg);
        assert_eq!(t.get(IFLA_BRPORT_MODE).unwrap().u8().unwrap(), 1);
        assert_eq!(t.get(IFLA_BRPORT_PRIORITY).unwrap().u16().unwrap(), 3);
        assert_eq!(t.get(IFLA_BRPORT_COST).unwrap().u32().unwrap(), 7);
        assert_eq!(t.get(IFLA_BRPORT_MULTICAST_ROUTER).unwrap().u8().unwrap(), 1);

        // An ambiguous prefix takes the first keyword in table order.
        let msg = parse(&["f", "mcast_f", "off", "proxy_arp", "on"]).unwrap();
        let t = table(&msg);
        assert!(t.get(IFLA_BRPORT_FLUSH).is_some());
        assert_eq!(t.get(IFLA_BRPORT_MCAST_FLOOD).unwrap().u8().unwrap(), 0);
        assert!(t.get(IFLA_BRPORT_FAST_LEAVE).is_none());
        assert_eq!(t.get(IFLA_BRPORT_PROXYARP).unwrap().u8().unwrap(), 1);
        assert!(t.get(IFLA_BRPORT_PROXYARP_WIFI).is_none());

        // Errors name the full keyword.
        let err = parse(&["hair", "maybe"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { ref option, .. } if option == "hairpin"));
        assert!(matches!(parse(&["h"]), Err(Error::MissingArgument(ref k)) if k == "hairpin"));
        assert!(matches!(parse(&["he"]), Err(Error::HelpRequested(_))));
        assert!(matches!(parse(&["hairpins", "on"]), Err(Error::UnknownOption { .. })));
    }

    fn port_attrs() -> Vec<u8> {
        let mut msg = MessageBuilder::new(1024, 0, 0);
        msg.append_attr_u8(IFLA_BRPORT_STATE, 3).unwrap();
        msg.append_attr_u16(IFLA_BRPORT_PRIORITY, 32).unwrap();
        msg.append_attr_u32(IFLA_BRPORT_COST, 100).unwrap();
        msg.append_attr_u8(IFLA_BRPORT_MODE, 1).unwrap();
        msg.append_attr_u8(IFLA_BRPORT_FAST_LEAVE, 0).unwrap();
        msg.append_attr_u16(IFLA_BRPORT_ID, 0x8001).unwrap();
        let id = BridgeId {
            prio: [0x80, 0x00],
            addr: [0x52, 0x54, 0x00, 0xaa, 0xbb, 0xcc],
        };
        msg.append_attr(IFLA_BRPORT_ROOT_ID, id.as_bytes()).unwrap();
        msg.append_attr_u64(IFLA_BRPORT_HOLD_TIMER, 150).unwrap();
        msg.append_attr_u16(IFLA_BRPORT_GROUP_FWD_MASK, 0x4005).unwrap();
        msg.as_bytes()[16..].to_vec()
    }

    #[test]
    fn test_print_text() {
        assert_eq!(
            render(&port_attrs(), false),
            "state forwarding priority 32 cost 100 hairpin on fastleave off port_id 0x8001 \
             designated_root 8000.525400aabbcc hold_timer 1.50 mcast_fast_leave off \
             group_fwd_mask 0x4005 group_fwd_mask_str stp,lacp,lldp\n"
        );
    }

    #[test]
    fn test_print_json() {
        let value: serde_json::Value = serde_json::from_str(&render(&port_attrs(), true)).unwrap();
        let port = &value[0];
        assert_eq!(port["state"], "forwarding");
        assert_eq!(port["hairpin"], true);
        assert_eq!(port["fastleave"], false);
        assert_eq!(port["id"], "0x8001");
        assert_eq!(port["root_id"], "8000.525400aabbcc");
        assert_eq!(port["hold_timer"], 1.5);
        assert!(port.get("mcast_fast_leave").is_none());
    }

    #[test]
    fn test_print_unknown_state() {
        let mut msg = MessageBuilder::new(64, 0, 0);
        msg.append_attr_u8(IFLA_BRPORT_STATE, 9).unwrap();
        let attrs = msg.as_bytes()[16..].to_vec();
        assert_eq!(render(&attrs, false), "state (9)\n");
        assert!(render(&attrs, true).contains("\"state_index\":9"));
    }

    #[test]
    fn test_fwd_mask_str() {
        assert_eq!(fwd_mask_str(0), "0x0");
        assert_eq!(fwd_mask_str(0x0002), "0x2");
        assert_eq!(fwd_mask_str(0x4001), "stp,lldp");
    }

    fn xstats_payload() -> Vec<u8> {
        let stp = BridgeStpXstats {
            rx_bpdu: 10,
            tx_bpdu: 20,
            ..Default::default()
        };
        let mcast = BrMcastStats {
            igmp_parse_errors: 3,
            ..Default::default()
        };
        let mut msg = MessageBuilder::new(1024, 0, 0);
        msg.append_nested(LINK_XSTATS_TYPE_BRIDGE, |b| {
            b.append_attr(BRIDGE_XSTATS_MCAST, mcast.as_bytes())?;
            b.append_attr(BRIDGE_XSTATS_STP, stp.as_bytes())
        })
        .unwrap();
        msg.as_bytes()[16..].to_vec()
    }

    #[test]
    fn test_xstats_selection() {
        let filter = BridgeSlave.parse_xstats(&args(&["stp", "dev", "eth0"])).unwrap();
        assert_eq!(filter.group, Some(BRIDGE_XSTATS_STP));
        assert_eq!(filter.dev.as_deref(), Some("eth0"));
        assert_eq!(
            BridgeSlave.parse_xstats(&args(&["igmp"])).unwrap().group,
            Some(BRIDGE_XSTATS_MCAST)
        );
        assert!(BridgeSlave.parse_xstats(&args(&["vlan"])).is_err());
        assert!(matches!(
            BridgeSlave.parse_xstats(&args(&["help"])),
            Err(Error::HelpRequested(_))
        ));
        let mut usage = Vec::new();
        BridgeSlave.print_xstats_help(&mut usage).unwrap();
        assert!(String::from_utf8(usage).unwrap().contains("[ stp | mcast | igmp ]"));

        let mut sink = JsonSink::new(Vec::new());
        sink.open_object(None).unwrap();
        BridgeSlave
            .print_xstats(&xstats_payload(), &filter, &mut sink)
            .unwrap();
        sink.close_object().unwrap();
        sink.finish().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
        assert_eq!(value[0]["stp"]["rx_bpdu"], 10);
        assert_eq!(value[0]["stp"]["tx_bpdu"], 20);
        assert!(value[0].get("multicast").is_none());
    }

    #[test]
    fn test_xstats_all_groups() {
        let mut sink = JsonSink::new(Vec::new());
        sink.open_object(None).unwrap();
        BridgeSlave
            .print_xstats(&xstats_payload(), &XstatsFilter::default(), &mut sink)
            .unwrap();
        sink.close_object().unwrap();
        sink.finish().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
        assert_eq!(value[0]["multicast"]["igmp_parse_errors"], 3);
        assert_eq!(value[0]["multicast"]["igmp_v1queries_rx"], 0);
        assert_eq!(value[0]["stp"]["rx_tcn"], 0);
    }
}
