//! Link requests and link message decoding.
//!
//! A [`LinkRequest`] is parsed from `ip link set` style tokens and turned
//! into an RTM_NEWLINK request addressed by interface name. Kind specific
//! options are handed to the [`KindRegistry`]. [`LinkMessage`] decodes the
//! replies of RTM_GETLINK and [`print_link`] renders them.

use std::collections::HashMap;

use super::builder::{MessageBuilder, ack_request, dump_request};
use super::error::{Error, Result};
use super::message::NlMsgType;
use super::table::AttrTable;
use super::types::link::*;
use super::types::stats::{IFLA_STATS_MAX, IfStatsMsg};
use super::xdp::{XdpAttach, XdpInfo, XdpMode};
use crate::kind::{KindRegistry, Operation, SLAVE_SUFFIX};
use crate::output::{Field, FieldSink, FieldValue, OutputOptions};
use crate::util::parse::{get_u32, matches};

/// Longest interface name plus the terminating NUL.
const IFNAMSIZ: usize = 16;

/// Interface flags shown between angle brackets, in display order.
const IFF_NAMES: &[(libc::c_int, &str)] = &[
    (libc::IFF_LOOPBACK, "LOOPBACK"),
    (libc::IFF_BROADCAST, "BROADCAST"),
    (libc::IFF_POINTOPOINT, "POINTOPOINT"),
    (libc::IFF_MULTICAST, "MULTICAST"),
    (libc::IFF_NOARP, "NOARP"),
    (libc::IFF_PROMISC, "PROMISC"),
    (libc::IFF_UP, "UP"),
];

/// Parsed `ip link set` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRequest {
    pub name: String,
    pub up: Option<bool>,
    pub mtu: Option<u32>,
    pub xdp: Option<XdpAttach>,
    /// Kind named after `type`, possibly with the `_slave` suffix.
    pub kind: Option<String>,
    /// Everything after `type KIND`.
    pub kind_args: Vec<String>,
}

impl LinkRequest {
    /// Parse `tokens`. `force` lets an XDP attach replace a loaded program.
    pub fn parse(tokens: &[String], force: bool) -> Result<Self> {
        let mut req = Self::default();
        let mut name = None;
        let mut args = tokens.iter();

        while let Some(token) = args.next() {
            let keyword = token.as_str();
            if keyword == "up" || keyword == "down" {
                req.up = Some(keyword == "up");
            } else if matches(keyword, "mtu") {
                let value = args
                    .next()
                    .ok_or_else(|| Error::MissingArgument("mtu".into()))?;
                let mtu = get_u32(value)
                    .map_err(|e| Error::invalid_arg("mtu", value.as_str(), e.to_string()))?;
                req.mtu = Some(mtu);
            } else if let Some(mode) = XdpMode::from_keyword(keyword) {
                req.xdp = Some(XdpAttach::parse(mode, force, &mut args)?);
            } else if matches(keyword, "type") {
                let kind = args
                    .next()
                    .ok_or_else(|| Error::MissingArgument("type".into()))?;
                req.kind = Some(kind.clone());
                req.kind_args = args.by_ref().cloned().collect();
            } else if matches(keyword, "help") {
                return Err(Error::HelpRequested("link".into()));
            } else {
                let value = if keyword == "dev" {
                    args.next()
                        .ok_or_else(|| Error::MissingArgument("dev".into()))?
                } else {
                    token
                };
                if name.is_some() {
                    return Err(Error::UnknownOption {
                        kind: "link".into(),
                        option: value.to_string(),
                    });
                }
                name = Some(value.clone());
            }
        }

        req.name = name.ok_or_else(|| {
            Error::Usage("Not enough information: \"dev\" argument is required.".into())
        })?;
        if req.name.len() >= IFNAMSIZ {
            return Err(Error::invalid_arg("dev", req.name, "name too long"));
        }
        Ok(req)
    }

    /// Build the RTM_NEWLINK request.
    ///
    /// Fails without side effects when the kind options do not parse, so
    /// nothing reaches the kernel for an invalid option list.
    pub fn build(&self, registry: &KindRegistry) -> Result<MessageBuilder> {
        let mut msg = ack_request(NlMsgType::RTM_NEWLINK);

        let mut ifinfo = IfInfoMsg::new();
        if let Some(up) = self.up {
            ifinfo.ifi_change = IFF_UP;
            ifinfo.ifi_flags = if up { IFF_UP } else { 0 };
        }
        msg.append(&ifinfo)?;
        msg.append_attr_str(IFLA_IFNAME, &self.name)?;

        if let Some(mtu) = self.mtu {
            msg.append_attr_u32(IFLA_MTU, mtu)?;
        }
        if let Some(xdp) = &self.xdp {
            xdp.append_to(&mut msg)?;
        }
        if let Some(kind) = &self.kind {
            self.append_linkinfo(kind, registry, &mut msg)?;
        }
        Ok(msg)
    }

    fn append_linkinfo(
        &self,
        kind: &str,
        registry: &KindRegistry,
        msg: &mut MessageBuilder,
    ) -> Result<()> {
        let (kind_attr, data_attr, name) = match kind.strip_suffix(SLAVE_SUFFIX) {
            Some(master) => (IFLA_INFO_SLAVE_KIND, IFLA_INFO_SLAVE_DATA, master),
            None => (IFLA_INFO_KIND, IFLA_INFO_DATA, kind),
        };

        msg.append_nested(IFLA_LINKINFO, |b| {
            b.append_attr_str(kind_attr, name)?;
            if !self.kind_args.is_empty() {
                b.append_nested(data_attr, |b| {
                    registry.parse_options(kind, Operation::Set, &self.kind_args, b)
                })?;
            }
            Ok(())
        })
    }
}

/// RTM_GETLINK request for one device, or a dump of all of them.
pub fn get_request(name: Option<&str>) -> Result<MessageBuilder> {
    let mut msg = match name {
        Some(_) => ack_request(NlMsgType::RTM_GETLINK),
        None => dump_request(NlMsgType::RTM_GETLINK),
    };
    msg.append(&IfInfoMsg::new())?;
    if let Some(name) = name {
        msg.append_attr_str(IFLA_IFNAME, name)?;
    }
    Ok(msg)
}

/// RTM_GETSTATS dump selecting the `attr` statistics group.
pub fn stats_request(attr: u16) -> Result<MessageBuilder> {
    let mut msg = dump_request(NlMsgType::RTM_GETSTATS);
    msg.append(&IfStatsMsg::filter(attr))?;
    Ok(msg)
}

/// One RTM_NEWSTATS reply reduced to the requested group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub ifindex: u32,
    pub data: Vec<u8>,
}

impl LinkStats {
    /// Extract attribute `attr` from a stats reply. `None` when the link
    /// does not report it.
    pub fn parse(payload: &[u8], attr: u16) -> Result<Option<Self>> {
        let (header, attrs) = IfStatsMsg::split(payload)?;
        let table = AttrTable::parse(attrs, IFLA_STATS_MAX)?;
        Ok(table.get(attr).map(|a| Self {
            ifindex: header.ifindex,
            data: a.payload().to_vec(),
        }))
    }
}

/// Decoded RTM_NEWLINK message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMessage {
    pub header: IfInfoMsg,
    pub name: Option<String>,
    pub mtu: Option<u32>,
    pub master: Option<u32>,
    pub operstate: Option<OperState>,
    pub kind: Option<String>,
    pub slave_kind: Option<String>,
    pub data: Option<Vec<u8>>,
    pub slave_data: Option<Vec<u8>>,
    pub xdp: Option<XdpInfo>,
}

impl LinkMessage {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let (header, attrs) = IfInfoMsg::split(payload)?;
        let table = AttrTable::parse(attrs, IFLA_MAX)?;
        let mut link = Self {
            header,
            ..Self::default()
        };

        if let Some(a) = table.get(IFLA_IFNAME) {
            link.name = Some(a.str()?.to_string());
        }
        if let Some(a) = table.get(IFLA_MTU) {
            link.mtu = Some(a.u32()?);
        }
        if let Some(a) = table.get(IFLA_MASTER) {
            link.master = Some(a.u32()?);
        }
        if let Some(a) = table.get(IFLA_OPERSTATE) {
            link.operstate = Some(OperState::from_u8(a.u8()?));
        }
        if let Some(a) = table.get(IFLA_XDP) {
            link.xdp = XdpInfo::parse(a.payload())?;
        }
        if let Some(a) = table.get(IFLA_LINKINFO) {
            let info = a.nested(IFLA_INFO_MAX)?;
            if let Some(a) = info.get(IFLA_INFO_KIND) {
                link.kind = Some(a.str()?.to_string());
            }
            if let Some(a) = info.get(IFLA_INFO_SLAVE_KIND) {
                link.slave_kind = Some(a.str()?.to_string());
            }
            link.data = info.get(IFLA_INFO_DATA).map(|a| a.payload().to_vec());
            link.slave_data = info.get(IFLA_INFO_SLAVE_DATA).map(|a| a.payload().to_vec());
        }
        Ok(link)
    }

    pub fn ifindex(&self) -> u32 {
        self.header.ifi_index as u32
    }

    pub fn name_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(default)
    }

    fn flag_names(&self) -> Vec<&'static str> {
        let flags = self.header.ifi_flags;
        let mut names: Vec<_> = IFF_NAMES
            .iter()
            .filter(|(bit, _)| flags & (*bit as u32) != 0)
            .map(|(_, name)| *name)
            .collect();
        if flags & IFF_LOWER_UP != 0 {
            names.push("LOWER_UP");
        }
        names
    }
}

/// Render `link` as one record.
///
/// `names` maps interface indexes to names for the `master` field. With
/// `details` set the kind and slave data are decoded through `registry`.
pub fn print_link(
    link: &LinkMessage,
    registry: &KindRegistry,
    opts: &OutputOptions,
    names: &HashMap<u32, String>,
    sink: &mut dyn FieldSink,
) -> Result<()> {
    let name = link.name_or("?");
    sink.open_object(None)?;
    sink.field(Field::json("ifindex", FieldValue::Uint(link.ifindex().into())))?;
    sink.field(Field::bare(FieldValue::Str(format!("{}:", link.ifindex()))))?;
    sink.field(Field::json("ifname", FieldValue::Str(name.to_string())))?;
    sink.field(Field::bare(FieldValue::Str(format!("{name}:"))))?;

    let flags = link.flag_names();
    sink.field(Field::json("flags", FieldValue::Str(flags.join(","))))?;
    sink.field(Field::bare(FieldValue::Str(format!("<{}>", flags.join(",")))))?;

    if let Some(mtu) = link.mtu {
        sink.field(Field::any("mtu", FieldValue::Uint(mtu.into())))?;
    }
    if let Some(xdp) = &link.xdp {
        xdp.print(sink)?;
    }
    if let Some(master) = link.master {
        let value = match names.get(&master) {
            Some(name) => FieldValue::Str(name.clone()),
            None => FieldValue::Uint(master.into()),
        };
        sink.field(Field::any("master", value))?;
    }
    if let Some(state) = link.operstate {
        sink.field(Field::new("operstate", "state", FieldValue::Str(state.name().into())))?;
    }

    if opts.details && (link.kind.is_some() || link.slave_kind.is_some()) {
        sink.line_break()?;
        sink.open_object(Some("linkinfo"))?;
        if let Some(kind) = &link.kind {
            sink.field(Field::json("info_kind", FieldValue::Str(kind.clone())))?;
            sink.field(Field::bare(FieldValue::Str(kind.clone())))?;
            if let Some(data) = &link.data {
                sink.open_object(Some("info_data"))?;
                registry.print_options(kind, data, None, sink)?;
                sink.close_object()?;
            }
        }
        if let Some(slave) = &link.slave_kind {
            let handler = format!("{slave}{SLAVE_SUFFIX}");
            sink.field(Field::json("info_slave_kind", FieldValue::Str(slave.clone())))?;
            sink.field(Field::bare(FieldValue::Str(handler.clone())))?;
            if let Some(data) = &link.slave_data {
                sink.open_object(Some("info_slave_data"))?;
                registry.print_options(&handler, data, None, sink)?;
                sink.close_object()?;
            }
        }
        sink.close_object()?;
    }
    sink.close_object()
}
