//! Foo-over-UDP receive port options.

use std::io;

use super::{KindHandler, Operation, ParseOptions, PrintHelp, PrintOptions, next_value};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::genl::fou::*;
use crate::netlink::table::AttrTable;
use crate::output::{Field, FieldSink, FieldValue};
use crate::util::names::{family_name, ip_protocol_id};
use crate::util::parse::{get_u8, get_u16, matches};

const USAGE: &str = "\
Usage: ip fou add port PORT { ipproto PROTO  | gue } [ -6 ]
       ip fou del port PORT [ -6 ]
       ip fou show

Where: PROTO { ipproto-name | 1..255 }
       PORT { 1..65535 }
";

/// Handler for `ip fou` port mappings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fou;

impl KindHandler for Fou {
    fn kind(&self) -> &'static str {
        "fou"
    }

    fn max_attr(&self) -> u16 {
        FOU_ATTR_MAX
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
}

fn parse_port(value: &str) -> Result<u16> {
    match get_u16(value) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(Error::invalid_arg("port", value, "invalid port")),
    }
}

fn parse_ipproto(value: &str) -> Result<u8> {
    if let Some(proto) = ip_protocol_id(value) {
        return Ok(proto);
    }
    match get_u8(value) {
        Ok(proto) if proto != 0 => Ok(proto),
        _ => Err(Error::invalid_arg("ipproto", value, "invalid ipproto")),
    }
}

impl ParseOptions for Fou {
    fn parse_options(&self, op: Operation, args: &[String], msg: &mut MessageBuilder) -> Result<()> {
        let mut port = None;
        let mut ipproto = None;
        let mut gue = false;
        let mut family = libc::AF_INET as u8;

        let mut args = args.iter();
        while let Some(arg) = args.next() {
            let keyword = arg.as_str();
            if matches(keyword, "port") {
                port = Some(parse_port(next_value(&mut args, "port")?)?);
            } else if matches(keyword, "ipproto") {
                ipproto = Some(parse_ipproto(next_value(&mut args, "ipproto")?)?);
            } else if matches(keyword, "gue") {
                gue = true;
            } else if matches(keyword, "-6") {
                family = libc::AF_INET6 as u8;
            } else {
                return Err(Error::UnknownOption {
                    kind: self.kind().to_string(),
                    option: keyword.to_string(),
                });
            }
        }

        let Some(port) = port else {
            return Err(Error::Usage("fou: missing port".into()));
        };
        if ipproto.is_none() && !gue && op == Operation::Add {
            return Err(Error::Usage("fou: must set ipproto or gue".into()));
        }
        if ipproto.is_some() && gue {
            return Err(Error::Usage("fou: cannot set ipproto and gue".into()));
        }

        let encap = if gue { FouEncap::Gue } else { FouEncap::Direct };
        msg.append_attr_u16_be(FOU_ATTR_PORT, port)?;
        msg.append_attr_u8(FOU_ATTR_TYPE, encap as u8)?;
        msg.append_attr_u8(FOU_ATTR_AF, family)?;
        if let Some(proto) = ipproto {
            msg.append_attr_u8(FOU_ATTR_IPPROTO, proto)?;
        }
        Ok(())
    }
}

impl PrintOptions for Fou {
    fn print_options(&self, attrs: &AttrTable<'_>, sink: &mut dyn FieldSink) -> Result<()> {
        if let Some(a) = attrs.get(FOU_ATTR_PORT) {
            sink.field(Field::any("port", FieldValue::Uint(a.u16_be()?.into())))?;
        }

        let encap = attrs
            .get(FOU_ATTR_TYPE)
            .map(|a| a.u8().map(FouEncap::from_u8))
            .transpose()?;
        if encap == Some(FouEncap::Gue) {
            sink.field(Field::any("gue", FieldValue::Flag))?;
        } else if let Some(a) = attrs.get(FOU_ATTR_IPPROTO) {
            sink.field(Field::any("ipproto", FieldValue::Uint(a.u8()?.into())))?;
        }

        if let Some(a) = attrs.get(FOU_ATTR_AF) {
            let family = a.u8()?;
            sink.field(Field::json("family", FieldValue::Str(family_name(family).into())))?;
            if family as i32 == libc::AF_INET6 {
                sink.field(Field::text("-6", FieldValue::Flag))?;
            }
        }
        Ok(())
    }
}

impl PrintHelp for Fou {
    fn print_help(&self, out: &mut dyn io::Write) -> io::Result<()> {
        out.write_all(USAGE.as_bytes())
    }
}
