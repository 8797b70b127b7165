//! XDP program attachment (IFLA_XDP).
//!
//! Only already loaded programs can be attached, by file descriptor.
//! Loading an object file needs a BPF loader and is not supported.

use super::builder::MessageBuilder;
use super::error::{Error, Result};
use super::table::AttrTable;
use crate::output::{Field, FieldSink, FieldValue};

/// Nested attributes inside IFLA_XDP.
pub const IFLA_XDP_FD: u16 = 1;
pub const IFLA_XDP_ATTACHED: u16 = 2;
pub const IFLA_XDP_FLAGS: u16 = 3;
pub const IFLA_XDP_PROG_ID: u16 = 4;
pub const IFLA_XDP_DRV_PROG_ID: u16 = 5;
pub const IFLA_XDP_SKB_PROG_ID: u16 = 6;
pub const IFLA_XDP_HW_PROG_ID: u16 = 7;
pub const IFLA_XDP_EXPECTED_FD: u16 = 8;
pub const IFLA_XDP_MAX: u16 = IFLA_XDP_EXPECTED_FD;

/// Attach flags.
pub const XDP_FLAGS_UPDATE_IF_NOEXIST: u32 = 1 << 0;
pub const XDP_FLAGS_SKB_MODE: u32 = 1 << 1;
pub const XDP_FLAGS_DRV_MODE: u32 = 1 << 2;
pub const XDP_FLAGS_HW_MODE: u32 = 1 << 3;

/// Attachment mode reported in IFLA_XDP_ATTACHED.
pub const XDP_ATTACHED_NONE: u8 = 0;
pub const XDP_ATTACHED_DRV: u8 = 1;
pub const XDP_ATTACHED_SKB: u8 = 2;
pub const XDP_ATTACHED_HW: u8 = 3;
pub const XDP_ATTACHED_MULTI: u8 = 4;

/// Mode requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XdpMode {
    /// `xdp`: let the kernel pick.
    Auto,
    /// `xdpgeneric`
    Generic,
    /// `xdpdrv`
    Driver,
    /// `xdpoffload`
    Offload,
}

impl XdpMode {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "xdp" => Some(Self::Auto),
            "xdpgeneric" => Some(Self::Generic),
            "xdpdrv" => Some(Self::Driver),
            "xdpoffload" => Some(Self::Offload),
            _ => None,
        }
    }

    fn flag(self) -> u32 {
        match self {
            Self::Auto => 0,
            Self::Generic => XDP_FLAGS_SKB_MODE,
            Self::Driver => XDP_FLAGS_DRV_MODE,
            Self::Offload => XDP_FLAGS_HW_MODE,
        }
    }
}

/// Program attachment carried in a link request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XdpAttach {
    /// Program file descriptor, -1 to detach.
    pub fd: i32,
    pub flags: u32,
}

impl XdpAttach {
    /// Attach program `fd`. Unless `force` is set an already attached
    /// program is not replaced.
    pub fn new(fd: i32, mode: XdpMode, force: bool) -> Self {
        let mut flags = mode.flag();
        if !force {
            flags |= XDP_FLAGS_UPDATE_IF_NOEXIST;
        }
        Self { fd, flags }
    }

    /// Remove the program attached in `mode`.
    pub fn detach(mode: XdpMode, force: bool) -> Self {
        Self::new(-1, mode, force)
    }

    /// Parse the arguments following an `xdp*` keyword, consuming what it
    /// uses from `args`. `off` and `none` are only accepted as the last
    /// argument on the line.
    pub fn parse(
        mode: XdpMode,
        force: bool,
        args: &mut std::slice::Iter<'_, String>,
    ) -> Result<Self> {
        match args.next().map(String::as_str) {
            Some("off" | "none") if args.as_slice().is_empty() => Ok(Self::detach(mode, force)),
            Some(word @ ("off" | "none")) => {
                Err(Error::invalid_arg("xdp", word, "must be the last argument"))
            }
            Some("fd") => {
                let value = args
                    .next()
                    .ok_or_else(|| Error::MissingArgument("fd".into()))?;
                let fd = crate::util::parse::get_i32(value)
                    .ok()
                    .filter(|fd| *fd >= 0)
                    .ok_or_else(|| Error::invalid_arg("fd", value.as_str(), "invalid file descriptor"))?;
                Ok(Self::new(fd, mode, force))
            }
            Some("object" | "obj" | "pinned") => Err(Error::NotSupported(
                "loading XDP programs from files".into(),
            )),
            Some(other) => Err(Error::invalid_arg("xdp", other, "expected \"off\", \"none\" or \"fd FD\"")),
            None => Err(Error::MissingArgument("xdp".into())),
        }
    }

    /// Append the IFLA_XDP nest to `msg`.
    pub fn append_to(&self, msg: &mut MessageBuilder) -> Result<()> {
        msg.append_nested(crate::netlink::types::link::IFLA_XDP, |b| {
            b.append_attr_i32(IFLA_XDP_FD, self.fd)?;
            if self.flags != 0 {
                b.append_attr_u32(IFLA_XDP_FLAGS, self.flags)?;
            }
            Ok(())
        })
    }
}

/// Attachment state reported for a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XdpInfo {
    /// One of the `XDP_ATTACHED_*` values.
    pub mode: u8,
    pub prog_id: Option<u32>,
}

impl XdpInfo {
    /// Decode the payload of IFLA_XDP. `None` when nothing is attached.
    pub fn parse(data: &[u8]) -> Result<Option<Self>> {
        let table = AttrTable::parse(data, IFLA_XDP_MAX)?;
        let Some(attached) = table.get(IFLA_XDP_ATTACHED) else {
            return Ok(None);
        };
        let mode = attached.u8()?;
        if mode == XDP_ATTACHED_NONE {
            return Ok(None);
        }
        let prog_id = table
            .get(IFLA_XDP_PROG_ID)
            .map(|a| a.u32())
            .transpose()?
            .filter(|id| *id != 0);
        Ok(Some(Self { mode, prog_id }))
    }

    /// Text name of the attachment mode.
    pub fn mode_name(&self) -> String {
        match self.mode {
            XDP_ATTACHED_DRV => "xdp".to_string(),
            XDP_ATTACHED_SKB => "xdpgeneric".to_string(),
            XDP_ATTACHED_HW => "xdpoffload".to_string(),
            other => format!("xdp[{other}]"),
        }
    }

    pub fn print(&self, sink: &mut dyn FieldSink) -> Result<()> {
        let mut text = self.mode_name();
        if let Some(id) = self.prog_id {
            text.push_str(&format!("/id:{id}"));
        }
        sink.field(Field::bare(FieldValue::Str(text)))?;

        sink.open_object(Some("xdp"))?;
        sink.field(Field::json("mode", FieldValue::Uint(self.mode.into())))?;
        if let Some(id) = self.prog_id {
            sink.field(Field::json("prog_id", FieldValue::Uint(id.into())))?;
        }
        sink.close_object()
    }
}
