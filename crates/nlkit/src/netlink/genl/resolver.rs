//! Generic netlink family resolution with a per-resolver cache.

use std::collections::HashMap;

use super::header::GenlMsgHdr;
use super::{CTRL_ATTR_MAX, CtrlAttr, CtrlAttrMcastGrp, CtrlCmd, GENL_ID_CTRL};
use crate::netlink::builder::REQUEST_CAPACITY;
use crate::netlink::connection::Connection;
use crate::netlink::error::{Error, Result};
use crate::netlink::message::NLM_F_REQUEST;
use crate::netlink::socket::{NetlinkSocket, Protocol, Transport};
use crate::netlink::table::AttrTable;

/// Information about a Generic Netlink family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyInfo {
    /// Dynamically assigned family ID (used as nlmsg_type).
    pub id: u16,
    /// Family version.
    pub version: u32,
    /// Header size (additional bytes after genlmsghdr).
    pub hdr_size: u32,
    /// Maximum attribute number.
    pub max_attr: u32,
    /// Multicast groups: name -> group ID.
    pub mcast_groups: HashMap<String, u32>,
}

/// Resolves generic netlink family names to ids.
///
/// Owns the control connection, which stays open so the caller can send
/// family requests over it after resolving. A name is asked for at most once
/// per resolver; later lookups come from the cache.
///
/// ```rust,no_run
/// use nlkit::netlink::genl::FamilyResolver;
///
/// # async fn example() -> nlkit::Result<()> {
/// let mut resolver = FamilyResolver::new()?;
/// let id = resolver.resolve("fou").await?;
/// let again = resolver.resolve("fou").await?; // no kernel round trip
/// assert_eq!(id, again);
/// # Ok(())
/// # }
/// ```
pub struct FamilyResolver<T: Transport = NetlinkSocket> {
    conn: Connection<T>,
    cache: HashMap<String, FamilyInfo>,
}

impl FamilyResolver<NetlinkSocket> {
    /// Open a generic netlink socket for resolution.
    pub fn new() -> Result<Self> {
        Ok(Self::from_connection(Connection::new(Protocol::Generic)?))
    }
}

impl<T: Transport> FamilyResolver<T> {
    /// Resolve over an existing generic netlink connection.
    pub fn from_connection(conn: Connection<T>) -> Self {
        Self {
            conn,
            cache: HashMap::new(),
        }
    }

    /// Connection used for resolution, for follow-up family requests.
    pub fn connection(&mut self) -> &mut Connection<T> {
        &mut self.conn
    }

    /// Family id for `name`.
    pub async fn resolve(&mut self, name: &str) -> Result<u16> {
        Ok(self.family(name).await?.id)
    }

    /// Full family description for `name`.
    pub async fn family(&mut self, name: &str) -> Result<&FamilyInfo> {
        if !self.cache.contains_key(name) {
            let info = self.query_family(name).await?;
            tracing::debug!(family = name, id = info.id, "resolved generic netlink family");
            self.cache.insert(name.to_string(), info);
        } else {
            tracing::trace!(family = name, "family cache hit");
        }
        self.cache
            .get(name)
            .ok_or_else(|| Error::FamilyNotFound { name: name.into() })
    }

    /// Already resolved id for `name`, without touching the socket.
    pub fn cached(&self, name: &str) -> Option<u16> {
        self.cache.get(name).map(|info| info.id)
    }

    /// Forget every resolved family.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    async fn query_family(&mut self, name: &str) -> Result<FamilyInfo> {
        let mut builder = super::request(
            REQUEST_CAPACITY,
            GENL_ID_CTRL,
            CtrlCmd::GetFamily as u8,
            1,
            NLM_F_REQUEST,
        )?;
        builder.append_attr_str(CtrlAttr::FamilyName as u16, name)?;

        let not_found = || Error::FamilyNotFound { name: name.into() };
        let reply = match self.conn.talk(builder).await {
            Ok(reply) => reply,
            Err(e @ Error::Io(_)) => return Err(e),
            Err(e) => {
                tracing::debug!(family = name, error = %e, "family lookup rejected");
                return Err(not_found());
            }
        };
        if reply.is_ack() {
            return Err(not_found());
        }

        let (_, attrs) = GenlMsgHdr::split(&reply.payload)?;
        parse_family(attrs)?.ok_or_else(not_found)
    }
}

/// Decode a CTRL_CMD_NEWFAMILY body; `None` when it carries no id.
fn parse_family(data: &[u8]) -> Result<Option<FamilyInfo>> {
    let table = AttrTable::parse(data, CTRL_ATTR_MAX)?;
    let Some(id) = table.get(CtrlAttr::FamilyId as u16) else {
        return Ok(None);
    };

    let u32_of = |attr: CtrlAttr| -> Result<u32> {
        table.get(attr as u16).map_or(Ok(0), |a| a.u32())
    };

    let mut mcast_groups = HashMap::new();
    if let Some(groups) = table.get(CtrlAttr::McastGroups as u16) {
        // Array of nests indexed from 1, each holding name and id.
        for group in AttrTable::parse(groups.payload(), u16::MAX)?.iter() {
            let group = group.nested(CtrlAttrMcastGrp::Id as u16)?;
            if let (Some(name), Some(id)) = (
                group.get(CtrlAttrMcastGrp::Name as u16),
                group.get(CtrlAttrMcastGrp::Id as u16),
            ) {
                mcast_groups.insert(name.str()?.to_string(), id.u32()?);
            }
        }
    }

    Ok(Some(FamilyInfo {
        id: id.u16()?,
        version: u32_of(CtrlAttr::Version)?,
        hdr_size: u32_of(CtrlAttr::HdrSize)?,
        max_attr: u32_of(CtrlAttr::MaxAttr)?,
        mcast_groups,
    }))
}
