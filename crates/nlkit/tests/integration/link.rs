//! Link integration tests.

use std::ops::ControlFlow;

use nlkit::Result;
use nlkit::netlink::link::{self, LinkMessage, LinkRequest, LinkStats};
use nlkit::netlink::types::stats::IFLA_STATS_LINK_XSTATS_SLAVE;

use crate::common::{args, get_link, registry, route};

#[tokio::test]
async fn test_dump_contains_loopback() -> Result<()> {
    let mut conn = route()?;
    let mut links = Vec::new();
    conn.dump(link::get_request(None)?, |_, payload| {
        links.push(LinkMessage::parse(payload)?);
        Ok(ControlFlow::Continue(()))
    })
    .await?;

    let lo = links
        .iter()
        .find(|l| l.name.as_deref() == Some("lo"))
        .expect("lo should exist");
    assert!(lo.ifindex() > 0);
    assert!(lo.mtu.is_some());
    Ok(())
}

#[tokio::test]
async fn test_get_single_link() -> Result<()> {
    let mut conn = route()?;
    let lo = get_link(&mut conn, "lo").await?;
    assert_eq!(lo.name_or("?"), "lo");

    let err = get_link(&mut conn, "nlkit-missing0").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    Ok(())
}

#[tokio::test]
async fn test_set_missing_link_fails() -> Result<()> {
    let mut conn = route()?;
    let request = LinkRequest::parse(&args(&["dev", "nlkit-missing0", "up"]), false)?
        .build(&registry())?;
    let err = conn.talk(request).await.unwrap_err();
    assert!(
        err.is_not_found() || err.is_permission_denied(),
        "unexpected error: {err}"
    );
    Ok(())
}

#[tokio::test]
async fn test_set_loopback_mtu() -> Result<()> {
    require_root!();

    let mut conn = route()?;
    let lo = get_link(&mut conn, "lo").await?;
    let mtu = lo.mtu.expect("lo reports an mtu").to_string();

    // Writing back the current value leaves the system unchanged.
    let request = LinkRequest::parse(&args(&["lo", "mtu", &mtu]), false)?.build(&registry())?;
    assert!(conn.talk(request).await?.is_ack());
    Ok(())
}

#[tokio::test]
async fn test_slave_xstats_dump() -> Result<()> {
    let mut conn = route()?;
    let mut seen = 0;
    conn.dump(link::stats_request(IFLA_STATS_LINK_XSTATS_SLAVE)?, |_, payload| {
        if LinkStats::parse(payload, IFLA_STATS_LINK_XSTATS_SLAVE)?.is_some() {
            seen += 1;
        }
        Ok(ControlFlow::Continue(()))
    })
    .await?;
    // Only bridge ports report slave statistics; a plain host has none.
    println!("links with slave xstats: {seen}");
    Ok(())
}
