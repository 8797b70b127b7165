//! Generic netlink integration tests.

use nlkit::Result;
use nlkit::netlink::genl::{FamilyResolver, GENL_ID_CTRL};

#[tokio::test]
async fn test_resolve_nlctrl() -> Result<()> {
    let mut resolver = FamilyResolver::new()?;

    // The control family resolves itself.
    let id = resolver.resolve("nlctrl").await?;
    assert_eq!(id, GENL_ID_CTRL);
    assert_eq!(resolver.cached("nlctrl"), Some(GENL_ID_CTRL));

    let info = resolver.family("nlctrl").await?;
    assert_eq!(info.id, GENL_ID_CTRL);
    assert!(info.max_attr > 0);
    Ok(())
}

#[tokio::test]
async fn test_unknown_family() -> Result<()> {
    let mut resolver = FamilyResolver::new()?;
    let err = resolver.resolve("no-such-family").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert_eq!(resolver.cached("no-such-family"), None);
    Ok(())
}
