//! Builder catalog fetch.
//!
//! The catalog is fetched fresh on every invocation. A failed fetch is
//! fatal; there is no cached or empty fallback.

use buildmaster_client::BuildMasterClient;
use tracing::debug;

use crate::domain::{BuilderCatalog, Result, TryJobError};
use crate::obs;

/// Fetch the builder listing and keep the names ending in `suffix`.
pub async fn fetch_catalog(client: &BuildMasterClient, suffix: &str) -> Result<BuilderCatalog> {
    let url = client.config().builders_url();
    let listing = client
        .fetch_builder_names()
        .await
        .map_err(|e| TryJobError::UnreachableCatalog(e.to_string()))?;

    let catalog = BuilderCatalog::from_listing(&listing, suffix);
    debug!(
        dropped = listing.len() - catalog.len(),
        "non-try builders and duplicates filtered"
    );
    obs::emit_catalog_fetched(&url, listing.len(), catalog.len());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildmaster_client::BuildMasterConfig;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_catalog_strips_suffix() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/json/builders");
                then.status(200)
                    .body(r#"["Linux_Trybot", "Mac_Trybot", "Linux", "Win_Trybot"]"#);
            })
            .await;
        let client =
            BuildMasterClient::new(BuildMasterConfig::new(&server.base_url(), "unused")).unwrap();

        let catalog = fetch_catalog(&client, "_Trybot").await.unwrap();

        let names: Vec<&str> = catalog.iter().map(|b| b.as_str()).collect();
        assert_eq!(names, vec!["Linux", "Mac", "Win"]);
    }

    #[tokio::test]
    async fn test_fetch_catalog_malformed_is_unreachable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/json/builders");
                then.status(200).body("{ not json");
            })
            .await;
        let client =
            BuildMasterClient::new(BuildMasterConfig::new(&server.base_url(), "unused")).unwrap();

        let err = fetch_catalog(&client, "_Trybot").await.unwrap_err();
        assert!(matches!(err, TryJobError::UnreachableCatalog(_)));
    }
}
