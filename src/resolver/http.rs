use async_trait::async_trait;
use log::debug;
use reqwest::{Client, header::USER_AGENT};

use super::{ManifestSource, ResolveError};
use crate::cloud::Manifest;
use crate::feeds::FeedConfig;

/// Fetches manifests from the CoreOS release server (or a configured mirror).
#[derive(Debug, Clone)]
pub struct HttpManifestSource {
    client: Client,
    config: FeedConfig,
}

impl HttpManifestSource {
    pub fn new(config: FeedConfig) -> Result<Self, ResolveError> {
        let client = Client::builder().build().map_err(|source| ResolveError::Transport {
            url: config.url().to_string(),
            source,
        })?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: FeedConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    async fn fetch(&self, channel: &str) -> Result<Manifest, ResolveError> {
        let url = self.config.manifest_url(channel);
        debug!("GET {url}");

        let transport = |source: reqwest::Error| ResolveError::Transport { url: url.clone(), source };

        let bytes = self
            .client
            .get(&url)
            .header(USER_AGENT, self.config.user_agent())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(transport)?
            .bytes()
            .await
            .map_err(transport)?;

        serde_json::from_slice(&bytes).map_err(|source| ResolveError::Decode { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::Selector;
    use crate::resolver::AmiResolver;
    use mockito::{Server, ServerGuard};

    const MANIFEST: &str = r#"{"amis":[{"name":"us-west-2","pv":"ami-111","hvm":"ami-222"}]}"#;
    const PARTIAL_MANIFEST: &str =
        r#"{"amis":[{"name":"eu-west-2","hvm":"ami-9"},{"name":"us-west-2","pv":"ami-111","hvm":"ami-222"}]}"#;

    fn source_for(server: &ServerGuard) -> HttpManifestSource {
        let config = FeedConfig::with_url(format!("{}/{{}}/coreos_production_ami_all.json", server.url())).unwrap();
        HttpManifestSource::new(config).unwrap()
    }

    #[tokio::test]
    async fn fetches_channel_manifest_with_user_agent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/beta/coreos_production_ami_all.json")
            .match_header("user-agent", FeedConfig::default().user_agent())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(MANIFEST)
            .create_async()
            .await;

        let resolver = AmiResolver::new(source_for(&server));
        let selector = Selector::new("beta", "us-west-2", "hvm").unwrap();

        assert_eq!(resolver.resolve(&selector).await.unwrap(), "ami-222");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn every_resolution_refetches() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/stable/coreos_production_ami_all.json")
            .with_status(200)
            .with_body(MANIFEST)
            .expect(2)
            .create_async()
            .await;

        let resolver = AmiResolver::new(source_for(&server));
        let selector = Selector::new("stable", "us-west-2", "pv").unwrap();

        resolver.resolve(&selector).await.unwrap();
        resolver.resolve(&selector).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_status_is_transport_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/nightly/coreos_production_ami_all.json")
            .with_status(404)
            .create_async()
            .await;

        let err = source_for(&server).fetch("nightly").await.unwrap_err();
        assert!(matches!(err, ResolveError::Transport { ref url, .. } if url.ends_with("/nightly/coreos_production_ami_all.json")));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/stable/coreos_production_ami_all.json")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = source_for(&server).fetch("stable").await.unwrap_err();
        assert!(matches!(err, ResolveError::Decode { .. }));
    }

    #[tokio::test]
    async fn object_without_amis_is_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/stable/coreos_production_ami_all.json")
            .with_status(200)
            .with_body(r#"{"error":"gone"}"#)
            .create_async()
            .await;

        let resolver = AmiResolver::new(source_for(&server));
        let selector = Selector::new("stable", "us-west-2", "pv").unwrap();

        assert!(matches!(resolver.resolve(&selector).await, Err(ResolveError::Decode { .. })));
    }

    #[tokio::test]
    async fn incomplete_entry_does_not_hide_other_regions() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/stable/coreos_production_ami_all.json")
            .with_status(200)
            .with_body(PARTIAL_MANIFEST)
            .expect(3)
            .create_async()
            .await;

        let resolver = AmiResolver::new(source_for(&server));

        let complete = Selector::new("stable", "us-west-2", "hvm").unwrap();
        assert_eq!(resolver.resolve(&complete).await.unwrap(), "ami-222");

        let hvm_only = Selector::new("stable", "eu-west-2", "hvm").unwrap();
        assert_eq!(resolver.resolve(&hvm_only).await.unwrap(), "ami-9");

        let missing_pv = Selector::new("stable", "eu-west-2", "pv").unwrap();
        let err = resolver.resolve(&missing_pv).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { ref region, .. } if region == "eu-west-2"));
        assert_eq!(err.to_string(), "no ami found");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Port 9 (discard) is not expected to be listening locally.
        let config = FeedConfig::with_url("http://127.0.0.1:9/{}/amis.json").unwrap();
        let err = HttpManifestSource::new(config).unwrap().fetch("stable").await.unwrap_err();
        assert!(matches!(err, ResolveError::Transport { .. }));
    }
}
