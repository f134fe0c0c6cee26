mod models;

use std::{fs, path::Path};

use log::debug;

pub use models::{DEFAULT_URL_TEMPLATE, FeedConfig};

impl FeedConfig {
    /// Build a config pointing at a custom manifest template.
    pub fn with_url(url: impl Into<String>) -> Result<Self, FeedError> {
        let config = Self {
            url: url.into(),
            ..Self::default()
        };
        config.validate()
    }

    /// Load from a JSON file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        debug!("loading feed config from {}", path.display());
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Load from a JSON string. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, FeedError> {
        let parsed: FeedConfig = serde_json::from_str(json)?;
        parsed.validate()
    }

    /// Load from an env var containing JSON.
    pub fn from_env(var: &str) -> Result<Self, FeedError> {
        let s = std::env::var(var).map_err(|_| FeedError::MissingEnv(var.to_string()))?;
        Self::from_json_str(&s)
    }

    /// Substitute the channel into the template.
    ///
    /// The channel goes in verbatim (first placeholder only); nothing is
    /// escaped, so an odd channel just produces a URL that fails to fetch.
    pub fn manifest_url(&self, channel: &str) -> String {
        self.url.replacen(models::PLACEHOLDER, channel, 1)
    }

    fn validate(self) -> Result<Self, FeedError> {
        if !self.url.contains(models::PLACEHOLDER) {
            return Err(FeedError::MissingPlaceholder(self.url));
        }
        url::Url::parse(&self.manifest_url("stable")).map_err(|source| FeedError::InvalidUrl {
            template: self.url.clone(),
            source,
        })?;
        Ok(self)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("missing env var: {0}")]
    MissingEnv(String),
    #[error("feed URL '{0}' must contain '{{}}' placeholder")]
    MissingPlaceholder(String),
    #[error("feed URL '{template}' is not a valid URL: {source}")]
    InvalidUrl {
        template: String,
        #[source]
        source: url::ParseError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
