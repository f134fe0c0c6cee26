use serde::{Deserialize, Serialize};

/// Template of the channel manifest location; `{}` is replaced by the channel.
pub const DEFAULT_URL_TEMPLATE: &str = "http://{}.release.core-os.net/amd64-usr/current/coreos_production_ami_all.json";

pub const PLACEHOLDER: &str = "{}";

fn default_url() -> String {
    DEFAULT_URL_TEMPLATE.to_string()
}

fn default_user_agent() -> String {
    concat!("coreos-ami-rust/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Where and how to fetch AMI manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_url")]
    pub(crate) url: String,
    #[serde(default = "default_user_agent")]
    pub(crate) user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl FeedConfig {
    // Borrowing getters (no clones).
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
