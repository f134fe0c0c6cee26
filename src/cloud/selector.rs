use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::resolver::ResolveError;

/// Separator between the three fields of a resource identity.
pub const IDENTITY_SEPARATOR: &str = ":";

/// Supported virtualization types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualizationType {
    Pv,
    Hvm,
}

impl VirtualizationType {
    pub const ALL: [VirtualizationType; 2] = [VirtualizationType::Pv, VirtualizationType::Hvm];

    pub fn as_str(&self) -> &'static str {
        match self {
            VirtualizationType::Pv => "pv",
            VirtualizationType::Hvm => "hvm",
        }
    }
}

impl fmt::Display for VirtualizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VirtualizationType {
    type Err = ResolveError;

    // Matching is exact: "PV" is not "pv".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pv" => Ok(VirtualizationType::Pv),
            "hvm" => Ok(VirtualizationType::Hvm),
            other => Err(ResolveError::InvalidType(other.to_string())),
        }
    }
}

/// The user supplied (channel, region, virtualization type) triple.
///
/// A selector is validated on construction, so holding one means the
/// virtualization type is known good before anything touches the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    channel: String,
    region: String,
    virtualization_type: VirtualizationType,
}

impl Selector {
    pub fn new(
        channel: impl Into<String>,
        region: impl Into<String>,
        virtualization_type: &str,
    ) -> Result<Self, ResolveError> {
        let channel = channel.into();
        if channel.is_empty() {
            return Err(ResolveError::EmptyChannel);
        }

        Ok(Self {
            channel,
            region: region.into(),
            virtualization_type: virtualization_type.parse()?,
        })
    }

    /// CoreOS release channel
    /// eg. stable
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// eg. us-west-2
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn virtualization_type(&self) -> VirtualizationType {
        self.virtualization_type
    }

    pub fn identity(&self) -> String {
        derive_identity(&self.channel, &self.region, self.virtualization_type.as_str())
    }
}

/// Build the `<channel>:<region>:<type>` identity for a resource.
///
/// Depends on the three selector fields only, never on the resolved image id.
/// A channel or region containing `:` can collide with another selector.
pub fn derive_identity(channel: &str, region: &str, virtualization_type: &str) -> String {
    [channel, region, virtualization_type].join(IDENTITY_SEPARATOR)
}
