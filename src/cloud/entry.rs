use serde::Deserialize;

use super::VirtualizationType;

/// One region's row in the AMI manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageEntry {
    #[serde(rename = "name")]
    region_name: String,
    #[serde(rename = "pv", default)]
    pv_image_id: String,
    #[serde(rename = "hvm", default)]
    hvm_image_id: String,
}

impl ImageEntry {
    pub fn new(region_name: impl Into<String>, pv_image_id: impl Into<String>, hvm_image_id: impl Into<String>) -> Self {
        Self {
            region_name: region_name.into(),
            pv_image_id: pv_image_id.into(),
            hvm_image_id: hvm_image_id.into(),
        }
    }

    /// AWS region name
    /// eg. us-west-2
    pub fn region_name(&self) -> &str {
        &self.region_name
    }

    pub fn pv_image_id(&self) -> &str {
        &self.pv_image_id
    }

    pub fn hvm_image_id(&self) -> &str {
        &self.hvm_image_id
    }

    /// The image id published for the given virtualization type, verbatim.
    pub fn image_id(&self, virtualization_type: VirtualizationType) -> &str {
        match virtualization_type {
            VirtualizationType::Pv => &self.pv_image_id,
            VirtualizationType::Hvm => &self.hvm_image_id,
        }
    }
}
