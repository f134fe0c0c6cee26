use serde::Deserialize;

/// Decoded form of a channel's `coreos_production_ami_all.json`.
///
/// Entries keep the order in which the feed lists them; lookups rely on that
/// order to pick the first match when a region appears more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    amis: Vec<super::ImageEntry>,
}

impl Manifest {
    pub fn new(amis: Vec<super::ImageEntry>) -> Self {
        Self { amis }
    }

    /// Borrow the entries in feed order.
    pub fn entries(&self) -> &[super::ImageEntry] {
        &self.amis
    }

    /// Region names in feed order, duplicates included.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.amis.iter().map(|entry| entry.region_name())
    }
}
