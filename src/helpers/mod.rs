pub mod fzf_invoker;

use self::fzf_invoker::FzfInvoker;
use anyhow::Result;
use anyhow::bail;

use crate::cloud::{Manifest, VirtualizationType};

/// Release channels offered by the picker. Any other channel name is still
/// accepted on the command line.
pub const KNOWN_CHANNELS: &[&str] = &["stable", "beta", "alpha"];

/// Wrapper around the `termenu` picker that keeps the UX consistent across the
/// project. The helper converts the supplied items into `String`s so callers do
/// not have to worry about ownership.
pub fn choose_one<S: ToString>(title: &str, items: Vec<S>) -> Result<String> {
    let display_items: Vec<String> = items.into_iter().map(|s| s.to_string()).collect();
    let picker = FzfInvoker::new(title.to_string(), display_items);
    match picker.invoke()? {
        Some(choice) => Ok(choice),
        None => bail!("No selection made"),
    }
}

/// Region names from a manifest in feed order, without repeats.
pub fn region_options(manifest: &Manifest) -> Vec<String> {
    let mut regions: Vec<String> = Vec::new();
    for region in manifest.regions() {
        if !regions.iter().any(|r| r == region) {
            regions.push(region.to_string());
        }
    }
    regions
}

pub fn type_options() -> Vec<&'static str> {
    VirtualizationType::ALL.iter().map(|t| t.as_str()).collect()
}
