//! Resolve CoreOS AMI ids from the per-channel release manifest and expose the
//! result as a `coreos_ami` resource with create/read/exists/delete semantics.

pub mod cloud;
pub mod feeds;
pub mod helpers;
pub mod resolver;
pub mod resource;
pub mod state;

pub use cloud::{ImageEntry, Manifest, Selector, VirtualizationType, derive_identity};
pub use feeds::{FeedConfig, FeedError};
pub use resolver::{AmiResolver, HttpManifestSource, ManifestSource, ResolveError, find_image};
pub use resource::{AmiResource, Plan, ResolvedResource, Resource, ResourceData};
pub use state::{StateStore, StateError};
