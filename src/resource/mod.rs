//! The `coreos_ami` resource as seen by a provisioning host.
//!
//! The host owns persistence and calls the four lifecycle operations; this
//! module only turns the stored attributes into a resolved AMI id and an
//! identity string.

mod observer;
pub mod schema;

pub use observer::{LifecycleObserver, LifecycleStep, LogObserver};
pub use schema::{FieldSchema, schema};

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cloud::{Selector, derive_identity};
use crate::resolver::{AmiResolver, ManifestSource, ResolveError};

/// Attribute bag for one resource instance.
///
/// `id == None` means the resource is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceData {
    channel: String,
    region: String,
    virtualization_type: String,
    ami: Option<String>,
    id: Option<String>,
}

impl Default for ResourceData {
    fn default() -> Self {
        Self::from_inputs(&BTreeMap::new())
    }
}

impl ResourceData {
    pub fn new(channel: impl Into<String>, region: impl Into<String>, virtualization_type: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            region: region.into(),
            virtualization_type: virtualization_type.into(),
            ami: None,
            id: None,
        }
    }

    /// Build from user inputs, filling unset attributes with schema defaults.
    pub fn from_inputs(inputs: &BTreeMap<String, String>) -> Self {
        let get = |name: &str| {
            inputs
                .get(name)
                .cloned()
                .or_else(|| schema::default_for(name).map(str::to_string))
                .unwrap_or_default()
        };

        Self::new(get(schema::CHANNEL), get(schema::REGION), get(schema::TYPE))
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn virtualization_type(&self) -> &str {
        &self.virtualization_type
    }

    pub fn ami(&self) -> Option<&str> {
        self.ami.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.id.is_some()
    }

    pub fn selector(&self) -> Result<Selector, ResolveError> {
        Selector::new(self.channel.as_str(), self.region.as_str(), &self.virtualization_type)
    }

    /// Identity for the current inputs; never looks at `ami`.
    pub fn derived_identity(&self) -> String {
        derive_identity(&self.channel, &self.region, &self.virtualization_type)
    }

    /// The durable record, if the resource is present.
    pub fn to_resolved(&self) -> Option<ResolvedResource> {
        let id = self.id.clone()?;
        Some(ResolvedResource {
            id,
            channel: self.channel.clone(),
            region: self.region.clone(),
            virtualization_type: self.virtualization_type.clone(),
            ami: self.ami.clone().unwrap_or_default(),
        })
    }

    fn inputs_differ(&self, other: &ResourceData) -> bool {
        self.channel != other.channel
            || self.region != other.region
            || self.virtualization_type != other.virtualization_type
    }
}

impl From<ResolvedResource> for ResourceData {
    fn from(resolved: ResolvedResource) -> Self {
        Self {
            channel: resolved.channel,
            region: resolved.region,
            virtualization_type: resolved.virtualization_type,
            ami: Some(resolved.ami),
            id: Some(resolved.id),
        }
    }
}

/// What the host stores for a present resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedResource {
    pub id: String,
    pub channel: String,
    pub region: String,
    #[serde(rename = "type")]
    pub virtualization_type: String,
    pub ami: String,
}

/// How to get from stored state to the desired inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Create,
    Keep,
    /// Every input is force-new, so any change means destroy then create.
    Replace,
}

pub fn plan(stored: Option<&ResourceData>, desired: &ResourceData) -> Plan {
    match stored {
        Some(stored) if stored.is_present() => {
            if stored.inputs_differ(desired) {
                Plan::Replace
            } else {
                Plan::Keep
            }
        }
        _ => Plan::Create,
    }
}

/// Lifecycle callbacks a provisioning host drives.
#[async_trait]
pub trait Resource: Send + Sync {
    async fn create(&self, data: &mut ResourceData) -> Result<(), ResolveError>;
    async fn read(&self, data: &mut ResourceData) -> Result<(), ResolveError>;
    fn exists(&self, data: &ResourceData) -> Result<bool, ResolveError>;
    fn delete(&self, data: &mut ResourceData) -> Result<(), ResolveError>;
}

/// `coreos_ami`: resolves the channel/region/type inputs to an AMI id.
pub struct AmiResource<S> {
    resolver: AmiResolver<S>,
    observer: Box<dyn LifecycleObserver>,
}

impl<S: ManifestSource> AmiResource<S> {
    pub fn new(resolver: AmiResolver<S>) -> Self {
        Self::with_observer(resolver, Box::new(LogObserver))
    }

    pub fn with_observer(resolver: AmiResolver<S>, observer: Box<dyn LifecycleObserver>) -> Self {
        Self { resolver, observer }
    }

    pub fn resolver(&self) -> &AmiResolver<S> {
        &self.resolver
    }

    // Shared by create and read. `data` is only written once resolution
    // succeeded, so a failure leaves the previous record in place.
    async fn refresh(&self, data: &mut ResourceData) -> Result<(), ResolveError> {
        let selector = data.selector()?;
        let ami = self.resolver.resolve(&selector).await?;
        data.ami = Some(ami);
        data.id = Some(selector.identity());
        Ok(())
    }
}

#[async_trait]
impl<S: ManifestSource> Resource for AmiResource<S> {
    async fn create(&self, data: &mut ResourceData) -> Result<(), ResolveError> {
        self.observer.on_step(LifecycleStep::Create, data);
        self.refresh(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<(), ResolveError> {
        self.observer.on_step(LifecycleStep::Read, data);
        self.refresh(data).await
    }

    /// Compares identities only; does not check the image still resolves.
    fn exists(&self, data: &ResourceData) -> Result<bool, ResolveError> {
        self.observer.on_step(LifecycleStep::Exists, data);
        Ok(data.id() == Some(data.derived_identity().as_str()))
    }

    fn delete(&self, data: &mut ResourceData) -> Result<(), ResolveError> {
        self.observer.on_step(LifecycleStep::Delete, data);
        debug!("forgetting {}", data.id().unwrap_or("<absent>"));
        data.id = None;
        data.ami = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{ImageEntry, Manifest};
    use crate::resolver::tests::{StaticSource, sample_manifest};
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<LifecycleStep>>>);

    impl LifecycleObserver for Recorder {
        fn on_step(&self, step: LifecycleStep, _data: &ResourceData) {
            self.0.lock().unwrap().push(step);
        }
    }

    fn resource() -> AmiResource<StaticSource> {
        AmiResource::new(AmiResolver::new(StaticSource::new(sample_manifest())))
    }

    #[test]
    fn defaults_fill_missing_inputs() {
        let data = ResourceData::default();
        assert_eq!(data.channel(), "stable");
        assert_eq!(data.region(), "us-west-2");
        assert_eq!(data.virtualization_type(), "pv");
        assert!(!data.is_present());

        let mut inputs = BTreeMap::new();
        inputs.insert("type".to_string(), "hvm".to_string());
        let data = ResourceData::from_inputs(&inputs);
        assert_eq!(data.virtualization_type(), "hvm");
        assert_eq!(data.channel(), "stable");
    }

    #[tokio::test]
    async fn create_sets_ami_and_identity() {
        let resource = resource();
        let mut data = ResourceData::new("stable", "us-west-2", "pv");

        resource.create(&mut data).await.unwrap();

        assert_eq!(data.ami(), Some("ami-111"));
        assert_eq!(data.id(), Some("stable:us-west-2:pv"));
        assert!(resource.exists(&data).unwrap());
    }

    #[tokio::test]
    async fn failed_create_persists_nothing() {
        let resource = resource();
        let mut data = ResourceData::new("stable", "eu-west-1", "pv");

        let err = resource.create(&mut data).await.unwrap_err();

        assert!(matches!(err, ResolveError::NotFound { .. }));
        assert_eq!(data, ResourceData::new("stable", "eu-west-1", "pv"));
    }

    #[tokio::test]
    async fn invalid_type_fails_before_fetch() {
        let resource = resource();
        let mut data = ResourceData::new("stable", "nowhere-1", "bogus");

        let err = resource.create(&mut data).await.unwrap_err();

        assert!(matches!(err, ResolveError::InvalidType(ref t) if t == "bogus"));
        assert_eq!(resource.resolver().source().fetch_count(), 0);
    }

    #[tokio::test]
    async fn read_updates_ami_but_not_identity() {
        let resource = resource();
        let mut data = ResourceData::new("stable", "us-west-2", "hvm");
        resource.create(&mut data).await.unwrap();
        let id = data.id().map(str::to_string);

        resource
            .resolver()
            .source()
            .replace(Manifest::new(vec![ImageEntry::new("us-west-2", "ami-333", "ami-444")]));
        resource.read(&mut data).await.unwrap();

        assert_eq!(data.ami(), Some("ami-444"));
        assert_eq!(data.id().map(str::to_string), id);
    }

    #[tokio::test]
    async fn failed_read_keeps_last_known_record() {
        let resource = resource();
        let mut data = ResourceData::new("stable", "us-west-2", "pv");
        resource.create(&mut data).await.unwrap();
        let before = data.clone();

        resource.resolver().source().replace(Manifest::default());
        assert!(resource.read(&mut data).await.is_err());

        assert_eq!(data, before);
    }

    #[tokio::test]
    async fn delete_is_local_and_makes_absent() {
        let resource = resource();
        let mut data = ResourceData::new("stable", "us-west-2", "pv");
        resource.create(&mut data).await.unwrap();
        let fetches = resource.resolver().source().fetch_count();

        resource.delete(&mut data).unwrap();

        assert!(!data.is_present());
        assert_eq!(data.ami(), None);
        assert!(!resource.exists(&data).unwrap());
        assert_eq!(resource.resolver().source().fetch_count(), fetches);
    }

    #[test]
    fn exists_compares_stored_identity_to_inputs() {
        let resource = resource();
        let stored = ResolvedResource {
            id: "stable:us-west-2:pv".to_string(),
            channel: "stable".to_string(),
            region: "us-west-2".to_string(),
            virtualization_type: "pv".to_string(),
            ami: "ami-gone".to_string(),
        };
        assert!(resource.exists(&stored.clone().into()).unwrap());

        let drifted = ResolvedResource {
            id: "beta:us-west-2:pv".to_string(),
            ..stored
        };
        assert!(!resource.exists(&drifted.into()).unwrap());
        assert_eq!(resource.resolver().source().fetch_count(), 0);
    }

    #[tokio::test]
    async fn observer_sees_every_step() {
        let recorder = Recorder::default();
        let resource = AmiResource::with_observer(
            AmiResolver::new(StaticSource::new(sample_manifest())),
            Box::new(recorder.clone()),
        );
        let mut data = ResourceData::default();

        resource.create(&mut data).await.unwrap();
        resource.read(&mut data).await.unwrap();
        resource.exists(&data).unwrap();
        resource.delete(&mut data).unwrap();

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![LifecycleStep::Create, LifecycleStep::Read, LifecycleStep::Exists, LifecycleStep::Delete]
        );
    }

    #[test]
    fn any_input_change_plans_replacement() {
        let mut stored = ResourceData::from(ResolvedResource {
            id: "stable:us-west-2:pv".to_string(),
            channel: "stable".to_string(),
            region: "us-west-2".to_string(),
            virtualization_type: "pv".to_string(),
            ami: "ami-111".to_string(),
        });

        assert_eq!(plan(None, &ResourceData::default()), Plan::Create);
        assert_eq!(plan(Some(&stored), &ResourceData::new("stable", "us-west-2", "pv")), Plan::Keep);
        assert_eq!(plan(Some(&stored), &ResourceData::new("beta", "us-west-2", "pv")), Plan::Replace);
        assert_eq!(plan(Some(&stored), &ResourceData::new("stable", "us-east-1", "pv")), Plan::Replace);
        assert_eq!(plan(Some(&stored), &ResourceData::new("stable", "us-west-2", "hvm")), Plan::Replace);

        stored.id = None;
        assert_eq!(plan(Some(&stored), &ResourceData::default()), Plan::Create);
    }

    #[test]
    fn resolved_record_uses_type_key() {
        let data = ResourceData::from(ResolvedResource {
            id: "stable:us-west-2:hvm".to_string(),
            channel: "stable".to_string(),
            region: "us-west-2".to_string(),
            virtualization_type: "hvm".to_string(),
            ami: "ami-222".to_string(),
        });

        let json = serde_json::to_value(data.to_resolved().unwrap()).unwrap();
        assert_eq!(json["type"], "hvm");
        assert_eq!(json["id"], "stable:us-west-2:hvm");
        assert!(ResourceData::default().to_resolved().is_none());
    }
}
