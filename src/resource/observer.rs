use std::fmt;

use log::info;

use super::ResourceData;

/// Lifecycle step about to run against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    Create,
    Read,
    Exists,
    Delete,
}

impl LifecycleStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStep::Create => "create",
            LifecycleStep::Read => "read",
            LifecycleStep::Exists => "exists",
            LifecycleStep::Delete => "delete",
        }
    }
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observability port for resource operations.
pub trait LifecycleObserver: Send + Sync {
    fn on_step(&self, step: LifecycleStep, data: &ResourceData);
}

/// Reports each step through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl LifecycleObserver for LogObserver {
    fn on_step(&self, step: LifecycleStep, data: &ResourceData) {
        info!(
            "calling {step} (channel={} region={} type={})",
            data.channel(),
            data.region(),
            data.virtualization_type()
        );
    }
}
