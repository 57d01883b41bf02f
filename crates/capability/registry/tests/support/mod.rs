#![allow(dead_code)]

use std::sync::Arc;

use parking_registry::{DeviceRegistry, ThresholdService};
use parking_storage::{InMemoryDeviceDirectory, InMemoryThresholdStore};

pub struct Fixture {
    pub directory: Arc<InMemoryDeviceDirectory>,
    pub thresholds: Arc<ThresholdService>,
    pub registry: DeviceRegistry,
}

pub fn fixture() -> Fixture {
    let directory = Arc::new(InMemoryDeviceDirectory::new());
    let thresholds = Arc::new(ThresholdService::new(Arc::new(InMemoryThresholdStore::new())));
    let registry = DeviceRegistry::new(directory.clone(), thresholds.clone());
    Fixture {
        directory,
        thresholds,
        registry,
    }
}
