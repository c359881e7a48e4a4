/// Name → device object registry consumed by bulk binding.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::device::device_object::DeviceObject;

#[derive(Default)]
pub struct ResourceMapping {
    resources: FxHashMap<String, Arc<dyn DeviceObject>>,
}

impl ResourceMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the object registered under `name`
    ///
    /// Returns the object previously registered under that name.
    pub fn add(&mut self, name: impl Into<String>, object: Arc<dyn DeviceObject>) -> Option<Arc<dyn DeviceObject>> {
        self.resources.insert(name.into(), object)
    }

    /// Builder-style variant of `add`
    pub fn with(mut self, name: impl Into<String>, object: Arc<dyn DeviceObject>) -> Self {
        self.add(name, object);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn DeviceObject>> {
        self.resources.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn DeviceObject>> {
        self.resources.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn clear(&mut self) {
        self.resources.clear();
    }
}

#[cfg(test)]
#[path = "resource_mapping_tests.rs"]
mod tests;
