/// Mock device objects for unit tests (no GPU required)
///
/// Every mock receives a unique, non-null descriptor handle.

#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(test)]
use crate::device::{BindFlags, DescriptorHandle, DeviceObject, DeviceObjectKind, ViewType};
#[cfg(test)]
use crate::error::Result;
#[cfg(test)]
use crate::shader::{ReflectedResource, ShaderReflector};

#[cfg(test)]
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0x1000);

#[cfg(test)]
fn next_handle() -> DescriptorHandle {
    DescriptorHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
}

// ============================================================================
// Mock Buffer
// ============================================================================

#[cfg(test)]
#[derive(Debug)]
pub struct MockBuffer {
    pub name: String,
    pub bind_flags: BindFlags,
    pub handle: DescriptorHandle,
}

#[cfg(test)]
impl MockBuffer {
    pub fn new(name: &str, bind_flags: BindFlags) -> Self {
        Self { name: name.to_string(), bind_flags, handle: next_handle() }
    }

    /// Buffer usable as a constant buffer
    pub fn uniform(name: &str) -> Arc<dyn DeviceObject> {
        Arc::new(Self::new(name, BindFlags::UNIFORM_BUFFER))
    }
}

#[cfg(test)]
impl DeviceObject for MockBuffer {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> DeviceObjectKind {
        DeviceObjectKind::Buffer
    }
    fn descriptor_handle(&self) -> DescriptorHandle {
        self.handle
    }
    fn bind_flags(&self) -> BindFlags {
        self.bind_flags
    }
}

// ============================================================================
// Mock Sampler
// ============================================================================

#[cfg(test)]
#[derive(Debug)]
pub struct MockSampler {
    pub name: String,
    pub handle: DescriptorHandle,
}

#[cfg(test)]
impl MockSampler {
    pub fn new(name: &str) -> Arc<dyn DeviceObject> {
        Arc::new(Self { name: name.to_string(), handle: next_handle() })
    }
}

#[cfg(test)]
impl DeviceObject for MockSampler {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> DeviceObjectKind {
        DeviceObjectKind::Sampler
    }
    fn descriptor_handle(&self) -> DescriptorHandle {
        self.handle
    }
}

// ============================================================================
// Mock Texture View
// ============================================================================

#[cfg(test)]
pub struct MockTextureView {
    pub name: String,
    pub view_type: ViewType,
    pub handle: DescriptorHandle,
    pub sampler: Option<Arc<dyn DeviceObject>>,
}

#[cfg(test)]
impl MockTextureView {
    /// Shader resource view with an attached sampler
    pub fn srv(name: &str) -> Arc<dyn DeviceObject> {
        let sampler = MockSampler::new(&format!("{}_sampler", name));
        Arc::new(Self {
            name: name.to_string(),
            view_type: ViewType::ShaderResource,
            handle: next_handle(),
            sampler: Some(sampler),
        })
    }

    /// Shader resource view without a sampler
    pub fn srv_without_sampler(name: &str) -> Arc<dyn DeviceObject> {
        Arc::new(Self {
            name: name.to_string(),
            view_type: ViewType::ShaderResource,
            handle: next_handle(),
            sampler: None,
        })
    }

    pub fn uav(name: &str) -> Arc<dyn DeviceObject> {
        Arc::new(Self {
            name: name.to_string(),
            view_type: ViewType::UnorderedAccess,
            handle: next_handle(),
            sampler: None,
        })
    }
}

#[cfg(test)]
impl DeviceObject for MockTextureView {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> DeviceObjectKind {
        DeviceObjectKind::TextureView(self.view_type)
    }
    fn descriptor_handle(&self) -> DescriptorHandle {
        self.handle
    }
    fn sampler(&self) -> Option<Arc<dyn DeviceObject>> {
        self.sampler.clone()
    }
}

// ============================================================================
// Mock Buffer View
// ============================================================================

#[cfg(test)]
#[derive(Debug)]
pub struct MockBufferView {
    pub name: String,
    pub view_type: ViewType,
    pub handle: DescriptorHandle,
}

#[cfg(test)]
impl MockBufferView {
    pub fn srv(name: &str) -> Arc<dyn DeviceObject> {
        Arc::new(Self { name: name.to_string(), view_type: ViewType::ShaderResource, handle: next_handle() })
    }

    pub fn uav(name: &str) -> Arc<dyn DeviceObject> {
        Arc::new(Self { name: name.to_string(), view_type: ViewType::UnorderedAccess, handle: next_handle() })
    }
}

#[cfg(test)]
impl DeviceObject for MockBufferView {
    fn name(&self) -> &str {
        &self.name
    }
    fn kind(&self) -> DeviceObjectKind {
        DeviceObjectKind::BufferView(self.view_type)
    }
    fn descriptor_handle(&self) -> DescriptorHandle {
        self.handle
    }
}

// ============================================================================
// Mock Reflector
// ============================================================================

/// Reflector returning a fixed resource list, whatever the bytecode
#[cfg(test)]
pub struct MockReflector {
    pub resources: Vec<ReflectedResource>,
}

#[cfg(test)]
impl MockReflector {
    pub fn new(resources: Vec<ReflectedResource>) -> Self {
        Self { resources }
    }
}

#[cfg(test)]
impl ShaderReflector for MockReflector {
    fn reflect(&self, bytecode: &[u8]) -> Result<Vec<ReflectedResource>> {
        if bytecode.is_empty() {
            crate::engine_bail!("galaxy3d::MockReflector", ReflectionFailed => "Empty bytecode");
        }
        Ok(self.resources.clone())
    }
}
