/// Device objects as seen by the binding layer.
///
/// Buffers, views and samplers are created by the backend device. The binding
/// layer only needs their kind (to validate a binding), their native
/// descriptor handle (to commit it) and, for texture views, the sampler the
/// view was created with.

use std::fmt;
use std::sync::Arc;
use bitflags::bitflags;

// ===== DESCRIPTOR HANDLE =====

/// Opaque native descriptor handle (CPU descriptor, GL name, ...)
///
/// Zero is the null handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DescriptorHandle(pub u64);

impl DescriptorHandle {
    pub const NULL: DescriptorHandle = DescriptorHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for DescriptorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DescriptorHandle({:#x})", self.0)
    }
}

// ===== OBJECT KIND =====

/// How a view exposes its resource to shaders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewType {
    ShaderResource,
    UnorderedAccess,
}

/// Kind of a device object, used to validate bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceObjectKind {
    Buffer,
    TextureView(ViewType),
    BufferView(ViewType),
    Sampler,
}

impl DeviceObjectKind {
    pub fn name(self) -> &'static str {
        match self {
            DeviceObjectKind::Buffer => "buffer",
            DeviceObjectKind::TextureView(ViewType::ShaderResource) => "texture SRV",
            DeviceObjectKind::TextureView(ViewType::UnorderedAccess) => "texture UAV",
            DeviceObjectKind::BufferView(ViewType::ShaderResource) => "buffer SRV",
            DeviceObjectKind::BufferView(ViewType::UnorderedAccess) => "buffer UAV",
            DeviceObjectKind::Sampler => "sampler",
        }
    }
}

bitflags! {
    /// How a buffer may be bound to the pipeline
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BindFlags: u32 {
        const UNIFORM_BUFFER   = 1 << 0;
        const SHADER_RESOURCE  = 1 << 1;
        const UNORDERED_ACCESS = 1 << 2;
    }
}

// ===== DEVICE OBJECT TRAIT =====

/// Backend object that can be bound to a shader variable
pub trait DeviceObject: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> DeviceObjectKind;

    /// Native handle written into the resource cache
    fn descriptor_handle(&self) -> DescriptorHandle;

    /// Bind flags of the underlying buffer (empty for non-buffers)
    fn bind_flags(&self) -> BindFlags {
        BindFlags::empty()
    }

    /// Sampler attached to a texture view, if any
    fn sampler(&self) -> Option<Arc<dyn DeviceObject>> {
        None
    }
}

impl fmt::Debug for dyn DeviceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceObject")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("handle", &self.descriptor_handle())
            .finish()
    }
}

/// Identity comparison of two bound objects (data pointer only)
pub fn same_object(a: &Arc<dyn DeviceObject>, b: &Arc<dyn DeviceObject>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
