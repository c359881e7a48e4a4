/// Backend-neutral shader reflection output.
///
/// A `ShaderReflector` turns compiled bytecode into a list of bound
/// resources. The binding layer never looks at bytecode itself.

use crate::error::Result;

/// Category of a bound resource as reported by the shader compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderInputType {
    ConstantBuffer,
    TextureBuffer,
    Texture,
    Sampler,
    UavRwTyped,
    Structured,
    UavRwStructured,
    ByteAddress,
    UavRwByteAddress,
    UavAppendStructured,
    UavConsumeStructured,
    UavRwStructuredWithCounter,
}

impl ShaderInputType {
    pub fn name(self) -> &'static str {
        match self {
            ShaderInputType::ConstantBuffer => "constant buffer",
            ShaderInputType::TextureBuffer => "tbuffer",
            ShaderInputType::Texture => "texture",
            ShaderInputType::Sampler => "sampler",
            ShaderInputType::UavRwTyped => "RW typed UAV",
            ShaderInputType::Structured => "structured buffer",
            ShaderInputType::UavRwStructured => "RW structured buffer",
            ShaderInputType::ByteAddress => "byte address buffer",
            ShaderInputType::UavRwByteAddress => "RW byte address buffer",
            ShaderInputType::UavAppendStructured => "append structured buffer",
            ShaderInputType::UavConsumeStructured => "consume structured buffer",
            ShaderInputType::UavRwStructuredWithCounter => "RW structured buffer with counter",
        }
    }
}

/// View dimension of a bound resource
///
/// Only the buffer/texture distinction matters for binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceDimension {
    Unknown,
    Buffer,
    Texture,
}

/// One bound resource, in the order the compiler declared it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedResource {
    pub name: String,
    pub bind_point: u32,
    pub input_type: ShaderInputType,
    pub dimension: ResourceDimension,
}

impl ReflectedResource {
    pub fn new(
        name: impl Into<String>,
        bind_point: u32,
        input_type: ShaderInputType,
        dimension: ResourceDimension,
    ) -> Self {
        Self { name: name.into(), bind_point, input_type, dimension }
    }
}

/// Reflection backend (SPIR-V, DXBC, ...)
pub trait ShaderReflector: Send + Sync {
    /// Enumerate the resources bound by `bytecode`
    ///
    /// # Errors
    ///
    /// Any failure aborts shader creation.
    fn reflect(&self, bytecode: &[u8]) -> Result<Vec<ReflectedResource>>;
}
