//! Shader module
//!
//! Shader descriptions, reflection input and resource extraction.

pub mod shader_desc;
pub mod reflection;
pub mod resource_loader;
mod shader;

pub use shader_desc::{
    ShaderType, ShaderTypeFlags, ShaderVariableType,
    ShaderDesc, ShaderVariableDesc,
    SHADER_TYPE_COUNT, SHADER_VARIABLE_TYPE_COUNT,
};
pub use reflection::{
    ShaderInputType, ResourceDimension,
    ReflectedResource, ShaderReflector,
};
pub use resource_loader::{
    ResourceKind, ShaderResourceAttribs, ResourceDescriptor,
    ShaderResourceVisitor, ResourceDescriptorList,
    load_shader_resources, extract_resource_descriptors,
    INVALID_BIND_POINT,
};
pub use shader::Shader;
