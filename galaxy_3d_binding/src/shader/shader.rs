/// Shader object: reflection result, full layout and static resources.
///
/// Static variables are bound once on the shader, into a cache laid out
/// with one table per range type. Every binding instance created later
/// copies them from there.

use crate::binding::{
    BindShaderResourcesFlags, ShaderResourceCache, ShaderResourceLayout, ShaderVariable, SharedResourceCache,
    SlotAssignment,
};
use crate::device::ResourceMapping;
use crate::engine::Engine;
use crate::error::Result;
use crate::shader::reflection::{ReflectedResource, ShaderReflector};
use crate::shader::resource_loader::ResourceDescriptor;
use crate::shader::shader_desc::{ShaderDesc, ShaderType, ShaderVariableType};

#[derive(Debug)]
pub struct Shader {
    desc: ShaderDesc,
    resources: Vec<ResourceDescriptor>,
    /// Every variable, no slots
    layout: ShaderResourceLayout,
    /// Static variables only, artificial slots into `static_cache`
    static_layout: ShaderResourceLayout,
    static_cache: SharedResourceCache,
}

impl Shader {
    /// Reflect `bytecode` and build the shader's layouts
    ///
    /// # Errors
    ///
    /// Fails if reflection fails or if the shader declares an unsupported
    /// or duplicated resource.
    pub fn new(desc: ShaderDesc, bytecode: &[u8], reflector: &dyn ShaderReflector) -> Result<Self> {
        let reflected = reflector.reflect(bytecode)?;
        Self::from_reflection(desc, &reflected)
    }

    /// Build the shader from an already reflected resource list
    pub fn from_reflection(desc: ShaderDesc, reflected: &[ReflectedResource]) -> Result<Self> {
        let sampler_suffix = Engine::config().sampler_suffix;
        let (layout, resources) = ShaderResourceLayout::parse_with_descriptors(&desc, reflected, &sampler_suffix)?;

        let static_cache = ShaderResourceCache::new().into_shared();
        let static_layout = ShaderResourceLayout::clone_layout(
            &layout,
            &[ShaderVariableType::Static],
            Some(static_cache.clone()),
            SlotAssignment::Artificial,
        )?;

        crate::engine_info!("galaxy3d::Shader",
            "Shader '{}' ({}) created with {} resources ({} static)",
            desc.name, desc.shader_type.name(), resources.len(), static_layout.variable_count());

        Ok(Self { desc, resources, layout, static_layout, static_cache })
    }

    pub fn desc(&self) -> &ShaderDesc {
        &self.desc
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn shader_type(&self) -> ShaderType {
        self.desc.shader_type
    }

    /// Bindable resources in report order
    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    pub fn layout(&self) -> &ShaderResourceLayout {
        &self.layout
    }

    pub fn static_layout(&self) -> &ShaderResourceLayout {
        &self.static_layout
    }

    pub fn static_cache(&self) -> &SharedResourceCache {
        &self.static_cache
    }

    /// Static variable by name (dummy and one error if unknown)
    pub fn static_variable(&self, name: &str) -> ShaderVariable<'_> {
        self.static_layout.get_variable(name)
    }

    /// Bind the static variables from `mapping`
    pub fn bind_static_resources(&self, mapping: &ResourceMapping, flags: BindShaderResourcesFlags) {
        self.static_layout.bind_resources(mapping, flags);
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
