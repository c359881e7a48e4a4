/// Resource descriptor extraction.
///
/// Turns reflection output into typed resource descriptors, pairs every
/// texture with its `<name><suffix>` sampler and resolves each resource's
/// update frequency. Unsupported categories fail the whole extraction.

use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::Result;
use crate::shader::reflection::{ReflectedResource, ResourceDimension, ShaderInputType};
use crate::shader::shader_desc::{ShaderDesc, ShaderVariableType};

/// Bind point of a resource the compiler did not assign
pub const INVALID_BIND_POINT: u32 = u32::MAX;

// ===== RESOURCE KIND =====

/// Bindable resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ConstantBuffer,
    TextureSrv,
    BufferSrv,
    TextureUav,
    BufferUav,
    Sampler,
}

impl ResourceKind {
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::ConstantBuffer => "constant buffer",
            ResourceKind::TextureSrv => "texture SRV",
            ResourceKind::BufferSrv => "buffer SRV",
            ResourceKind::TextureUav => "texture UAV",
            ResourceKind::BufferUav => "buffer UAV",
            ResourceKind::Sampler => "sampler",
        }
    }
}

// ===== RESOURCE ATTRIBUTES =====

/// Immutable description of one shader resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderResourceAttribs {
    pub name: String,
    pub bind_point: u32,
    pub kind: ResourceKind,
    pub variable_type: ShaderVariableType,
}

impl ShaderResourceAttribs {
    pub fn new(
        name: impl Into<String>,
        bind_point: u32,
        kind: ResourceKind,
        variable_type: ShaderVariableType,
    ) -> Self {
        Self { name: name.into(), bind_point, kind, variable_type }
    }
}

/// Flat extraction result: one entry per bindable resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub attribs: ShaderResourceAttribs,
    /// Sampler paired by name, texture SRVs only
    pub paired_sampler: Option<ShaderResourceAttribs>,
}

// ===== VISITOR =====

/// Receives extracted resources, one callback per kind
///
/// Texture SRVs are reported last, after all samplers have been seen.
pub trait ShaderResourceVisitor {
    fn on_constant_buffer(&mut self, attribs: ShaderResourceAttribs);
    fn on_texture_and_sampler(&mut self, texture: ShaderResourceAttribs, sampler: Option<ShaderResourceAttribs>);
    fn on_texture_uav(&mut self, attribs: ShaderResourceAttribs);
    fn on_buffer_uav(&mut self, attribs: ShaderResourceAttribs);
    fn on_buffer_srv(&mut self, attribs: ShaderResourceAttribs);
}

/// Bindable kind of a reflected resource, `None` for unsupported categories
fn classify(res: &ReflectedResource) -> Option<ResourceKind> {
    let is_buffer = res.dimension == ResourceDimension::Buffer;
    match res.input_type {
        ShaderInputType::ConstantBuffer => Some(ResourceKind::ConstantBuffer),
        ShaderInputType::Texture if is_buffer => Some(ResourceKind::BufferSrv),
        ShaderInputType::Texture => Some(ResourceKind::TextureSrv),
        ShaderInputType::Sampler => Some(ResourceKind::Sampler),
        ShaderInputType::UavRwTyped if is_buffer => Some(ResourceKind::BufferUav),
        ShaderInputType::UavRwTyped => Some(ResourceKind::TextureUav),
        ShaderInputType::UavRwStructured | ShaderInputType::UavRwByteAddress => Some(ResourceKind::BufferUav),
        ShaderInputType::TextureBuffer
        | ShaderInputType::Structured
        | ShaderInputType::ByteAddress
        | ShaderInputType::UavAppendStructured
        | ShaderInputType::UavConsumeStructured
        | ShaderInputType::UavRwStructuredWithCounter => None,
    }
}

/// Walk `resources` and report every bindable resource to `visitor`
///
/// # Errors
///
/// Returns `UnsupportedResource` for tbuffers, (RW) structured buffers with
/// append/consume/counter semantics, read-only structured and byte address
/// buffers. Returns `InvalidResource` when a resource has no bind point, when
/// a name is declared twice for the same kind or when two resources of the
/// same kind share a bind point. Nothing is reported to the visitor on error.
pub fn load_shader_resources<V: ShaderResourceVisitor>(
    resources: &[ReflectedResource],
    desc: &ShaderDesc,
    sampler_suffix: &str,
    visitor: &mut V,
) -> Result<()> {
    // ========== VALIDATION ==========
    let mut classified: Vec<(&ReflectedResource, ResourceKind)> = Vec::with_capacity(resources.len());
    let mut names = FxHashSet::default();
    let mut bind_points: FxHashMap<(ResourceKind, u32), &str> = FxHashMap::default();

    for res in resources {
        let Some(kind) = classify(res) else {
            crate::engine_bail!("galaxy3d::ShaderResourceLoader",
                UnsupportedResource => "Shader '{}' declares {} '{}' which is not supported",
                desc.name, res.input_type.name(), res.name);
        };

        if res.bind_point == INVALID_BIND_POINT {
            crate::engine_bail!("galaxy3d::ShaderResourceLoader",
                InvalidResource => "Shader '{}' declares {} '{}' without a bind point",
                desc.name, kind.name(), res.name);
        }

        if !names.insert((res.name.as_str(), kind)) {
            crate::engine_bail!("galaxy3d::ShaderResourceLoader",
                InvalidResource => "Shader '{}' declares {} '{}' more than once",
                desc.name, kind.name(), res.name);
        }

        if let Some(other) = bind_points.insert((kind, res.bind_point), res.name.as_str()) {
            crate::engine_bail!("galaxy3d::ShaderResourceLoader",
                InvalidResource => "Shader '{}' binds {} '{}' to register {} already used by '{}'",
                desc.name, kind.name(), res.name, res.bind_point, other);
        }

        classified.push((res, kind));
    }

    // ========== REPORT ==========
    let mut samplers: Vec<ShaderResourceAttribs> = Vec::new();
    let mut texture_srvs: Vec<ShaderResourceAttribs> = Vec::new();

    for (res, kind) in classified {
        let variable_type = desc.resolve_variable_type(&res.name);
        let attribs = ShaderResourceAttribs::new(res.name.clone(), res.bind_point, kind, variable_type);

        match kind {
            ResourceKind::ConstantBuffer => visitor.on_constant_buffer(attribs),
            ResourceKind::BufferSrv => visitor.on_buffer_srv(attribs),
            ResourceKind::TextureSrv => texture_srvs.push(attribs),
            ResourceKind::Sampler => samplers.push(attribs),
            ResourceKind::BufferUav => visitor.on_buffer_uav(attribs),
            ResourceKind::TextureUav => visitor.on_texture_uav(attribs),
        }
    }

    // ========== PAIR TEXTURES WITH SAMPLERS ==========
    let mut consumed = vec![false; samplers.len()];
    for texture in texture_srvs {
        let sampler_name = format!("{}{}", texture.name, sampler_suffix);
        let sampler = samplers
            .iter()
            .position(|sampler| sampler.name == sampler_name)
            .map(|index| {
                consumed[index] = true;
                // The sampler follows its texture's update frequency
                ShaderResourceAttribs::new(
                    sampler_name.clone(),
                    samplers[index].bind_point,
                    ResourceKind::Sampler,
                    texture.variable_type,
                )
            });
        visitor.on_texture_and_sampler(texture, sampler);
    }

    for (sampler, _) in samplers.iter().zip(&consumed).filter(|(_, used)| !**used) {
        crate::engine_debug!("galaxy3d::ShaderResourceLoader",
            "Sampler '{}' in shader '{}' is not paired with any texture and is ignored",
            sampler.name, desc.name);
    }

    Ok(())
}

// ===== DESCRIPTOR LIST =====

/// Visitor collecting a flat descriptor list in report order
#[derive(Debug, Default)]
pub struct ResourceDescriptorList {
    pub descriptors: Vec<ResourceDescriptor>,
}

impl ResourceDescriptorList {
    fn push(&mut self, attribs: ShaderResourceAttribs) {
        self.descriptors.push(ResourceDescriptor { attribs, paired_sampler: None });
    }
}

impl ShaderResourceVisitor for ResourceDescriptorList {
    fn on_constant_buffer(&mut self, attribs: ShaderResourceAttribs) {
        self.push(attribs);
    }

    fn on_texture_and_sampler(&mut self, texture: ShaderResourceAttribs, sampler: Option<ShaderResourceAttribs>) {
        self.descriptors.push(ResourceDescriptor { attribs: texture, paired_sampler: sampler });
    }

    fn on_texture_uav(&mut self, attribs: ShaderResourceAttribs) {
        self.push(attribs);
    }

    fn on_buffer_uav(&mut self, attribs: ShaderResourceAttribs) {
        self.push(attribs);
    }

    fn on_buffer_srv(&mut self, attribs: ShaderResourceAttribs) {
        self.push(attribs);
    }
}

/// Both visitors receive every callback, `self.0` first
impl<A: ShaderResourceVisitor, B: ShaderResourceVisitor> ShaderResourceVisitor for (A, B) {
    fn on_constant_buffer(&mut self, attribs: ShaderResourceAttribs) {
        self.0.on_constant_buffer(attribs.clone());
        self.1.on_constant_buffer(attribs);
    }

    fn on_texture_and_sampler(&mut self, texture: ShaderResourceAttribs, sampler: Option<ShaderResourceAttribs>) {
        self.0.on_texture_and_sampler(texture.clone(), sampler.clone());
        self.1.on_texture_and_sampler(texture, sampler);
    }

    fn on_texture_uav(&mut self, attribs: ShaderResourceAttribs) {
        self.0.on_texture_uav(attribs.clone());
        self.1.on_texture_uav(attribs);
    }

    fn on_buffer_uav(&mut self, attribs: ShaderResourceAttribs) {
        self.0.on_buffer_uav(attribs.clone());
        self.1.on_buffer_uav(attribs);
    }

    fn on_buffer_srv(&mut self, attribs: ShaderResourceAttribs) {
        self.0.on_buffer_srv(attribs.clone());
        self.1.on_buffer_srv(attribs);
    }
}

/// Extract the flat descriptor list of a shader
pub fn extract_resource_descriptors(
    resources: &[ReflectedResource],
    desc: &ShaderDesc,
    sampler_suffix: &str,
) -> Result<Vec<ResourceDescriptor>> {
    let mut list = ResourceDescriptorList::default();
    load_shader_resources(resources, desc, sampler_suffix, &mut list)?;
    Ok(list.descriptors)
}

#[cfg(test)]
#[path = "resource_loader_tests.rs"]
mod tests;
