/// Shader resource layout: the named variables of one shader stage.
///
/// A full layout is parsed from reflection and owned by its shader; it has
/// no slots and no cache. Filtered clones select some update frequencies,
/// receive slot addresses (allocated, reused or artificial) and write into a
/// resource cache shared with the binding that owns them.
///
/// Variables are stored per update frequency in plain vectors that are
/// never modified after construction; the name index stores positions into
/// them, and a texture finds its sampler by position as well.

use std::sync::Arc;
use bitflags::bitflags;
use rustc_hash::FxHashMap;
use crate::binding::resource_cache::{ShaderResourceCache, SharedResourceCache};
use crate::binding::root_signature::BindingSlotAllocator;
use crate::binding::shader_variable::ShaderVariable;
use crate::binding::slot::{BindingSlotAddress, CachedResourceType, DescriptorHeapType, DescriptorRangeType, DESCRIPTOR_RANGE_TYPE_COUNT};
use crate::device::{same_object, BindFlags, DeviceObject, DeviceObjectKind, ResourceMapping, ViewType};
use crate::error::Result;
use crate::shader::{
    load_shader_resources, ReflectedResource, ResourceDescriptor, ResourceDescriptorList, ShaderDesc,
    ShaderResourceAttribs, ShaderResourceVisitor, ShaderType, ShaderVariableType, SHADER_VARIABLE_TYPE_COUNT,
};

bitflags! {
    /// Behavior of bulk binding from a resource mapping
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BindShaderResourcesFlags: u32 {
        /// Unbind every variable before binding
        const RESET_BINDINGS    = 1 << 0;
        /// Only bind variables that are still unbound
        const UPDATE_UNRESOLVED = 1 << 1;
        /// Report variables the mapping cannot resolve
        const ALL_RESOLVED      = 1 << 2;
    }
}

// ===== VARIABLES =====

/// One CBV/SRV/UAV variable and its slot
#[derive(Debug, Clone)]
pub struct BoundVariable {
    attribs: Arc<ShaderResourceAttribs>,
    res_type: CachedResourceType,
    range_type: DescriptorRangeType,
    slot: BindingSlotAddress,
    /// Position of the paired sampler in the layout's sampler list
    sampler_id: Option<usize>,
}

impl BoundVariable {
    fn new(attribs: Arc<ShaderResourceAttribs>) -> Self {
        Self {
            res_type: CachedResourceType::from_kind(attribs.kind),
            range_type: DescriptorRangeType::from_kind(attribs.kind),
            attribs,
            slot: BindingSlotAddress::INVALID,
            sampler_id: None,
        }
    }

    pub fn attribs(&self) -> &ShaderResourceAttribs {
        &self.attribs
    }

    pub fn name(&self) -> &str {
        &self.attribs.name
    }

    pub fn res_type(&self) -> CachedResourceType {
        self.res_type
    }

    pub fn range_type(&self) -> DescriptorRangeType {
        self.range_type
    }

    pub fn slot(&self) -> BindingSlotAddress {
        self.slot
    }

    pub fn sampler_id(&self) -> Option<usize> {
        self.sampler_id
    }
}

/// Sampler paired with a texture SRV
#[derive(Debug, Clone)]
pub struct SamplerSlot {
    attribs: Arc<ShaderResourceAttribs>,
    slot: BindingSlotAddress,
}

impl SamplerSlot {
    pub fn attribs(&self) -> &ShaderResourceAttribs {
        &self.attribs
    }

    pub fn slot(&self) -> BindingSlotAddress {
        self.slot
    }
}

// ===== SLOT ASSIGNMENT =====

/// How a clone obtains the slot addresses of its variables
pub enum SlotAssignment<'a> {
    /// Keep the addresses already recorded in the source layout
    Reuse,
    /// One table per descriptor range type, offset = shader register
    Artificial,
    /// Ask an allocator (root signature) for fresh addresses
    Allocate(&'a mut dyn BindingSlotAllocator),
}

// ===== PARSING =====

#[derive(Default)]
struct LayoutBuilder {
    variables: [Vec<BoundVariable>; SHADER_VARIABLE_TYPE_COUNT],
    samplers: [Vec<SamplerSlot>; SHADER_VARIABLE_TYPE_COUNT],
}

impl LayoutBuilder {
    fn add(&mut self, attribs: ShaderResourceAttribs) {
        let var_type = attribs.variable_type.index();
        self.variables[var_type].push(BoundVariable::new(Arc::new(attribs)));
    }
}

impl ShaderResourceVisitor for LayoutBuilder {
    fn on_constant_buffer(&mut self, attribs: ShaderResourceAttribs) {
        self.add(attribs);
    }

    fn on_texture_and_sampler(&mut self, texture: ShaderResourceAttribs, sampler: Option<ShaderResourceAttribs>) {
        let var_type = texture.variable_type.index();
        let mut variable = BoundVariable::new(Arc::new(texture));
        if let Some(sampler) = sampler {
            variable.sampler_id = Some(self.samplers[var_type].len());
            self.samplers[var_type].push(SamplerSlot {
                attribs: Arc::new(sampler),
                slot: BindingSlotAddress::INVALID,
            });
        }
        self.variables[var_type].push(variable);
    }

    fn on_texture_uav(&mut self, attribs: ShaderResourceAttribs) {
        self.add(attribs);
    }

    fn on_buffer_uav(&mut self, attribs: ShaderResourceAttribs) {
        self.add(attribs);
    }

    fn on_buffer_srv(&mut self, attribs: ShaderResourceAttribs) {
        self.add(attribs);
    }
}

// ===== LAYOUT =====

#[derive(Debug)]
pub struct ShaderResourceLayout {
    shader_name: String,
    shader_type: ShaderType,
    variables: [Vec<BoundVariable>; SHADER_VARIABLE_TYPE_COUNT],
    samplers: [Vec<SamplerSlot>; SHADER_VARIABLE_TYPE_COUNT],
    variable_index: FxHashMap<String, (ShaderVariableType, usize)>,
    cache: Option<SharedResourceCache>,
}

impl ShaderResourceLayout {
    /// Build the full layout of a shader from its reflection data
    ///
    /// No slot is assigned and no cache is attached.
    pub fn parse(desc: &ShaderDesc, reflected: &[ReflectedResource], sampler_suffix: &str) -> Result<Self> {
        let mut builder = LayoutBuilder::default();
        load_shader_resources(reflected, desc, sampler_suffix, &mut builder)?;
        Ok(Self::from_builder(desc, builder))
    }

    /// Same as [`parse`](Self::parse), also returning the flat descriptor
    /// list collected during the same reflection walk
    pub fn parse_with_descriptors(
        desc: &ShaderDesc,
        reflected: &[ReflectedResource],
        sampler_suffix: &str,
    ) -> Result<(Self, Vec<ResourceDescriptor>)> {
        let mut visitors = (LayoutBuilder::default(), ResourceDescriptorList::default());
        load_shader_resources(reflected, desc, sampler_suffix, &mut visitors)?;
        let (builder, list) = visitors;
        Ok((Self::from_builder(desc, builder), list.descriptors))
    }

    fn from_builder(desc: &ShaderDesc, builder: LayoutBuilder) -> Self {
        let mut layout = Self {
            shader_name: desc.name.clone(),
            shader_type: desc.shader_type,
            variables: builder.variables,
            samplers: builder.samplers,
            variable_index: FxHashMap::default(),
            cache: None,
        };
        layout.build_variable_index();

        crate::engine_debug!("galaxy3d::ShaderResourceLayout",
            "Parsed shader '{}' ({}): {} static, {} mutable, {} dynamic variables",
            layout.shader_name, layout.shader_type.name(),
            layout.variables[0].len(), layout.variables[1].len(), layout.variables[2].len());
        layout
    }

    /// Copy the variables of `source` whose type is in `allowed_types`
    ///
    /// # Errors
    ///
    /// Fails if the allocator rejects a slot, if `Reuse` meets a variable
    /// without a slot, or if `Artificial` is requested without a cache.
    pub fn clone_layout(
        source: &ShaderResourceLayout,
        allowed_types: &[ShaderVariableType],
        cache: Option<SharedResourceCache>,
        mut assignment: SlotAssignment<'_>,
    ) -> Result<Self> {
        let mut variables: [Vec<BoundVariable>; SHADER_VARIABLE_TYPE_COUNT] = Default::default();
        let mut samplers: [Vec<SamplerSlot>; SHADER_VARIABLE_TYPE_COUNT] = Default::default();

        for var_type in ShaderVariableType::ALL {
            if !allowed_types.contains(&var_type) {
                continue;
            }
            let vt = var_type.index();
            variables[vt].reserve_exact(source.variables[vt].len());
            samplers[vt].reserve_exact(source.samplers[vt].len());

            for src_var in &source.variables[vt] {
                let mut variable = src_var.clone();
                variable.slot = Self::assign_slot(source, &mut assignment, &src_var.attribs, src_var.range_type, src_var.slot)?;

                // The sampler is copied along with its texture and re-linked
                // to its position in this layout's list
                variable.sampler_id = None;
                if let Some(src_sampler) = src_var.sampler_id.and_then(|id| source.samplers[vt].get(id)) {
                    let slot = Self::assign_slot(
                        source,
                        &mut assignment,
                        &src_sampler.attribs,
                        DescriptorRangeType::Sampler,
                        src_sampler.slot,
                    )?;
                    variable.sampler_id = Some(samplers[vt].len());
                    samplers[vt].push(SamplerSlot { attribs: src_sampler.attribs.clone(), slot });
                }

                variables[vt].push(variable);
            }
        }

        let mut layout = Self {
            shader_name: source.shader_name.clone(),
            shader_type: source.shader_type,
            variables,
            samplers,
            variable_index: FxHashMap::default(),
            cache,
        };

        if matches!(assignment, SlotAssignment::Artificial) {
            layout.init_artificial_cache()?;
        }
        layout.build_variable_index();
        Ok(layout)
    }

    fn assign_slot(
        source: &ShaderResourceLayout,
        assignment: &mut SlotAssignment<'_>,
        attribs: &ShaderResourceAttribs,
        range_type: DescriptorRangeType,
        source_slot: BindingSlotAddress,
    ) -> Result<BindingSlotAddress> {
        match assignment {
            SlotAssignment::Allocate(allocator) => allocator.allocate_slot(source.shader_type, attribs, range_type),
            SlotAssignment::Artificial => Ok(BindingSlotAddress::artificial(range_type, attribs.bind_point)),
            SlotAssignment::Reuse => {
                if !source_slot.is_valid() {
                    crate::engine_bail!("galaxy3d::ShaderResourceLayout", InvalidResource =>
                        "Variable '{}' in shader '{}' has no allocated slot to reuse",
                        attribs.name, source.shader_name);
                }
                Ok(source_slot)
            }
        }
    }

    /// Size the cache tables of the artificial layout: max register + 1
    fn init_artificial_cache(&self) -> Result<()> {
        let Some(cache) = &self.cache else {
            crate::engine_bail!("galaxy3d::ShaderResourceLayout", InvalidResource =>
                "Artificial slot assignment in shader '{}' requires a resource cache", self.shader_name);
        };

        let mut table_sizes = [0usize; DESCRIPTOR_RANGE_TYPE_COUNT];
        for vt in 0..SHADER_VARIABLE_TYPE_COUNT {
            let resources = self.variables[vt].iter().map(|var| (var.range_type, var.slot));
            let samplers = self.samplers[vt].iter().map(|sam| (DescriptorRangeType::Sampler, sam.slot));
            for (range_type, slot) in resources.chain(samplers) {
                let size = &mut table_sizes[range_type.index()];
                *size = (*size).max(slot.offset as usize + 1);
            }
        }

        let Ok(mut cache) = cache.write() else {
            crate::engine_bail!("galaxy3d::ShaderResourceLayout",
                "Resource cache lock poisoned while initializing shader '{}'", self.shader_name);
        };
        if cache.root_table_count() < DESCRIPTOR_RANGE_TYPE_COUNT {
            cache.set_root_table_count(DESCRIPTOR_RANGE_TYPE_COUNT);
        }
        for range_type in DescriptorRangeType::ALL {
            let index = range_type.index();
            let size = table_sizes[index].max(cache.root_table(index).map_or(0, |table| table.len()));
            cache.init_root_table(index, size, range_type.heap_type(), Some(self.shader_type));
        }
        Ok(())
    }

    fn build_variable_index(&mut self) {
        let mut index = FxHashMap::default();
        for var_type in ShaderVariableType::ALL {
            for (position, variable) in self.variables[var_type.index()].iter().enumerate() {
                index.entry(variable.attribs.name.clone()).or_insert((var_type, position));
            }
        }
        self.variable_index = index;
    }

    // ===== ACCESSORS =====

    pub fn shader_name(&self) -> &str {
        &self.shader_name
    }

    pub fn shader_type(&self) -> ShaderType {
        self.shader_type
    }

    pub fn variables(&self, var_type: ShaderVariableType) -> &[BoundVariable] {
        &self.variables[var_type.index()]
    }

    pub fn samplers(&self, var_type: ShaderVariableType) -> &[SamplerSlot] {
        &self.samplers[var_type.index()]
    }

    pub fn variable(&self, var_type: ShaderVariableType, index: usize) -> Option<&BoundVariable> {
        self.variables[var_type.index()].get(index)
    }

    /// Sampler paired with a texture variable
    pub fn sampler_of(&self, var_type: ShaderVariableType, index: usize) -> Option<&SamplerSlot> {
        let sampler_id = self.variable(var_type, index)?.sampler_id?;
        self.samplers[var_type.index()].get(sampler_id)
    }

    pub fn variable_count(&self) -> usize {
        self.variables.iter().map(Vec::len).sum()
    }

    /// Position of a variable, by exact name
    pub fn find_variable(&self, name: &str) -> Option<(ShaderVariableType, usize)> {
        self.variable_index.get(name).copied()
    }

    pub fn resource_cache(&self) -> Option<&SharedResourceCache> {
        self.cache.as_ref()
    }

    // ===== VARIABLE ACCESS =====

    /// Variable handle by exact name
    ///
    /// An unknown name is logged once and yields a dummy variable whose
    /// writes are discarded.
    pub fn get_variable(&self, name: &str) -> ShaderVariable<'_> {
        match self.find_variable(name) {
            Some((var_type, index)) => ShaderVariable::new(self, var_type, index),
            None => {
                crate::engine_error!("galaxy3d::ShaderResourceLayout",
                    "Shader variable '{}' is not found in shader '{}' ({}). Attempts to set the variable will be silently ignored.",
                    name, self.shader_name, self.shader_type.name());
                ShaderVariable::dummy()
            }
        }
    }

    /// Bind (or unbind with None) the variable at `index`
    pub fn set_variable(&self, var_type: ShaderVariableType, index: usize, object: Option<&Arc<dyn DeviceObject>>) {
        let Some(variable) = self.variable(var_type, index) else {
            crate::engine_error!("galaxy3d::ShaderResourceLayout",
                "Variable index {} is out of range in shader '{}'", index, self.shader_name);
            return;
        };
        self.with_cache(|cache| self.bind_variable(cache, var_type, variable, object));
    }

    pub fn is_variable_bound(&self, var_type: ShaderVariableType, index: usize) -> bool {
        let Some(variable) = self.variable(var_type, index) else {
            return false;
        };
        self.read_cache(|cache| cache.is_bound(variable.slot)).unwrap_or(false)
    }

    // ===== BULK BINDING =====

    /// Bind every variable whose name `mapping` resolves
    ///
    /// Failures are logged per variable; the others still bind.
    pub fn bind_resources(&self, mapping: &ResourceMapping, flags: BindShaderResourcesFlags) {
        self.with_cache(|cache| {
            for var_type in ShaderVariableType::ALL {
                for variable in &self.variables[var_type.index()] {
                    if flags.contains(BindShaderResourcesFlags::RESET_BINDINGS) {
                        self.bind_variable(cache, var_type, variable, None);
                    }

                    if flags.contains(BindShaderResourcesFlags::UPDATE_UNRESOLVED) && cache.is_bound(variable.slot) {
                        continue;
                    }

                    match mapping.get(variable.name()) {
                        Some(object) => self.bind_variable(cache, var_type, variable, Some(object)),
                        None => {
                            if flags.contains(BindShaderResourcesFlags::ALL_RESOLVED) && !cache.is_bound(variable.slot) {
                                crate::engine_error!("galaxy3d::ShaderResourceLayout",
                                    "Cannot bind resource to shader variable '{}' in shader '{}': resource not found in the resource mapping",
                                    variable.name(), self.shader_name);
                            }
                        }
                    }
                }
            }
        });
    }

    // ===== STATIC PROPAGATION =====

    /// Copy this layout's static resources from `src_cache` (artificial layout)
    pub fn copy_static_resources(&self, src_cache: &SharedResourceCache) {
        let Some(dst_cache) = &self.cache else {
            crate::engine_error!("galaxy3d::ShaderResourceLayout",
                "Destination layout of shader '{}' has no resource cache", self.shader_name);
            return;
        };
        if Arc::ptr_eq(src_cache, dst_cache) {
            crate::engine_error!("galaxy3d::ShaderResourceLayout",
                "Static resources of shader '{}' cannot be copied into their own cache", self.shader_name);
            return;
        }

        let (Ok(src), Ok(mut dst)) = (src_cache.read(), dst_cache.write()) else {
            crate::engine_error!("galaxy3d::ShaderResourceLayout",
                "Resource cache lock poisoned while copying static resources of shader '{}'", self.shader_name);
            return;
        };
        ShaderResourceCache::copy_static_resources(&src, &mut dst, self);
    }

    // ===== VERIFICATION =====

    /// Log every unbound variable and missing sampler; returns their count
    pub fn verify_bindings(&self) -> usize {
        self.read_cache(|cache| {
            let mut problems = 0;
            for var_type in ShaderVariableType::ALL {
                for variable in &self.variables[var_type.index()] {
                    if !cache.is_bound(variable.slot) {
                        crate::engine_error!("galaxy3d::ShaderResourceLayout",
                            "No resource is bound to {} variable '{}' in shader '{}'",
                            var_type.name(), variable.name(), self.shader_name);
                        problems += 1;
                    }
                    let sampler = variable.sampler_id.and_then(|id| self.samplers[var_type.index()].get(id));
                    if let Some(sampler) = sampler {
                        if !cache.is_bound(sampler.slot) {
                            crate::engine_error!("galaxy3d::ShaderResourceLayout",
                                "No sampler is assigned to texture variable '{}' in shader '{}'",
                                variable.name(), self.shader_name);
                            problems += 1;
                        }
                    }
                }
            }
            problems
        })
        .unwrap_or(0)
    }

    // ===== INTERNALS =====

    fn with_cache<R>(&self, f: impl FnOnce(&mut ShaderResourceCache) -> R) -> Option<R> {
        let Some(cache) = &self.cache else {
            crate::engine_error!("galaxy3d::ShaderResourceLayout",
                "Resource layout of shader '{}' has no resource cache", self.shader_name);
            return None;
        };
        match cache.write() {
            Ok(mut guard) => Some(f(&mut guard)),
            Err(_) => {
                crate::engine_error!("galaxy3d::ShaderResourceLayout",
                    "Resource cache lock poisoned in shader '{}'", self.shader_name);
                None
            }
        }
    }

    fn read_cache<R>(&self, f: impl FnOnce(&ShaderResourceCache) -> R) -> Option<R> {
        let cache = self.cache.as_ref()?;
        cache.read().ok().map(|guard| f(&guard))
    }

    /// Why `object` cannot be bound to a variable of type `res_type`
    fn binding_error(res_type: CachedResourceType, object: &dyn DeviceObject) -> Option<String> {
        let kind = object.kind();
        match res_type {
            CachedResourceType::Cbv => match kind {
                DeviceObjectKind::Buffer if object.bind_flags().contains(BindFlags::UNIFORM_BUFFER) => None,
                DeviceObjectKind::Buffer => Some("Buffer was not created with UNIFORM_BUFFER flag.".to_string()),
                _ => Some("Incorrect resource type: buffer is expected.".to_string()),
            },
            CachedResourceType::TexSrv => Self::expect_kind(kind, DeviceObjectKind::TextureView(ViewType::ShaderResource)),
            CachedResourceType::TexUav => Self::expect_kind(kind, DeviceObjectKind::TextureView(ViewType::UnorderedAccess)),
            CachedResourceType::BufSrv => Self::expect_kind(kind, DeviceObjectKind::BufferView(ViewType::ShaderResource)),
            CachedResourceType::BufUav => Self::expect_kind(kind, DeviceObjectKind::BufferView(ViewType::UnorderedAccess)),
            CachedResourceType::Sampler => Self::expect_kind(kind, DeviceObjectKind::Sampler),
            CachedResourceType::Unknown => Some("Variable has no resource type.".to_string()),
        }
    }

    fn expect_kind(actual: DeviceObjectKind, expected: DeviceObjectKind) -> Option<String> {
        (actual != expected).then(|| format!("Incorrect resource type: {} is expected.", expected.name()))
    }

    /// Single binding entry point, dispatched on the variable's resource type
    fn bind_variable(
        &self,
        cache: &mut ShaderResourceCache,
        var_type: ShaderVariableType,
        variable: &BoundVariable,
        object: Option<&Arc<dyn DeviceObject>>,
    ) {
        let shader_type = Some(self.shader_type);
        let heap_type = variable.range_type.heap_type();
        let sampler = variable.sampler_id.and_then(|id| self.samplers[var_type.index()].get(id));

        let Some(object) = object else {
            if var_type == ShaderVariableType::Static && cache.is_bound(variable.slot) {
                crate::engine_error!("galaxy3d::ShaderResourceLayout",
                    "Shader variable '{}' in shader '{}' is static but being unbound. This is an error and may cause unpredicted behavior.",
                    variable.name(), self.shader_name);
            }
            cache.reset_resource(variable.slot);
            if let Some(sampler) = sampler {
                cache.reset_resource(sampler.slot);
            }
            return;
        };

        if let Some(reason) = Self::binding_error(variable.res_type, object.as_ref()) {
            crate::engine_error!("galaxy3d::ShaderResourceLayout",
                "Failed to bind {} '{}' to variable '{}' in shader '{}'. {}",
                object.kind().name(), object.name(), variable.name(), self.shader_name, reason);
            return;
        }

        let Some(dst) = cache.resource_mut(variable.slot, heap_type, shader_type) else {
            return;
        };
        if var_type != ShaderVariableType::Dynamic {
            if let Some(bound) = dst.object.as_ref().filter(|bound| !same_object(bound, object)) {
                crate::engine_warn!("galaxy3d::ShaderResourceLayout",
                    "Non-null resource '{}' is already bound to {} shader variable '{}' in shader '{}'. Binding '{}' overwrites it; use another shader resource binding instance or label the variable as dynamic.",
                    bound.name(), var_type.name(), variable.name(), self.shader_name, object.name());
            }
        }
        dst.set(variable.res_type, object.clone());

        if variable.res_type != CachedResourceType::TexSrv {
            return;
        }
        let Some(sampler) = sampler else {
            return;
        };
        match object.sampler() {
            Some(sampler_object) => {
                if let Some(dst_sampler) = cache.resource_mut(sampler.slot, DescriptorHeapType::Sampler, shader_type) {
                    dst_sampler.set(CachedResourceType::Sampler, sampler_object);
                }
            }
            None => {
                crate::engine_error!("galaxy3d::ShaderResourceLayout",
                    "Failed to bind sampler to variable '{}'. Sampler is not set in the texture view '{}'",
                    sampler.attribs.name, object.name());
            }
        }
    }
}

#[cfg(test)]
#[path = "shader_resource_layout_tests.rs"]
mod tests;
