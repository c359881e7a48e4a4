/// Binding-slot allocator and root-signature builder.
///
/// Resources are grouped per (variable type, shader stage). Each group owns
/// at most two descriptor tables: one for CBV/SRV/UAV descriptors and one
/// for samplers. Table indices are handed out in first-use order, offsets in
/// allocation order, so the final layout only depends on the order in which
/// shaders and their resources are declared.

use std::hash::{Hash, Hasher};
use rustc_hash::FxHasher;
use crate::binding::resource_cache::ShaderResourceCache;
use crate::binding::slot::{
    BindingSlotAddress, DescriptorHeapType, DescriptorRangeType, DESCRIPTOR_RANGE_TYPE_COUNT, INVALID_INDEX,
};
use crate::error::Result;
use crate::shader::{ShaderResourceAttribs, ShaderType, ShaderVariableType, SHADER_TYPE_COUNT, SHADER_VARIABLE_TYPE_COUNT};

// ===== ALLOCATOR TRAIT =====

/// Assigns binding slots while a layout is cloned
pub trait BindingSlotAllocator {
    /// Allocate the next slot of `attribs`'s group
    ///
    /// # Errors
    ///
    /// Fails when the allocator can no longer accept slots or when the
    /// group's recorded visibility differs from `shader_type`.
    fn allocate_slot(
        &mut self,
        shader_type: ShaderType,
        attribs: &ShaderResourceAttribs,
        range_type: DescriptorRangeType,
    ) -> Result<BindingSlotAddress>;
}

// ===== ROOT PARAMETERS =====

/// One single-descriptor range of a descriptor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorRange {
    pub range_type: DescriptorRangeType,
    /// Shader register (the resource's bind point)
    pub base_register: u32,
    pub num_descriptors: u32,
    pub offset_from_table_start: u32,
}

/// Descriptor table visible to one shader stage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RootParameter {
    visibility: ShaderType,
    ranges: Vec<DescriptorRange>,
}

impl RootParameter {
    pub fn visibility(&self) -> ShaderType {
        self.visibility
    }

    pub fn ranges(&self) -> &[DescriptorRange] {
        &self.ranges
    }

    /// Heap of the table, derived from its first range
    pub fn heap_type(&self) -> Option<DescriptorHeapType> {
        self.ranges.first().map(|range| range.range_type.heap_type())
    }
}

// ===== ALLOCATION BOOKKEEPING =====

#[derive(Debug, Clone)]
struct AllocatedSlot {
    name: String,
    bind_point: u32,
    address: BindingSlotAddress,
}

/// Slots of one (variable type, shader stage) group
#[derive(Debug, Clone)]
struct AllocatedGroup {
    visibility: Option<ShaderType>,
    resource_root_index: u32,
    sampler_root_index: u32,
    total_srv_cbv_uav_slots: u32,
    slots: [Vec<AllocatedSlot>; DESCRIPTOR_RANGE_TYPE_COUNT],
}

impl Default for AllocatedGroup {
    fn default() -> Self {
        Self {
            visibility: None,
            resource_root_index: INVALID_INDEX,
            sampler_root_index: INVALID_INDEX,
            total_srv_cbv_uav_slots: 0,
            slots: Default::default(),
        }
    }
}

// ===== ROOT SIGNATURE =====

/// Slot allocator producing a descriptor-table root signature
#[derive(Debug, Clone)]
pub struct RootSignature {
    groups: [[AllocatedGroup; SHADER_TYPE_COUNT]; SHADER_VARIABLE_TYPE_COUNT],
    parameters: Vec<RootParameter>,
    total_srv_cbv_uav_slots: [u32; SHADER_VARIABLE_TYPE_COUNT],
    total_sampler_slots: [u32; SHADER_VARIABLE_TYPE_COUNT],
    finalized: bool,
}

impl Default for RootSignature {
    fn default() -> Self {
        Self::new()
    }
}

impl RootSignature {
    pub fn new() -> Self {
        Self {
            groups: std::array::from_fn(|_| std::array::from_fn(|_| AllocatedGroup::default())),
            parameters: Vec::new(),
            total_srv_cbv_uav_slots: [0; SHADER_VARIABLE_TYPE_COUNT],
            total_sampler_slots: [0; SHADER_VARIABLE_TYPE_COUNT],
            finalized: false,
        }
    }

    // ===== ACCESSORS =====

    pub fn parameters(&self) -> &[RootParameter] {
        &self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn total_srv_cbv_uav_slots(&self, variable_type: ShaderVariableType) -> u32 {
        self.total_srv_cbv_uav_slots[variable_type.index()]
    }

    pub fn total_sampler_slots(&self, variable_type: ShaderVariableType) -> u32 {
        self.total_sampler_slots[variable_type.index()]
    }

    /// Root indices of the (resource, sampler) tables of a group
    pub fn root_indices(&self, variable_type: ShaderVariableType, shader_type: ShaderType) -> (u32, u32) {
        let group = &self.groups[variable_type.index()][shader_type.index()];
        (group.resource_root_index, group.sampler_root_index)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Deterministic hash of the table layout
    pub fn layout_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.parameters.hash(&mut hasher);
        hasher.finish()
    }

    // ===== FINALIZATION =====

    /// Validate the allocated tables and freeze the signature
    ///
    /// # Errors
    ///
    /// Returns `LayoutValidation` on any inconsistency. Such an error means
    /// the allocator itself is broken; the pipeline cannot be created.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }

        self.verify_groups()?;
        self.verify_parameters()?;

        self.finalized = true;
        crate::engine_debug!("galaxy3d::RootSignature",
            "Root signature finalized: {} tables, layout hash {:#018x}",
            self.parameters.len(), self.layout_hash());
        Ok(())
    }

    /// Cross-check every group against the tables it populated
    fn verify_groups(&self) -> Result<()> {
        for variable_type in ShaderVariableType::ALL {
            let mut srv_cbv_uav_slots = 0u32;
            let mut sampler_slots = 0u32;

            for shader_type in ShaderType::ALL {
                let group = &self.groups[variable_type.index()][shader_type.index()];

                if group.visibility.is_some_and(|visibility| visibility != shader_type) {
                    crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                        "Inconsistent visibility of {} {} group", variable_type.name(), shader_type.name());
                }

                let sampler_count = group.slots[DescriptorRangeType::Sampler.index()].len() as u32;
                if group.total_srv_cbv_uav_slots == 0 && sampler_count != 0 {
                    crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                        "{} {} group has samplers but no resources", variable_type.name(), shader_type.name());
                }

                for range_type in DescriptorRangeType::ALL {
                    let table_index = match range_type {
                        DescriptorRangeType::Sampler => group.sampler_root_index,
                        _ => group.resource_root_index,
                    };
                    let slots = &group.slots[range_type.index()];
                    if slots.is_empty() {
                        continue;
                    }

                    let Some(parameter) = self.parameters.get(table_index as usize) else {
                        crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                            "Table {} referenced by {} {} group does not exist",
                            table_index, variable_type.name(), shader_type.name());
                    };
                    if parameter.visibility != shader_type {
                        crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                            "Table {} has inconsistent shader visibility", table_index);
                    }

                    for slot in slots {
                        let range = parameter.ranges.get(slot.address.offset as usize);
                        let matches = range.is_some_and(|range| {
                            slot.address.table_index == table_index
                                && range.range_type == range_type
                                && range.base_register == slot.bind_point
                                && range.offset_from_table_start == slot.address.offset
                        });
                        if !matches {
                            crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                                "Slot of '{}' does not match its descriptor range", slot.name);
                        }
                    }
                }

                if group.total_srv_cbv_uav_slots != 0 {
                    let table_size = self.parameters
                        .get(group.resource_root_index as usize)
                        .map_or(0, |parameter| parameter.ranges.len() as u32);
                    if table_size != group.total_srv_cbv_uav_slots {
                        crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                            "Inconsistent number of descriptor ranges in table {}", group.resource_root_index);
                    }
                }

                srv_cbv_uav_slots += group.total_srv_cbv_uav_slots;
                sampler_slots += sampler_count;
            }

            if srv_cbv_uav_slots != self.total_srv_cbv_uav_slots[variable_type.index()]
                || sampler_slots != self.total_sampler_slots[variable_type.index()]
            {
                crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                    "Unexpected number of {} slots", variable_type.name());
            }
        }
        Ok(())
    }

    /// Every table non-empty, homogeneous and contiguous from offset 0
    fn verify_parameters(&self) -> Result<()> {
        for (index, parameter) in self.parameters.iter().enumerate() {
            let Some(first) = parameter.ranges.first() else {
                crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                    "Descriptor table {} is empty", index);
            };
            let heap_type = first.range_type.heap_type();

            for (position, range) in parameter.ranges.iter().enumerate() {
                if range.num_descriptors != 1 {
                    crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                        "Range {} of table {} holds {} descriptors, 1 expected",
                        position, index, range.num_descriptors);
                }
                if range.offset_from_table_start != position as u32 {
                    crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                        "Ranges of table {} are not contiguous (range {} at offset {})",
                        index, position, range.offset_from_table_start);
                }
                if range.range_type.heap_type() != heap_type {
                    crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                        "Table {} mixes sampler and resource descriptors", index);
                }
            }
        }
        Ok(())
    }

    // ===== RESOURCE CACHE =====

    /// Size `cache` to hold one table per root parameter
    pub fn init_resource_cache(&self, cache: &mut ShaderResourceCache) {
        cache.set_root_table_count(self.parameters.len());
        for (index, parameter) in self.parameters.iter().enumerate() {
            let heap_type = parameter.heap_type().unwrap_or(DescriptorHeapType::CbvSrvUav);
            cache.init_root_table(index, parameter.ranges.len(), heap_type, Some(parameter.visibility));
        }
    }
}

impl BindingSlotAllocator for RootSignature {
    fn allocate_slot(
        &mut self,
        shader_type: ShaderType,
        attribs: &ShaderResourceAttribs,
        range_type: DescriptorRangeType,
    ) -> Result<BindingSlotAddress> {
        if self.finalized {
            crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                "Cannot allocate a slot for '{}': root signature is finalized", attribs.name);
        }

        let variable_index = attribs.variable_type.index();
        let group = &mut self.groups[variable_index][shader_type.index()];

        match group.visibility {
            None => group.visibility = Some(shader_type),
            Some(visibility) if visibility != shader_type => {
                crate::engine_bail!("galaxy3d::RootSignature", LayoutValidation =>
                    "Inconsistent shader visibility for '{}': table is visible to {}, resource belongs to {}",
                    attribs.name, visibility.name(), shader_type.name());
            }
            Some(_) => {}
        }

        let (root_index, offset) = match range_type {
            DescriptorRangeType::Srv | DescriptorRangeType::Cbv | DescriptorRangeType::Uav => {
                if group.resource_root_index == INVALID_INDEX {
                    group.resource_root_index = self.parameters.len() as u32;
                    self.parameters.push(RootParameter { visibility: shader_type, ranges: Vec::new() });
                }
                let offset = group.total_srv_cbv_uav_slots;
                group.total_srv_cbv_uav_slots += 1;
                self.total_srv_cbv_uav_slots[variable_index] += 1;
                (group.resource_root_index, offset)
            }
            DescriptorRangeType::Sampler => {
                if group.sampler_root_index == INVALID_INDEX {
                    group.sampler_root_index = self.parameters.len() as u32;
                    self.parameters.push(RootParameter { visibility: shader_type, ranges: Vec::new() });
                }
                let offset = group.slots[DescriptorRangeType::Sampler.index()].len() as u32;
                self.total_sampler_slots[variable_index] += 1;
                (group.sampler_root_index, offset)
            }
        };

        let address = BindingSlotAddress::new(root_index, offset);
        group.slots[range_type.index()].push(AllocatedSlot {
            name: attribs.name.clone(),
            bind_point: attribs.bind_point,
            address,
        });

        self.parameters[root_index as usize].ranges.push(DescriptorRange {
            range_type,
            base_register: attribs.bind_point,
            num_descriptors: 1,
            offset_from_table_start: offset,
        });

        Ok(address)
    }
}

#[cfg(test)]
#[path = "root_signature_tests.rs"]
mod tests;
