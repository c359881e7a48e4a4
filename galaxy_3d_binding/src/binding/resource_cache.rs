/// Resource cache: the live bindings of one layout or binding instance.
///
/// The cache is a list of root tables, each a fixed-size list of cached
/// resources. Tables are sized once, either from a finalized root signature
/// or from the artificial one-table-per-range-type layout. Any access past
/// that size is a layout/cache mismatch: it is logged, counted and served by
/// growing the storage.

use std::sync::{Arc, RwLock};
use crate::binding::shader_resource_layout::ShaderResourceLayout;
use crate::binding::slot::{BindingSlotAddress, CachedResourceType, DescriptorHeapType, DescriptorRangeType, ResourceState};
use crate::device::{DescriptorHandle, DeviceObject};
use crate::shader::{ShaderType, ShaderVariableType};

/// Cache shared between a binding and the layouts that write into it
pub type SharedResourceCache = Arc<RwLock<ShaderResourceCache>>;

// ===== CACHED RESOURCE =====

/// One slot: type tag, native handle and the object keeping it alive
///
/// `res_type == Unknown` iff `object.is_none()` iff the handle is null.
#[derive(Debug, Clone, Default)]
pub struct CachedResource {
    pub res_type: CachedResourceType,
    pub descriptor_handle: DescriptorHandle,
    pub object: Option<Arc<dyn DeviceObject>>,
}

impl CachedResource {
    pub fn is_bound(&self) -> bool {
        self.object.is_some()
    }

    pub fn set(&mut self, res_type: CachedResourceType, object: Arc<dyn DeviceObject>) {
        self.res_type = res_type;
        self.descriptor_handle = object.descriptor_handle();
        self.object = Some(object);
    }

    pub fn reset(&mut self) {
        *self = CachedResource::default();
    }
}

// ===== ROOT TABLE =====

#[derive(Debug, Clone)]
pub struct RootTable {
    resources: Vec<CachedResource>,
    heap_type: DescriptorHeapType,
    shader_type: Option<ShaderType>,
}

impl Default for RootTable {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
            heap_type: DescriptorHeapType::CbvSrvUav,
            shader_type: None,
        }
    }
}

impl RootTable {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn heap_type(&self) -> DescriptorHeapType {
        self.heap_type
    }

    pub fn shader_type(&self) -> Option<ShaderType> {
        self.shader_type
    }

    pub fn resource(&self, offset: u32) -> Option<&CachedResource> {
        self.resources.get(offset as usize)
    }

    pub fn resources(&self) -> &[CachedResource] {
        &self.resources
    }
}

// ===== COMMIT DATA =====

/// Location of one table's descriptors in the commit lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedTable {
    pub root_index: u32,
    pub heap_type: DescriptorHeapType,
    /// Index of the table's first handle in its heap list
    pub first_descriptor: u32,
    pub descriptor_count: u32,
}

/// State a bound object must be transitioned to before the draw
#[derive(Debug, Clone)]
pub struct ResourceTransition {
    pub object: Arc<dyn DeviceObject>,
    pub state: ResourceState,
}

/// Everything the command context needs to commit the cache
#[derive(Debug, Clone, Default)]
pub struct DescriptorCommit {
    pub cbv_srv_uav: Vec<DescriptorHandle>,
    pub samplers: Vec<DescriptorHandle>,
    pub tables: Vec<CommittedTable>,
    pub transitions: Vec<ResourceTransition>,
}

// ===== SHADER RESOURCE CACHE =====

#[derive(Debug, Clone, Default)]
pub struct ShaderResourceCache {
    tables: Vec<RootTable>,
    unexpected_growths: u32,
}

impl ShaderResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a cache for sharing between layouts
    pub fn into_shared(self) -> SharedResourceCache {
        Arc::new(RwLock::new(self))
    }

    // ===== SIZING =====

    /// Set the number of root tables (new tables are empty)
    pub fn set_root_table_count(&mut self, count: usize) {
        self.tables.resize_with(count, RootTable::default);
    }

    /// Size and tag one table; existing bindings are kept
    pub fn init_root_table(
        &mut self,
        index: usize,
        size: usize,
        heap_type: DescriptorHeapType,
        shader_type: Option<ShaderType>,
    ) {
        if index >= self.tables.len() {
            self.tables.resize_with(index + 1, RootTable::default);
        }
        let table = &mut self.tables[index];
        table.resources.resize_with(size, CachedResource::default);
        table.heap_type = heap_type;
        table.shader_type = shader_type;
    }

    pub fn root_table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn root_table(&self, index: usize) -> Option<&RootTable> {
        self.tables.get(index)
    }

    /// Number of times an access had to grow the storage
    ///
    /// Non-zero means the cache does not match the layout writing into it.
    pub fn unexpected_growth_count(&self) -> u32 {
        self.unexpected_growths
    }

    // ===== SLOT ACCESS =====

    /// Read a slot (out-of-range addresses read as None)
    pub fn resource(&self, slot: BindingSlotAddress) -> Option<&CachedResource> {
        if !slot.is_valid() {
            return None;
        }
        self.tables.get(slot.table_index as usize)?.resource(slot.offset)
    }

    /// True iff an object is bound at `slot`
    pub fn is_bound(&self, slot: BindingSlotAddress) -> bool {
        self.resource(slot).is_some_and(CachedResource::is_bound)
    }

    /// Writable slot, growing the storage if the address is out of range
    ///
    /// Returns None only for an invalid address.
    pub(crate) fn resource_mut(
        &mut self,
        slot: BindingSlotAddress,
        heap_type: DescriptorHeapType,
        shader_type: Option<ShaderType>,
    ) -> Option<&mut CachedResource> {
        if !slot.is_valid() {
            crate::engine_error!("galaxy3d::ShaderResourceCache",
                "Attempt to access the cache through an unallocated slot address");
            return None;
        }

        let table_index = slot.table_index as usize;
        if table_index >= self.tables.len() {
            crate::engine_error!("galaxy3d::ShaderResourceCache",
                "Unexpected: no space is allocated for root table at index {}", table_index);
            self.unexpected_growths += 1;
            self.tables.resize_with(table_index + 1, || RootTable {
                heap_type,
                shader_type,
                ..RootTable::default()
            });
        }

        let table = &mut self.tables[table_index];
        let offset = slot.offset as usize;
        if offset >= table.resources.len() {
            crate::engine_error!("galaxy3d::ShaderResourceCache",
                "Unexpected: root table {} is not large enough to store descriptor at offset {}",
                table_index, offset);
            self.unexpected_growths += 1;
            table.resources.resize_with(offset + 1, CachedResource::default);
        }

        if table.heap_type != heap_type {
            crate::engine_error!("galaxy3d::ShaderResourceCache",
                "Inconsistent descriptor heap type for root table {}", table_index);
        }
        if shader_type.is_some() && table.shader_type.is_some() && table.shader_type != shader_type {
            crate::engine_error!("galaxy3d::ShaderResourceCache",
                "Inconsistent shader type for root table {}", table_index);
        }

        Some(&mut table.resources[offset])
    }

    /// Store `object` at `slot` (last write wins)
    pub fn set_resource(
        &mut self,
        slot: BindingSlotAddress,
        heap_type: DescriptorHeapType,
        res_type: CachedResourceType,
        object: Arc<dyn DeviceObject>,
    ) {
        let shader_type = self.root_table(slot.table_index as usize).and_then(RootTable::shader_type);
        if let Some(resource) = self.resource_mut(slot, heap_type, shader_type) {
            resource.set(res_type, object);
        }
    }

    /// Clear `slot`; out-of-range addresses are ignored
    pub fn reset_resource(&mut self, slot: BindingSlotAddress) {
        if !slot.is_valid() {
            return;
        }
        if let Some(resource) = self
            .tables
            .get_mut(slot.table_index as usize)
            .and_then(|table| table.resources.get_mut(slot.offset as usize))
        {
            resource.reset();
        }
    }

    // ===== STATIC PROPAGATION =====

    /// Copy every static resource of `layout` from `src` into `dst`
    ///
    /// `src` is addressed with the artificial layout (table = range type,
    /// offset = bind point), `dst` with the slots recorded in `layout`.
    /// Every destination slot takes its source verbatim; unset sources are
    /// logged and clear the destination.
    pub fn copy_static_resources(
        src: &ShaderResourceCache,
        dst: &mut ShaderResourceCache,
        layout: &ShaderResourceLayout,
    ) {
        let shader_type = Some(layout.shader_type());
        let samplers = layout.samplers(ShaderVariableType::Static);

        for variable in layout.variables(ShaderVariableType::Static) {
            let attribs = variable.attribs();
            let src_slot = BindingSlotAddress::artificial(variable.range_type(), attribs.bind_point);

            let src_res = src.resource(src_slot).cloned().unwrap_or_default();
            if !src_res.is_bound() {
                crate::engine_error!("galaxy3d::ShaderResourceCache",
                    "No resource assigned to static shader variable '{}' in shader '{}'",
                    attribs.name, layout.shader_name());
            }
            if let Some(dst_res) = dst.resource_mut(variable.slot(), variable.range_type().heap_type(), shader_type) {
                *dst_res = src_res;
            }

            let Some(sampler) = variable.sampler_id().and_then(|id| samplers.get(id)) else {
                continue;
            };
            let src_sampler_slot = BindingSlotAddress::artificial(DescriptorRangeType::Sampler, sampler.attribs().bind_point);
            let src_sam = src.resource(src_sampler_slot).cloned().unwrap_or_default();
            if !src_sam.is_bound() {
                crate::engine_error!("galaxy3d::ShaderResourceCache",
                    "No sampler assigned to static shader variable '{}' in shader '{}'",
                    attribs.name, layout.shader_name());
            }
            if let Some(dst_sam) = dst.resource_mut(sampler.slot(), DescriptorHeapType::Sampler, shader_type) {
                *dst_sam = src_sam;
            }
        }
    }

    // ===== COMMIT =====

    /// Gather native handles table by table, in root-index order
    ///
    /// Empty slots are reported and committed as null handles so that table
    /// offsets stay aligned.
    pub fn native_handles_for_commit(&self) -> DescriptorCommit {
        let mut commit = DescriptorCommit::default();

        for (root_index, table) in self.tables.iter().enumerate() {
            if table.is_empty() {
                continue;
            }

            let handles = match table.heap_type {
                DescriptorHeapType::CbvSrvUav => &mut commit.cbv_srv_uav,
                DescriptorHeapType::Sampler => &mut commit.samplers,
            };
            commit.tables.push(CommittedTable {
                root_index: root_index as u32,
                heap_type: table.heap_type,
                first_descriptor: handles.len() as u32,
                descriptor_count: table.resources.len() as u32,
            });

            for (offset, resource) in table.resources.iter().enumerate() {
                if resource.descriptor_handle.is_null() {
                    crate::engine_error!("galaxy3d::ShaderResourceCache",
                        "No valid {} descriptor handle found for root table {}, slot {}",
                        match table.heap_type {
                            DescriptorHeapType::CbvSrvUav => "CbvSrvUav",
                            DescriptorHeapType::Sampler => "sampler",
                        },
                        root_index, offset);
                }
                handles.push(resource.descriptor_handle);

                if let (Some(object), Some(state)) = (&resource.object, resource.res_type.required_state()) {
                    commit.transitions.push(ResourceTransition { object: object.clone(), state });
                }
            }
        }

        commit
    }
}

#[cfg(test)]
#[path = "resource_cache_tests.rs"]
mod tests;
