/// Slot addressing shared by the allocator, the layouts and the cache.

use crate::shader::ResourceKind;

/// Sentinel for an unallocated table index or offset
pub const INVALID_INDEX: u32 = u32::MAX;

// ===== SLOT ADDRESS =====

/// Location of one descriptor: root table index + offset inside the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingSlotAddress {
    pub table_index: u32,
    pub offset: u32,
}

impl BindingSlotAddress {
    pub const INVALID: BindingSlotAddress = BindingSlotAddress {
        table_index: INVALID_INDEX,
        offset: INVALID_INDEX,
    };

    /// Both parts must be valid, or both invalid
    pub fn new(table_index: u32, offset: u32) -> Self {
        debug_assert_eq!(
            table_index == INVALID_INDEX,
            offset == INVALID_INDEX,
            "Partially assigned slot address ({}, {})",
            table_index,
            offset
        );
        Self { table_index, offset }
    }

    /// Address used by caches without a root signature: one table per range
    /// type, indexed by shader register
    pub fn artificial(range_type: DescriptorRangeType, bind_point: u32) -> Self {
        Self::new(range_type.index() as u32, bind_point)
    }

    pub fn is_valid(&self) -> bool {
        self.table_index != INVALID_INDEX && self.offset != INVALID_INDEX
    }
}

impl Default for BindingSlotAddress {
    fn default() -> Self {
        Self::INVALID
    }
}

// ===== DESCRIPTOR RANGES =====

/// Number of descriptor range types (tables of an artificial layout)
pub const DESCRIPTOR_RANGE_TYPE_COUNT: usize = 4;

/// Descriptor range type of a table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorRangeType {
    Srv,
    Uav,
    Cbv,
    Sampler,
}

impl DescriptorRangeType {
    pub const ALL: [DescriptorRangeType; DESCRIPTOR_RANGE_TYPE_COUNT] = [
        DescriptorRangeType::Srv,
        DescriptorRangeType::Uav,
        DescriptorRangeType::Cbv,
        DescriptorRangeType::Sampler,
    ];

    pub fn index(self) -> usize {
        match self {
            DescriptorRangeType::Srv => 0,
            DescriptorRangeType::Uav => 1,
            DescriptorRangeType::Cbv => 2,
            DescriptorRangeType::Sampler => 3,
        }
    }

    pub fn from_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::ConstantBuffer => DescriptorRangeType::Cbv,
            ResourceKind::TextureSrv | ResourceKind::BufferSrv => DescriptorRangeType::Srv,
            ResourceKind::TextureUav | ResourceKind::BufferUav => DescriptorRangeType::Uav,
            ResourceKind::Sampler => DescriptorRangeType::Sampler,
        }
    }

    pub fn heap_type(self) -> DescriptorHeapType {
        match self {
            DescriptorRangeType::Sampler => DescriptorHeapType::Sampler,
            _ => DescriptorHeapType::CbvSrvUav,
        }
    }
}

/// Descriptor heap a table lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorHeapType {
    CbvSrvUav,
    Sampler,
}

// ===== CACHED RESOURCE TYPE =====

/// Type tag of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CachedResourceType {
    #[default]
    Unknown,
    Cbv,
    TexSrv,
    BufSrv,
    TexUav,
    BufUav,
    Sampler,
}

impl CachedResourceType {
    pub fn from_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::ConstantBuffer => CachedResourceType::Cbv,
            ResourceKind::TextureSrv => CachedResourceType::TexSrv,
            ResourceKind::BufferSrv => CachedResourceType::BufSrv,
            ResourceKind::TextureUav => CachedResourceType::TexUav,
            ResourceKind::BufferUav => CachedResourceType::BufUav,
            ResourceKind::Sampler => CachedResourceType::Sampler,
        }
    }

    /// State the bound object must be in when the table is committed
    pub fn required_state(self) -> Option<ResourceState> {
        match self {
            CachedResourceType::Cbv => Some(ResourceState::ConstantBuffer),
            CachedResourceType::TexSrv | CachedResourceType::BufSrv => Some(ResourceState::ShaderResource),
            CachedResourceType::TexUav | CachedResourceType::BufUav => Some(ResourceState::UnorderedAccess),
            CachedResourceType::Sampler | CachedResourceType::Unknown => None,
        }
    }
}

/// Resource state required by a committed binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    ConstantBuffer,
    ShaderResource,
    UnorderedAccess,
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
