//! Binding module
//!
//! Slot allocation, resource caches, per-stage layouts and the pipeline /
//! binding-instance objects built on top of them.

mod slot;
mod root_signature;
mod resource_cache;
mod shader_resource_layout;
mod shader_variable;
mod pipeline_state;
mod shader_resource_binding;

pub use slot::{
    BindingSlotAddress, DescriptorRangeType, DescriptorHeapType,
    CachedResourceType, ResourceState,
    INVALID_INDEX, DESCRIPTOR_RANGE_TYPE_COUNT,
};
pub use root_signature::{
    BindingSlotAllocator, RootSignature, RootParameter, DescriptorRange,
};
pub use resource_cache::{
    ShaderResourceCache, SharedResourceCache,
    RootTable, CachedResource,
    DescriptorCommit, CommittedTable, ResourceTransition,
};
pub use shader_resource_layout::{
    ShaderResourceLayout, SlotAssignment, BindShaderResourcesFlags,
    BoundVariable, SamplerSlot,
};
pub use shader_variable::ShaderVariable;
pub use pipeline_state::PipelineState;
pub use shader_resource_binding::ShaderResourceBinding;
