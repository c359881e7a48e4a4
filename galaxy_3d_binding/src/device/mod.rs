//! Device module
//!
//! The seam to the graphics device: bindable objects and the name mapping
//! used for bulk binding.

pub mod device_object;
mod resource_mapping;

#[cfg(test)]
pub mod mock_device;

pub use device_object::{
    DeviceObject, DeviceObjectKind, ViewType,
    DescriptorHandle, BindFlags,
    same_object,
};
pub use resource_mapping::ResourceMapping;
