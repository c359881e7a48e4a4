//! Unit tests for shader.rs

use crate::binding::{BindShaderResourcesFlags, DescriptorRangeType, BindingSlotAddress};
use crate::device::mock_device::{MockBuffer, MockReflector, MockTextureView};
use crate::device::{DeviceObject, ResourceMapping};
use crate::galaxy3d::Error;
use crate::shader::{
    ReflectedResource, ResourceDimension, ResourceKind, Shader, ShaderDesc, ShaderInputType, ShaderType,
    ShaderVariableType, INVALID_BIND_POINT,
};
use crate::log::LogSeverity;
use crate::test_logger::CapturedLogs;
use serial_test::serial;

fn reflector() -> MockReflector {
    MockReflector::new(vec![
        ReflectedResource::new("CBuf0", 4, ShaderInputType::ConstantBuffer, ResourceDimension::Unknown),
        ReflectedResource::new("Tex0_sampler", 1, ShaderInputType::Sampler, ResourceDimension::Unknown),
        ReflectedResource::new("Tex0", 2, ShaderInputType::Texture, ResourceDimension::Texture),
        ReflectedResource::new("BufUAV0", 0, ShaderInputType::UavRwStructured, ResourceDimension::Buffer),
    ])
}

fn pixel_desc() -> ShaderDesc {
    ShaderDesc::new("TestPS", ShaderType::Pixel)
        .with_variable("BufUAV0", ShaderVariableType::Dynamic)
}

// ============================================================================
// CREATION TESTS
// ============================================================================

#[test]
fn test_create_shader() {
    let shader = Shader::new(pixel_desc(), &[1, 2, 3, 4], &reflector()).unwrap();

    assert_eq!(shader.name(), "TestPS");
    assert_eq!(shader.shader_type(), ShaderType::Pixel);
    assert_eq!(shader.resources().len(), 3);
    assert_eq!(shader.layout().variable_count(), 3);

    let tex = shader.resources().iter().find(|d| d.attribs.name == "Tex0").unwrap();
    assert_eq!(tex.attribs.kind, ResourceKind::TextureSrv);
    assert_eq!(tex.paired_sampler.as_ref().unwrap().name, "Tex0_sampler");
}

#[test]
fn test_reflection_failure_is_propagated() {
    let result = Shader::new(pixel_desc(), &[], &reflector());
    assert!(matches!(result, Err(Error::ReflectionFailed(_))));
}

#[test]
fn test_unsupported_resource_fails_creation() {
    let reflector = MockReflector::new(vec![
        ReflectedResource::new("Raw", 0, ShaderInputType::ByteAddress, ResourceDimension::Buffer),
    ]);
    let result = Shader::new(pixel_desc(), &[0; 4], &reflector);
    assert!(matches!(result, Err(Error::UnsupportedResource(_))));
}

#[test]
fn test_unassigned_bind_point_fails_creation() {
    let reflected = [
        ReflectedResource::new("CBuf0", INVALID_BIND_POINT, ShaderInputType::ConstantBuffer, ResourceDimension::Unknown),
    ];
    let result = Shader::from_reflection(pixel_desc(), &reflected);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
#[serial]
fn test_reflection_is_walked_once() {
    let reflected = [
        ReflectedResource::new("CBuf0", 0, ShaderInputType::ConstantBuffer, ResourceDimension::Unknown),
        ReflectedResource::new("Orphan_sampler", 3, ShaderInputType::Sampler, ResourceDimension::Unknown),
    ];

    let logs = CapturedLogs::install();
    let shader = Shader::from_reflection(pixel_desc(), &reflected).unwrap();

    let unpaired = logs.entries().iter()
        .filter(|e| e.severity == LogSeverity::Debug && e.message.contains("'Orphan_sampler'"))
        .count();
    assert_eq!(unpaired, 1);
    assert_eq!(shader.resources().len(), 1);
    assert_eq!(shader.layout().variable_count(), 1);
}

// ============================================================================
// STATIC LAYOUT TESTS
// ============================================================================

#[test]
fn test_static_layout_contains_only_static_variables() {
    let shader = Shader::new(pixel_desc(), &[0; 4], &reflector()).unwrap();
    let static_layout = shader.static_layout();

    assert_eq!(static_layout.variable_count(), 2);
    assert!(static_layout.find_variable("BufUAV0").is_none());

    // Artificial layout: table = range type, offset = register
    let cb = &static_layout.variables(ShaderVariableType::Static)[0];
    assert_eq!(cb.slot(), BindingSlotAddress::artificial(DescriptorRangeType::Cbv, 4));
    let cache = shader.static_cache().read().unwrap();
    assert_eq!(cache.root_table_count(), 4);
    assert_eq!(cache.root_table(DescriptorRangeType::Cbv.index()).unwrap().len(), 5);
}

#[test]
fn test_static_variable_binding() {
    let shader = Shader::new(pixel_desc(), &[0; 4], &reflector()).unwrap();
    let cb = MockBuffer::uniform("Constants");

    shader.static_variable("CBuf0").set(cb.clone());
    assert!(shader.static_variable("CBuf0").is_bound());

    let slot = BindingSlotAddress::artificial(DescriptorRangeType::Cbv, 4);
    let cache = shader.static_cache().read().unwrap();
    assert_eq!(cache.resource(slot).unwrap().descriptor_handle, cb.descriptor_handle());
}

#[test]
#[serial]
fn test_dynamic_variable_is_not_static() {
    let shader = Shader::new(pixel_desc(), &[0; 4], &reflector()).unwrap();
    let logs = CapturedLogs::install();

    let variable = shader.static_variable("BufUAV0");
    assert!(variable.is_dummy());
    assert_eq!(logs.errors(), 1);
}

#[test]
#[serial]
fn test_bind_static_resources() {
    let shader = Shader::new(pixel_desc(), &[0; 4], &reflector()).unwrap();
    let mapping = ResourceMapping::new()
        .with("CBuf0", MockBuffer::uniform("Constants"))
        .with("Tex0", MockTextureView::srv("Albedo"));

    let logs = CapturedLogs::install();
    shader.bind_static_resources(&mapping, BindShaderResourcesFlags::ALL_RESOLVED);

    assert_eq!(logs.errors(), 0);
    assert!(shader.static_variable("CBuf0").is_bound());
    assert!(shader.static_variable("Tex0").is_bound());
    assert_eq!(shader.static_layout().verify_bindings(), 0);
}
