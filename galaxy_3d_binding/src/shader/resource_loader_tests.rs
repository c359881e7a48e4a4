//! Unit tests for resource_loader.rs

use crate::galaxy3d::Error;
use crate::shader::{
    extract_resource_descriptors, load_shader_resources, ReflectedResource, ResourceDimension,
    ResourceKind, ShaderDesc, ShaderInputType, ShaderResourceAttribs, ShaderResourceVisitor,
    ShaderType, ShaderVariableType, INVALID_BIND_POINT,
};
use rustc_hash::FxHashSet;

// ============================================================================
// HELPERS
// ============================================================================

fn res(name: &str, bind_point: u32, input_type: ShaderInputType, dimension: ResourceDimension) -> ReflectedResource {
    ReflectedResource::new(name, bind_point, input_type, dimension)
}

fn pixel_desc() -> ShaderDesc {
    ShaderDesc::new("TestPS", ShaderType::Pixel)
        .with_variable("Tex0", ShaderVariableType::Mutable)
        .with_variable("BufUAV0", ShaderVariableType::Dynamic)
}

fn scene_resources() -> Vec<ReflectedResource> {
    vec![
        res("CBuf0", 0, ShaderInputType::ConstantBuffer, ResourceDimension::Unknown),
        res("Tex0_sampler", 0, ShaderInputType::Sampler, ResourceDimension::Unknown),
        res("Tex0", 0, ShaderInputType::Texture, ResourceDimension::Texture),
        res("BufUAV0", 0, ShaderInputType::UavRwStructured, ResourceDimension::Buffer),
        res("TexNoSampler", 1, ShaderInputType::Texture, ResourceDimension::Texture),
        res("Lights", 2, ShaderInputType::Texture, ResourceDimension::Buffer),
        res("Output", 1, ShaderInputType::UavRwTyped, ResourceDimension::Texture),
        res("Counters", 2, ShaderInputType::UavRwTyped, ResourceDimension::Buffer),
        res("Raw", 3, ShaderInputType::UavRwByteAddress, ResourceDimension::Buffer),
        res("Orphan_sampler", 5, ShaderInputType::Sampler, ResourceDimension::Unknown),
    ]
}

/// Records the callback sequence
#[derive(Default)]
struct RecordingVisitor {
    calls: Vec<(&'static str, String)>,
}

impl ShaderResourceVisitor for RecordingVisitor {
    fn on_constant_buffer(&mut self, attribs: ShaderResourceAttribs) {
        self.calls.push(("cb", attribs.name));
    }
    fn on_texture_and_sampler(&mut self, texture: ShaderResourceAttribs, _sampler: Option<ShaderResourceAttribs>) {
        self.calls.push(("tex", texture.name));
    }
    fn on_texture_uav(&mut self, attribs: ShaderResourceAttribs) {
        self.calls.push(("tex_uav", attribs.name));
    }
    fn on_buffer_uav(&mut self, attribs: ShaderResourceAttribs) {
        self.calls.push(("buf_uav", attribs.name));
    }
    fn on_buffer_srv(&mut self, attribs: ShaderResourceAttribs) {
        self.calls.push(("buf_srv", attribs.name));
    }
}

// ============================================================================
// CLASSIFICATION TESTS
// ============================================================================

#[test]
fn test_classification_of_supported_categories() {
    let descriptors = extract_resource_descriptors(&scene_resources(), &pixel_desc(), "_sampler").unwrap();

    let kind_of = |name: &str| descriptors.iter().find(|d| d.attribs.name == name).unwrap().attribs.kind;
    assert_eq!(kind_of("CBuf0"), ResourceKind::ConstantBuffer);
    assert_eq!(kind_of("Tex0"), ResourceKind::TextureSrv);
    assert_eq!(kind_of("Lights"), ResourceKind::BufferSrv);
    assert_eq!(kind_of("Output"), ResourceKind::TextureUav);
    assert_eq!(kind_of("Counters"), ResourceKind::BufferUav);
    assert_eq!(kind_of("BufUAV0"), ResourceKind::BufferUav);
    assert_eq!(kind_of("Raw"), ResourceKind::BufferUav);
}

#[test]
fn test_samplers_are_not_exposed() {
    let descriptors = extract_resource_descriptors(&scene_resources(), &pixel_desc(), "_sampler").unwrap();
    assert!(descriptors.iter().all(|d| d.attribs.kind != ResourceKind::Sampler));
    assert_eq!(descriptors.len(), 8);
}

#[test]
fn test_textures_are_reported_last_in_declaration_order() {
    let mut visitor = RecordingVisitor::default();
    load_shader_resources(&scene_resources(), &pixel_desc(), "_sampler", &mut visitor).unwrap();

    let names: Vec<_> = visitor.calls.iter().map(|(kind, name)| format!("{}:{}", kind, name)).collect();
    assert_eq!(names, vec![
        "cb:CBuf0",
        "buf_uav:BufUAV0",
        "buf_srv:Lights",
        "tex_uav:Output",
        "buf_uav:Counters",
        "buf_uav:Raw",
        "tex:Tex0",
        "tex:TexNoSampler",
    ]);
}

// ============================================================================
// SAMPLER PAIRING TESTS
// ============================================================================

#[test]
fn test_texture_paired_with_suffixed_sampler() {
    let descriptors = extract_resource_descriptors(&scene_resources(), &pixel_desc(), "_sampler").unwrap();
    let tex0 = descriptors.iter().find(|d| d.attribs.name == "Tex0").unwrap();

    let sampler = tex0.paired_sampler.as_ref().unwrap();
    assert_eq!(sampler.name, "Tex0_sampler");
    assert_eq!(sampler.kind, ResourceKind::Sampler);
    assert_eq!(sampler.bind_point, 0);
    // Sampler follows the texture's frequency, not the default
    assert_eq!(sampler.variable_type, ShaderVariableType::Mutable);
}

#[test]
fn test_texture_without_sampler() {
    let descriptors = extract_resource_descriptors(&scene_resources(), &pixel_desc(), "_sampler").unwrap();
    let tex = descriptors.iter().find(|d| d.attribs.name == "TexNoSampler").unwrap();
    assert!(tex.paired_sampler.is_none());
}

#[test]
fn test_custom_sampler_suffix() {
    let resources = vec![
        res("Albedo_smp", 3, ShaderInputType::Sampler, ResourceDimension::Unknown),
        res("Albedo", 4, ShaderInputType::Texture, ResourceDimension::Texture),
    ];
    let desc = ShaderDesc::new("PS", ShaderType::Pixel);

    let default_suffix = extract_resource_descriptors(&resources, &desc, "_sampler").unwrap();
    assert!(default_suffix[0].paired_sampler.is_none());

    let custom = extract_resource_descriptors(&resources, &desc, "_smp").unwrap();
    assert_eq!(custom[0].paired_sampler.as_ref().unwrap().bind_point, 3);
}

// ============================================================================
// VARIABLE TYPE TESTS
// ============================================================================

#[test]
fn test_variable_types_resolved_from_desc() {
    let descriptors = extract_resource_descriptors(&scene_resources(), &pixel_desc(), "_sampler").unwrap();
    let var_type = |name: &str| descriptors.iter().find(|d| d.attribs.name == name).unwrap().attribs.variable_type;

    assert_eq!(var_type("CBuf0"), ShaderVariableType::Static);
    assert_eq!(var_type("Tex0"), ShaderVariableType::Mutable);
    assert_eq!(var_type("BufUAV0"), ShaderVariableType::Dynamic);
}

// ============================================================================
// UNIQUENESS
// ============================================================================

#[test]
fn test_name_kind_pairs_are_unique() {
    let descriptors = extract_resource_descriptors(&scene_resources(), &pixel_desc(), "_sampler").unwrap();
    let mut seen = FxHashSet::default();
    for descriptor in &descriptors {
        assert!(seen.insert((descriptor.attribs.name.clone(), descriptor.attribs.kind)));
    }
}

#[test]
fn test_duplicate_declaration_is_rejected() {
    let resources = vec![
        res("CB", 0, ShaderInputType::ConstantBuffer, ResourceDimension::Unknown),
        res("CB", 1, ShaderInputType::ConstantBuffer, ResourceDimension::Unknown),
    ];
    let result = extract_resource_descriptors(&resources, &pixel_desc(), "_sampler");
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_same_name_with_different_input_types_of_one_kind_is_rejected() {
    // Typed buffer UAV and RW structured buffer are both buffer UAVs
    let resources = vec![
        res("X", 0, ShaderInputType::UavRwTyped, ResourceDimension::Buffer),
        res("X", 1, ShaderInputType::UavRwStructured, ResourceDimension::Buffer),
    ];
    let mut visitor = RecordingVisitor::default();
    let result = load_shader_resources(&resources, &pixel_desc(), "_sampler", &mut visitor);

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert!(visitor.calls.is_empty());
}

#[test]
fn test_same_name_with_different_kinds_is_accepted() {
    let resources = vec![
        res("Shadow", 0, ShaderInputType::Texture, ResourceDimension::Texture),
        res("Shadow", 0, ShaderInputType::Sampler, ResourceDimension::Unknown),
    ];
    let descriptors = extract_resource_descriptors(&resources, &pixel_desc(), "_sampler").unwrap();
    assert_eq!(descriptors.len(), 1);
}

#[test]
fn test_shared_bind_point_within_kind_is_rejected() {
    let resources = vec![
        res("CBufA", 2, ShaderInputType::ConstantBuffer, ResourceDimension::Unknown),
        res("CBufB", 2, ShaderInputType::ConstantBuffer, ResourceDimension::Unknown),
    ];
    let result = extract_resource_descriptors(&resources, &pixel_desc(), "_sampler");
    assert!(matches!(result, Err(Error::InvalidResource(_))));

    let uavs = vec![
        res("Counters", 4, ShaderInputType::UavRwTyped, ResourceDimension::Buffer),
        res("Raw", 4, ShaderInputType::UavRwByteAddress, ResourceDimension::Buffer),
    ];
    let result = extract_resource_descriptors(&uavs, &pixel_desc(), "_sampler");
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_shared_bind_point_across_kinds_is_accepted() {
    // scene_resources() reuses register 0 for a CB, a texture, a sampler and a UAV
    let resources = scene_resources();
    let on_zero = resources.iter().filter(|r| r.bind_point == 0).count();
    assert_eq!(on_zero, 4);
    assert!(extract_resource_descriptors(&resources, &pixel_desc(), "_sampler").is_ok());
}

// ============================================================================
// BIND POINTS
// ============================================================================

#[test]
fn test_unassigned_bind_point_is_rejected() {
    let mut resources = scene_resources();
    resources.push(res("Unplaced", INVALID_BIND_POINT, ShaderInputType::Texture, ResourceDimension::Texture));

    let mut visitor = RecordingVisitor::default();
    let result = load_shader_resources(&resources, &pixel_desc(), "_sampler", &mut visitor);

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert!(visitor.calls.is_empty());
}

#[test]
fn test_highest_valid_bind_point_is_accepted() {
    let resources = vec![res("Far", INVALID_BIND_POINT - 1, ShaderInputType::ConstantBuffer, ResourceDimension::Unknown)];
    let descriptors = extract_resource_descriptors(&resources, &pixel_desc(), "_sampler").unwrap();
    assert_eq!(descriptors[0].attribs.bind_point, INVALID_BIND_POINT - 1);
}

// ============================================================================
// TEE VISITOR
// ============================================================================

#[test]
fn test_paired_visitors_receive_identical_reports() {
    let mut visitors = (RecordingVisitor::default(), RecordingVisitor::default());
    load_shader_resources(&scene_resources(), &pixel_desc(), "_sampler", &mut visitors).unwrap();

    assert_eq!(visitors.0.calls.len(), 8);
    assert_eq!(visitors.0.calls, visitors.1.calls);
}

// ============================================================================
// UNSUPPORTED CATEGORIES
// ============================================================================

#[test]
fn test_unsupported_categories_fail_the_build() {
    let unsupported = [
        ShaderInputType::TextureBuffer,
        ShaderInputType::Structured,
        ShaderInputType::ByteAddress,
        ShaderInputType::UavAppendStructured,
        ShaderInputType::UavConsumeStructured,
        ShaderInputType::UavRwStructuredWithCounter,
    ];

    for input_type in unsupported {
        let mut resources = scene_resources();
        resources.push(res("Bad", 7, input_type, ResourceDimension::Buffer));

        let mut visitor = RecordingVisitor::default();
        let result = load_shader_resources(&resources, &pixel_desc(), "_sampler", &mut visitor);

        assert!(matches!(result, Err(Error::UnsupportedResource(_))), "{:?} must be rejected", input_type);
        assert!(visitor.calls.is_empty());
    }
}

#[test]
fn test_empty_reflection() {
    let descriptors = extract_resource_descriptors(&[], &pixel_desc(), "_sampler").unwrap();
    assert!(descriptors.is_empty());
}
