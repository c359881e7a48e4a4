/// SpirvReflector - SPIR-V implementation of the ShaderReflector trait

use galaxy_3d_binding::galaxy3d::shader::{
    ReflectedResource, ResourceDimension, ShaderInputType, ShaderReflector,
};
use galaxy_3d_binding::galaxy3d::Result;
use galaxy_3d_binding::{engine_bail, engine_debug, engine_err};
use rustc_hash::FxHashSet;
use spirq::ty::{AccessType, DescriptorType};
use spirq::var::Variable;

/// First word of every SPIR-V module
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Stateless SPIR-V reflector
///
/// All entry points of the module are reflected and merged. Descriptors
/// shared between entry points are reported once. Only descriptor set 0 is
/// accepted: the binding model addresses resources by binding number alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpirvReflector;

impl SpirvReflector {
    pub fn new() -> Self {
        Self
    }

    /// Reinterpret little-endian bytecode as SPIR-V words
    pub(crate) fn words(bytecode: &[u8]) -> Result<Vec<u32>> {
        if bytecode.len() % 4 != 0 {
            engine_bail!("galaxy3d::SpirvReflector", ReflectionFailed =>
                "SPIR-V bytecode size ({} bytes) is not a multiple of 4", bytecode.len());
        }

        let words: Vec<u32> = bytecode
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        match words.first() {
            Some(&SPIRV_MAGIC) => Ok(words),
            Some(&magic) => Err(engine_err!("galaxy3d::SpirvReflector", ReflectionFailed =>
                "Invalid SPIR-V magic number 0x{:08X}", magic)),
            None => Err(engine_err!("galaxy3d::SpirvReflector", ReflectionFailed =>
                "SPIR-V bytecode is empty")),
        }
    }

    /// Map a spirq descriptor type to the compiler input type and dimension
    pub(crate) fn classify_descriptor(
        name: &str,
        desc_ty: &DescriptorType,
    ) -> Result<(ShaderInputType, ResourceDimension)> {
        match desc_ty {
            DescriptorType::UniformBuffer() => {
                Ok((ShaderInputType::ConstantBuffer, ResourceDimension::Unknown))
            }
            DescriptorType::StorageBuffer(AccessType::ReadOnly) => {
                Ok((ShaderInputType::Texture, ResourceDimension::Buffer))
            }
            DescriptorType::StorageBuffer(..) => {
                Ok((ShaderInputType::UavRwStructured, ResourceDimension::Buffer))
            }
            DescriptorType::UniformTexelBuffer() => {
                Ok((ShaderInputType::Texture, ResourceDimension::Buffer))
            }
            DescriptorType::StorageTexelBuffer(..) => {
                Ok((ShaderInputType::UavRwTyped, ResourceDimension::Buffer))
            }
            DescriptorType::StorageImage(..) => {
                Ok((ShaderInputType::UavRwTyped, ResourceDimension::Texture))
            }
            DescriptorType::SampledImage() | DescriptorType::CombinedImageSampler() => {
                Ok((ShaderInputType::Texture, ResourceDimension::Texture))
            }
            DescriptorType::Sampler() => {
                Ok((ShaderInputType::Sampler, ResourceDimension::Unknown))
            }
            other => {
                engine_bail!("galaxy3d::SpirvReflector", UnsupportedResource =>
                    "Unsupported SPIR-V descriptor type {:?} for resource '{}'", other, name);
            }
        }
    }
}

impl ShaderReflector for SpirvReflector {
    fn reflect(&self, bytecode: &[u8]) -> Result<Vec<ReflectedResource>> {
        let words = Self::words(bytecode)?;

        let entry_points = spirq::ReflectConfig::new()
            .spv(words.as_slice())
            .ref_all_rscs(true)
            .reflect()
            .map_err(|e| engine_err!("galaxy3d::SpirvReflector", ReflectionFailed =>
                "SPIR-V reflection failed: {:?}", e))?;

        let mut seen = FxHashSet::default();
        let mut resources = Vec::new();

        for entry_point in &entry_points {
            for var in entry_point.vars.iter() {
                let Variable::Descriptor { name, desc_bind, desc_ty, .. } = var else {
                    continue;
                };
                if !seen.insert((desc_bind.set(), desc_bind.bind())) {
                    continue;
                }

                let Some(name) = name.as_deref() else {
                    engine_bail!("galaxy3d::SpirvReflector", ReflectionFailed =>
                        "Descriptor at set {} binding {} has no name", desc_bind.set(), desc_bind.bind());
                };
                if desc_bind.set() != 0 {
                    engine_bail!("galaxy3d::SpirvReflector", UnsupportedResource =>
                        "Resource '{}' uses descriptor set {}; only set 0 is supported", name, desc_bind.set());
                }

                let (input_type, dimension) = Self::classify_descriptor(name, desc_ty)?;
                resources.push(ReflectedResource::new(name, desc_bind.bind(), input_type, dimension));
            }
        }

        engine_debug!("galaxy3d::SpirvReflector",
            "Reflected {} resource(s) from {} entry point(s)", resources.len(), entry_points.len());

        Ok(resources)
    }
}

#[cfg(test)]
#[path = "spirv_reflector_tests.rs"]
mod tests;
