/// Shader resource binding: one instance of a pipeline's bindable state.
///
/// Every instance owns a cache sized by the pipeline's root signature.
/// Mutable and dynamic variables are reached through per-stage layouts that
/// reuse the pipeline's slots. Static resources are copied in from each
/// shader's static cache when the instance is created.

use std::sync::{Arc, Weak};
use crate::binding::resource_cache::{DescriptorCommit, ShaderResourceCache, SharedResourceCache};
use crate::binding::shader_resource_layout::{BindShaderResourcesFlags, ShaderResourceLayout, SlotAssignment};
use crate::binding::shader_variable::ShaderVariable;
use crate::binding::pipeline_state::PipelineState;
use crate::device::ResourceMapping;
use crate::engine::Engine;
use crate::error::Result;
use crate::shader::{ShaderType, ShaderTypeFlags, ShaderVariableType, SHADER_TYPE_COUNT};

/// Static variables of one stage and the shader cache they come from
#[derive(Debug)]
struct StaticSource {
    layout: ShaderResourceLayout,
    cache: SharedResourceCache,
}

#[derive(Debug)]
pub struct ShaderResourceBinding {
    pipeline: Weak<PipelineState>,
    pipeline_name: String,
    cache: SharedResourceCache,
    layouts: [Option<ShaderResourceLayout>; SHADER_TYPE_COUNT],
    static_sources: Vec<StaticSource>,
    stages: ShaderTypeFlags,
}

impl ShaderResourceBinding {
    pub(crate) fn new(pipeline: &PipelineState) -> Result<Self> {
        let mut cache = ShaderResourceCache::new();
        pipeline.root_signature().init_resource_cache(&mut cache);
        let cache = cache.into_shared();

        let mut layouts: [Option<ShaderResourceLayout>; SHADER_TYPE_COUNT] = Default::default();
        let mut static_sources = Vec::new();
        let mut stages = ShaderTypeFlags::empty();

        for (shader, pipeline_layout) in pipeline.stages() {
            let shader_type = shader.shader_type();
            layouts[shader_type.index()] = Some(ShaderResourceLayout::clone_layout(
                pipeline_layout,
                &[ShaderVariableType::Mutable, ShaderVariableType::Dynamic],
                Some(cache.clone()),
                SlotAssignment::Reuse,
            )?);
            static_sources.push(StaticSource {
                layout: ShaderResourceLayout::clone_layout(
                    pipeline_layout,
                    &[ShaderVariableType::Static],
                    Some(cache.clone()),
                    SlotAssignment::Reuse,
                )?,
                cache: shader.static_cache().clone(),
            });
            stages |= shader_type.flag();
        }

        let binding = Self {
            pipeline: pipeline.weak_ref(),
            pipeline_name: pipeline.name().to_string(),
            cache,
            layouts,
            static_sources,
            stages,
        };
        binding.initialize_static_resources();
        Ok(binding)
    }

    /// Copy the current static resources of every shader into this instance
    pub fn initialize_static_resources(&self) {
        for source in &self.static_sources {
            source.layout.copy_static_resources(&source.cache);
        }
    }

    // ===== ACCESSORS =====

    /// Pipeline that created this binding, if still alive
    pub fn pipeline(&self) -> Option<Arc<PipelineState>> {
        self.pipeline.upgrade()
    }

    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    pub fn stages(&self) -> ShaderTypeFlags {
        self.stages
    }

    pub fn resource_cache(&self) -> &SharedResourceCache {
        &self.cache
    }

    /// Mutable/dynamic layout of a stage
    pub fn layout(&self, shader_type: ShaderType) -> Option<&ShaderResourceLayout> {
        self.layouts[shader_type.index()].as_ref()
    }

    /// True iff this binding was created by `pipeline`
    pub fn is_compatible_with(&self, pipeline: &PipelineState) -> bool {
        std::ptr::eq(self.pipeline.as_ptr(), pipeline)
    }

    // ===== BINDING =====

    /// Bind the mutable and dynamic variables of the selected stages
    pub fn bind_resources(&self, shader_flags: ShaderTypeFlags, mapping: &ResourceMapping, flags: BindShaderResourcesFlags) {
        for shader_type in ShaderType::ALL {
            if !shader_flags.contains(shader_type.flag()) {
                continue;
            }
            if let Some(layout) = &self.layouts[shader_type.index()] {
                layout.bind_resources(mapping, flags);
            }
        }
    }

    /// Mutable or dynamic variable of one stage
    pub fn variable(&self, shader_type: ShaderType, name: &str) -> ShaderVariable<'_> {
        match &self.layouts[shader_type.index()] {
            Some(layout) => layout.get_variable(name),
            None => {
                crate::engine_error!("galaxy3d::ShaderResourceBinding",
                    "Failed to find shader variable '{}' in shader resource binding of pipeline '{}': shader type {} is not initialized",
                    name, self.pipeline_name, shader_type.name());
                ShaderVariable::dummy()
            }
        }
    }

    // ===== COMMIT =====

    /// Log every unbound variable (static ones included)
    ///
    /// Does nothing unless `Config::verify_bindings` is set. Returns the
    /// number of problems found.
    pub fn verify_bindings(&self) -> usize {
        if !Engine::config().verify_bindings {
            return 0;
        }
        let dynamic: usize = self.layouts.iter().flatten().map(ShaderResourceLayout::verify_bindings).sum();
        let fixed: usize = self.static_sources.iter().map(|source| source.layout.verify_bindings()).sum();
        dynamic + fixed
    }

    /// Native handles, table ranges and state transitions of this instance
    pub fn commit_handles(&self) -> DescriptorCommit {
        match self.cache.read() {
            Ok(cache) => cache.native_handles_for_commit(),
            Err(_) => {
                crate::engine_error!("galaxy3d::ShaderResourceBinding",
                    "Resource cache lock poisoned in binding of pipeline '{}'", self.pipeline_name);
                DescriptorCommit::default()
            }
        }
    }
}

#[cfg(test)]
#[path = "shader_resource_binding_tests.rs"]
mod tests;
