/// Pipeline state: one shader per stage and the root signature shared by
/// every binding instance created from it.
///
/// At creation each shader's full layout is cloned through the root
/// signature, which hands out the slot addresses. The root signature is
/// then finalized and never changes again.

use std::sync::{Arc, OnceLock, Weak};
use crate::binding::root_signature::RootSignature;
use crate::binding::shader_resource_binding::ShaderResourceBinding;
use crate::binding::shader_resource_layout::{BindShaderResourcesFlags, ShaderResourceLayout, SlotAssignment};
use crate::binding::shader_variable::ShaderVariable;
use crate::device::ResourceMapping;
use crate::error::Result;
use crate::shader::{Shader, ShaderType, ShaderTypeFlags, ShaderVariableType, SHADER_TYPE_COUNT};

#[derive(Debug)]
pub struct PipelineState {
    name: String,
    shaders: Vec<Arc<Shader>>,
    /// Parallel to `shaders`, slots allocated by `root_signature`
    layouts: Vec<ShaderResourceLayout>,
    /// Position in `shaders` per stage
    stages: [Option<usize>; SHADER_TYPE_COUNT],
    root_signature: RootSignature,
    default_binding: OnceLock<ShaderResourceBinding>,
    self_ref: Weak<PipelineState>,
}

impl PipelineState {
    /// Create a pipeline from its shaders, in declaration order
    ///
    /// # Errors
    ///
    /// Fails if no shader is given, if two shaders share a stage, or if the
    /// root signature cannot be built.
    pub fn new(name: impl Into<String>, shaders: Vec<Arc<Shader>>) -> Result<Arc<Self>> {
        let name = name.into();

        if shaders.is_empty() {
            crate::engine_bail!("galaxy3d::PipelineState", InitializationFailed =>
                "Pipeline '{}' has no shader", name);
        }

        let mut stages = [None; SHADER_TYPE_COUNT];
        for (position, shader) in shaders.iter().enumerate() {
            let stage = &mut stages[shader.shader_type().index()];
            if let Some(existing) = *stage {
                let existing: &Arc<Shader> = &shaders[existing];
                crate::engine_bail!("galaxy3d::PipelineState", InitializationFailed =>
                    "Pipeline '{}' has more than one {} shader ('{}' and '{}')",
                    name, shader.shader_type().name(), existing.name(), shader.name());
            }
            *stage = Some(position);
        }

        let mut root_signature = RootSignature::new();
        let mut layouts = Vec::with_capacity(shaders.len());
        for shader in &shaders {
            layouts.push(ShaderResourceLayout::clone_layout(
                shader.layout(),
                &ShaderVariableType::ALL,
                None,
                SlotAssignment::Allocate(&mut root_signature),
            )?);
        }
        root_signature.finalize()?;

        crate::engine_info!("galaxy3d::PipelineState",
            "Pipeline '{}' created: {} shaders, {} descriptor tables",
            name, shaders.len(), root_signature.parameter_count());

        Ok(Arc::new_cyclic(|self_ref| Self {
            name,
            shaders,
            layouts,
            stages,
            root_signature,
            default_binding: OnceLock::new(),
            self_ref: self_ref.clone(),
        }))
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shaders(&self) -> &[Arc<Shader>] {
        &self.shaders
    }

    /// Shader and slotted layout of each stage, in declaration order
    pub fn stages(&self) -> impl Iterator<Item = (&Arc<Shader>, &ShaderResourceLayout)> {
        self.shaders.iter().zip(&self.layouts)
    }

    pub fn shader(&self, shader_type: ShaderType) -> Option<&Arc<Shader>> {
        self.stages[shader_type.index()].map(|position| &self.shaders[position])
    }

    /// Layout of a stage, with the slots allocated for this pipeline
    pub fn layout(&self, shader_type: ShaderType) -> Option<&ShaderResourceLayout> {
        self.stages[shader_type.index()].map(|position| &self.layouts[position])
    }

    pub fn active_stages(&self) -> ShaderTypeFlags {
        self.shaders
            .iter()
            .fold(ShaderTypeFlags::empty(), |flags, shader| flags | shader.shader_type().flag())
    }

    pub fn root_signature(&self) -> &RootSignature {
        &self.root_signature
    }

    pub(crate) fn weak_ref(&self) -> Weak<PipelineState> {
        self.self_ref.clone()
    }

    // ===== BINDINGS =====

    /// Create a fresh binding instance with the current static resources
    pub fn create_shader_resource_binding(&self) -> Result<ShaderResourceBinding> {
        ShaderResourceBinding::new(self)
    }

    /// Binding instance owned by the pipeline, created on first use
    pub fn default_binding(&self) -> Result<&ShaderResourceBinding> {
        if let Some(binding) = self.default_binding.get() {
            return Ok(binding);
        }
        let binding = ShaderResourceBinding::new(self)?;
        Ok(self.default_binding.get_or_init(|| binding))
    }

    /// Bind the mutable and dynamic variables of the default binding
    pub fn bind_shader_resources(&self, mapping: &ResourceMapping, flags: BindShaderResourcesFlags) -> Result<()> {
        self.default_binding()?.bind_resources(ShaderTypeFlags::all(), mapping, flags);
        Ok(())
    }

    /// Bind the static variables of every shader
    pub fn bind_static_resources(&self, mapping: &ResourceMapping, flags: BindShaderResourcesFlags) {
        for shader in &self.shaders {
            shader.bind_static_resources(mapping, flags);
        }
    }

    /// Static variable of one stage
    pub fn static_variable(&self, shader_type: ShaderType, name: &str) -> ShaderVariable<'_> {
        match self.shader(shader_type) {
            Some(shader) => shader.static_variable(name),
            None => {
                crate::engine_error!("galaxy3d::PipelineState",
                    "Failed to find static variable '{}': pipeline '{}' has no {} shader",
                    name, self.name, shader_type.name());
                ShaderVariable::dummy()
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_state_tests.rs"]
mod tests;
