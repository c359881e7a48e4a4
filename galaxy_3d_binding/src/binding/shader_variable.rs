/// Handle to one named shader variable.
///
/// A handle borrows the layout it was obtained from. The dummy handle
/// returned for unknown names ignores every write.

use std::sync::Arc;
use crate::binding::shader_resource_layout::ShaderResourceLayout;
use crate::device::DeviceObject;
use crate::shader::ShaderVariableType;

#[derive(Debug, Clone, Copy)]
pub struct ShaderVariable<'a> {
    target: Option<(&'a ShaderResourceLayout, ShaderVariableType, usize)>,
}

impl<'a> ShaderVariable<'a> {
    pub(crate) fn new(layout: &'a ShaderResourceLayout, var_type: ShaderVariableType, index: usize) -> Self {
        Self { target: Some((layout, var_type, index)) }
    }

    /// Handle that silently discards writes
    pub fn dummy() -> Self {
        Self { target: None }
    }

    pub fn is_dummy(&self) -> bool {
        self.target.is_none()
    }

    /// Bind `object` to the variable
    pub fn set(&self, object: Arc<dyn DeviceObject>) {
        if let Some((layout, var_type, index)) = self.target {
            layout.set_variable(var_type, index, Some(&object));
        }
    }

    /// Unbind the variable (and its sampler)
    pub fn reset(&self) {
        if let Some((layout, var_type, index)) = self.target {
            layout.set_variable(var_type, index, None);
        }
    }

    pub fn is_bound(&self) -> bool {
        self.target
            .is_some_and(|(layout, var_type, index)| layout.is_variable_bound(var_type, index))
    }

    pub fn name(&self) -> Option<&'a str> {
        let (layout, var_type, index) = self.target?;
        layout.variable(var_type, index).map(|variable| variable.name())
    }

    pub fn variable_type(&self) -> Option<ShaderVariableType> {
        self.target.map(|(_, var_type, _)| var_type)
    }
}
