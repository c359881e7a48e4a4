/// Shader stages, update frequencies and the per-shader description.

use bitflags::bitflags;

// ===== SHADER TYPE =====

/// Number of pipeline stages a binding can hold a layout for
pub const SHADER_TYPE_COUNT: usize = 6;

/// Pipeline stage of a shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Vertex,
    Pixel,
    Geometry,
    Hull,
    Domain,
    Compute,
}

impl ShaderType {
    /// All stages, in index order
    pub const ALL: [ShaderType; SHADER_TYPE_COUNT] = [
        ShaderType::Vertex,
        ShaderType::Pixel,
        ShaderType::Geometry,
        ShaderType::Hull,
        ShaderType::Domain,
        ShaderType::Compute,
    ];

    /// Dense index in `0..SHADER_TYPE_COUNT`
    pub fn index(self) -> usize {
        match self {
            ShaderType::Vertex => 0,
            ShaderType::Pixel => 1,
            ShaderType::Geometry => 2,
            ShaderType::Hull => 3,
            ShaderType::Domain => 4,
            ShaderType::Compute => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<ShaderType> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderType::Vertex => "vertex",
            ShaderType::Pixel => "pixel",
            ShaderType::Geometry => "geometry",
            ShaderType::Hull => "hull",
            ShaderType::Domain => "domain",
            ShaderType::Compute => "compute",
        }
    }

    pub fn flag(self) -> ShaderTypeFlags {
        match self {
            ShaderType::Vertex => ShaderTypeFlags::VERTEX,
            ShaderType::Pixel => ShaderTypeFlags::PIXEL,
            ShaderType::Geometry => ShaderTypeFlags::GEOMETRY,
            ShaderType::Hull => ShaderTypeFlags::HULL,
            ShaderType::Domain => ShaderTypeFlags::DOMAIN,
            ShaderType::Compute => ShaderTypeFlags::COMPUTE,
        }
    }
}

bitflags! {
    /// Set of pipeline stages (used to select layouts in bulk binding)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderTypeFlags: u32 {
        const VERTEX   = 1 << 0;
        const PIXEL    = 1 << 1;
        const GEOMETRY = 1 << 2;
        const HULL     = 1 << 3;
        const DOMAIN   = 1 << 4;
        const COMPUTE  = 1 << 5;
    }
}

// ===== SHADER VARIABLE TYPE =====

/// Number of update frequencies
pub const SHADER_VARIABLE_TYPE_COUNT: usize = 3;

/// Update frequency of a shader variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderVariableType {
    /// Bound once through the shader, shared by every binding
    Static,
    /// Bound once per binding instance
    Mutable,
    /// May change between draws of the same binding instance
    Dynamic,
}

impl ShaderVariableType {
    pub const ALL: [ShaderVariableType; SHADER_VARIABLE_TYPE_COUNT] = [
        ShaderVariableType::Static,
        ShaderVariableType::Mutable,
        ShaderVariableType::Dynamic,
    ];

    pub fn index(self) -> usize {
        match self {
            ShaderVariableType::Static => 0,
            ShaderVariableType::Mutable => 1,
            ShaderVariableType::Dynamic => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderVariableType::Static => "static",
            ShaderVariableType::Mutable => "mutable",
            ShaderVariableType::Dynamic => "dynamic",
        }
    }
}

// ===== SHADER DESCRIPTION =====

/// Explicit update frequency for one named variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderVariableDesc {
    pub name: String,
    pub variable_type: ShaderVariableType,
}

impl ShaderVariableDesc {
    pub fn new(name: impl Into<String>, variable_type: ShaderVariableType) -> Self {
        Self { name: name.into(), variable_type }
    }
}

/// Shader creation descriptor
#[derive(Debug, Clone)]
pub struct ShaderDesc {
    pub name: String,
    pub shader_type: ShaderType,
    /// Frequency of every variable absent from `variables`
    pub default_variable_type: ShaderVariableType,
    pub variables: Vec<ShaderVariableDesc>,
}

impl ShaderDesc {
    /// Descriptor with no overrides and a Static default
    pub fn new(name: impl Into<String>, shader_type: ShaderType) -> Self {
        Self {
            name: name.into(),
            shader_type,
            default_variable_type: ShaderVariableType::Static,
            variables: Vec::new(),
        }
    }

    pub fn with_default_variable_type(mut self, variable_type: ShaderVariableType) -> Self {
        self.default_variable_type = variable_type;
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, variable_type: ShaderVariableType) -> Self {
        self.variables.push(ShaderVariableDesc::new(name, variable_type));
        self
    }

    /// Exact, case-sensitive lookup in the variable table, else the default
    pub fn resolve_variable_type(&self, name: &str) -> ShaderVariableType {
        self.variables
            .iter()
            .find(|var| var.name == name)
            .map(|var| var.variable_type)
            .unwrap_or(self.default_variable_type)
    }
}

#[cfg(test)]
#[path = "shader_desc_tests.rs"]
mod tests;
