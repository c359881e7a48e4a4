/*!
# Galaxy 3D Binding

Shader resource binding layer for the Galaxy 3D engine.

This crate turns shader reflection data into named, typed variables and maps
them onto descriptor tables. Reflection backends (SPIR-V, ...) plug in through
the `ShaderReflector` trait; device objects through the `DeviceObject` trait.

## Architecture

- **Shader**: reflection result, full layout and static resources
- **ShaderResourceLayout**: the variables of one stage, grouped by update frequency
- **RootSignature**: binding-slot allocator producing descriptor tables
- **ShaderResourceCache**: the live bindings of one layout or binding instance
- **PipelineState**: one shader per stage plus a finalized root signature
- **ShaderResourceBinding**: one bindable instance of a pipeline

Variables are Static (bound once on the shader), Mutable (bound once per
binding instance) or Dynamic (rebound freely).
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod shader;
pub mod device;
pub mod binding;

#[cfg(test)]
mod test_logger;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton and global configuration
    pub use crate::engine::Engine;
    pub use crate::config::{Config, DEFAULT_SAMPLER_SUFFIX};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Shader sub-module
    pub mod shader {
        pub use crate::shader::*;
    }

    // Device sub-module
    pub mod device {
        pub use crate::device::*;
    }

    // Binding sub-module
    pub mod binding {
        pub use crate::binding::*;
    }
}
