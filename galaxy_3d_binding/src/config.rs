/// Global configuration of the binding layer.
///
/// Held by the `Engine` singleton and read whenever shaders are reflected or
/// bindings are verified. Changing it does not affect layouts that were
/// already built.

/// Default suffix identifying the sampler paired with a texture (`g_Tex` + `_sampler`)
pub const DEFAULT_SAMPLER_SUFFIX: &str = "_sampler";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Suffix used to pair a sampler with its texture during reflection
    pub sampler_suffix: String,

    /// Report unbound variables when a binding is verified before commit
    pub verify_bindings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sampler_suffix: DEFAULT_SAMPLER_SUFFIX.to_string(),
            verify_bindings: cfg!(debug_assertions),
        }
    }
}
