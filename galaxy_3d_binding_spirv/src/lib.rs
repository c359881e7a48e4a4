/*!
# Galaxy 3D Binding - SPIR-V Reflection Backend

SPIR-V implementation of the `ShaderReflector` trait, built on spirq.

Shaders compiled to SPIR-V (glslang, DXC with `-spirv`, naga, ...) are
reflected into the backend-neutral resource list that
`galaxy_3d_binding` turns into shader resource layouts.

```no_run
use galaxy_3d_binding::galaxy3d::shader::{Shader, ShaderDesc, ShaderType};
use galaxy_3d_binding_spirv::galaxy3d::SpirvReflector;

let bytecode = std::fs::read("shaders/lit.frag.spv").unwrap();
let desc = ShaderDesc::new("LitPS", ShaderType::Pixel);
let shader = Shader::new(desc, &bytecode, &SpirvReflector::new()).unwrap();
```
*/

mod spirv_reflector;

pub mod galaxy3d {
    pub use crate::spirv_reflector::{SpirvReflector, SPIRV_MAGIC};
}
