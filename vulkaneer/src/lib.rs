/*!
# Vulkaneer

Reflection-driven descriptor and pipeline layouts for explicit graphics APIs.

Shader binaries are reflected to discover their resources, per-stage
declarations are merged into four hashed descriptor set layouts, and a
per-draw binder allocates and writes descriptor sets only when the bound
resources changed.

## Architecture

- **GraphicsDevice / DescriptorAllocator / CommandStream**: capabilities
  implemented by a backend (see `vulkaneer_renderer_vulkan`)
- **ShaderCache**: path-keyed cache of shader modules
- **ShaderEffect**: stages + merged set layouts + pipeline layout + name lookup
- **ShaderDescriptorBinder**: dirty tracking, lazy set realization and binds

## Example

```no_run
use std::sync::Arc;
use vulkaneer::vkn::render::{
    GraphicsDevice, DescriptorAllocator, CommandStream, BufferInfo, BufferHandle, ShaderStage,
};
use vulkaneer::vkn::shader::{
    ShaderCache, ShaderEffect, ShaderDescriptorBinder, ReflectionOverride,
};
use vulkaneer::vkn::render::DescriptorType;

fn draw(
    device: Arc<dyn GraphicsDevice>,
    allocator: &mut dyn DescriptorAllocator,
    cmd: &mut dyn CommandStream,
) -> vulkaneer::vkn::Result<()> {
    let mut cache = ShaderCache::new(device.clone());
    let mut effect = ShaderEffect::new();
    if let Some(module) = cache.get("shaders/mesh.vert.spv") {
        effect.add_stage(module, ShaderStage::Vertex);
    }
    if let Some(module) = cache.get("shaders/mesh.frag.spv") {
        effect.add_stage(module, ShaderStage::Fragment);
    }
    effect.reflect_layout(
        device.as_ref(),
        &[ReflectionOverride::new("object", DescriptorType::UniformBufferDynamic)],
    )?;
    let effect = Arc::new(effect);

    let mut binder = ShaderDescriptorBinder::new();
    binder.set_shader(effect)?;
    let objects = BufferInfo::new(BufferHandle::from_raw(1), 0, 256);
    binder.bind_dynamic_buffer("object", 512, objects);
    binder.build_sets(device.as_ref(), allocator)?;
    binder.apply_binds(cmd);
    Ok(())
}
```
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod shader;

// Main vkn namespace module
pub mod vkn {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Device capabilities, handles and descriptor types
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Reflection, layouts, effects, binder and cache
    pub mod shader {
        pub use crate::shader::*;
    }
}
