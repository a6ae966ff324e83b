/*!
# Vulkaneer - Vulkan Backend

Vulkan implementations of the vulkaneer device traits, built on ash:

- [`VulkanDevice`]: `GraphicsDevice` (shader modules, set layouts, pipeline
  layouts, descriptor writes)
- [`VulkanDescriptorAllocator`]: `DescriptorAllocator` over growable descriptor pools
- [`VulkanCommandStream`]: `CommandStream` recording `vkCmdBindDescriptorSets`

Instance, device and command buffer lifetimes stay with the application.

```no_run
use std::sync::Arc;
use vulkaneer::vkn::render::DescriptorPoolConfig;
use vulkaneer::vkn::shader::{ShaderCache, ShaderEffect};
use vulkaneer_renderer_vulkan::{VulkanDevice, VulkanDescriptorAllocator};

# fn f(ash_device: Arc<ash::Device>) -> vulkaneer::vkn::Result<()> {
let device = Arc::new(VulkanDevice::new(ash_device.clone()));
let mut cache = ShaderCache::new(device.clone());
let mut allocator = VulkanDescriptorAllocator::new(ash_device, DescriptorPoolConfig::default())?;
# Ok(())
# }
```
*/

mod vulkan_format;
mod vulkan_device;
mod vulkan_descriptor_allocator;
mod vulkan_command_stream;
mod vulkan_shader;
mod vulkan_debug;

pub use vulkan_device::VulkanDevice;
pub use vulkan_descriptor_allocator::VulkanDescriptorAllocator;
pub use vulkan_command_stream::VulkanCommandStream;
pub use vulkan_shader::{pipeline_stage_create_infos, SHADER_ENTRY_POINT};

// Re-export debug utilities
pub use vulkan_debug::{
    vulkan_debug_callback, debug_messenger_create_info, get_validation_stats, reset_validation_stats,
    ValidationStats,
};
