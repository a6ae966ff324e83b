/// Graphics device module - capabilities the shader system consumes
///
/// The core never talks to Vulkan directly. It creates layouts, writes
/// descriptor sets and records binds through the traits declared here;
/// backends (see `vulkaneer_renderer_vulkan`) provide the implementations.

// Module declarations
pub mod handle;
pub mod descriptor;
pub mod graphics_device;
pub mod config;

// Re-exports
pub use handle::*;
pub use descriptor::*;
pub use graphics_device::*;
pub use config::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
