/// GraphicsDevice, DescriptorAllocator and CommandStream traits
///
/// Implemented by backend-specific types (e.g., VulkanDevice). Handles are
/// opaque; the core only stores them and passes them back.

use crate::error::Result;
use crate::graphics_device::{
    ShaderModuleHandle, DescriptorSetLayoutHandle, PipelineLayoutHandle, DescriptorSetHandle,
    DescriptorSetLayoutBinding, PushConstantRange, DescriptorWrite,
};

/// Device on which shader modules, layouts and descriptor writes are created
pub trait GraphicsDevice: Send + Sync {
    /// Create a shader module from SPIR-V words
    fn create_shader_module(&self, code: &[u32]) -> Result<ShaderModuleHandle>;

    /// Destroy a shader module
    fn destroy_shader_module(&self, module: ShaderModuleHandle);

    /// Create a descriptor set layout from bindings sorted by binding number
    fn create_descriptor_set_layout(
        &self,
        bindings: &[DescriptorSetLayoutBinding],
    ) -> Result<DescriptorSetLayoutHandle>;

    /// Destroy a descriptor set layout
    fn destroy_descriptor_set_layout(&self, layout: DescriptorSetLayoutHandle);

    /// Create a pipeline layout from compacted set layouts and push constant ranges
    fn create_pipeline_layout(
        &self,
        set_layouts: &[DescriptorSetLayoutHandle],
        push_constant_ranges: &[PushConstantRange],
    ) -> Result<PipelineLayoutHandle>;

    /// Destroy a pipeline layout
    fn destroy_pipeline_layout(&self, layout: PipelineLayoutHandle);

    /// Submit a batch of descriptor writes
    fn update_descriptor_sets(&self, writes: &[DescriptorWrite]);
}

/// Source of descriptor sets
///
/// Callers own one allocator per frame in flight; access is not synchronized.
pub trait DescriptorAllocator {
    /// Allocate one descriptor set with the given layout
    ///
    /// Returns `Error::AllocatorExhausted` when no set can be provided.
    fn allocate(&mut self, layout: DescriptorSetLayoutHandle) -> Result<DescriptorSetHandle>;
}

/// Command stream receiving descriptor binds
pub trait CommandStream {
    /// Record a bind of consecutive descriptor sets starting at `first_set`
    fn bind_descriptor_sets(
        &mut self,
        layout: PipelineLayoutHandle,
        first_set: u32,
        sets: &[DescriptorSetHandle],
        dynamic_offsets: &[u32],
    );
}
