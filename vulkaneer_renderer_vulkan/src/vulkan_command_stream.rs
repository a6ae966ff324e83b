/// VulkanCommandStream - records descriptor binds into a command buffer
///
/// The command buffer must be in the recording state for as long as the
/// stream is used; beginning and ending it stays with the caller.

use std::sync::Arc;
use ash::vk;
use vulkaneer::vkn::render::{CommandStream, PipelineLayoutHandle, DescriptorSetHandle};

use crate::vulkan_format::{pipeline_layout_to_vk, descriptor_set_to_vk};

pub struct VulkanCommandStream {
    device: Arc<ash::Device>,
    command_buffer: vk::CommandBuffer,
    bind_point: vk::PipelineBindPoint,
}

impl VulkanCommandStream {
    pub fn new(device: Arc<ash::Device>, command_buffer: vk::CommandBuffer, bind_point: vk::PipelineBindPoint) -> Self {
        Self {
            device,
            command_buffer,
            bind_point,
        }
    }

    /// Stream recording graphics binds
    pub fn graphics(device: Arc<ash::Device>, command_buffer: vk::CommandBuffer) -> Self {
        Self::new(device, command_buffer, vk::PipelineBindPoint::GRAPHICS)
    }

    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }
}

impl CommandStream for VulkanCommandStream {
    fn bind_descriptor_sets(
        &mut self,
        layout: PipelineLayoutHandle,
        first_set: u32,
        sets: &[DescriptorSetHandle],
        dynamic_offsets: &[u32],
    ) {
        let vk_sets: Vec<vk::DescriptorSet> = sets.iter().map(|set| descriptor_set_to_vk(*set)).collect();

        unsafe {
            self.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                self.bind_point,
                pipeline_layout_to_vk(layout),
                first_set,
                &vk_sets,
                dynamic_offsets,
            );
        }
    }
}
