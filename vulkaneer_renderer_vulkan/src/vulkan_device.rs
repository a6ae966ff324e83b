/// VulkanDevice - GraphicsDevice implementation on top of an ash::Device
///
/// Creates the objects the shader system asks for (modules, set layouts,
/// pipeline layouts) and submits descriptor writes. The device does not own
/// the ash::Device: destroying it is the caller's job.

use std::sync::Arc;
use ash::vk;
use vulkaneer::vkn::Result;
use vulkaneer::vkn::render::{
    GraphicsDevice, ShaderModuleHandle, DescriptorSetLayoutHandle, PipelineLayoutHandle,
    DescriptorSetLayoutBinding, PushConstantRange, DescriptorWrite,
};
use vulkaneer::engine_trace;

use crate::vulkan_format::{
    descriptor_type_to_vk, layout_binding_to_vk, push_constant_range_to_vk, vk_result_to_error,
    shader_module_to_vk, shader_module_from_vk, set_layout_to_vk, set_layout_from_vk,
    pipeline_layout_to_vk, pipeline_layout_from_vk, descriptor_set_to_vk, buffer_to_vk,
};

pub struct VulkanDevice {
    device: Arc<ash::Device>,
}

impl VulkanDevice {
    pub fn new(device: Arc<ash::Device>) -> Self {
        Self { device }
    }

    /// Underlying ash device
    pub fn raw(&self) -> &Arc<ash::Device> {
        &self.device
    }
}

impl GraphicsDevice for VulkanDevice {
    fn create_shader_module(&self, code: &[u32]) -> Result<ShaderModuleHandle> {
        let create_info = vk::ShaderModuleCreateInfo::default().code(code);

        unsafe {
            let module = self.device.create_shader_module(&create_info, None)
                .map_err(|e| vk_result_to_error("vkCreateShaderModule", e))?;
            Ok(shader_module_from_vk(module))
        }
    }

    fn destroy_shader_module(&self, module: ShaderModuleHandle) {
        if module.is_null() {
            return;
        }
        unsafe {
            self.device.destroy_shader_module(shader_module_to_vk(module), None);
        }
    }

    fn create_descriptor_set_layout(
        &self,
        bindings: &[DescriptorSetLayoutBinding],
    ) -> Result<DescriptorSetLayoutHandle> {
        let vk_bindings: Vec<vk::DescriptorSetLayoutBinding> =
            bindings.iter().map(layout_binding_to_vk).collect();
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&vk_bindings);

        unsafe {
            let layout = self.device.create_descriptor_set_layout(&create_info, None)
                .map_err(|e| vk_result_to_error("vkCreateDescriptorSetLayout", e))?;
            engine_trace!("vkn::VulkanDevice", "Created descriptor set layout with {} bindings", bindings.len());
            Ok(set_layout_from_vk(layout))
        }
    }

    fn destroy_descriptor_set_layout(&self, layout: DescriptorSetLayoutHandle) {
        if layout.is_null() {
            return;
        }
        unsafe {
            self.device.destroy_descriptor_set_layout(set_layout_to_vk(layout), None);
        }
    }

    fn create_pipeline_layout(
        &self,
        set_layouts: &[DescriptorSetLayoutHandle],
        push_constant_ranges: &[PushConstantRange],
    ) -> Result<PipelineLayoutHandle> {
        let vk_set_layouts: Vec<vk::DescriptorSetLayout> =
            set_layouts.iter().map(|layout| set_layout_to_vk(*layout)).collect();
        let vk_ranges: Vec<vk::PushConstantRange> =
            push_constant_ranges.iter().map(push_constant_range_to_vk).collect();
        let create_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(&vk_set_layouts)
            .push_constant_ranges(&vk_ranges);

        unsafe {
            let layout = self.device.create_pipeline_layout(&create_info, None)
                .map_err(|e| vk_result_to_error("vkCreatePipelineLayout", e))?;
            Ok(pipeline_layout_from_vk(layout))
        }
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayoutHandle) {
        if layout.is_null() {
            return;
        }
        unsafe {
            self.device.destroy_pipeline_layout(pipeline_layout_to_vk(layout), None);
        }
    }

    fn update_descriptor_sets(&self, writes: &[DescriptorWrite]) {
        if writes.is_empty() {
            return;
        }

        // Buffer infos must outlive the write structs pointing into them
        let buffer_infos: Vec<vk::DescriptorBufferInfo> = writes
            .iter()
            .map(|write| {
                vk::DescriptorBufferInfo::default()
                    .buffer(buffer_to_vk(write.buffer_info.buffer))
                    .offset(write.buffer_info.offset)
                    .range(write.buffer_info.range)
            })
            .collect();

        let vk_writes: Vec<vk::WriteDescriptorSet> = writes
            .iter()
            .zip(buffer_infos.iter())
            .map(|(write, buffer_info)| {
                vk::WriteDescriptorSet::default()
                    .dst_set(descriptor_set_to_vk(write.dst_set))
                    .dst_binding(write.dst_binding)
                    .dst_array_element(0)
                    .descriptor_type(descriptor_type_to_vk(write.descriptor_type))
                    .buffer_info(std::slice::from_ref(buffer_info))
            })
            .collect();

        unsafe {
            self.device.update_descriptor_sets(&vk_writes, &[]);
        }
    }
}
