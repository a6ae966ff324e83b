/// Conversions between vulkaneer types and ash/Vulkan types

use ash::vk;
use ash::vk::Handle;
use vulkaneer::engine_err;
use vulkaneer::engine_error;
use vulkaneer::vkn::Error;
use vulkaneer::vkn::render::{
    DescriptorType, ShaderStage, ShaderStageFlags, PushConstantRange, DescriptorSetLayoutBinding,
    ShaderModuleHandle, DescriptorSetLayoutHandle, PipelineLayoutHandle, DescriptorSetHandle, BufferHandle,
};

// ============================================================================
// Enums and flags
// ============================================================================

/// Convert DescriptorType to Vulkan descriptor type
pub fn descriptor_type_to_vk(descriptor_type: DescriptorType) -> vk::DescriptorType {
    match descriptor_type {
        DescriptorType::Sampler => vk::DescriptorType::SAMPLER,
        DescriptorType::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        DescriptorType::SampledImage => vk::DescriptorType::SAMPLED_IMAGE,
        DescriptorType::StorageImage => vk::DescriptorType::STORAGE_IMAGE,
        DescriptorType::UniformTexelBuffer => vk::DescriptorType::UNIFORM_TEXEL_BUFFER,
        DescriptorType::StorageTexelBuffer => vk::DescriptorType::STORAGE_TEXEL_BUFFER,
        DescriptorType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        DescriptorType::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
        DescriptorType::UniformBufferDynamic => vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
        DescriptorType::StorageBufferDynamic => vk::DescriptorType::STORAGE_BUFFER_DYNAMIC,
        DescriptorType::InputAttachment => vk::DescriptorType::INPUT_ATTACHMENT,
        DescriptorType::AccelerationStructure => vk::DescriptorType::ACCELERATION_STRUCTURE_KHR,
    }
}

/// Convert a single shader stage to its Vulkan stage bit
pub fn shader_stage_to_vk(stage: ShaderStage) -> vk::ShaderStageFlags {
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::TessellationControl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
        ShaderStage::TessellationEvaluation => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
        ShaderStage::Geometry => vk::ShaderStageFlags::GEOMETRY,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
        ShaderStage::Compute => vk::ShaderStageFlags::COMPUTE,
    }
}

/// Convert ShaderStageFlags to Vulkan shader stage flags
pub fn stage_flags_to_vk(flags: ShaderStageFlags) -> vk::ShaderStageFlags {
    let mut vk_flags = vk::ShaderStageFlags::empty();
    if flags.contains(ShaderStageFlags::VERTEX) { vk_flags |= vk::ShaderStageFlags::VERTEX; }
    if flags.contains(ShaderStageFlags::TESSELLATION_CONTROL) { vk_flags |= vk::ShaderStageFlags::TESSELLATION_CONTROL; }
    if flags.contains(ShaderStageFlags::TESSELLATION_EVALUATION) { vk_flags |= vk::ShaderStageFlags::TESSELLATION_EVALUATION; }
    if flags.contains(ShaderStageFlags::GEOMETRY) { vk_flags |= vk::ShaderStageFlags::GEOMETRY; }
    if flags.contains(ShaderStageFlags::FRAGMENT) { vk_flags |= vk::ShaderStageFlags::FRAGMENT; }
    if flags.contains(ShaderStageFlags::COMPUTE) { vk_flags |= vk::ShaderStageFlags::COMPUTE; }
    vk_flags
}

pub fn layout_binding_to_vk(binding: &DescriptorSetLayoutBinding) -> vk::DescriptorSetLayoutBinding<'static> {
    vk::DescriptorSetLayoutBinding::default()
        .binding(binding.binding)
        .descriptor_type(descriptor_type_to_vk(binding.descriptor_type))
        .descriptor_count(binding.count)
        .stage_flags(stage_flags_to_vk(binding.stage_flags))
}

pub fn push_constant_range_to_vk(range: &PushConstantRange) -> vk::PushConstantRange {
    vk::PushConstantRange {
        stage_flags: stage_flags_to_vk(range.stage_flags),
        offset: range.offset,
        size: range.size,
    }
}

// ============================================================================
// Handles
// ============================================================================

macro_rules! handle_conversions {
    ($to_vk:ident, $from_vk:ident, $handle:ty, $vk:ty) => {
        pub fn $to_vk(handle: $handle) -> $vk {
            <$vk>::from_raw(handle.as_raw())
        }

        pub fn $from_vk(object: $vk) -> $handle {
            <$handle>::from_raw(object.as_raw())
        }
    };
}

handle_conversions!(shader_module_to_vk, shader_module_from_vk, ShaderModuleHandle, vk::ShaderModule);
handle_conversions!(set_layout_to_vk, set_layout_from_vk, DescriptorSetLayoutHandle, vk::DescriptorSetLayout);
handle_conversions!(pipeline_layout_to_vk, pipeline_layout_from_vk, PipelineLayoutHandle, vk::PipelineLayout);
handle_conversions!(descriptor_set_to_vk, descriptor_set_from_vk, DescriptorSetHandle, vk::DescriptorSet);
handle_conversions!(buffer_to_vk, buffer_from_vk, BufferHandle, vk::Buffer);

// ============================================================================
// Results
// ============================================================================

/// Map a failed Vulkan call to an Error (logged)
pub fn vk_result_to_error(what: &str, result: vk::Result) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            engine_error!("vkn::vulkan", "{} failed: {:?}", what, result);
            Error::OutOfMemory
        }
        _ => engine_err!("vkn::vulkan", "{} failed: {:?}", what, result),
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
