/// Pipeline shader stage creation infos for ShaderEffect stages

use std::ffi::CStr;
use ash::vk;
use vulkaneer::vkn::render::PipelineShaderStage;

use crate::vulkan_format::{shader_stage_to_vk, shader_module_to_vk};

/// Entry point of every stage module
pub const SHADER_ENTRY_POINT: &CStr = c"main";

/// Convert filled stages to create infos for vkCreate*Pipelines
///
/// # Example
///
/// ```no_run
/// # use vulkaneer::vkn::shader::ShaderEffect;
/// # fn f(effect: &ShaderEffect) {
/// let mut stages = Vec::new();
/// effect.fill_stages(&mut stages);
/// let create_infos = vulkaneer_renderer_vulkan::pipeline_stage_create_infos(&stages);
/// # }
/// ```
pub fn pipeline_stage_create_infos(stages: &[PipelineShaderStage]) -> Vec<vk::PipelineShaderStageCreateInfo<'static>> {
    stages
        .iter()
        .map(|stage| {
            vk::PipelineShaderStageCreateInfo::default()
                .stage(shader_stage_to_vk(stage.stage))
                .module(shader_module_to_vk(stage.module))
                .name(SHADER_ENTRY_POINT)
        })
        .collect()
}
