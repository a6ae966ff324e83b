/// ShaderEffect - the reflected interface of a shader program
///
/// An effect is assembled with `add_stage`, built once with `reflect_layout`,
/// then shared (`Arc<ShaderEffect>`) by pipelines and descriptor binders.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::{engine_debug, engine_error};
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, DescriptorType, DescriptorSetLayoutHandle, PipelineLayoutHandle,
    PushConstantRange, PipelineShaderStage, ShaderStage,
};
use crate::shader::{
    BinaryShaderModule, ReflectionOverride, StageReflection, DescriptorSetLayoutDesc,
    MAX_DESCRIPTOR_SETS, EMPTY_SET_HASH,
    reflect_stage, merge_set_layouts, set_hashes, compact_set_layouts, collect_push_constant_ranges,
};

/// One stage of an effect
#[derive(Debug, Clone)]
pub struct EffectStage {
    pub module: Arc<BinaryShaderModule>,
    pub stage: ShaderStage,
}

/// Location and type of a named resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReflectedBinding {
    pub set: u32,
    pub binding: u32,
    pub descriptor_type: DescriptorType,
}

#[derive(Debug, Default)]
pub struct ShaderEffect {
    stages: Vec<EffectStage>,
    set_layout_descs: [Option<DescriptorSetLayoutDesc>; MAX_DESCRIPTOR_SETS],
    set_layouts: [DescriptorSetLayoutHandle; MAX_DESCRIPTOR_SETS],
    set_hashes: [u32; MAX_DESCRIPTOR_SETS],
    pipeline_layout: PipelineLayoutHandle,
    push_constant_ranges: Vec<PushConstantRange>,
    bindings: FxHashMap<String, ReflectedBinding>,
    reflected: bool,
}

impl ShaderEffect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage (validated by `reflect_layout`)
    pub fn add_stage(&mut self, module: Arc<BinaryShaderModule>, stage: ShaderStage) {
        self.stages.push(EffectStage { module, stage });
    }

    /// Reflect every stage, merge the set layouts and create the device objects
    ///
    /// Must be called exactly once, after every stage was added. On failure
    /// the device objects created so far are destroyed and the effect stays
    /// unreflected.
    pub fn reflect_layout(
        &mut self,
        device: &dyn GraphicsDevice,
        overrides: &[ReflectionOverride],
    ) -> Result<()> {
        if self.reflected {
            return Err(Error::InvalidOperation("reflect_layout called twice".to_string()));
        }
        if self.stages.is_empty() {
            return Err(Error::InvalidOperation("reflect_layout called on an effect without stages".to_string()));
        }

        let reflections = self.stages
            .iter()
            .map(|s| reflect_stage(s.module.code(), s.stage, overrides))
            .collect::<Result<Vec<StageReflection>>>()?;

        let descs = merge_set_layouts(&reflections).map_err(|e| {
            engine_error!("vkn::ShaderEffect", "Layout merge failed: {}", e);
            e
        })?;

        let set_layouts = Self::create_set_layouts(device, &descs)?;

        let push_constant_ranges = collect_push_constant_ranges(&reflections);
        let compacted = compact_set_layouts(&set_layouts);
        let pipeline_layout = match device.create_pipeline_layout(&compacted, &push_constant_ranges) {
            Ok(layout) => layout,
            Err(e) => {
                engine_error!("vkn::ShaderEffect", "Pipeline layout creation failed: {}", e);
                for layout in compacted {
                    device.destroy_descriptor_set_layout(layout);
                }
                return Err(e);
            }
        };

        // Stage order: a name declared by a later stage wins
        let mut bindings = FxHashMap::default();
        for reflection in &reflections {
            for set in &reflection.sets {
                for b in set.bindings.iter().filter(|b| !b.name.is_empty()) {
                    bindings.insert(b.name.clone(), ReflectedBinding {
                        set: set.set,
                        binding: b.binding,
                        descriptor_type: b.descriptor_type,
                    });
                }
            }
        }

        self.set_hashes = set_hashes(&descs);
        self.set_layout_descs = descs;
        self.set_layouts = set_layouts;
        self.pipeline_layout = pipeline_layout;
        self.push_constant_ranges = push_constant_ranges;
        self.bindings = bindings;
        self.reflected = true;

        engine_debug!("vkn::ShaderEffect", "Reflected {} stage(s): {} named binding(s), set hashes {:08x?}",
            self.stages.len(), self.bindings.len(), self.set_hashes);

        Ok(())
    }

    fn create_set_layouts(
        device: &dyn GraphicsDevice,
        descs: &[Option<DescriptorSetLayoutDesc>; MAX_DESCRIPTOR_SETS],
    ) -> Result<[DescriptorSetLayoutHandle; MAX_DESCRIPTOR_SETS]> {
        let mut handles = [DescriptorSetLayoutHandle::NULL; MAX_DESCRIPTOR_SETS];

        for (index, desc) in descs.iter().enumerate() {
            let Some(desc) = desc else { continue };
            match device.create_descriptor_set_layout(&desc.bindings) {
                Ok(handle) => handles[index] = handle,
                Err(e) => {
                    engine_error!("vkn::ShaderEffect", "Descriptor set layout {} creation failed: {}", index, e);
                    for handle in compact_set_layouts(&handles) {
                        device.destroy_descriptor_set_layout(handle);
                    }
                    return Err(e);
                }
            }
        }

        Ok(handles)
    }

    /// Append one pipeline stage description per stage, in stage order
    pub fn fill_stages(&self, out: &mut Vec<PipelineShaderStage>) {
        out.extend(self.stages.iter().map(|s| PipelineShaderStage {
            stage: s.stage,
            module: s.module.handle(),
        }));
    }

    /// Destroy the set layouts and the pipeline layout
    ///
    /// The GPU must no longer use them and the effect must not be bound
    /// afterwards.
    pub fn destroy(&self, device: &dyn GraphicsDevice) {
        if !self.pipeline_layout.is_null() {
            device.destroy_pipeline_layout(self.pipeline_layout);
        }
        for layout in compact_set_layouts(&self.set_layouts) {
            device.destroy_descriptor_set_layout(layout);
        }
    }

    // ===== accessors =====

    /// Location of the resource named `name`
    pub fn binding(&self, name: &str) -> Option<&ReflectedBinding> {
        self.bindings.get(name)
    }

    pub fn bindings(&self) -> &FxHashMap<String, ReflectedBinding> {
        &self.bindings
    }

    pub fn stages(&self) -> &[EffectStage] {
        &self.stages
    }

    /// Device layout of `set` (null when the slot is empty or out of range)
    pub fn set_layout(&self, set: usize) -> DescriptorSetLayoutHandle {
        self.set_layouts.get(set).copied().unwrap_or(DescriptorSetLayoutHandle::NULL)
    }

    pub fn set_layout_desc(&self, set: usize) -> Option<&DescriptorSetLayoutDesc> {
        self.set_layout_descs.get(set).and_then(Option::as_ref)
    }

    /// Layout hash of `set` (`EMPTY_SET_HASH` when the slot is empty or out of range)
    pub fn set_hash(&self, set: usize) -> u32 {
        self.set_hashes.get(set).copied().unwrap_or(EMPTY_SET_HASH)
    }

    pub fn set_hashes(&self) -> &[u32; MAX_DESCRIPTOR_SETS] {
        &self.set_hashes
    }

    pub fn pipeline_layout(&self) -> PipelineLayoutHandle {
        self.pipeline_layout
    }

    pub fn push_constant_ranges(&self) -> &[PushConstantRange] {
        &self.push_constant_ranges
    }

    pub fn is_reflected(&self) -> bool {
        self.reflected
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
