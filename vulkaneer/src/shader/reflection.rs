/// Reflector - per-stage resource declarations decoded from SPIR-V
///
/// Uses spirq to walk the module metadata. Every descriptor variable of the
/// module is reported, referenced by an entry point or not. Descriptor arrays
/// of arrays are flattened with rspirv first, so a binding's count covers all
/// of its dimensions.

use std::collections::BTreeMap;
use rspirv::binary::Assemble;
use rspirv::dr::{Instruction, Module, Operand};
use rspirv::spirv::{Op, StorageClass, Word};
use rustc_hash::FxHashSet;
use crate::engine_error;
use crate::engine_trace;
use crate::error::{Error, Result};
use crate::graphics_device::{DescriptorType, PushConstantRange, ShaderStage};
use crate::shader::SPIRV_MAGIC;

/// Words in a SPIR-V header (magic, version, generator, bound, schema)
const SPIRV_HEADER_WORDS: usize = 5;

/// Replaces the reflected descriptor type of the resource named `name`
///
/// Reflection cannot tell a dynamic uniform buffer from a plain one; an
/// override is how callers ask for `UniformBufferDynamic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionOverride {
    pub name: String,
    pub descriptor_type: DescriptorType,
}

impl ReflectionOverride {
    pub fn new(name: impl Into<String>, descriptor_type: DescriptorType) -> Self {
        Self { name: name.into(), descriptor_type }
    }
}

/// One resource declared by a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageBinding {
    pub binding: u32,
    /// Declared type, after overrides
    pub descriptor_type: DescriptorType,
    /// Product of the array dimensions (1 for non-arrays)
    pub count: u32,
    /// Declared resource name (empty when the module carries no debug name)
    pub name: String,
}

/// Resources a stage declares in one descriptor set, ascending by binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDescriptorSet {
    pub set: u32,
    pub bindings: Vec<StageBinding>,
}

/// Everything the layout merger needs from one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReflection {
    pub stage: ShaderStage,
    /// Declared sets, ascending by set number
    pub sets: Vec<StageDescriptorSet>,
    /// First push constant block of the stage
    pub push_constant: Option<PushConstantRange>,
}

impl StageReflection {
    /// Find a declared binding by name
    pub fn find(&self, name: &str) -> Option<(u32, &StageBinding)> {
        self.sets.iter().find_map(|set| {
            set.bindings
                .iter()
                .find(|b| b.name == name)
                .map(|b| (set.set, b))
        })
    }
}

/// Decode the resource interface of one stage
///
/// Malformed bytecode is reported as `Error::ReflectionFailed`.
pub fn reflect_stage(
    code: &[u32],
    stage: ShaderStage,
    overrides: &[ReflectionOverride],
) -> Result<StageReflection> {
    if code.len() < SPIRV_HEADER_WORDS || code[0] != SPIRV_MAGIC {
        engine_error!("vkn::Reflector", "{:?} stage code is not a SPIR-V module", stage);
        return Err(Error::ReflectionFailed(format!(
            "{:?} stage code is not a SPIR-V module ({} words)", stage, code.len()
        )));
    }

    let flattened = flatten_descriptor_arrays(code)?;
    let code = flattened.as_deref().unwrap_or(code);

    let entry_points = spirq::ReflectConfig::new()
        .spv(code)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| {
            engine_error!("vkn::Reflector", "SPIR-V reflection failed: {:?}", e);
            Error::ReflectionFailed(format!("{:?}", e))
        })?;

    let mut sets: BTreeMap<u32, BTreeMap<u32, StageBinding>> = BTreeMap::new();
    let mut push_constant = None;

    for entry_point in &entry_points {
        for var in entry_point.vars.iter() {
            match var {
                spirq::var::Variable::Descriptor { name, desc_bind, desc_ty, nbind, .. } => {
                    let name = name.clone().unwrap_or_default();
                    // Overrides match by name; unnamed resources keep their reflected type
                    let descriptor_type = match overrides.iter().find(|o| !name.is_empty() && o.name == name) {
                        Some(o) => o.descriptor_type,
                        None => convert_descriptor_type(desc_ty.clone())?,
                    };

                    // Several entry points of one module see the same variables
                    sets.entry(desc_bind.set())
                        .or_default()
                        .entry(desc_bind.bind())
                        .or_insert_with(|| StageBinding {
                            binding: desc_bind.bind(),
                            descriptor_type,
                            count: (*nbind).max(1),
                            name,
                        });
                }
                spirq::var::Variable::PushConstant { ty, .. } if push_constant.is_none() => {
                    push_constant = Some(push_constant_range(ty, stage)?);
                }
                _ => {}
            }
        }
    }

    let sets: Vec<StageDescriptorSet> = sets
        .into_iter()
        .map(|(set, bindings)| StageDescriptorSet {
            set,
            bindings: bindings.into_values().collect(),
        })
        .collect();

    for set in &sets {
        for b in &set.bindings {
            engine_trace!("vkn::Reflector", "{:?}: set {} binding {} '{}' {:?} x{}",
                stage, set.set, b.binding, b.name, b.descriptor_type, b.count);
        }
    }

    Ok(StageReflection { stage, sets, push_constant })
}

fn convert_descriptor_type(desc_ty: spirq::ty::DescriptorType) -> Result<DescriptorType> {
    use spirq::ty::DescriptorType as Spirq;
    let descriptor_type = match desc_ty {
        Spirq::Sampler() => DescriptorType::Sampler,
        Spirq::CombinedImageSampler() => DescriptorType::CombinedImageSampler,
        Spirq::SampledImage() => DescriptorType::SampledImage,
        Spirq::StorageImage(..) => DescriptorType::StorageImage,
        Spirq::UniformTexelBuffer(..) => DescriptorType::UniformTexelBuffer,
        Spirq::StorageTexelBuffer(..) => DescriptorType::StorageTexelBuffer,
        Spirq::UniformBuffer() => DescriptorType::UniformBuffer,
        Spirq::StorageBuffer(..) => DescriptorType::StorageBuffer,
        Spirq::InputAttachment(..) => DescriptorType::InputAttachment,
        Spirq::AccelStruct(..) => DescriptorType::AccelerationStructure,
        #[allow(unreachable_patterns)]
        other => {
            engine_error!("vkn::Reflector", "Unsupported SPIR-V descriptor type: {:?}", other);
            return Err(Error::ReflectionFailed(format!(
                "unsupported descriptor type {:?}", other
            )));
        }
    };
    Ok(descriptor_type)
}

// ============================================================================
// Descriptor array flattening
// ============================================================================

/// Rewrite every descriptor array of arrays as a one-dimensional array
///
/// `uniform sampler2D maps[2][3]` is reflected as `maps[6]`. Returns `None`
/// when the module declares no such array and can be reflected as is.
fn flatten_descriptor_arrays(code: &[u32]) -> Result<Option<Vec<u32>>> {
    let mut module = match rspirv::dr::load_words(code) {
        Ok(module) => module,
        // spirq reports malformed modules
        Err(e) => {
            engine_trace!("vkn::Reflector", "Descriptor arrays left as declared: {:?}", e);
            return Ok(None);
        }
    };

    let mut seen = FxHashSet::default();
    let mut nested = Vec::new();
    for inst in &module.types_global_values {
        if inst.class.opcode != Op::Variable {
            continue;
        }
        let Some(Operand::StorageClass(storage)) = inst.operands.first() else { continue };
        if !matches!(storage, StorageClass::UniformConstant | StorageClass::Uniform | StorageClass::StorageBuffer) {
            continue;
        }
        let Some(pointee) = inst.result_type
            .and_then(|pointer| global(&module, pointer))
            .and_then(|pointer| id_operand(pointer.operands.get(1)))
        else {
            continue;
        };
        let Some(outer) = array_dims(&module, pointee) else { continue };
        if array_dims(&module, outer.element).is_none() || !seen.insert(pointee) {
            continue;
        }

        let mut element = outer.element;
        let mut count = outer.length;
        while let Some(inner) = array_dims(&module, element) {
            element = inner.element;
            count = count.saturating_mul(inner.length);
        }
        nested.push((pointee, element, count, outer.length_type));
    }

    if nested.is_empty() {
        return Ok(None);
    }

    for (array, element, count, length_type) in nested {
        let Some(header) = module.header.as_mut() else {
            return Err(Error::ReflectionFailed("SPIR-V module has no header".to_string()));
        };
        let length = header.bound;
        header.bound += 1;

        let index = module.types_global_values
            .iter()
            .position(|inst| inst.result_id == Some(array))
            .ok_or_else(|| Error::ReflectionFailed(format!("array type %{} vanished", array)))?;
        module.types_global_values[index].operands = vec![Operand::IdRef(element), Operand::IdRef(length)];
        // The new length must be declared before the array using it
        module.types_global_values.insert(
            index,
            Instruction::new(Op::Constant, Some(length_type), Some(length), vec![Operand::LiteralBit32(count)]),
        );
        engine_trace!("vkn::Reflector", "Flattened descriptor array %{} to {} element(s)", array, count);
    }

    Ok(Some(module.assemble()))
}

/// Element type and constant length of an `OpTypeArray`
struct ArrayDims {
    element: Word,
    length: u32,
    length_type: Word,
}

fn array_dims(module: &Module, id: Word) -> Option<ArrayDims> {
    let inst = global(module, id)?;
    if inst.class.opcode != Op::TypeArray {
        return None;
    }
    let element = id_operand(inst.operands.first())?;
    let length = global(module, id_operand(inst.operands.get(1))?)?;
    match (length.class.opcode, length.result_type, length.operands.first()) {
        (Op::Constant, Some(length_type), Some(Operand::LiteralBit32(n))) => Some(ArrayDims {
            element,
            length: *n,
            length_type,
        }),
        _ => None,
    }
}

fn global(module: &Module, id: Word) -> Option<&Instruction> {
    module.types_global_values.iter().find(|inst| inst.result_id == Some(id))
}

fn id_operand(operand: Option<&Operand>) -> Option<Word> {
    match operand {
        Some(Operand::IdRef(id)) => Some(*id),
        _ => None,
    }
}

// ============================================================================
// Push constants
// ============================================================================

/// Range covered by a push constant block: from its first member to its end
fn push_constant_range(ty: &spirq::ty::Type, stage: ShaderStage) -> Result<PushConstantRange> {
    let size = ty.nbyte().ok_or_else(|| {
        Error::ReflectionFailed(format!("{:?} push constant block has no static size", stage))
    })? as u32;

    let offset = match ty {
        spirq::ty::Type::Struct(st) => st.members
            .iter()
            .filter_map(|m| m.offset)
            .min()
            .unwrap_or(0) as u32,
        _ => 0,
    };

    Ok(PushConstantRange {
        stage_flags: stage.flags(),
        offset,
        size: size.saturating_sub(offset),
    })
}

#[cfg(test)]
#[path = "reflection_tests.rs"]
mod tests;
