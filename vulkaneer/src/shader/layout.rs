/// Layout merger - per-stage declarations folded into four set layouts
///
/// Set slots are fixed: 0 = global/frame, 1 = per-object, 2 = material,
/// 3 = spare. Empty slots carry no layout and hash to `EMPTY_SET_HASH`.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use crate::error::{Error, Result};
use crate::graphics_device::{DescriptorSetLayoutBinding, DescriptorSetLayoutHandle, PushConstantRange};
use crate::shader::StageReflection;

/// Number of descriptor set slots an effect can use
pub const MAX_DESCRIPTOR_SETS: usize = 4;

/// Hash of a set slot without bindings
pub const EMPTY_SET_HASH: u32 = 0;

/// Merged, sorted layout of one descriptor set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSetLayoutDesc {
    /// Set index (0..MAX_DESCRIPTOR_SETS)
    pub set: u32,
    /// Bindings, strictly ascending by binding number
    pub bindings: Vec<DescriptorSetLayoutBinding>,
    /// Content hash (see `hash_descriptor_set_layout`)
    pub hash: u32,
}

impl DescriptorSetLayoutDesc {
    /// Binding entry for `binding`, if declared
    pub fn binding(&self, binding: u32) -> Option<&DescriptorSetLayoutBinding> {
        self.bindings
            .binary_search_by_key(&binding, |b| b.binding)
            .ok()
            .map(|index| &self.bindings[index])
    }
}

// ============================================================================
// Hash
// ============================================================================

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a
struct Fnv1a(u32);

impl Fnv1a {
    fn new() -> Self {
        Self(FNV_OFFSET_BASIS)
    }

    fn write_u32(&mut self, value: u32) {
        for byte in value.to_le_bytes() {
            self.0 ^= byte as u32;
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }
}

/// Stable content hash of a sorted binding list
///
/// Hashes the layout flags (always 0), the binding count, then
/// `(binding, count, type, stage mask)` of each binding as little-endian
/// words. An empty list hashes to `EMPTY_SET_HASH`.
pub fn hash_descriptor_set_layout(bindings: &[DescriptorSetLayoutBinding]) -> u32 {
    if bindings.is_empty() {
        return EMPTY_SET_HASH;
    }

    let mut hasher = Fnv1a::new();
    hasher.write_u32(0);
    hasher.write_u32(bindings.len() as u32);
    for b in bindings {
        hasher.write_u32(b.binding);
        hasher.write_u32(b.count);
        hasher.write_u32(b.descriptor_type.as_raw());
        hasher.write_u32(b.stage_flags.bits());
    }
    hasher.0
}

// ============================================================================
// Merge
// ============================================================================

/// Merge stage declarations into the four set slots
///
/// Bindings declared by several stages appear once with the union of their
/// stage bits. Stages must agree on type and count of a shared binding.
pub fn merge_set_layouts(
    stages: &[StageReflection],
) -> Result<[Option<DescriptorSetLayoutDesc>; MAX_DESCRIPTOR_SETS]> {
    let mut merged: [BTreeMap<u32, DescriptorSetLayoutBinding>; MAX_DESCRIPTOR_SETS] = Default::default();

    for stage in stages {
        for set in &stage.sets {
            let slot = merged.get_mut(set.set as usize).ok_or_else(|| {
                Error::ReflectionFailed(format!(
                    "{:?} stage uses descriptor set {} (max {})",
                    stage.stage, set.set, MAX_DESCRIPTOR_SETS - 1
                ))
            })?;

            for b in &set.bindings {
                match slot.entry(b.binding) {
                    Entry::Vacant(entry) => {
                        entry.insert(DescriptorSetLayoutBinding {
                            binding: b.binding,
                            descriptor_type: b.descriptor_type,
                            count: b.count,
                            stage_flags: stage.stage.flags(),
                        });
                    }
                    Entry::Occupied(mut entry) => {
                        let existing = entry.get_mut();
                        if existing.descriptor_type != b.descriptor_type || existing.count != b.count {
                            return Err(Error::LayoutMismatch(format!(
                                "set {} binding {} ('{}'): {:?} x{} in {:?} stage, {:?} x{} elsewhere",
                                set.set, b.binding, b.name,
                                b.descriptor_type, b.count, stage.stage,
                                existing.descriptor_type, existing.count
                            )));
                        }
                        existing.stage_flags |= stage.stage.flags();
                    }
                }
            }
        }
    }

    Ok(std::array::from_fn(|index| {
        let bindings: Vec<DescriptorSetLayoutBinding> =
            std::mem::take(&mut merged[index]).into_values().collect();
        if bindings.is_empty() {
            None
        } else {
            Some(DescriptorSetLayoutDesc {
                set: index as u32,
                hash: hash_descriptor_set_layout(&bindings),
                bindings,
            })
        }
    }))
}

/// Per-slot hashes (`EMPTY_SET_HASH` for empty slots)
pub fn set_hashes(layouts: &[Option<DescriptorSetLayoutDesc>; MAX_DESCRIPTOR_SETS]) -> [u32; MAX_DESCRIPTOR_SETS] {
    std::array::from_fn(|index| {
        layouts[index].as_ref().map_or(EMPTY_SET_HASH, |desc| desc.hash)
    })
}

/// Non-null set layouts in set order, as handed to pipeline layout creation
pub fn compact_set_layouts(handles: &[DescriptorSetLayoutHandle]) -> Vec<DescriptorSetLayoutHandle> {
    handles.iter().copied().filter(|h| !h.is_null()).collect()
}

/// Push constant range of every stage that declares one, in stage order
pub fn collect_push_constant_ranges(stages: &[StageReflection]) -> Vec<PushConstantRange> {
    stages.iter().filter_map(|s| s.push_constant).collect()
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
