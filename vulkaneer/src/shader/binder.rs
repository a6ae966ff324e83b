/// ShaderDescriptorBinder - per draw/object descriptor state
///
/// Accumulates buffer writes against the named bindings of an effect and
/// allocates + writes a descriptor set only when a bound resource changed.
/// Dynamic offsets are supplied at bind time, so changing only an offset
/// never costs a new set.

use std::sync::Arc;
use crate::{engine_trace, engine_warn, engine_error};
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, DescriptorAllocator, CommandStream,
    BufferInfo, DescriptorSetHandle, DescriptorType, DescriptorWrite,
};
use crate::shader::{ShaderEffect, MAX_DESCRIPTOR_SETS, EMPTY_SET_HASH};

/// Sets rebound by `apply_binds` (global/frame and per-object).
/// Material sets (2 and above) are bound by the caller.
pub const BINDER_APPLIED_SETS: usize = 2;

/// Pending buffer write into one `(set, binding)` of the bound effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferWriteDescriptor {
    pub dst_set: u32,
    pub dst_binding: u32,
    pub descriptor_type: DescriptorType,
    pub buffer_info: BufferInfo,
    /// Offset applied at bind time (None = bound without one)
    pub dynamic_offset: Option<u32>,
}

/// State of one set slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetState {
    /// No pending write, no realized set
    Empty,
    /// Writes pending, no realized set
    Dirty,
    /// Realized descriptor set up to date with the writes
    Bound,
}

#[derive(Debug, Default)]
pub struct ShaderDescriptorBinder {
    effect: Option<Arc<ShaderEffect>>,
    buffer_writes: Vec<BufferWriteDescriptor>,
    cached_descriptor_sets: [Option<DescriptorSetHandle>; MAX_DESCRIPTOR_SETS],
    set_offsets: [Vec<u32>; MAX_DESCRIPTOR_SETS],
}

impl ShaderDescriptorBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a reflected effect
    ///
    /// Set slots whose layout hash changed, or that are empty in the new
    /// effect, lose their realized set. Slots with an identical non-empty
    /// layout keep it. Pending writes of a reset slot are kept only where the
    /// new effect declares the same binding with the same type.
    pub fn set_shader(&mut self, effect: Arc<ShaderEffect>) -> Result<()> {
        if !effect.is_reflected() {
            engine_error!("vkn::ShaderDescriptorBinder", "set_shader called with an unreflected effect");
            return Err(Error::InvalidOperation(
                "set_shader called with an unreflected effect".to_string(),
            ));
        }

        let invalidated: [bool; MAX_DESCRIPTOR_SETS] = match &self.effect {
            Some(previous) => std::array::from_fn(|set| {
                let hash = effect.set_hash(set);
                hash == EMPTY_SET_HASH || hash != previous.set_hash(set)
            }),
            None => [true; MAX_DESCRIPTOR_SETS],
        };

        for (set, cached) in self.cached_descriptor_sets.iter_mut().enumerate() {
            if invalidated[set] {
                *cached = None;
            }
        }

        let before = self.buffer_writes.len();
        self.buffer_writes.retain(|w| {
            !invalidated[w.dst_set as usize]
                || effect
                    .set_layout_desc(w.dst_set as usize)
                    .and_then(|desc| desc.binding(w.dst_binding))
                    .is_some_and(|b| b.descriptor_type == w.descriptor_type)
        });
        if self.buffer_writes.len() != before {
            engine_trace!("vkn::ShaderDescriptorBinder", "set_shader dropped {} incompatible write(s)",
                before - self.buffer_writes.len());
        }

        self.effect = Some(effect);
        Ok(())
    }

    /// Bind a buffer to the resource named `name`
    pub fn bind_buffer(&mut self, name: &str, buffer_info: BufferInfo) {
        self.bind(name, None, buffer_info);
    }

    /// Bind a buffer with a dynamic offset to the resource named `name`
    ///
    /// Rebinding the same buffer region with another offset keeps the
    /// realized set; only the offset passed to `apply_binds` changes.
    pub fn bind_dynamic_buffer(&mut self, name: &str, dynamic_offset: u32, buffer_info: BufferInfo) {
        self.bind(name, Some(dynamic_offset), buffer_info);
    }

    fn bind(&mut self, name: &str, dynamic_offset: Option<u32>, buffer_info: BufferInfo) {
        let Some(effect) = &self.effect else {
            engine_trace!("vkn::ShaderDescriptorBinder", "bind '{}' ignored: no effect bound", name);
            return;
        };
        // The effect does not use this resource
        let Some(reflected) = effect.binding(name).copied() else {
            engine_trace!("vkn::ShaderDescriptorBinder", "bind '{}' ignored: unknown binding", name);
            return;
        };
        if !reflected.descriptor_type.is_buffer() {
            engine_warn!("vkn::ShaderDescriptorBinder", "bind '{}' ignored: {:?} is not a buffer binding",
                name, reflected.descriptor_type);
            return;
        }

        let set = reflected.set as usize;
        let existing = self.buffer_writes
            .iter_mut()
            .find(|w| w.dst_set == reflected.set && w.dst_binding == reflected.binding);

        match existing {
            Some(write) if write.buffer_info == buffer_info => {
                write.dynamic_offset = dynamic_offset;
            }
            Some(write) => {
                write.buffer_info = buffer_info;
                write.dynamic_offset = dynamic_offset;
                self.cached_descriptor_sets[set] = None;
            }
            None => {
                self.buffer_writes.push(BufferWriteDescriptor {
                    dst_set: reflected.set,
                    dst_binding: reflected.binding,
                    descriptor_type: reflected.descriptor_type,
                    buffer_info,
                    dynamic_offset,
                });
                self.cached_descriptor_sets[set] = None;
            }
        }
    }

    /// Realize every dirty set
    ///
    /// Recomputes the dynamic offsets of every set (binding order), then
    /// allocates and writes one descriptor set per set with pending writes
    /// and no realized set. An allocation failure is returned as is; sets
    /// realized before it stay realized.
    pub fn build_sets(
        &mut self,
        device: &dyn GraphicsDevice,
        allocator: &mut dyn DescriptorAllocator,
    ) -> Result<()> {
        let Some(effect) = self.effect.clone() else {
            return Ok(());
        };

        self.buffer_writes.sort_by_key(|w| (w.dst_set, w.dst_binding));

        for offsets in &mut self.set_offsets {
            offsets.clear();
        }
        for w in self.buffer_writes.iter().filter(|w| w.descriptor_type.is_dynamic()) {
            self.set_offsets[w.dst_set as usize].push(w.dynamic_offset.unwrap_or(0));
        }

        for set in 0..MAX_DESCRIPTOR_SETS {
            if self.cached_descriptor_sets[set].is_some() {
                continue;
            }
            let pending: Vec<&BufferWriteDescriptor> = self.buffer_writes
                .iter()
                .filter(|w| w.dst_set as usize == set)
                .collect();
            if pending.is_empty() {
                continue;
            }

            let descriptor_set = allocator.allocate(effect.set_layout(set)).map_err(|e| {
                engine_error!("vkn::ShaderDescriptorBinder", "Descriptor set {} allocation failed: {}", set, e);
                e
            })?;

            let writes: Vec<DescriptorWrite> = pending
                .iter()
                .map(|w| DescriptorWrite {
                    dst_set: descriptor_set,
                    dst_binding: w.dst_binding,
                    descriptor_type: w.descriptor_type,
                    buffer_info: w.buffer_info,
                })
                .collect();
            device.update_descriptor_sets(&writes);

            self.cached_descriptor_sets[set] = Some(descriptor_set);
            engine_trace!("vkn::ShaderDescriptorBinder", "Realized set {} with {} write(s)", set, writes.len());
        }

        Ok(())
    }

    /// Record binds of the realized sets 0 and 1 with their dynamic offsets
    pub fn apply_binds(&self, cmd: &mut dyn CommandStream) {
        let Some(effect) = &self.effect else {
            return;
        };

        for set in 0..BINDER_APPLIED_SETS {
            if let Some(descriptor_set) = self.cached_descriptor_sets[set] {
                cmd.bind_descriptor_sets(
                    effect.pipeline_layout(),
                    set as u32,
                    &[descriptor_set],
                    &self.set_offsets[set],
                );
            }
        }
    }

    /// Forget every pending write and realized set
    ///
    /// Call when the allocator the realized sets came from was reset.
    pub fn reset(&mut self) {
        self.buffer_writes.clear();
        self.cached_descriptor_sets = [None; MAX_DESCRIPTOR_SETS];
        for offsets in &mut self.set_offsets {
            offsets.clear();
        }
    }

    // ===== introspection =====

    pub fn set_state(&self, set: usize) -> SetState {
        if self.cached_set(set).is_some() {
            SetState::Bound
        } else if self.buffer_writes.iter().any(|w| w.dst_set as usize == set) {
            SetState::Dirty
        } else {
            SetState::Empty
        }
    }

    /// Realized descriptor set of `set`
    pub fn cached_set(&self, set: usize) -> Option<DescriptorSetHandle> {
        self.cached_descriptor_sets.get(set).copied().flatten()
    }

    /// Dynamic offsets of `set` as of the last `build_sets`
    pub fn dynamic_offsets(&self, set: usize) -> &[u32] {
        self.set_offsets.get(set).map_or(&[][..], Vec::as_slice)
    }

    pub fn pending_writes(&self) -> &[BufferWriteDescriptor] {
        &self.buffer_writes
    }

    pub fn effect(&self) -> Option<&Arc<ShaderEffect>> {
        self.effect.as_ref()
    }
}

#[cfg(test)]
#[path = "binder_tests.rs"]
mod tests;
