/// Mock graphics device for unit tests (no GPU required)
///
/// Records every call so tests can assert on created layouts, descriptor
/// writes, allocations and binds.

use std::sync::Mutex;
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, DescriptorAllocator, CommandStream,
    ShaderModuleHandle, DescriptorSetLayoutHandle, PipelineLayoutHandle, DescriptorSetHandle,
    DescriptorSetLayoutBinding, PushConstantRange, DescriptorWrite,
};

// ============================================================================
// Mock Graphics Device
// ============================================================================

/// Pipeline layout creation recorded by the mock device
#[derive(Debug, Clone)]
pub struct MockPipelineLayout {
    pub handle: PipelineLayoutHandle,
    pub set_layouts: Vec<DescriptorSetLayoutHandle>,
    pub push_constant_ranges: Vec<PushConstantRange>,
}

#[derive(Debug, Default)]
struct MockDeviceState {
    next_handle: u64,
    shader_modules: Vec<(ShaderModuleHandle, usize)>,
    destroyed_shader_modules: Vec<ShaderModuleHandle>,
    set_layouts: Vec<(DescriptorSetLayoutHandle, Vec<DescriptorSetLayoutBinding>)>,
    destroyed_set_layouts: Vec<DescriptorSetLayoutHandle>,
    pipeline_layouts: Vec<MockPipelineLayout>,
    destroyed_pipeline_layouts: Vec<PipelineLayoutHandle>,
    write_batches: Vec<Vec<DescriptorWrite>>,
    fail_set_layout_after: Option<usize>,
    fail_pipeline_layout: bool,
}

impl MockDeviceState {
    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Recording GraphicsDevice
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    state: Mutex<MockDeviceState>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make set layout creation fail once `count` layouts exist
    pub fn fail_set_layouts_after(&self, count: usize) {
        self.state.lock().unwrap().fail_set_layout_after = Some(count);
    }

    /// Make pipeline layout creation fail
    pub fn fail_pipeline_layouts(&self) {
        self.state.lock().unwrap().fail_pipeline_layout = true;
    }

    pub fn shader_module_count(&self) -> usize {
        self.state.lock().unwrap().shader_modules.len()
    }

    /// Word count of the code passed to each create_shader_module call
    pub fn shader_module_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().shader_modules.iter().map(|(_, len)| *len).collect()
    }

    pub fn destroyed_shader_modules(&self) -> Vec<ShaderModuleHandle> {
        self.state.lock().unwrap().destroyed_shader_modules.clone()
    }

    pub fn set_layouts(&self) -> Vec<(DescriptorSetLayoutHandle, Vec<DescriptorSetLayoutBinding>)> {
        self.state.lock().unwrap().set_layouts.clone()
    }

    pub fn destroyed_set_layouts(&self) -> Vec<DescriptorSetLayoutHandle> {
        self.state.lock().unwrap().destroyed_set_layouts.clone()
    }

    pub fn pipeline_layouts(&self) -> Vec<MockPipelineLayout> {
        self.state.lock().unwrap().pipeline_layouts.clone()
    }

    pub fn destroyed_pipeline_layouts(&self) -> Vec<PipelineLayoutHandle> {
        self.state.lock().unwrap().destroyed_pipeline_layouts.clone()
    }

    /// Every update_descriptor_sets batch, in call order
    pub fn write_batches(&self) -> Vec<Vec<DescriptorWrite>> {
        self.state.lock().unwrap().write_batches.clone()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_shader_module(&self, code: &[u32]) -> Result<ShaderModuleHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = ShaderModuleHandle::from_raw(state.next());
        state.shader_modules.push((handle, code.len()));
        Ok(handle)
    }

    fn destroy_shader_module(&self, module: ShaderModuleHandle) {
        self.state.lock().unwrap().destroyed_shader_modules.push(module);
    }

    fn create_descriptor_set_layout(
        &self,
        bindings: &[DescriptorSetLayoutBinding],
    ) -> Result<DescriptorSetLayoutHandle> {
        let mut state = self.state.lock().unwrap();
        if let Some(limit) = state.fail_set_layout_after {
            if state.set_layouts.len() >= limit {
                return Err(Error::BackendError("mock set layout failure".to_string()));
            }
        }
        let handle = DescriptorSetLayoutHandle::from_raw(state.next());
        state.set_layouts.push((handle, bindings.to_vec()));
        Ok(handle)
    }

    fn destroy_descriptor_set_layout(&self, layout: DescriptorSetLayoutHandle) {
        self.state.lock().unwrap().destroyed_set_layouts.push(layout);
    }

    fn create_pipeline_layout(
        &self,
        set_layouts: &[DescriptorSetLayoutHandle],
        push_constant_ranges: &[PushConstantRange],
    ) -> Result<PipelineLayoutHandle> {
        let mut state = self.state.lock().unwrap();
        if state.fail_pipeline_layout {
            return Err(Error::BackendError("mock pipeline layout failure".to_string()));
        }
        let handle = PipelineLayoutHandle::from_raw(state.next());
        state.pipeline_layouts.push(MockPipelineLayout {
            handle,
            set_layouts: set_layouts.to_vec(),
            push_constant_ranges: push_constant_ranges.to_vec(),
        });
        Ok(handle)
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayoutHandle) {
        self.state.lock().unwrap().destroyed_pipeline_layouts.push(layout);
    }

    fn update_descriptor_sets(&self, writes: &[DescriptorWrite]) {
        self.state.lock().unwrap().write_batches.push(writes.to_vec());
    }
}

// ============================================================================
// Mock Descriptor Allocator
// ============================================================================

/// Counting allocator with an optional capacity
#[derive(Debug, Default)]
pub struct MockDescriptorAllocator {
    next_handle: u64,
    capacity: Option<usize>,
    /// Layout of every successful allocation, in order
    pub allocations: Vec<(DescriptorSetLayoutHandle, DescriptorSetHandle)>,
}

impl MockDescriptorAllocator {
    pub fn new() -> Self {
        Self { next_handle: 1000, ..Default::default() }
    }

    /// Allocator that fails once `capacity` sets were handed out
    pub fn with_capacity(capacity: usize) -> Self {
        Self { next_handle: 1000, capacity: Some(capacity), ..Default::default() }
    }

    pub fn allocation_count(&self) -> usize {
        self.allocations.len()
    }
}

impl DescriptorAllocator for MockDescriptorAllocator {
    fn allocate(&mut self, layout: DescriptorSetLayoutHandle) -> Result<DescriptorSetHandle> {
        if let Some(capacity) = self.capacity {
            if self.allocations.len() >= capacity {
                return Err(Error::AllocatorExhausted(format!(
                    "mock allocator capacity {} reached", capacity
                )));
            }
        }
        self.next_handle += 1;
        let set = DescriptorSetHandle::from_raw(self.next_handle);
        self.allocations.push((layout, set));
        Ok(set)
    }
}

// ============================================================================
// Mock Command Stream
// ============================================================================

/// Bind command recorded by the mock command stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockBind {
    pub layout: PipelineLayoutHandle,
    pub first_set: u32,
    pub sets: Vec<DescriptorSetHandle>,
    pub dynamic_offsets: Vec<u32>,
}

#[derive(Debug, Default)]
pub struct MockCommandStream {
    pub binds: Vec<MockBind>,
}

impl MockCommandStream {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandStream for MockCommandStream {
    fn bind_descriptor_sets(
        &mut self,
        layout: PipelineLayoutHandle,
        first_set: u32,
        sets: &[DescriptorSetHandle],
        dynamic_offsets: &[u32],
    ) {
        self.binds.push(MockBind {
            layout,
            first_set,
            sets: sets.to_vec(),
            dynamic_offsets: dynamic_offsets.to_vec(),
        });
    }
}
