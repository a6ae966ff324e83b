/// Descriptor and shader stage types shared by the core and the backends

use bitflags::bitflags;
use crate::graphics_device::{BufferHandle, DescriptorSetHandle};

// ============================================================================
// Shader stages
// ============================================================================

/// Shader stage kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Tessellation control shader
    TessellationControl,
    /// Tessellation evaluation shader
    TessellationEvaluation,
    /// Geometry shader
    Geometry,
    /// Fragment/Pixel shader
    Fragment,
    /// Compute shader
    Compute,
}

impl ShaderStage {
    /// Stage bit for this stage
    pub fn flags(self) -> ShaderStageFlags {
        match self {
            ShaderStage::Vertex => ShaderStageFlags::VERTEX,
            ShaderStage::TessellationControl => ShaderStageFlags::TESSELLATION_CONTROL,
            ShaderStage::TessellationEvaluation => ShaderStageFlags::TESSELLATION_EVALUATION,
            ShaderStage::Geometry => ShaderStageFlags::GEOMETRY,
            ShaderStage::Fragment => ShaderStageFlags::FRAGMENT,
            ShaderStage::Compute => ShaderStageFlags::COMPUTE,
        }
    }
}

bitflags! {
    /// Shader stage visibility mask
    ///
    /// Bit values match VkShaderStageFlagBits so that masks hash identically
    /// to the values handed to the device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0x0000_0001;
        const TESSELLATION_CONTROL = 0x0000_0002;
        const TESSELLATION_EVALUATION = 0x0000_0004;
        const GEOMETRY = 0x0000_0008;
        const FRAGMENT = 0x0000_0010;
        const COMPUTE = 0x0000_0020;
    }
}

// ============================================================================
// Descriptor types
// ============================================================================

/// Type of resource bound at a descriptor binding
///
/// Discriminants are the VkDescriptorType values; they take part in the
/// layout hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DescriptorType {
    Sampler = 0,
    CombinedImageSampler = 1,
    SampledImage = 2,
    StorageImage = 3,
    UniformTexelBuffer = 4,
    StorageTexelBuffer = 5,
    UniformBuffer = 6,
    StorageBuffer = 7,
    /// Uniform buffer whose offset is supplied at bind time
    UniformBufferDynamic = 8,
    /// Storage buffer whose offset is supplied at bind time
    StorageBufferDynamic = 9,
    InputAttachment = 10,
    AccelerationStructure = 1_000_150_000,
}

impl DescriptorType {
    /// Whether binds of this type consume a dynamic offset
    pub fn is_dynamic(self) -> bool {
        matches!(
            self,
            DescriptorType::UniformBufferDynamic | DescriptorType::StorageBufferDynamic
        )
    }

    /// Whether this type is written with a buffer info
    pub fn is_buffer(self) -> bool {
        matches!(
            self,
            DescriptorType::UniformBuffer
                | DescriptorType::StorageBuffer
                | DescriptorType::UniformBufferDynamic
                | DescriptorType::StorageBufferDynamic
        )
    }

    /// Raw VkDescriptorType value
    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

// ============================================================================
// Layout and write descriptions
// ============================================================================

/// One binding of a descriptor set layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorSetLayoutBinding {
    /// Binding number (`layout(binding = N)` in GLSL)
    pub binding: u32,
    /// Resource type
    pub descriptor_type: DescriptorType,
    /// Number of descriptors (product of array dimensions)
    pub count: u32,
    /// Stages that access this binding
    pub stage_flags: ShaderStageFlags,
}

/// Push constant range of a pipeline layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PushConstantRange {
    /// Stages that read the range
    pub stage_flags: ShaderStageFlags,
    /// Offset in bytes
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
}

/// Buffer region referenced by a buffer descriptor
///
/// Equality is the "same resource" test used by the descriptor binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferInfo {
    pub buffer: BufferHandle,
    pub offset: u64,
    pub range: u64,
}

impl BufferInfo {
    /// Range value meaning "to the end of the buffer" (VK_WHOLE_SIZE)
    pub const WHOLE_SIZE: u64 = u64::MAX;

    pub fn new(buffer: BufferHandle, offset: u64, range: u64) -> Self {
        Self { buffer, offset, range }
    }
}

/// A buffer write into one binding of an allocated descriptor set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorWrite {
    pub dst_set: DescriptorSetHandle,
    pub dst_binding: u32,
    pub descriptor_type: DescriptorType,
    pub buffer_info: BufferInfo,
}

/// Shader stage description for pipeline creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineShaderStage {
    pub stage: ShaderStage,
    pub module: crate::graphics_device::ShaderModuleHandle,
}
