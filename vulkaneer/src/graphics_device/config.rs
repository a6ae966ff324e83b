/// Descriptor pool configuration

use crate::graphics_device::DescriptorType;

/// Number of descriptors of one type reserved per pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorPoolSize {
    pub descriptor_type: DescriptorType,
    pub count: u32,
}

/// Sizing of the descriptor pools a backend allocator creates
///
/// # Example
///
/// ```
/// use vulkaneer::vkn::render::{DescriptorPoolConfig, DescriptorPoolSize, DescriptorType};
///
/// let config = DescriptorPoolConfig {
///     max_sets: 64,
///     pool_sizes: vec![DescriptorPoolSize {
///         descriptor_type: DescriptorType::UniformBufferDynamic,
///         count: 64,
///     }],
///     max_pools: Some(1),
/// };
/// assert_eq!(config.count_for(DescriptorType::UniformBufferDynamic), 64);
/// ```
#[derive(Debug, Clone)]
pub struct DescriptorPoolConfig {
    /// Maximum number of sets allocated from one pool
    pub max_sets: u32,
    /// Descriptors reserved per type in one pool
    pub pool_sizes: Vec<DescriptorPoolSize>,
    /// Upper bound on the number of pools (None = grow without limit)
    pub max_pools: Option<usize>,
}

impl DescriptorPoolConfig {
    /// Descriptors of `descriptor_type` reserved per pool (0 if absent)
    pub fn count_for(&self, descriptor_type: DescriptorType) -> u32 {
        self.pool_sizes
            .iter()
            .filter(|size| size.descriptor_type == descriptor_type)
            .map(|size| size.count)
            .sum()
    }
}

impl Default for DescriptorPoolConfig {
    fn default() -> Self {
        let size = |descriptor_type, count| DescriptorPoolSize { descriptor_type, count };
        Self {
            max_sets: 1024,
            pool_sizes: vec![
                size(DescriptorType::UniformBuffer, 1024),
                size(DescriptorType::UniformBufferDynamic, 1024),
                size(DescriptorType::StorageBuffer, 1024),
                size(DescriptorType::StorageBufferDynamic, 512),
                size(DescriptorType::CombinedImageSampler, 2048),
            ],
            max_pools: None,
        }
    }
}
