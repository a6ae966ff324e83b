/// VulkanDescriptorAllocator - growable list of descriptor pools
///
/// Allocates from the newest pool and creates another one when it runs out,
/// up to `DescriptorPoolConfig::max_pools`. Meant to be owned per frame in
/// flight and recycled with `reset_pools` once the frame's fence signaled.

use std::sync::Arc;
use ash::vk;
use vulkaneer::vkn::{Error, Result};
use vulkaneer::vkn::render::{
    DescriptorAllocator, DescriptorPoolConfig, DescriptorSetLayoutHandle, DescriptorSetHandle,
};
use vulkaneer::{engine_info, engine_error};

use crate::vulkan_format::{descriptor_type_to_vk, vk_result_to_error, set_layout_to_vk, descriptor_set_from_vk};

pub struct VulkanDescriptorAllocator {
    device: Arc<ash::Device>,
    config: DescriptorPoolConfig,
    pools: Vec<vk::DescriptorPool>,
}

impl VulkanDescriptorAllocator {
    /// Create the allocator and its first pool
    pub fn new(device: Arc<ash::Device>, config: DescriptorPoolConfig) -> Result<Self> {
        let first_pool = Self::create_descriptor_pool(&device, &config)?;
        Ok(Self {
            device,
            config,
            pools: vec![first_pool],
        })
    }

    fn create_descriptor_pool(device: &ash::Device, config: &DescriptorPoolConfig) -> Result<vk::DescriptorPool> {
        let pool_sizes: Vec<vk::DescriptorPoolSize> = config.pool_sizes
            .iter()
            .filter(|size| size.count > 0)
            .map(|size| vk::DescriptorPoolSize {
                ty: descriptor_type_to_vk(size.descriptor_type),
                descriptor_count: size.count,
            })
            .collect();
        let info = vk::DescriptorPoolCreateInfo::default()
            .pool_sizes(&pool_sizes)
            .max_sets(config.max_sets);

        unsafe {
            device.create_descriptor_pool(&info, None)
                .map_err(|e| vk_result_to_error("vkCreateDescriptorPool", e))
        }
    }

    fn allocate_from(&self, pool: vk::DescriptorPool, layout: vk::DescriptorSetLayout) -> ash::prelude::VkResult<vk::DescriptorSet> {
        let layouts = [layout];
        let allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(pool)
            .set_layouts(&layouts);

        unsafe {
            self.device.allocate_descriptor_sets(&allocate_info).map(|sets| sets[0])
        }
    }

    /// Number of pools created so far
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Return every set to its pool
    ///
    /// Sets handed out before the reset must no longer be in use by the GPU.
    pub fn reset_pools(&mut self) -> Result<()> {
        for pool in &self.pools {
            unsafe {
                self.device.reset_descriptor_pool(*pool, vk::DescriptorPoolResetFlags::empty())
                    .map_err(|e| vk_result_to_error("vkResetDescriptorPool", e))?;
            }
        }
        Ok(())
    }
}

/// Whether an allocation failed because the pool ran out of room
fn is_pool_memory_error(result: vk::Result) -> bool {
    matches!(result, vk::Result::ERROR_OUT_OF_POOL_MEMORY | vk::Result::ERROR_FRAGMENTED_POOL)
}

impl DescriptorAllocator for VulkanDescriptorAllocator {
    fn allocate(&mut self, layout: DescriptorSetLayoutHandle) -> Result<DescriptorSetHandle> {
        let vk_layout = set_layout_to_vk(layout);
        let current_pool = match self.pools.last() {
            Some(pool) => *pool,
            None => return Err(Error::AllocatorExhausted("no descriptor pool".to_string())),
        };

        match self.allocate_from(current_pool, vk_layout) {
            Ok(set) => Ok(descriptor_set_from_vk(set)),
            Err(e) if is_pool_memory_error(e) => {
                if let Some(max_pools) = self.config.max_pools {
                    if self.pools.len() >= max_pools {
                        engine_error!("vkn::VulkanDescriptorAllocator",
                            "Descriptor pools exhausted ({} of {})", self.pools.len(), max_pools);
                        return Err(Error::AllocatorExhausted(format!(
                            "{} descriptor pools in use", self.pools.len()
                        )));
                    }
                }

                // A fresh pool joins the list only once it served the layout
                let new_pool = Self::create_descriptor_pool(&self.device, &self.config)?;
                match self.allocate_from(new_pool, vk_layout) {
                    Ok(set) => {
                        self.pools.push(new_pool);
                        engine_info!("vkn::VulkanDescriptorAllocator",
                            "Descriptor pool exhausted, created new pool (total: {})",
                            self.pools.len()
                        );
                        Ok(descriptor_set_from_vk(set))
                    }
                    Err(e) => {
                        unsafe {
                            self.device.destroy_descriptor_pool(new_pool, None);
                        }
                        if is_pool_memory_error(e) {
                            engine_error!("vkn::VulkanDescriptorAllocator",
                                "An empty descriptor pool cannot serve the layout, check the pool sizes");
                            Err(Error::AllocatorExhausted(
                                "layout does not fit in an empty descriptor pool".to_string(),
                            ))
                        } else {
                            Err(vk_result_to_error("vkAllocateDescriptorSets after pool growth", e))
                        }
                    }
                }
            }
            Err(e) => Err(vk_result_to_error("vkAllocateDescriptorSets", e)),
        }
    }
}

impl Drop for VulkanDescriptorAllocator {
    fn drop(&mut self) {
        for pool in self.pools.drain(..) {
            unsafe {
                self.device.destroy_descriptor_pool(pool, None);
            }
        }
    }
}
