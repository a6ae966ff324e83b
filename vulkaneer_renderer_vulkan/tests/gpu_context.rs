#![allow(dead_code)]
//! GPU test context - headless Vulkan instance/device for backend tests
//!
//! No window or surface: the shader system only needs a device, a command
//! buffer and some buffers. With the `vulkan-validation` feature the context
//! enables VK_LAYER_KHRONOS_validation and routes its messages to the engine
//! logger through `vulkan_debug_callback`.

use std::sync::{Arc, Mutex};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc};
use gpu_allocator::MemoryLocation;
use vulkaneer::vkn::render::{BufferHandle, BufferInfo};

pub struct GpuContext {
    pub entry: ash::Entry,
    pub instance: ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: Arc<ash::Device>,
    pub queue_family: u32,
    pub command_pool: vk::CommandPool,
    pub allocator: Option<Mutex<Allocator>>,
    buffers: Vec<(vk::Buffer, Allocation)>,
    debug_messenger: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
}

impl GpuContext {
    pub fn new() -> Self {
        unsafe {
            let entry = ash::Entry::load().expect("Vulkan loader not found");

            let app_info = vk::ApplicationInfo::default()
                .application_name(c"vulkaneer tests")
                .api_version(vk::API_VERSION_1_2);

            let layers: Vec<*const std::ffi::c_char> = if cfg!(feature = "vulkan-validation") {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                Vec::new()
            };
            let extensions: Vec<*const std::ffi::c_char> = if cfg!(feature = "vulkan-validation") {
                vec![ash::ext::debug_utils::NAME.as_ptr()]
            } else {
                Vec::new()
            };

            let instance_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layers)
                .enabled_extension_names(&extensions);
            let instance = entry.create_instance(&instance_info, None).expect("Failed to create instance");

            let debug_messenger = if cfg!(feature = "vulkan-validation") {
                let debug_utils = ash::ext::debug_utils::Instance::new(&entry, &instance);
                let messenger = debug_utils
                    .create_debug_utils_messenger(&vulkaneer_renderer_vulkan::debug_messenger_create_info(), None)
                    .expect("Failed to create debug messenger");
                Some((debug_utils, messenger))
            } else {
                None
            };

            let (physical_device, queue_family) = instance
                .enumerate_physical_devices()
                .expect("Failed to enumerate physical devices")
                .into_iter()
                .find_map(|physical_device| {
                    instance
                        .get_physical_device_queue_family_properties(physical_device)
                        .iter()
                        .position(|props| props.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                        .map(|index| (physical_device, index as u32))
                })
                .expect("No physical device with a graphics queue");

            let priorities = [1.0f32];
            let queue_info = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(queue_family)
                .queue_priorities(&priorities)];
            let device_info = vk::DeviceCreateInfo::default().queue_create_infos(&queue_info);
            let device = instance
                .create_device(physical_device, &device_info, None)
                .expect("Failed to create device");

            let pool_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
            let command_pool = device.create_command_pool(&pool_info, None).expect("Failed to create command pool");

            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .expect("Failed to create allocator");

            Self {
                entry,
                instance,
                physical_device,
                device: Arc::new(device),
                queue_family,
                command_pool,
                allocator: Some(Mutex::new(allocator)),
                buffers: Vec::new(),
                debug_messenger,
            }
        }
    }

    /// Create a host-visible uniform/storage buffer of `size` bytes
    pub fn create_buffer(&mut self, size: u64) -> BufferInfo {
        unsafe {
            let buffer_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(vk::BufferUsageFlags::UNIFORM_BUFFER | vk::BufferUsageFlags::STORAGE_BUFFER)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);
            let buffer = self.device.create_buffer(&buffer_info, None).expect("Failed to create buffer");
            let requirements = self.device.get_buffer_memory_requirements(buffer);

            let allocation = self.allocator.as_ref().unwrap().lock().unwrap()
                .allocate(&AllocationCreateDesc {
                    name: "test buffer",
                    requirements,
                    location: MemoryLocation::CpuToGpu,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .expect("Failed to allocate buffer memory");
            self.device
                .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                .expect("Failed to bind buffer memory");

            self.buffers.push((buffer, allocation));
            BufferInfo::new(BufferHandle::from_raw(vk::Handle::as_raw(buffer)), 0, size)
        }
    }

    /// Allocate a primary command buffer and begin recording
    pub fn begin_command_buffer(&self) -> vk::CommandBuffer {
        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(self.command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffer = self.device.allocate_command_buffers(&allocate_info)
                .expect("Failed to allocate command buffer")[0];
            self.device
                .begin_command_buffer(command_buffer, &vk::CommandBufferBeginInfo::default())
                .expect("Failed to begin command buffer");
            command_buffer
        }
    }

    pub fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) {
        unsafe {
            self.device.end_command_buffer(command_buffer).expect("Failed to end command buffer");
            self.device.free_command_buffers(self.command_pool, &[command_buffer]);
        }
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            if let Some(allocator) = self.allocator.as_ref() {
                let mut allocator = allocator.lock().unwrap();
                for (buffer, allocation) in self.buffers.drain(..) {
                    self.device.destroy_buffer(buffer, None);
                    let _ = allocator.free(allocation);
                }
            }
            // Allocator must go before the device
            self.allocator = None;
            self.device.destroy_command_pool(self.command_pool, None);
            self.device.destroy_device(None);
            if let Some((debug_utils, messenger)) = self.debug_messenger.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}
