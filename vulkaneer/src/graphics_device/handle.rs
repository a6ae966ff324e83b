/// Opaque device object handles
///
/// Backends store their raw 64-bit object handles (`vk::Handle::as_raw()` for
/// Vulkan) in these newtypes. A raw value of 0 is the null handle.

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(u64);

        impl $name {
            /// The null handle
            pub const NULL: Self = Self(0);

            /// Wrap a raw backend handle
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Raw backend handle
            pub const fn as_raw(self) -> u64 {
                self.0
            }

            /// Whether this is the null handle
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

define_handle!(
    /// Compiled shader module (VkShaderModule)
    ShaderModuleHandle
);

define_handle!(
    /// Descriptor set layout (VkDescriptorSetLayout)
    DescriptorSetLayoutHandle
);

define_handle!(
    /// Pipeline layout (VkPipelineLayout)
    PipelineLayoutHandle
);

define_handle!(
    /// Allocated descriptor set (VkDescriptorSet)
    DescriptorSetHandle
);

define_handle!(
    /// GPU buffer (VkBuffer)
    BufferHandle
);
