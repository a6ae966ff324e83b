/// Shader module - reflection-driven layouts, effects and descriptor binding

pub mod shader_module;
pub mod reflection;
pub mod layout;
pub mod effect;
pub mod binder;
pub mod shader_cache;

pub use shader_module::*;
pub use reflection::*;
pub use layout::*;
pub use effect::*;
pub use binder::*;
pub use shader_cache::*;

#[cfg(test)]
pub(crate) mod spirv_test_utils;
