/// ShaderCache - path-keyed cache of shader modules
///
/// The cache is the only creator and destroyer of `BinaryShaderModule`s;
/// effects hold `Arc` clones of the modules it hands out.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::{engine_debug, engine_error, engine_trace};
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::shader::BinaryShaderModule;

pub struct ShaderCache {
    device: Arc<dyn GraphicsDevice>,
    module_cache: FxHashMap<String, Arc<BinaryShaderModule>>,
}

impl ShaderCache {
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            module_cache: FxHashMap::default(),
        }
    }

    /// Module loaded from `path`, loading it on first use
    ///
    /// A load failure is logged and not cached; the next call retries.
    pub fn get(&mut self, path: &str) -> Option<Arc<BinaryShaderModule>> {
        match self.load(path) {
            Ok(module) => Some(module),
            Err(e) => {
                engine_error!("vkn::ShaderCache", "Error when compiling shader {}: {}", path, e);
                None
            }
        }
    }

    /// Same as `get`, returning the load error
    pub fn load(&mut self, path: &str) -> Result<Arc<BinaryShaderModule>> {
        if let Some(module) = self.module_cache.get(path) {
            engine_trace!("vkn::ShaderCache", "Cache hit: {}", path);
            return Ok(Arc::clone(module));
        }

        let module = Arc::new(BinaryShaderModule::load(self.device.as_ref(), path)?);
        engine_debug!("vkn::ShaderCache", "Loaded {} ({} words)", path, module.code().len());
        self.module_cache.insert(path.to_string(), Arc::clone(&module));
        Ok(module)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.module_cache.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.module_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.module_cache.is_empty()
    }

    /// Destroy every cached module
    ///
    /// Pipelines created from the modules stay valid; effects still holding
    /// a module must not be used to create new pipelines.
    pub fn destroy(&mut self) {
        for (_, module) in self.module_cache.drain() {
            module.destroy(self.device.as_ref());
        }
    }
}

impl Drop for ShaderCache {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[path = "shader_cache_tests.rs"]
mod tests;
