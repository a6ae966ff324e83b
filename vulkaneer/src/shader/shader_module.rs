/// BinaryShaderModule - SPIR-V words plus the device-side module

use std::path::Path;
use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, ShaderModuleHandle};

/// SPIR-V magic number (first word of every module)
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Compiled shader bytecode and its device module
///
/// Immutable after creation. Modules are created and destroyed by a
/// `ShaderCache`; effects hold shared references.
#[derive(Debug)]
pub struct BinaryShaderModule {
    code: Vec<u32>,
    module: ShaderModuleHandle,
}

impl BinaryShaderModule {
    /// Create the device module for already-decoded SPIR-V words
    pub fn new(device: &dyn GraphicsDevice, code: Vec<u32>) -> Result<Self> {
        if code.first() != Some(&SPIRV_MAGIC) {
            return Err(Error::CompileFailed(
                "shader code does not start with the SPIR-V magic number".to_string(),
            ));
        }

        let module = device.create_shader_module(&code)
            .map_err(|e| Error::CompileFailed(format!("device rejected shader module: {}", e)))?;

        Ok(Self { code, module })
    }

    /// Create from raw file bytes (length must be a multiple of 4)
    pub fn from_bytes(device: &dyn GraphicsDevice, bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() % 4 != 0 {
            return Err(Error::CompileFailed(format!(
                "shader code size {} is not a non-zero multiple of 4 bytes", bytes.len()
            )));
        }

        // Copy into u32 storage: file buffers carry no alignment guarantee
        let code: Vec<u32> = bytemuck::pod_collect_to_vec(bytes);
        Self::new(device, code)
    }

    /// Read a `.spv` file and create its module
    pub fn load<P: AsRef<Path>>(device: &dyn GraphicsDevice, path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::CompileFailed(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_bytes(device, &bytes)
            .map_err(|e| match e {
                Error::CompileFailed(msg) => Error::CompileFailed(format!("{}: {}", path.display(), msg)),
                other => other,
            })
    }

    /// SPIR-V words
    pub fn code(&self) -> &[u32] {
        &self.code
    }

    /// Device module handle
    pub fn handle(&self) -> ShaderModuleHandle {
        self.module
    }

    /// Destroy the device module
    pub(crate) fn destroy(&self, device: &dyn GraphicsDevice) {
        device.destroy_shader_module(self.module);
    }
}
