#![allow(dead_code)]
//! SPIR-V test utilities - modules assembled with rspirv
//!
//! Builds SPIR-V 1.0 modules with an empty `main` and the resource
//! declarations a test asks for, so no shader compiler is needed. Buffers
//! are blocks of vec4 members. Depends on nothing from the engine, so the
//! integration tests and the backend GPU tests include this file as well.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use rspirv::binary::Assemble;
use rspirv::dr::{Builder, Operand};
use rspirv::spirv::{self, Word};

/// Little-endian bytes of a word stream, as stored in a `.spv` file
pub fn to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

static FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Write `words` to a fresh `.spv` file in the temp directory
pub fn write_spv(tag: &str, words: &[u32]) -> PathBuf {
    let id = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "vulkaneer_{}_{}_{}.spv", tag, std::process::id(), id
    ));
    std::fs::write(&path, to_bytes(words)).unwrap();
    path
}

pub struct SpirvBuilder {
    builder: Builder,
    model: spirv::ExecutionModel,
    entry_names: Vec<String>,
    vec4: Word,
    float: Word,
    uint: Word,
}

impl SpirvBuilder {
    pub fn new(model: spirv::ExecutionModel) -> Self {
        let mut builder = Builder::new();
        builder.set_version(1, 0);
        builder.capability(spirv::Capability::Shader);
        builder.memory_model(spirv::AddressingModel::Logical, spirv::MemoryModel::GLSL450);

        let float = builder.type_float(32);
        let vec4 = builder.type_vector(float, 4);
        let uint = builder.type_int(32, 0);

        Self {
            builder,
            model,
            entry_names: vec!["main".to_string()],
            vec4,
            float,
            uint,
        }
    }

    /// Declare one more entry point sharing the same function
    pub fn entry_point(mut self, name: &str) -> Self {
        self.entry_names.push(name.to_string());
        self
    }

    /// `layout(set, binding) uniform Block { vec4 m0; } name;`
    pub fn uniform_buffer(self, set: u32, binding: u32, name: &str) -> Self {
        self.buffer_block(set, binding, name, spirv::Decoration::Block, 1)
    }

    /// Uniform buffer made of `vec4_count` vec4 members
    pub fn uniform_buffer_sized(self, set: u32, binding: u32, name: &str, vec4_count: u32) -> Self {
        self.buffer_block(set, binding, name, spirv::Decoration::Block, vec4_count)
    }

    /// `layout(set, binding) buffer Block { vec4 m0; } name;`
    pub fn storage_buffer(self, set: u32, binding: u32, name: &str) -> Self {
        self.buffer_block(set, binding, name, spirv::Decoration::BufferBlock, 1)
    }

    /// `layout(set, binding) uniform sampler2D name;`
    pub fn sampler2d(mut self, set: u32, binding: u32, name: &str) -> Self {
        let sampled = self.sampled_image_type();
        self.descriptor_variable(set, binding, name, sampled, spirv::StorageClass::UniformConstant);
        self
    }

    /// `layout(set, binding) uniform sampler2D name[len];`
    pub fn sampler2d_array(mut self, set: u32, binding: u32, name: &str, len: u32) -> Self {
        let sampled = self.sampled_image_type();
        let array = self.array_type(sampled, len);
        self.descriptor_variable(set, binding, name, array, spirv::StorageClass::UniformConstant);
        self
    }

    /// `layout(set, binding) uniform sampler2D name[outer][inner];`
    pub fn sampler2d_array_of_arrays(mut self, set: u32, binding: u32, name: &str, outer: u32, inner: u32) -> Self {
        let sampled = self.sampled_image_type();
        let inner_array = self.array_type(sampled, inner);
        let outer_array = self.array_type(inner_array, outer);
        self.descriptor_variable(set, binding, name, outer_array, spirv::StorageClass::UniformConstant);
        self
    }

    /// `layout(push_constant) uniform Block { vec4 m0; ... } name;` with the
    /// members placed at `member_offsets`
    pub fn push_constant(mut self, name: &str, member_offsets: &[u32]) -> Self {
        let block = self.struct_type(member_offsets, spirv::Decoration::Block);
        let pointer = self.builder.type_pointer(None, spirv::StorageClass::PushConstant, block);
        let var = self.builder.variable(pointer, None, spirv::StorageClass::PushConstant, None);
        self.name(var, name);
        self
    }

    pub fn build(mut self) -> Vec<u32> {
        let void = self.builder.type_void();
        let void_fn = self.builder.type_function(void, Vec::<Word>::new());
        let main = self.builder
            .begin_function(void, None, spirv::FunctionControl::NONE, void_fn)
            .unwrap();
        self.builder.begin_block(None).unwrap();
        self.builder.ret().unwrap();
        self.builder.end_function().unwrap();

        for entry_name in &self.entry_names {
            self.builder.entry_point(self.model, main, entry_name.as_str(), Vec::<Word>::new());
        }
        match self.model {
            spirv::ExecutionModel::Fragment => {
                self.builder.execution_mode(main, spirv::ExecutionMode::OriginUpperLeft, Vec::<Word>::new());
            }
            spirv::ExecutionModel::GLCompute => {
                self.builder.execution_mode(main, spirv::ExecutionMode::LocalSize, vec![1, 1, 1]);
            }
            _ => {}
        }

        self.builder.module().assemble()
    }

    // ===== internals =====

    fn name(&mut self, target: Word, name: &str) {
        if !name.is_empty() {
            self.builder.name(target, name);
        }
    }

    fn sampled_image_type(&mut self) -> Word {
        // float, 2D, not depth, not arrayed, single-sampled, sampled, unknown format
        let image = self.builder.type_image(
            self.float,
            spirv::Dim::Dim2D,
            0,
            0,
            0,
            1,
            spirv::ImageFormat::Unknown,
            None,
        );
        self.builder.type_sampled_image(image)
    }

    fn array_type(&mut self, element: Word, len: u32) -> Word {
        let len = self.builder.constant_bit32(self.uint, len);
        self.builder.type_array(element, len)
    }

    /// Block of vec4 members; never merged with an identical block
    fn struct_type(&mut self, member_offsets: &[u32], block_decoration: spirv::Decoration) -> Word {
        let id = self.builder.id();
        let members = vec![self.vec4; member_offsets.len()];
        self.builder.type_struct_id(Some(id), members);
        self.builder.decorate(id, block_decoration, Vec::<Operand>::new());
        for (member, offset) in member_offsets.iter().enumerate() {
            self.builder.member_decorate(
                id,
                member as u32,
                spirv::Decoration::Offset,
                vec![Operand::LiteralBit32(*offset)],
            );
            self.builder.member_name(id, member as u32, format!("m{}", member));
        }
        id
    }

    fn buffer_block(
        mut self,
        set: u32,
        binding: u32,
        name: &str,
        decoration: spirv::Decoration,
        vec4_count: u32,
    ) -> Self {
        let offsets: Vec<u32> = (0..vec4_count.max(1)).map(|i| i * 16).collect();
        let block = self.struct_type(&offsets, decoration);
        self.descriptor_variable(set, binding, name, block, spirv::StorageClass::Uniform);
        self
    }

    fn descriptor_variable(
        &mut self,
        set: u32,
        binding: u32,
        name: &str,
        pointee: Word,
        storage: spirv::StorageClass,
    ) {
        let pointer = self.builder.type_pointer(None, storage, pointee);
        let var = self.builder.variable(pointer, None, storage, None);
        self.builder.decorate(var, spirv::Decoration::DescriptorSet, vec![Operand::LiteralBit32(set)]);
        self.builder.decorate(var, spirv::Decoration::Binding, vec![Operand::LiteralBit32(binding)]);
        self.name(var, name);
    }
}
