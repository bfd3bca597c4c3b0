//! A compiled layout paired with its CPU-side byte image.

use std::sync::Arc;

use crate::error::{FieldId, FieldRef, LayoutError, Result};
use crate::layout::{FieldDescriptor, Layout};
use crate::serialize::{self, Serialized};
use crate::sink::BufferSink;
use crate::types::{COMPONENT_SIZE, ElementType};
use crate::value::UniformValue;

/// CPU staging area for one uniform block.
///
/// Owns a scratch image sized to the layout. Full writes serialize every field
/// and upload once; the typed setters update a single top-level field and
/// upload only its bytes.
///
/// Writes go to a staging copy first. The image only changes (and the sink is
/// only called) when the whole write succeeds, so [`UniformBlock::bytes`]
/// always matches what was last uploaded.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: Arc<Layout>,
    scratch: Vec<u8>,
    staging: Vec<u8>,
}

impl UniformBlock {
    /// Compiles `schema` and allocates a zeroed image for it.
    pub fn new(schema: &[FieldDescriptor]) -> Result<Self> {
        Ok(Self::from_layout(Arc::new(Layout::compile(schema)?)))
    }

    pub fn from_layout(layout: Arc<Layout>) -> Self {
        let scratch = vec![0; layout.size_bytes() as usize];
        let staging = scratch.clone();
        Self { layout, scratch, staging }
    }

    #[inline]
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    #[inline]
    pub fn size_bytes(&self) -> u32 {
        self.layout.size_bytes()
    }

    /// Current CPU image, padding included.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.scratch
    }

    /// Serializes all fields and uploads the written prefix to `sink`.
    pub fn write<S>(&mut self, values: &[UniformValue], sink: &mut S) -> Result<Serialized>
    where
        S: BufferSink + ?Sized,
    {
        self.staging.copy_from_slice(&self.scratch);
        let out = serialize::serialize_to(&self.layout, &mut self.staging, values, sink)?;
        std::mem::swap(&mut self.scratch, &mut self.staging);
        Ok(out)
    }

    /// Replaces the start of the image with `bytes` and uploads them at offset 0.
    ///
    /// Meant for hand-padded `#[repr(C)]` mirrors of the layout. `bytes` may be
    /// shorter than the layout but must hold whole 4-byte components.
    pub fn write_raw<S>(&mut self, bytes: &[u8], sink: &mut S) -> Result<()>
    where
        S: BufferSink + ?Sized,
    {
        let capacity = self.scratch.len();
        if bytes.len() > capacity {
            return Err(LayoutError::Capacity {
                target: FieldRef::Block,
                offset: 0,
                len: bytes.len(),
                capacity,
            });
        }
        if bytes.len() % COMPONENT_SIZE as usize != 0 {
            return Err(LayoutError::UnalignedLength { len: bytes.len() });
        }
        if bytes.is_empty() {
            return Ok(());
        }

        self.scratch[..bytes.len()].copy_from_slice(bytes);
        sink.write_buffer_bytes(0, bytes);
        Ok(())
    }

    /// Updates the top-level field `id` (declared as `ty`) and uploads its bytes.
    ///
    /// Array fields take an [`UniformValue::Array`], struct fields an
    /// [`UniformValue::Struct`], exactly as in a full write.
    pub fn set<S>(
        &mut self,
        id: FieldId,
        ty: ElementType,
        value: impl Into<UniformValue>,
        sink: &mut S,
    ) -> Result<()>
    where
        S: BufferSink + ?Sized,
    {
        let value = value.into();
        let field = self.layout.lookup(id, ty)?;
        self.staging.copy_from_slice(&self.scratch);
        let progress = serialize::write_field(field, &value, &mut self.staging, 0)?;
        std::mem::swap(&mut self.scratch, &mut self.staging);

        let start = field.aligned_offset() as usize;
        log::trace!("uniform field {id} ({ty}) updated: bytes {start}..{}", progress.end);
        sink.write_buffer_bytes(start as u64, &self.scratch[start..progress.end]);
        Ok(())
    }

    pub fn set_i32<S: BufferSink + ?Sized>(&mut self, id: FieldId, v: i32, sink: &mut S) -> Result<()> {
        self.set(id, ElementType::Int32, v, sink)
    }

    pub fn set_u32<S: BufferSink + ?Sized>(&mut self, id: FieldId, v: u32, sink: &mut S) -> Result<()> {
        self.set(id, ElementType::UInt32, v, sink)
    }

    pub fn set_f32<S: BufferSink + ?Sized>(&mut self, id: FieldId, v: f32, sink: &mut S) -> Result<()> {
        self.set(id, ElementType::Float32, v, sink)
    }

    pub fn set_vec2<S: BufferSink + ?Sized>(
        &mut self,
        id: FieldId,
        v: [f32; 2],
        sink: &mut S,
    ) -> Result<()> {
        self.set(id, ElementType::Vec2, v, sink)
    }

    pub fn set_vec3<S: BufferSink + ?Sized>(
        &mut self,
        id: FieldId,
        v: [f32; 3],
        sink: &mut S,
    ) -> Result<()> {
        self.set(id, ElementType::Vec3, v, sink)
    }

    pub fn set_vec4<S: BufferSink + ?Sized>(
        &mut self,
        id: FieldId,
        v: [f32; 4],
        sink: &mut S,
    ) -> Result<()> {
        self.set(id, ElementType::Vec4, v, sink)
    }

    /// `m[c]` is column `c`.
    pub fn set_mat2<S: BufferSink + ?Sized>(
        &mut self,
        id: FieldId,
        m: [[f32; 2]; 2],
        sink: &mut S,
    ) -> Result<()> {
        self.set(id, ElementType::Mat2, m, sink)
    }

    pub fn set_mat3<S: BufferSink + ?Sized>(
        &mut self,
        id: FieldId,
        m: [[f32; 3]; 3],
        sink: &mut S,
    ) -> Result<()> {
        self.set(id, ElementType::Mat3, m, sink)
    }

    pub fn set_mat4<S: BufferSink + ?Sized>(
        &mut self,
        id: FieldId,
        m: [[f32; 4]; 4],
        sink: &mut S,
    ) -> Result<()> {
        self.set(id, ElementType::Mat4, m, sink)
    }
}
