use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytemuck::Pod;
use uniforge_layout::{
    ElementType, FieldDescriptor, FieldId, Layout, LayoutError, Serialized, UniformBlock,
    UniformValue,
};

use super::sink::QueueSink;

/// Creation parameters for a [`UniformBuffer`].
#[derive(Debug, Clone)]
pub struct UniformBufferInit {
    pub label: Option<String>,
    pub usage: wgpu::BufferUsages,
}

impl Default for UniformBufferInit {
    fn default() -> Self {
        Self {
            label: None,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        }
    }
}

/// GPU allocation size for a layout of `layout_size` bytes.
///
/// Uniform bindings are sized in 16-byte units and may not be empty, so the
/// allocation is rounded up and never smaller than one slot.
pub fn gpu_buffer_size(layout_size: u32) -> u64 {
    u64::from(layout_size).next_multiple_of(16).max(16)
}

/// A uniform buffer on the GPU plus the layout and CPU image that feed it.
pub struct UniformBuffer {
    block: UniformBlock,
    buffer: wgpu::Buffer,
}

impl UniformBuffer {
    /// Compiles `schema` and allocates a matching GPU buffer.
    pub fn new(
        device: &wgpu::Device,
        schema: &[FieldDescriptor],
        init: &UniformBufferInit,
    ) -> Result<Self> {
        let layout = Layout::compile(schema).context("failed to compile uniform schema")?;
        Ok(Self::from_layout(device, Arc::new(layout), init))
    }

    /// Allocates a GPU buffer for an already compiled (possibly shared) layout.
    pub fn from_layout(device: &wgpu::Device, layout: Arc<Layout>, init: &UniformBufferInit) -> Self {
        let size = gpu_buffer_size(layout.size_bytes());
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: init.label.as_deref(),
            size,
            usage: init.usage,
            mapped_at_creation: false,
        });
        log::debug!(
            "uniform buffer {:?}: layout {} bytes, allocated {size}",
            init.label,
            layout.size_bytes()
        );

        Self { block: UniformBlock::from_layout(layout), buffer }
    }

    #[inline]
    pub fn layout(&self) -> &Arc<Layout> {
        self.block.layout()
    }

    #[inline]
    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn as_entire_binding(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    /// Minimum binding size for bind group layouts using this buffer.
    pub fn min_binding_size(&self) -> Option<NonZeroU64> {
        NonZeroU64::new(gpu_buffer_size(self.block.size_bytes()))
    }

    /// Serializes every field and uploads the result.
    pub fn write(&mut self, queue: &wgpu::Queue, values: &[UniformValue]) -> Result<Serialized, LayoutError> {
        let mut sink = QueueSink::new(queue, &self.buffer);
        self.block.write(values, &mut sink)
    }

    /// Updates one top-level field and uploads only its bytes.
    pub fn set(
        &mut self,
        queue: &wgpu::Queue,
        id: FieldId,
        ty: ElementType,
        value: impl Into<UniformValue>,
    ) -> Result<(), LayoutError> {
        let mut sink = QueueSink::new(queue, &self.buffer);
        self.block.set(id, ty, value, &mut sink)
    }

    /// Uploads a hand-padded `#[repr(C)]` value over the start of the block.
    ///
    /// The bytes also replace the CPU image, so later per-field updates start
    /// from what the GPU holds. The value must fit the layout and be a whole
    /// number of 4-byte components.
    pub fn write_pod<T: Pod>(&mut self, queue: &wgpu::Queue, value: &T) -> Result<(), LayoutError> {
        let mut sink = QueueSink::new(queue, &self.buffer);
        self.block.write_raw(bytemuck::bytes_of(value), &mut sink)
    }
}

macro_rules! typed_setters {
    ($($name:ident($ty:ty);)*) => {
        impl UniformBuffer {
            $(
                pub fn $name(&mut self, queue: &wgpu::Queue, id: FieldId, v: $ty) -> Result<(), LayoutError> {
                    let mut sink = QueueSink::new(queue, &self.buffer);
                    self.block.$name(id, v, &mut sink)
                }
            )*
        }
    };
}

typed_setters! {
    set_i32(i32);
    set_u32(u32);
    set_f32(f32);
    set_vec2([f32; 2]);
    set_vec3([f32; 3]);
    set_vec4([f32; 4]);
    set_mat2([[f32; 2]; 2]);
    set_mat3([[f32; 3]; 3]);
    set_mat4([[f32; 4]; 4]);
}

#[cfg(test)]
mod tests {
    use uniforge_layout::ElementType::*;

    use super::*;
    use crate::device::{HeadlessGpu, HeadlessInit};

    #[test]
    fn allocation_rounds_up_to_slots() {
        assert_eq!(gpu_buffer_size(80), 80);
        assert_eq!(gpu_buffer_size(84), 96);
        assert_eq!(gpu_buffer_size(4), 16);
    }

    #[test]
    fn empty_layout_still_gets_one_slot() {
        assert_eq!(gpu_buffer_size(0), 16);
    }

    #[test]
    fn default_usage_allows_uniform_binding_and_writes() {
        let init = UniformBufferInit::default();
        assert!(init.usage.contains(wgpu::BufferUsages::UNIFORM));
        assert!(init.usage.contains(wgpu::BufferUsages::COPY_DST));
        assert!(init.label.is_none());
    }

    // ── on a device ───────────────────────────────────────────────────────
    //
    // These need an adapter. Machines without one (plain CI) skip them.

    fn headless() -> Option<HeadlessGpu> {
        match HeadlessGpu::new_blocking(HeadlessInit::default()) {
            Ok(gpu) => Some(gpu),
            Err(err) => {
                eprintln!("no GPU adapter, skipping: {err:#}");
                None
            }
        }
    }

    fn readable() -> UniformBufferInit {
        UniformBufferInit {
            label: Some("test uniforms".to_owned()),
            usage: UniformBufferInit::default().usage | wgpu::BufferUsages::COPY_SRC,
        }
    }

    // Mat4 at 0, Vec3 at 64, Float32 at 80: 84 bytes, 96 allocated.
    fn camera(gpu: &HeadlessGpu) -> UniformBuffer {
        UniformBuffer::new(
            gpu.device(),
            &[
                FieldDescriptor::new(0, Mat4),
                FieldDescriptor::new(1, Vec3),
                FieldDescriptor::new(2, Float32),
            ],
            &readable(),
        )
        .unwrap()
    }

    fn identity() -> [[f32; 4]; 4] {
        std::array::from_fn(|c| std::array::from_fn(|r| if r == c { 1.0 } else { 0.0 }))
    }

    #[test]
    fn allocation_and_binding_size_follow_layout() {
        let Some(gpu) = headless() else { return };
        let ubo = camera(&gpu);
        assert_eq!(ubo.layout().size_bytes(), 84);
        assert_eq!(ubo.buffer().size(), 96);
        assert_eq!(ubo.min_binding_size(), NonZeroU64::new(96));
    }

    #[test]
    fn full_write_and_setters_reach_the_gpu() {
        let Some(gpu) = headless() else { return };
        let mut ubo = camera(&gpu);

        ubo.write(
            gpu.queue(),
            &[identity().into(), [1.0f32, 2.0, 3.0].into(), 0.5f32.into()],
        )
        .unwrap();
        ubo.set_vec3(gpu.queue(), 1, [4.0, 5.0, 6.0]).unwrap();
        ubo.set_f32(gpu.queue(), 2, 0.25).unwrap();

        let bytes = gpu.read_buffer(ubo.buffer()).unwrap();
        assert_eq!(&bytes[..84], ubo.block().bytes());
        assert_eq!(&bytes[64..68], &4.0f32.to_le_bytes());
        assert_eq!(&bytes[80..84], &0.25f32.to_le_bytes());
    }

    #[test]
    fn rejected_write_keeps_gpu_and_image_in_step() {
        let Some(gpu) = headless() else { return };
        let mut ubo = camera(&gpu);
        ubo.set_f32(gpu.queue(), 2, 2.0).unwrap();

        let bad = [identity().into(), [1.0f32, 2.0, 3.0].into(), UniformValue::Int32(1)];
        assert!(ubo.write(gpu.queue(), &bad).is_err());
        assert!(ubo.set(gpu.queue(), 9, Float32, 1.0f32).is_err());

        let bytes = gpu.read_buffer(ubo.buffer()).unwrap();
        assert_eq!(&bytes[..84], ubo.block().bytes());
        assert!(bytes[..64].iter().all(|b| *b == 0));
    }

    #[test]
    fn pod_upload_updates_image_and_buffer() {
        let Some(gpu) = headless() else { return };
        let mut ubo = camera(&gpu);

        let view = identity();
        ubo.write_pod(gpu.queue(), &view).unwrap();
        ubo.set_f32(gpu.queue(), 2, 3.0).unwrap();

        let bytes = gpu.read_buffer(ubo.buffer()).unwrap();
        assert_eq!(&bytes[..64], bytemuck::bytes_of(&view));
        assert_eq!(&bytes[..84], ubo.block().bytes());

        // 6 bytes would trip wgpu's copy alignment; refused before upload.
        assert_eq!(
            ubo.write_pod(gpu.queue(), &[0u16; 3]).unwrap_err(),
            LayoutError::UnalignedLength { len: 6 }
        );
        assert!(matches!(
            ubo.write_pod(gpu.queue(), &[0.0f32; 32]).unwrap_err(),
            LayoutError::Capacity { len: 128, capacity: 84, .. }
        ));
    }
}
