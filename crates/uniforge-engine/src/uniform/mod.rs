//! GPU uniform buffers backed by compiled layouts.
//!
//! A [`UniformBuffer`] pairs a `UniformBlock` (layout + CPU image) with the
//! `wgpu::Buffer` it uploads to. Uploads go through `Queue::write_buffer`, so
//! they are ordered before the next submission on that queue.

mod buffer;
mod sink;

pub use buffer::{gpu_buffer_size, UniformBuffer, UniformBufferInit};
pub use sink::QueueSink;
