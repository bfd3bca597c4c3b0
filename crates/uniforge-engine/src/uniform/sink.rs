use uniforge_layout::BufferSink;

/// Uploads serialized bytes into a wgpu buffer through the queue.
pub struct QueueSink<'a> {
    queue: &'a wgpu::Queue,
    buffer: &'a wgpu::Buffer,
}

impl<'a> QueueSink<'a> {
    #[inline]
    pub fn new(queue: &'a wgpu::Queue, buffer: &'a wgpu::Buffer) -> Self {
        Self { queue, buffer }
    }
}

impl BufferSink for QueueSink<'_> {
    fn write_buffer_bytes(&mut self, dest_offset: u64, bytes: &[u8]) {
        // write_buffer requires 4-byte aligned offsets and sizes; every field
        // offset and payload in a uniform layout is a multiple of 4.
        debug_assert_eq!(dest_offset % wgpu::COPY_BUFFER_ALIGNMENT, 0);
        debug_assert_eq!(bytes.len() as u64 % wgpu::COPY_BUFFER_ALIGNMENT, 0);
        self.queue.write_buffer(self.buffer, dest_offset, bytes);
    }
}
