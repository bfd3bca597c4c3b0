//! Destination for serialized uniform bytes.

/// Receives serialized bytes for upload.
///
/// Implementations copy `bytes` into the target buffer starting at
/// `dest_offset`. Synchronizing with readers of that buffer (e.g. not writing
/// while the GPU reads it) is the caller's job.
pub trait BufferSink {
    fn write_buffer_bytes(&mut self, dest_offset: u64, bytes: &[u8]);
}

impl<S: BufferSink + ?Sized> BufferSink for &mut S {
    #[inline]
    fn write_buffer_bytes(&mut self, dest_offset: u64, bytes: &[u8]) {
        (**self).write_buffer_bytes(dest_offset, bytes);
    }
}

/// A single recorded upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Upload {
    pub offset: u64,
    pub len: usize,
}

/// Sink backed by host memory. Records every upload it receives.
///
/// Useful headless (tests, tooling) and as a CPU mirror of a GPU buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    contents: Vec<u8>,
    uploads: Vec<Upload>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink pre-sized to `len` zeroed bytes.
    pub fn with_len(len: usize) -> Self {
        Self { contents: vec![0; len], uploads: Vec::new() }
    }

    #[inline]
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    #[inline]
    pub fn uploads(&self) -> &[Upload] {
        &self.uploads
    }

    pub fn clear_uploads(&mut self) {
        self.uploads.clear();
    }
}

impl BufferSink for MemorySink {
    fn write_buffer_bytes(&mut self, dest_offset: u64, bytes: &[u8]) {
        let start = dest_offset as usize;
        let end = start + bytes.len();
        if self.contents.len() < end {
            self.contents.resize(end, 0);
        }
        self.contents[start..end].copy_from_slice(bytes);
        self.uploads.push(Upload { offset: dest_offset, len: bytes.len() });
    }
}
