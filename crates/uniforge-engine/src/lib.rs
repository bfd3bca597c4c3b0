//! Uniforge engine crate.
//!
//! GPU-side runtime for compiled uniform layouts: logger setup, headless
//! device creation, and uniform buffers that upload through the wgpu queue.

pub mod device;
pub mod logging;
pub mod uniform;

pub use uniforge_layout as layout;
