//! GPU device management.
//!
//! Uniform buffers only need a device and a queue, so this module creates
//! them without a window or surface.

mod headless;

pub use headless::{HeadlessGpu, HeadlessInit};
