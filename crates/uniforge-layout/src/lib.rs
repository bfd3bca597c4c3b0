//! Layout compiler and serializer for std140-style uniform blocks.
//!
//! A schema of typed fields is compiled once into an immutable [`Layout`]
//! holding the byte offset of every field under GPU uniform-buffer alignment
//! rules. Runtime values are then serialized against that layout into a byte
//! image whose contents match what a shader reads at the same offsets.
//!
//! This crate has no GPU dependencies; uploads go through the [`BufferSink`]
//! trait so the same code drives wgpu buffers, tests and tooling.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | `ElementType`, size/alignment table |
//! | [`encode`] | little-endian write primitives |
//! | [`layout`] | `FieldDescriptor`, `ResolvedField`, `Layout` |
//! | [`value`] | `UniformValue`, `ValueKind` |
//! | [`serialize`] | `serialize`, `serialize_to` |
//! | [`sink`] | `BufferSink`, `MemorySink` |
//! | [`block`] | `UniformBlock` (layout + CPU image + per-field setters) |
//! | [`error`] | `LayoutError`, `SchemaError` |
//!
//! # Quick start
//!
//! ```rust
//! use uniforge_layout::{ElementType, FieldDescriptor, Layout, MemorySink, UniformBlock, UniformValue};
//!
//! let schema = [
//!     FieldDescriptor::new(0, ElementType::Float32),
//!     FieldDescriptor::new(1, ElementType::Vec3),
//!     FieldDescriptor::new(2, ElementType::Float32),
//!     FieldDescriptor::new(3, ElementType::Mat2),
//! ];
//!
//! let layout = Layout::compile(&schema).unwrap();
//! assert_eq!(layout.size_bytes(), 80);
//! assert_eq!(layout.fields()[1].aligned_offset(), 16);
//!
//! let mut block = UniformBlock::new(&schema).unwrap();
//! let mut sink = MemorySink::new();
//! block
//!     .write(
//!         &[
//!             UniformValue::Float32(1.5),
//!             UniformValue::Vec3([11.0, 22.0, 33.0]),
//!             UniformValue::Float32(9.5),
//!             UniformValue::Mat2([[6.0, 8.0], [7.0, 9.0]]),
//!         ],
//!         &mut sink,
//!     )
//!     .unwrap();
//! assert_eq!(&sink.contents()[32..36], &9.5f32.to_le_bytes());
//! ```

pub mod block;
pub mod encode;
pub mod error;
pub mod layout;
pub mod serialize;
pub mod sink;
pub mod types;
pub mod value;

pub use block::UniformBlock;
pub use error::{FieldId, FieldRef, LayoutError, Result, SchemaError};
pub use layout::{FieldDescriptor, Layout, ResolvedField};
pub use serialize::{serialize, serialize_to, Serialized};
pub use sink::{BufferSink, MemorySink, Upload};
pub use types::{ElementType, TypeDescriptor};
pub use value::{UniformValue, ValueKind};

#[cfg(test)]
mod pod_tests {
    //! Cross-checks serialized images against hand-padded `#[repr(C)]` structs,
    //! the way fixed uniforms are usually declared.

    use bytemuck::{Pod, Zeroable};

    use super::*;

    #[repr(C)]
    #[derive(Debug, Copy, Clone, Pod, Zeroable)]
    struct MixedUniform {
        scale: f32,
        _pad0: [f32; 3],
        tint: [f32; 3],
        _pad1: f32,
        bias: f32,
        _pad2: [f32; 3],
        basis: [[f32; 4]; 2], // Mat2: two columns, 16 bytes each
    }

    #[repr(C)]
    #[derive(Debug, Copy, Clone, Pod, Zeroable)]
    struct PointLight {
        intensity: f32,
        _pad0: [f32; 3],
        position: [f32; 3],
        _pad1: f32,
    }

    #[repr(C)]
    #[derive(Debug, Copy, Clone, Pod, Zeroable)]
    struct LightsUniform {
        ambient: [f32; 4],
        lights: [PointLight; 3],
        count: u32,
        _pad: [u32; 3],
    }

    #[test]
    fn mixed_block_matches_repr_c() {
        let expected = MixedUniform {
            scale: 1.5,
            _pad0: [0.0; 3],
            tint: [11.0, 22.0, 33.0],
            _pad1: 0.0,
            bias: 9.5,
            _pad2: [0.0; 3],
            basis: [[6.0, 8.0, 0.0, 0.0], [7.0, 9.0, 0.0, 0.0]],
        };

        let layout = Layout::compile(&[
            FieldDescriptor::new(0, ElementType::Float32),
            FieldDescriptor::new(1, ElementType::Vec3),
            FieldDescriptor::new(2, ElementType::Float32),
            FieldDescriptor::new(3, ElementType::Mat2),
        ])
        .unwrap();
        assert_eq!(layout.size_bytes() as usize, std::mem::size_of::<MixedUniform>());

        let mut buf = vec![0u8; layout.size_bytes() as usize];
        serialize(
            &layout,
            &mut buf,
            &[
                1.5f32.into(),
                [11.0f32, 22.0, 33.0].into(),
                9.5f32.into(),
                [[6.0f32, 8.0], [7.0, 9.0]].into(),
            ],
        )
        .unwrap();
        assert_eq!(buf.as_slice(), bytemuck::bytes_of(&expected));

        // The same struct uploaded raw leaves the block image identical.
        let mut block = UniformBlock::from_layout(std::sync::Arc::new(layout));
        let mut sink = MemorySink::new();
        block.write_raw(bytemuck::bytes_of(&expected), &mut sink).unwrap();
        assert_eq!(block.bytes(), buf.as_slice());
        assert_eq!(sink.contents(), buf.as_slice());
    }

    #[test]
    fn light_array_matches_repr_c() {
        let lights = [
            PointLight { intensity: 1.0, _pad0: [0.0; 3], position: [0.0, 1.0, 2.0], _pad1: 0.0 },
            PointLight { intensity: 0.5, _pad0: [0.0; 3], position: [3.0, 4.0, 5.0], _pad1: 0.0 },
            PointLight { intensity: 0.25, _pad0: [0.0; 3], position: [6.0, 7.0, 8.0], _pad1: 0.0 },
        ];
        let expected = LightsUniform {
            ambient: [0.1, 0.1, 0.1, 1.0],
            lights,
            count: 3,
            _pad: [0; 3],
        };

        let layout = Layout::compile(&[
            FieldDescriptor::new(0, ElementType::Vec4),
            FieldDescriptor::structure(
                1,
                vec![
                    FieldDescriptor::new(0, ElementType::Float32),
                    FieldDescriptor::new(1, ElementType::Vec3),
                ],
            )
            .with_count(3),
            FieldDescriptor::new(2, ElementType::UInt32),
        ])
        .unwrap();

        let values = [
            UniformValue::Vec4(expected.ambient),
            UniformValue::Array(
                lights
                    .iter()
                    .map(|l| UniformValue::structure([UniformValue::from(l.intensity), l.position.into()]))
                    .collect(),
            ),
            UniformValue::UInt32(3),
        ];

        // The repr(C) struct pads the tail to 16; the layout does not.
        let mut buf = vec![0u8; std::mem::size_of::<LightsUniform>()];
        let out = serialize(&layout, &mut buf, &values).unwrap();
        assert_eq!(out.bytes_written, layout.size_bytes() as usize);
        assert_eq!(buf.as_slice(), bytemuck::bytes_of(&expected));
    }
}
