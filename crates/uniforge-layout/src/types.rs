//! Element kinds and their std140 size/alignment table.

use std::fmt;

use crate::error::SchemaError;

/// Width of one component. Every scalar in a uniform block is 32 bits.
pub const COMPONENT_SIZE: u32 = 4;

/// Boundary for array elements, structs and matrix columns.
pub const SLOT_ALIGN: u32 = 16;

/// Kind of a single uniform field element.
///
/// Discriminants are the raw tags accepted by [`ElementType::try_from`].
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ElementType {
    UInt32 = 1,
    Int32 = 2,
    Float32 = 3,
    Vec2 = 4,
    Vec3 = 5,
    Vec4 = 6,
    Mat2 = 7,
    Mat3 = 8,
    Mat4 = 9,
    Struct = 10,
}

/// Static size/alignment facts for one element kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TypeDescriptor {
    pub component_width: u32,
    pub component_count: u32,
    pub base_alignment: u32,
    pub natural_size: u32,
}

impl ElementType {
    pub const ALL: [ElementType; 10] = [
        ElementType::UInt32,
        ElementType::Int32,
        ElementType::Float32,
        ElementType::Vec2,
        ElementType::Vec3,
        ElementType::Vec4,
        ElementType::Mat2,
        ElementType::Mat3,
        ElementType::Mat4,
        ElementType::Struct,
    ];

    /// Minimum boundary a non-array field of this type must start on.
    #[inline]
    pub const fn base_alignment(self) -> u32 {
        match self {
            ElementType::UInt32 | ElementType::Int32 | ElementType::Float32 => 4,
            ElementType::Vec2 => 8,
            ElementType::Vec3
            | ElementType::Vec4
            | ElementType::Mat2
            | ElementType::Mat3
            | ElementType::Mat4
            | ElementType::Struct => SLOT_ALIGN,
        }
    }

    /// Number of 32-bit components. Structs have none of their own.
    #[inline]
    pub const fn component_count(self) -> u32 {
        match self {
            ElementType::UInt32 | ElementType::Int32 | ElementType::Float32 => 1,
            ElementType::Vec2 => 2,
            ElementType::Vec3 => 3,
            ElementType::Vec4 => 4,
            ElementType::Mat2 => 2 * 2,
            ElementType::Mat3 => 3 * 3,
            ElementType::Mat4 => 4 * 4,
            ElementType::Struct => 0,
        }
    }

    /// Unpadded payload size in bytes (e.g. 12 for `Vec3`, 36 for `Mat3`).
    #[inline]
    pub const fn natural_size_bytes(self) -> u32 {
        self.component_count() * COMPONENT_SIZE
    }

    /// Column count for matrices, 1 for everything else.
    #[inline]
    pub const fn column_count(self) -> u32 {
        match self {
            ElementType::Mat2 => 2,
            ElementType::Mat3 => 3,
            ElementType::Mat4 => 4,
            _ => 1,
        }
    }

    /// Distance between consecutive array elements.
    ///
    /// Every element is padded to at least one 16-byte slot; matrices take one
    /// slot per column. Struct strides depend on their members and are
    /// computed by the layout compiler instead.
    #[inline]
    pub const fn array_stride(self) -> u32 {
        SLOT_ALIGN * self.column_count()
    }

    #[inline]
    pub const fn is_vector(self) -> bool {
        matches!(self, ElementType::Vec2 | ElementType::Vec3 | ElementType::Vec4)
    }

    #[inline]
    pub const fn is_matrix(self) -> bool {
        matches!(self, ElementType::Mat2 | ElementType::Mat3 | ElementType::Mat4)
    }

    #[inline]
    pub const fn descriptor(self) -> TypeDescriptor {
        TypeDescriptor {
            component_width: COMPONENT_SIZE,
            component_count: self.component_count(),
            base_alignment: self.base_alignment(),
            natural_size: self.natural_size_bytes(),
        }
    }
}

impl TryFrom<u8> for ElementType {
    type Error = SchemaError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        ElementType::ALL
            .into_iter()
            .find(|ty| *ty as u8 == tag)
            .ok_or(SchemaError::UnknownType(tag))
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::UInt32 => "uint32",
            ElementType::Int32 => "int32",
            ElementType::Float32 => "float32",
            ElementType::Vec2 => "Vec2",
            ElementType::Vec3 => "Vec3",
            ElementType::Vec4 => "Vec4",
            ElementType::Mat2 => "Mat2",
            ElementType::Mat3 => "Mat3",
            ElementType::Mat4 => "Mat4",
            ElementType::Struct => "Struct",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_alignment_is_four() {
        for ty in [ElementType::Int32, ElementType::UInt32, ElementType::Float32] {
            assert_eq!(ty.base_alignment(), 4);
            assert_eq!(ty.natural_size_bytes(), 4);
        }
    }

    #[test]
    fn vec2_aligns_to_eight() {
        assert_eq!(ElementType::Vec2.base_alignment(), 8);
        assert_eq!(ElementType::Vec2.natural_size_bytes(), 8);
    }

    #[test]
    fn wide_types_align_to_sixteen() {
        for ty in [
            ElementType::Vec3,
            ElementType::Vec4,
            ElementType::Mat2,
            ElementType::Mat3,
            ElementType::Mat4,
            ElementType::Struct,
        ] {
            assert_eq!(ty.base_alignment(), 16, "{ty}");
        }
    }

    #[test]
    fn array_strides() {
        assert_eq!(ElementType::Float32.array_stride(), 16);
        assert_eq!(ElementType::Vec2.array_stride(), 16);
        assert_eq!(ElementType::Vec4.array_stride(), 16);
        assert_eq!(ElementType::Mat2.array_stride(), 32);
        assert_eq!(ElementType::Mat3.array_stride(), 48);
        assert_eq!(ElementType::Mat4.array_stride(), 64);
    }

    #[test]
    fn matrix_components() {
        assert_eq!(ElementType::Mat3.component_count(), 9);
        assert_eq!(ElementType::Mat3.natural_size_bytes(), 36);
        assert_eq!(ElementType::Mat4.column_count(), 4);
        assert!(ElementType::Mat2.is_matrix());
        assert!(!ElementType::Vec4.is_matrix());
        assert!(ElementType::Vec2.is_vector());
        assert!(!ElementType::Mat2.is_vector());
    }

    #[test]
    fn raw_tags_round_trip() {
        for ty in ElementType::ALL {
            assert_eq!(ElementType::try_from(ty as u8), Ok(ty));
        }
    }

    #[test]
    fn unknown_tags_rejected() {
        assert_eq!(ElementType::try_from(0), Err(SchemaError::UnknownType(0)));
        assert_eq!(ElementType::try_from(11), Err(SchemaError::UnknownType(11)));
    }

    #[test]
    fn descriptor_matches_lookups() {
        let d = ElementType::Vec3.descriptor();
        assert_eq!(d.component_width, 4);
        assert_eq!(d.component_count, 3);
        assert_eq!(d.base_alignment, 16);
        assert_eq!(d.natural_size, 12);
    }
}
