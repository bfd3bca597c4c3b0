//! Runtime values matched against a compiled layout.

use std::fmt;

use crate::types::ElementType;

/// A value for one uniform field.
///
/// Values are matched to fields positionally. A field declared with
/// `count > 1` takes an [`UniformValue::Array`] of exactly `count` elements;
/// a struct field takes a [`UniformValue::Struct`] listing one value per
/// declared subfield, in declaration order.
///
/// Matrices are column-major: `m[c]` is column `c`.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int32(i32),
    UInt32(u32),
    Float32(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([[f32; 2]; 2]),
    Mat3([[f32; 3]; 3]),
    Mat4([[f32; 4]; 4]),
    Struct(Vec<UniformValue>),
    Array(Vec<UniformValue>),
}

/// Shape of a value (or of what a field expects), used in error reports.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ValueKind {
    Element(ElementType),
    Array(usize),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Element(ty) => write!(f, "{ty}"),
            ValueKind::Array(len) => write!(f, "array[{len}]"),
        }
    }
}

impl UniformValue {
    /// Builds an array value from anything convertible into values.
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<UniformValue>,
    {
        UniformValue::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn structure<I, V>(members: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<UniformValue>,
    {
        UniformValue::Struct(members.into_iter().map(Into::into).collect())
    }

    /// Element type carried by this value, or `None` for arrays.
    pub fn element_type(&self) -> Option<ElementType> {
        match self.kind() {
            ValueKind::Element(ty) => Some(ty),
            ValueKind::Array(_) => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        let ty = match self {
            UniformValue::Int32(_) => ElementType::Int32,
            UniformValue::UInt32(_) => ElementType::UInt32,
            UniformValue::Float32(_) => ElementType::Float32,
            UniformValue::Vec2(_) => ElementType::Vec2,
            UniformValue::Vec3(_) => ElementType::Vec3,
            UniformValue::Vec4(_) => ElementType::Vec4,
            UniformValue::Mat2(_) => ElementType::Mat2,
            UniformValue::Mat3(_) => ElementType::Mat3,
            UniformValue::Mat4(_) => ElementType::Mat4,
            UniformValue::Struct(_) => ElementType::Struct,
            UniformValue::Array(items) => return ValueKind::Array(items.len()),
        };
        ValueKind::Element(ty)
    }
}

macro_rules! impl_from {
    ($($src:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$src> for UniformValue {
                #[inline]
                fn from(v: $src) -> Self {
                    UniformValue::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    i32 => Int32,
    u32 => UInt32,
    f32 => Float32,
    [f32; 2] => Vec2,
    [f32; 3] => Vec3,
    [f32; 4] => Vec4,
    [[f32; 2]; 2] => Mat2,
    [[f32; 3]; 3] => Mat3,
    [[f32; 4]; 4] => Mat4,
}
