//! Serializes runtime values into the byte image described by a [`Layout`].

use crate::encode;
use crate::error::{FieldRef, LayoutError, Result};
use crate::layout::{Layout, ResolvedField};
use crate::sink::BufferSink;
use crate::types::{ElementType, SLOT_ALIGN};
use crate::value::{UniformValue, ValueKind};

const COLUMN_STRIDE: usize = SLOT_ALIGN as usize;

/// Outcome of one top-level serialization.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Serialized {
    /// End of the furthest byte written, relative to the buffer start.
    pub bytes_written: usize,
    /// Flat layout entries visited (struct members included once).
    pub fields_consumed: usize,
}

/// Accumulator threaded by value through the recursive walk.
#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Progress {
    pub(crate) end: usize,
    pub(crate) fields: usize,
}

impl Progress {
    #[inline]
    fn wrote(end: usize) -> Self {
        Self { end, fields: 0 }
    }

    /// Combines sibling fields: extents grow, field counts add up.
    #[inline]
    fn then(self, next: Progress) -> Self {
        Self { end: self.end.max(next.end), fields: self.fields + next.fields }
    }

    /// Combines array elements: every element visits the same members.
    #[inline]
    fn alongside(self, other: Progress) -> Self {
        Self { end: self.end.max(other.end), fields: self.fields.max(other.fields) }
    }
}

/// Writes `values` into `buf` following `layout`, without uploading.
///
/// `values` holds one entry per top-level field, in declaration order.
pub fn serialize(layout: &Layout, buf: &mut [u8], values: &[UniformValue]) -> Result<Serialized> {
    let progress = write_level(layout.fields(), values, buf, 0, FieldRef::Block)?;
    log::trace!(
        "serialized {} uniform fields, {} bytes",
        progress.fields,
        progress.end
    );
    Ok(Serialized { bytes_written: progress.end, fields_consumed: progress.fields })
}

/// Writes `values` into `buf` and hands the written prefix to `sink`.
///
/// Exactly one upload happens per call, at destination offset 0. When nothing
/// was written (empty layout) the sink is not called.
pub fn serialize_to<S>(
    layout: &Layout,
    buf: &mut [u8],
    values: &[UniformValue],
    sink: &mut S,
) -> Result<Serialized>
where
    S: BufferSink + ?Sized,
{
    let out = serialize(layout, buf, values)?;
    if out.bytes_written == 0 {
        log::trace!("empty uniform write; skipping upload");
        return Ok(out);
    }
    sink.write_buffer_bytes(0, &buf[..out.bytes_written]);
    Ok(out)
}

/// Writes one nesting level. `shift` moves every offset, which is how later
/// instances of a struct array reuse the first instance's resolved members.
fn write_level(
    fields: &[ResolvedField],
    values: &[UniformValue],
    buf: &mut [u8],
    shift: usize,
    owner: FieldRef,
) -> Result<Progress> {
    if fields.len() != values.len() {
        return Err(LayoutError::LengthMismatch {
            target: owner,
            expected: fields.len(),
            actual: values.len(),
        });
    }

    fields
        .iter()
        .zip(values)
        .try_fold(Progress::default(), |acc, (field, value)| {
            Ok(acc.then(write_field(field, value, buf, shift)?))
        })
}

/// Writes a single field (array or not) and counts its flat entries.
pub(crate) fn write_field(
    field: &ResolvedField,
    value: &UniformValue,
    buf: &mut [u8],
    shift: usize,
) -> Result<Progress> {
    let progress = if field.is_array() {
        let UniformValue::Array(items) = value else {
            return Err(mismatch(field, ValueKind::Array(field.count().into()), value));
        };
        if items.len() != usize::from(field.count()) {
            return Err(LayoutError::LengthMismatch {
                target: FieldRef::Field(field.id()),
                expected: field.count().into(),
                actual: items.len(),
            });
        }

        let stride = field.stride() as usize;
        items
            .iter()
            .enumerate()
            .try_fold(Progress::default(), |acc, (i, item)| {
                let element = write_element(field, item, buf, shift + i * stride)?;
                Ok::<_, LayoutError>(acc.alongside(element))
            })?
    } else {
        write_element(field, value, buf, shift)?
    };

    Ok(Progress { end: progress.end, fields: progress.fields + 1 })
}

fn write_element(
    field: &ResolvedField,
    value: &UniformValue,
    buf: &mut [u8],
    shift: usize,
) -> Result<Progress> {
    if field.ty() == ElementType::Struct {
        let UniformValue::Struct(members) = value else {
            return Err(mismatch(field, ValueKind::Element(ElementType::Struct), value));
        };
        return write_level(field.children(), members, buf, shift, FieldRef::Field(field.id()));
    }

    let at = field.aligned_offset() as usize + shift;
    let end = encode_value(field.ty(), value, buf, at)
        .map_err(|e| e.at_field(field.id()))?
        .ok_or_else(|| element_mismatch(field, value))?;
    Ok(Progress::wrote(end))
}

/// Encodes a non-struct value at `at`. `Ok(None)` means the value's type does
/// not match `ty`. Returns the end of the last byte written.
fn encode_value(
    ty: ElementType,
    value: &UniformValue,
    buf: &mut [u8],
    at: usize,
) -> Result<Option<usize>> {
    let end = match (ty, value) {
        (ElementType::Int32, UniformValue::Int32(v)) => encode::write_i32(buf, at, *v)?,
        (ElementType::UInt32, UniformValue::UInt32(v)) => encode::write_u32(buf, at, *v)?,
        (ElementType::Float32, UniformValue::Float32(v)) => encode::write_f32(buf, at, *v)?,
        (ElementType::Vec2, UniformValue::Vec2(v)) => encode::write_components(buf, at, v)?,
        (ElementType::Vec3, UniformValue::Vec3(v)) => encode::write_components(buf, at, v)?,
        (ElementType::Vec4, UniformValue::Vec4(v)) => encode::write_components(buf, at, v)?,
        (ElementType::Mat2, UniformValue::Mat2(m)) => write_columns(buf, at, m)?,
        (ElementType::Mat3, UniformValue::Mat3(m)) => write_columns(buf, at, m)?,
        (ElementType::Mat4, UniformValue::Mat4(m)) => write_columns(buf, at, m)?,
        _ => return Ok(None),
    };
    Ok(Some(end))
}

/// Column-major matrix: one 16-byte slot per column, trailing padding unwritten.
fn write_columns<const N: usize>(
    buf: &mut [u8],
    at: usize,
    columns: &[[f32; N]; N],
) -> Result<usize> {
    encode::write_sequence_with_stride(buf, at, COLUMN_STRIDE, columns.as_slice())?;
    Ok(at + COLUMN_STRIDE * (N - 1) + N * 4)
}

fn mismatch(field: &ResolvedField, expected: ValueKind, value: &UniformValue) -> LayoutError {
    LayoutError::TypeMismatch { id: field.id(), expected, actual: value.kind() }
}

/// A vector of the wrong width (or a matrix of the wrong dimension) is a
/// length problem on the field; anything else is a type problem.
fn element_mismatch(field: &ResolvedField, value: &UniformValue) -> LayoutError {
    let ty = field.ty();
    match value.element_type() {
        Some(actual)
            if (ty.is_vector() && actual.is_vector()) || (ty.is_matrix() && actual.is_matrix()) =>
        {
            LayoutError::LengthMismatch {
                target: FieldRef::Field(field.id()),
                expected: ty.component_count() as usize,
                actual: actual.component_count() as usize,
            }
        }
        _ => mismatch(field, ValueKind::Element(ty), value),
    }
}
