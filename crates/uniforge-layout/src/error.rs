use std::fmt;

use crate::types::ElementType;
use crate::value::ValueKind;

/// Field identifier, unique within one nesting level of a schema.
pub type FieldId = u16;

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Where an error was detected: the block as a whole, or a specific field.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldRef {
    Block,
    Field(FieldId),
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Block => f.write_str("uniform block"),
            FieldRef::Field(id) => write!(f, "field {id}"),
        }
    }
}

/// Problems with the declared schema itself. Raised while compiling.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown element type tag {0}")]
    UnknownType(u8),

    #[error("field id {id} is reused at the same level: first declared as {first}, then as {second}")]
    DuplicateId {
        id: FieldId,
        first: ElementType,
        second: ElementType,
    },

    #[error("struct field {id} declares no subfields")]
    EmptyStruct { id: FieldId },

    #[error("field {id} of type {ty} declares subfields; only structs may")]
    UnexpectedSubfields { id: FieldId, ty: ElementType },

    #[error("field {id} pushes the block past the 32-bit size limit")]
    TooLarge { id: FieldId },
}

/// Every failure the compiler and serializer can report.
///
/// All of these are schema or caller defects. There is no partial uniform
/// block, so nothing here is retried.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("type mismatch on field {id}: expected {expected}, got {actual}")]
    TypeMismatch {
        id: FieldId,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("length mismatch on {target}: expected {expected} values, got {actual}")]
    LengthMismatch {
        target: FieldRef,
        expected: usize,
        actual: usize,
    },

    #[error("{target}: writing {len} bytes at offset {offset} overflows a {capacity}-byte buffer")]
    Capacity {
        target: FieldRef,
        offset: usize,
        len: usize,
        capacity: usize,
    },

    #[error("no field with id {id} and type {ty} in layout")]
    Lookup { id: FieldId, ty: ElementType },

    #[error("raw upload of {len} bytes is not a whole number of 4-byte components")]
    UnalignedLength { len: usize },
}

impl LayoutError {
    /// Attributes a block-level capacity error to `id`.
    ///
    /// Encoding primitives know nothing about fields; the serializer calls this
    /// on their errors so the report names the field being written.
    pub(crate) fn at_field(self, id: FieldId) -> Self {
        match self {
            LayoutError::Capacity {
                target: FieldRef::Block,
                offset,
                len,
                capacity,
            } => LayoutError::Capacity {
                target: FieldRef::Field(id),
                offset,
                len,
                capacity,
            },
            other => other,
        }
    }
}
