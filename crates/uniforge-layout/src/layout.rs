//! Schema declaration and the std140-style layout compiler.
//!
//! Rules applied per nesting level, in declaration order:
//! - a field starts on its type's base alignment, or on 16 when it is an array
//! - non-struct fields advance by `alignment * count * columns`
//! - structs advance by their member size rounded up to 16, times `count`
//!
//! Struct members are resolved at absolute offsets for the first instance of
//! the struct; later instances of a struct array sit one stride further each.

use std::collections::HashMap;

use crate::error::{FieldId, LayoutError, Result, SchemaError};
use crate::types::{ElementType, SLOT_ALIGN};
use crate::value::ValueKind;

/// One declared field of a uniform block schema.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FieldDescriptor {
    pub id: FieldId,
    pub ty: ElementType,
    /// 0 or 1 declares a single value; larger values declare a fixed array.
    pub count: u16,
    /// Members of a struct field. Must be empty for every other type.
    pub subfields: Vec<FieldDescriptor>,
}

impl FieldDescriptor {
    #[inline]
    pub fn new(id: FieldId, ty: ElementType) -> Self {
        Self { id, ty, count: 1, subfields: Vec::new() }
    }

    #[inline]
    pub fn array(id: FieldId, ty: ElementType, count: u16) -> Self {
        Self { id, ty, count, subfields: Vec::new() }
    }

    #[inline]
    pub fn structure(id: FieldId, subfields: Vec<FieldDescriptor>) -> Self {
        Self { id, ty: ElementType::Struct, count: 1, subfields }
    }

    /// Turns this declaration into an array of `count` elements.
    #[inline]
    pub fn with_count(mut self, count: u16) -> Self {
        self.count = count;
        self
    }

    /// Builds a descriptor from a raw type tag.
    pub fn from_raw(
        id: FieldId,
        tag: u8,
        count: u16,
        subfields: Vec<FieldDescriptor>,
    ) -> Result<Self> {
        let ty = ElementType::try_from(tag)?;
        Ok(Self { id, ty, count, subfields })
    }
}

/// A field with its offset resolved. Never mutated after compilation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResolvedField {
    id: FieldId,
    ty: ElementType,
    count: u16,
    aligned_offset: u32,
    stride: u32,
    children: Vec<ResolvedField>,
}

impl ResolvedField {
    #[inline]
    pub fn id(&self) -> FieldId {
        self.id
    }

    #[inline]
    pub fn ty(&self) -> ElementType {
        self.ty
    }

    /// Element count, normalized so a single value reports 1.
    #[inline]
    pub fn count(&self) -> u16 {
        self.count
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.count > 1
    }

    /// Absolute byte offset from the start of the block.
    #[inline]
    pub fn aligned_offset(&self) -> u32 {
        self.aligned_offset
    }

    /// Bytes reserved per element, padding included.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Bytes reserved for the whole field.
    #[inline]
    pub fn size_bytes(&self) -> u32 {
        self.stride * u32::from(self.count)
    }

    /// Boundary `aligned_offset` is guaranteed to sit on.
    #[inline]
    pub fn required_alignment(&self) -> u32 {
        if self.is_array() { SLOT_ALIGN } else { self.ty.base_alignment() }
    }

    /// Resolved struct members (first instance). Empty for non-struct fields.
    #[inline]
    pub fn children(&self) -> &[ResolvedField] {
        &self.children
    }

    /// Finds the direct member `id`, which must be declared as `ty`.
    pub fn child(&self, id: FieldId, ty: ElementType) -> Result<&ResolvedField> {
        find(&self.children, id, ty)
    }
}

/// Compiled, offset-resolved layout of a uniform block.
///
/// Immutable once built; share it behind an `Arc` between buffers and threads.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Layout {
    fields: Vec<ResolvedField>,
    size: u32,
}

impl Layout {
    /// Compiles a schema. Fails on the first schema defect; nothing partial is
    /// returned.
    pub fn compile(fields: &[FieldDescriptor]) -> Result<Self> {
        let (fields, size) = compile_level(fields, 0)?;
        let layout = Self { fields, size };
        log::debug!(
            "compiled uniform layout: {} fields ({} flat), {} bytes",
            layout.fields.len(),
            layout.flat_len(),
            layout.size
        );
        Ok(layout)
    }

    /// Top-level fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    #[inline]
    pub fn size_bytes(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Finds the top-level field `id`, which must be declared as `ty`.
    pub fn lookup(&self, id: FieldId, ty: ElementType) -> Result<&ResolvedField> {
        find(&self.fields, id, ty)
    }

    /// Descends through struct members, one `(id, type)` pair per level.
    ///
    /// Offsets of members reached through a struct array are those of the
    /// array's first instance. An empty path finds nothing.
    pub fn lookup_path(&self, path: &[(FieldId, ElementType)]) -> Result<&ResolvedField> {
        let Some(((id, ty), rest)) = path.split_first() else {
            return Err(LayoutError::Lookup { id: 0, ty: ElementType::Struct });
        };
        rest.iter()
            .try_fold(self.lookup(*id, *ty)?, |field, (id, ty)| field.child(*id, *ty))
    }

    /// Depth-first walk with struct members right after their owning field.
    pub fn iter_flat(&self) -> FlatFields<'_> {
        FlatFields { stack: vec![self.fields.iter()] }
    }

    pub fn flat_len(&self) -> usize {
        self.iter_flat().count()
    }
}

/// Iterator returned by [`Layout::iter_flat`].
pub struct FlatFields<'a> {
    stack: Vec<std::slice::Iter<'a, ResolvedField>>,
}

impl<'a> Iterator for FlatFields<'a> {
    type Item = &'a ResolvedField;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(field) => {
                    if !field.children.is_empty() {
                        self.stack.push(field.children.iter());
                    }
                    return Some(field);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

fn find(fields: &[ResolvedField], id: FieldId, ty: ElementType) -> Result<&ResolvedField> {
    match fields.iter().find(|f| f.id == id) {
        Some(f) if f.ty == ty => Ok(f),
        Some(f) => Err(LayoutError::TypeMismatch {
            id,
            expected: ValueKind::Element(f.ty),
            actual: ValueKind::Element(ty),
        }),
        None => Err(LayoutError::Lookup { id, ty }),
    }
}

/// Resolves one nesting level starting at absolute offset `base`.
///
/// Returns the resolved fields and the unrounded byte size of the level.
fn compile_level(fields: &[FieldDescriptor], base: u32) -> Result<(Vec<ResolvedField>, u32)> {
    let mut seen: HashMap<FieldId, ElementType> = HashMap::with_capacity(fields.len());
    let mut resolved = Vec::with_capacity(fields.len());
    let mut cursor: u32 = 0;

    for field in fields {
        if let Some(&first) = seen.get(&field.id) {
            return Err(SchemaError::DuplicateId { id: field.id, first, second: field.ty }.into());
        }
        seen.insert(field.id, field.ty);

        match (field.ty, field.subfields.is_empty()) {
            (ElementType::Struct, true) => {
                return Err(SchemaError::EmptyStruct { id: field.id }.into());
            }
            (ty, false) if ty != ElementType::Struct => {
                return Err(SchemaError::UnexpectedSubfields { id: field.id, ty }.into());
            }
            _ => {}
        }

        let too_large = || LayoutError::from(SchemaError::TooLarge { id: field.id });

        let count = field.count.max(1);
        let align = if count > 1 { SLOT_ALIGN } else { field.ty.base_alignment() };

        cursor = cursor.checked_next_multiple_of(align).ok_or_else(too_large)?;
        let offset = base.checked_add(cursor).ok_or_else(too_large)?;

        let (children, stride) = if field.ty == ElementType::Struct {
            let (children, size) = compile_level(&field.subfields, offset)?;
            let stride = size.checked_next_multiple_of(SLOT_ALIGN).ok_or_else(too_large)?;
            (children, stride)
        } else {
            (Vec::new(), align * field.ty.column_count())
        };

        let size = stride.checked_mul(u32::from(count)).ok_or_else(too_large)?;
        cursor = cursor.checked_add(size).ok_or_else(too_large)?;
        base.checked_add(cursor).ok_or_else(too_large)?;

        resolved.push(ResolvedField {
            id: field.id,
            ty: field.ty,
            count,
            aligned_offset: offset,
            stride,
            children,
        });
    }

    Ok((resolved, cursor))
}
