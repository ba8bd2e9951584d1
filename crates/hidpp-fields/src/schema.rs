//! Record schemas.
//!
//! A [`Schema`] is an ordered, immutable table of [`FieldDescriptor`]s shared
//! by every record of that type. Schemas are declared as `static` items with
//! the [`schema!`](crate::schema!) macro and identified by address.
//!
//! Resolution (identifier assignment and validation) runs once per schema on
//! first use and is cached. A broken declaration is reported as a
//! [`SchemaError`] every time it is used.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use hidpp_errors::{HidppError, Result, SchemaError};

use crate::descriptor::{FieldDescriptor, FieldKind};

/// Acceptance predicate over `(data, byte_offset, byte_limit)`.
pub type AcceptFn = fn(&[u8], usize, usize) -> bool;

/// Resolved per-schema data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    fids: Vec<i32>,
}

impl Layout {
    pub fn fids(&self) -> &[i32] {
        &self.fids
    }

    /// Index of the field with identifier `fid`.
    pub fn index_of(&self, fid: i32) -> Option<usize> {
        self.fids.iter().position(|candidate| *candidate == fid)
    }
}

pub struct Schema {
    name: &'static str,
    fields: &'static [FieldDescriptor],
    parents: &'static [&'static Schema],
    length: Option<usize>,
    accept: Option<AcceptFn>,
    layout: OnceLock<std::result::Result<Layout, SchemaError>>,
}

impl Schema {
    /// Declare a schema. Prefer the [`schema!`](crate::schema!) macro.
    pub const fn new(
        name: &'static str,
        fields: &'static [FieldDescriptor],
        parents: &'static [&'static Schema],
        length: Option<usize>,
        accept: Option<AcceptFn>,
    ) -> Self {
        Self {
            name,
            fields,
            parents,
            length,
            accept,
            layout: OnceLock::new(),
        }
    }

    /// A field-less schema used only as a classification marker.
    pub const fn marker(name: &'static str, parents: &'static [&'static Schema]) -> Self {
        Self::new(name, &[], parents, None, None)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    pub fn parents(&self) -> &'static [&'static Schema] {
        self.parents
    }

    /// Declared total length in bits, if any.
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    /// Whether `self` is `other` or derives from it, transitively.
    pub fn is_a(&self, other: &Schema) -> bool {
        std::ptr::eq(self, other) || self.parents.iter().any(|parent| parent.is_a(other))
    }

    /// Whether a record of this schema could start at `data[offset..limit]`.
    ///
    /// Uses the declared predicate, or else the tag of a tagged first field.
    pub fn accepts(&self, data: &[u8], offset: usize, limit: usize) -> bool {
        if let Some(accept) = self.accept {
            return accept(data, offset, limit);
        }
        match (self.fields.first(), self.layout()) {
            (Some(first), Ok(layout)) if first.tag_length == 8 => layout
                .fids()
                .first()
                .zip(data.get(offset).filter(|_| offset < limit))
                .is_some_and(|(fid, byte)| *fid == i32::from(*byte)),
            _ => offset < limit,
        }
    }

    /// Total wire size in bits when every field has a fixed size.
    pub fn fixed_bits(&self) -> Option<usize> {
        if let Some(length) = self.length {
            return Some(length);
        }
        self.fields.iter().map(FieldDescriptor::fixed_bits).sum()
    }

    /// Resolve identifiers and validate the declaration.
    ///
    /// # Errors
    ///
    /// Returns the cached [`SchemaError`] if the declaration is invalid.
    pub fn layout(&self) -> Result<&Layout> {
        self.layout
            .get_or_init(|| self.resolve())
            .as_ref()
            .map_err(|err| HidppError::from(err.clone()))
    }

    pub fn field_index(&self, fid: i32) -> Result<Option<usize>> {
        Ok(self.layout()?.index_of(fid))
    }

    fn resolve(&self) -> std::result::Result<Layout, SchemaError> {
        let mut names = HashSet::new();
        let mut used: HashSet<i32> = HashSet::new();
        for field in self.fields {
            for name in std::iter::once(field.name).chain(field.aliases.iter().copied()) {
                if !names.insert(name.to_ascii_lowercase()) {
                    return Err(SchemaError::DuplicateName {
                        schema: self.name.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            if let Some(fid) = field.fid {
                if !used.insert(fid) {
                    return Err(SchemaError::DuplicateIdentifier {
                        schema: self.name.to_string(),
                        fid,
                    });
                }
            }
            self.validate_field(field)?;
        }

        let mut next_auto = -1;
        let mut fids = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            let fid = match field.fid {
                Some(fid) => fid,
                None => {
                    while used.contains(&next_auto) {
                        next_auto -= 1;
                    }
                    used.insert(next_auto);
                    next_auto
                }
            };
            if field.tag_length > 0 && fid < 0 {
                return Err(SchemaError::invalid(
                    self.name,
                    format!("tagged field '{}' has negative identifier {fid}", field.name),
                ));
            }
            if field.tag_length > 0 && field.tag_length < 64 && (fid as u64) >> field.tag_length != 0 {
                return Err(SchemaError::invalid(
                    self.name,
                    format!(
                        "identifier {fid} of '{}' does not fit its {}-bit tag",
                        field.name, field.tag_length
                    ),
                ));
            }
            fids.push(fid);
        }

        let tails = self.fields.iter().filter(|field| field.is_tail()).count();
        if tails > 1 {
            return Err(SchemaError::invalid(
                self.name,
                "more than one field consumes the remaining data",
            ));
        }
        Ok(Layout { fids })
    }

    fn validate_field(&self, field: &FieldDescriptor) -> std::result::Result<(), SchemaError> {
        let reason = match field.kind {
            FieldKind::Unsigned | FieldKind::Signed if field.length == 0 || field.length > 64 => {
                Some(format!("integer field '{}' must be 1 to 64 bits wide", field.name))
            }
            FieldKind::Bytes | FieldKind::Text if field.length % 8 != 0 => Some(format!(
                "byte field '{}' has a length of {} bits",
                field.name, field.length
            )),
            _ if field.len_length > 64 || field.tag_length > 32 => {
                Some(format!("prefix of '{}' is too wide", field.name))
            }
            _ if field.len_length > 0 && field.length > 0 => Some(format!(
                "field '{}' has both a fixed length and a length prefix",
                field.name
            )),
            _ => None,
        };
        match reason {
            Some(reason) => Err(SchemaError::invalid(self.name, reason)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Schema {}

/// Declare a `static` [`Schema`].
///
/// ```
/// use hidpp_fields::{schema, FieldDescriptor};
///
/// schema! {
///     pub static BATTERY_LEVEL = "BatteryLevel", length = 24;
///     FieldDescriptor::unsigned("level", 8),
///     FieldDescriptor::padding(0),
/// }
///
/// assert_eq!(BATTERY_LEVEL.name(), "BatteryLevel");
/// assert_eq!(BATTERY_LEVEL.fixed_bits(), Some(24));
/// ```
#[macro_export]
macro_rules! schema {
    (
        $vis:vis static $ident:ident = $name:literal
        $(, length = $length:expr)?
        $(, parents = [$($parent:path),* $(,)?])?
        $(, accept = $accept:expr)?
        ;
        $($field:expr),* $(,)?
    ) => {
        $vis static $ident: $crate::Schema = {
            static FIELDS: &[$crate::FieldDescriptor] = &[$($field),*];
            static PARENTS: &[&$crate::Schema] = &[$($(&$parent),*)?];
            $crate::Schema::new(
                $name,
                FIELDS,
                PARENTS,
                $crate::schema!(@opt $($length)?),
                $crate::schema!(@opt $($accept)?),
            )
        };
    };
    (@opt) => { None };
    (@opt $value:expr) => { Some($value) };
}

/// Declare a `static` marker [`Schema`] with no fields.
#[macro_export]
macro_rules! marker {
    ($vis:vis static $ident:ident = $name:literal $(, parents = [$($parent:path),* $(,)?])? ;) => {
        $vis static $ident: $crate::Schema = {
            static PARENTS: &[&$crate::Schema] = &[$($(&$parent),*)?];
            $crate::Schema::marker($name, PARENTS)
        };
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    marker! { static CATEGORY = "Category"; }
    marker! { static SUBCATEGORY = "Subcategory", parents = [CATEGORY]; }

    schema! {
        static AUTO = "Auto", parents = [SUBCATEGORY];
        FieldDescriptor::unsigned("a", 8),
        FieldDescriptor::unsigned("b", 8).with_fid(-1),
        FieldDescriptor::unsigned("c", 8),
    }

    schema! {
        static TAGGED_NEGATIVE = "TaggedNegative";
        FieldDescriptor::unsigned("a", 8).tagged(8),
    }

    schema! {
        static DUPLICATE = "Duplicate";
        FieldDescriptor::unsigned("name", 8),
        FieldDescriptor::unsigned("other", 8).with_aliases(&["NAME"]),
    }

    schema! {
        static TWO_TAILS = "TwoTails";
        FieldDescriptor::tail("a"),
        FieldDescriptor::tail("b"),
    }

    #[test]
    fn test_auto_identifiers_skip_explicit_ones() -> Result<()> {
        assert_eq!(AUTO.layout()?.fids(), &[-2, -1, -3]);
        Ok(())
    }

    #[test]
    fn test_subtype_membership() {
        assert!(AUTO.is_a(&CATEGORY));
        assert!(AUTO.is_a(&SUBCATEGORY));
        assert!(AUTO.is_a(&AUTO));
        assert!(!CATEGORY.is_a(&AUTO));
    }

    #[test]
    fn test_tagged_negative_identifier_is_invalid() {
        let err = TAGGED_NEGATIVE.layout().err();
        assert!(matches!(
            err,
            Some(HidppError::Schema(SchemaError::InvalidSchema { .. }))
        ));
        // cached, reported again
        assert!(TAGGED_NEGATIVE.layout().is_err());
    }

    #[test]
    fn test_duplicate_names_are_case_insensitive() {
        assert!(matches!(
            DUPLICATE.layout(),
            Err(HidppError::Schema(SchemaError::DuplicateName { .. }))
        ));
    }

    #[test]
    fn test_only_one_tail() {
        assert!(TWO_TAILS.layout().is_err());
    }

    #[test]
    fn test_fixed_bits() {
        assert_eq!(AUTO.fixed_bits(), Some(24));
        assert_eq!(CATEGORY.fixed_bits(), Some(0));
    }
}
