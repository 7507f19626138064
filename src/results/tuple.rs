use std::borrow::Cow;
use std::fmt;

use crate::error::SqlTypegenError;
use crate::types::{DbValue, HostType};

/// Name and host type of one projected column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDescriptor {
    pub name: Cow<'static, str>,
    pub host_type: HostType,
}

impl ColumnDescriptor {
    /// Descriptor with a static name, usable in `const` column tables.
    #[must_use]
    pub const fn new(name: &'static str, host_type: HostType) -> Self {
        Self {
            name: Cow::Borrowed(name),
            host_type,
        }
    }

    #[must_use]
    pub fn owned(name: String, host_type: HostType) -> Self {
        Self {
            name: Cow::Owned(name),
            host_type,
        }
    }
}

/// A tuple field that could not be decoded. The row is kept; the field holds its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGetFailure {
    pub field: String,
    pub failure: String,
}

impl fmt::Display for FieldGetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.failure)
    }
}

/// One decoded row, typed per column.
///
/// Implemented by generated tuple types. Field order follows
/// [`Tuple::column_descriptors`], which is fixed for the life of the type.
pub trait Tuple: Default + Clone + PartialEq + fmt::Debug {
    /// Type name, used in `Display` output and diagnostics.
    const NAME: &'static str;

    fn column_descriptors() -> &'static [ColumnDescriptor];

    /// Decode `value` into the field at `index`.
    ///
    /// # Errors
    /// Returns `SqlTypegenError::MappingError` if the value does not fit the field
    /// or the index is out of range.
    fn set_field(&mut self, index: usize, value: DbValue) -> Result<(), SqlTypegenError>;

    /// Current value of the field at `index`, or `None` past the last field.
    fn field(&self, index: usize) -> Option<DbValue>;

    /// Snapshot every field, in column order.
    fn backup(&self) -> Vec<DbValue> {
        (0..Self::column_descriptors().len())
            .filter_map(|i| self.field(i))
            .collect()
    }

    /// Load fields from a snapshot taken by [`Tuple::backup`].
    ///
    /// Each field is restored independently; failures are returned rather than raised.
    fn restore(&mut self, values: &[DbValue]) -> Vec<FieldGetFailure> {
        let columns = Self::column_descriptors();
        let mut failures = Vec::new();
        for (index, value) in values.iter().enumerate() {
            if let Err(e) = self.set_field(index, value.clone()) {
                failures.push(FieldGetFailure {
                    field: columns
                        .get(index)
                        .map_or_else(|| index.to_string(), |c| c.name.to_string()),
                    failure: e.to_string(),
                });
            }
        }
        failures
    }

    /// Error for a field index past the last column.
    #[must_use]
    fn no_such_field(index: usize) -> SqlTypegenError {
        SqlTypegenError::MappingError(format!("{} has no field at index {index}", Self::NAME))
    }
}

/// `Display` body shared by generated tuples: `Name {a = 1, b = x}`.
///
/// # Errors
/// Propagates formatter errors.
pub fn display_tuple<T: Tuple>(tuple: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {{", T::NAME)?;
    for (index, column) in T::column_descriptors().iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        let value = tuple.field(index).unwrap_or(DbValue::Null);
        write!(f, "{} = {value}", column.name)?;
    }
    f.write_str("}")
}
