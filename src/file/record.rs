//! Data record formatting
//!
//! A record is one line of the data file: every field is stringified,
//! record-like fields (tuples, sequences, [`DataRecord`] values) are
//! flattened in place, and the result is joined with the writer's
//! delimiter and terminated by a single newline.

use std::fmt;

/// One value of a saved record
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// A nested group of fields, flattened when the record is written
    Record(Vec<Field>),
}

/// Domain values that save as several fields (e.g. one measured sample)
pub trait DataRecord {
    fn fields(&self) -> Vec<Field>;
}

impl Field {
    /// Wrap a domain value as a nested record
    pub fn record<R: DataRecord + ?Sized>(value: &R) -> Self {
        Field::Record(value.fields())
    }

    fn push_flat(&self, out: &mut Vec<String>) {
        match self {
            Field::Record(fields) => {
                for field in fields {
                    field.push_flat(out);
                }
            }
            scalar => out.push(scalar.to_string()),
        }
    }
}

impl fmt::Display for Field {
    /// Scalars print as themselves; floats always keep a decimal point
    /// (`1.0`, `0.25`, `1e-7`). Records print comma-joined.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{}", v),
            Field::UInt(v) => write!(f, "{}", v),
            Field::Float(v) => write!(f, "{:?}", v),
            Field::Text(v) => f.write_str(v),
            Field::Bool(v) => write!(f, "{}", v),
            Field::Record(_) => f.write_str(&format_fields(std::slice::from_ref(self), ",")),
        }
    }
}

/// Flatten and join fields, without the trailing newline
pub fn format_fields(fields: &[Field], delimiter: &str) -> String {
    let mut flat = Vec::with_capacity(fields.len());
    for field in fields {
        field.push_flat(&mut flat);
    }
    flat.join(delimiter)
}

/// Build one complete record line (with trailing newline)
pub fn format_record(fields: &[Field], delimiter: &str) -> String {
    let mut line = format_fields(fields, delimiter);
    line.push('\n');
    line
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty: $($t:ty),*) => {
        $(impl From<$t> for Field {
            fn from(v: $t) -> Self {
                Field::$variant(v as $target)
            }
        })*
    };
}

impl_from_int!(Int, i64: i8, i16, i32, i64, isize);
impl_from_int!(UInt, u64: u8, u16, u32, u64, usize);

impl From<f64> for Field {
    fn from(v: f64) -> Self {
        Field::Float(v)
    }
}

impl From<f32> for Field {
    fn from(v: f32) -> Self {
        Field::Float(v as f64)
    }
}

impl From<bool> for Field {
    fn from(v: bool) -> Self {
        Field::Bool(v)
    }
}

impl From<&str> for Field {
    fn from(v: &str) -> Self {
        Field::Text(v.to_string())
    }
}

impl From<String> for Field {
    fn from(v: String) -> Self {
        Field::Text(v)
    }
}

impl From<&String> for Field {
    fn from(v: &String) -> Self {
        Field::Text(v.clone())
    }
}

impl<T: Into<Field>> From<Vec<T>> for Field {
    fn from(v: Vec<T>) -> Self {
        Field::Record(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Field>, const N: usize> From<[T; N]> for Field {
    fn from(v: [T; N]) -> Self {
        Field::Record(v.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_from_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Field>),+> From<($($name,)+)> for Field {
            #[allow(non_snake_case)]
            fn from(($($name,)+): ($($name,)+)) -> Self {
                Field::Record(vec![$($name.into()),+])
            }
        }
    };
}

impl_from_tuple!(A, B);
impl_from_tuple!(A, B, C);
impl_from_tuple!(A, B, C, D);
impl_from_tuple!(A, B, C, D, E);
impl_from_tuple!(A, B, C, D, E, F);

/// Build a `Vec<Field>` from heterogeneous values.
///
/// ```
/// use measure_rs::{file::format_record, record};
/// assert_eq!(format_record(&record![1, "a", (2, 3)], ","), "1,a,2,3\n");
/// ```
#[macro_export]
macro_rules! record {
    () => {
        ::std::vec::Vec::<$crate::file::Field>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::file::Field::from($value)),+]
    };
}
