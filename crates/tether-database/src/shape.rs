//! Coarse size hints for call results.

use serde_json::Value;
use sqlx::sqlite::{SqliteQueryResult, SqliteRow};
use std::fmt;

/// What a call returned, as far as logging cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A collection of this many items.
    Many(usize),
    /// A single present record.
    One,
    /// Nothing worth a size hint: unit, scalars, absent values.
    Empty,
}

impl Shape {
    /// Human text for a log line, `None` when no hint applies.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Many(1) | Self::One => Some("1 item".to_string()),
            Self::Many(n) => Some(format!("{n} items")),
            Self::Empty => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hint() {
            Some(hint) => f.write_str(&hint),
            None => Ok(()),
        }
    }
}

/// Implemented by every value an intercepted call may return.
///
/// Row types declare themselves single records with [`single_row_shape!`].
pub trait ResultShape {
    fn shape(&self) -> Shape;
}

impl<T> ResultShape for Vec<T> {
    fn shape(&self) -> Shape {
        Shape::Many(self.len())
    }
}

impl<T> ResultShape for [T] {
    fn shape(&self) -> Shape {
        Shape::Many(self.len())
    }
}

impl<T: ResultShape> ResultShape for Option<T> {
    fn shape(&self) -> Shape {
        match self {
            Some(value) => value.shape(),
            None => Shape::Empty,
        }
    }
}

impl<T: ResultShape + ?Sized> ResultShape for Box<T> {
    fn shape(&self) -> Shape {
        (**self).shape()
    }
}

impl ResultShape for Value {
    fn shape(&self) -> Shape {
        match self {
            Value::Array(items) => Shape::Many(items.len()),
            Value::Object(_) => Shape::One,
            _ => Shape::Empty,
        }
    }
}

impl ResultShape for SqliteRow {
    fn shape(&self) -> Shape {
        Shape::One
    }
}

impl ResultShape for SqliteQueryResult {
    fn shape(&self) -> Shape {
        Shape::Empty
    }
}

macro_rules! scalar_shape {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ResultShape for $ty {
                fn shape(&self) -> Shape {
                    Shape::Empty
                }
            }
        )+
    };
}

scalar_shape!((), bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, String);

macro_rules! tuple_row_shape {
    ($($name:ident),+) => {
        impl<$($name),+> ResultShape for ($($name,)+) {
            fn shape(&self) -> Shape {
                Shape::One
            }
        }
    };
}

tuple_row_shape!(A);
tuple_row_shape!(A, B);
tuple_row_shape!(A, B, C);
tuple_row_shape!(A, B, C, D);
tuple_row_shape!(A, B, C, D, E);

/// Mark row types as single records for size hints.
///
/// ```ignore
/// #[derive(sqlx::FromRow)]
/// struct Note { id: i64, title: String }
///
/// tether_database::single_row_shape!(Note);
/// ```
#[macro_export]
macro_rules! single_row_shape {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::ResultShape for $ty {
                fn shape(&self) -> $crate::Shape {
                    $crate::Shape::One
                }
            }
        )+
    };
}
