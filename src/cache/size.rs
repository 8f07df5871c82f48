//! Size Module
//!
//! Human size specifications ("1KB", "100MB") and the best-effort value
//! size estimator used for memory accounting.

use std::collections::HashMap;
use std::mem::size_of;
use std::sync::Arc;

use serde_json::Value;

/// Footprint charged for values with no meaningful payload (null, `None`, numbers).
pub const DEFAULT_FOOTPRINT: u64 = 8;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

// == Parse Size ==
/// Parses `<integer><unit>` into a byte count.
///
/// Units are `B`, `KB`, `MB` and `GB` (binary magnitudes, case-insensitive).
/// Whitespace around the value and between the number and unit is ignored.
///
/// # Returns
/// - `Some(bytes)` for a well-formed, non-zero specification
/// - `None` for empty input, a missing or unknown unit, zero, or overflow
pub fn parse_size(spec: &str) -> Option<u64> {
    let spec = spec.trim();
    let unit_start = spec.find(|c: char| !c.is_ascii_digit())?;
    let (digits, unit) = spec.split_at(unit_start);
    if digits.is_empty() {
        return None;
    }

    let value: u64 = digits.parse().ok()?;
    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "B" => 1,
        "KB" => KB,
        "MB" => MB,
        "GB" => GB,
        _ => return None,
    };

    value.checked_mul(multiplier).filter(|bytes| *bytes > 0)
}

// == Size Estimate ==
/// Approximate byte footprint of a cached value.
///
/// Cheap to compute and deliberately coarse: strings count their bytes,
/// collections sum their elements, scalars count their in-memory width.
pub trait SizeEstimate {
    fn estimated_size(&self) -> u64;
}

macro_rules! impl_scalar_size {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SizeEstimate for $ty {
                fn estimated_size(&self) -> u64 {
                    size_of::<$ty>() as u64
                }
            }
        )*
    };
}

impl_scalar_size!(bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl SizeEstimate for () {
    fn estimated_size(&self) -> u64 {
        DEFAULT_FOOTPRINT
    }
}

impl SizeEstimate for str {
    fn estimated_size(&self) -> u64 {
        self.len() as u64
    }
}

impl SizeEstimate for String {
    fn estimated_size(&self) -> u64 {
        self.len() as u64
    }
}

impl<T: SizeEstimate> SizeEstimate for [T] {
    fn estimated_size(&self) -> u64 {
        self.iter().map(SizeEstimate::estimated_size).sum()
    }
}

impl<T: SizeEstimate> SizeEstimate for Vec<T> {
    fn estimated_size(&self) -> u64 {
        self.as_slice().estimated_size()
    }
}

impl<T: SizeEstimate> SizeEstimate for Option<T> {
    fn estimated_size(&self) -> u64 {
        self.as_ref()
            .map_or(DEFAULT_FOOTPRINT, SizeEstimate::estimated_size)
    }
}

impl<T: SizeEstimate + ?Sized> SizeEstimate for &T {
    fn estimated_size(&self) -> u64 {
        (**self).estimated_size()
    }
}

impl<T: SizeEstimate + ?Sized> SizeEstimate for Box<T> {
    fn estimated_size(&self) -> u64 {
        (**self).estimated_size()
    }
}

impl<T: SizeEstimate + ?Sized> SizeEstimate for Arc<T> {
    fn estimated_size(&self) -> u64 {
        (**self).estimated_size()
    }
}

impl<K: SizeEstimate, V: SizeEstimate, S> SizeEstimate for HashMap<K, V, S> {
    fn estimated_size(&self) -> u64 {
        self.iter()
            .map(|(k, v)| k.estimated_size() + v.estimated_size())
            .sum()
    }
}

impl SizeEstimate for Value {
    fn estimated_size(&self) -> u64 {
        match self {
            Value::Null | Value::Number(_) => DEFAULT_FOOTPRINT,
            Value::Bool(_) => 1,
            Value::String(s) => s.len() as u64,
            Value::Array(items) => items.iter().map(SizeEstimate::estimated_size).sum(),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| k.len() as u64 + v.estimated_size())
                .sum(),
        }
    }
}
