//! Structured query model.
//!
//! Filters, aggregation pipelines and index descriptors are plain values.
//! The MongoDB backend lowers them to BSON; the in-memory backend evaluates
//! them directly.

mod filter;
mod index;
mod pipeline;

pub(crate) use filter::lookup;
pub use filter::Filter;
pub use index::{IndexKey, IndexSpec};
pub use pipeline::{Accumulator, Pipeline, Stage};

use std::cmp::Ordering;
use std::fmt;

use mongodb::bson::Bson;

/// Sort/index direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Numeric form used in key and sort documents
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

impl From<SortDirection> for Bson {
    fn from(direction: SortDirection) -> Self {
        Bson::Int32(direction.as_i32())
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// A BSON number without loss of precision.
#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

fn as_number(value: &Bson) -> Option<Number> {
    match value {
        Bson::Int32(v) => Some(Number::Int(i64::from(*v))),
        Bson::Int64(v) => Some(Number::Int(*v)),
        Bson::Double(v) => Some(Number::Float(*v)),
        _ => None,
    }
}

/// Exact integer/double comparison. `None` when the double is NaN.
fn compare_int_float(int: i64, float: f64) -> Option<Ordering> {
    // 2^63, the first double above i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return None;
    }
    if float >= LIMIT {
        return Some(Ordering::Less);
    }
    if float < -LIMIT {
        return Some(Ordering::Greater);
    }

    let whole = float.trunc();
    Some(match int.cmp(&(whole as i64)) {
        Ordering::Equal if float > whole => Ordering::Less,
        Ordering::Equal if float < whole => Ordering::Greater,
        ordering => ordering,
    })
}

fn compare_numbers(left: Number, right: Number) -> Option<Ordering> {
    match (left, right) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
        (Number::Int(a), Number::Float(b)) => compare_int_float(a, b),
        (Number::Float(a), Number::Int(b)) => compare_int_float(b, a).map(Ordering::reverse),
    }
}

/// Order two values of the same type bracket.
///
/// Numbers compare exactly across widths. Values of unrelated types are not comparable.
pub(crate) fn compare_values(left: &Bson, right: &Bson) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (as_number(left), as_number(right)) {
        return compare_numbers(a, b);
    }
    match (left, right) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => Some(a.cmp(b)),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Equality with numeric widening, `1` equals `1i64` equals `1.0`.
pub(crate) fn values_equal(left: &Bson, right: &Bson) -> bool {
    match (as_number(left), as_number(right)) {
        (Some(a), Some(b)) => compare_numbers(a, b) == Some(Ordering::Equal),
        _ => left == right,
    }
}

/// Position of a value's type in the server's cross-type sort order.
/// A missing field sorts with null.
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        Some(Bson::MinKey) => 0,
        None | Some(Bson::Null) | Some(Bson::Undefined) => 1,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_)) => 2,
        Some(Bson::String(_) | Bson::Symbol(_)) => 3,
        Some(Bson::Document(_)) => 4,
        Some(Bson::Array(_)) => 5,
        Some(Bson::Binary(_)) => 6,
        Some(Bson::ObjectId(_)) => 7,
        Some(Bson::Boolean(_)) => 8,
        Some(Bson::DateTime(_)) => 9,
        Some(Bson::Timestamp(_)) => 10,
        Some(Bson::RegularExpression(_)) => 11,
        Some(Bson::MaxKey) => 13,
        Some(_) => 12,
    }
}

fn is_nan(value: &Bson) -> bool {
    matches!(value, Bson::Double(v) if v.is_nan())
}

/// Total order used by sort stages: type rank first, then value.
///
/// NaN sorts below every other number. Values in the same rank that have no
/// natural order (documents, arrays) compare equal.
pub(crate) fn sort_cmp(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    let by_rank = type_rank(left).cmp(&type_rank(right));
    if by_rank != Ordering::Equal {
        return by_rank;
    }
    match (left, right) {
        (Some(a), Some(b)) => match (is_nan(a), is_nan(b)) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => compare_values(a, b).unwrap_or(Ordering::Equal),
        },
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_across_widths() {
        assert_eq!(
            compare_values(&Bson::Int32(5), &Bson::Int64(7)),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_values(&Bson::Double(7.5), &Bson::Int32(7)),
            Some(Ordering::Greater)
        );
        assert!(values_equal(&Bson::Int32(1), &Bson::Double(1.0)));
    }

    #[test]
    fn test_unrelated_types_do_not_compare() {
        assert_eq!(compare_values(&Bson::Int32(1), &Bson::String("1".into())), None);
        assert!(!values_equal(&Bson::Int32(1), &Bson::String("1".into())));
    }

    #[test]
    fn test_int64_and_double_compare_exactly_above_2_pow_53() {
        let big = (1_i64 << 53) + 1;
        // (2^53 + 1) as f64 rounds down to 2^53
        assert_eq!(
            compare_values(&Bson::Int64(big), &Bson::Double((1_i64 << 53) as f64)),
            Some(Ordering::Greater)
        );
        assert!(!values_equal(&Bson::Int64(big), &Bson::Double(big as f64)));
        assert_eq!(
            compare_values(&Bson::Int64(i64::MAX), &Bson::Double(9.3e18)),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_values(&Bson::Double(-0.5), &Bson::Int32(0)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_sort_cmp_ranks_types_before_values() {
        let one = Bson::Int32(1);
        let text = Bson::String("a".into());
        let flag = Bson::Boolean(false);

        assert_eq!(sort_cmp(None, Some(&one)), Ordering::Less);
        assert_eq!(sort_cmp(Some(&Bson::Null), None), Ordering::Equal);
        assert_eq!(sort_cmp(Some(&one), Some(&text)), Ordering::Less);
        assert_eq!(sort_cmp(Some(&text), Some(&flag)), Ordering::Less);
        assert_eq!(
            sort_cmp(Some(&Bson::Double(f64::NAN)), Some(&Bson::Int32(i32::MIN))),
            Ordering::Less
        );
    }

    #[test]
    fn test_direction_values() {
        assert_eq!(Bson::from(SortDirection::Ascending), Bson::Int32(1));
        assert_eq!(Bson::from(SortDirection::Descending), Bson::Int32(-1));
    }
}
