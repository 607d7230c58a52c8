//! Boolean filter expressions over document fields.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr};

use mongodb::bson::{Bson, Document};

use domain::{EntityId, FIELD_ID};

use super::{compare_values, values_equal};

/// A filter over document fields.
///
/// Combine with `&` and `|`. Rust precedence already makes `&` bind tighter
/// than `|`, and both operators flatten nested groups of the same kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    Eq(String, Bson),
    Ne(String, Bson),
    Gt(String, Bson),
    Gte(String, Bson),
    Lt(String, Bson),
    Lte(String, Bson),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Gte(field.into(), value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Lte(field.into(), value.into())
    }

    /// Match the single document with this identifier
    pub fn id(id: EntityId) -> Self {
        Filter::eq(FIELD_ID, id)
    }

    /// Lower to the driver's query document.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        match self {
            Filter::All => {}
            Filter::Eq(field, value) => {
                doc.insert(field.clone(), value.clone());
            }
            Filter::Ne(field, value) => {
                doc.insert(field.clone(), operator("$ne", value));
            }
            Filter::Gt(field, value) => {
                doc.insert(field.clone(), operator("$gt", value));
            }
            Filter::Gte(field, value) => {
                doc.insert(field.clone(), operator("$gte", value));
            }
            Filter::Lt(field, value) => {
                doc.insert(field.clone(), operator("$lt", value));
            }
            Filter::Lte(field, value) => {
                doc.insert(field.clone(), operator("$lte", value));
            }
            Filter::And(filters) if filters.is_empty() => {}
            Filter::And(filters) => {
                doc.insert("$and", lower_all(filters));
            }
            // $or rejects an empty array; an empty disjunction matches nothing.
            Filter::Or(filters) if filters.is_empty() => {
                doc.insert("$expr", false);
            }
            Filter::Or(filters) => {
                doc.insert("$or", lower_all(filters));
            }
        }
        doc
    }

    /// Evaluate against a document.
    ///
    /// Equality on a missing field matches only `null`, so `Ne` matches
    /// documents without the field. Range comparisons never match a missing
    /// field or a value of another type.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => field_equals(doc, field, value),
            Filter::Ne(field, value) => !field_equals(doc, field, value),
            Filter::Gt(field, value) => field_cmp(doc, field, value, |o| o == Ordering::Greater),
            Filter::Gte(field, value) => field_cmp(doc, field, value, |o| o != Ordering::Less),
            Filter::Lt(field, value) => field_cmp(doc, field, value, |o| o == Ordering::Less),
            Filter::Lte(field, value) => field_cmp(doc, field, value, |o| o != Ordering::Greater),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }
}

fn operator(name: &str, value: &Bson) -> Document {
    let mut doc = Document::new();
    doc.insert(name, value.clone());
    doc
}

fn lower_all(filters: &[Filter]) -> Bson {
    Bson::Array(
        filters
            .iter()
            .map(|f| Bson::Document(f.to_document()))
            .collect(),
    )
}

/// Resolve a possibly dotted field path.
pub(crate) fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn field_equals(doc: &Document, field: &str, value: &Bson) -> bool {
    match lookup(doc, field) {
        Some(actual) => values_equal(actual, value),
        None => matches!(value, Bson::Null),
    }
}

fn field_cmp(doc: &Document, field: &str, value: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    lookup(doc, field)
        .and_then(|actual| compare_values(actual, value))
        .map(accept)
        .unwrap_or(false)
}

impl BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        match (self, rhs) {
            (Filter::All, other) | (other, Filter::All) => other,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), right) => {
                left.push(right);
                Filter::And(left)
            }
            (left, Filter::And(mut right)) => {
                right.insert(0, left);
                Filter::And(right)
            }
            (left, right) => Filter::And(vec![left, right]),
        }
    }
}

impl BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        match (self, rhs) {
            (Filter::All, _) | (_, Filter::All) => Filter::All,
            (Filter::Or(mut left), Filter::Or(right)) => {
                left.extend(right);
                Filter::Or(left)
            }
            (Filter::Or(mut left), right) => {
                left.push(right);
                Filter::Or(left)
            }
            (left, Filter::Or(mut right)) => {
                right.insert(0, left);
                Filter::Or(right)
            }
            (left, right) => Filter::Or(vec![left, right]),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "true"),
            Filter::Eq(field, value) => write!(f, "{} == {}", field, value),
            Filter::Ne(field, value) => write!(f, "{} != {}", field, value),
            Filter::Gt(field, value) => write!(f, "{} > {}", field, value),
            Filter::Gte(field, value) => write!(f, "{} >= {}", field, value),
            Filter::Lt(field, value) => write!(f, "{} < {}", field, value),
            Filter::Lte(field, value) => write!(f, "{} <= {}", field, value),
            Filter::And(filters) => write_joined(f, filters, " && "),
            Filter::Or(filters) => write_joined(f, filters, " || "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, filters: &[Filter], separator: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", filter)?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn composite() -> Filter {
        (Filter::gt("Amount", 100) & Filter::eq("Status", "B"))
            | (Filter::eq("CustId", 1) & Filter::eq("Status", "A") & Filter::ne("Amount", 0))
    }

    #[test]
    fn test_operators_flatten_groups() {
        let filter = composite();
        match &filter {
            Filter::Or(branches) => {
                assert_eq!(branches.len(), 2);
                assert!(matches!(&branches[0], Filter::And(terms) if terms.len() == 2));
                assert!(matches!(&branches[1], Filter::And(terms) if terms.len() == 3));
            }
            other => panic!("expected Or, got {:?}", other),
        }
    }

    #[test]
    fn test_composite_lowers_to_query_document() {
        let expected = doc! {
            "$or": [
                { "$and": [ { "Amount": { "$gt": 100 } }, { "Status": "B" } ] },
                { "$and": [ { "CustId": 1 }, { "Status": "A" }, { "Amount": { "$ne": 0 } } ] },
            ]
        };
        assert_eq!(composite().to_document(), expected);
    }

    #[test]
    fn test_composite_evaluation() {
        let filter = composite();

        assert!(filter.matches(&doc! { "CustId": 9, "Amount": 150, "Status": "B" }));
        assert!(!filter.matches(&doc! { "CustId": 9, "Amount": 100, "Status": "B" }));
        assert!(filter.matches(&doc! { "CustId": 1, "Amount": 5, "Status": "A" }));
        assert!(!filter.matches(&doc! { "CustId": 1, "Amount": 0, "Status": "A" }));
        assert!(!filter.matches(&doc! { "CustId": 2, "Amount": 500, "Status": "A" }));
    }

    #[test]
    fn test_all_is_identity_for_and() {
        let filter = Filter::All & Filter::eq("Status", "A");
        assert_eq!(filter, Filter::eq("Status", "A"));
        assert_eq!(Filter::All.to_document(), doc! {});
    }

    #[test]
    fn test_missing_field_semantics() {
        let doc = doc! { "Status": "A" };
        assert!(Filter::ne("Amount", 0).matches(&doc));
        assert!(!Filter::gt("Amount", 0).matches(&doc));
        assert!(Filter::eq("Amount", Bson::Null).matches(&doc));
    }

    #[test]
    fn test_empty_or_matches_nothing() {
        let filter = Filter::Or(Vec::new());
        assert!(!filter.matches(&doc! { "a": 1 }));
        assert_eq!(filter.to_document(), doc! { "$expr": false });
    }

    #[test]
    fn test_dotted_path_lookup() {
        let doc = doc! { "address": { "city": "Oslo" } };
        assert!(Filter::eq("address.city", "Oslo").matches(&doc));
        assert!(!Filter::eq("address.zip", "0150").matches(&doc));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            composite().to_string(),
            r#"((Amount > 100 && Status == "B") || (CustId == 1 && Status == "A" && Amount != 0))"#
        );
    }
}
