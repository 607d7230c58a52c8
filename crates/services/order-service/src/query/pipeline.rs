//! Aggregation pipelines.

use std::fmt;

use mongodb::bson::{Bson, Document};

use domain::FIELD_ID;

use super::{Filter, SortDirection};

/// Per-group accumulator.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Sum of a numeric field. Non-numeric values are ignored.
    Sum(String),
}

impl Accumulator {
    fn to_document(&self) -> Document {
        let mut doc = Document::new();
        match self {
            Accumulator::Sum(field) => {
                doc.insert("$sum", format!("${}", field));
            }
        }
        doc
    }
}

/// One pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    /// Partition by `key`; each output document carries the key as `_id`
    /// plus one field per accumulator.
    Group {
        key: String,
        accumulators: Vec<(String, Accumulator)>,
    },
    Sort(Vec<(String, SortDirection)>),
    Skip(u64),
    Limit(u64),
}

impl Stage {
    pub fn to_document(&self) -> Document {
        let mut stage = Document::new();
        match self {
            Stage::Match(filter) => {
                stage.insert("$match", filter.to_document());
            }
            Stage::Group { key, accumulators } => {
                let mut group = Document::new();
                group.insert(FIELD_ID, format!("${}", key));
                for (output, accumulator) in accumulators {
                    group.insert(output.clone(), accumulator.to_document());
                }
                stage.insert("$group", group);
            }
            Stage::Sort(keys) => {
                let mut sort = Document::new();
                for (field, direction) in keys {
                    sort.insert(field.clone(), *direction);
                }
                stage.insert("$sort", sort);
            }
            Stage::Skip(n) => {
                stage.insert("$skip", count(*n));
            }
            Stage::Limit(n) => {
                stage.insert("$limit", count(*n));
            }
        }
        stage
    }
}

fn count(n: u64) -> Bson {
    Bson::Int64(i64::try_from(n).unwrap_or(i64::MAX))
}

/// An ordered list of stages plus request options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
    allow_disk_use: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn match_filter(self, filter: Filter) -> Self {
        self.stage(Stage::Match(filter))
    }

    /// Group by `key`, summing `field` into `output`.
    pub fn group_sum(
        self,
        key: impl Into<String>,
        output: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.stage(Stage::Group {
            key: key.into(),
            accumulators: vec![(output.into(), Accumulator::Sum(field.into()))],
        })
    }

    pub fn sort(self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.stage(Stage::Sort(vec![(field.into(), direction)]))
    }

    pub fn skip(self, n: u64) -> Self {
        self.stage(Stage::Skip(n))
    }

    pub fn limit(self, n: u64) -> Self {
        self.stage(Stage::Limit(n))
    }

    /// Let the store spill intermediate state to disk.
    pub fn allow_disk_use(mut self, allow: bool) -> Self {
        self.allow_disk_use = allow;
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn allows_disk_use(&self) -> bool {
        self.allow_disk_use
    }

    pub fn to_documents(&self) -> Vec<Document> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", stage.to_document())?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn customer_totals() -> Pipeline {
        Pipeline::new()
            .match_filter(Filter::eq("Status", "A"))
            .group_sum("CustId", "Total", "Amount")
            .sort("Total", SortDirection::Ascending)
            .skip(0)
            .limit(10)
            .allow_disk_use(true)
    }

    #[test]
    fn test_lowers_stages_in_order() {
        let expected = vec![
            doc! { "$match": { "Status": "A" } },
            doc! { "$group": { "_id": "$CustId", "Total": { "$sum": "$Amount" } } },
            doc! { "$sort": { "Total": 1 } },
            doc! { "$skip": 0_i64 },
            doc! { "$limit": 10_i64 },
        ];
        assert_eq!(customer_totals().to_documents(), expected);
    }

    #[test]
    fn test_disk_use_defaults_off() {
        assert!(!Pipeline::new().allows_disk_use());
        assert!(customer_totals().allows_disk_use());
    }

    #[test]
    fn test_display_lists_stages() {
        let rendered = customer_totals().to_string();
        assert!(rendered.starts_with('['));
        assert!(rendered.contains("$group"));
        assert!(rendered.contains("$limit"));
    }
}
