use crate::resolver::FieldMap;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// The six semantic columns the pipeline works with, whatever the source
/// calls them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    Region,
    Course,
    Gender,
    Trainees,
    Placed,
    Completion,
}

impl CanonicalField {
    /// Resolution order. Each field is looked up independently, so the order
    /// only matters for log output and iteration over a `FieldMap`.
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Region,
        CanonicalField::Course,
        CanonicalField::Gender,
        CanonicalField::Trainees,
        CanonicalField::Placed,
        CanonicalField::Completion,
    ];

    /// Lowercase substring searched for in the source column names.
    pub fn token(self) -> &'static str {
        match self {
            CanonicalField::Region => "region",
            CanonicalField::Course => "course",
            CanonicalField::Gender => "gender",
            CanonicalField::Trainees => "trainee",
            CanonicalField::Placed => "place",
            CanonicalField::Completion => "completion",
        }
    }

    /// Column name assumed when nothing in the schema matches the token.
    pub fn fallback_name(self) -> &'static str {
        match self {
            CanonicalField::Region => "Region",
            CanonicalField::Course => "Course",
            CanonicalField::Gender => "Gender",
            CanonicalField::Trainees => "Trainees",
            CanonicalField::Placed => "Placed",
            CanonicalField::Completion => "CompletionRate",
        }
    }
}

/// Categorical dimensions a user can filter and group on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Region,
    Course,
    Gender,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Region, Dimension::Course, Dimension::Gender];

    pub fn field(self) -> CanonicalField {
        match self {
            Dimension::Region => CanonicalField::Region,
            Dimension::Course => CanonicalField::Course,
            Dimension::Gender => CanonicalField::Gender,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::Course => "Course",
            Dimension::Gender => "Gender",
        }
    }
}

/// A table exactly as the loader delivered it: header names plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table, padding short rows with empty cells so every row has
    /// one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();
        RawTable { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// One training-program row after column resolution and numeric coercion.
///
/// `placed <= trainees` is not checked; source data is often inconsistent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub region: Option<String>,
    pub course: Option<String>,
    pub gender: Option<String>,
    pub trainees: Option<f64>,
    pub placed: Option<f64>,
    pub completion: Option<f64>,
}

impl Record {
    pub fn dimension(&self, dim: Dimension) -> Option<&str> {
        match dim {
            Dimension::Region => self.region.as_deref(),
            Dimension::Course => self.course.as_deref(),
            Dimension::Gender => self.gender.as_deref(),
        }
    }
}

/// Coerced records plus the field map they were built with.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub fields: FieldMap,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_trainees: i64,
    pub total_placed: i64,
    pub avg_completion: f64,
    pub placement_rate: f64,
}

/// Per-group sums or means, keyed by the group value in lexicographic order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedAggregate {
    pub key_label: String,
    pub value_label: String,
    pub values: BTreeMap<String, f64>,
}

impl GroupedAggregate {
    pub fn new(key_label: &str, value_label: &str) -> Self {
        GroupedAggregate {
            key_label: key_label.to_string(),
            value_label: value_label.to_string(),
            values: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Everything the narrative generators are allowed to see.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FactsBundle {
    pub total_trainees: i64,
    pub total_placed: i64,
    pub avg_completion: f64,
    pub placement_rate: f64,
    pub top_region_by_completion: String,
    pub bottom_region_by_completion: String,
}

/// One display row of a grouped aggregate.
#[derive(Debug, Tabled, Clone)]
pub struct GroupRow {
    #[tabled(rename = "Group")]
    pub group: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
