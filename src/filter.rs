use crate::types::{Dataset, Dimension, Record};
use std::collections::{BTreeSet, HashSet};

/// Allowed values per categorical dimension.
///
/// An empty set for a dimension whose column exists excludes every row. A
/// dimension whose column is absent from the table is never filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub regions: BTreeSet<String>,
    pub courses: BTreeSet<String>,
    pub genders: BTreeSet<String>,
}

impl FilterSelection {
    /// Every distinct value selected, i.e. no filtering.
    pub fn all(dataset: &Dataset) -> Self {
        let mut selection = FilterSelection::default();
        for dim in Dimension::ALL {
            selection.set(dim, distinct_values(dataset, dim));
        }
        selection
    }

    pub fn selected(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::Region => &self.regions,
            Dimension::Course => &self.courses,
            Dimension::Gender => &self.genders,
        }
    }

    pub fn set<I>(&mut self, dim: Dimension, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        let target = match dim {
            Dimension::Region => &mut self.regions,
            Dimension::Course => &mut self.courses,
            Dimension::Gender => &mut self.genders,
        };
        *target = values.into_iter().collect();
    }

    fn allows(&self, dataset: &Dataset, record: &Record) -> bool {
        Dimension::ALL.iter().all(|&dim| {
            if !dataset.fields.is_present(dim.field()) {
                return true;
            }
            record
                .dimension(dim)
                .is_some_and(|v| self.selected(dim).contains(v))
        })
    }
}

/// Distinct non-missing values of a dimension, in order of first appearance.
/// Empty when the dimension's column is absent.
pub fn distinct_values(dataset: &Dataset, dim: Dimension) -> Vec<String> {
    if !dataset.fields.is_present(dim.field()) {
        return Vec::new();
    }
    let mut seen: HashSet<&str> = HashSet::new();
    dataset
        .records
        .iter()
        .filter_map(|r| r.dimension(dim))
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Records matching all three selections, in source order.
pub fn apply_filters<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> Vec<&'a Record> {
    dataset
        .records
        .iter()
        .filter(|r| selection.allows(dataset, r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::build_dataset;
    use crate::types::RawTable;

    fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        let t = RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        build_dataset(&t).unwrap()
    }

    fn regions(values: &[&str]) -> FilterSelection {
        let mut s = FilterSelection::default();
        s.set(Dimension::Region, values.iter().map(|v| v.to_string()));
        s
    }

    #[test]
    fn test_filter_keeps_matching_rows_in_order() {
        let ds = dataset(&["Region"], &[&["A"], &["B"], &["A"]]);
        let out = apply_filters(&ds, &regions(&["A"]));
        assert_eq!(out.len(), 2);
        assert!(std::ptr::eq(out[0], &ds.records[0]));
        assert!(std::ptr::eq(out[1], &ds.records[2]));
    }

    #[test]
    fn test_empty_selection_excludes_everything() {
        let ds = dataset(&["Region"], &[&["A"], &["B"]]);
        assert!(apply_filters(&ds, &regions(&[])).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent_and_leaves_source_alone() {
        let ds = dataset(&["Region"], &[&["A"], &["B"], &["A"]]);
        let before = ds.clone();
        let sel = regions(&["A"]);
        let once: Vec<Record> = apply_filters(&ds, &sel).into_iter().cloned().collect();
        let twice: Vec<Record> = apply_filters(&ds, &sel).into_iter().cloned().collect();
        assert_eq!(once, twice);
        assert_eq!(ds, before);
    }

    #[test]
    fn test_absent_dimension_passes_through() {
        let ds = dataset(&["Region", "Trainees"], &[&["A", "1"], &["B", "2"]]);
        // No course or gender column: empty course/gender sets must not bite.
        let out = apply_filters(&ds, &regions(&["A", "B"]));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_selections_are_anded() {
        let ds = dataset(
            &["Region", "Course", "Gender"],
            &[&["A", "X", "M"], &["A", "Y", "F"], &["B", "X", "F"]],
        );
        let mut sel = FilterSelection::all(&ds);
        sel.set(Dimension::Region, ["A".to_string()]);
        sel.set(Dimension::Gender, ["F".to_string()]);
        let out = apply_filters(&ds, &sel);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].course.as_deref(), Some("Y"));
    }

    #[test]
    fn test_missing_value_never_matches_present_dimension() {
        let ds = dataset(&["Region"], &[&["A"], &[""]]);
        let sel = FilterSelection::all(&ds);
        assert_eq!(apply_filters(&ds, &sel).len(), 1);
    }

    #[test]
    fn test_distinct_values_first_appearance_order() {
        let ds = dataset(&["Region"], &[&["South"], &["North"], &["South"], &[""]]);
        assert_eq!(
            distinct_values(&ds, Dimension::Region),
            vec!["South".to_string(), "North".to_string()]
        );
        assert!(distinct_values(&ds, Dimension::Gender).is_empty());
    }
}
