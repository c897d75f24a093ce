use crate::types::GroupedAggregate;
use std::cmp::Ordering;

/// Best and worst group of a grouped aggregate. Both are empty strings when
/// the aggregate has no groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    pub top: String,
    pub bottom: String,
}

pub fn rank_groups(agg: &GroupedAggregate) -> Ranking {
    Ranking {
        top: top_group(agg).unwrap_or_default(),
        bottom: bottom_group(agg).unwrap_or_default(),
    }
}

/// Highest value; ties go to the alphabetically first group.
pub fn top_group(agg: &GroupedAggregate) -> Option<String> {
    let mut entries: Vec<(&String, &f64)> = agg.values.iter().collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    entries.first().map(|(k, _)| (*k).clone())
}

/// Lowest value; ties go to the alphabetically first group.
pub fn bottom_group(agg: &GroupedAggregate) -> Option<String> {
    let mut entries: Vec<(&String, &f64)> = agg.values.iter().collect();
    entries.sort_by(|a, b| {
        a.1.partial_cmp(b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    entries.first().map(|(k, _)| (*k).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(pairs: &[(&str, f64)]) -> GroupedAggregate {
        let mut a = GroupedAggregate::new("Region", "CompletionRate");
        a.values = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        a
    }

    #[test]
    fn test_rank_picks_highest_and_lowest() {
        let r = rank_groups(&agg(&[("North", 90.0), ("South", 60.0), ("East", 75.0)]));
        assert_eq!(r.top, "North");
        assert_eq!(r.bottom, "South");
    }

    #[test]
    fn test_empty_aggregate_gives_empty_sentinels() {
        let r = rank_groups(&agg(&[]));
        assert_eq!(r, Ranking::default());
        assert_eq!(r.top, "");
        assert_eq!(r.bottom, "");
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let a = agg(&[("West", 80.0), ("Central", 80.0), ("North", 50.0), ("East", 50.0)]);
        assert_eq!(top_group(&a).as_deref(), Some("Central"));
        assert_eq!(bottom_group(&a).as_deref(), Some("East"));
    }

    #[test]
    fn test_single_group_is_both_top_and_bottom() {
        let r = rank_groups(&agg(&[("Only", 42.0)]));
        assert_eq!(r.top, "Only");
        assert_eq!(r.bottom, "Only");
    }
}
