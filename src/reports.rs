use crate::types::{GroupedAggregate, MetricsSnapshot, Record};
use crate::util::{mean_present, round2, sum_present};
use std::collections::BTreeMap;

pub fn compute_metrics(rows: &[&Record]) -> MetricsSnapshot {
    // Sums are truncated toward zero to whole people.
    let total_trainees = sum_present(rows.iter().map(|r| r.trainees)).trunc() as i64;
    let total_placed = sum_present(rows.iter().map(|r| r.placed)).trunc() as i64;
    let avg_completion = mean_present(rows.iter().map(|r| r.completion))
        .map(round2)
        .unwrap_or(0.0);
    MetricsSnapshot {
        total_trainees,
        total_placed,
        avg_completion,
        placement_rate: placement_rate(total_trainees, total_placed),
    }
}

/// Placed as a percentage of trainees, 2 dp. Zero trainees gives 0.0.
pub fn placement_rate(total_trainees: i64, total_placed: i64) -> f64 {
    if total_trainees == 0 {
        return 0.0;
    }
    round2(total_placed as f64 / total_trainees as f64 * 100.0)
}

pub fn placed_by_course(rows: &[&Record]) -> GroupedAggregate {
    group_sum(rows, "Course", "Placed", |r| r.course.as_deref(), |r| r.placed)
}

pub fn completion_by_region(rows: &[&Record]) -> GroupedAggregate {
    group_mean(
        rows,
        "Region",
        "CompletionRate",
        |r| r.region.as_deref(),
        |r| r.completion,
    )
}

pub fn trainees_by_gender(rows: &[&Record]) -> GroupedAggregate {
    group_sum(rows, "Gender", "Trainees", |r| r.gender.as_deref(), |r| r.trainees)
}

#[derive(Default)]
struct Acc {
    sum: f64,
    count: usize,
}

fn accumulate<K, V>(rows: &[&Record], key: K, value: V) -> BTreeMap<String, Acc>
where
    K: Fn(&Record) -> Option<&str>,
    V: Fn(&Record) -> Option<f64>,
{
    let mut map: BTreeMap<String, Acc> = BTreeMap::new();
    for &r in rows {
        // Rows without a group value are dropped, not bucketed.
        let Some(k) = key(r) else { continue };
        let e = map.entry(k.to_string()).or_default();
        if let Some(v) = value(r) {
            e.sum += v;
            e.count += 1;
        }
    }
    map
}

/// Every group seen gets a sum, 0.0 when none of its values parsed.
fn group_sum<K, V>(
    rows: &[&Record],
    key_label: &str,
    value_label: &str,
    key: K,
    value: V,
) -> GroupedAggregate
where
    K: Fn(&Record) -> Option<&str>,
    V: Fn(&Record) -> Option<f64>,
{
    let mut agg = GroupedAggregate::new(key_label, value_label);
    agg.values = accumulate(rows, key, value)
        .into_iter()
        .map(|(k, acc)| (k, acc.sum))
        .collect();
    agg
}

/// Only groups with at least one valid value get a mean.
fn group_mean<K, V>(
    rows: &[&Record],
    key_label: &str,
    value_label: &str,
    key: K,
    value: V,
) -> GroupedAggregate
where
    K: Fn(&Record) -> Option<&str>,
    V: Fn(&Record) -> Option<f64>,
{
    let mut agg = GroupedAggregate::new(key_label, value_label);
    agg.values = accumulate(rows, key, value)
        .into_iter()
        .filter(|(_, acc)| acc.count > 0)
        .map(|(k, acc)| (k, acc.sum / acc.count as f64))
        .collect();
    agg
}
