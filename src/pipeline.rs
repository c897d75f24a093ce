// One render cycle: filter, aggregate, rank, narrate.
use crate::coerce::build_dataset;
use crate::error::Result;
use crate::filter::{apply_filters, FilterSelection};
use crate::insight::rank_groups;
use crate::narrative::Narrator;
use crate::reports::{completion_by_region, compute_metrics, placed_by_course, trainees_by_gender};
use crate::types::{Dataset, FactsBundle, GroupedAggregate, MetricsSnapshot, RawTable};
use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOutput {
    pub rows_selected: usize,
    pub metrics: MetricsSnapshot,
    pub placed_by_course: GroupedAggregate,
    pub completion_by_region: GroupedAggregate,
    pub trainees_by_gender: GroupedAggregate,
    pub facts: FactsBundle,
    pub narrative: String,
}

/// Resolve and coerce a freshly loaded table.
///
/// Returns `PipelineError::EmptyInput` for a table without rows so the caller
/// can stop instead of reporting zeroed metrics.
pub fn prepare(table: &RawTable) -> Result<Dataset> {
    let dataset = build_dataset(table)?;
    let missing = dataset.fields.missing_fields();
    if !missing.is_empty() {
        warn!("No source column for {:?}; dependent metrics default to zero", missing);
    }
    info!("Prepared {} records", dataset.records.len());
    Ok(dataset)
}

pub fn facts_bundle(
    metrics: &MetricsSnapshot,
    completion_by_region: &GroupedAggregate,
) -> FactsBundle {
    let ranking = rank_groups(completion_by_region);
    FactsBundle {
        total_trainees: metrics.total_trainees,
        total_placed: metrics.total_placed,
        avg_completion: metrics.avg_completion,
        placement_rate: metrics.placement_rate,
        top_region_by_completion: ranking.top,
        bottom_region_by_completion: ranking.bottom,
    }
}

pub fn run(
    dataset: &Dataset,
    selection: &FilterSelection,
    narrator: &dyn Narrator,
) -> DashboardOutput {
    let rows = apply_filters(dataset, selection);
    debug!("{} of {} records pass the filters", rows.len(), dataset.records.len());

    let metrics = compute_metrics(&rows);
    let by_course = placed_by_course(&rows);
    let by_region = completion_by_region(&rows);
    let by_gender = trainees_by_gender(&rows);
    let facts = facts_bundle(&metrics, &by_region);
    debug!("rendering narrative with the {} strategy", narrator.name());
    let narrative = narrator.narrate(&facts);

    DashboardOutput {
        rows_selected: rows.len(),
        metrics,
        placed_by_course: by_course,
        completion_by_region: by_region,
        trainees_by_gender: by_gender,
        facts,
        narrative,
    }
}
