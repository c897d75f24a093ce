use crate::pipeline::DashboardOutput;
use crate::types::{FactsBundle, GroupRow, GroupedAggregate, MetricsSnapshot};
use crate::util::format_int;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table};

pub fn write_aggregate_csv(path: &Path, agg: &GroupedAggregate) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([agg.key_label.as_str(), agg.value_label.as_str()])?;
    for (group, value) in &agg.values {
        wtr.write_record([group.clone(), value.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// `facts.json`: the bundle the narrative was rendered from, one key per fact.
pub fn write_facts_json(path: &Path, facts: &FactsBundle) -> Result<(), Box<dyn Error>> {
    let mut body = serde_json::to_string_pretty(facts)?;
    body.push('\n');
    std::fs::write(path, body)?;
    Ok(())
}

/// Write the three grouped tables and the facts bundle into `dir`.
pub fn export_all(dir: &Path, out: &DashboardOutput) -> Result<Vec<String>, Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (name, agg) in [
        ("placed_by_course.csv", &out.placed_by_course),
        ("completion_by_region.csv", &out.completion_by_region),
        ("trainees_by_gender.csv", &out.trainees_by_gender),
    ] {
        let path = dir.join(name);
        write_aggregate_csv(&path, agg)?;
        written.push(path.display().to_string());
    }
    let facts_path = dir.join("facts.json");
    write_facts_json(&facts_path, &out.facts)?;
    written.push(facts_path.display().to_string());
    Ok(written)
}

pub fn group_rows(agg: &GroupedAggregate) -> Vec<GroupRow> {
    agg.values
        .iter()
        .map(|(group, value)| GroupRow {
            group: group.clone(),
            value: two_places(*value),
        })
        .collect()
}

// Two decimals with thousands separators on the whole part, e.g. `1,500.00`.
fn two_places(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    match whole.parse::<u64>() {
        Ok(w) => format!("{}{}.{}", sign, format_int(w), frac),
        Err(_) => format!("{}{}", sign, fixed),
    }
}

pub fn print_metrics(m: &MetricsSnapshot) {
    println!("Key Metrics");
    println!("- Total Trainees: {}", format_int(m.total_trainees));
    println!("- Total Placed: {}", format_int(m.total_placed));
    println!("- Avg Completion (%): {:.2}", m.avg_completion);
    println!("- Placement Rate (%): {:.2}\n", m.placement_rate);
}

pub fn preview_aggregate(title: &str, agg: &GroupedAggregate, max_rows: usize) {
    println!("{}", title);
    println!("({} by {})\n", agg.value_label, agg.key_label);
    let rows: Vec<GroupRow> = group_rows(agg).into_iter().take(max_rows).collect();
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(rows).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn print_dashboard(out: &DashboardOutput, max_rows: usize) {
    print_metrics(&out.metrics);
    preview_aggregate("Placement by Course", &out.placed_by_course, max_rows);
    preview_aggregate("Completion Rate by Region", &out.completion_by_region, max_rows);
    preview_aggregate("Trainees by Gender", &out.trainees_by_gender, max_rows);
    println!("Executive Summary\n");
    println!("{}", out.narrative);
}
