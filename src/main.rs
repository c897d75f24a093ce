// Entry point and high-level CLI flow.
//
// - By default the input is loaded once, the command-line filters are
//   applied, and the dashboard is printed (and exported with `--out-dir`).
// - `--interactive` runs a menu loop: [1] loads the file through the TTL
//   cache, [2] changes filters, [3] regenerates the report, [4] exits.
use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use impact_report::cache::TableCache;
use impact_report::config::Cli;
use impact_report::filter::{distinct_values, FilterSelection};
use impact_report::narrative::Narrator;
use impact_report::pipeline::{self, DashboardOutput};
use impact_report::types::{Dataset, Dimension};
use impact_report::{loader, output, util, PipelineError};
use once_cell::sync::Lazy;
use std::io::{self, BufRead, Write};
use std::sync::{Mutex, MutexGuard};

const PREVIEW_ROWS: usize = 10;

// Session state for the interactive mode: the loaded dataset survives across
// menu choices so filters can change without reloading.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    cache: TableCache,
    data: Option<Dataset>,
    selection: FilterSelection,
}

fn app_state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

/// One trimmed line, or `None` once the input is closed or unreadable.
fn read_answer<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf.trim().to_string()),
        Err(e) => {
            eprintln!("Failed to read input: {}", e);
            None
        }
    }
}

/// Print `label` and read the answer.
fn prompt<R: BufRead>(input: &mut R, label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    read_answer(input)
}

fn export(cli: &Cli, out: &DashboardOutput) {
    let Some(dir) = &cli.out_dir else { return };
    match output::export_all(dir, out) {
        Ok(files) => println!("Outputs saved to: {}\n", files.join(", ")),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn render(cli: &Cli, dataset: &Dataset, selection: &FilterSelection, narrator: &dyn Narrator) {
    let out = pipeline::run(dataset, selection, narrator);
    println!(
        "Generating report... ({} of {} rows selected)\n",
        util::format_int(out.rows_selected),
        util::format_int(dataset.records.len())
    );
    output::print_dashboard(&out, PREVIEW_ROWS);
    export(cli, &out);
}

fn run_once(cli: &Cli, narrator: &dyn Narrator) -> Result<()> {
    let table = loader::load_file(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    let dataset = pipeline::prepare(&table)
        .with_context(|| format!("cannot report on {}", cli.input.display()))?;
    let selection = cli.selection(&dataset);
    render(cli, &dataset, &selection, narrator);
    Ok(())
}

/// Handle option [1]: load (or reuse) the table and reset the filters.
fn handle_load(cli: &Cli) {
    let mut state = app_state();
    let table = match state.cache.get_or_load(&cli.input) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };
    match pipeline::prepare(&table) {
        Ok(dataset) => {
            println!(
                "Processing dataset... ({} rows loaded)",
                util::format_int(dataset.records.len())
            );
            let missing = dataset.fields.missing_fields();
            if !missing.is_empty() {
                println!("Note: no column found for {:?}; those figures will read 0.", missing);
            }
            println!();
            state.selection = FilterSelection::all(&dataset);
            state.data = Some(dataset);
        }
        Err(PipelineError::EmptyInput) => {
            println!("No data loaded yet: {} has no rows.\n", cli.input.display());
            state.data = None;
        }
        Err(e) => eprintln!("Failed to prepare data: {}\n", e),
    }
}

/// Handle option [2]: pick the allowed values for each dimension.
///
/// Returns `false` when the input ends mid-way; dimensions already answered
/// keep their new values.
fn handle_filters<R: BufRead>(input: &mut R) -> bool {
    let mut state = app_state();
    let Some(dataset) = state.data.clone() else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return true;
    };
    for dim in Dimension::ALL {
        let options = distinct_values(&dataset, dim);
        if options.is_empty() {
            continue;
        }
        println!("{} options: {}", dim.label(), options.join(", "));
        let Some(answer) = prompt(input, "Keep (comma-separated, blank = all, - = none): ")
        else {
            return false;
        };
        let values: Vec<String> = match answer.as_str() {
            "" => options,
            "-" => Vec::new(),
            list => list
                .split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
        };
        state.selection.set(dim, values);
    }
    println!();
    true
}

/// Handle option [3]: rerun the pipeline with the current filters.
fn handle_generate(cli: &Cli, narrator: &dyn Narrator) {
    let (data, selection) = {
        let state = app_state();
        (state.data.clone(), state.selection.clone())
    };
    let Some(dataset) = data else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    render(cli, &dataset, &selection, narrator);
}

/// Menu loop over `input`. Ends on [4] or when the input is exhausted.
fn run_interactive<R: BufRead>(cli: &Cli, narrator: &dyn Narrator, input: &mut R) {
    app_state().cache = TableCache::new(Duration::seconds(cli.cache_ttl));
    loop {
        println!("Select an option:");
        println!("[1] Load the file");
        println!("[2] Set filters");
        println!("[3] Generate report");
        println!("[4] Exit\n");
        let Some(choice) = prompt(input, "Enter choice: ") else {
            println!("\nEnd of input; exiting.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(cli),
            "2" => {
                if !handle_filters(input) {
                    println!("\nEnd of input; exiting.");
                    break;
                }
            }
            "3" => handle_generate(cli, narrator),
            "4" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let narrator = cli
        .narrator()
        .context("failed to set up the narrative generator")?;

    if cli.interactive {
        run_interactive(&cli, narrator.as_ref(), &mut io::stdin().lock());
        Ok(())
    } else {
        run_once(&cli, narrator.as_ref())
    }
}
