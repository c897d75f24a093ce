//! Training-program impact reporting.
//!
//! A loaded table flows through column resolution, numeric coercion,
//! filtering, aggregation and region ranking, and ends as a metrics snapshot,
//! three grouped tables and an executive-summary narrative.
pub mod cache;
pub mod coerce;
pub mod config;
pub mod error;
pub mod filter;
pub mod insight;
pub mod loader;
pub mod narrative;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod resolver;
pub mod types;
pub mod util;

pub use error::{PipelineError, Result};
pub use filter::FilterSelection;
pub use pipeline::{prepare, run, DashboardOutput};
pub use types::{Dataset, FactsBundle, GroupedAggregate, MetricsSnapshot, RawTable};
