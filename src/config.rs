use crate::cache::{DEFAULT_TTL_SECS, MAX_TTL_SECS};
use crate::error::Result;
use crate::filter::FilterSelection;
use crate::narrative::{ExternalNarrator, Narrator, OpenAiClient, TemplateNarrator};
use crate::types::{Dataset, Dimension};
use clap::{Parser, ValueEnum};
use log::warn;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NarrativeStrategy {
    /// Fixed Markdown template
    Template,
    /// OpenAI-compatible chat completion, template on failure
    External,
}

#[derive(Debug, Parser)]
#[command(
    name = "impact_report",
    version,
    about = "Training-program impact metrics and executive summary"
)]
pub struct Cli {
    /// CSV or JSON-records file to load
    #[arg(short, long, default_value = "impact_data.csv")]
    pub input: PathBuf,

    /// Keep only these regions (repeatable; default: all)
    #[arg(long = "region")]
    pub regions: Vec<String>,

    /// Keep only these courses (repeatable; default: all)
    #[arg(long = "course")]
    pub courses: Vec<String>,

    /// Keep only these genders (repeatable; default: all)
    #[arg(long = "gender")]
    pub genders: Vec<String>,

    #[arg(long, value_enum, default_value_t = NarrativeStrategy::Template)]
    pub narrative: NarrativeStrategy,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, default_value = "gpt-4o-mini")]
    pub model: String,

    #[arg(long, default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    /// Seconds a loaded table may be reused in an interactive session (0 to one week)
    #[arg(
        long,
        default_value_t = DEFAULT_TTL_SECS,
        value_parser = clap::value_parser!(i64).range(0..=MAX_TTL_SECS)
    )]
    pub cache_ttl: i64,

    /// Write grouped tables and facts.json here
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Menu-driven session instead of a single run
    #[arg(long)]
    pub interactive: bool,
}

impl Cli {
    /// Selection from the command-line flags. A dimension with no flags keeps
    /// every value the dataset has.
    pub fn selection(&self, dataset: &Dataset) -> FilterSelection {
        let mut selection = FilterSelection::all(dataset);
        for (dim, values) in [
            (Dimension::Region, &self.regions),
            (Dimension::Course, &self.courses),
            (Dimension::Gender, &self.genders),
        ] {
            if values.is_empty() {
                continue;
            }
            for v in values {
                if !selection.selected(dim).contains(v) {
                    warn!("{} value {:?} does not occur in the data", dim.label(), v);
                }
            }
            selection.set(dim, values.iter().cloned());
        }
        selection
    }

    pub fn narrator(&self) -> Result<Box<dyn Narrator>> {
        match (self.narrative, &self.api_key) {
            (NarrativeStrategy::Template, _) => Ok(Box::new(TemplateNarrator)),
            (NarrativeStrategy::External, Some(key)) => {
                let client =
                    OpenAiClient::new(key.clone(), self.base_url.clone(), self.model.clone())?;
                Ok(Box::new(ExternalNarrator::new(client)))
            }
            (NarrativeStrategy::External, None) => {
                warn!("External narrative requested without an API key; using template");
                Ok(Box::new(TemplateNarrator))
            }
        }
    }
}
