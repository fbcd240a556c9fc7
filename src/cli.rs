use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::{SPECIALTY_COLUMN, STATE_COLUMN};

const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

#[derive(Parser, Debug)]
#[command(name = "prescriber-heatmaps")]
#[command(about = "Aggregate Medicare prescriber records into heatmap and choropleth inputs", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory holding the prescriber CSV and other inputs.
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Where matrices and render requests are written. Defaults to <data-dir>/output.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("output"))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drug x specialty prescription counts and shares.
    Specialty(SpecialtyArgs),
    /// Average prescriptions per provider for each state.
    States(StatesArgs),
    /// Symmetric co-occurrence matrix of a node/link graph.
    Occurrence(OccurrenceArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct PrescriberInput {
    /// Prescriber CSV. Defaults to <data-dir>/prescriber-info.csv.
    #[arg(long)]
    pub input_path: Option<PathBuf>,

    /// Non-metric text column (repeatable). Replaces the default list when given.
    #[arg(long = "exclude-column")]
    pub exclude_columns: Vec<String>,

    /// Non-metric 0/1 column (repeatable). Replaces the default list when given.
    #[arg(long = "indicator-column")]
    pub indicator_columns: Vec<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SpecialtyArgs {
    #[command(flatten)]
    pub input: PrescriberInput,

    /// Text column the records are grouped by.
    #[arg(long, default_value = SPECIALTY_COLUMN)]
    pub group_by: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StatesArgs {
    #[command(flatten)]
    pub input: PrescriberInput,

    /// Text column holding the state code.
    #[arg(long, default_value = STATE_COLUMN)]
    pub state_column: String,

    /// Boundary JSON keyed by state code ({"CA": {"name", "lons", "lats"}}).
    /// Without it the built-in state list is used with empty outlines.
    #[arg(long)]
    pub boundaries: Option<PathBuf>,

    /// Keep Alaska and Hawaii on the map.
    #[arg(long)]
    pub include_noncontiguous: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct OccurrenceArgs {
    /// Graph JSON with nodes and links. Defaults to <data-dir>/graph.json.
    #[arg(long)]
    pub graph: Option<PathBuf>,
}
