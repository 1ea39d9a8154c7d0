//! Driver for the NLRcraft pipeline: configuration, external tools and the
//! file-to-file stages behind each `nlrcraft` subcommand.

pub mod config;
pub mod external;
pub mod stages;

pub use config::{MappingMode, PipelineConfig};
pub use external::{ToolCommand, ToolRun};
pub use stages::{run_pipeline, PipelineOutputs, RunOptions, ScoreSource, SplitSummary};
