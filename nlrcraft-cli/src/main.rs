use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use nlrcraft_classify::{Cutoffs, FamilyTable, PFAM_NBARC};
use nlrcraft_cli::config::PipelineConfig;
use nlrcraft_cli::stages::{
    classify_stage, filter_plddt_stage, nbs_pos_stage, remove_fps_stage, representatives_stage,
    run_pipeline, sibling, split_stage, RunOptions, ScoreSource, COORDINATE_REPORT_FILE,
    FILTERED_HITS_FILE, NLR_IDS_FILE, PLDDT_SCORES_FILE,
};

#[derive(Parser)]
#[command(name = "nlrcraft", version)]
#[command(about = "NLRcraft: identify and classify plant NLRs from predicted structures", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove low-confidence residues from every structure in a directory
    FilterPlddt {
        /// Minimum alpha-carbon pLDDT kept
        cutoff: f64,
        input_dir: PathBuf,
        output_dir: PathBuf,
        /// Process files one at a time
        #[arg(long, action = ArgAction::SetTrue)]
        sequential: bool,
    },
    /// Label proteins from a Foldseek hit table
    Classify {
        /// 19-column Foldseek hit table
        aln: PathBuf,
        /// Protein id list
        ids: PathBuf,
        /// Output label table
        out: PathBuf,
        #[arg(short = 'p', long = "prob", default_value_t = 1.0)]
        prob: f64,
        #[arg(long, default_value_t = 0.8)]
        tcov: f64,
        #[arg(long, default_value_t = 0.5)]
        tm: f64,
        /// Hits need an e-value strictly below this
        #[arg(short, long, default_value_t = 0.001)]
        evalue: f64,
        /// Where to write passing hits (default: aln_filtered.txt next to OUT)
        #[arg(long, value_name = "PATH")]
        filtered: Option<PathBuf>,
        /// Config TOML file; its [families] table sets the template prefixes
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Downgrade labels of proteins predicted non-NLR
    RemoveFps {
        /// Label table
        #[arg(short, long)]
        input: PathBuf,
        /// Random-Forest prediction table (query / predicted columns)
        #[arg(short, long)]
        predictions: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Confirmed id list (default: NLR_ids.txt next to OUTPUT)
        #[arg(long, value_name = "PATH")]
        nlr_ids: Option<PathBuf>,
    },
    /// Locate the best NB-ARC hit of each confirmed protein
    NbsPos {
        /// Passing-cutoff hit table
        #[arg(short, long)]
        aln: PathBuf,
        /// Confirmed id list
        #[arg(short, long)]
        ids: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Target template prefix
        #[arg(long, default_value = PFAM_NBARC)]
        prefix: String,
    },
    /// Split structures into N-terminal, NBS and C-terminal parts
    Split {
        /// NBS position table
        #[arg(short, long)]
        nbs: PathBuf,
        /// Directory of pLDDT-filtered structures
        #[arg(short, long)]
        pdb_dir: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Segment the unfiltered structures in this directory instead
        #[arg(long, value_name = "DIR")]
        original: Option<PathBuf>,
        /// Coordinate report (default: NBS_coordinates.tsv in OUTPUT)
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },
    /// Pick the highest-pLDDT member of each cluster
    Representatives {
        /// Two-column cluster table
        #[arg(short, long)]
        clusters: PathBuf,
        /// Directory of <id>.pdb files to compute mean pLDDT from
        #[arg(short, long, required_unless_present = "plddt_scores", conflicts_with = "plddt_scores")]
        structs_dir: Option<PathBuf>,
        /// Precomputed id / pLDDT table
        #[arg(short, long)]
        plddt_scores: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        /// Where computed scores are saved
        #[arg(long, default_value = PLDDT_SCORES_FILE)]
        scores_out: PathBuf,
    },
    /// Run the whole pipeline
    Run {
        /// Directory of predicted structures (.pdb / .cif)
        #[arg(short = 'i', long)]
        structs: PathBuf,
        /// Protein id list
        #[arg(short = 'd', long)]
        ids: PathBuf,
        /// pLDDT cutoff (overrides the config)
        #[arg(short, long)]
        plddt: Option<f64>,
        /// Use this prediction table instead of running the Random Forest
        #[arg(long, value_name = "TSV")]
        predictions: Option<PathBuf>,
        /// Config TOML file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Domain template directory (overrides the config)
        #[arg(long, value_name = "DIR")]
        domains: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        workdir: PathBuf,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::FilterPlddt {
            cutoff,
            input_dir,
            output_dir,
            sequential,
        } => {
            let report = filter_plddt_stage(cutoff, &input_dir, &output_dir, !sequential)?;
            for (path, err) in &report.failed {
                log::error!("{}: {}", path.display(), err);
            }
        }
        Commands::Classify {
            aln,
            ids,
            out,
            prob,
            tcov,
            tm,
            evalue,
            filtered,
            config,
        } => {
            let cutoffs = Cutoffs {
                min_prob: prob,
                min_tcov: tcov,
                min_tm: tm,
                max_evalue: evalue,
            };
            let filtered = filtered.unwrap_or_else(|| sibling(&out, FILTERED_HITS_FILE));
            let families = match &config {
                Some(path) => {
                    let cfg = PipelineConfig::from_file(path)?;
                    cfg.validate()?;
                    cfg.families.to_table()
                }
                None => FamilyTable::default(),
            };
            classify_stage(&aln, &ids, &out, &filtered, cutoffs, families)?;
        }
        Commands::RemoveFps {
            input,
            predictions,
            output,
            nlr_ids,
        } => {
            let nlr_ids = nlr_ids.unwrap_or_else(|| sibling(&output, NLR_IDS_FILE));
            remove_fps_stage(&input, &predictions, &output, &nlr_ids)?;
        }
        Commands::NbsPos {
            aln,
            ids,
            output,
            prefix,
        } => {
            let positions = nbs_pos_stage(&aln, &ids, &output, &prefix)?;
            log::info!("{} NBS position(s) -> {}", positions.len(), output.display());
        }
        Commands::Split {
            nbs,
            pdb_dir,
            output,
            original,
            report,
        } => {
            let report = report.unwrap_or_else(|| output.join(COORDINATE_REPORT_FILE));
            split_stage(&nbs, &pdb_dir, &output, original.as_deref(), &report)?;
        }
        Commands::Representatives {
            clusters,
            structs_dir,
            plddt_scores,
            output,
            scores_out,
        } => {
            let source = match (plddt_scores, structs_dir) {
                (Some(table), _) => ScoreSource::Table(table),
                (None, Some(dir)) => ScoreSource::Structures {
                    dir,
                    scores_out,
                },
                (None, None) => anyhow::bail!("either --structs-dir or --plddt-scores is required"),
            };
            let rows = representatives_stage(&clusters, &source, &output)?;
            log::info!("{} row(s) -> {}", rows.len(), output.display());
        }
        Commands::Run {
            structs,
            ids,
            plddt,
            predictions,
            config,
            domains,
            workdir,
        } => {
            let mut cfg = match &config {
                Some(path) => PipelineConfig::from_file(path)?,
                None => PipelineConfig::default(),
            };
            if let Some(cutoff) = plddt {
                cfg.plddt.cutoff = cutoff;
            }
            if let Some(dir) = domains {
                cfg.tools.domains = dir;
            }
            let opts = RunOptions {
                structs,
                ids,
                predictions,
                workdir,
            };
            let outputs = run_pipeline(&opts, &cfg).context("NLRcraft pipeline failed")?;
            println!("NLR identification: {}", outputs.resolved_labels.display());
            println!("NBS split: {}", outputs.split_dir.display());
        }
    }
    Ok(())
}
