//! Pipeline stages, each reading and writing whole files.
//!
//! Every subcommand maps onto one stage function; [`run_pipeline`] chains
//! them with the external Foldseek and Random-Forest steps.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use nlrcraft_classify::{
    read_label_table, resolve_false_positives, select_best_hits, select_representatives,
    to_nbs_positions, write_label_table, Classification, Cutoffs, DomainClassifier, FamilyTable,
    Resolution,
};
use nlrcraft_core::Summarizable;
use nlrcraft_io::{
    parse_alignments, read_clusters, read_id_list, read_nbs_positions, read_plddt_scores,
    read_predictions, write_alignments, write_coordinate_report, write_id_list,
    write_nbs_positions, write_plddt_scores, write_representatives, CoordinateRow, NbsPosition,
    RepresentativeRow,
};
use nlrcraft_struct::plddt::read_atoms;
use nlrcraft_struct::{
    create_region_dirs, filter_directory, mean_plddt, read_structure_record, segment,
    BatchReport, ResidueLookup, SpanMapping,
};

use crate::config::{MappingMode, PipelineConfig};
use crate::external::{foldseek_createdb, foldseek_easy_search, rf_predict};

/// Default name of the passing-cutoff hit table.
pub const FILTERED_HITS_FILE: &str = "aln_filtered.txt";
/// Default name of the confirmed-NLR id list.
pub const NLR_IDS_FILE: &str = "NLR_ids.txt";
/// Default name of the computed pLDDT score table.
pub const PLDDT_SCORES_FILE: &str = "plddt_scores.tsv";
/// Default name of the coordinate report inside the split directory.
pub const COORDINATE_REPORT_FILE: &str = "NBS_coordinates.tsv";

/// Sibling of `path` named `name`.
pub fn sibling(path: &Path, name: &str) -> PathBuf {
    path.with_file_name(name)
}

// =============================================================================
// pLDDT filtering
// =============================================================================

pub fn filter_plddt_stage(
    cutoff: f64,
    input_dir: &Path,
    output_dir: &Path,
    parallel: bool,
) -> Result<BatchReport> {
    if !input_dir.is_dir() {
        bail!("structure directory {} does not exist", input_dir.display());
    }
    let report = filter_directory(input_dir, output_dir, cutoff, parallel)
        .with_context(|| format!("filtering structures in {}", input_dir.display()))?;
    Ok(report)
}

// =============================================================================
// Domain classification
// =============================================================================

/// Label every id of `ids` from the hits in `aln`, writing the label table
/// to `out` and the passing hits to `filtered_out`.
pub fn classify_stage(
    aln: &Path,
    ids: &Path,
    out: &Path,
    filtered_out: &Path,
    cutoffs: Cutoffs,
    families: FamilyTable,
) -> Result<Classification> {
    cutoffs.validate()?;
    let table = parse_alignments(aln).with_context(|| format!("reading hits {}", aln.display()))?;
    let universe = read_id_list(ids).with_context(|| format!("reading ids {}", ids.display()))?;

    let classification = DomainClassifier::new(cutoffs, families).classify(&table.records, &universe);

    write_label_table(out, &classification.labels)?;
    write_alignments(filtered_out, &classification.passing)?;
    log::info!(
        "labels -> {}, {} passing hit(s) -> {}",
        out.display(),
        classification.passing.len(),
        filtered_out.display()
    );
    Ok(classification)
}

// =============================================================================
// False-positive removal
// =============================================================================

pub fn remove_fps_stage(
    labels: &Path,
    predictions: &Path,
    out: &Path,
    nlr_ids: &Path,
) -> Result<Resolution> {
    let table = read_label_table(labels)
        .with_context(|| format!("reading labels {}", labels.display()))?;
    let predicted = read_predictions(predictions)
        .with_context(|| format!("reading predictions {}", predictions.display()))?;

    let resolution = resolve_false_positives(&table, &predicted);
    write_label_table(out, &resolution.labels)?;
    write_id_list(nlr_ids, &resolution.confirmed)?;
    log::info!("{}", resolution.labels.summary());
    Ok(resolution)
}

// =============================================================================
// NB-ARC positions
// =============================================================================

/// Best `prefix` hit span for every id in `ids`, written as the NBS table.
pub fn nbs_pos_stage(aln: &Path, ids: &Path, out: &Path, prefix: &str) -> Result<Vec<NbsPosition>> {
    let table = parse_alignments(aln).with_context(|| format!("reading hits {}", aln.display()))?;
    let confirmed: HashSet<String> = read_id_list(ids)
        .with_context(|| format!("reading ids {}", ids.display()))?
        .into_iter()
        .collect();

    let positions = to_nbs_positions(&select_best_hits(&table.records, prefix, &confirmed));
    write_nbs_positions(out, &positions)?;
    Ok(positions)
}

// =============================================================================
// NBS split
// =============================================================================

/// Counts from one [`split_stage`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSummary {
    pub segmented: usize,
    pub missing: usize,
    pub unreadable: usize,
    pub invalid: usize,
}

/// Split each protein of the NBS table into N-terminal, NBS and C-terminal
/// parts.
///
/// Spans are always mapped through the filtered structure in `pdb_dir`.
/// With `original_dir`, the mapped residue numbers segment the original
/// structure of the same id instead. Missing or unreadable files and invalid
/// mappings are logged and skipped.
pub fn split_stage(
    nbs: &Path,
    pdb_dir: &Path,
    out_dir: &Path,
    original_dir: Option<&Path>,
    report: &Path,
) -> Result<SplitSummary> {
    let positions = read_nbs_positions(nbs)
        .with_context(|| format!("reading NBS positions {}", nbs.display()))?;
    create_region_dirs(out_dir)?;

    let mut summary = SplitSummary::default();
    let mut rows = Vec::new();

    for pos in &positions {
        let filtered_path = pdb_dir.join(format!("{}.pdb", pos.id));
        if !filtered_path.is_file() {
            log::warn!("{}: structure {} not found, skipped", pos.id, filtered_path.display());
            summary.missing += 1;
            continue;
        }
        let filtered = match read_structure_record(&filtered_path) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{}: cannot read {}, skipped: {}", pos.id, filtered_path.display(), e);
                summary.unreadable += 1;
                continue;
            }
        };
        let span = match ResidueLookup::from_record(&filtered).map_span(pos.qstart, pos.qend) {
            SpanMapping::Valid(span) => span,
            invalid @ SpanMapping::Invalid { .. } => {
                log::warn!("{}: invalid mapping, {}", pos.id, invalid);
                summary.invalid += 1;
                continue;
            }
        };

        let written = match original_dir {
            Some(dir) => {
                let original_path = dir.join(format!("{}.pdb", pos.id));
                if !original_path.is_file() {
                    log::warn!(
                        "{}: original structure {} not found, skipped",
                        pos.id,
                        original_path.display()
                    );
                    summary.missing += 1;
                    continue;
                }
                let original = match read_structure_record(&original_path) {
                    Ok(record) => record,
                    Err(e) => {
                        log::warn!(
                            "{}: cannot read original {}, skipped: {}",
                            pos.id,
                            original_path.display(),
                            e
                        );
                        summary.unreadable += 1;
                        continue;
                    }
                };
                segment(&original, span).write(out_dir, &pos.id)?
            }
            None => segment(&filtered, span).write(out_dir, &pos.id)?,
        };

        log::debug!("{}: residues {}-{}, {} file(s)", pos.id, span.start, span.end, written.len());
        rows.push(CoordinateRow {
            id: pos.id.clone(),
            qstart: pos.qstart,
            qend: pos.qend,
            pdb_start: span.start,
            pdb_end: span.end,
        });
        summary.segmented += 1;
    }

    write_coordinate_report(report, &rows)?;
    log::info!(
        "NBS split: {} segmented, {} missing, {} unreadable, {} invalid mapping(s) -> {}",
        summary.segmented,
        summary.missing,
        summary.unreadable,
        summary.invalid,
        out_dir.display()
    );
    Ok(summary)
}

// =============================================================================
// Cluster representatives
// =============================================================================

/// Where per-protein mean pLDDT values come from.
#[derive(Debug, Clone)]
pub enum ScoreSource {
    /// A precomputed `id\tscore` table.
    Table(PathBuf),
    /// Compute from `<dir>/<id>.pdb` and save the scores to `scores_out`.
    Structures { dir: PathBuf, scores_out: PathBuf },
}

pub fn representatives_stage(
    clusters: &Path,
    source: &ScoreSource,
    out: &Path,
) -> Result<Vec<RepresentativeRow>> {
    let clusters = read_clusters(clusters)
        .with_context(|| format!("reading clusters {}", clusters.display()))?;

    let scores = match source {
        ScoreSource::Table(path) => read_plddt_scores(path)
            .with_context(|| format!("reading pLDDT scores {}", path.display()))?,
        ScoreSource::Structures { dir, scores_out } => {
            let members: HashSet<&str> = clusters
                .iter()
                .flat_map(|c| c.members.iter().map(String::as_str))
                .collect();
            let scores = compute_plddt_scores(dir, members);
            write_plddt_scores(scores_out, &scores)?;
            scores
        }
    };

    let rows = select_representatives(&clusters, &scores);
    write_representatives(out, &rows)?;
    Ok(rows)
}

/// Mean pLDDT of each `<dir>/<id>.pdb`; missing or unreadable files are
/// left out.
fn compute_plddt_scores<'a>(dir: &Path, ids: impl IntoIterator<Item = &'a str>) -> HashMap<String, f64> {
    let mut scores = HashMap::new();
    for id in ids {
        let path = dir.join(format!("{}.pdb", id));
        if !path.is_file() {
            continue;
        }
        match read_atoms(&path) {
            Ok(atoms) => {
                if let Some(mean) = mean_plddt(&atoms) {
                    scores.insert(id.to_string(), mean);
                }
            }
            Err(e) => log::warn!("{}: {}", id, e),
        }
    }
    scores
}

// =============================================================================
// Whole pipeline
// =============================================================================

/// Inputs of `nlrcraft run` that are not part of [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory of predicted structures.
    pub structs: PathBuf,
    /// Id universe file.
    pub ids: PathBuf,
    /// Prediction table that replaces the Random-Forest step.
    pub predictions: Option<PathBuf>,
    /// Directory the stage directories are created in.
    pub workdir: PathBuf,
}

/// Main files produced by [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub labels: PathBuf,
    pub resolved_labels: PathBuf,
    pub nlr_ids: PathBuf,
    pub nbs_positions: PathBuf,
    pub split_dir: PathBuf,
    pub coordinate_report: PathBuf,
}

fn stage_dir(workdir: &Path, name: &str) -> Result<PathBuf> {
    let dir = workdir.join(name);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir)
}

/// Run all four steps. Any external tool failure aborts the run.
pub fn run_pipeline(opts: &RunOptions, config: &PipelineConfig) -> Result<PipelineOutputs> {
    config.validate()?;
    let tools = &config.tools;

    // STEP 1: template database
    let step1 = stage_dir(&opts.workdir, "step1_domain_db")?;
    let db = step1.join("nlrDB");
    log::info!("STEP 1: build Foldseek database");
    foldseek_createdb(&tools.foldseek, &tools.domains, &db).run()?;

    // STEP 2: pLDDT filter
    let step2 = stage_dir(&opts.workdir, "step2_plddt_filter")?;
    let filtered = step2.join("structs_filter");
    log::info!("STEP 2: filter structures at pLDDT >= {}", config.plddt.cutoff);
    let report = filter_plddt_stage(config.plddt.cutoff, &opts.structs, &filtered, config.plddt.parallel)?;
    if !report.failed.is_empty() {
        log::warn!("{} structure(s) could not be filtered", report.failed.len());
    }

    // STEP 3: identification
    let step3 = stage_dir(&opts.workdir, "step3_identification")?;
    let hits = step3.join("aln_all.txt");
    log::info!("STEP 3.1: Foldseek alignment");
    foldseek_easy_search(&tools.foldseek, &filtered, &db, &hits, &step3.join("tmp")).run()?;

    log::info!("STEP 3.2: domain classification");
    let labels = step3.join("results_all.txt");
    let filtered_hits = step3.join(FILTERED_HITS_FILE);
    classify_stage(
        &hits,
        &opts.ids,
        &labels,
        &filtered_hits,
        config.cutoffs.to_cutoffs(),
        config.families.to_table(),
    )?;

    let predictions = match &opts.predictions {
        Some(path) => path.clone(),
        None => {
            let (Some(script), Some(model)) = (&tools.rf_script, &tools.rf_model) else {
                bail!("tools.rf_script and tools.rf_model must be configured unless --predictions is given");
            };
            log::info!("STEP 3.3.1: Random Forest prediction");
            let out = step3.join("rf_prediction.txt");
            rf_predict(&tools.rscript, script, model, &labels, &out).run()?;
            out
        }
    };

    log::info!("STEP 3.3.2: remove false positives");
    let resolved_labels = step3.join("results_all_rm_FPs.txt");
    let nlr_ids = step3.join(NLR_IDS_FILE);
    remove_fps_stage(&labels, &predictions, &resolved_labels, &nlr_ids)?;

    // STEP 4: NBS location and split
    let step4 = stage_dir(&opts.workdir, "step4_classification")?;
    log::info!("STEP 4.1: extract NBS location");
    let nbs_positions = step4.join("NBS_pos.tsv");
    nbs_pos_stage(&filtered_hits, &nlr_ids, &nbs_positions, config.families.nbarc_prefix())?;

    log::info!("STEP 4.2: split domains at the NBS");
    let split_dir = step4.join("split_domains");
    let coordinate_report = split_dir.join(COORDINATE_REPORT_FILE);
    let original = match config.segmentation.mapping {
        MappingMode::Filtered => None,
        MappingMode::Original => Some(opts.structs.as_path()),
    };
    split_stage(&nbs_positions, &filtered, &split_dir, original, &coordinate_report)?;

    log::info!("pipeline finished; identification results in {}", resolved_labels.display());
    Ok(PipelineOutputs {
        labels,
        resolved_labels,
        nlr_ids,
        nbs_positions,
        split_dir,
        coordinate_report,
    })
}
