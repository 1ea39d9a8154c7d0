//! Pipeline configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the reference workflow. Command-line flags override file values.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use nlrcraft_classify::{Cutoffs, DomainFamily, FamilyTable, PFAM_NBARC, PFAM_TIR, PFAM_TIR2};
use serde::{Deserialize, Serialize};

/// Root configuration for `nlrcraft run`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub cutoffs: CutoffConfig,

    #[serde(default)]
    pub plddt: PlddtConfig,

    #[serde(default)]
    pub families: FamilyConfig,

    #[serde(default)]
    pub segmentation: SegmentationConfig,

    #[serde(default)]
    pub tools: ToolConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check value ranges and required entries.
    pub fn validate(&self) -> Result<()> {
        self.cutoffs.to_cutoffs().validate()?;
        if !(0.0..=100.0).contains(&self.plddt.cutoff) {
            bail!("plddt.cutoff must be within 0-100, got {}", self.plddt.cutoff);
        }
        if self.families.nbarc.is_empty() {
            bail!("families.nbarc needs at least one template prefix");
        }
        if self.families.tir.iter().chain(&self.families.nbarc).any(|p| p.is_empty()) {
            bail!("family template prefixes must not be empty");
        }
        Ok(())
    }
}

// =============================================================================
// Cutoffs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffConfig {
    #[serde(default = "default_min_prob")]
    pub min_prob: f64,

    #[serde(default = "default_min_tcov")]
    pub min_tcov: f64,

    #[serde(default = "default_min_tm")]
    pub min_tm: f64,

    #[serde(default = "default_max_evalue")]
    pub max_evalue: f64,
}

fn default_min_prob() -> f64 {
    0.99
}
fn default_min_tcov() -> f64 {
    Cutoffs::default().min_tcov
}
fn default_min_tm() -> f64 {
    Cutoffs::default().min_tm
}
fn default_max_evalue() -> f64 {
    Cutoffs::default().max_evalue
}

impl Default for CutoffConfig {
    fn default() -> Self {
        Self {
            min_prob: default_min_prob(),
            min_tcov: default_min_tcov(),
            min_tm: default_min_tm(),
            max_evalue: default_max_evalue(),
        }
    }
}

impl CutoffConfig {
    pub fn to_cutoffs(&self) -> Cutoffs {
        Cutoffs {
            min_prob: self.min_prob,
            min_tcov: self.min_tcov,
            min_tm: self.min_tm,
            max_evalue: self.max_evalue,
        }
    }
}

// =============================================================================
// pLDDT filtering
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlddtConfig {
    /// Residues whose alpha-carbon pLDDT is below this are removed.
    #[serde(default = "default_plddt_cutoff")]
    pub cutoff: f64,

    /// Filter structure files on the rayon pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_plddt_cutoff() -> f64 {
    60.0
}
fn default_true() -> bool {
    true
}

impl Default for PlddtConfig {
    fn default() -> Self {
        Self {
            cutoff: default_plddt_cutoff(),
            parallel: true,
        }
    }
}

// =============================================================================
// Domain families
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyConfig {
    #[serde(default = "default_tir")]
    pub tir: Vec<String>,

    /// The first entry also selects the template for NB-ARC localisation.
    #[serde(default = "default_nbarc")]
    pub nbarc: Vec<String>,
}

fn default_tir() -> Vec<String> {
    vec![PFAM_TIR.to_string(), PFAM_TIR2.to_string()]
}
fn default_nbarc() -> Vec<String> {
    vec![PFAM_NBARC.to_string()]
}

impl Default for FamilyConfig {
    fn default() -> Self {
        Self {
            tir: default_tir(),
            nbarc: default_nbarc(),
        }
    }
}

impl FamilyConfig {
    pub fn to_table(&self) -> FamilyTable {
        let mut table = FamilyTable::new();
        for prefix in &self.tir {
            table.insert(prefix.clone(), DomainFamily::Tir);
        }
        for prefix in &self.nbarc {
            table.insert(prefix.clone(), DomainFamily::NbArc);
        }
        table
    }

    /// Template prefix used for best-hit selection.
    pub fn nbarc_prefix(&self) -> &str {
        self.nbarc.first().map(String::as_str).unwrap_or(PFAM_NBARC)
    }
}

// =============================================================================
// Segmentation
// =============================================================================

/// Which structure the NBS split is applied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMode {
    /// Map and split the pLDDT-filtered structure.
    #[default]
    Filtered,
    /// Map through the filtered structure, split the original one.
    Original,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    #[serde(default)]
    pub mapping: MappingMode,
}

// =============================================================================
// External tools
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_foldseek")]
    pub foldseek: String,

    #[serde(default = "default_rscript")]
    pub rscript: String,

    /// Random-Forest prediction script run through `rscript`.
    #[serde(default)]
    pub rf_script: Option<PathBuf>,

    /// Serialized Random-Forest model passed to `rf_script`.
    #[serde(default)]
    pub rf_model: Option<PathBuf>,

    /// Directory of domain template structures for `foldseek createdb`.
    #[serde(default = "default_domains")]
    pub domains: PathBuf,
}

fn default_foldseek() -> String {
    "foldseek".to_string()
}
fn default_rscript() -> String {
    "Rscript".to_string()
}
fn default_domains() -> PathBuf {
    PathBuf::from("domains_pdb")
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            foldseek: default_foldseek(),
            rscript: default_rscript(),
            rf_script: None,
            rf_model: None,
            domains: default_domains(),
        }
    }
}
