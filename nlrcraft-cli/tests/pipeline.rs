use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use nlrcraft_classify::{Cutoffs, DomainLabel, FamilyTable, PFAM_NBARC};
use nlrcraft_cli::config::PipelineConfig;
use nlrcraft_cli::stages::{
    classify_stage, nbs_pos_stage, remove_fps_stage, representatives_stage, run_pipeline,
    split_stage, RunOptions, ScoreSource,
};
use nlrcraft_io::read_id_list;
use tempfile::TempDir;

const PIPELINE_CUTOFFS: Cutoffs = Cutoffs {
    min_prob: 0.99,
    min_tcov: 0.8,
    min_tm: 0.5,
    max_evalue: 0.001,
};

/// One CA line per entry; pLDDT 90.
fn pdb(residues: &[i32]) -> String {
    let mut text = String::new();
    for (i, res) in residues.iter().enumerate() {
        text.push_str(&format!(
            "ATOM  {:>5}  CA  ALA A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00 90.00           C\n",
            i + 1,
            res,
            i as f64 * 1.5,
            0.0,
            0.0
        ));
    }
    text.push_str("END\n");
    text
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// P1 hits NB-ARC over filtered ordinals 2-3; its structure has residue
    /// numbers [10, 10, 12, 12, 12, 15].
    fn new(prediction: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("ids.txt"), "P1\n").unwrap();
        fs::write(
            root.join("aln_all.txt"),
            "P1.pdb\tPF00931_NB-ARC\t0.4\t120\t0.3\t0.9\t70\t3\t2\t3\t1\t118\t0.0001\t150.5\t1.0\t0.7\t0.6\t0.4\t0.6\n\
             P1.pdb\tPF01582_TIR\t0.3\t90\t0.2\t0.5\t60\t2\t1\t2\t1\t90\t0.01\t40.0\t0.5\t0.4\t0.3\t0.2\t0.3\n\
             broken row\n",
        )
        .unwrap();
        fs::write(
            root.join("rf_prediction.txt"),
            format!("query\tpredicted\nP1.pdb\t{}\n", prediction),
        )
        .unwrap();
        fs::create_dir(root.join("filtered")).unwrap();
        fs::write(root.join("filtered/P1.pdb"), pdb(&[10, 10, 12, 12, 12, 15])).unwrap();
        Fixture { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn classify_and_resolve(&self) -> Vec<String> {
        let classification = classify_stage(
            &self.path("aln_all.txt"),
            &self.path("ids.txt"),
            &self.path("results_all.txt"),
            &self.path("aln_filtered.txt"),
            PIPELINE_CUTOFFS,
            FamilyTable::default(),
        )
        .unwrap();
        assert_eq!(classification.labels.get("P1"), Some(&DomainLabel::NbArc));
        assert_eq!(classification.passing.len(), 1);

        remove_fps_stage(
            &self.path("results_all.txt"),
            &self.path("rf_prediction.txt"),
            &self.path("results_all_rm_FPs.txt"),
            &self.path("NLR_ids.txt"),
        )
        .unwrap();
        read_id_list(self.path("NLR_ids.txt")).unwrap()
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn non_nlr_prediction_excludes_protein() {
    let fx = Fixture::new("non-NLR");
    let confirmed = fx.classify_and_resolve();

    assert_eq!(read(&fx.path("results_all.txt")), "P1\tN\n");
    assert_eq!(read(&fx.path("results_all_rm_FPs.txt")), "P1\tNa\n");
    assert!(confirmed.is_empty());

    let positions = nbs_pos_stage(
        &fx.path("aln_filtered.txt"),
        &fx.path("NLR_ids.txt"),
        &fx.path("NBS_pos.tsv"),
        PFAM_NBARC,
    )
    .unwrap();
    assert!(positions.is_empty());
    assert_eq!(read(&fx.path("NBS_pos.tsv")), "query\tqstart\tqend\n");
}

#[test]
fn nlr_prediction_proceeds_to_split() {
    let fx = Fixture::new("NLR");
    let confirmed = fx.classify_and_resolve();
    assert_eq!(read(&fx.path("results_all_rm_FPs.txt")), "P1\tN\n");
    assert_eq!(confirmed, vec!["P1"]);

    nbs_pos_stage(
        &fx.path("aln_filtered.txt"),
        &fx.path("NLR_ids.txt"),
        &fx.path("NBS_pos.tsv"),
        PFAM_NBARC,
    )
    .unwrap();
    assert_eq!(read(&fx.path("NBS_pos.tsv")), "query\tqstart\tqend\nP1\t2\t3\n");

    let out = fx.path("split_domains");
    let report = out.join("NBS_coordinates.tsv");
    let summary = split_stage(&fx.path("NBS_pos.tsv"), &fx.path("filtered"), &out, None, &report).unwrap();
    assert_eq!(summary.segmented, 1);

    assert_eq!(read(&out.join("N_terminal/P1.pdb")).lines().count(), 2);
    assert_eq!(read(&out.join("NBS/P1.pdb")).lines().count(), 4);
    assert!(!out.join("C_terminal/P1.pdb").exists());
    assert_eq!(
        read(&report),
        "id\tqstart\tqend\tpdb_start\tpdb_end\nP1\t2\t3\t12\t15\n"
    );
}

#[test]
fn original_structure_segmented_with_filtered_mapping() {
    let fx = Fixture::new("NLR");
    fs::write(fx.path("NBS_pos.tsv"), "query\tqstart\tqend\nP1\t2\t3\n").unwrap();
    fs::create_dir(fx.path("original")).unwrap();
    fs::write(fx.path("original/P1.pdb"), pdb(&[10, 11, 12, 13, 14, 15, 16])).unwrap();

    let out = fx.path("split_domains");
    let report = fx.path("coords.tsv");
    let summary = split_stage(
        &fx.path("NBS_pos.tsv"),
        &fx.path("filtered"),
        &out,
        Some(&fx.path("original")),
        &report,
    )
    .unwrap();
    assert_eq!(summary.segmented, 1);
    assert_eq!(read(&out.join("N_terminal/P1.pdb")).lines().count(), 2);
    assert_eq!(read(&out.join("NBS/P1.pdb")).lines().count(), 4);
    assert_eq!(read(&out.join("C_terminal/P1.pdb")).lines().count(), 1);
}

#[test]
fn invalid_mapping_and_missing_structure_are_skipped() {
    let fx = Fixture::new("NLR");
    fs::write(fx.path("NBS_pos.tsv"), "query\tqstart\tqend\nP1\t4\t4\nP9\t1\t2\n").unwrap();

    let out = fx.path("split_domains");
    let report = fx.path("coords.tsv");
    let summary = split_stage(&fx.path("NBS_pos.tsv"), &fx.path("filtered"), &out, None, &report).unwrap();
    assert_eq!(summary.segmented, 0);
    assert_eq!(summary.invalid, 1);
    assert_eq!(summary.missing, 1);
    assert!(!out.join("NBS/P1.pdb").exists());
    assert!(out.join("NBS").is_dir());
    assert_eq!(read(&report), "id\tqstart\tqend\tpdb_start\tpdb_end\n");
}

#[test]
fn unreadable_structure_does_not_stop_split() {
    let fx = Fixture::new("NLR");
    let mut bad = b"REMARK   1 AUTHOR M\xfcller\n".to_vec();
    bad.extend_from_slice(pdb(&[1, 2, 3]).as_bytes());
    fs::write(fx.path("filtered/P0.pdb"), bad).unwrap();
    fs::write(fx.path("NBS_pos.tsv"), "query\tqstart\tqend\nP0\t1\t2\nP1\t2\t3\n").unwrap();

    let out = fx.path("split_domains");
    let report = fx.path("coords.tsv");
    let summary = split_stage(&fx.path("NBS_pos.tsv"), &fx.path("filtered"), &out, None, &report).unwrap();
    assert_eq!(summary.unreadable, 1);
    assert_eq!(summary.segmented, 1);
    assert!(!out.join("NBS/P0.pdb").exists());
    assert!(out.join("NBS/P1.pdb").exists());
    assert_eq!(
        read(&report),
        "id\tqstart\tqend\tpdb_start\tpdb_end\nP1\t2\t3\t12\t15\n"
    );
}

#[test]
fn representatives_from_structures() {
    let fx = Fixture::new("NLR");
    let structs = fx.path("structs");
    fs::create_dir(&structs).unwrap();
    fs::write(structs.join("A.pdb"), pdb(&[1, 2])).unwrap();
    fs::write(
        structs.join("B.pdb"),
        "ATOM      1  CA  ALA A   1       0.000   0.000   0.000  1.00 95.00           C\nEND\n",
    )
    .unwrap();
    fs::write(fx.path("clusters.tsv"), "A\tA\nA\tB\nA\tC\n").unwrap();

    let source = ScoreSource::Structures {
        dir: structs,
        scores_out: fx.path("plddt_scores.tsv"),
    };
    let rows = representatives_stage(&fx.path("clusters.tsv"), &source, &fx.path("reps.tsv")).unwrap();
    assert!(rows.iter().all(|r| r.representative == "B"));
    assert_eq!(read(&fx.path("plddt_scores.tsv")), "A\t90.00\nB\t95.00\n");
    assert_eq!(
        read(&fx.path("reps.tsv")),
        "clusterID\tmax_pLDDT\tproteinID\nA\tB\tA\nA\tB\tB\nA\tB\tC\n"
    );
}

#[test]
fn failing_external_tool_aborts_run() {
    let fx = Fixture::new("NLR");
    let mut config = PipelineConfig::default();
    config.tools.foldseek = "nlrcraft-missing-foldseek".to_string();
    let opts = RunOptions {
        structs: fx.path("filtered"),
        ids: fx.path("ids.txt"),
        predictions: Some(fx.path("rf_prediction.txt")),
        workdir: fx.path("work"),
    };

    let err = run_pipeline(&opts, &config).unwrap_err();
    assert!(format!("{:#}", err).contains("nlrcraft-missing-foldseek"));
    assert!(fx.path("work/step1_domain_db").is_dir());
    assert!(!fx.path("work/step2_plddt_filter").exists());
}

#[test]
fn binary_classify_and_exit_status() {
    let fx = Fixture::new("NLR");
    let bin = env!("CARGO_BIN_EXE_nlrcraft");

    let output = Command::new(bin)
        .arg("-q")
        .arg("classify")
        .arg(fx.path("aln_all.txt"))
        .arg(fx.path("ids.txt"))
        .arg(fx.path("labels.txt"))
        .args(["-p", "0.99"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "classify failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(read(&fx.path("labels.txt")), "P1\tN\n");
    assert!(fx.path("aln_filtered.txt").exists());

    fs::write(fx.path("families.toml"), "[families]\nnbarc = [\"PF99999\"]\n").unwrap();
    let output = Command::new(bin)
        .arg("-q")
        .arg("classify")
        .arg(fx.path("aln_all.txt"))
        .arg(fx.path("ids.txt"))
        .arg(fx.path("labels_custom.txt"))
        .args(["-p", "0.99", "--config"])
        .arg(fx.path("families.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(read(&fx.path("labels_custom.txt")), "P1\tNA\n");

    let output = Command::new(bin)
        .arg("remove-fps")
        .args(["-i", "/no/such/labels.txt", "-p", "/no/such/pred.txt", "-o"])
        .arg(fx.path("x.txt"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}
