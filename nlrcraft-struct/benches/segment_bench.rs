use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nlrcraft_struct::pdb::{parse_pdb_atoms, parse_structure_record};
use nlrcraft_struct::plddt::filter_low_plddt;
use nlrcraft_struct::residue_map::ResidueLookup;
use nlrcraft_struct::segment::segment;

/// Generate a synthetic predicted model with `n_residues` residues in chain A.
/// Every fifth residue has low confidence, leaving gaps after filtering.
fn synthetic_pdb(n_residues: usize) -> String {
    let mut lines = Vec::new();
    let mut serial = 1;
    let residues = ["ALA", "GLY", "VAL", "LEU", "ILE"];
    for i in 0..n_residues {
        let resname = residues[i % residues.len()];
        let plddt = if i % 5 == 4 { 42.0 } else { 87.5 };
        let rise = i as f64 * 1.5;
        for (name, dx) in [("N ", 0.0_f64), ("CA", 1.458), ("C ", 2.009), ("O ", 1.246)] {
            lines.push(format!(
                "ATOM  {:>5}  {}  {} A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00{:>6.2}           {}",
                serial,
                name,
                resname,
                i + 1,
                dx,
                0.0,
                rise,
                plddt,
                &name[..1]
            ));
            serial += 1;
        }
    }
    lines.push("END".to_string());
    lines.join("\n")
}

fn bench_filter(c: &mut Criterion) {
    let pdb = synthetic_pdb(2500);
    let atoms = parse_pdb_atoms(&pdb).unwrap();
    c.bench_function("plddt_filter_10k_atoms", |b| {
        b.iter(|| filter_low_plddt(black_box(&atoms), 60.0))
    });
}

fn bench_map_and_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("nbs_split");
    let record = parse_structure_record("BENCH", &synthetic_pdb(2500));

    group.bench_function("lookup_10k_atoms", |b| {
        b.iter(|| ResidueLookup::from_record(black_box(&record)))
    });

    let lookup = ResidueLookup::from_record(&record);
    let span = lookup.map_span(400, 1200).span().unwrap();
    group.bench_function("segment_10k_atoms", |b| {
        b.iter(|| segment(black_box(&record), span).len())
    });

    group.finish();
}

criterion_group!(benches, bench_filter, bench_map_and_segment);
criterion_main!(benches);
