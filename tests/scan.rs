use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn input_file_doesnt_exist() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME"))?;
    cmd.args(vec![
        "scan",
        "--fasta",
        "file/doesnt/exist.fasta",
        "--motifs",
        "tests/cases/motifs.dat",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));

    Ok(())
}

#[test]
fn scan_writes_domain_report() -> Result<(), Box<dyn std::error::Error>> {
    let outdir = tempfile::tempdir()?;

    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME"))?;
    cmd.args(vec![
        "scan",
        "--fasta",
        "tests/cases/filtered.fasta",
        "--motifs",
        "tests/cases/motifs.dat",
        "--outdir",
    ]);
    cmd.arg(outdir.path());

    cmd.assert().success();

    let report = std::fs::read_to_string(outdir.path().join("domains.txt"))?;
    assert_eq!(
        report,
        ">query1\n-------------\n\
         Domain\tAccession\tDescription\tSequence\n\
         ASN_GLYCOSYLATION\tPS00001\tN-glycosylation site.\tNGSD\n\
         AXC_MOTIF\tPS90001\tSynthetic A-x-C motif.\tAXC\n\n\
         >b0001@REC1\n-------------\n\
         Domain\tAccession\tDescription\tSequence\n\
         AXC_MOTIF\tPS90001\tSynthetic A-x-C motif.\tAXC\n\n\
         >b0002@REC1\n-------------\n\
         Domain\tAccession\tDescription\tSequence\n\n"
    );

    Ok(())
}

#[test]
fn scan_writes_layouts_only_for_matched_proteins() -> Result<(), Box<dyn std::error::Error>> {
    let outdir = tempfile::tempdir()?;

    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME"))?;
    cmd.args(vec![
        "scan",
        "--fasta",
        "tests/cases/filtered.fasta",
        "--motifs",
        "tests/cases/motifs.dat",
        "--outdir",
    ]);
    cmd.arg(outdir.path());

    cmd.assert().success();

    let layouts = outdir.path().join("layouts");
    let query_layout = std::fs::read_to_string(layouts.join("query1.tsv"))?;
    assert_eq!(
        query_layout,
        "ASN_GLYCOSYLATION\t5\t9\t9\nAXC_MOTIF\t2\t5\t9\n"
    );

    let hit_layout = std::fs::read_to_string(layouts.join("b0001@REC1.tsv"))?;
    assert_eq!(hit_layout, "AXC_MOTIF\t0\t3\t8\n");

    // the protein without matches has no layout artifact at all
    assert!(!layouts.join("b0002@REC1.tsv").exists());

    Ok(())
}

#[test]
fn lenient_mode_warns_about_broken_patterns() -> Result<(), Box<dyn std::error::Error>> {
    let outdir = tempfile::tempdir()?;

    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME"))?;
    cmd.args(vec![
        "scan",
        "--fasta",
        "tests/cases/filtered.fasta",
        "--motifs",
        "tests/cases/motifs.dat",
        "--outdir",
    ]);
    cmd.arg(outdir.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("BROKEN_MOTIF"));

    Ok(())
}

#[test]
fn strict_mode_fails_on_broken_patterns() -> Result<(), Box<dyn std::error::Error>> {
    let outdir = tempfile::tempdir()?;

    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME"))?;
    cmd.args(vec![
        "scan",
        "--fasta",
        "tests/cases/filtered.fasta",
        "--motifs",
        "tests/cases/motifs.dat",
        "--pattern-mode",
        "strict",
        "--outdir",
    ]);
    cmd.arg(outdir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("BROKEN_MOTIF"));

    Ok(())
}

#[test]
fn repeated_scans_are_byte_identical() -> Result<(), Box<dyn std::error::Error>> {
    let first_dir = tempfile::tempdir()?;
    let second_dir = tempfile::tempdir()?;

    for outdir in [&first_dir, &second_dir] {
        let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME"))?;
        cmd.args(vec![
            "scan",
            "--fasta",
            "tests/cases/filtered.fasta",
            "--motifs",
            "tests/cases/motifs.dat",
            "--outdir",
        ]);
        cmd.arg(outdir.path());
        cmd.assert().success();
    }

    let first = std::fs::read(first_dir.path().join("domains.txt"))?;
    let second = std::fs::read(second_dir.path().join("domains.txt"))?;
    assert_eq!(first, second);

    Ok(())
}
