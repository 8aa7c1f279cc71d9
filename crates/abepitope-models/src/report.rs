//! CSV reports written to the output directory.
use crate::evaluator::Prediction;
use abepitope_core::EncodingRecord;
use anyhow::{bail, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "output.csv";
pub const RESIDUE_DIR: &str = "residue_scores";

fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// One row per complex.
pub fn write_summary(outdir: &Path, predictions: &[Prediction]) -> Result<PathBuf> {
    let mut df = df!(
        "file_name" => predictions.iter().map(|p| p.name.clone()).collect::<Vec<_>>(),
        "AbEpiScore" => predictions.iter().map(|p| p.abepiscore).collect::<Vec<_>>(),
        "AbEpiTarget" => predictions.iter().map(|p| p.abepitarget).collect::<Vec<_>>(),
        "epitope_residues" => predictions.iter().map(|p| p.epitope_residues as u32).collect::<Vec<_>>(),
        "antigen_chains" => predictions.iter().map(|p| p.antigen_chains.join(";")).collect::<Vec<_>>(),
    )?;
    let path = outdir.join(SUMMARY_FILE);
    write_csv(&path, &mut df)?;
    Ok(path)
}

/// One row per residue of `record`.
pub fn write_residue_scores(outdir: &Path, record: &EncodingRecord, scores: &[f32]) -> Result<PathBuf> {
    if scores.len() != record.residues.len() {
        bail!(
            "{}: {} residue scores for {} residues",
            record.name,
            scores.len(),
            record.residues.len()
        );
    }
    let residues = &record.residues;
    let mut df = df!(
        "chain" => residues.iter().map(|r| r.chain.clone()).collect::<Vec<_>>(),
        "residue" => residues.iter().map(|r| r.number as i64).collect::<Vec<_>>(),
        "insertion_code" => residues.iter().map(|r| r.insertion_code.clone().unwrap_or_default()).collect::<Vec<_>>(),
        "amino_acid" => residues.iter().map(|r| r.aa.to_string()).collect::<Vec<_>>(),
        "role" => residues.iter().map(|r| r.role.to_string()).collect::<Vec<_>>(),
        "interface" => residues.iter().map(|r| r.interface).collect::<Vec<_>>(),
        "score" => scores.to_vec(),
    )?;
    let dir = outdir.join(RESIDUE_DIR);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.csv", record.name));
    write_csv(&path, &mut df)?;
    Ok(path)
}
