use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use serde_json::to_string_pretty;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisResult, MatchSource};
use crate::types::Zygosity;

/// Supported report formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Full result as pretty-printed JSON
    #[default]
    Json,
    /// Flat risk and trait finding tables
    Tsv,
    All,
}

/// Writes analysis results into an output directory
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: &Path) -> Result<Self> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate reports for one analysed file, returning the paths written.
    ///
    /// `stem` names the input (usually its file stem) and prefixes every file.
    pub fn generate(
        &self,
        stem: &str,
        result: &AnalysisResult,
        format: ReportFormat,
    ) -> Result<Vec<PathBuf>> {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let mut written = Vec::new();

        match format {
            ReportFormat::Json => {
                written.push(self.generate_json_report(stem, &timestamp, result)?);
            }
            ReportFormat::Tsv => {
                written.push(self.generate_risk_tsv(stem, &timestamp, result)?);
                written.push(self.generate_traits_tsv(stem, &timestamp, result)?);
            }
            ReportFormat::All => {
                written.push(self.generate_json_report(stem, &timestamp, result)?);
                written.push(self.generate_risk_tsv(stem, &timestamp, result)?);
                written.push(self.generate_traits_tsv(stem, &timestamp, result)?);
            }
        }

        Ok(written)
    }

    fn generate_json_report(
        &self,
        stem: &str,
        timestamp: &str,
        result: &AnalysisResult,
    ) -> Result<PathBuf> {
        let filename = self
            .output_dir
            .join(format!("{}_report_{}.json", stem, timestamp));

        let json_content =
            to_string_pretty(result).with_context(|| "Failed to serialize results to JSON")?;

        fs::write(&filename, json_content)
            .with_context(|| format!("Failed to write JSON report to {}", filename.display()))?;

        Ok(filename)
    }

    fn generate_risk_tsv(
        &self,
        stem: &str,
        timestamp: &str,
        result: &AnalysisResult,
    ) -> Result<PathBuf> {
        let filename = self
            .output_dir
            .join(format!("{}_disease_risk_{}.tsv", stem, timestamp));

        let mut wtr = WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&filename)
            .with_context(|| format!("Failed to create TSV writer for {}", filename.display()))?;

        wtr.write_record([
            "rsid",
            "gene",
            "condition",
            "risk_level",
            "clinical_significance",
            "genotype",
            "zygosity",
            "category",
            "source",
        ])?;

        for finding in result.risk_result.findings() {
            let zygosity = match finding.zygosity {
                Some(Zygosity::Homozygous) => "homozygous",
                Some(Zygosity::Heterozygous) => "heterozygous",
                Some(Zygosity::Absent) => "absent",
                None => "",
            };
            let source = match finding.source {
                MatchSource::Curated => "curated",
                MatchSource::ClinVar => "clinvar",
            };
            let record: [&str; 9] = [
                &finding.rsid,
                &finding.gene,
                &finding.condition,
                finding.risk_level.as_str(),
                &finding.clinical_significance,
                &finding.genotype,
                zygosity,
                &finding.category,
                source,
            ];
            wtr.write_record(record)?;
        }

        wtr.flush()?;
        Ok(filename)
    }

    fn generate_traits_tsv(
        &self,
        stem: &str,
        timestamp: &str,
        result: &AnalysisResult,
    ) -> Result<PathBuf> {
        let filename = self
            .output_dir
            .join(format!("{}_traits_{}.tsv", stem, timestamp));

        let mut wtr = WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&filename)
            .with_context(|| format!("Failed to create TSV writer for {}", filename.display()))?;

        wtr.write_record([
            "rsid",
            "gene",
            "category",
            "trait",
            "genotype",
            "risk_allele_count",
            "effect",
        ])?;

        for finding in result.traits_result.results_by_category.values().flatten() {
            let count = finding.risk_allele_count.to_string();
            let record: [&str; 7] = [
                &finding.rsid,
                &finding.gene,
                finding.category.label(),
                &finding.trait_name,
                &finding.genotype,
                &count,
                &finding.effect,
            ];
            wtr.write_record(record)?;
        }

        wtr.flush()?;
        Ok(filename)
    }
}
