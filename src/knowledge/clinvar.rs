use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::KnowledgeBaseError;
use crate::parsers::open_file;

const RS_COLUMN: &str = "RS# (dbSNP)";
const SIGNIFICANCE_COLUMN: &str = "ClinicalSignificance";

/// One ClinVar classification, keyed by `rs<number>` in [`ClinVarTable`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinVarEntry {
    pub gene: String,
    pub phenotypes: Vec<String>,
    pub clinical_significance: String,
    pub review_status: String,
    pub chromosome: String,
    pub position: String,
}

/// Row of a ClinVar `variant_summary`-style TSV
#[derive(Debug, Deserialize)]
struct ClinVarRow {
    #[serde(rename = "RS# (dbSNP)")]
    rs_number: String,
    #[serde(rename = "GeneSymbol", default)]
    gene_symbol: String,
    #[serde(rename = "PhenotypeList", default)]
    phenotype_list: String,
    #[serde(rename = "ClinicalSignificance")]
    clinical_significance: String,
    #[serde(rename = "ReviewStatus", default)]
    review_status: String,
    #[serde(rename = "Chromosome", default)]
    chromosome: String,
    #[serde(rename = "PositionVCF", default)]
    position_vcf: String,
}

impl ClinVarRow {
    /// `rs<number>` key, or `None` when the row carries no usable RS number.
    fn rsid(&self) -> Option<String> {
        let raw = self.rs_number.trim();
        let digits = raw.strip_prefix("rs").unwrap_or(raw);
        let number: u64 = digits.parse().ok()?;
        Some(format!("rs{}", number))
    }

    fn into_entry(self) -> ClinVarEntry {
        ClinVarEntry {
            gene: self.gene_symbol,
            phenotypes: self
                .phenotype_list
                .split('|')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            clinical_significance: self.clinical_significance,
            review_status: self.review_status,
            chromosome: self.chromosome,
            position: self.position_vcf,
        }
    }
}

/// Bulk ClinVar import
#[derive(Debug, Clone, Default)]
pub struct ClinVarTable {
    entries: HashMap<String, ClinVarEntry>,
}

impl ClinVarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a tab-separated ClinVar export; `.gz` files are decompressed.
    pub fn load(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let reader = open_file(path).map_err(|source| KnowledgeBaseError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(reader)?;
        info!(
            "Loaded {} ClinVar entries from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, KnowledgeBaseError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for required in [RS_COLUMN, SIGNIFICANCE_COLUMN] {
            if !headers.iter().any(|h| h == required) {
                return Err(KnowledgeBaseError::MissingColumn(required.to_string()));
            }
        }

        let mut entries = HashMap::new();
        let mut skipped = 0usize;
        for row in csv_reader.deserialize::<ClinVarRow>() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    debug!("Skipping malformed ClinVar row: {}", e);
                    skipped += 1;
                    continue;
                }
            };
            match row.rsid() {
                Some(rsid) => {
                    entries.insert(rsid, row.into_entry());
                }
                None => skipped += 1,
            }
        }

        debug!("Skipped {} ClinVar rows without a usable RS number", skipped);
        Ok(Self { entries })
    }

    pub fn from_entries<I: IntoIterator<Item = (String, ClinVarEntry)>>(entries: I) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(rsid, entry)| (rsid.to_lowercase(), entry))
                .collect(),
        }
    }

    pub fn get(&self, rsid: &str) -> Option<&ClinVarEntry> {
        self.entries.get(rsid)
    }

    pub fn contains(&self, rsid: &str) -> bool {
        self.entries.contains_key(rsid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
