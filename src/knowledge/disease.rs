use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::KnowledgeBaseError;
use crate::types::RiskTier;

const BUILTIN_TABLE: &str = include_str!("../../data/disease_snps.toml");

/// Curated, clinically significant SNP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSnpEntry {
    pub rsid: String,
    pub gene: String,
    pub category: String,
    pub risk_allele: String,
    pub normal_allele: String,
    pub significance: RiskTier,
    pub condition: String,
    pub description: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Deserialize)]
struct DiseaseTableFile {
    #[serde(default)]
    snp: Vec<ReferenceSnpEntry>,
}

/// Curated disease SNP table keyed by lower-case rsID
#[derive(Debug, Clone, Default)]
pub struct DiseaseKnowledgeBase {
    entries: IndexMap<String, ReferenceSnpEntry>,
}

impl DiseaseKnowledgeBase {
    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self, KnowledgeBaseError> {
        Self::from_toml_str(BUILTIN_TABLE)
    }

    pub fn from_path(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let content = fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, KnowledgeBaseError> {
        let file: DiseaseTableFile = toml::from_str(content)?;
        Ok(Self::from_entries(file.snp))
    }

    pub fn from_entries<I: IntoIterator<Item = ReferenceSnpEntry>>(entries: I) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                entry.rsid = entry.rsid.to_lowercase();
                (entry.rsid.clone(), entry)
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, rsid: &str) -> Option<&ReferenceSnpEntry> {
        self.entries.get(&rsid.to_lowercase())
    }

    pub fn contains(&self, rsid: &str) -> bool {
        self.get(rsid).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceSnpEntry> {
        self.entries.values()
    }

    pub fn by_category(&self, category: &str) -> Vec<&ReferenceSnpEntry> {
        self.iter().filter(|e| e.category == category).collect()
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.iter().map(|e| e.category.as_str()).collect()
    }

    pub fn high_significance(&self) -> Vec<&ReferenceSnpEntry> {
        self.iter()
            .filter(|e| e.significance == RiskTier::High)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PHARMACOGENOMIC_CATEGORY;

    #[test]
    fn test_builtin_table_loads() {
        let kb = DiseaseKnowledgeBase::builtin().unwrap();
        assert_eq!(kb.len(), 27);

        let mthfr = kb.get("RS1801133").unwrap();
        assert_eq!(mthfr.gene, "MTHFR");
        assert_eq!(mthfr.risk_allele, "T");
        assert_eq!(mthfr.significance, RiskTier::Moderate);

        assert_eq!(kb.get("rs429358").unwrap().significance, RiskTier::High);
        assert_eq!(kb.get("rs7412").unwrap().significance, RiskTier::Beneficial);
    }

    #[test]
    fn test_queries() {
        let kb = DiseaseKnowledgeBase::builtin().unwrap();
        assert!(kb.categories().contains(PHARMACOGENOMIC_CATEGORY));
        assert!(!kb.by_category(PHARMACOGENOMIC_CATEGORY).is_empty());
        assert!(kb
            .high_significance()
            .iter()
            .all(|e| e.significance == RiskTier::High));
        assert!(kb.by_category("No Such Category").is_empty());
    }

    #[test]
    fn test_rejects_unknown_significance() {
        let table = r#"
[[snp]]
rsid = "rs1"
gene = "G"
category = "C"
risk_allele = "A"
normal_allele = "G"
significance = "severe"
condition = "X"
description = "Y"
"#;
        assert!(matches!(
            DiseaseKnowledgeBase::from_toml_str(table),
            Err(KnowledgeBaseError::Toml(_))
        ));
    }

    #[test]
    fn test_keys_lower_cased() {
        let table = r#"
[[snp]]
rsid = "RS42"
gene = "G"
category = "C"
risk_allele = "A"
normal_allele = "G"
significance = "low"
condition = "X"
description = "Y"
"#;
        let kb = DiseaseKnowledgeBase::from_toml_str(table).unwrap();
        assert!(kb.contains("rs42"));
        assert!(kb.get("rs42").unwrap().recommendations.is_empty());
    }
}
