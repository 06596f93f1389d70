use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::KnowledgeBaseError;
use crate::types::TraitCategory;

const BUILTIN_TABLE: &str = include_str!("../../data/trait_snps.toml");

/// SNP associated with a personal trait or wellness characteristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitSnpEntry {
    pub rsid: String,
    pub gene: String,
    pub category: TraitCategory,
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub risk_allele: String,
    pub effect: String,
    pub description: String,
    #[serde(default)]
    pub references: Vec<String>,
}

#[derive(Deserialize)]
struct TraitTableFile {
    #[serde(default, rename = "trait")]
    traits: Vec<TraitSnpEntry>,
}

/// Trait SNP table.
///
/// Kept as an ordered list rather than a map: the same rsID can describe
/// different traits in different categories, and each entry is checked on
/// its own.
#[derive(Debug, Clone, Default)]
pub struct TraitKnowledgeBase {
    entries: Vec<TraitSnpEntry>,
}

impl TraitKnowledgeBase {
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
        let file: TraitTableFile = toml::from_str(content)?;
        Ok(Self::from_entries(file.traits))
    }

    pub fn from_entries<I: IntoIterator<Item = TraitSnpEntry>>(entries: I) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                entry.rsid = entry.rsid.to_lowercase();
                entry
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraitSnpEntry> {
        self.entries.iter()
    }

    pub fn by_category(&self, category: TraitCategory) -> Vec<&TraitSnpEntry> {
        self.iter().filter(|e| e.category == category).collect()
    }

    pub fn rsids(&self) -> BTreeSet<&str> {
        self.iter().map(|e| e.rsid.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_loads() {
        let kb = TraitKnowledgeBase::builtin().unwrap();
        assert_eq!(kb.len(), 51);

        let per_category: usize = TraitCategory::ALL
            .iter()
            .map(|c| kb.by_category(*c).len())
            .sum();
        assert_eq!(per_category, kb.len());
        assert!(!kb.by_category(TraitCategory::MentalHealth).is_empty());
    }

    #[test]
    fn test_shared_rsid_kept_per_category() {
        let kb = TraitKnowledgeBase::builtin().unwrap();
        let comt: Vec<_> = kb.iter().filter(|e| e.rsid == "rs4680").collect();
        assert!(comt.len() >= 2);
        assert!(comt.iter().any(|e| e.category == TraitCategory::Sensitivity));
        assert!(kb.rsids().len() < kb.len());
    }

    #[test]
    fn test_rejects_unknown_category() {
        let table = r#"
[[trait]]
rsid = "rs1"
gene = "G"
category = "Astrology"
trait = "T"
risk_allele = "A"
effect = "E"
description = "D"
"#;
        assert!(TraitKnowledgeBase::from_toml_str(table).is_err());
    }
}
