//! Reference knowledge bases.
//!
//! All three tables are loaded once and then only read. They are handed to
//! the matchers by reference, so any number of analyses can share one
//! [`KnowledgeBases`] (typically behind an `Arc`).

pub mod clinvar;
pub mod disease;
pub mod traits;

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::KnowledgeBaseError;

pub use clinvar::{ClinVarEntry, ClinVarTable};
pub use disease::{DiseaseKnowledgeBase, ReferenceSnpEntry};
pub use traits::{TraitKnowledgeBase, TraitSnpEntry};

/// Where to load each table from; `None` means the built-in table, or no
/// ClinVar table at all.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeSources {
    pub disease_table: Option<PathBuf>,
    pub trait_table: Option<PathBuf>,
    pub clinvar: Option<PathBuf>,
}

/// The disease, trait and ClinVar tables used by one analyzer
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBases {
    pub disease: DiseaseKnowledgeBase,
    pub traits: TraitKnowledgeBase,
    pub clinvar: ClinVarTable,
    warnings: Vec<String>,
}

impl KnowledgeBases {
    pub fn new(
        disease: DiseaseKnowledgeBase,
        traits: TraitKnowledgeBase,
        clinvar: ClinVarTable,
    ) -> Self {
        Self {
            disease,
            traits,
            clinvar,
            warnings: Vec::new(),
        }
    }

    /// Built-in curated tables and an empty ClinVar table.
    pub fn builtin() -> Result<Self, KnowledgeBaseError> {
        Ok(Self::new(
            DiseaseKnowledgeBase::builtin()?,
            TraitKnowledgeBase::builtin()?,
            ClinVarTable::new(),
        ))
    }

    /// Load the curated tables (failing on a bad user-supplied table) and, on
    /// a best-effort basis, the ClinVar table.
    pub fn load(sources: &KnowledgeSources) -> Result<Self, KnowledgeBaseError> {
        let disease = match &sources.disease_table {
            Some(path) => DiseaseKnowledgeBase::from_path(path)?,
            None => DiseaseKnowledgeBase::builtin()?,
        };
        let traits = match &sources.trait_table {
            Some(path) => TraitKnowledgeBase::from_path(path)?,
            None => TraitKnowledgeBase::builtin()?,
        };
        info!(
            "Knowledge bases ready: {} disease SNPs, {} trait SNPs",
            disease.len(),
            traits.len()
        );

        let kb = Self::new(disease, traits, ClinVarTable::new());
        Ok(match &sources.clinvar {
            Some(path) => kb.with_clinvar_path(path),
            None => kb,
        })
    }

    /// Replace the ClinVar table with the one at `path`.
    ///
    /// A table that cannot be read leaves the ClinVar table empty and records
    /// a warning instead of failing.
    pub fn with_clinvar_path(mut self, path: &Path) -> Self {
        match ClinVarTable::load(path) {
            Ok(table) => self.clinvar = table,
            Err(e) => {
                let message = format!("Could not load ClinVar data from {}: {}", path.display(), e);
                warn!("{}", message);
                self.clinvar = ClinVarTable::new();
                self.warnings.push(message);
            }
        }
        self
    }

    /// Problems hit while loading that did not stop construction
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
