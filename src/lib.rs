//! # Allele Insight
//!
//! Parses raw genotype exports from consumer DNA-testing services and
//! interprets them against curated disease-risk and trait tables, plus an
//! optional bulk ClinVar table.
//!
//! ## Features
//!
//! - Seven source formats (23andMe, AncestryDNA, MyHeritage, FTDNA, Genera,
//!   single-sample VCF and a generic fallback), plain, gzip or zip
//! - Disease-risk findings partitioned by tier, with zygosity-aware downgrading
//! - Trait findings grouped by category, with coverage of the trait table
//! - Both matchers run in parallel over shared, read-only knowledge bases
//! - JSON and TSV reports

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod error;
pub mod knowledge;
pub mod output;
pub mod parsers;
pub mod types;

// Re-export key types
pub use analysis::{
    AnalysisResult, Analyzer, DiseaseRiskMatcher, DiseaseRiskResult, FindingsSummary,
    TraitMatcher, TraitsAnalysisResult,
};
pub use config::Settings;
pub use discovery::FileDiscovery;
pub use error::{AnalysisError, KnowledgeBaseError, ParseError};
pub use knowledge::{KnowledgeBases, KnowledgeSources};
pub use output::{ReportFormat, ReportGenerator};
pub use parsers::{detect_format, parse, VariantParser};
pub use types::*;
