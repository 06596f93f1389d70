//! Analysis pipeline: parse an export, run the disease-risk and trait
//! matchers side by side, and fold both results into one summary.

pub mod disease;
pub mod traits;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::{AnalysisError, ParseError};
use crate::knowledge::KnowledgeBases;
use crate::parsers::VariantParser;
use crate::types::*;

pub use disease::{DiseaseRiskMatcher, DiseaseRiskResult, MatchSource, VariantMatch};
pub use traits::{TraitFinding, TraitMatcher, TraitsAnalysisResult};

/// Finding count for one disease category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Headline numbers handed to the calling service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingsSummary {
    pub total_snps_analyzed: usize,
    pub clinvar_matches: usize,
    pub high_risk_variants: usize,
    pub moderate_risk_variants: usize,
    pub low_risk_variants: usize,
    pub beneficial_variants: usize,
    pub pharmacogenomic_variants: usize,
    pub traits_analyzed: usize,
    pub categories: Vec<CategoryCount>,
}

impl FindingsSummary {
    pub fn new(risk: &DiseaseRiskResult, traits: &TraitsAnalysisResult) -> Self {
        Self {
            total_snps_analyzed: risk.total_variants_analyzed,
            clinvar_matches: risk.clinvar_matches,
            high_risk_variants: risk.high_risk_variants.len(),
            moderate_risk_variants: risk.moderate_risk_variants.len(),
            low_risk_variants: risk.low_risk_variants.len(),
            beneficial_variants: risk.beneficial_variants.len(),
            pharmacogenomic_variants: risk.pharmacogenomic_variants.len(),
            traits_analyzed: traits.traits_found,
            categories: risk
                .categories
                .iter()
                .map(|(category, count)| CategoryCount {
                    category: category.clone(),
                    count: *count,
                })
                .collect(),
        }
    }
}

/// Complete output of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub snp_count: usize,
    pub findings_summary: FindingsSummary,
    pub risk_result: DiseaseRiskResult,
    pub traits_result: TraitsAnalysisResult,
    /// Non-fatal problems, such as a ClinVar table that could not be loaded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Runs the parse / match / summarize pipeline against shared knowledge bases
#[derive(Debug, Clone)]
pub struct Analyzer {
    knowledge: Arc<KnowledgeBases>,
}

impl Analyzer {
    pub fn new(knowledge: Arc<KnowledgeBases>) -> Self {
        Self { knowledge }
    }

    pub fn warnings(&self) -> &[String] {
        self.knowledge.warnings()
    }

    /// Analyze export text in the given format.
    pub fn analyze_text(
        &self,
        content: &str,
        format: SourceFormat,
    ) -> Result<AnalysisResult, AnalysisError> {
        let variants = VariantParser::new(format).parse_str(content)?;
        self.analyze_variants(&variants)
    }

    /// Analyze an export file in the given format.
    pub fn analyze_path(
        &self,
        path: &Path,
        format: SourceFormat,
    ) -> Result<AnalysisResult, AnalysisError> {
        let variants = VariantParser::new(format).parse_path(path)?;
        self.analyze_variants(&variants)
    }

    /// Run both matchers over an already parsed variant set.
    pub fn analyze_variants(
        &self,
        variants: &VariantSet,
    ) -> Result<AnalysisResult, AnalysisError> {
        if variants.is_empty() {
            return Err(ParseError::EmptyInput.into());
        }

        let kb = &*self.knowledge;
        let disease_matcher = DiseaseRiskMatcher::new(&kb.disease, &kb.clinvar);
        let trait_matcher = TraitMatcher::new(&kb.traits);

        let (risk_result, traits_result) = rayon::join(
            || disease_matcher.analyze(variants),
            || trait_matcher.analyze(variants),
        );

        info!(
            "Analyzed {} variants: {} high, {} moderate, {} traits found, {} not available",
            variants.len(),
            risk_result.high_risk_variants.len(),
            risk_result.moderate_risk_variants.len(),
            traits_result.traits_found,
            traits_result.traits_not_found
        );

        Ok(AnalysisResult {
            snp_count: variants.len(),
            findings_summary: FindingsSummary::new(&risk_result, &traits_result),
            risk_result,
            traits_result,
            warnings: kb.warnings().to_vec(),
        })
    }
}
