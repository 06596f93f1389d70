use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::knowledge::{ClinVarEntry, ClinVarTable, DiseaseKnowledgeBase, ReferenceSnpEntry};
use crate::types::*;

/// Which table produced a finding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Curated,
    ClinVar,
}

/// A variant that matched a disease-risk entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantMatch {
    pub rsid: String,
    pub genotype: String,
    pub gene: String,
    pub condition: String,
    /// Significance as stated by the source table
    pub clinical_significance: String,
    /// Tier the finding is filed under after zygosity is applied
    pub risk_level: RiskTier,
    /// `None` for ClinVar findings, which are not allele-counted
    pub zygosity: Option<Zygosity>,
    pub description: String,
    pub recommendations: Vec<String>,
    pub category: String,
    pub source: MatchSource,
}

/// Disease findings partitioned by tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRiskResult {
    pub total_variants_analyzed: usize,
    pub clinvar_matches: usize,
    pub high_risk_variants: Vec<VariantMatch>,
    pub moderate_risk_variants: Vec<VariantMatch>,
    pub low_risk_variants: Vec<VariantMatch>,
    pub beneficial_variants: Vec<VariantMatch>,
    pub pharmacogenomic_variants: Vec<VariantMatch>,
    pub categories: BTreeMap<String, usize>,
}

impl DiseaseRiskResult {
    pub fn bucket(&self, tier: RiskTier) -> &[VariantMatch] {
        match tier {
            RiskTier::High => &self.high_risk_variants,
            RiskTier::Moderate => &self.moderate_risk_variants,
            RiskTier::Low => &self.low_risk_variants,
            RiskTier::Beneficial => &self.beneficial_variants,
        }
    }

    /// Every tier-bucketed finding, high tier first.
    pub fn findings(&self) -> impl Iterator<Item = &VariantMatch> {
        self.high_risk_variants
            .iter()
            .chain(&self.moderate_risk_variants)
            .chain(&self.low_risk_variants)
            .chain(&self.beneficial_variants)
    }

    fn file(&mut self, finding: VariantMatch) {
        *self.categories.entry(finding.category.clone()).or_insert(0) += 1;
        if finding.source == MatchSource::Curated && finding.category == PHARMACOGENOMIC_CATEGORY
        {
            self.pharmacogenomic_variants.push(finding.clone());
        }
        match finding.risk_level {
            RiskTier::High => self.high_risk_variants.push(finding),
            RiskTier::Moderate => self.moderate_risk_variants.push(finding),
            RiskTier::Low => self.low_risk_variants.push(finding),
            RiskTier::Beneficial => self.beneficial_variants.push(finding),
        }
    }
}

/// Only exactly two copies keep the full tier; any other non-zero count,
/// such as an insertion allele decoding to three letters, reads as a carrier.
fn risk_zygosity(count: usize) -> Zygosity {
    match count {
        0 => Zygosity::Absent,
        2 => Zygosity::Homozygous,
        _ => Zygosity::Heterozygous,
    }
}

/// Matches parsed variants against the curated disease table and ClinVar
pub struct DiseaseRiskMatcher<'kb> {
    snps: &'kb DiseaseKnowledgeBase,
    clinvar: &'kb ClinVarTable,
}

impl<'kb> DiseaseRiskMatcher<'kb> {
    pub fn new(snps: &'kb DiseaseKnowledgeBase, clinvar: &'kb ClinVarTable) -> Self {
        Self { snps, clinvar }
    }

    pub fn analyze(&self, variants: &VariantSet) -> DiseaseRiskResult {
        let mut result = DiseaseRiskResult {
            total_variants_analyzed: variants.len(),
            ..Default::default()
        };

        for variant in variants.iter() {
            let rsid = variant.variant_id.as_str();
            let curated = self.snps.get(rsid);

            if let Some(entry) = curated {
                if let Some(finding) = self.evaluate_snp_match(rsid, &variant.genotype, entry) {
                    result.file(finding);
                }
            }

            if let Some(entry) = self.clinvar.get(rsid) {
                result.clinvar_matches += 1;
                // The curated table takes precedence over ClinVar for the same rsID.
                if curated.is_none() {
                    if let Some(finding) = self.clinvar_match(rsid, &variant.genotype, entry) {
                        result.file(finding);
                    }
                }
            }
        }

        debug!(
            "Disease matching: {} high, {} moderate, {} low, {} beneficial, {} ClinVar hits",
            result.high_risk_variants.len(),
            result.moderate_risk_variants.len(),
            result.low_risk_variants.len(),
            result.beneficial_variants.len(),
            result.clinvar_matches
        );
        result
    }

    fn evaluate_snp_match(
        &self,
        rsid: &str,
        genotype: &str,
        entry: &ReferenceSnpEntry,
    ) -> Option<VariantMatch> {
        let genotype = normalize_genotype(genotype);
        let zygosity = risk_zygosity(count_allele(&genotype, &entry.risk_allele));

        let (risk_level, description) = match zygosity {
            Zygosity::Absent => return None,
            Zygosity::Homozygous => (
                entry.significance,
                format!("Homozygous for risk variant. {}", entry.description),
            ),
            Zygosity::Heterozygous => (
                entry.significance.heterozygous(),
                format!("Heterozygous carrier. {}", entry.description),
            ),
        };

        Some(VariantMatch {
            rsid: rsid.to_string(),
            genotype,
            gene: entry.gene.clone(),
            condition: entry.condition.clone(),
            clinical_significance: entry.significance.to_string(),
            risk_level,
            zygosity: Some(zygosity),
            description,
            recommendations: entry.recommendations.clone(),
            category: entry.category.clone(),
            source: MatchSource::Curated,
        })
    }

    fn clinvar_match(
        &self,
        rsid: &str,
        genotype: &str,
        entry: &ClinVarEntry,
    ) -> Option<VariantMatch> {
        let risk_level = clinvar_tier(&entry.clinical_significance)?;

        let gene = if entry.gene.is_empty() {
            "Unknown".to_string()
        } else {
            entry.gene.clone()
        };
        let condition = if entry.phenotypes.is_empty() {
            "Unknown condition".to_string()
        } else {
            entry.phenotypes.join("; ")
        };

        Some(VariantMatch {
            rsid: rsid.to_string(),
            genotype: normalize_genotype(genotype),
            gene,
            condition,
            clinical_significance: entry.clinical_significance.clone(),
            risk_level,
            zygosity: None,
            description: format!("ClinVar classification: {}", entry.clinical_significance),
            recommendations: vec![
                "Consult with a genetic counselor for interpretation".to_string(),
            ],
            category: CLINVAR_CATEGORY.to_string(),
            source: MatchSource::ClinVar,
        })
    }
}

/// Tier for a ClinVar significance string, or `None` if it is not reportable.
pub fn clinvar_tier(significance: &str) -> Option<RiskTier> {
    let lower = significance.to_lowercase();
    if lower.contains("likely pathogenic") {
        Some(RiskTier::Moderate)
    } else if lower.contains("pathogenic") {
        Some(RiskTier::High)
    } else if lower.contains("risk factor") {
        Some(RiskTier::Moderate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn entry(rsid: &str, category: &str, risk: &str, tier: RiskTier) -> ReferenceSnpEntry {
        ReferenceSnpEntry {
            rsid: rsid.to_string(),
            gene: "GENE".to_string(),
            category: category.to_string(),
            risk_allele: risk.to_string(),
            normal_allele: "C".to_string(),
            significance: tier,
            condition: "Condition".to_string(),
            description: "Description.".to_string(),
            recommendations: vec!["Talk to a doctor".to_string()],
        }
    }

    fn clinvar(significance: &str) -> ClinVarEntry {
        ClinVarEntry {
            gene: "BRCA1".to_string(),
            phenotypes: vec!["Hereditary cancer".to_string()],
            clinical_significance: significance.to_string(),
            review_status: "reviewed".to_string(),
            chromosome: "17".to_string(),
            position: "1".to_string(),
        }
    }

    fn variants(calls: &[(&str, &str)]) -> VariantSet {
        calls
            .iter()
            .map(|(id, gt)| VariantRecord {
                variant_id: id.to_string(),
                chromosome: "1".to_string(),
                position: "1".to_string(),
                genotype: gt.to_string(),
            })
            .collect()
    }

    #[rstest]
    #[case(RiskTier::High, "TT", Some(RiskTier::High))]
    #[case(RiskTier::High, "CT", Some(RiskTier::Moderate))]
    #[case(RiskTier::Moderate, "TT", Some(RiskTier::Moderate))]
    #[case(RiskTier::Moderate, "TC", Some(RiskTier::Low))]
    #[case(RiskTier::Low, "tc", Some(RiskTier::Low))]
    #[case(RiskTier::Beneficial, "TT", Some(RiskTier::Beneficial))]
    #[case(RiskTier::Beneficial, "CT", Some(RiskTier::Low))]
    #[case(RiskTier::High, "CC", None)]
    #[case(RiskTier::High, "--", None)]
    #[case(RiskTier::High, "TTT", Some(RiskTier::Moderate))]
    #[case(RiskTier::Moderate, "TTT", Some(RiskTier::Low))]
    fn test_zygosity_tiers(
        #[case] tier: RiskTier,
        #[case] genotype: &str,
        #[case] expected: Option<RiskTier>,
    ) {
        let snps =
            DiseaseKnowledgeBase::from_entries(vec![entry("rs1", "Cardiovascular", "T", tier)]);
        let clinvar = ClinVarTable::new();
        let result =
            DiseaseRiskMatcher::new(&snps, &clinvar).analyze(&variants(&[("rs1", genotype)]));

        let found: Vec<RiskTier> = result.findings().map(|m| m.risk_level).collect();
        assert_eq!(found, expected.into_iter().collect::<Vec<_>>());
        if let Some(tier) = expected {
            assert_eq!(result.bucket(tier).len(), 1);
            assert_eq!(result.categories.get("Cardiovascular"), Some(&1));
        } else {
            assert!(result.categories.is_empty());
        }
    }

    #[test]
    fn test_descriptions_prefixed() {
        let snps = DiseaseKnowledgeBase::from_entries(vec![
            entry("rs1", "Cardiovascular", "T", RiskTier::High),
            entry("rs2", "Cardiovascular", "T", RiskTier::High),
        ]);
        let clinvar = ClinVarTable::new();
        let result = DiseaseRiskMatcher::new(&snps, &clinvar)
            .analyze(&variants(&[("rs1", "TT"), ("rs2", "CT")]));

        assert_eq!(
            result.high_risk_variants[0].description,
            "Homozygous for risk variant. Description."
        );
        assert_eq!(
            result.moderate_risk_variants[0].description,
            "Heterozygous carrier. Description."
        );
        assert_eq!(result.high_risk_variants[0].clinical_significance, "high");
    }

    #[test]
    fn test_pharmacogenomic_findings_in_two_buckets() {
        let snps = DiseaseKnowledgeBase::from_entries(vec![entry(
            "rs4244285",
            PHARMACOGENOMIC_CATEGORY,
            "A",
            RiskTier::High,
        )]);
        let clinvar = ClinVarTable::new();
        let result =
            DiseaseRiskMatcher::new(&snps, &clinvar).analyze(&variants(&[("rs4244285", "AA")]));

        assert_eq!(result.high_risk_variants.len(), 1);
        assert_eq!(result.pharmacogenomic_variants.len(), 1);
        assert_eq!(result.categories.get(PHARMACOGENOMIC_CATEGORY), Some(&1));
    }

    #[test]
    fn test_curated_entry_suppresses_clinvar_duplicate() {
        let snps = DiseaseKnowledgeBase::from_entries(vec![entry(
            "rs1",
            "Cardiovascular",
            "T",
            RiskTier::High,
        )]);
        let clinvar =
            ClinVarTable::from_entries(vec![("rs1".to_string(), clinvar("Pathogenic"))]);
        let result =
            DiseaseRiskMatcher::new(&snps, &clinvar).analyze(&variants(&[("rs1", "TT")]));

        assert_eq!(result.clinvar_matches, 1);
        assert_eq!(result.high_risk_variants.len(), 1);
        assert_eq!(result.high_risk_variants[0].source, MatchSource::Curated);
        assert!(!result.categories.contains_key(CLINVAR_CATEGORY));
    }

    #[test]
    fn test_clinvar_findings() {
        let snps = DiseaseKnowledgeBase::default();
        let clinvar = ClinVarTable::from_entries(vec![
            ("rs10".to_string(), clinvar("Pathogenic")),
            ("rs11".to_string(), clinvar("Likely pathogenic")),
            ("rs12".to_string(), clinvar("Benign")),
            ("rs13".to_string(), clinvar("risk factor")),
        ]);
        let result = DiseaseRiskMatcher::new(&snps, &clinvar).analyze(&variants(&[
            ("rs10", "AG"),
            ("rs11", "AG"),
            ("rs12", "AG"),
            ("rs13", "AG"),
            ("rs14", "AG"),
        ]));

        assert_eq!(result.total_variants_analyzed, 5);
        assert_eq!(result.clinvar_matches, 4);
        assert_eq!(result.high_risk_variants.len(), 1);
        assert_eq!(result.high_risk_variants[0].rsid, "rs10");
        assert_eq!(result.high_risk_variants[0].category, CLINVAR_CATEGORY);
        assert_eq!(result.high_risk_variants[0].condition, "Hereditary cancer");
        let moderate: Vec<_> = result
            .moderate_risk_variants
            .iter()
            .map(|m| m.rsid.as_str())
            .collect();
        assert_eq!(moderate, vec!["rs11", "rs13"]);
        assert_eq!(result.categories.get(CLINVAR_CATEGORY), Some(&3));
        assert!(result.pharmacogenomic_variants.is_empty());
    }

    #[test]
    fn test_vcf_insertion_reads_as_carrier() {
        use crate::parsers::parse;

        let snps = DiseaseKnowledgeBase::from_entries(vec![entry(
            "rs1",
            "Cardiovascular",
            "T",
            RiskTier::High,
        )]);
        let clinvar = ClinVarTable::new();
        let calls = parse("1\t100\trs1\tT\tTT\t.\tPASS\t.\tGT\t0/1\n", SourceFormat::Nebula)
            .unwrap();
        assert_eq!(calls.get("rs1").unwrap().genotype, "TTT");

        let result = DiseaseRiskMatcher::new(&snps, &clinvar).analyze(&calls);
        assert_eq!(result.moderate_risk_variants.len(), 1);
        let finding = &result.moderate_risk_variants[0];
        assert_eq!(finding.zygosity, Some(Zygosity::Heterozygous));
        assert_eq!(finding.description, "Heterozygous carrier. Description.");
    }

    #[rstest]
    #[case("Pathogenic", Some(RiskTier::High))]
    #[case("Likely pathogenic", Some(RiskTier::Moderate))]
    #[case("Pathogenic/Likely pathogenic", Some(RiskTier::Moderate))]
    #[case("risk factor", Some(RiskTier::Moderate))]
    #[case("Uncertain significance", None)]
    #[case("Benign", None)]
    fn test_clinvar_tier(#[case] significance: &str, #[case] expected: Option<RiskTier>) {
        assert_eq!(clinvar_tier(significance), expected);
    }
}
