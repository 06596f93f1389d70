use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::knowledge::{TraitKnowledgeBase, TraitSnpEntry};
use crate::types::*;

/// Effect reported when the risk allele is absent
pub const TYPICAL_EFFECT: &str = "Typical/common variant";

/// Genotype interpretation for one trait SNP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitFinding {
    pub rsid: String,
    pub gene: String,
    pub category: TraitCategory,
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub genotype: String,
    pub has_risk_allele: bool,
    pub risk_allele_count: usize,
    pub effect: String,
    pub interpretation: String,
    pub description: String,
}

/// Trait findings and coverage of the trait table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitsAnalysisResult {
    pub total_traits_checked: usize,
    pub traits_found: usize,
    pub traits_not_found: usize,
    pub results_by_category: BTreeMap<TraitCategory, Vec<TraitFinding>>,
    /// `<rsid> (<gene>): <trait>` for every entry absent from the genome
    pub missing_by_category: BTreeMap<TraitCategory, Vec<String>>,
}

/// Checks every trait table entry against the parsed variants
pub struct TraitMatcher<'kb> {
    traits: &'kb TraitKnowledgeBase,
}

impl<'kb> TraitMatcher<'kb> {
    pub fn new(traits: &'kb TraitKnowledgeBase) -> Self {
        Self { traits }
    }

    pub fn analyze(&self, variants: &VariantSet) -> TraitsAnalysisResult {
        let mut results_by_category: BTreeMap<TraitCategory, Vec<TraitFinding>> =
            TraitCategory::ALL.iter().map(|c| (*c, Vec::new())).collect();
        let mut missing_by_category: BTreeMap<TraitCategory, Vec<String>> =
            TraitCategory::ALL.iter().map(|c| (*c, Vec::new())).collect();

        let mut traits_found = 0;
        let mut traits_not_found = 0;

        for entry in self.traits.iter() {
            match variants.get(&entry.rsid) {
                Some(variant) => {
                    traits_found += 1;
                    let finding = analyze_single_trait(entry, &variant.genotype);
                    results_by_category
                        .entry(entry.category)
                        .or_default()
                        .push(finding);
                }
                None => {
                    traits_not_found += 1;
                    missing_by_category
                        .entry(entry.category)
                        .or_default()
                        .push(format!("{} ({}): {}", entry.rsid, entry.gene, entry.trait_name));
                }
            }
        }

        debug!(
            "Trait matching: {} found, {} not available",
            traits_found, traits_not_found
        );

        TraitsAnalysisResult {
            total_traits_checked: self.traits.len(),
            traits_found,
            traits_not_found,
            results_by_category,
            missing_by_category,
        }
    }
}

fn analyze_single_trait(entry: &TraitSnpEntry, genotype: &str) -> TraitFinding {
    let genotype = normalize_genotype(genotype);
    let risk_allele = entry.risk_allele.trim().to_uppercase();
    let count = count_allele(&genotype, &risk_allele);
    let has_risk = count > 0;

    let interpretation = match Zygosity::from_count(count) {
        Zygosity::Absent => format!(
            "You do not carry the {} allele associated with this trait.",
            risk_allele
        ),
        Zygosity::Heterozygous => format!(
            "You carry one copy of the {} allele (heterozygous). {}",
            risk_allele, entry.effect
        ),
        Zygosity::Homozygous => format!(
            "You carry two copies of the {} allele (homozygous). {}",
            risk_allele, entry.effect
        ),
    };

    TraitFinding {
        rsid: entry.rsid.clone(),
        gene: entry.gene.clone(),
        category: entry.category,
        trait_name: entry.trait_name.clone(),
        genotype,
        has_risk_allele: has_risk,
        risk_allele_count: count,
        effect: if has_risk {
            entry.effect.clone()
        } else {
            TYPICAL_EFFECT.to_string()
        },
        interpretation,
        description: entry.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(rsid: &str, category: TraitCategory, risk: &str) -> TraitSnpEntry {
        TraitSnpEntry {
            rsid: rsid.to_string(),
            gene: "COMT".to_string(),
            category,
            trait_name: "Pain Sensitivity".to_string(),
            risk_allele: risk.to_string(),
            effect: "Higher pain sensitivity".to_string(),
            description: "Background.".to_string(),
            references: vec!["PMID:1".to_string()],
        }
    }

    fn variants(calls: &[(&str, &str)]) -> VariantSet {
        calls
            .iter()
            .map(|(id, gt)| VariantRecord {
                variant_id: id.to_string(),
                chromosome: "22".to_string(),
                position: "1".to_string(),
                genotype: gt.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_every_category_present_when_empty() {
        let kb = TraitKnowledgeBase::default();
        let result = TraitMatcher::new(&kb).analyze(&variants(&[("rs1", "AA")]));

        for category in TraitCategory::ALL {
            assert!(result.results_by_category[&category].is_empty());
            assert!(result.missing_by_category[&category].is_empty());
        }
        assert_eq!(result.total_traits_checked, 0);
    }

    #[test]
    fn test_interpretations_by_count() {
        let kb = TraitKnowledgeBase::from_entries(vec![
            entry("rs1", TraitCategory::Sensitivity, "A"),
            entry("rs2", TraitCategory::Sensitivity, "A"),
            entry("rs3", TraitCategory::Sensitivity, "A"),
        ]);
        let result = TraitMatcher::new(&kb)
            .analyze(&variants(&[("rs1", "GG"), ("rs2", "ag"), ("rs3", "AA")]));

        let findings = &result.results_by_category[&TraitCategory::Sensitivity];
        assert_eq!(findings.len(), 3);

        assert!(!findings[0].has_risk_allele);
        assert_eq!(findings[0].risk_allele_count, 0);
        assert_eq!(findings[0].effect, TYPICAL_EFFECT);
        assert_eq!(
            findings[0].interpretation,
            "You do not carry the A allele associated with this trait."
        );

        assert_eq!(findings[1].genotype, "AG");
        assert_eq!(findings[1].risk_allele_count, 1);
        assert_eq!(findings[1].effect, "Higher pain sensitivity");
        assert_eq!(
            findings[1].interpretation,
            "You carry one copy of the A allele (heterozygous). Higher pain sensitivity"
        );

        assert_eq!(findings[2].risk_allele_count, 2);
        assert_eq!(
            findings[2].interpretation,
            "You carry two copies of the A allele (homozygous). Higher pain sensitivity"
        );
    }

    #[test]
    fn test_missing_entries_reported() {
        let kb = TraitKnowledgeBase::from_entries(vec![
            entry("rs1", TraitCategory::Sleep, "A"),
            entry("rs2", TraitCategory::Cognitive, "A"),
        ]);
        let result = TraitMatcher::new(&kb).analyze(&variants(&[("rs1", "AA")]));

        assert_eq!(result.traits_found, 1);
        assert_eq!(result.traits_not_found, 1);
        assert_eq!(
            result.missing_by_category[&TraitCategory::Cognitive],
            vec!["rs2 (COMT): Pain Sensitivity".to_string()]
        );
    }

    #[test]
    fn test_coverage_adds_up_on_builtin_table() {
        let kb = TraitKnowledgeBase::builtin().unwrap();
        let result = TraitMatcher::new(&kb).analyze(&variants(&[
            ("rs4680", "AG"),
            ("rs1801260", "TC"),
            ("rs1815739", "CC"),
        ]));

        assert_eq!(result.total_traits_checked, kb.len());
        assert_eq!(result.traits_found + result.traits_not_found, kb.len());
        assert_eq!(result.results_by_category.len(), 8);
        assert_eq!(result.missing_by_category.len(), 8);

        // rs4680 is listed under two categories and is found in both.
        let comt_hits = result
            .results_by_category
            .values()
            .flatten()
            .filter(|f| f.rsid == "rs4680")
            .count();
        assert_eq!(comt_hits, 2);
    }
}
