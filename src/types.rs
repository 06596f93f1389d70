use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder allele written for no-calls and undecodable genotypes
pub const UNKNOWN_ALLELE: char = '-';

/// Disease category whose findings are also reported as pharmacogenomic
pub const PHARMACOGENOMIC_CATEGORY: &str = "Drug Metabolism";

/// Category used for findings synthesized from the bulk ClinVar table
pub const CLINVAR_CATEGORY: &str = "ClinVar";

/// Source formats of consumer genotype exports
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Tab-delimited rsid, chromosome, position, genotype
    #[value(name = "23andme", alias = "vendor-a")]
    #[serde(rename = "23andme")]
    TwentyThreeAndMe,
    /// Tab-delimited with the two alleles in separate columns
    #[value(name = "ancestry", alias = "vendor-b")]
    Ancestry,
    /// Quoted comma-delimited
    #[value(name = "myheritage", alias = "vendor-c")]
    MyHeritage,
    /// Unquoted comma-delimited
    #[value(name = "ftdna", alias = "vendor-d")]
    Ftdna,
    /// Tab- or comma-delimited, decided per line
    #[value(name = "genera", alias = "vendor-e")]
    Genera,
    /// Single-sample VCF
    #[value(name = "nebula", alias = "vcf-style", alias = "vcf")]
    Nebula,
    /// Anything else: tab split first, then comma split
    #[value(name = "default", alias = "generic")]
    #[serde(rename = "default")]
    Generic,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 7] = [
        SourceFormat::TwentyThreeAndMe,
        SourceFormat::Ancestry,
        SourceFormat::MyHeritage,
        SourceFormat::Ftdna,
        SourceFormat::Genera,
        SourceFormat::Nebula,
        SourceFormat::Generic,
    ];

    /// Map a deployment format tag onto a format; unknown tags fall back to `Generic`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "23andme" | "vendor-a" => SourceFormat::TwentyThreeAndMe,
            "ancestry" | "ancestrydna" | "vendor-b" => SourceFormat::Ancestry,
            "myheritage" | "vendor-c" => SourceFormat::MyHeritage,
            "ftdna" | "vendor-d" => SourceFormat::Ftdna,
            "genera" | "vendor-e" => SourceFormat::Genera,
            "nebula" | "vcf" | "vcf-style" => SourceFormat::Nebula,
            _ => SourceFormat::Generic,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            SourceFormat::TwentyThreeAndMe => "23andme",
            SourceFormat::Ancestry => "ancestry",
            SourceFormat::MyHeritage => "myheritage",
            SourceFormat::Ftdna => "ftdna",
            SourceFormat::Genera => "genera",
            SourceFormat::Nebula => "nebula",
            SourceFormat::Generic => "default",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SourceFormat::TwentyThreeAndMe => "23andMe raw data (tab-delimited, 4 columns)",
            SourceFormat::Ancestry => "AncestryDNA raw data (tab-delimited, split alleles)",
            SourceFormat::MyHeritage => "MyHeritage raw data (quoted CSV)",
            SourceFormat::Ftdna => "Family Tree DNA raw data (CSV)",
            SourceFormat::Genera => "Genera raw data (tab or comma delimited)",
            SourceFormat::Nebula => "Nebula / whole-genome VCF (single sample)",
            SourceFormat::Generic => "Unrecognized export (tab, then comma fallback)",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single genotyped position as read from an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub variant_id: String,
    pub chromosome: String,
    pub position: String,
    pub genotype: String,
}

/// Parsed variants keyed by normalized identifier, in first-seen order.
///
/// Inserting an identifier that is already present replaces its record but
/// keeps its original position, so later lines win without reordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantSet {
    records: IndexMap<String, VariantRecord>,
}

impl VariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: VariantRecord) -> Option<VariantRecord> {
        self.records.insert(record.variant_id.clone(), record)
    }

    pub fn get(&self, variant_id: &str) -> Option<&VariantRecord> {
        self.records.get(variant_id)
    }

    pub fn contains(&self, variant_id: &str) -> bool {
        self.records.contains_key(variant_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantRecord> {
        self.records.values()
    }
}

impl FromIterator<VariantRecord> for VariantSet {
    fn from_iter<I: IntoIterator<Item = VariantRecord>>(iter: I) -> Self {
        let mut set = VariantSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

/// Clinical significance tier of a curated entry, and the tier a finding is filed under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    High,
    Moderate,
    Low,
    Beneficial,
}

impl RiskTier {
    /// Tier reported for a single copy of the risk allele.
    ///
    /// Only `high` steps down to `moderate`; every other tier reports `low`.
    pub fn heterozygous(&self) -> Self {
        match self {
            RiskTier::High => RiskTier::Moderate,
            _ => RiskTier::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::High => "high",
            RiskTier::Moderate => "moderate",
            RiskTier::Low => "low",
            RiskTier::Beneficial => "beneficial",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of trait categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize, clap::ValueEnum)]
pub enum TraitCategory {
    Cognitive,
    Metabolism,
    Sleep,
    Physical,
    Athletic,
    #[serde(rename = "Mental Health")]
    MentalHealth,
    Longevity,
    Sensitivity,
}

impl TraitCategory {
    pub const ALL: [TraitCategory; 8] = [
        TraitCategory::Cognitive,
        TraitCategory::Metabolism,
        TraitCategory::Sleep,
        TraitCategory::Physical,
        TraitCategory::Athletic,
        TraitCategory::MentalHealth,
        TraitCategory::Longevity,
        TraitCategory::Sensitivity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TraitCategory::Cognitive => "Cognitive",
            TraitCategory::Metabolism => "Metabolism",
            TraitCategory::Sleep => "Sleep",
            TraitCategory::Physical => "Physical",
            TraitCategory::Athletic => "Athletic",
            TraitCategory::MentalHealth => "Mental Health",
            TraitCategory::Longevity => "Longevity",
            TraitCategory::Sensitivity => "Sensitivity",
        }
    }
}

impl fmt::Display for TraitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Zygosity with respect to a risk allele
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Zygosity {
    Absent,
    Heterozygous,
    Homozygous,
}

impl Zygosity {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Zygosity::Absent,
            1 => Zygosity::Heterozygous,
            _ => Zygosity::Homozygous,
        }
    }
}

/// Upper-case a genotype and drop unknown-allele markers.
pub fn normalize_genotype(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != UNKNOWN_ALLELE)
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Count occurrences of `allele` in an already normalized genotype.
pub fn count_allele(genotype: &str, allele: &str) -> usize {
    let allele = allele.trim().to_uppercase();
    if allele.is_empty() {
        return 0;
    }
    genotype.matches(allele.as_str()).count()
}
