use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::knowledge::KnowledgeSources;
use crate::output::ReportFormat;

/// Settings read from an optional TOML file.
///
/// Every key is optional; command-line flags and environment variables take
/// precedence over whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Bulk ClinVar `variant_summary` table (plain or gzip)
    pub clinvar_path: Option<PathBuf>,
    /// Replacement for the built-in disease table
    pub disease_table: Option<PathBuf>,
    /// Replacement for the built-in trait table
    pub trait_table: Option<PathBuf>,
    /// Worker threads, 0 for the rayon default
    pub threads: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub report_format: Option<ReportFormat>,
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Fill every unset key from `other`.
    pub fn or(self, other: Settings) -> Settings {
        Settings {
            clinvar_path: self.clinvar_path.or(other.clinvar_path),
            disease_table: self.disease_table.or(other.disease_table),
            trait_table: self.trait_table.or(other.trait_table),
            threads: self.threads.or(other.threads),
            output_dir: self.output_dir.or(other.output_dir),
            report_format: self.report_format.or(other.report_format),
        }
    }

    pub fn knowledge_sources(&self) -> KnowledgeSources {
        KnowledgeSources {
            disease_table: self.disease_table.clone(),
            trait_table: self.trait_table.clone(),
            clinvar: self.clinvar_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_settings_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "clinvar_path = \"/data/variant_summary.txt.gz\"")?;
        writeln!(file, "threads = 4")?;
        writeln!(file, "report_format = \"tsv\"")?;

        let settings = Settings::from_path(file.path())?;
        assert_eq!(
            settings.clinvar_path,
            Some(PathBuf::from("/data/variant_summary.txt.gz"))
        );
        assert_eq!(settings.threads, Some(4));
        assert_eq!(settings.report_format, Some(ReportFormat::Tsv));
        assert_eq!(settings.disease_table, None);
        Ok(())
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Settings::from_toml_str("clinvar = \"x\"").is_err());
    }

    #[test]
    fn test_precedence() {
        let cli = Settings {
            threads: Some(2),
            ..Default::default()
        };
        let file = Settings {
            threads: Some(8),
            output_dir: Some(PathBuf::from("out")),
            ..Default::default()
        };

        let merged = cli.or(file);
        assert_eq!(merged.threads, Some(2));
        assert_eq!(merged.output_dir, Some(PathBuf::from("out")));

        let sources = merged.knowledge_sources();
        assert!(sources.clinvar.is_none());
    }
}
