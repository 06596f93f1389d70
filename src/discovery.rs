use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::parsers::{detect_format, open_file};
use crate::types::SourceFormat;

/// Bytes read from the start of a file when sniffing its format
const SNIFF_BYTES: u64 = 16 * 1024;

/// Finds genotype export files for batch analysis
pub struct FileDiscovery {
    recursive: bool,
}

impl FileDiscovery {
    pub fn new(recursive: bool) -> Self {
        Self { recursive }
    }

    /// Expand files and directories into a de-duplicated list of export files
    pub fn discover(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                files.push(path.clone());
            } else if path.is_dir() {
                files.extend(self.discover_in_directory(path)?);
            }
        }

        let mut seen = HashSet::new();
        files.retain(|path| seen.insert(path.clone()));
        files.sort();

        Ok(files)
    }

    fn discover_in_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if self.recursive {
            for entry in WalkDir::new(dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && self.is_potential_genome_file(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            let entries = fs::read_dir(dir)
                .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

            for entry in entries {
                let entry = entry.with_context(|| {
                    format!("Failed to read directory entry in: {}", dir.display())
                })?;
                let path = entry.path();

                if path.is_file() && self.is_potential_genome_file(&path) {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }

    fn is_potential_genome_file(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "vcf" | "gz" | "zip" => true,
            "txt" | "csv" | "tsv" => self.has_genome_markers(path),
            _ => false,
        }
    }

    /// Look for headers and banners the supported vendors write.
    fn has_genome_markers(&self, path: &Path) -> bool {
        let Ok(sample) = read_sample(path) else {
            return false;
        };

        sample.lines().take(50).any(|line| {
            let lower = line.to_lowercase();
            lower.starts_with("##fileformat=vcf")
                || lower.contains("23andme")
                || lower.contains("ancestrydna")
                || lower.contains("myheritage")
                || ((lower.starts_with("rsid") || lower.starts_with("\"rsid"))
                    && lower.contains("chromosome")
                    && lower.contains("position"))
                || (lower.starts_with("rs")
                    && lower.chars().nth(2).map_or(false, |c| c.is_ascii_digit()))
        })
    }
}

/// Guess the format of an export file from its first lines
pub fn sniff_format(path: &Path) -> Result<SourceFormat> {
    let sample = read_sample(path)?;
    Ok(detect_format(&sample))
}

fn read_sample(path: &Path) -> Result<String> {
    let reader =
        open_file(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut buffer = Vec::new();
    reader
        .take(SNIFF_BYTES)
        .read_to_end(&mut buffer)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_file_discovery() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dir_path = temp_dir.path();

        let vcf_path = dir_path.join("genome.vcf");
        let mut vcf_file = File::create(&vcf_path)?;
        writeln!(vcf_file, "##fileformat=VCFv4.2")?;
        writeln!(vcf_file, "1\t100\trs1\tA\tT\t30\tPASS\t.\tGT\t0/1")?;

        let txt_path = dir_path.join("genome_v5.txt");
        let mut txt_file = File::create(&txt_path)?;
        writeln!(txt_file, "# This data file generated by 23andMe")?;
        writeln!(txt_file, "rs123\t1\t1000\tAA")?;

        let invalid_path = dir_path.join("notes.txt");
        let mut invalid_file = File::create(&invalid_path)?;
        writeln!(invalid_file, "This is not genetic data")?;

        let nested = dir_path.join("nested");
        fs::create_dir(&nested)?;
        let nested_path = nested.join("myheritage.csv");
        let mut nested_file = File::create(&nested_path)?;
        writeln!(nested_file, "\"RSID\",\"CHROMOSOME\",\"POSITION\",\"RESULT\"")?;

        let flat = FileDiscovery::new(false).discover(&[dir_path.to_path_buf()])?;
        assert_eq!(flat, vec![vcf_path.clone(), txt_path.clone()]);

        let deep = FileDiscovery::new(true).discover(&[dir_path.to_path_buf()])?;
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&nested_path));
        assert!(!deep.contains(&invalid_path));

        Ok(())
    }

    #[test]
    fn test_explicit_files_deduplicated() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("anything.dat");
        File::create(&path)?;

        let files = FileDiscovery::new(false).discover(&[path.clone(), path.clone()])?;
        assert_eq!(files, vec![path]);
        Ok(())
    }

    #[test]
    fn test_sniff_format() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("AncestryDNA.txt");
        let mut file = File::create(&path)?;
        writeln!(file, "#AncestryDNA raw data download")?;
        writeln!(file, "rsid\tchromosome\tposition\tallele1\tallele2")?;

        assert_eq!(sniff_format(&path)?, SourceFormat::Ancestry);
        Ok(())
    }
}
