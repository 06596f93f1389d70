//! Line-oriented parsers for consumer genotype exports.
//!
//! Every export is read line by line. Blank lines, `#` comments and `rsid`
//! header rows are skipped, the remaining lines are decoded by the parser for
//! the declared [`SourceFormat`], and lines that cannot be decoded are dropped
//! without failing the whole document. Only a document that yields no usable
//! record at all is an error.

pub mod ancestry;
pub mod ftdna;
pub mod genera;
pub mod myheritage;
pub mod tsv_parser;
pub mod twentythree;
pub mod vcf;

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;
use tracing::{debug, trace};

use crate::error::ParseError;
use crate::types::*;

pub use ancestry::AncestryDNAParser;
pub use ftdna::FtdnaParser;
pub use genera::GeneraParser;
pub use myheritage::MyHeritageParser;
pub use tsv_parser::TsvParser;
pub use twentythree::TwentyThreeAndMeParser;
pub use vcf::VcfParser;

/// Identifier of a decoded line before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallId {
    /// Identifier column as written in the export
    Reported(String),
    /// Synthetic `chr<chrom>:<pos>` key for an unnamed VCF site
    Locus(String),
}

/// A data line split into its fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCall {
    pub id: CallId,
    pub chromosome: String,
    pub position: String,
    pub genotype: String,
}

impl RawCall {
    /// Map the first four fields onto identifier, chromosome, position, genotype.
    pub fn from_fields(parts: &[&str]) -> Option<Self> {
        if parts.len() < 4 {
            return None;
        }
        Some(Self {
            id: CallId::Reported(parts[0].to_string()),
            chromosome: parts[1].to_string(),
            position: parts[2].to_string(),
            genotype: parts[3].to_string(),
        })
    }

    /// Normalize into a record, dropping identifiers that are not rsIDs.
    fn into_record(self) -> Option<VariantRecord> {
        let variant_id = match self.id {
            CallId::Reported(id) => {
                let id = id.to_lowercase();
                if !id.starts_with("rs") {
                    return None;
                }
                id
            }
            CallId::Locus(key) => key,
        };

        Some(VariantRecord {
            variant_id,
            chromosome: self.chromosome,
            position: self.position,
            genotype: self.genotype,
        })
    }
}

/// Decodes one data line of a particular export format
pub trait LineDecoder {
    fn decode_line(&self, line: &str) -> Option<RawCall>;
}

/// Parser turning raw export text into a [`VariantSet`]
#[derive(Debug, Clone, Copy)]
pub struct VariantParser {
    format: SourceFormat,
}

impl VariantParser {
    pub fn new(format: SourceFormat) -> Self {
        Self { format }
    }

    /// Parse a whole document held in memory.
    pub fn parse_str(&self, content: &str) -> Result<VariantSet, ParseError> {
        self.collect(content.lines())
    }

    /// Parse from any buffered reader, one line at a time. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn parse_reader<R: BufRead>(&self, mut reader: R) -> Result<VariantSet, ParseError> {
        let mut variants = VariantSet::new();
        let mut skipped = 0usize;
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buffer);
            let line = line.trim_end_matches(['\n', '\r']);
            self.absorb(line, &mut variants, &mut skipped);
        }

        self.finish(variants, skipped)
    }

    /// Parse a file on disk; `.gz` and `.zip` containers are opened transparently.
    pub fn parse_path(&self, path: &Path) -> Result<VariantSet, ParseError> {
        let reader = open_file(path)?;
        self.parse_reader(reader)
    }

    /// Classify and decode a single line.
    pub fn decode_line(&self, line: &str) -> Option<VariantRecord> {
        if line.trim().is_empty() || line.starts_with('#') || is_header(line) {
            return None;
        }

        let call = match self.format {
            SourceFormat::TwentyThreeAndMe => TwentyThreeAndMeParser.decode_line(line),
            SourceFormat::Ancestry => AncestryDNAParser.decode_line(line),
            SourceFormat::MyHeritage => MyHeritageParser.decode_line(line),
            SourceFormat::Ftdna => FtdnaParser.decode_line(line),
            SourceFormat::Genera => GeneraParser.decode_line(line),
            SourceFormat::Nebula => VcfParser.decode_line(line),
            SourceFormat::Generic => TsvParser.decode_line(line),
        }?;

        call.into_record()
    }

    fn collect<'a, I>(&self, lines: I) -> Result<VariantSet, ParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut variants = VariantSet::new();
        let mut skipped = 0usize;

        for line in lines {
            self.absorb(line, &mut variants, &mut skipped);
        }

        self.finish(variants, skipped)
    }

    fn absorb(&self, line: &str, variants: &mut VariantSet, skipped: &mut usize) {
        match self.decode_line(line) {
            Some(record) => {
                variants.insert(record);
            }
            None => {
                trace!("Skipping line: {}", line);
                *skipped += 1;
            }
        }
    }

    fn finish(&self, variants: VariantSet, skipped: usize) -> Result<VariantSet, ParseError> {
        debug!(
            "Parsed {} variants as {} ({} lines skipped)",
            variants.len(),
            self.format,
            skipped
        );

        if variants.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        Ok(variants)
    }
}

/// Parse `content` under `format`.
pub fn parse(content: &str, format: SourceFormat) -> Result<VariantSet, ParseError> {
    VariantParser::new(format).parse_str(content)
}

fn is_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.starts_with("rsid") || lower.starts_with("\"rsid")
}

/// Open a plain, gzip-compressed or zipped file for buffered reading
pub fn open_file(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let file = File::open(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "gz" => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        "zip" => {
            let archive_error = |e: zip::result::ZipError| ParseError::Archive {
                path: path.to_path_buf(),
                details: e.to_string(),
            };
            let mut archive = zip::ZipArchive::new(file).map_err(archive_error)?;
            let mut entry = archive.by_index(0).map_err(archive_error)?;
            let mut buffer = Vec::new();
            entry.read_to_end(&mut buffer)?;
            Ok(Box::new(Cursor::new(buffer)))
        }
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Guess the export format from the first lines of a document
pub fn detect_format(sample: &str) -> SourceFormat {
    for line in sample.lines().take(200) {
        let lower = line.trim().to_lowercase();
        if lower.is_empty() {
            continue;
        }

        if lower.starts_with("##fileformat=vcf") || lower.starts_with("#chrom") {
            return SourceFormat::Nebula;
        }
        if lower.starts_with('#') {
            if lower.contains("23andme") {
                return SourceFormat::TwentyThreeAndMe;
            }
            if lower.contains("ancestrydna") {
                return SourceFormat::Ancestry;
            }
            if lower.contains("myheritage") {
                return SourceFormat::MyHeritage;
            }
            continue;
        }

        if lower.starts_with("rsid\tchromosome\tposition\tallele1") {
            return SourceFormat::Ancestry;
        }
        if lower.starts_with("\"rsid\"") {
            return SourceFormat::MyHeritage;
        }
        if lower.starts_with("rsid,") {
            return SourceFormat::Ftdna;
        }
        if lower.starts_with("rsid\t") {
            return SourceFormat::TwentyThreeAndMe;
        }

        // First data line without a recognizable banner or header.
        return SourceFormat::Generic;
    }

    SourceFormat::Generic
}
