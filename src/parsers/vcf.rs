use super::{CallId, LineDecoder, RawCall};
use crate::types::UNKNOWN_ALLELE;

/// Single-sample VCF, as shipped by whole-genome vendors such as Nebula.
///
/// Only the first sample column is read. Sites without an ID are keyed by
/// `chr<chrom>:<pos>` so they still reach the matchers.
pub struct VcfParser;

impl LineDecoder for VcfParser {
    fn decode_line(&self, line: &str) -> Option<RawCall> {
        if line.starts_with('#') {
            return None;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 10 {
            return None;
        }

        let chromosome = parts[0].strip_prefix("chr").unwrap_or(parts[0]).to_string();
        let position = parts[1].to_string();
        let id = if parts[2] == "." {
            CallId::Locus(format!("chr{}:{}", chromosome, position))
        } else {
            CallId::Reported(parts[2].to_string())
        };
        let reference = parts[3];
        let alternate = parts[4];

        let gt = self.genotype_field(parts[8], parts[9])?;

        Some(RawCall {
            id,
            chromosome,
            position,
            genotype: decode_genotype(gt, reference, alternate),
        })
    }
}

impl VcfParser {
    /// Pick the GT value out of the sample column. Falls back to the first
    /// sample field when FORMAT has no GT key; a sample column too short for
    /// the index makes the line undecodable.
    fn genotype_field<'a>(&self, format_str: &str, sample_str: &'a str) -> Option<&'a str> {
        let gt_index = format_str
            .split(':')
            .position(|f| f == "GT")
            .unwrap_or(0);
        sample_str.split(':').nth(gt_index)
    }
}

/// Turn a GT code into allele letters using the site's REF and ALT.
pub fn decode_genotype(gt: &str, reference: &str, alternate: &str) -> String {
    match gt {
        "0/0" | "0|0" => format!("{}{}", reference, reference),
        "0/1" | "0|1" | "1/0" | "1|0" => format!("{}{}", reference, alternate),
        "1/1" | "1|1" => format!("{}{}", alternate, alternate),
        _ => format!("{}{}", UNKNOWN_ALLELE, UNKNOWN_ALLELE),
    }
}
