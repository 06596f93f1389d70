use super::{LineDecoder, RawCall};
use crate::types::UNKNOWN_ALLELE;

/// AncestryDNA raw data with split alleles:
/// `rsid<TAB>chromosome<TAB>position<TAB>allele1<TAB>allele2`
///
/// AncestryDNA writes `0` for an allele it could not call.
pub struct AncestryDNAParser;

impl LineDecoder for AncestryDNAParser {
    fn decode_line(&self, line: &str) -> Option<RawCall> {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 5 {
            return None;
        }

        let genotype: String = format!("{}{}", parts[3], parts[4])
            .chars()
            .map(|c| if c == '0' { UNKNOWN_ALLELE } else { c })
            .collect();

        let mut call = RawCall::from_fields(&parts)?;
        call.genotype = genotype;
        Some(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alleles_concatenated() {
        let call = AncestryDNAParser
            .decode_line("rs4477212\t1\t82154\tT\tC")
            .unwrap();
        assert_eq!(call.genotype, "TC");
    }

    #[test]
    fn test_no_call_rewritten() {
        let call = AncestryDNAParser
            .decode_line("rs4477212\t1\t82154\t0\t0")
            .unwrap();
        assert_eq!(call.genotype, "--");
    }

    #[test]
    fn test_four_columns_rejected() {
        assert!(AncestryDNAParser
            .decode_line("rs4477212\t1\t82154\tTC")
            .is_none());
    }
}
