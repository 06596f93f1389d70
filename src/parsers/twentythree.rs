use super::{LineDecoder, RawCall};

/// 23andMe raw data: `rsid<TAB>chromosome<TAB>position<TAB>genotype`
pub struct TwentyThreeAndMeParser;

impl LineDecoder for TwentyThreeAndMeParser {
    fn decode_line(&self, line: &str) -> Option<RawCall> {
        let parts: Vec<&str> = line.split('\t').collect();
        RawCall::from_fields(&parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::CallId;

    #[test]
    fn test_decode_line() {
        let call = TwentyThreeAndMeParser
            .decode_line("rs548049170\t1\t69869\tTT")
            .unwrap();
        assert_eq!(call.id, CallId::Reported("rs548049170".to_string()));
        assert_eq!(call.chromosome, "1");
        assert_eq!(call.position, "69869");
        assert_eq!(call.genotype, "TT");
    }

    #[test]
    fn test_no_call_kept_verbatim() {
        let call = TwentyThreeAndMeParser
            .decode_line("rs13328684\t1\t74792\t--")
            .unwrap();
        assert_eq!(call.genotype, "--");
    }

    #[test]
    fn test_too_few_columns() {
        assert!(TwentyThreeAndMeParser.decode_line("rs1\t1\t100").is_none());
    }
}
