use super::{LineDecoder, RawCall};

/// Fallback for exports without a declared vendor: try a tab split first and
/// fall back to commas when that does not yield enough columns.
pub struct TsvParser;

impl LineDecoder for TsvParser {
    fn decode_line(&self, line: &str) -> Option<RawCall> {
        if line.contains('\t') {
            let parts: Vec<&str> = line.split('\t').collect();
            if let Some(call) = RawCall::from_fields(&parts) {
                return Some(call);
            }
        }

        let parts: Vec<&str> = line.split(',').collect();
        RawCall::from_fields(&parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_then_comma() {
        assert_eq!(
            TsvParser.decode_line("rs1\t1\t10\tAA").unwrap().genotype,
            "AA"
        );
        assert_eq!(TsvParser.decode_line("rs1,1,10,CC").unwrap().genotype, "CC");
    }

    #[test]
    fn test_short_tab_line_falls_back_to_comma() {
        let call = TsvParser.decode_line("rs1,1,10,GG\tnote").unwrap();
        assert_eq!(call.genotype, "GG\tnote");
    }

    #[test]
    fn test_unsplittable() {
        assert!(TsvParser.decode_line("rs1 1 10 AA").is_none());
    }
}
