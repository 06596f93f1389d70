use super::{LineDecoder, RawCall};

/// Genera raw data. Some releases are tab-delimited and some comma-delimited,
/// so the delimiter is picked per line.
pub struct GeneraParser;

impl LineDecoder for GeneraParser {
    fn decode_line(&self, line: &str) -> Option<RawCall> {
        let delimiter = if line.contains('\t') { '\t' } else { ',' };
        let parts: Vec<&str> = line.split(delimiter).collect();
        RawCall::from_fields(&parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_or_comma() {
        let tab = GeneraParser.decode_line("rs1\t2\t300\tAG").unwrap();
        let comma = GeneraParser.decode_line("rs1,2,300,AG").unwrap();
        assert_eq!(tab, comma);
    }

    #[test]
    fn test_tab_wins_over_comma() {
        // A tab anywhere selects tab splitting, leaving commas inside fields.
        assert!(GeneraParser.decode_line("rs1,2,300\tAG").is_none());
    }
}
