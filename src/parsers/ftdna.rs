use super::{LineDecoder, RawCall};

/// Family Tree DNA raw data: `rsid,chromosome,position,result`
pub struct FtdnaParser;

impl LineDecoder for FtdnaParser {
    fn decode_line(&self, line: &str) -> Option<RawCall> {
        let parts: Vec<&str> = line.split(',').collect();
        RawCall::from_fields(&parts)
    }
}
