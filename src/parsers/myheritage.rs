use super::{LineDecoder, RawCall};

/// MyHeritage raw data: `"rsid","chromosome","position","result"`
pub struct MyHeritageParser;

impl LineDecoder for MyHeritageParser {
    fn decode_line(&self, line: &str) -> Option<RawCall> {
        let unquoted = line.replace('"', "");
        let parts: Vec<&str> = unquoted.split(',').collect();
        RawCall::from_fields(&parts)
    }
}
