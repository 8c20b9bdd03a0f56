use serde_yaml::Value;

use crate::error::BoxError;
use crate::traits::Parser;

/// Parses file text as a single YAML document.
///
/// Empty input yields [`Value::Null`]. Pair with
/// [`TagFilter`](crate::TagFilter) to select files by their `meta.tags`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl Parser for YamlParser {
    type Output = Value;

    fn parse(&self, content: &str) -> Result<Value, BoxError> {
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
