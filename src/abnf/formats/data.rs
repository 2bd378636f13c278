//! Structured data formats: parse trees as JSON or YAML documents.
//!
//! Rule nodes serialize as `{name, children}` and leaves as `{value, offset, length}`.

use super::{FormatError, Formatter};
use crate::abnf::tree::Node;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, node: &Node) -> Result<String, FormatError> {
        serde_json::to_string_pretty(node)
            .map_err(|err| FormatError::SerializationError(err.to_string()))
    }

    fn description(&self) -> &str {
        "Pretty-printed JSON"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, node: &Node) -> Result<String, FormatError> {
        serde_yaml::to_string(node).map_err(|err| FormatError::SerializationError(err.to_string()))
    }

    fn description(&self) -> &str {
        "YAML document"
    }
}
