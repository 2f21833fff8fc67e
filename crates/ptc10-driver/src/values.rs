use std::collections::BTreeMap;
use std::num::ParseFloatError;

use ptc10_line::NAN_TOKEN;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A controller reply that is not a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid numeric value {text:?}: {source}")]
pub struct ValueParseError {
    pub text: String,
    source: ParseFloatError,
}

/// Parse a single-channel reply.
pub fn parse_value(text: &str) -> Result<f64, ValueParseError> {
    let text = text.trim();
    text.parse::<f64>().map_err(|source| ValueParseError {
        text: text.to_string(),
        source,
    })
}

/// Parse one field of a `getOutput?` reply.
///
/// The literal `NaN` token means "no data" and maps straight to NaN
/// without going through the float parser.
pub fn parse_output_field(field: &str) -> Result<f64, ValueParseError> {
    let field = field.trim();
    if field == NAN_TOKEN {
        return Ok(f64::NAN);
    }
    parse_value(field)
}

/// Split a `getOutput?` reply into per-channel parse results.
///
/// An empty reply means the controller has no output channels.
pub fn parse_output_fields(reply: &str) -> Vec<Result<f64, ValueParseError>> {
    if reply.trim().is_empty() {
        return Vec::new();
    }
    reply.split(',').map(parse_output_field).collect()
}

/// Channel name to value mapping, in controller order.
///
/// Built by pairing names with values positionally. A name seen twice
/// keeps its first position and takes the later value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedOutputs {
    entries: Vec<(String, f64)>,
}

impl NamedOutputs {
    /// Pair names with values up to the shorter of the two.
    pub fn zip(names: Vec<String>, values: Vec<f64>) -> Self {
        let mut outputs = Self::default();
        for (name, value) in names.into_iter().zip(values) {
            outputs.insert(name, value);
        }
        outputs
    }

    fn insert(&mut self, name: String, value: f64) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn into_map(self) -> BTreeMap<String, f64> {
        self.entries.into_iter().collect()
    }
}

impl IntoIterator for NamedOutputs {
    type Item = (String, f64);
    type IntoIter = std::vec::IntoIter<(String, f64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for NamedOutputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            // JSON has no NaN; "no data" becomes null.
            if value.is_finite() {
                map.serialize_entry(name, value)?;
            } else {
                map.serialize_entry(name, &Option::<f64>::None)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_trims_and_parses() {
        assert_eq!(parse_value(" 23.5 ").unwrap(), 23.5);
        assert_eq!(parse_value("-1.2e-3").unwrap(), -0.0012);
    }

    #[test]
    fn parse_value_rejects_error_reply() {
        let err = parse_value("ERR").unwrap_err();
        assert_eq!(err.text, "ERR");
        assert!(err.to_string().contains("\"ERR\""));
    }

    #[test]
    fn output_fields_use_nan_token() {
        let fields = parse_output_fields("23.5,NaN,-1.2");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], Ok(23.5));
        assert!(fields[1].as_ref().unwrap().is_nan());
        assert_eq!(fields[2], Ok(-1.2));
    }

    #[test]
    fn output_fields_keep_malformed_positions() {
        let fields = parse_output_fields("1.0, oops ,2.0");
        assert_eq!(fields[0], Ok(1.0));
        assert_eq!(fields[1].as_ref().unwrap_err().text, "oops");
        assert_eq!(fields[2], Ok(2.0));
    }

    #[test]
    fn output_fields_empty_reply() {
        assert!(parse_output_fields("").is_empty());
    }

    #[test]
    fn zip_truncates_to_shorter() {
        let names = vec!["A2".to_string(), "Out1".to_string(), "3C".to_string()];
        let outputs = NamedOutputs::zip(names, vec![25.0, 1.5]);

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs.get("A2"), Some(25.0));
        assert_eq!(outputs.get("Out1"), Some(1.5));
        assert_eq!(outputs.get("3C"), None);
    }

    #[test]
    fn zip_later_duplicate_wins_in_first_position() {
        let names = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        let outputs = NamedOutputs::zip(names, vec![1.0, 2.0, 3.0]);

        assert_eq!(outputs.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(outputs.get("A"), Some(3.0));
    }

    #[test]
    fn serializes_nan_as_null() {
        let outputs = NamedOutputs::zip(
            vec!["3A".to_string(), "Out1".to_string()],
            vec![f64::NAN, 0.5],
        );
        let json = serde_json::to_string(&outputs).unwrap();
        assert_eq!(json, r#"{"3A":null,"Out1":0.5}"#);
    }
}
