//! Result of a crew run.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Outputs of every node of a finished crew.
///
/// Keyed by node name. Names are not required to be unique; when two nodes
/// share a name the one that ran later wins in the map, while
/// [`runs`](CrewOutput::runs) keeps every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewOutput {
    results: HashMap<String, String>,
    execution_order: Vec<String>,
    /// Outputs parallel to `execution_order`.
    outputs: Vec<String>,
}

impl CrewOutput {
    pub(crate) fn record(&mut self, name: &str, output: &str) {
        self.execution_order.push(name.to_string());
        self.outputs.push(output.to_string());
        self.results.insert(name.to_string(), output.to_string());
    }

    /// `(name, output)` for every node, in the order they ran.
    pub fn runs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.execution_order
            .iter()
            .zip(&self.outputs)
            .map(|(name, output)| (name.as_str(), output.as_str()))
    }

    /// Output of the node called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.results.get(name).map(String::as_str)
    }

    /// Name to output mapping.
    pub fn results(&self) -> &HashMap<String, String> {
        &self.results
    }

    /// Node names in the order they ran.
    pub fn execution_order(&self) -> &[String] {
        &self.execution_order
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_results(self) -> HashMap<String, String> {
        self.results
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, output) in self.runs() {
            writeln!(f, "== {} ==\n{}\n", name, output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_lookup() {
        let mut out = CrewOutput::default();
        out.record("A", "1");
        out.record("B", "2");
        assert_eq!(out.get("A"), Some("1"));
        assert_eq!(out.execution_order(), ["A", "B"]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_shared_name_keeps_latest() {
        let mut out = CrewOutput::default();
        out.record("Agent", "first");
        out.record("Agent", "second");
        assert_eq!(out.get("Agent"), Some("second"));
        assert_eq!(out.execution_order().len(), 2);
        assert_eq!(
            out.runs().collect::<Vec<_>>(),
            vec![("Agent", "first"), ("Agent", "second")]
        );
    }

    #[test]
    fn test_display_shows_each_run_once() {
        let mut out = CrewOutput::default();
        out.record("Agent", "first");
        out.record("Agent", "second");
        let text = out.to_string();
        assert_eq!(text, "== Agent ==\nfirst\n\n== Agent ==\nsecond\n\n");
    }
}
