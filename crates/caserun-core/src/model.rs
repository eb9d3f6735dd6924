use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One named value in a case's input or output mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    pub value: Value,
}

impl Assignment {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One replayable case: named inputs to apply, output names to capture,
/// and after execution the captured outputs plus a failure annotation.
///
/// Inputs and outputs are ordered mappings: lookups go by name, iteration
/// order is insertion order. They serialize as `{name, value}` arrays so
/// the order survives JSONL round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: String,

    /// Identifier of the run that executed this case. Set by the runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub inputs: Vec<Assignment>,

    /// Output names to read back after execution. Empty means capture
    /// every output the target reports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capture: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Assignment>,

    /// Failure annotation. `None` means the case executed cleanly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Case {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            inputs: Vec::new(),
            capture: Vec::new(),
            outputs: Vec::new(),
            msg: None,
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, value: Value) -> Self {
        self.inputs.push(Assignment::new(name, value));
        self
    }

    pub fn with_capture(mut self, name: impl Into<String>) -> Self {
        self.capture.push(name.into());
        self
    }

    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// Insert or replace an output by name. Replacing keeps the original
    /// position; new names append.
    pub fn set_output(&mut self, name: &str, value: Value) {
        match self.outputs.iter_mut().find(|a| a.name == name) {
            Some(a) => a.value = value,
            None => self.outputs.push(Assignment::new(name, value)),
        }
    }

    pub fn failed(&self) -> bool {
        self.msg.is_some()
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Case: {}", self.id)?;
        if let Some(run) = &self.parent_id {
            writeln!(f, "   run: {}", run)?;
        }
        if !self.inputs.is_empty() {
            writeln!(f, "   inputs:")?;
            for a in &self.inputs {
                writeln!(f, "      {}: {}", a.name, a.value)?;
            }
        }
        if !self.outputs.is_empty() {
            writeln!(f, "   outputs:")?;
            for a in &self.outputs {
                writeln!(f, "      {}: {}", a.name, a.value)?;
            }
        }
        if let Some(msg) = &self.msg {
            writeln!(f, "   error: {}", msg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_output_replaces_in_place_and_appends_new_names() {
        let mut case = Case::new("c1");
        case.set_output("a", json!(1));
        case.set_output("b", json!(2));
        case.set_output("a", json!(3));
        case.set_output("c", json!(4));

        let names: Vec<&str> = case.outputs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(case.output("a"), Some(&json!(3)));
    }

    #[test]
    fn display_renders_sections_in_order() {
        let mut case = Case::new("c1")
            .with_input("x", json!(1))
            .with_input("note", json!("hello"));
        case.parent_id = Some("run-9".to_string());
        case.set_output("y", json!(2));

        let text = format!("{}", case);
        assert_eq!(
            text,
            "Case: c1\n   run: run-9\n   inputs:\n      x: 1\n      note: \"hello\"\n   outputs:\n      y: 2\n"
        );
    }

    #[test]
    fn display_shows_failure_annotation() {
        let mut case = Case::new("c2").with_input("x", json!(9));
        case.msg = Some("target exploded".to_string());

        let text = format!("{}", case);
        assert!(text.ends_with("   error: target exploded\n"), "got: {text}");
    }

    #[test]
    fn serde_preserves_non_alphabetical_input_order() {
        let case = Case::new("c1")
            .with_input("z", json!(1))
            .with_input("a", json!(2));

        let encoded = serde_json::to_string(&case).unwrap();
        let decoded: Case = serde_json::from_str(&encoded).unwrap();
        let names: Vec<&str> = decoded.inputs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert!(decoded.msg.is_none());
    }
}
