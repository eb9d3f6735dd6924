use super::TargetModel;
use crate::model::Assignment;
use anyhow::bail;
use serde_json::Value;

/// Builtin reference target: reflects every applied input back as an
/// identically named output. Fixed outputs set through the builder are
/// appended after the reflected inputs (and replace a reflected value of
/// the same name).
#[derive(Debug, Default)]
pub struct EchoModel {
    fixed: Vec<Assignment>,
    staged: Vec<Assignment>,
    ran: bool,
}

impl EchoModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always report `name` with `value`, whatever the inputs were.
    pub fn with_output(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fixed.push(Assignment::new(name, value));
        self
    }
}

impl TargetModel for EchoModel {
    fn apply_inputs(&mut self, inputs: &[Assignment]) -> anyhow::Result<()> {
        if let Some(a) = inputs.iter().find(|a| a.name.is_empty()) {
            bail!("input with empty name (value {})", a.value);
        }
        self.staged = inputs.to_vec();
        self.ran = false;
        Ok(())
    }

    fn run(&mut self, case_id: &str) -> anyhow::Result<()> {
        tracing::debug!(case_id, inputs = self.staged.len(), "echo model run");
        self.ran = true;
        Ok(())
    }

    fn read_outputs(&mut self) -> anyhow::Result<Vec<Assignment>> {
        if !self.ran {
            bail!("no execution to read outputs from");
        }
        let mut outputs = self.staged.clone();
        for fixed in &self.fixed {
            match outputs.iter_mut().find(|a| a.name == fixed.name) {
                Some(a) => a.value = fixed.value.clone(),
                None => outputs.push(fixed.clone()),
            }
        }
        Ok(outputs)
    }
}
