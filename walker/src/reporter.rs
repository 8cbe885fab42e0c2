//! Per-run report buffer.

use osp_core::Value;

/// Accumulates values reported by ability bodies in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reporter {
    values: Vec<Value>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value.
    pub fn emit(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    /// Values reported so far.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Hand the ordered report sequence to the invoker.
    pub fn collect(self) -> Vec<Value> {
        self.values
    }
}
