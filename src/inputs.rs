use std::collections::HashMap;

use crate::variable::{Antecedent, Variable, VariableKey};

/// Crisp input bindings for one computation.
#[derive(Clone, Debug, Default)]
pub struct Inputs(pub(crate) HashMap<VariableKey, f64>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(HashMap::new())
    }

    /// Binds a crisp value to an input variable, replacing any previous
    /// binding.
    pub fn add(&mut self, var: Variable<Antecedent>, value: f64) {
        self.0.insert(var.0, value);
    }
}
