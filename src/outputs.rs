use std::collections::HashMap;

use crate::variable::{Consequent, Variable, VariableKey};

/// Defuzzified results of one computation, one entry per output variable.
#[derive(Clone, Debug)]
pub struct Outputs(pub(crate) HashMap<VariableKey, f64>);

impl Outputs {
    pub fn get(&self, var: Variable<Consequent>) -> Option<f64> {
        self.0.get(&var.0).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}
