use crate::dsl::Expr;
use crate::variable::{Consequent, Variable, VariableKey};

/// A rule's target: one term of one output variable.
#[derive(Clone, Debug)]
pub struct Consequence {
    pub(crate) var: VariableKey,
    pub(crate) term: String,
}

impl Variable<Consequent> {
    /// The consequent proposition `variable is term`.
    pub fn is(self, term: impl Into<String>) -> Consequence {
        Consequence {
            var: self.0,
            term: term.into(),
        }
    }
}

/// Ordered rule base.
///
/// Order is kept for diagnostics only; max-aggregation makes the computed
/// output independent of it.
#[derive(Debug, Default)]
pub struct Rules(pub(crate) Vec<Rule>);

impl Rules {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn add(&mut self, antecedent: Expr, consequence: Consequence) {
        self.0.push(Rule {
            antecedent,
            consequence,
        });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug)]
pub(crate) struct Rule {
    pub(crate) antecedent: Expr,
    pub(crate) consequence: Consequence,
}
