use crate::variable::{Antecedent, Variable, VariableKey};

/// Rule antecedent expression: term references combined with fuzzy AND
/// (minimum) and OR (maximum).
///
/// Built from typed handles, e.g.
/// `service.is("poor").and(food.is("rancid"))`.
#[derive(Clone, Debug)]
pub enum Expr {
    Is(VariableKey, String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn and(self, rhs: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(rhs))
    }

    /// Every `(variable, term)` reference in the tree, left to right.
    pub(crate) fn terms(&self) -> Vec<(VariableKey, &str)> {
        fn walk<'e>(expr: &'e Expr, out: &mut Vec<(VariableKey, &'e str)>) {
            match expr {
                Expr::Is(key, term) => out.push((*key, term)),
                Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                    walk(lhs, out);
                    walk(rhs, out);
                }
            }
        }

        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }
}

impl Variable<Antecedent> {
    /// The leaf proposition `variable is term`.
    pub fn is(self, term: impl Into<String>) -> Expr {
        Expr::Is(self.0, term.into())
    }
}
