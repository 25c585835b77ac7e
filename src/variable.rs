use std::collections::HashMap;
use std::marker::PhantomData;
use std::ops::RangeInclusive;

use slotmap::{new_key_type, SlotMap};

use crate::error::EngineError;
use crate::membership::MembershipFunction;
use crate::universe::Universe;

new_key_type! {
    /// Key of a registered linguistic variable.
    pub struct VariableKey;
}

/// Role marker for input variables.
pub enum Antecedent {}

/// Role marker for output variables.
pub enum Consequent {}

/// Typed handle to a registered variable.
///
/// Handles are resolved once at registration; the phantom role keeps
/// antecedents out of rule consequents (and vice versa) at compile time.
pub struct Variable<R>(pub(crate) VariableKey, PhantomData<R>);

impl<R> Clone for Variable<R> {
    fn clone(&self) -> Self {
        Variable(self.0, PhantomData)
    }
}

impl<R> Copy for Variable<R> {}

impl<R> Variable<R> {
    pub(crate) fn from_key(key: VariableKey) -> Self {
        Variable(key, PhantomData)
    }

    pub fn key(self) -> VariableKey {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Role {
    Antecedent,
    Consequent,
}

#[derive(Debug)]
pub(crate) struct Term {
    pub(crate) name: String,
    pub(crate) mf: MembershipFunction,
    /// Curve pre-sampled over the variable's universe grid.
    pub(crate) curve: Vec<f64>,
}

#[derive(Debug)]
pub(crate) struct LinguisticVariable {
    pub(crate) name: String,
    pub(crate) role: Role,
    pub(crate) universe: Universe,
    /// Declaration order is kept so fuzzification and sampling are
    /// deterministic.
    pub(crate) terms: Vec<Term>,
}

impl LinguisticVariable {
    pub(crate) fn term(&self, name: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.name == name)
    }

    pub(crate) fn require_term(&self, name: &str) -> Result<&Term, EngineError> {
        self.term(name).ok_or_else(|| EngineError::UnknownTerm {
            variable: self.name.clone(),
            term: name.to_owned(),
        })
    }

    /// Degree of `x` in the named term.
    pub(crate) fn membership(&self, term: &str, x: f64) -> Result<f64, EngineError> {
        self.require_term(term).map(|t| t.mf.degree(x))
    }

    /// Degrees of every term at `x`, in declaration order.
    pub(crate) fn fuzzify(&self, x: f64) -> impl Iterator<Item = (&str, f64)> {
        self.terms
            .iter()
            .map(move |t| (t.name.as_str(), t.mf.degree(x)))
    }
}

/// Registry of linguistic variables.
///
/// Variables and their terms are declared here, then handed to
/// [`ControlSystem::new`](crate::ControlSystem::new); the registry is
/// immutable from that point on. Callers address variables through typed
/// handles, or by name at the system boundary.
#[derive(Debug, Default)]
pub struct Variables {
    pub(crate) slots: SlotMap<VariableKey, LinguisticVariable>,
    pub(crate) by_name: HashMap<String, VariableKey>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an input variable. The step defaults to 0.1 when not
    /// given and controls defuzzification precision and cost.
    pub fn antecedent(
        &mut self,
        name: impl Into<String>,
        universe_range: RangeInclusive<f64>,
        step: impl Into<Option<f64>>,
    ) -> Result<Variable<Antecedent>, EngineError> {
        self.insert(name.into(), Role::Antecedent, universe_range, step.into())
            .map(Variable::from_key)
    }

    /// Registers an output variable.
    pub fn consequent(
        &mut self,
        name: impl Into<String>,
        universe_range: RangeInclusive<f64>,
        step: impl Into<Option<f64>>,
    ) -> Result<Variable<Consequent>, EngineError> {
        self.insert(name.into(), Role::Consequent, universe_range, step.into())
            .map(Variable::from_key)
    }

    fn insert(
        &mut self,
        name: String,
        role: Role,
        universe_range: RangeInclusive<f64>,
        step: Option<f64>,
    ) -> Result<VariableKey, EngineError> {
        if self.by_name.contains_key(&name) {
            return Err(EngineError::DuplicateVariable { name });
        }

        let universe = Universe::new(&name, universe_range, step.unwrap_or(0.1))?;
        let key = self.slots.insert(LinguisticVariable {
            name: name.clone(),
            role,
            universe,
            terms: Vec::new(),
        });
        self.by_name.insert(name, key);

        Ok(key)
    }

    /// Attaches a named membership function to `var` and samples it over
    /// the variable's universe. Breakpoints outside the declared bounds
    /// are clamped onto them.
    pub fn term<R>(
        &mut self,
        var: Variable<R>,
        name: impl Into<String>,
        mf: MembershipFunction,
    ) -> Result<(), EngineError> {
        let name = name.into();
        let v = self.get_mut(var.0)?;

        mf.validate(&v.name)?;
        if v.term(&name).is_some() {
            return Err(EngineError::DuplicateTerm {
                variable: v.name.clone(),
                term: name,
            });
        }

        let mf = mf.clamped_to(v.universe.lower(), v.universe.upper());
        let curve = v.universe.points().iter().map(|&x| mf.degree(x)).collect();
        v.terms.push(Term { name, mf, curve });

        Ok(())
    }

    pub(crate) fn get(&self, key: VariableKey) -> Result<&LinguisticVariable, EngineError> {
        self.slots
            .get(key)
            .ok_or_else(|| EngineError::UnknownVariable {
                name: format!("{key:?}"),
            })
    }

    fn get_mut(&mut self, key: VariableKey) -> Result<&mut LinguisticVariable, EngineError> {
        self.slots
            .get_mut(key)
            .ok_or_else(|| EngineError::UnknownVariable {
                name: format!("{key:?}"),
            })
    }

    pub(crate) fn lookup(
        &self,
        name: &str,
    ) -> Result<(VariableKey, &LinguisticVariable), EngineError> {
        let key = *self
            .by_name
            .get(name)
            .ok_or_else(|| EngineError::UnknownVariable {
                name: name.to_owned(),
            })?;

        Ok((key, &self.slots[key]))
    }

    pub(crate) fn consequents(
        &self,
    ) -> impl Iterator<Item = (VariableKey, &LinguisticVariable)> {
        self.slots
            .iter()
            .filter(|(_, v)| v.role == Role::Consequent)
    }
}

#[cfg(test)]
fn sample_vars() -> (Variables, Variable<Antecedent>) {
    let mut vars = Variables::new();
    let m = vars.antecedent("tempo_espera", 0.0..=1.2, 0.001).unwrap();
    vars.term(m, "muito_pequeno", MembershipFunction::trapezoid(0.0, 0.0, 0.1, 0.3))
        .unwrap();
    (vars, m)
}

#[test]
fn rejects_duplicate_names() {
    let (mut vars, m) = sample_vars();

    assert!(matches!(
        vars.antecedent("tempo_espera", 0.0..=1.0, None),
        Err(EngineError::DuplicateVariable { .. })
    ));
    assert!(matches!(
        vars.term(m, "muito_pequeno", MembershipFunction::triangle(0.0, 0.5, 1.0)),
        Err(EngineError::DuplicateTerm { .. })
    ));
}

#[test]
fn membership_reports_unknown_terms() {
    let (vars, m) = sample_vars();
    let var = vars.get(m.key()).unwrap();

    assert_eq!(var.membership("muito_pequeno", 0.05), Ok(1.0));
    assert!(matches!(
        var.membership("gigante", 0.05),
        Err(EngineError::UnknownTerm { .. })
    ));
}

#[test]
fn out_of_bounds_breakpoints_are_clamped() {
    let (mut vars, m) = sample_vars();
    vars.term(m, "largo", MembershipFunction::trapezoid(0.8, 1.0, 1.5, 2.0))
        .unwrap();

    let var = vars.get(m.key()).unwrap();
    let term = var.term("largo").unwrap();

    // The plateau now runs to the clamped upper bound.
    assert_eq!(term.mf, MembershipFunction::trapezoid(0.8, 1.0, 1.2, 1.2));
    assert_eq!(*term.curve.last().unwrap(), 1.0);
}

#[test]
fn fuzzify_covers_every_term_in_declaration_order() {
    let (mut vars, m) = sample_vars();
    vars.term(m, "pequeno", MembershipFunction::triangle(0.1, 0.3, 0.5))
        .unwrap();

    let var = vars.get(m.key()).unwrap();
    let degrees: Vec<(&str, f64)> = var.fuzzify(0.2).collect();

    assert_eq!(degrees.len(), 2);
    assert_eq!(degrees[0].0, "muito_pequeno");
    assert!((degrees[0].1 - 0.5).abs() < 1e-12);
    assert_eq!(degrees[1].0, "pequeno");
    assert!((degrees[1].1 - 0.5).abs() < 1e-12);
}
