use std::collections::HashMap;

use tracing::{debug, trace};

use crate::dsl::Expr;
use crate::error::EngineError;
use crate::inputs::Inputs;
use crate::math::centroid;
use crate::outputs::Outputs;
use crate::rules::Rules;
use crate::simulation::Simulation;
use crate::variable::{Antecedent, Consequent, Role, Variable, VariableKey, Variables};

/// An immutable Mamdani inference system: linguistic variables plus a rule
/// base.
///
/// Construction validates every name the rules reference, so a built
/// system cannot fail on a bad name at compute time. It holds no mutable
/// state and can be shared across threads; per-call state lives in
/// [`Inputs`]/[`Simulation`].
#[derive(Debug)]
pub struct ControlSystem {
    vars: Variables,
    rules: Rules,
    /// Antecedents referenced by at least one rule; these must be bound
    /// before a computation.
    required: Vec<VariableKey>,
}

impl ControlSystem {
    pub fn new(vars: Variables, rules: Rules) -> Result<Self, EngineError> {
        let mut required = Vec::new();

        for (index, rule) in rules.0.iter().enumerate() {
            for (key, term) in rule.antecedent.terms() {
                Self::check_term(&vars, key, term, Role::Antecedent)
                    .map_err(|e| e.in_rule(index))?;
                if !required.contains(&key) {
                    required.push(key);
                }
            }

            Self::check_term(
                &vars,
                rule.consequence.var,
                &rule.consequence.term,
                Role::Consequent,
            )
            .map_err(|e| e.in_rule(index))?;
        }

        Ok(Self {
            vars,
            rules,
            required,
        })
    }

    fn check_term(
        vars: &Variables,
        key: VariableKey,
        term: &str,
        role: Role,
    ) -> Result<(), EngineError> {
        let var = vars.get(key)?;

        if var.role != role {
            return Err(EngineError::RoleMismatch {
                variable: var.name.clone(),
                expected: match role {
                    Role::Antecedent => "an antecedent",
                    Role::Consequent => "a consequent",
                },
            });
        }

        var.require_term(term).map(|_| ())
    }

    /// Fresh per-call state bound to this system.
    pub fn simulation(&self) -> Simulation<'_> {
        Simulation::new(self)
    }

    /// Looks up an input variable by name.
    pub fn antecedent(&self, name: &str) -> Result<Variable<Antecedent>, EngineError> {
        let (key, var) = self.vars.lookup(name)?;

        if var.role != Role::Antecedent {
            return Err(EngineError::RoleMismatch {
                variable: name.to_owned(),
                expected: "an antecedent",
            });
        }

        Ok(Variable::from_key(key))
    }

    /// Looks up an output variable by name.
    pub fn consequent(&self, name: &str) -> Result<Variable<Consequent>, EngineError> {
        let (key, var) = self.vars.lookup(name)?;

        if var.role != Role::Consequent {
            return Err(EngineError::RoleMismatch {
                variable: name.to_owned(),
                expected: "a consequent",
            });
        }

        Ok(Variable::from_key(key))
    }

    /// The sample grid of a variable, by name. External plotting uses it
    /// as the x axis for [`sample`](Self::sample) curves.
    pub fn universe(&self, variable: &str) -> Result<&crate::Universe, EngineError> {
        let (_, var) = self.vars.lookup(variable)?;
        Ok(&var.universe)
    }

    /// Degree of membership of `x` in one term, by name.
    pub fn membership(&self, variable: &str, term: &str, x: f64) -> Result<f64, EngineError> {
        let (_, var) = self.vars.lookup(variable)?;
        var.membership(term, x)
    }

    /// A term's membership curve sampled over its variable's universe,
    /// ordered by `x`. Pure read, intended for plotting.
    pub fn sample(&self, variable: &str, term: &str) -> Result<Vec<(f64, f64)>, EngineError> {
        let (_, var) = self.vars.lookup(variable)?;
        let term = var.require_term(term)?;

        Ok(var
            .universe
            .points()
            .iter()
            .copied()
            .zip(term.curve.iter().copied())
            .collect())
    }

    /// Runs the full pipeline for every output variable.
    ///
    /// Fails with [`EngineError::UnboundInput`] when an antecedent some
    /// rule references has no crisp value, and with
    /// [`EngineError::DefuzzificationUndefined`] for any output variable
    /// whose aggregate carries no area (no rule fired for it, or none
    /// targets it at all).
    pub fn compute(&self, inputs: &Inputs) -> Result<Outputs, EngineError> {
        for &key in &self.required {
            if !inputs.0.contains_key(&key) {
                return Err(EngineError::UnboundInput {
                    variable: self.vars.get(key)?.name.clone(),
                });
            }
        }

        // Fuzzification: degree of every term of every bound input, at the
        // exact crisp value rather than the nearest grid point.
        let mut degrees: HashMap<(VariableKey, &str), f64> = HashMap::new();

        for (&key, &x) in &inputs.0 {
            let var = self.vars.get(key)?;
            for (term, degree) in var.fuzzify(x) {
                trace!(variable = %var.name, term, degree, "fuzzified");
                degrees.insert((key, term), degree);
            }
        }

        // Rule evaluation and aggregation: min-implication folded into the
        // running pointwise maximum per output variable.
        let mut aggregates: HashMap<VariableKey, Vec<f64>> = HashMap::new();

        for (index, rule) in self.rules.0.iter().enumerate() {
            let strength = self.firing_strength(&rule.antecedent, &degrees)?;
            debug!(rule = index, strength, "rule evaluated");

            if strength == 0.0 {
                continue;
            }

            let var = self.vars.get(rule.consequence.var)?;
            let term = var.require_term(&rule.consequence.term)?;
            let agg = aggregates
                .entry(rule.consequence.var)
                .or_insert_with(|| vec![0.0; var.universe.len()]);

            for (a, &m) in agg.iter_mut().zip(&term.curve) {
                *a = a.max(strength.min(m));
            }
        }

        // Defuzzification covers every declared output, not only the ones
        // some rule fired for.
        let mut outputs = HashMap::new();

        for (key, var) in self.vars.consequents() {
            let value = aggregates
                .get(&key)
                .and_then(|agg| centroid(var.universe.points(), agg))
                .ok_or_else(|| EngineError::DefuzzificationUndefined {
                    variable: var.name.clone(),
                })?;

            debug!(variable = %var.name, value, "defuzzified");
            outputs.insert(key, value);
        }

        Ok(Outputs(outputs))
    }

    /// Name-keyed wrapper around [`compute`](Self::compute) for callers
    /// that deal in strings, such as UI glue.
    pub fn compute_named<'a>(
        &self,
        inputs: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<HashMap<String, f64>, EngineError> {
        let mut bound = Inputs::new();

        for (name, value) in inputs {
            bound.add(self.antecedent(name)?, value);
        }

        let outputs = self.compute(&bound)?;
        let mut named = HashMap::with_capacity(outputs.0.len());

        for (key, value) in &outputs.0 {
            named.insert(self.vars.get(*key)?.name.clone(), *value);
        }

        Ok(named)
    }

    fn firing_strength(
        &self,
        expr: &Expr,
        degrees: &HashMap<(VariableKey, &str), f64>,
    ) -> Result<f64, EngineError> {
        match expr {
            Expr::Is(key, term) => degrees
                .get(&(*key, term.as_str()))
                .copied()
                .ok_or_else(|| match self.vars.get(*key) {
                    Ok(var) => EngineError::UnknownTerm {
                        variable: var.name.clone(),
                        term: term.clone(),
                    },
                    Err(e) => e,
                }),
            Expr::And(lhs, rhs) => Ok(f64::min(
                self.firing_strength(lhs, degrees)?,
                self.firing_strength(rhs, degrees)?,
            )),
            Expr::Or(lhs, rhs) => Ok(f64::max(
                self.firing_strength(lhs, degrees)?,
                self.firing_strength(rhs, degrees)?,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MembershipFunction;

    /// The spare-parts center system: three inputs, one seven-term output,
    /// four rules, universes 0..=1.2 at step 0.001.
    fn spare_parts_system(rule_order: &[usize]) -> ControlSystem {
        let mut vars = Variables::new();

        let m = vars.antecedent("tempo_espera", 0.0..=1.2, 0.001).unwrap();
        vars.term(m, "muito_pequeno", MembershipFunction::trapezoid(0.0, 0.0, 0.1, 0.3))
            .unwrap();
        vars.term(m, "pequeno", MembershipFunction::triangle(0.1, 0.3, 0.5))
            .unwrap();
        vars.term(m, "medio", MembershipFunction::trapezoid(0.4, 0.6, 0.7, 0.7))
            .unwrap();

        let p = vars.antecedent("fator_utilizacao", 0.0..=1.2, 0.001).unwrap();
        vars.term(p, "baixo", MembershipFunction::trapezoid(0.0, 0.0, 0.2, 0.4))
            .unwrap();
        vars.term(p, "medio", MembershipFunction::triangle(0.3, 0.5, 0.7))
            .unwrap();
        vars.term(p, "alto", MembershipFunction::trapezoid(0.6, 0.8, 1.0, 1.0))
            .unwrap();

        let s = vars
            .antecedent("numero_funcionarios", 0.0..=1.2, 0.001)
            .unwrap();
        vars.term(s, "pequeno", MembershipFunction::trapezoid(0.0, 0.0, 0.4, 0.6))
            .unwrap();
        vars.term(s, "medio", MembershipFunction::triangle(0.4, 0.6, 0.8))
            .unwrap();
        vars.term(s, "grande", MembershipFunction::trapezoid(0.6, 0.8, 1.0, 1.0))
            .unwrap();

        let n = vars.consequent("numero_pecas", 0.0..=1.2, 0.001).unwrap();
        vars.term(n, "muito_pequeno", MembershipFunction::trapezoid(0.0, 0.0, 0.1, 0.3))
            .unwrap();
        vars.term(n, "pequeno", MembershipFunction::triangle(0.0, 0.2, 0.4))
            .unwrap();
        vars.term(n, "pouco_pequeno", MembershipFunction::triangle(0.25, 0.35, 0.45))
            .unwrap();
        vars.term(n, "medio", MembershipFunction::triangle(0.3, 0.5, 0.7))
            .unwrap();
        vars.term(n, "pouco_grande", MembershipFunction::triangle(0.55, 0.65, 0.75))
            .unwrap();
        vars.term(n, "grande", MembershipFunction::triangle(0.6, 0.8, 1.0))
            .unwrap();
        vars.term(n, "muito_grande", MembershipFunction::trapezoid(0.7, 0.9, 1.0, 1.0))
            .unwrap();

        let all: Vec<(Expr, crate::rules::Consequence)> = vec![
            (m.is("muito_pequeno").and(s.is("pequeno")), n.is("muito_grande")),
            (m.is("pequeno").and(s.is("grande")), n.is("pequeno")),
            (p.is("baixo"), n.is("pequeno")),
            (p.is("alto"), n.is("grande")),
        ];

        let mut picked: Vec<Option<(Expr, crate::rules::Consequence)>> =
            all.into_iter().map(Some).collect();
        let mut rules = Rules::new();
        for &i in rule_order {
            let (expr, cons) = picked[i].take().unwrap();
            rules.add(expr, cons);
        }

        ControlSystem::new(vars, rules).unwrap()
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn and_is_min_or_is_max() {
        let mut vars = Variables::new();
        let a = vars.antecedent("a", 0.0..=1.0, None).unwrap();
        vars.term(a, "low", MembershipFunction::triangle(0.0, 0.0, 1.0))
            .unwrap();
        vars.term(a, "high", MembershipFunction::triangle(0.0, 1.0, 1.0))
            .unwrap();
        let b = vars.antecedent("b", 0.0..=1.0, None).unwrap();
        vars.term(b, "low", MembershipFunction::triangle(0.0, 0.0, 1.0))
            .unwrap();

        let system = ControlSystem::new(vars, Rules::new()).unwrap();
        let degrees = HashMap::from([
            ((a.key(), "low"), 0.3),
            ((a.key(), "high"), 0.8),
            ((b.key(), "low"), 0.6),
        ]);

        let w = system
            .firing_strength(&a.is("low").and(b.is("low")), &degrees)
            .unwrap();
        assert_eq!(w, 0.3);

        let w = system
            .firing_strength(&a.is("low").or(b.is("low")), &degrees)
            .unwrap();
        assert_eq!(w, 0.6);

        let w = system
            .firing_strength(
                &a.is("high").and(a.is("low").or(b.is("low"))),
                &degrees,
            )
            .unwrap();
        assert_eq!(w, 0.6);

        let w = system.firing_strength(&a.is("high"), &degrees).unwrap();
        assert_eq!(w, 0.8);
    }

    #[test]
    fn single_fully_fired_rule_yields_the_consequent_centroid() {
        let system = spare_parts_system(&[0, 1, 2, 3]);

        // Only `p is baixo` (degree 1.0) fires; the output must be the
        // centroid of triangle(0, 0.2, 0.4), i.e. its peak.
        let out = system
            .compute_named([
                ("tempo_espera", 1.0),
                ("fator_utilizacao", 0.0),
                ("numero_funcionarios", 0.0),
            ])
            .unwrap();

        assert!(close(out["numero_pecas"], 0.2, 1e-6));
    }

    #[test]
    fn partially_fired_rule_keeps_a_symmetric_aggregate_centred() {
        let system = spare_parts_system(&[0, 1, 2, 3]);

        // `p is baixo` fires at 0.5; the capped triangle stays symmetric
        // around 0.2.
        let out = system
            .compute_named([
                ("tempo_espera", 1.0),
                ("fator_utilizacao", 0.3),
                ("numero_funcionarios", 0.0),
            ])
            .unwrap();

        assert!(close(out["numero_pecas"], 0.2, 1e-6));
    }

    #[test]
    fn missing_input_is_reported_not_defaulted() {
        let system = spare_parts_system(&[0, 1, 2, 3]);
        let err = system
            .compute_named([("tempo_espera", 0.3), ("fator_utilizacao", 0.3)])
            .unwrap_err();

        assert_eq!(
            err,
            EngineError::UnboundInput {
                variable: "numero_funcionarios".into()
            }
        );
    }

    #[test]
    fn zero_firing_strengths_leave_defuzzification_undefined() {
        let system = spare_parts_system(&[0, 1, 2, 3]);

        // m = 1.0 zeroes every m term a rule uses, p = 0.5 sits between
        // `baixo` and `alto`, and the s conjunctions are dragged to zero.
        let err = system
            .compute_named([
                ("tempo_espera", 1.0),
                ("fator_utilizacao", 0.5),
                ("numero_funcionarios", 0.0),
            ])
            .unwrap_err();

        assert_eq!(
            err,
            EngineError::DefuzzificationUndefined {
                variable: "numero_pecas".into()
            }
        );
    }

    #[test]
    fn untargeted_consequent_is_undefined_too() {
        let mut vars = Variables::new();
        let a = vars.antecedent("a", 0.0..=1.0, None).unwrap();
        vars.term(a, "low", MembershipFunction::triangle(0.0, 0.0, 1.0))
            .unwrap();
        vars.consequent("out", 0.0..=1.0, None).unwrap();

        let system = ControlSystem::new(vars, Rules::new()).unwrap();
        let err = system.compute(&Inputs::new()).unwrap_err();

        assert_eq!(
            err,
            EngineError::DefuzzificationUndefined {
                variable: "out".into()
            }
        );
    }

    #[test]
    fn rule_order_does_not_change_the_output() {
        // Inputs chosen so two rules fire on different consequent terms.
        let inputs = [
            ("tempo_espera", 0.2),
            ("fator_utilizacao", 0.3),
            ("numero_funcionarios", 0.5),
        ];
        let reference = spare_parts_system(&[0, 1, 2, 3])
            .compute_named(inputs)
            .unwrap()["numero_pecas"];

        // Heap's algorithm over the four rule indices.
        let mut order = [0usize, 1, 2, 3];
        let mut stack = [0usize; 4];
        let mut i = 0;
        let check = |order: &[usize]| {
            let out = spare_parts_system(order).compute_named(inputs).unwrap();
            assert!(
                close(out["numero_pecas"], reference, 1e-12),
                "order {order:?} diverged"
            );
        };

        check(&order);
        while i < order.len() {
            if stack[i] < i {
                if i % 2 == 0 {
                    order.swap(0, i);
                } else {
                    order.swap(stack[i], i);
                }
                check(&order);
                stack[i] += 1;
                i = 0;
            } else {
                stack[i] = 0;
                i += 1;
            }
        }
    }

    #[test]
    fn construction_rejects_unknown_terms_with_rule_identity() {
        let mut vars = Variables::new();
        let a = vars.antecedent("a", 0.0..=1.0, None).unwrap();
        vars.term(a, "low", MembershipFunction::triangle(0.0, 0.0, 1.0))
            .unwrap();
        let out = vars.consequent("out", 0.0..=1.0, None).unwrap();
        vars.term(out, "small", MembershipFunction::triangle(0.0, 0.0, 1.0))
            .unwrap();

        let mut rules = Rules::new();
        rules.add(a.is("low"), out.is("small"));
        rules.add(a.is("huge"), out.is("small"));

        let err = ControlSystem::new(vars, rules).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownTerm {
                variable: "a".into(),
                term: "huge".into(),
            }
            .in_rule(1)
        );
    }

    #[test]
    fn name_lookups_check_roles() {
        let system = spare_parts_system(&[0, 1, 2, 3]);

        assert!(system.antecedent("tempo_espera").is_ok());
        assert!(matches!(
            system.antecedent("numero_pecas"),
            Err(EngineError::RoleMismatch { .. })
        ));
        assert!(matches!(
            system.consequent("tempo_espera"),
            Err(EngineError::RoleMismatch { .. })
        ));
        assert!(matches!(
            system.antecedent("nonexistent"),
            Err(EngineError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn sample_exposes_the_full_curve() {
        let system = spare_parts_system(&[0, 1, 2, 3]);
        let curve = system.sample("numero_pecas", "pequeno").unwrap();

        assert_eq!(curve.len(), 1201);
        assert_eq!(system.universe("numero_pecas").unwrap().len(), 1201);
        assert_eq!(curve[0], (0.0, 0.0));
        assert!(curve.windows(2).all(|w| w[0].0 < w[1].0));

        // Peak of triangle(0, 0.2, 0.4) lands on the grid.
        let peak = curve
            .iter()
            .copied()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!(close(peak.0, 0.2, 1e-9));
        assert!(close(peak.1, 1.0, 1e-9));

        assert!(matches!(
            system.sample("numero_pecas", "enorme"),
            Err(EngineError::UnknownTerm { .. })
        ));
    }

    #[test]
    fn membership_matches_the_declared_shapes() {
        let system = spare_parts_system(&[0, 1, 2, 3]);

        assert_eq!(
            system.membership("tempo_espera", "muito_pequeno", 0.05),
            Ok(1.0)
        );
        assert!(close(
            system
                .membership("tempo_espera", "muito_pequeno", 0.2)
                .unwrap(),
            0.5,
            1e-12
        ));
        assert_eq!(
            system.membership("tempo_espera", "muito_pequeno", 0.4),
            Ok(0.0)
        );
    }

    #[test]
    fn mixed_aggregate_lands_between_its_parts() {
        let system = spare_parts_system(&[0, 1, 2, 3]);

        // Both `muito_grande` (via rule 1) and `grande` (via rule 4) fire
        // at full strength; the centroid of their max falls above the
        // centroid of `grande` alone and inside the universe.
        let out = system
            .compute_named([
                ("tempo_espera", 0.05),
                ("fator_utilizacao", 0.9),
                ("numero_funcionarios", 0.2),
            ])
            .unwrap();
        let n = out["numero_pecas"];

        assert!(n > 0.8, "expected a pull past grande's peak, got {n}");
        assert!(n < 1.0);
    }
}
