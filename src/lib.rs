//! Mamdani-style fuzzy inference.
//!
//! A [`ControlSystem`] is built once from linguistic variables and a rule
//! base, then shared read-only. Each computation fuzzifies crisp inputs
//! against the declared membership functions, evaluates every rule (AND is
//! minimum, OR is maximum), min-caps the consequent terms by the firing
//! strengths, max-aggregates per output variable and defuzzifies the
//! aggregate with the discrete centroid.
//!
//! ```
//! use nebulosa::{ControlSystem, MembershipFunction, Rules, Variables};
//!
//! let mut vars = Variables::new();
//! let service = vars.antecedent("service", 0.0..=10.0, 0.01)?;
//! vars.term(service, "poor", MembershipFunction::triangle(0.0, 0.0, 5.0))?;
//! vars.term(service, "good", MembershipFunction::triangle(5.0, 10.0, 10.0))?;
//!
//! let tip = vars.consequent("tip", 0.0..=30.0, 0.01)?;
//! vars.term(tip, "low", MembershipFunction::triangle(0.0, 5.0, 10.0))?;
//! vars.term(tip, "high", MembershipFunction::triangle(20.0, 25.0, 30.0))?;
//!
//! let mut rules = Rules::new();
//! rules.add(service.is("poor"), tip.is("low"));
//! rules.add(service.is("good"), tip.is("high"));
//!
//! let system = ControlSystem::new(vars, rules)?;
//! let mut sim = system.simulation();
//! sim.input(service, 0.0);
//! sim.compute()?;
//! assert!((sim.output(tip).unwrap() - 5.0).abs() < 1e-6);
//! # Ok::<(), nebulosa::EngineError>(())
//! ```
//!
//! Runtime failures (a missing input, an aggregate with no area) are
//! reported as [`EngineError`] values; the engine never substitutes a
//! guessed number.

mod dsl;
mod error;
mod inference;
mod inputs;
mod math;
mod membership;
mod outputs;
mod rules;
mod simulation;
mod universe;
mod variable;

pub use dsl::Expr;
pub use error::EngineError;
pub use inference::ControlSystem;
pub use inputs::Inputs;
pub use membership::MembershipFunction;
pub use outputs::Outputs;
pub use rules::{Consequence, Rules};
pub use simulation::Simulation;
pub use universe::Universe;
pub use variable::{Antecedent, Consequent, Variable, VariableKey, Variables};
