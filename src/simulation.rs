use crate::error::EngineError;
use crate::inference::ControlSystem;
use crate::inputs::Inputs;
use crate::outputs::Outputs;
use crate::variable::{Antecedent, Consequent, Variable};

/// Mutable per-computation state over a shared [`ControlSystem`].
///
/// A simulation runs one computation at a time; concurrent callers each
/// create their own via [`ControlSystem::simulation`], the system itself
/// stays read-only.
pub struct Simulation<'s> {
    system: &'s ControlSystem,
    inputs: Inputs,
    outputs: Option<Outputs>,
}

impl<'s> Simulation<'s> {
    pub(crate) fn new(system: &'s ControlSystem) -> Self {
        Self {
            system,
            inputs: Inputs::new(),
            outputs: None,
        }
    }

    /// Binds a crisp input value, replacing any previous binding.
    pub fn input(&mut self, var: Variable<Antecedent>, value: f64) -> &mut Self {
        self.inputs.add(var, value);
        self
    }

    /// Runs the pipeline over the currently bound inputs. Earlier outputs
    /// are discarded on failure.
    pub fn compute(&mut self) -> Result<(), EngineError> {
        self.outputs = None;
        self.outputs = Some(self.system.compute(&self.inputs)?);

        Ok(())
    }

    /// The defuzzified value of an output variable, once
    /// [`compute`](Self::compute) has succeeded.
    pub fn output(&self, var: Variable<Consequent>) -> Option<f64> {
        self.outputs.as_ref().and_then(|o| o.get(var))
    }
}
