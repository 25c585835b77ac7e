use thiserror::Error;

/// Errors reported by the engine.
///
/// Construction-time errors (bad names, malformed domains) prevent a
/// [`ControlSystem`](crate::ControlSystem) from being built at all. Runtime
/// errors (`UnboundInput`, `DefuzzificationUndefined`) are returned per
/// computation and leave the system usable; the caller decides whether to
/// retry, default, or surface them.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("unknown variable `{name}`")]
    UnknownVariable { name: String },

    #[error("variable `{variable}` has no term `{term}`")]
    UnknownTerm { variable: String, term: String },

    #[error("variable `{name}` is already defined")]
    DuplicateVariable { name: String },

    #[error("variable `{variable}` already has a term `{term}`")]
    DuplicateTerm { variable: String, term: String },

    #[error("variable `{variable}` is not {expected}")]
    RoleMismatch {
        variable: String,
        expected: &'static str,
    },

    #[error("invalid domain for variable `{variable}`: {reason}")]
    InvalidDomain { variable: String, reason: String },

    #[error("rule {index}: {source}")]
    Rule {
        index: usize,
        #[source]
        source: Box<EngineError>,
    },

    #[error("no crisp value bound for input variable `{variable}`")]
    UnboundInput { variable: String },

    #[error("defuzzification undefined for `{variable}`: no rule produced a non-zero contribution")]
    DefuzzificationUndefined { variable: String },
}

impl EngineError {
    pub(crate) fn in_rule(self, index: usize) -> Self {
        EngineError::Rule {
            index,
            source: Box::new(self),
        }
    }
}
