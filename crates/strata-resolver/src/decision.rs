//! Decision functions steering [`crate::walk::Walk`].

use std::fmt;

use rand::Rng;

use strata_util::errors::StrataError;

use crate::walk::PartialAssignment;

/// The fixed registry of decision functions, selected by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecisionFunction {
    /// Always deepen: exhaustive enumeration.
    All,
    /// Deepen with a fixed probability, drawn from the run's generator.
    Sampling { probability: f64 },
}

impl DecisionFunction {
    /// Registry keys accepted by [`DecisionFunction::from_name`].
    pub const NAMES: &'static [&'static str] = &["all", "sampling"];

    pub fn from_name(name: &str, sampling_probability: f64) -> Result<Self, StrataError> {
        match name {
            "all" => Ok(Self::All),
            "sampling" => {
                if !(0.0..=1.0).contains(&sampling_probability) {
                    return Err(StrataError::configuration(format!(
                        "sampling probability must be within [0, 1], got {sampling_probability}"
                    )));
                }
                Ok(Self::Sampling {
                    probability: sampling_probability,
                })
            }
            other => Err(StrataError::configuration(format!(
                "decision function {other} is not known, available are: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }

    pub fn decide<R: Rng + ?Sized>(&self, _partial: &PartialAssignment<'_>, rng: &mut R) -> bool {
        match *self {
            Self::All => true,
            Self::Sampling { probability } => rng.gen_bool(probability),
        }
    }
}

impl fmt::Display for DecisionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Sampling { probability } => write!(f, "sampling(p={probability})"),
        }
    }
}
