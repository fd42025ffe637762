//! Parameters: symbolic value placeholders narrowed by resolution.
//!
//! Resolution merges two constraints on the same quantity (a resistance, a
//! rail voltage, ...) and fails loudly when they are incompatible. It is a
//! pairwise merge, not a solver.

use serde::{Deserialize, Serialize};

/// Why two parameters could not be merged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    #[error("conflicting constants: {0} != {1}")]
    ConflictingConstants(f64, f64),

    #[error("constant {value} not in range [{min}, {max}]")]
    ConstantNotInRange { value: f64, min: f64, max: f64 },

    #[error("conflicting ranges: [{0}, {1}] and [{2}, {3}] do not overlap")]
    ConflictingRanges(f64, f64, f64, f64),

    #[error("constant {0} not in set")]
    ConstantNotInSet(f64),

    #[error("resolution leaves no admissible value")]
    EmptySet,

    #[error("invalid range: min {min} > max {max}")]
    InvalidRange { min: f64, max: f64 },
}

/// A symbolic value placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Parameter {
    /// Not yet determined; absorbed by anything.
    Tbd,
    Constant(f64),
    /// Inclusive bounds.
    Range { min: f64, max: f64 },
    /// One of a finite set of values.
    Set(Vec<f64>),
}

impl Default for Parameter {
    fn default() -> Self {
        Parameter::Tbd
    }
}

impl Parameter {
    /// Range constructor that rejects inverted bounds.
    pub fn range(min: f64, max: f64) -> Result<Self, ResolutionError> {
        if min > max {
            return Err(ResolutionError::InvalidRange { min, max });
        }
        Ok(Parameter::Range { min, max })
    }

    /// `center ± center * tolerance` (tolerance as a fraction).
    pub fn from_center(center: f64, tolerance: f64) -> Self {
        let delta = (center * tolerance).abs();
        Parameter::Range {
            min: center - delta,
            max: center + delta,
        }
    }

    pub fn set(values: impl IntoIterator<Item = f64>) -> Self {
        let mut values: Vec<f64> = values.into_iter().collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        Parameter::Set(values)
    }

    pub fn is_tbd(&self) -> bool {
        matches!(self, Parameter::Tbd)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Parameter::Constant(_))
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Parameter::Constant(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether `value` is admissible under this parameter.
    pub fn contains(&self, value: f64) -> bool {
        match self {
            Parameter::Tbd => true,
            Parameter::Constant(v) => *v == value,
            Parameter::Range { min, max } => *min <= value && value <= *max,
            Parameter::Set(values) => values.contains(&value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Parameter::Tbd => "TBD",
            Parameter::Constant(_) => "Constant",
            Parameter::Range { .. } => "Range",
            Parameter::Set(_) => "Set",
        }
    }

    /// Merge two constraints on the same quantity.
    ///
    /// Order independent. `Tbd` yields the other side; two constants must
    /// agree; a constant must lie in a range or set; two overlapping ranges
    /// yield their union bounds; sets narrow to the admissible members.
    pub fn resolve(&self, other: &Parameter) -> Result<Parameter, ResolutionError> {
        use Parameter::*;

        if self == other {
            return Ok(self.clone());
        }

        match (self, other) {
            (Tbd, p) | (p, Tbd) => Ok(p.clone()),

            (Constant(a), Constant(b)) => {
                if a != b {
                    return Err(ResolutionError::ConflictingConstants(*a, *b));
                }
                Ok(Constant(*a))
            }

            (Constant(v), Range { min, max }) | (Range { min, max }, Constant(v)) => {
                if *v < *min || *v > *max {
                    return Err(ResolutionError::ConstantNotInRange {
                        value: *v,
                        min: *min,
                        max: *max,
                    });
                }
                Ok(Constant(*v))
            }

            (Range { min: a_min, max: a_max }, Range { min: b_min, max: b_max }) => {
                if a_min.max(*b_min) > a_max.min(*b_max) {
                    return Err(ResolutionError::ConflictingRanges(*a_min, *a_max, *b_min, *b_max));
                }
                Ok(Range {
                    min: a_min.min(*b_min),
                    max: a_max.max(*b_max),
                })
            }

            (Constant(v), Set(values)) | (Set(values), Constant(v)) => {
                if !values.contains(v) {
                    return Err(ResolutionError::ConstantNotInSet(*v));
                }
                Ok(Constant(*v))
            }

            (Range { min, max }, Set(values)) | (Set(values), Range { min, max }) => {
                narrow(values.iter().copied().filter(|v| *min <= *v && *v <= *max))
            }

            (Set(a), Set(b)) => narrow(a.iter().copied().filter(|v| b.contains(v))),
        }
    }
}

/// Collapse surviving set members: none is a failure, one is a constant.
fn narrow(values: impl Iterator<Item = f64>) -> Result<Parameter, ResolutionError> {
    match Parameter::set(values) {
        Parameter::Set(values) if values.is_empty() => Err(ResolutionError::EmptySet),
        Parameter::Set(values) if values.len() == 1 => Ok(Parameter::Constant(values[0])),
        other => Ok(other),
    }
}

/// Left-fold [`Parameter::resolve`] over `params`, starting from `Tbd`.
pub fn resolve_all<'a>(
    params: impl IntoIterator<Item = &'a Parameter>,
) -> Result<Parameter, ResolutionError> {
    params
        .into_iter()
        .try_fold(Parameter::Tbd, |acc, p| acc.resolve(p))
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parameter::Tbd => write!(f, "TBD"),
            Parameter::Constant(v) => write!(f, "{v}"),
            Parameter::Range { min, max } => write!(f, "{min}..{max}"),
            Parameter::Set(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
        }
    }
}

impl From<f64> for Parameter {
    fn from(v: f64) -> Self {
        Parameter::Constant(v)
    }
}
