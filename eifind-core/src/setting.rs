//! Operator-facing incident energy settings.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the incident energy for a reduction is chosen.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IncidentEnergy {
    /// Determine from the monitors.
    Auto,
    /// A single operator-supplied energy (meV).
    Fixed(f64),
    /// Several operator-supplied energies (meV) for multi-rep reductions.
    List(Vec<f64>),
}

impl FromStr for IncidentEnergy {
    type Err = Error;

    /// Accepts `"Auto"` (any case), a single number, or a list such as
    /// `"[10, 25.5]"` or `"10,25.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }

        let bracketed = trimmed.starts_with('[') && trimmed.ends_with(']');
        let body = if bracketed {
            &trimmed[1..trimmed.len() - 1]
        } else {
            trimmed
        };

        let values = body
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite() && *value > 0.0)
                    .ok_or_else(|| {
                        Error::ConfigError(format!("invalid incident energy value: '{part}'"))
                    })
            })
            .collect::<Result<Vec<f64>, Error>>()?;

        match values.as_slice() {
            [] => Err(Error::ConfigError(format!(
                "no incident energy given in '{trimmed}'"
            ))),
            [single] if !bracketed => Ok(Self::Fixed(*single)),
            _ => Ok(Self::List(values)),
        }
    }
}

impl fmt::Display for IncidentEnergy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto"),
            Self::Fixed(value) => write!(f, "{value}"),
            Self::List(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Whether a reduction consumes one energy or every confirmed energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EnergySelection {
    /// Only the first confirmed energy.
    #[default]
    Primary,
    /// All confirmed energies, in candidate order.
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auto() {
        assert_eq!("Auto".parse::<IncidentEnergy>().unwrap(), IncidentEnergy::Auto);
        assert_eq!("AUTO".parse::<IncidentEnergy>().unwrap(), IncidentEnergy::Auto);
        assert_eq!(" auto ".parse::<IncidentEnergy>().unwrap(), IncidentEnergy::Auto);
    }

    #[test]
    fn test_parse_fixed_and_list() {
        assert_eq!(
            "25.0".parse::<IncidentEnergy>().unwrap(),
            IncidentEnergy::Fixed(25.0)
        );
        assert_eq!(
            "[10, 25.5]".parse::<IncidentEnergy>().unwrap(),
            IncidentEnergy::List(vec![10.0, 25.5])
        );
        assert_eq!(
            "10,25.5".parse::<IncidentEnergy>().unwrap(),
            IncidentEnergy::List(vec![10.0, 25.5])
        );
        // A bracketed single value stays a list.
        assert_eq!(
            "[100]".parse::<IncidentEnergy>().unwrap(),
            IncidentEnergy::List(vec![100.0])
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<IncidentEnergy>().is_err());
        assert!("[]".parse::<IncidentEnergy>().is_err());
        assert!("fast".parse::<IncidentEnergy>().is_err());
        assert!("-5".parse::<IncidentEnergy>().is_err());
    }

    #[test]
    fn test_display_round_trips_list() {
        let setting = IncidentEnergy::List(vec![10.0, 25.5]);
        assert_eq!(setting.to_string(), "[10, 25.5]");
    }
}
