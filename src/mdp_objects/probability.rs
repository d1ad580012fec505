use anyhow::{Error, Result, anyhow};
use std::fmt;

/// How far above one a probability may be before it is rejected rather than rounded down to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// A transition probability that has been checked to be a finite real in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }

    /// Formats as a fraction with two decimals, e.g. "0.70".
    pub fn to_fraction_string(&self) -> String {
        format!("{:.2}", self.0)
    }

    /// Formats as a percentage with one decimal, e.g. "70.0%".
    pub fn to_percentage_string(&self) -> String {
        format!("{:.1}%", 100.0 * self.0)
    }
}

impl TryFrom<f64> for Probability {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        if value.is_nan() {
            Err(anyhow!("probability is not a number"))
        } else if value.is_infinite() {
            Err(anyhow!("probability {} is not finite", value))
        } else if value < 0.0 {
            Err(anyhow!("probability {} is negative", value))
        } else if value > 1.0 + PROBABILITY_TOLERANCE {
            Err(anyhow!("probability {} exceeds one", value))
        } else if value > 1.0 {
            Ok(Self(1.0))
        } else {
            Ok(Self(value))
        }
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{PROBABILITY_TOLERANCE, Probability};

    #[test]
    fn guards_domain() {
        assert!(Probability::try_from(0.0).is_ok());
        assert!(Probability::try_from(1.0).is_ok());
        assert!(Probability::try_from(f64::NAN).is_err());
        assert!(Probability::try_from(f64::INFINITY).is_err());
        assert!(Probability::try_from(-0.1).is_err());
        assert!(Probability::try_from(1.1).is_err());
    }

    #[test]
    fn rounding_above_one() {
        assert_eq!(Probability::try_from(1.0 + f64::EPSILON).unwrap().value(), 1.0);
        assert_eq!(
            Probability::try_from(1.0 + PROBABILITY_TOLERANCE / 2.0).unwrap().value(),
            1.0
        );
        assert!(Probability::try_from(1.0 + 2.0 * PROBABILITY_TOLERANCE).is_err());
    }

    #[test]
    fn formatting() {
        let p = Probability::try_from(0.7).unwrap();
        assert_eq!(p.to_fraction_string(), "0.70");
        assert_eq!(p.to_percentage_string(), "70.0%");

        let p = Probability::try_from(1.0 / 3.0).unwrap();
        assert_eq!(p.to_fraction_string(), "0.33");
        assert_eq!(p.to_percentage_string(), "33.3%");
    }
}
