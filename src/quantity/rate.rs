use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Pence per kilowatt-hour, the canonical price unit.
pub type PencePerKilowattHour = Quantity<f64, -1, -1, 1>;

impl PencePerKilowattHour {
    /// Interpret a raw upstream price.
    ///
    /// Upstream feeds do not carry a unit field: a magnitude below one is taken
    /// to be pounds per kilowatt-hour and converted to pence, anything else is
    /// assumed to be in pence already.
    #[must_use]
    pub fn from_raw(price: f64) -> Self {
        if price.abs() < 1.0 { Self(price * 100.0) } else { Self(price) }
    }
}

impl Display for PencePerKilowattHour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} p/kWh", self.0)
    }
}

impl Debug for PencePerKilowattHour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}p/kWh", self.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_from_raw_pounds() {
        assert_abs_diff_eq!(PencePerKilowattHour::from_raw(0.167_055).0, 16.7055, epsilon = 1e-9);
    }

    #[test]
    fn test_from_raw_pence() {
        assert_abs_diff_eq!(PencePerKilowattHour::from_raw(35.04).0, 35.04);
    }

    #[test]
    fn test_from_raw_negative_pounds() {
        assert_abs_diff_eq!(PencePerKilowattHour::from_raw(-0.05).0, -5.0);
    }

    #[test]
    fn test_from_raw_boundary() {
        assert_abs_diff_eq!(PencePerKilowattHour::from_raw(1.0).0, 1.0);
        assert_abs_diff_eq!(PencePerKilowattHour::from_raw(-1.0).0, -1.0);
    }
}
