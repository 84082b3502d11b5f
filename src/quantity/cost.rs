use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Money in pence.
pub type Pence = Quantity<f64, 0, 0, 1>;

impl Pence {
    /// Round to a hundredth of a penny for display.
    #[must_use]
    pub fn round_to_hundredths(self) -> Self {
        Self((self.0 * 100.0).round() / 100.0)
    }
}

impl Display for Pence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.abs() >= 100.0 {
            write!(f, "£{:.2}", self.0 / 100.0)
        } else {
            write!(f, "{:.2}p", self.0)
        }
    }
}

impl Debug for Pence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}p", self.0)
    }
}
