use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// State-of-charge percentage.
pub type Percent = Quantity<f64, 0, 0, 0>;

impl Percent {
    pub const fn to_proportion(self) -> f64 {
        self.0 / 100.0
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Debug for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
