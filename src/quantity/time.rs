use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

pub type Hours = Quantity<f64, 0, 1, 0>;

impl Hours {
    pub const HALF: Self = Self(0.5);

    /// Number of half-hour slots needed to cover the duration, rounded up.
    ///
    /// Saturates at [`usize::MAX`] for durations too long to count.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_half_hour_slots(self) -> usize {
        if self.0 <= 0.0 {
            return 0;
        }
        // Float-to-integer casts saturate, infinity included:
        (self.0 / Self::HALF.0).ceil() as usize
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_half_hour_slots(n_slots: usize) -> Self {
        Self(n_slots as f64 * Self::HALF.0)
    }
}

impl Display for Hours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}h", self.0)
    }
}

impl Debug for Hours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}h", self.0)
    }
}
