use std::{
    fmt::{Debug, Display, Formatter},
    ops::{Div, Mul},
};

use crate::quantity::{
    Quantity,
    cost::Pence,
    percent::Percent,
    power::Kilowatts,
    rate::PencePerKilowattHour,
    time::Hours,
};

pub type KilowattHours = Quantity<f64, 1, 1, 0>;

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kWh", self.0)
    }
}

/// Share of the battery capacity.
impl Mul<Percent> for KilowattHours {
    type Output = Self;

    fn mul(self, rhs: Percent) -> Self::Output {
        Quantity(self.0 * rhs.to_proportion())
    }
}

impl Mul<PencePerKilowattHour> for KilowattHours {
    type Output = Pence;

    fn mul(self, rhs: PencePerKilowattHour) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}

impl Div<Kilowatts> for KilowattHours {
    type Output = Hours;

    fn div(self, rhs: Kilowatts) -> Self::Output {
        Quantity(self.0 / rhs.0)
    }
}
