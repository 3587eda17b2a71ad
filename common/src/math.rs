use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A probability in the range 0-1
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    pub const fn new_unchecked(value: f64) -> Probability {
        Probability(value)
    }

    pub fn new(value: f64) -> Probability {
        assert!(
            (0.0..=1.0).contains(&value),
            "A probability needs to be in the interval [0.0, 1.0], got: {value}"
        );
        Probability(value)
    }

    /// Converts into log-odds, `ln(p / (1 - p))`. Yields -inf for 0.0 and +inf for 1.0.
    pub fn log_odds(&self) -> LogOdds {
        LogOdds((self.0 / (1.0 - self.0)).ln())
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<LogOdds> for Probability {
    fn from(value: LogOdds) -> Self {
        value.probability()
    }
}

/// A probability in log-odds representation. Range +/- infinity.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LogOdds(f64);

impl Add<LogOdds> for LogOdds {
    type Output = LogOdds;

    fn add(self, rhs: LogOdds) -> Self::Output {
        LogOdds(self.0 + rhs.0)
    }
}

impl AddAssign<LogOdds> for LogOdds {
    fn add_assign(&mut self, rhs: LogOdds) {
        self.0 += rhs.0
    }
}

impl Sub<LogOdds> for LogOdds {
    type Output = LogOdds;

    fn sub(self, rhs: LogOdds) -> Self::Output {
        LogOdds(self.0 - rhs.0)
    }
}

impl SubAssign<LogOdds> for LogOdds {
    fn sub_assign(&mut self, rhs: LogOdds) {
        self.0 -= rhs.0
    }
}

impl LogOdds {
    pub const fn new(value: f64) -> LogOdds {
        LogOdds(value)
    }

    /// `e^L / (1 + e^L)`
    pub fn probability(&self) -> Probability {
        let exp = self.0.exp();
        if exp.is_infinite() {
            return Probability(1.0);
        }
        Probability(exp / (1.0 + exp))
    }

    /// Bounds the value to `[-limit, limit]`. Infinities land on the bounds and NaN is treated
    /// as "no information" (0.0).
    pub fn clamp(self, limit: f64) -> LogOdds {
        if self.0.is_nan() {
            return LogOdds(0.0);
        }
        LogOdds(self.0.clamp(-limit, limit))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<Probability> for LogOdds {
    fn from(value: Probability) -> Self {
        value.log_odds()
    }
}
