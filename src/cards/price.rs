use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A vendor price in major currency units, exactly as the vendor reported it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
}

impl Price {
    pub fn new(amount: f64) -> Self {
        Self { amount }
    }

    /// Converts to minor units (cents), rounding half up.
    pub fn to_minor_units(&self) -> i64 {
        (self.amount * 100.0).round() as i64
    }

    pub fn format_minor_units(cents: i64) -> String {
        format!("${:.2}", cents as f64 / 100.0)
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.amount.partial_cmp(&other.amount)
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.amount == other.amount
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units_rounds_half_up() {
        assert_eq!(Price::new(3.22).to_minor_units(), 322);
        assert_eq!(Price::new(0.125).to_minor_units(), 13);
        assert_eq!(Price::new(1.005).to_minor_units(), 100);
        assert_eq!(Price::new(19.999).to_minor_units(), 2000);
        assert_eq!(Price::new(0.0).to_minor_units(), 0);
    }

    #[test]
    fn test_price_comparison() {
        let cheap = Price::new(0.99);
        let expensive = Price::new(1.01);

        assert!(cheap < expensive);
        assert_eq!(Price::new(2.5), Price::new(2.5));
    }

    #[test]
    fn test_formatting() {
        assert_eq!(Price::format_minor_units(322), "$3.22");
        assert_eq!(Price::new(3.5).to_string(), "$3.5");
    }
}
