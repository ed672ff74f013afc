use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RatingError {
    #[error("Rate must be between 0 and 5")]
    OutOfRange,

    #[error("Enter a number.")]
    NotANumber,
}

/// A user's score for a media item, 0 to 5 inclusive.
///
/// Stored with two decimal places; finer input is rounded to the nearest
/// hundredth after the range check, so anything inside `[0, 5]` is accepted.
///
/// ```
/// use mediashelf::domain::Rating;
///
/// assert_eq!(Rating::new(4.5).unwrap().value(), 4.5);
/// assert!(Rating::new(5.01).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Rating(f64);

impl Rating {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 5.0;

    pub fn new(value: f64) -> Result<Self, RatingError> {
        if !value.is_finite() {
            return Err(RatingError::NotANumber);
        }
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(RatingError::OutOfRange);
        }
        Ok(Self((value * 100.0).round() / 100.0))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(Rating::new(0.0).unwrap().value(), 0.0);
        assert_eq!(Rating::new(5.0).unwrap().value(), 5.0);
    }

    #[test]
    fn validity_matches_closed_range() {
        let mut raw = -1.0_f64;
        while raw <= 6.0 {
            let in_range = (0.0..=5.0).contains(&raw);
            assert_eq!(Rating::new(raw).is_ok(), in_range, "rate {raw}");
            raw += 0.125;
        }
    }

    #[test]
    fn rejects_values_just_outside() {
        assert_eq!(Rating::new(-0.01), Err(RatingError::OutOfRange));
        assert_eq!(Rating::new(5.001), Err(RatingError::OutOfRange));
    }

    #[test]
    fn rejects_non_finite() {
        assert_eq!(Rating::new(f64::NAN), Err(RatingError::NotANumber));
        assert_eq!(Rating::new(f64::INFINITY), Err(RatingError::NotANumber));
    }

    #[test]
    fn rounds_to_hundredths() {
        assert!((Rating::new(3.14159).unwrap().value() - 3.14).abs() < 1e-9);
        assert!((Rating::new(4.999).unwrap().value() - 5.0).abs() < 1e-9);
    }
}
