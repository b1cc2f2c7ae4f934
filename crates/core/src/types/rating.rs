//! Review rating type.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Error returned when a value is not a 1-5 star rating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingError {
    #[error("rating must be between {min} and {max} (got {got})", min = Rating::MIN, max = Rating::MAX)]
    OutOfRange { got: i64 },
    #[error("rating is not a number: {0:?}")]
    NotANumber(String),
}

/// A star rating from 1 to 5 inclusive.
///
/// Deserializes from a number or a numeric string (`4` or `"4"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct Rating(u8);

/// Wire forms a rating arrives in.
#[derive(Deserialize)]
#[serde(untagged)]
enum RatingInput {
    Number(i64),
    Text(String),
}

impl Rating {
    /// Lowest allowed rating.
    pub const MIN: u8 = 1;
    /// Highest allowed rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside 1-5.
    ///
    /// # Errors
    ///
    /// Returns `RatingError` when `value` is out of range.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError::OutOfRange { got: value })
    }

    /// The numeric star count.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl RatingInput {
    fn into_rating(self) -> Result<Rating, RatingError> {
        match self {
            Self::Number(value) => Rating::new(value),
            Self::Text(text) => match text.trim().parse::<i64>() {
                Ok(value) => Rating::new(value),
                Err(_) => Err(RatingError::NotANumber(text)),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RatingInput::deserialize(deserializer)?
            .into_rating()
            .map_err(serde::de::Error::custom)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl Default for Rating {
    /// The review form preselects five stars.
    fn default() -> Self {
        Self(Self::MAX)
    }
}

/// Mean rating rounded to one decimal, `"5.0"` when there are no ratings.
#[must_use]
pub fn average_label(ratings: impl IntoIterator<Item = Rating>) -> String {
    let (sum, count) = ratings
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), r| {
            (sum + u32::from(r.get()), count + 1)
        });

    if count == 0 {
        return "5.0".to_string();
    }

    format!("{:.1}", f64::from(sum) / f64::from(count))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
        assert_eq!(Rating::new(1).unwrap().get(), 1);
        assert_eq!(Rating::new(5).unwrap().get(), 5);
    }

    #[test]
    fn test_rating_error_message() {
        let err = Rating::new(9).unwrap_err();
        assert_eq!(err.to_string(), "rating must be between 1 and 5 (got 9)");
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("7").is_err());
    }

    #[test]
    fn test_rating_deserialize_accepts_numeric_strings() {
        assert_eq!(serde_json::from_str::<Rating>(r#"" 4 ""#).unwrap().get(), 4);
        assert!(serde_json::from_str::<Rating>(r#""9""#).is_err());

        let err = RatingInput::Text("four".to_string()).into_rating().unwrap_err();
        assert_eq!(err, RatingError::NotANumber("four".to_string()));
    }

    #[test]
    fn test_average_label_defaults_to_five() {
        assert_eq!(average_label(Vec::new()), "5.0");
    }

    #[test]
    fn test_average_label_rounds_to_one_decimal() {
        let ratings = [4, 5, 5].map(|r| Rating::new(r).unwrap());
        assert_eq!(average_label(ratings), "4.7");
    }
}
