use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display};

/// A song is identified solely by its display name
pub type Song = String;

/// The user's song → rating associations. Absence of a key means "unrated".
pub type RatingMap = BTreeMap<Song, Rating>;

/// Rejected star value
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct InvalidRating(pub i64);

/// A star rating in 1..=5
///
/// Zero is never representable: an unrated song is simply absent from the
/// [`RatingMap`] and only becomes `0` when encoded into an evaluation vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Returns the rating if `value` is within 1..=5
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = InvalidRating;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Rating::new)
            .ok_or(InvalidRating(value))
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value).ok_or(InvalidRating(value.into()))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_accepts_one_through_five() {
        for value in 1..=5u8 {
            assert_eq!(Rating::new(value).map(Rating::value), Some(value));
        }
    }

    #[test]
    fn test_rating_rejects_zero_and_above_five() {
        assert_eq!(Rating::new(0), None);
        assert_eq!(Rating::new(6), None);
        assert_eq!(Rating::try_from(-1i64), Err(InvalidRating(-1)));
        assert_eq!(Rating::try_from(300i64), Err(InvalidRating(300)));
    }

    #[test]
    fn test_rating_map_serializes_as_flat_object() {
        let mut ratings = RatingMap::new();
        ratings.insert("Bohemian Rhapsody".to_string(), Rating::new(5).unwrap());
        ratings.insert("Yesterday".to_string(), Rating::new(3).unwrap());

        let json = serde_json::to_string(&ratings).unwrap();
        assert_eq!(json, r#"{"Bohemian Rhapsody":5,"Yesterday":3}"#);
    }

    #[test]
    fn test_rating_deserialization_rejects_zero() {
        let result: Result<Rating, _> = serde_json::from_str("0");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("between 1 and 5"));
    }
}
