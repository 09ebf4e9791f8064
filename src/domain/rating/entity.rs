//! Rating entities - team/release identifiers, raw payload entries and normalized records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Formula tag of the rating variant whose records are authoritative
pub const CANONICAL_FORMULA: &str = "b";

/// Date format used by the rating service
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Team identifier as stored in `teams.ratingId`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(i32);

impl TeamId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl From<i32> for TeamId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Release (tournament rating release) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseId(i32);

impl ReleaseId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl From<i32> for ReleaseId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric field of the rating payload
///
/// The rating service serializes numbers as strings (`"idteam": "1"`), but plain JSON
/// numbers are accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Text(String),
}

impl RawNumber {
    /// Parse the field into an `i32`, naming the field in the error
    pub fn to_i32(&self, field: &str) -> Result<i32, DomainError> {
        let value = match self {
            Self::Int(v) => *v,
            Self::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                DomainError::validation(format!("Field '{}' is not an integer: '{}'", field, s))
            })?,
        };

        i32::try_from(value).map_err(|_| {
            DomainError::validation(format!("Field '{}' is out of range: {}", field, value))
        })
    }
}

impl From<i64> for RawNumber {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// One per-release entry of a team's rating history, as returned by the rating service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRatingEntry {
    pub idteam: RawNumber,
    pub idrelease: RawNumber,
    pub date: String,
    pub rating: RawNumber,
    #[serde(default)]
    pub formula: String,
}

impl RawRatingEntry {
    /// Whether this entry belongs to the authoritative rating variant
    pub fn is_canonical(&self) -> bool {
        self.formula == CANONICAL_FORMULA
    }
}

/// Normalized team release record, one row of the `team_releases` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRelease {
    pub team_id: TeamId,
    pub release_id: ReleaseId,
    pub release_date: NaiveDate,
    pub rating: i32,
}

impl TeamRelease {
    pub fn new(
        team_id: impl Into<TeamId>,
        release_id: impl Into<ReleaseId>,
        release_date: NaiveDate,
        rating: i32,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            release_id: release_id.into(),
            release_date,
            rating,
        }
    }
}

impl TryFrom<&RawRatingEntry> for TeamRelease {
    type Error = DomainError;

    fn try_from(entry: &RawRatingEntry) -> Result<Self, Self::Error> {
        let release_date = NaiveDate::parse_from_str(entry.date.trim(), RELEASE_DATE_FORMAT)
            .map_err(|e| {
                DomainError::validation(format!("Invalid release date '{}': {}", entry.date, e))
            })?;

        Ok(Self {
            team_id: TeamId::new(entry.idteam.to_i32("idteam")?),
            release_id: ReleaseId::new(entry.idrelease.to_i32("idrelease")?),
            release_date,
            rating: entry.rating.to_i32("rating")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_string_encoded_entry() {
        let json = r#"{
            "idteam": "1",
            "idrelease": "12",
            "rating": "9999",
            "rating_position": "1",
            "date": "2003-07-01",
            "formula": "a"
        }"#;

        let entry: RawRatingEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.idteam, RawNumber::Text("1".to_string()));
        assert_eq!(entry.formula, "a");
        assert!(!entry.is_canonical());
    }

    #[test]
    fn test_deserialize_numeric_entry() {
        let json = r#"{"idteam": 5, "idrelease": 7, "rating": 1200, "date": "2020-01-01", "formula": "b"}"#;

        let entry: RawRatingEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.idteam, RawNumber::Int(5));
        assert!(entry.is_canonical());
    }

    #[test]
    fn test_missing_formula_is_not_canonical() {
        let json = r#"{"idteam": 5, "idrelease": 7, "rating": 1200, "date": "2020-01-01"}"#;

        let entry: RawRatingEntry = serde_json::from_str(json).unwrap();
        assert!(!entry.is_canonical());
    }

    #[test]
    fn test_team_release_from_raw_entry() {
        let entry = RawRatingEntry {
            idteam: RawNumber::Text("1".to_string()),
            idrelease: RawNumber::Int(12),
            date: "2019-01-01".to_string(),
            rating: RawNumber::Text(" 9999 ".to_string()),
            formula: "b".to_string(),
        };

        let release = TeamRelease::try_from(&entry).unwrap();
        assert_eq!(release.team_id, TeamId::new(1));
        assert_eq!(release.release_id, ReleaseId::new(12));
        assert_eq!(
            release.release_date,
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
        );
        assert_eq!(release.rating, 9999);
    }

    #[test]
    fn test_team_release_rejects_bad_date() {
        let entry = RawRatingEntry {
            idteam: RawNumber::Int(1),
            idrelease: RawNumber::Int(1),
            date: "01.01.2019".to_string(),
            rating: RawNumber::Int(1),
            formula: "b".to_string(),
        };

        let result = TeamRelease::try_from(&entry);
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_raw_number_rejects_non_integer_and_overflow() {
        assert!(RawNumber::Text("12.5".to_string()).to_i32("rating").is_err());
        assert!(RawNumber::Int(i64::from(i32::MAX) + 1).to_i32("rating").is_err());
        assert_eq!(RawNumber::Int(-3).to_i32("rating").unwrap(), -3);
    }
}
