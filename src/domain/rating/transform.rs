//! Record transformer - raw rating entries to normalized, date-ordered releases

use super::entity::{RawRatingEntry, TeamRelease};
use crate::domain::DomainError;

/// Normalize one team's raw rating history.
///
/// Entries with a non-canonical formula tag are dropped before parsing, so a malformed
/// non-canonical entry never fails the team. The result is stably sorted by release date.
pub fn transform(entries: &[RawRatingEntry]) -> Result<Vec<TeamRelease>, DomainError> {
    let mut releases = entries
        .iter()
        .filter(|entry| entry.is_canonical())
        .map(TeamRelease::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    releases.sort_by_key(|release| release.release_date);

    Ok(releases)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::rating::{RawNumber, ReleaseId};

    fn entry(release: i64, date: &str, formula: &str) -> RawRatingEntry {
        RawRatingEntry {
            idteam: RawNumber::Int(1),
            idrelease: RawNumber::Int(release),
            date: date.to_string(),
            rating: RawNumber::Text("1000".to_string()),
            formula: formula.to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_filters_non_canonical_entries() {
        let entries = vec![
            entry(1, "2020-01-01", "b"),
            entry(2, "2020-02-01", "a"),
            entry(3, "2020-03-01", "b"),
            entry(4, "2020-04-01", ""),
        ];

        let releases = transform(&entries).unwrap();

        let canonical = entries.iter().filter(|e| e.is_canonical()).count();
        assert_eq!(releases.len(), canonical);
        assert!(releases.iter().all(|r| r.release_id != ReleaseId::new(2)));
    }

    #[test]
    fn test_sorts_ascending_by_release_date() {
        let entries = vec![
            entry(1, "2020-01-01", "b"),
            entry(2, "2019-01-01", "b"),
            entry(3, "2019-06-15", "b"),
        ];

        let releases = transform(&entries).unwrap();
        let dates: Vec<_> = releases.iter().map(|r| r.release_date).collect();

        assert_eq!(
            dates,
            vec![date("2019-01-01"), date("2019-06-15"), date("2020-01-01")]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let entries = vec![
            entry(10, "2020-01-01", "b"),
            entry(11, "2019-01-01", "b"),
            entry(12, "2020-01-01", "b"),
        ];

        let releases = transform(&entries).unwrap();
        let ids: Vec<_> = releases.iter().map(|r| r.release_id.value()).collect();

        assert_eq!(ids, vec![11, 10, 12]);
    }

    #[test]
    fn test_empty_and_single_inputs() {
        assert!(transform(&[]).unwrap().is_empty());

        let single = transform(&[entry(1, "2020-01-01", "b")]).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_malformed_non_canonical_entry_is_ignored() {
        let entries = vec![entry(1, "not-a-date", "a"), entry(2, "2020-01-01", "b")];

        let releases = transform(&entries).unwrap();
        assert_eq!(releases.len(), 1);
    }

    #[test]
    fn test_malformed_canonical_entry_fails() {
        let entries = vec![entry(1, "not-a-date", "b")];

        assert!(transform(&entries).is_err());
    }
}
