//! Devotional input: reflection text and favorite verse ids

use std::collections::BTreeSet;

use super::ValidationError;

const MAX_REFLECTION_LEN: usize = 10_000;
const MAX_FAVORITE_VERSES: usize = 500;

/// Reflection text for a devotional entry. Empty is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reflection(String);

impl Reflection {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.chars().count() > MAX_REFLECTION_LEN {
            return Err(ValidationError::TooLong {
                field: "reflection",
                max: MAX_REFLECTION_LEN,
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Deduplicated, ascending set of verse ids to tag as favorites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerseIds(Vec<i32>);

impl VerseIds {
    /// Build the incoming favorite set.
    ///
    /// Ids must be positive. Duplicates collapse, so the result doubles as
    /// the exact association set stored after a save.
    ///
    /// # Example
    /// ```
    /// use bible_api_server::models::VerseIds;
    ///
    /// let ids = VerseIds::new(&[7, 3, 7]).unwrap();
    /// assert_eq!(ids.as_slice(), &[3, 7]);
    /// ```
    pub fn new(ids: &[i64]) -> Result<Self, ValidationError> {
        let mut set = BTreeSet::new();
        for &id in ids {
            if id < 1 || id > i64::from(i32::MAX) {
                return Err(ValidationError::OutOfRange {
                    field: "verse id",
                    value: id.to_string(),
                });
            }
            set.insert(id as i32);
        }

        if set.len() > MAX_FAVORITE_VERSES {
            return Err(ValidationError::TooLong {
                field: "verse_ids",
                max: MAX_FAVORITE_VERSES,
            });
        }

        Ok(Self(set.into_iter().collect()))
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
