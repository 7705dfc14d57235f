//! Scripture reference validation: book names, chapter and verse numbers

use super::ValidationError;

/// Maximum length for book names (matches `books.name VARCHAR(50)`)
const MAX_BOOK_NAME_LEN: usize = 50;

/// Validated book name or abbreviation as given in a request path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookName(String);

impl BookName {
    /// Create a new book name.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 50 characters
    ///
    /// # Example
    /// ```
    /// use bible_api_server::models::BookName;
    ///
    /// assert!(BookName::new("1 Samuel").is_ok());
    /// assert!(BookName::new("  ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "book name" });
        }

        if trimmed.chars().count() > MAX_BOOK_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "book name",
                max: MAX_BOOK_NAME_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Chapter number (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChapterNumber(i32);

impl ChapterNumber {
    /// Parse a chapter number from a path segment.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        parse_positive("chapter number", s).map(Self)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

/// Verse number within a chapter (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VerseNumber(i32);

impl VerseNumber {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        parse_positive("verse number", s).map(Self)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

fn positive_i32(field: &'static str, n: i64) -> Result<i32, ValidationError> {
    if n < 1 || n > i64::from(i32::MAX) {
        return Err(ValidationError::OutOfRange {
            field,
            value: n.to_string(),
        });
    }
    Ok(n as i32)
}

fn parse_positive(field: &'static str, s: &str) -> Result<i32, ValidationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let n: i64 = trimmed.parse().map_err(|_| ValidationError::InvalidFormat {
        field,
        reason: "must be a positive integer",
    })?;
    positive_i32(field, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_names_are_trimmed() {
        let name = BookName::new("  Song of Solomon ").unwrap();
        assert_eq!(name.as_str(), "Song of Solomon");
    }

    #[test]
    fn rejects_empty_book() {
        assert!(matches!(
            BookName::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn rejects_long_book() {
        let long = "x".repeat(51);
        assert!(matches!(
            BookName::new(&long).unwrap_err(),
            ValidationError::TooLong { max: 50, .. }
        ));
    }

    #[test]
    fn chapter_parsing() {
        assert_eq!(ChapterNumber::parse("3").unwrap().get(), 3);
        assert_eq!(ChapterNumber::parse(" 150 ").unwrap().get(), 150);
        assert!(matches!(
            ChapterNumber::parse("0").unwrap_err(),
            ValidationError::OutOfRange { .. }
        ));
        assert!(matches!(
            ChapterNumber::parse("-2").unwrap_err(),
            ValidationError::OutOfRange { .. }
        ));
        assert!(matches!(
            ChapterNumber::parse("three").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }

    #[test]
    fn verse_number_bounds() {
        assert_eq!(VerseNumber::parse("1").unwrap().get(), 1);
        assert!(VerseNumber::parse("0").is_err());
        assert!(VerseNumber::parse("2147483648").is_err());
    }
}
