//! Genres: a flat, uniquely named vocabulary attached to movies.

use serde::{Deserialize, Serialize};

use super::validation::check_length;
use super::{Error, GenreId};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 50;

/// A live genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Store id.
    pub id: GenreId,
    /// Unique display name.
    pub name: String,
}

/// Validated genre name used for create and rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreName(String);

impl GenreName {
    /// Trim and validate a name (3 to 50 characters).
    ///
    /// # Errors
    ///
    /// Returns a bad-request [`Error`] when the length is out of range.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let name = raw.trim();
        check_length("name", name, NAME_MIN, NAME_MAX)?;
        Ok(Self(name.to_owned()))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  Drama ", Some("Drama"))]
    #[case("Sci", Some("Sci"))]
    #[case("SF", None)]
    fn genre_names_are_trimmed_and_bounded(#[case] raw: &str, #[case] expected: Option<&str>) {
        let parsed = GenreName::parse(raw).ok();
        assert_eq!(parsed.as_ref().map(GenreName::as_str), expected);
    }
}
