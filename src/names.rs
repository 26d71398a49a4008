use crate::error::{Result, StatsError};

/// A full display name split into the first-name token and the surname.
///
/// The surname is everything after the first whitespace token, so multi-word
/// surnames like "El Ghazi" stay intact. A one-word name is used as both parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName {
    pub first: String,
    pub last: String,
}

impl PlayerName {
    pub fn parse(full: &str) -> Result<Self> {
        let trimmed = full.trim();
        let Some(first) = trimmed.split_whitespace().next() else {
            return Err(StatsError::malformed("empty player name"));
        };
        let last = match trimmed.split_once(char::is_whitespace) {
            Some((_, rest)) => rest.trim().to_string(),
            None => first.to_string(),
        };
        Ok(Self {
            first: first.to_string(),
            last,
        })
    }

    pub fn from_parts(first: &str, last: &str) -> Self {
        Self {
            first: first.trim().to_string(),
            last: last.trim().to_string(),
        }
    }

    /// "Lucas Torriera" -> "L. Torriera", the short form the API lists players under.
    pub fn initialed(&self) -> String {
        match self.first.chars().next() {
            Some(initial) => format!("{initial}. {}", self.last),
            None => self.last.clone(),
        }
    }

    pub fn display(&self) -> String {
        if self.first == self.last {
            return self.first.clone();
        }
        format!("{} {}", self.first, self.last)
    }

    pub fn matches(&self, first: &str, last: &str) -> bool {
        self.first == first && self.last == last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_first_token_from_surname() {
        let name = PlayerName::parse("Lucas Torriera").unwrap();
        assert_eq!(name.first, "Lucas");
        assert_eq!(name.last, "Torriera");
        assert_eq!(name.initialed(), "L. Torriera");
    }

    #[test]
    fn keeps_multi_word_surname() {
        let name = PlayerName::parse("  Anwar   El Ghazi ").unwrap();
        assert_eq!(name.first, "Anwar");
        assert_eq!(name.last, "El Ghazi");
        assert_eq!(name.display(), "Anwar El Ghazi");
    }

    #[test]
    fn single_token_is_both_parts() {
        let name = PlayerName::parse("Fred").unwrap();
        assert_eq!(name.first, "Fred");
        assert_eq!(name.last, "Fred");
        assert_eq!(name.display(), "Fred");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(
            PlayerName::parse("   "),
            Err(StatsError::MalformedInput(_))
        ));
    }
}
