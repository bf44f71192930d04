use std::fmt;

use crate::utilities::string_manipulators::clean_string;

/// A requested card name together with the form used to match vendor titles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardName {
    pub raw: String,
    pub cleaned: String,
}

impl CardName {
    pub fn new(raw: &str) -> Result<Self, String> {
        let cleaned = Self::clean_name(raw);

        if cleaned.is_empty() {
            return Err(format!("Card name '{}' is empty after cleaning", raw));
        }

        Ok(CardName {
            raw: raw.to_string(),
            cleaned,
        })
    }

    fn clean_name(name: &str) -> String {
        clean_string(name).to_lowercase()
    }

    /// True when the vendor's card title starts with this name.
    /// Substring hits and unrelated printings are rejected, a missed match is preferred over a false positive.
    pub fn matches_title(&self, vendor_title: &str) -> bool {
        Self::clean_name(vendor_title).starts_with(&self.cleaned)
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaned_name() {
        let name = CardName::new("  Lightning   Bolt ").unwrap();
        assert_eq!(name.cleaned, "lightning bolt");
        assert_eq!(name.raw, "  Lightning   Bolt ");
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(CardName::new("   ").is_err());
        assert!(CardName::new("\"\"").is_err());
    }

    #[test]
    fn test_matches_title_prefix_only() {
        let name = CardName::new("Sol Ring").unwrap();

        assert!(name.matches_title("Sol Ring"));
        assert!(name.matches_title("SOL   RING (Etched Foil)"));
        assert!(!name.matches_title("Solemn Simulacrum"));
        assert!(!name.matches_title("Arcane Signet // Sol Ring"));
    }

    #[test]
    fn test_matches_title_ignores_quotes() {
        let name = CardName::new("Ach! Hans, Run!").unwrap();
        assert!(name.matches_title("\"Ach! Hans, Run!\""));

        let name = CardName::new("Urza's Saga").unwrap();
        assert!(name.matches_title("Urza’s Saga"));
    }
}
