use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref QUOTES: Regex = Regex::new(r#"["“”'‘’]"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref TRAILING_BRACKETS: Regex = Regex::new(r"\s*\[.*?\]\s*$").unwrap();
    static ref FIRST_BRACKETS: Regex = Regex::new(r"\[([^\]]+)\]").unwrap();
}

/// Removes quote characters and collapses whitespace runs into single spaces.
pub fn clean_string(input: &str) -> String {
    let without_quotes = QUOTES.replace_all(input, "");
    WHITESPACE
        .replace_all(&without_quotes, " ")
        .trim()
        .to_string()
}

/// "Lightning Bolt [Anthologies]" -> "Lightning Bolt"
pub fn strip_trailing_brackets(title: &str) -> String {
    TRAILING_BRACKETS.replace(title, "").trim().to_string()
}

/// "Sol Ring [Commander 2021] Foil" -> Some("Commander 2021")
pub fn bracketed_set(title: &str) -> Option<String> {
    FIRST_BRACKETS
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|set| !set.is_empty())
}
