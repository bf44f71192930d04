use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref COLLECTOR_SUFFIX: Regex = Regex::new(r"\s*\([A-Z0-9]{2,5}\)\s*\d+\s*$").unwrap();
    static ref TRAILING_NUMBER: Regex = Regex::new(r"\s+\d+\s*$").unwrap();
}

/// One line of an imported deck list: how many copies of which card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRequest {
    pub name: String,
    pub quantity: u32,
}

impl CardRequest {
    pub fn new(name: &str, quantity: u32) -> Self {
        Self {
            name: name.to_string(),
            quantity,
        }
    }
}

/// Parses "<qty> <name>" lines. Blank lines, lines with fewer than two tokens
/// and lines whose quantity is not a positive integer are skipped.
pub fn parse_deck_list(text: &str) -> Vec<CardRequest> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<CardRequest> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }

    let quantity = match tokens[0].parse::<u32>() {
        Ok(quantity) if quantity > 0 => quantity,
        _ => {
            warn!("Skipping deck line with invalid quantity: '{}'", line.trim());
            return None;
        }
    };

    let name = tokens[1..].join(" ");
    let name = COLLECTOR_SUFFIX.replace(&name, "");
    let name = TRAILING_NUMBER.replace(&name, "");
    let name = name.trim();

    if name.is_empty() {
        return None;
    }

    Some(CardRequest::new(name, quantity))
}
