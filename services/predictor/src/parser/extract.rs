//! Pull game numbers and hand groups out of raw announcement text

use regex::Regex;

/// Game-number patterns, tried in order. The `#N` marker is what the
/// results feed prints; the looser phrasing covers hand-written posts.
const GAME_NUMBER_PATTERNS: &[&str] = &[
    r"(?i)#N\s*(\d+)\.?",
    r"(?i)\b(?:jeu|game)\s*#?\s*(\d+)",
];

/// Extract the game number from an announcement.
///
/// Returns the value of the first pattern that both matches and parses.
/// Digit runs too large for a `u32` are treated as no match.
pub fn extract_game_number(text: &str) -> Option<u32> {
    for pattern in GAME_NUMBER_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(caps) = re.captures(text) {
                if let Some(m) = caps.get(1) {
                    if let Ok(n) = m.as_str().parse::<u32>() {
                        return Some(n);
                    }
                }
            }
        }
    }

    None
}

/// Every parenthesized group, verbatim and left to right
pub fn extract_symbol_groups(text: &str) -> Vec<String> {
    match Regex::new(r"\(([^)]+)\)") {
        Ok(re) => re
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_game_number_hash_n() {
        assert_eq!(extract_game_number("#N47. ✅3(K♠️7♥️) - 6(A♦️5♣️)"), Some(47));
        assert_eq!(extract_game_number("#n 1203 (J♠10♥)"), Some(1203));
    }

    #[test]
    fn test_extract_game_number_loose_phrasing() {
        assert_eq!(extract_game_number("Jeu #128 terminé"), Some(128));
        assert_eq!(extract_game_number("game 9 result"), Some(9));
    }

    #[test]
    fn test_extract_game_number_prefers_marker() {
        assert_eq!(extract_game_number("jeu 12 puis #N15"), Some(15));
    }

    #[test]
    fn test_extract_game_number_absent() {
        assert_eq!(extract_game_number("no number here"), None);
        assert_eq!(extract_game_number("#N"), None);
        assert_eq!(extract_game_number("#N99999999999999999999"), None);
    }

    #[test]
    fn test_extract_symbol_groups() {
        let groups = extract_symbol_groups("#N50. 3(K♠️7♥️) - 6(A♦️5♣️)");
        assert_eq!(groups, vec!["K♠️7♥️".to_string(), "A♦️5♣️".to_string()]);
    }

    #[test]
    fn test_extract_symbol_groups_empty() {
        assert!(extract_symbol_groups("#N50 nothing").is_empty());
        assert!(extract_symbol_groups("#N50 ()").is_empty());
    }
}
