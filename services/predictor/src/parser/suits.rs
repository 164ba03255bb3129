//! Card suit symbols and their canonical forms

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One of the four French suits.
///
/// Variant order follows the code points of the canonical glyphs
/// (♠ U+2660, ♣ U+2663, ♥ U+2665, ♦ U+2666) so that a sorted set renders
/// the same way a sorted string of glyphs would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spades,
    #[serde(rename = "♣")]
    Clubs,
    #[serde(rename = "♥")]
    Hearts,
    #[serde(rename = "♦")]
    Diamonds,
}

/// Glyphs the feed uses for each suit. Emoji presentation selectors
/// (U+FE0F) that trail a glyph are not listed: they are simply not suits.
const SUIT_GLYPHS: &[(char, Suit)] = &[
    ('♠', Suit::Spades),
    ('♤', Suit::Spades),
    ('♣', Suit::Clubs),
    ('♧', Suit::Clubs),
    ('♥', Suit::Hearts),
    ('♡', Suit::Hearts),
    ('❤', Suit::Hearts),
    ('♦', Suit::Diamonds),
    ('♢', Suit::Diamonds),
];

impl Suit {
    /// Map a single character to a suit, if it is any known suit glyph
    pub fn from_char(c: char) -> Option<Suit> {
        SUIT_GLYPHS
            .iter()
            .find(|(glyph, _)| *glyph == c)
            .map(|(_, suit)| *suit)
    }

    pub fn glyph(&self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Clubs => '♣',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// Distinct suits of a hand, kept sorted.
///
/// Serialized as the concatenated canonical glyphs (e.g. `"♠♥"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SuitSet(BTreeSet<Suit>);

impl SuitSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_subset(&self, other: &SuitSet) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl FromIterator<Suit> for SuitSet {
    fn from_iter<I: IntoIterator<Item = Suit>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for SuitSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for suit in &self.0 {
            write!(f, "{}", suit)?;
        }
        Ok(())
    }
}

impl From<String> for SuitSet {
    fn from(s: String) -> Self {
        normalize_suits(&s)
    }
}

impl From<SuitSet> for String {
    fn from(set: SuitSet) -> Self {
        set.to_string()
    }
}

/// Collapse every suit encoding in `raw_group` to its canonical suit,
/// dropping anything that is not a suit and any repeats.
pub fn normalize_suits(raw_group: &str) -> SuitSet {
    raw_group.chars().filter_map(Suit::from_char).collect()
}

/// Count suit occurrences in `raw_group`, repeats included.
///
/// An emoji-styled glyph (`♠️`) counts once: the trailing variation
/// selector is not a suit character.
pub fn count_suit_symbols(raw_group: &str) -> usize {
    raw_group.chars().filter(|c| Suit::from_char(*c).is_some()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let set = normalize_suits("♦♠♦♥");
        assert_eq!(set.to_string(), "♠♥♦");
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_normalize_emoji_variants() {
        // ♠️ and ♥️ carry U+FE0F, ❤️ is the heavy heart emoji
        let set = normalize_suits("A\u{2660}\u{FE0F} 10\u{2665}\u{FE0F} K❤\u{FE0F}");
        assert_eq!(set.to_string(), "♠♥");
    }

    #[test]
    fn test_normalize_discards_non_suits() {
        assert!(normalize_suits("K Q 10 J").is_empty());
        assert_eq!(normalize_suits("7♧ 2♢").to_string(), "♣♦");
    }

    #[test]
    fn test_count_suit_symbols() {
        assert_eq!(count_suit_symbols("K♠️7♠️"), 2);
        assert_eq!(count_suit_symbols("A♥"), 1);
        assert_eq!(count_suit_symbols("J♦️ 10♣️ 3♥"), 3);
        assert_eq!(count_suit_symbols(""), 0);
    }

    #[test]
    fn test_subset() {
        let predicted = normalize_suits("♠");
        assert!(predicted.is_subset(&normalize_suits("♥♠")));
        assert!(!normalize_suits("♠♣").is_subset(&normalize_suits("♠♥")));
    }

    #[test]
    fn test_serde_as_glyph_string() {
        let set = normalize_suits("♥♠");
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "\"♠♥\"");
        let back: SuitSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
