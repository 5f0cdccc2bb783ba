//! Tokenizer and stop words
//!
//! Turns free text into the set of terms eligible for the inverted index:
//! - Lowercase
//! - Take maximal runs of letters and apostrophes
//! - Strip leading/trailing apostrophes
//! - Drop anything shorter than 2 characters or in the stop-word set
//!
//! The tokenizer is total: every input yields a (possibly empty) set.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static WORDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[a-z']{2,}").expect("word pattern is a valid regex"));

const STOP_WORD_LIST: &str = "
    able about across after all almost also am among an and any are as at be
    because been but by can cannot could dear did do does either else ever
    every for from get got had has have he her hers him his how however if
    in into is it its just least let like likely may me might most must my
    neither no nor not of off often on only or other our own rather said say
    says she should since so some than that the their them then there these
    they this tis to too twas us wants was we were what when where which
    while who whom why will with would yet you your
";

/// Fixed set of words never indexed or queried
pub static STOP_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORD_LIST.split_whitespace().collect());

/// Whether `word` is a stop word (case-insensitive)
pub fn is_stop_word(word: &str) -> bool {
    if word.bytes().any(|b| b.is_ascii_uppercase()) {
        STOP_WORDS.contains(word.to_ascii_lowercase().as_str())
    } else {
        STOP_WORDS.contains(word)
    }
}

/// Normalize one lowercase word match into a term
///
/// Strips surrounding apostrophes; returns `None` if what remains is
/// shorter than 2 characters or is a stop word.
pub fn normalize(word: &str) -> Option<&str> {
    let term = word.trim_matches('\'');
    if term.len() < 2 || is_stop_word(term) {
        None
    } else {
        Some(term)
    }
}

/// Tokenize text into its set of index terms
///
/// # Example
///
/// ```
/// use sift_search::tokenizer::tokenize;
///
/// let terms = tokenize("Redis in Action");
/// assert!(terms.contains("redis"));
/// assert!(!terms.contains("in"));
/// ```
pub fn tokenize(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    WORDS_RE
        .find_iter(&lowered)
        .filter_map(|m| normalize(m.as_str()))
        .map(String::from)
        .collect()
}
