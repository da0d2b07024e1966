//! Static knowledge base — the "search tool" invoked for factual queries.
//!
//! The table is an ordered slice of `(topic, fact)` pairs. Partial matches are
//! resolved by table order: the first topic that contains the query, or that
//! occurs in the query as whole words, wins. With overlapping topics (both
//! `"ai"` and `"json"` occur in `"ai and json"`) the earlier row is returned.
//!
//! Topics must occur in the query as whole words, not raw substrings:
//! otherwise `"ai"` would match inside `"blockchain"`. The same rule means
//! plurals and compounds of a topic do not match it either: `"apis"` finds
//! nothing, although `"api"` and `"rest api"` both find the API row.

use std::fmt;

use serde::Serialize;

/// Built-in topics, in lookup order.
const KNOWLEDGE_BASE: &[(&str, &str)] = &[
    (
        "python",
        "Python is a high-level programming language known for its simplicity and readability. Created by Guido van Rossum in 1991.",
    ),
    (
        "fastapi",
        "FastAPI is a modern, fast web framework for building APIs with Python based on standard Python type hints.",
    ),
    (
        "ai",
        "Artificial Intelligence (AI) refers to computer systems that can perform tasks requiring human intelligence, such as learning and problem-solving.",
    ),
    (
        "machine learning",
        "Machine Learning is a subset of AI that enables systems to learn and improve from experience without being explicitly programmed.",
    ),
    (
        "langchain",
        "LangChain is a framework for developing applications powered by language models, providing tools for chaining LLM calls.",
    ),
    (
        "langgraph",
        "LangGraph is a library for building stateful, multi-actor applications with LLMs, built on top of LangChain.",
    ),
    (
        "groq",
        "Groq provides fast AI inference with its LPU (Language Processing Unit) technology, offering high-speed LLM API access.",
    ),
    (
        "api",
        "API (Application Programming Interface) is a set of rules that allows different software applications to communicate with each other.",
    ),
    (
        "rest",
        "REST (Representational State Transfer) is an architectural style for designing networked applications using HTTP methods.",
    ),
    (
        "json",
        "JSON (JavaScript Object Notation) is a lightweight data-interchange format that is easy to read and write.",
    ),
];

/// Outcome of a knowledge lookup.
///
/// Both variants render to the text handed to the LLM as the tool result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(&'static str),
    NotFound {
        /// The query as given, before normalisation.
        query: String,
        topics: Vec<&'static str>,
    },
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Found(fact) => write!(f, "Found: {fact}"),
            Lookup::NotFound { query, topics } => write!(
                f,
                "No information found for '{query}'. This tool has limited knowledge about: {}",
                topics.join(", ")
            ),
        }
    }
}

/// Tool metadata published on the root endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescription {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: ToolParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolParameters {
    pub query: &'static str,
}

/// Immutable topic → fact table.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeStore {
    entries: &'static [(&'static str, &'static str)],
}

impl Default for KnowledgeStore {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KnowledgeStore {
    /// The built-in technology knowledge base.
    pub fn builtin() -> Self {
        Self { entries: KNOWLEDGE_BASE }
    }

    /// A store over a caller-supplied ordered table. Keys must be lower-case.
    pub fn from_static(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn topics(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(topic, _)| *topic).collect()
    }

    /// Look `query` up: exact topic first, then first partial match in table
    /// order, else a not-found message listing every topic.
    pub fn lookup(&self, query: &str) -> Lookup {
        let normalized = query.trim().to_lowercase();

        if let Some((_, fact)) = self.entries.iter().find(|(topic, _)| *topic == normalized) {
            return Lookup::Found(*fact);
        }

        let partial = self
            .entries
            .iter()
            .find(|(topic, _)| topic.contains(normalized.as_str()) || contains_words(&normalized, topic));
        if let Some((_, fact)) = partial {
            return Lookup::Found(*fact);
        }

        Lookup::NotFound { query: query.to_string(), topics: self.topics() }
    }

    pub fn describe() -> ToolDescription {
        ToolDescription {
            name: "search_tool",
            description: "Searches a knowledge base for factual information about technology topics. \
                Use this when the user asks factual questions about Python, AI, APIs, FastAPI, \
                LangChain, or related topics.",
            parameters: ToolParameters { query: "The topic or term to search for (string)" },
        }
    }
}

/// `needle` occurs in `haystack` with no alphanumeric character on either side.
fn contains_words(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
