//! Fulltext expression building
//!
//! Search text is split on word boundaries into lowercase tokens. A comma
//! only stays inside a token when it sits between two digits (`1,000`); each
//! token is then cut at its first comma and empty tokens are dropped. Tokens
//! become prefix terms joined by commas:
//! `"Escherichia coli"` → `prefix:escherichia,prefix:coli`.

const PREFIX: &str = "prefix:";

/// Splits text into lowercase word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() || is_digit_separator(&chars, i) {
            current.push(c);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .into_iter()
        .filter_map(|word| {
            let token = word.split(',').next().unwrap_or_default().to_lowercase();
            if token.is_empty() {
                None
            } else {
                Some(token)
            }
        })
        .collect()
}

/// True for a comma with a digit on both sides
fn is_digit_separator(chars: &[char], i: usize) -> bool {
    chars[i] == ','
        && i > 0
        && chars[i - 1].is_numeric()
        && chars.get(i + 1).map_or(false, |next| next.is_numeric())
}

/// Builds the prefix expression for a search text.
///
/// Returns an empty string when the text has no tokens; the store rejects it.
pub fn build_expression(text: &str) -> String {
    tokenize(text)
        .iter()
        .map(|token| format!("{}{}", PREFIX, token))
        .collect::<Vec<_>>()
        .join(",")
}

/// A parsed expression term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Matches words starting with the text
    Prefix(String),
    /// Matches the whole word
    Exact(String),
}

impl Term {
    pub fn matches_word(&self, word: &str) -> bool {
        match self {
            Term::Prefix(p) => word.starts_with(p.as_str()),
            Term::Exact(e) => word == e,
        }
    }
}

/// Parses a comma-joined expression, `None` when it has no terms
pub fn parse_expression(expression: &str) -> Option<Vec<Term>> {
    let terms: Vec<Term> = expression
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| match t.strip_prefix(PREFIX) {
            Some(rest) => Term::Prefix(rest.to_lowercase()),
            None => Term::Exact(t.to_lowercase()),
        })
        .filter(|t| !matches!(t, Term::Prefix(p) | Term::Exact(p) if p.is_empty()))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms)
    }
}
