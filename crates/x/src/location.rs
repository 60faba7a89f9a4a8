//! Location candidates extracted from free text.

use regex::Regex;

/// Capitalized word runs after `in`, `at`, `near` or `from`, optionally joined
/// by commas (`near Paris, France`).
const CANDIDATE_PATTERN: &str = r"\b(?:in|at|near|from)\s+([A-Z][a-zA-Z'\-]*(?:[ \t]+[A-Z][a-zA-Z'\-]*)*(?:,[ \t]*[A-Z][a-zA-Z'\-]*(?:[ \t]+[A-Z][a-zA-Z'\-]*)*)*)";

#[derive(Debug, Clone)]
pub struct LocationExtractor {
    pattern: Regex,
}

impl LocationExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(CANDIDATE_PATTERN)?,
        })
    }

    /// Place-name candidates in order of appearance, without duplicates.
    pub fn candidates(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for caps in self.pattern.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let candidate = m.as_str().trim().to_string();
            if !candidate.is_empty() && !found.contains(&candidate) {
                found.push(candidate);
            }
        }
        found
    }
}
