//! Topical relevance filter.
//!
//! A record is in scope when any term of the vocabulary occurs as a
//! substring of its lowercased title and summary. The vocabulary comes from
//! configuration; the algorithm does not know what the terms are.

/// Substring-vocabulary relevance test.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    vocabulary: Vec<String>,
}

impl RelevanceFilter {
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vocabulary = vocabulary
            .into_iter()
            .map(|term| term.as_ref().trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        Self { vocabulary }
    }

    /// Return `true` iff a vocabulary term occurs in `title` or `summary`.
    pub fn is_relevant(&self, title: &str, summary: &str) -> bool {
        self.matched_term(title, summary).is_some()
    }

    /// The first vocabulary term found in the text.
    fn matched_term(&self, title: &str, summary: &str) -> Option<&str> {
        let text = format!("{title} {summary}").to_lowercase();
        self.vocabulary
            .iter()
            .find(|term| text.contains(term.as_str()))
            .map(String::as_str)
    }
}
