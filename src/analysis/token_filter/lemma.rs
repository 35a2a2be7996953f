//! Lemmatization token filter.
//!
//! Reduces English words to their dictionary base form. Unlike a stemmer,
//! the lemmatizer only rewrites a word when an inflection rule or the
//! irregular-form table applies; everything else passes through unchanged,
//! so output lemmas are themselves fixed points of the filter.
//!
//! # Examples
//!
//! ```
//! use triage::analysis::token_filter::lemma::Lemmatizer;
//!
//! let lemmatizer = Lemmatizer::builtin();
//!
//! assert_eq!(lemmatizer.lemmatize("floods"), "flood");
//! assert_eq!(lemmatizer.lemmatize("supplies"), "supply");
//! assert_eq!(lemmatizer.lemmatize("children"), "child");
//! assert_eq!(lemmatizer.lemmatize("water"), "water");
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::{Result, TriageError};

lazy_static! {
    /// Irregular plural -> singular forms that no suffix rule covers.
    static ref IRREGULAR_FORMS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("children", "child");
        m.insert("men", "man");
        m.insert("women", "woman");
        m.insert("people", "person");
        m.insert("feet", "foot");
        m.insert("teeth", "tooth");
        m.insert("geese", "goose");
        m.insert("mice", "mouse");
        m.insert("lice", "louse");
        m.insert("oxen", "ox");
        m.insert("knives", "knife");
        m.insert("wives", "wife");
        m.insert("lives", "life");
        m.insert("crises", "crisis");
        m.insert("analyses", "analysis");
        m.insert("diagnoses", "diagnosis");
        m.insert("buses", "bus");
        m.insert("gases", "gas");
        m.insert("viruses", "virus");
        m.insert("statuses", "status");
        m.insert("censuses", "census");
        m.insert("aliases", "alias");
        m.insert("atlases", "atlas");
        m
    };

    /// Words that end in "s" but are not plurals.
    static ref NON_PLURALS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        for word in [
            "always", "as", "gas", "has", "his", "is", "its", "news",
            "perhaps", "series", "species", "this", "was", "yes", "lens",
        ] {
            s.insert(word);
        }
        s
    };
}

/// Dictionary-based English lemmatizer.
///
/// Combines an irregular-form table with noun inflection rules. The table
/// defaults to the embedded resource but can be loaded from a file, so the
/// linguistic resource location is an explicit initialization choice rather
/// than a side effect.
#[derive(Debug, Clone)]
pub struct Lemmatizer {
    irregular: HashMap<String, String>,
    non_plurals: HashSet<String>,
}

impl Lemmatizer {
    /// Create a lemmatizer backed by the embedded irregular-form table.
    pub fn builtin() -> Self {
        Lemmatizer {
            irregular: IRREGULAR_FORMS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            non_plurals: NON_PLURALS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Create a lemmatizer whose irregular-form table is read from a file.
    ///
    /// The file holds one `inflected<TAB>lemma` pair per line; a line with a
    /// single word marks it as a non-plural fixed point. Lines starting with
    /// `#` and blank lines are ignored. Entries extend the embedded table.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TriageError::analysis(format!("Cannot read lexicon {}: {e}", path.display()))
        })?;

        let mut lemmatizer = Self::builtin();
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split('\t');
            let inflected = parts.next().unwrap_or_default().trim();
            match parts.next() {
                Some(lemma) => {
                    lemmatizer
                        .irregular
                        .insert(inflected.to_lowercase(), lemma.trim().to_lowercase());
                }
                None if !inflected.is_empty() => {
                    lemmatizer.non_plurals.insert(inflected.to_lowercase());
                }
                None => {
                    return Err(TriageError::analysis(format!(
                        "Malformed lexicon entry at line {}",
                        line_num + 1
                    )));
                }
            }
        }

        Ok(lemmatizer)
    }

    /// Reduce a word to its dictionary base form.
    ///
    /// Matching is case-insensitive; the returned lemma is lowercase when a
    /// rewrite applies and the input unchanged otherwise.
    pub fn lemmatize(&self, word: &str) -> String {
        let lower = word.to_lowercase();

        if let Some(lemma) = self.irregular.get(&lower) {
            return lemma.clone();
        }
        if self.non_plurals.contains(&lower) {
            return word.to_string();
        }

        if let Some(lemma) = Self::apply_suffix_rules(&lower) {
            return lemma;
        }

        word.to_string()
    }

    /// Noun plural suffix rules, tried in order of specificity.
    fn apply_suffix_rules(word: &str) -> Option<String> {
        let n = word.len();

        // "-men" -> "-man" (firemen, policewomen via "women" table entry)
        if n > 4 && word.ends_with("men") {
            return Some(format!("{}man", &word[..n - 3]));
        }

        if !word.ends_with('s') || n <= 3 {
            return None;
        }
        // Not plural markers: glass, bus, crisis
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return None;
        }

        if word.ends_with("ies") {
            // cities -> city, but ties -> tie
            return if n > 4 {
                Some(format!("{}y", &word[..n - 3]))
            } else {
                Some(format!("{}ie", &word[..n - 3]))
            };
        }
        if n > 4 && word.ends_with("ves") {
            // wolves -> wolf (knife-type forms come from the irregular table)
            return Some(format!("{}f", &word[..n - 3]));
        }
        if word.ends_with("sses")
            || word.ends_with("xes")
            || word.ends_with("zes")
            || word.ends_with("ches")
            || word.ends_with("shes")
        {
            return Some(word[..n - 2].to_string());
        }
        if word.ends_with("ses") {
            // houses -> house, causes -> cause
            return Some(word[..n - 1].to_string());
        }

        Some(word[..n - 1].to_string())
    }
}

/// Filter that applies lemmatization to tokens.
pub struct LemmaFilter {
    /// The lemmatizer to use.
    lemmatizer: Arc<Lemmatizer>,
}

impl std::fmt::Debug for LemmaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmaFilter")
            .field("lemmatizer", &"<lemmatizer>")
            .finish()
    }
}

impl LemmaFilter {
    /// Create a new lemma filter with the embedded lemmatizer.
    pub fn new() -> Self {
        LemmaFilter {
            lemmatizer: Arc::new(Lemmatizer::builtin()),
        }
    }

    /// Create a lemma filter with a custom lemmatizer.
    pub fn with_lemmatizer(lemmatizer: Arc<Lemmatizer>) -> Self {
        LemmaFilter { lemmatizer }
    }
}

impl Default for LemmaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for LemmaFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    token
                } else {
                    let lemma = self.lemmatizer.lemmatize(&token.text);
                    token.with_text(lemma)
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lemma"
    }
}
