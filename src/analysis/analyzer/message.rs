//! Default analyzer for disaster response messages.

use std::fmt::Debug;
use std::fmt::Formatter;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lemma::{LemmaFilter, Lemmatizer};
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::strip::StripFilter;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::error::Result;

/// Analyzer used for message normalization.
///
/// Splits on Unicode word boundaries, lemmatizes, lower-cases, and strips
/// surrounding whitespace. No stop-word removal and no stemming beyond
/// lemmatization.
pub struct MessageAnalyzer {
    inner: PipelineAnalyzer,
}

impl MessageAnalyzer {
    /// Create the default message analyzer with the embedded lemma table.
    pub fn new() -> Result<Self> {
        Self::with_parts(Arc::new(UnicodeWordTokenizer::new()), Arc::new(Lemmatizer::builtin()))
    }

    /// Create a message analyzer from an explicit tokenizer and lemmatizer.
    ///
    /// This is the initialization seam for a custom token pattern or an
    /// alternate lexicon file.
    pub fn with_parts(tokenizer: Arc<dyn Tokenizer>, lemmatizer: Arc<Lemmatizer>) -> Result<Self> {
        let analyzer = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(LemmaFilter::with_lemmatizer(lemmatizer)))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StripFilter::new()))
            .with_name("message".to_string());

        Ok(Self { inner: analyzer })
    }
}

impl Default for MessageAnalyzer {
    fn default() -> Self {
        Self::new().expect("Message analyzer should be creatable with default settings")
    }
}

impl Analyzer for MessageAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "message"
    }
}

impl Debug for MessageAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageAnalyzer")
            .field("inner", &self.inner)
            .finish()
    }
}
