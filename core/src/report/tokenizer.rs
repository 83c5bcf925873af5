use std::path::Path;

use tokenizers::Tokenizer;

/// Token counting over rendered report text.
///
/// Wraps a HuggingFace tokenizer loaded from a `tokenizer.json`. When the
/// file is missing or fails to load, counting degrades to an estimate of one
/// token per four bytes of text; degradation is never surfaced as an error.
pub struct TokenCounter {
    tokenizer: Option<Tokenizer>,
}

impl TokenCounter {
    /// Load the tokenizer from an optional configured path. `None` or a
    /// load failure yields the estimating counter.
    pub fn from_config(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::estimate_only();
        };

        match Tokenizer::from_file(path) {
            Ok(tokenizer) => Self {
                tokenizer: Some(tokenizer),
            },
            Err(e) => {
                tracing::warn!("tokenizer unavailable ({e}), falling back to estimation");
                Self::estimate_only()
            }
        }
    }

    pub fn estimate_only() -> Self {
        Self { tokenizer: None }
    }

    pub fn count(&self, text: &str) -> usize {
        match &self.tokenizer {
            Some(tokenizer) => match tokenizer.encode(text, false) {
                Ok(encoding) => encoding.get_ids().len(),
                Err(e) => {
                    tracing::debug!("token encode failed ({e}), estimating");
                    estimate(text)
                }
            },
            None => estimate(text),
        }
    }
}

fn estimate(text: &str) -> usize {
    text.len() / 4
}
