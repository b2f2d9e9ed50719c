use std::sync::Arc;

use super::prompt::keyword_prompt;
use crate::llm::TextGenerator;

/// Returned when no symptom or medicine was identified, or extraction failed.
pub const GENERAL_KEYWORD: &str = "general";

pub fn is_general(keyword: &str) -> bool {
    keyword.trim().eq_ignore_ascii_case(GENERAL_KEYWORD)
}

/// Reduces a free-form message to a single catalog search term.
///
/// Never fails: generator errors and blank output both degrade to
/// [`GENERAL_KEYWORD`]. The generator's answer is not validated beyond
/// trimming whitespace and quote characters.
#[derive(Clone)]
pub struct KeywordExtractor {
    generator: Arc<dyn TextGenerator>,
}

impl KeywordExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn extract(&self, message: &str) -> String {
        let prompt = keyword_prompt(message);
        match self.generator.generate(&prompt).await {
            Ok(raw) => clean_keyword(&raw),
            Err(err) => {
                tracing::warn!(stage = "extraction", error = %err, "Keyword extraction failed, using general");
                GENERAL_KEYWORD.to_string()
            }
        }
    }
}

fn clean_keyword(raw: &str) -> String {
    let unquoted: String = raw.chars().filter(|c| *c != '"' && *c != '\'').collect();
    let keyword = unquoted.trim();
    if keyword.is_empty() {
        GENERAL_KEYWORD.to_string()
    } else {
        keyword.to_string()
    }
}
