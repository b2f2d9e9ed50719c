//! Two-stage answer pipeline.
//!
//! Validate → extract keyword → retrieve (unless "general") → compose context
//! → generate → respond. Strictly sequential, no writes. Retrieval and final
//! generation errors surface as [`ChatOutcome::Failed`] with a fixed apology.

use std::sync::Arc;

use thiserror::Error;

use super::keyword::{is_general, KeywordExtractor};
use super::prompt::{answer_prompt, render_context};
use crate::catalog::{MedicineCatalog, MedicineRecord, StoreError};
use crate::core::config::settings::DEFAULT_CONTEXT_LIMIT;
use crate::llm::{GenerationError, TextGenerator};

pub const EMPTY_MESSAGE_REPLY: &str = "Say something!";
pub const NO_RESPONSE_REPLY: &str = "I couldn't generate a response. Please try again.";
pub const APOLOGY_REPLY: &str = "Sorry, I'm having trouble connecting to the AI right now.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("medicine lookup failed: {0}")]
    Retrieval(#[from] StoreError),
    #[error("answer generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl ChatError {
    pub fn stage(&self) -> &'static str {
        match self {
            ChatError::Retrieval(_) => "retrieval",
            ChatError::Generation(_) => "generation",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// Blank input; no generator or store call was made.
    Rejected { reply: String },
    Answered {
        reply: String,
        keyword: String,
        context_records: usize,
    },
    Failed { reply: String, stage: &'static str },
}

impl ChatOutcome {
    pub fn reply(&self) -> &str {
        match self {
            ChatOutcome::Rejected { reply }
            | ChatOutcome::Answered { reply, .. }
            | ChatOutcome::Failed { reply, .. } => reply.as_str(),
        }
    }
}

struct Answer {
    reply: String,
    keyword: String,
    context_records: usize,
}

pub struct ChatOrchestrator {
    extractor: KeywordExtractor,
    catalog: Arc<dyn MedicineCatalog>,
    generator: Arc<dyn TextGenerator>,
    context_limit: i64,
}

impl ChatOrchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>, catalog: Arc<dyn MedicineCatalog>) -> Self {
        Self {
            extractor: KeywordExtractor::new(generator.clone()),
            catalog,
            generator,
            context_limit: DEFAULT_CONTEXT_LIMIT,
        }
    }

    pub fn with_context_limit(mut self, limit: i64) -> Self {
        self.context_limit = limit;
        self
    }

    pub async fn respond(&self, message: &str) -> ChatOutcome {
        if message.trim().is_empty() {
            return ChatOutcome::Rejected {
                reply: EMPTY_MESSAGE_REPLY.to_string(),
            };
        }

        match self.answer(message).await {
            Ok(answer) => {
                tracing::info!(
                    keyword = %answer.keyword,
                    context_records = answer.context_records,
                    "Chat reply generated"
                );
                ChatOutcome::Answered {
                    reply: answer.reply,
                    keyword: answer.keyword,
                    context_records: answer.context_records,
                }
            }
            Err(err) => {
                tracing::error!(stage = err.stage(), error = %err, "Chat pipeline failed");
                ChatOutcome::Failed {
                    reply: APOLOGY_REPLY.to_string(),
                    stage: err.stage(),
                }
            }
        }
    }

    /// Catalog records backing the context for `keyword`; empty for the sentinel.
    pub async fn retrieve(&self, keyword: &str) -> Result<Vec<MedicineRecord>, StoreError> {
        if is_general(keyword) {
            return Ok(Vec::new());
        }
        self.catalog.find_medicines(keyword, self.context_limit).await
    }

    async fn answer(&self, message: &str) -> Result<Answer, ChatError> {
        let keyword = self.extractor.extract(message).await;
        tracing::debug!(keyword = %keyword, "Extracted search keyword");

        let records = self.retrieve(&keyword).await?;
        let context = render_context(&records);
        let prompt = answer_prompt(message, &context);

        let generated = self.generator.generate(&prompt).await?;
        let reply = if generated.trim().is_empty() {
            NO_RESPONSE_REPLY.to_string()
        } else {
            generated
        };

        Ok(Answer {
            reply,
            keyword,
            context_records: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::chat::prompt::NO_MEDICINES_CONTEXT;

    /// Replays scripted results in order and records every prompt.
    struct ScriptedGenerator {
        script: Mutex<VecDeque<Result<String, ()>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Result<&str, ()>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into_iter().map(|r| r.map(str::to_string)).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(text)) => Ok(text),
                _ => Err(GenerationError::request("scripted", "unavailable")),
            }
        }
    }

    struct MemoryCatalog {
        records: Vec<MedicineRecord>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl MemoryCatalog {
        fn new(records: Vec<MedicineRecord>) -> Arc<Self> {
            Arc::new(Self {
                records,
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                records: Vec::new(),
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MedicineCatalog for MemoryCatalog {
        async fn find_medicines(
            &self,
            term: &str,
            limit: i64,
        ) -> Result<Vec<MedicineRecord>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::Database(sqlx::Error::PoolClosed));
            }
            let needle = term.to_lowercase();
            Ok(self
                .records
                .iter()
                .filter(|m| {
                    [&m.name, &m.composition, &m.uses]
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
                })
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    fn record(id: i64, name: &str, uses: &str) -> MedicineRecord {
        MedicineRecord {
            medicine_id: id,
            name: name.to_string(),
            composition: format!("{} (500mg)", name),
            uses: uses.to_string(),
            side_effects: "Nausea".to_string(),
            image_url: String::new(),
            manufacturer: "Acme".to_string(),
            excellent_review_pct: 0.0,
            average_review_pct: 0.0,
            poor_review_pct: 0.0,
        }
    }

    fn orchestrator(
        generator: &Arc<ScriptedGenerator>,
        catalog: &Arc<MemoryCatalog>,
    ) -> ChatOrchestrator {
        ChatOrchestrator::new(generator.clone(), catalog.clone())
    }

    #[tokio::test]
    async fn fever_question_retrieves_paracetamol_into_the_answer_prompt() {
        let generator = ScriptedGenerator::new(vec![
            Ok("fever"),
            Ok("Please consult a doctor first. Paracetamol (500mg) can help reduce fever."),
        ]);
        let catalog = MemoryCatalog::new(vec![
            record(1, "Paracetamol", "fever, pain"),
            record(2, "Cetirizine", "allergy"),
        ]);

        let outcome = orchestrator(&generator, &catalog)
            .respond("I have a fever")
            .await;

        match &outcome {
            ChatOutcome::Answered {
                reply,
                keyword,
                context_records,
            } => {
                assert_eq!(keyword, "fever");
                assert_eq!(*context_records, 1);
                assert!(reply.contains("consult a doctor"));
                assert!(reply.contains("Paracetamol"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("I have a fever"));
        assert!(prompts[1].contains("- Paracetamol (Comp: Paracetamol (500mg)): Uses: fever, pain."));
        assert!(!prompts[1].contains("Cetirizine"));
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn blank_message_is_rejected_without_any_calls() {
        let generator = ScriptedGenerator::new(vec![]);
        let catalog = MemoryCatalog::new(vec![]);

        for message in ["", "   ", "\n\t"] {
            let outcome = orchestrator(&generator, &catalog).respond(message).await;
            assert_eq!(
                outcome,
                ChatOutcome::Rejected {
                    reply: EMPTY_MESSAGE_REPLY.to_string()
                }
            );
        }

        assert!(generator.prompts().is_empty());
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn unmatched_keyword_still_generates_with_no_medicines_context() {
        let generator = ScriptedGenerator::new(vec![
            Ok("hello"),
            Ok("Please consult a doctor. How can I help you today?"),
        ]);
        let catalog = MemoryCatalog::new(vec![record(1, "Paracetamol", "fever")]);

        let outcome = orchestrator(&generator, &catalog).respond("hello").await;

        assert!(matches!(
            outcome,
            ChatOutcome::Answered { context_records: 0, .. }
        ));
        assert_eq!(catalog.calls(), 1);
        assert!(generator.prompts()[1].contains(NO_MEDICINES_CONTEXT));
    }

    #[tokio::test]
    async fn general_keyword_skips_retrieval_in_any_case() {
        for sentinel in ["general", "GENERAL", "\"General\""] {
            let generator = ScriptedGenerator::new(vec![Ok(sentinel), Ok("Consult a doctor.")]);
            let catalog = MemoryCatalog::new(vec![record(1, "General Tonic", "general weakness")]);

            let outcome = orchestrator(&generator, &catalog).respond("hi there").await;

            assert!(matches!(outcome, ChatOutcome::Answered { .. }));
            assert_eq!(catalog.calls(), 0, "sentinel {sentinel} triggered retrieval");
            assert!(generator.prompts()[1].contains(NO_MEDICINES_CONTEXT));
        }
    }

    #[tokio::test]
    async fn extraction_failure_is_absorbed() {
        let generator = ScriptedGenerator::new(vec![Err(()), Ok("Consult a doctor. Rest well.")]);
        let catalog = MemoryCatalog::new(vec![record(1, "Paracetamol", "fever")]);

        let outcome = orchestrator(&generator, &catalog)
            .respond("I have a fever")
            .await;

        match outcome {
            ChatOutcome::Answered { keyword, reply, .. } => {
                assert_eq!(keyword, "general");
                assert_eq!(reply, "Consult a doctor. Rest well.");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn final_generation_failure_returns_apology() {
        let generator = ScriptedGenerator::new(vec![Ok("fever"), Err(())]);
        let catalog = MemoryCatalog::new(vec![record(1, "Paracetamol", "fever")]);

        let outcome = orchestrator(&generator, &catalog)
            .respond("I have a fever")
            .await;

        assert_eq!(
            outcome,
            ChatOutcome::Failed {
                reply: APOLOGY_REPLY.to_string(),
                stage: "generation"
            }
        );
    }

    #[tokio::test]
    async fn store_failure_returns_apology_without_second_generation() {
        let generator = ScriptedGenerator::new(vec![Ok("fever"), Ok("unused")]);
        let catalog = MemoryCatalog::failing();

        let outcome = orchestrator(&generator, &catalog)
            .respond("I have a fever")
            .await;

        assert_eq!(
            outcome,
            ChatOutcome::Failed {
                reply: APOLOGY_REPLY.to_string(),
                stage: "retrieval"
            }
        );
        assert_eq!(generator.prompts().len(), 1);
    }

    #[tokio::test]
    async fn empty_generation_uses_fallback_reply() {
        let generator = ScriptedGenerator::new(vec![Ok("fever"), Ok("   ")]);
        let catalog = MemoryCatalog::new(vec![]);

        let outcome = orchestrator(&generator, &catalog)
            .respond("I have a fever")
            .await;

        assert_eq!(outcome.reply(), NO_RESPONSE_REPLY);
    }

    #[tokio::test]
    async fn retrieval_is_capped_by_context_limit() {
        let records = (0..9).map(|i| record(i, &format!("Coldact {}", i), "cold")).collect();
        let catalog = MemoryCatalog::new(records);
        let generator = ScriptedGenerator::new(vec![]);

        let default_limit = orchestrator(&generator, &catalog);
        assert_eq!(default_limit.retrieve("cold").await.unwrap().len(), 5);

        let narrow = orchestrator(&generator, &catalog).with_context_limit(2);
        assert_eq!(narrow.retrieve("cold").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn same_message_and_store_yield_same_context() {
        let generator = ScriptedGenerator::new(vec![
            Ok("pain"),
            Ok("Consult a doctor. A"),
            Ok("pain"),
            Ok("Consult a doctor. B"),
        ]);
        let catalog = MemoryCatalog::new(vec![
            record(1, "Paracetamol", "fever, pain"),
            record(2, "Ibuprofen", "pain, inflammation"),
        ]);
        let chat = orchestrator(&generator, &catalog);

        chat.respond("my back is in pain").await;
        chat.respond("my back is in pain").await;

        let prompts = generator.prompts();
        assert_eq!(prompts[1], prompts[3]);
    }
}
