//! Retrieval-augmented pharmacy chat.
//!
//! message → keyword (generator) → catalog lookup → context → answer (generator)

mod keyword;
mod orchestrator;
mod prompt;

pub use keyword::{is_general, KeywordExtractor, GENERAL_KEYWORD};
pub use orchestrator::{
    ChatError, ChatOrchestrator, ChatOutcome, APOLOGY_REPLY, EMPTY_MESSAGE_REPLY,
    NO_RESPONSE_REPLY,
};
pub use prompt::{answer_prompt, keyword_prompt, render_context, NO_MEDICINES_CONTEXT};
