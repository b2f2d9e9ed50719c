use crate::catalog::MedicineRecord;

pub const NO_MEDICINES_CONTEXT: &str =
    "No specific medicines found in our pharmacy database for this query.";

const CONTEXT_INTRO: &str = "Here are some relevant medicines from our pharmacy inventory:";

pub fn keyword_prompt(message: &str) -> String {
    format!(
        "Extract exactly one symptom or medicine name from the following user message. \
         Respond with only that word or phrase and nothing else. \
         If the message mentions no symptom or medicine, respond with \"general\".\n\
         User message: \"{}\"",
        message
    )
}

pub fn render_context(records: &[MedicineRecord]) -> String {
    if records.is_empty() {
        return NO_MEDICINES_CONTEXT.to_string();
    }

    let lines = records
        .iter()
        .map(|m| {
            format!(
                "- {} (Comp: {}): Uses: {}. Side Effects: {}",
                m.name, m.composition, m.uses, m.side_effects
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n{}", CONTEXT_INTRO, lines)
}

pub fn answer_prompt(message: &str, context: &str) -> String {
    format!(
        "You are a helpful pharmacy assistant.\n\
         User query: \"{message}\"\n\
         \n\
         Context from our pharmacy database:\n\
         {context}\n\
         \n\
         Instructions:\n\
         1. Only recommend medicines that appear in the context above.\n\
         2. If relevant medicines are found, mention their name and composition.\n\
         3. If no relevant medicines are found, give general advice and mention that we may not have a specific medicine in stock.\n\
         4. Keep the response concise (max 3-4 sentences).\n\
         5. Always start by advising the user to consult a doctor."
    )
}
