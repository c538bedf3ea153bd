use crate::models::RetrievedChunk;

pub const DEFAULT_CHAR_BUDGET: usize = 2_000;

const PASSAGE_SEPARATOR: &str = "\n\n";

/// Truncation applies to the joined string, not per chunk, so an oversized
/// top-ranked passage can crowd out lower-ranked ones entirely.
pub fn assemble_context(hits: &[RetrievedChunk], char_budget: usize) -> String {
    let joined = hits
        .iter()
        .map(|hit| hit.text.as_str())
        .collect::<Vec<_>>()
        .join(PASSAGE_SEPARATOR);

    truncate_chars(&joined, char_budget)
}

fn truncate_chars(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub role: String,
    pub instructions: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            role: "You are a knowledge-base expert assistant. Answer the following \
                   question about characters, storylines, comics, or events based on \
                   the provided context."
                .to_string(),
            instructions: "Please provide a comprehensive answer focusing on:\n\
                           - Specific character names, powers, and storylines\n\
                           - Universe details and events\n\
                           - Team affiliations and relationships\n\n\
                           Use markdown formatting for better readability \
                           (headers, lists, bold text).\n\n\
                           Detailed Answer:"
                .to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn build_prompt(&self, question: &str, context: &str) -> String {
        format!(
            "{role}\n\nContext from knowledge base:\n{context}\n\nQuestion: {question}\n\n{instructions}",
            role = self.role,
            context = context,
            question = question,
            instructions = self.instructions,
        )
    }
}

pub fn degraded_response(question: &str, context: &str) -> String {
    format!(
        "**Knowledge Base Response**\n\n\
         **Question:** {question}\n\n\
         **Relevant Context Found:**\n\n{context}\n\n\
         *AI analysis temporarily unavailable. The passages above are the raw \
         retrieved context.*"
    )
}

pub fn empty_index_response() -> String {
    "No knowledge base is available yet. Run the indexing pipeline against a \
     corpus directory, then ask again."
        .to_string()
}
