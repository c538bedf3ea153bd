use crate::context::{
    assemble_context, degraded_response, empty_index_response, PromptTemplate,
    DEFAULT_CHAR_BUDGET,
};
use crate::embeddings::Embedder;
use crate::error::QueryError;
use crate::generation::Generator;
use crate::models::{QueryOutcome, QuerySession};
use crate::retrieve::{Retriever, DEFAULT_TOP_K};
use crate::traits::VectorIndex;
use tracing::{info, warn};

/// Responses at or below this length are treated as generation failure.
pub const MIN_ANSWER_CHARS: usize = 20;

pub struct QueryOrchestrator<V, E, G>
where
    V: VectorIndex + Send + Sync,
    E: Embedder + Send + Sync,
    G: Generator + Send + Sync,
{
    retriever: Retriever<V, E>,
    generator: G,
    template: PromptTemplate,
    pub top_k: usize,
    pub char_budget: usize,
}

impl<V, E, G> QueryOrchestrator<V, E, G>
where
    V: VectorIndex + Send + Sync,
    E: Embedder + Send + Sync,
    G: Generator + Send + Sync,
{
    pub fn new(retriever: Retriever<V, E>, generator: G) -> Self {
        Self {
            retriever,
            generator,
            template: PromptTemplate::default(),
            top_k: DEFAULT_TOP_K,
            char_budget: DEFAULT_CHAR_BUDGET,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn retriever(&self) -> &Retriever<V, E> {
        &self.retriever
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// An empty or unreachable index and any generation failure resolve to
    /// a degraded session; only caller mistakes (empty question, embedding
    /// mismatch) surface as `Err`.
    pub async fn answer(&self, question: &str) -> Result<QuerySession, QueryError> {
        let mut session = QuerySession::new(question);
        info!(session = %session.id, question, "retrieving context");

        let retrieved = match self.retriever.retrieve(question, self.top_k).await {
            Ok(hits) => hits,
            Err(QueryError::EmptyIndex) => {
                warn!(session = %session.id, "vector index is empty");
                session.answer = empty_index_response();
                session.outcome = QueryOutcome::Degraded {
                    reason: "empty index".to_string(),
                };
                return Ok(session);
            }
            Err(QueryError::IndexUnavailable(details)) => {
                warn!(session = %session.id, details, "vector index unavailable");
                session.answer = empty_index_response();
                session.outcome = QueryOutcome::Degraded {
                    reason: format!("index unavailable: {details}"),
                };
                return Ok(session);
            }
            Err(error) => return Err(error),
        };

        info!(
            session = %session.id,
            chunk_count = retrieved.len(),
            "assembling context"
        );
        session.retrieved = retrieved;

        let context = assemble_context(&session.retrieved, self.char_budget);
        let prompt = self.template.build_prompt(question, &context);
        session.prompt = Some(prompt.clone());

        info!(session = %session.id, prompt_chars = prompt.len(), "generating answer");
        match self.generator.generate(&prompt).await {
            Ok(text) if text.trim().chars().count() > MIN_ANSWER_CHARS => {
                info!(session = %session.id, answer_chars = text.len(), "answer generated");
                session.answer = text;
                session.outcome = QueryOutcome::Answered;
            }
            Ok(text) => {
                warn!(
                    session = %session.id,
                    answer_chars = text.len(),
                    "generated response below minimum length, degrading"
                );
                session.answer = degraded_response(question, &context);
                session.outcome = QueryOutcome::Degraded {
                    reason: "undersized response".to_string(),
                };
            }
            Err(error) => {
                warn!(session = %session.id, %error, "generation failed, degrading");
                session.answer = degraded_response(question, &context);
                session.outcome = QueryOutcome::Degraded {
                    reason: error.to_string(),
                };
            }
        }

        Ok(session)
    }
}
