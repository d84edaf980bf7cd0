// Resume analysis: request validation, prompt building, the completion call
// and recovery of the model's JSON answer.
// All LLM calls go through llm_client via the CompletionClient trait.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod recovery;
