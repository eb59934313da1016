// Resume analysis pipeline: upload gate → temp storage → LLM analysis → verdict.
// All provider calls go through llm_client; nothing here talks HTTP directly.

pub mod analyzer;
pub mod handlers;
pub mod policy;
pub mod prompts;
pub mod storage;
pub mod upload;
pub mod verdict;
