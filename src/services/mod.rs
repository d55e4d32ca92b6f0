pub mod llm_service;
pub mod session_store;

pub use llm_service::{LlmApi, LlmService};
pub use session_store::{JsonFileStore, MemoryStore, SessionStore};
