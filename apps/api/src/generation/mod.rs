// Resume generation: prompt composition, the completions call, and
// best-effort extraction of a single HTML document from model output.
// All remote calls go through llm_client.

pub mod generator;
pub mod html_extract;
pub mod prompts;

pub use generator::{GenerationError, ResumeGenerator};
pub use html_extract::normalize_doctype;
