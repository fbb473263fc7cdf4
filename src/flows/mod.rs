//! End-to-end generation flows.
//!
//! Each flow is one or more Generation Client calls plus the local logic around them.
//! Flows take the provider as a `&dyn GenerationProvider` so tests can drive them with
//! fakes.

pub mod details;
pub mod from_text;
pub mod identify;
pub mod suggestions;
pub mod videos;

pub use details::ExpansionReport;
pub use suggestions::{CanMakeTool, SuggestionRequest};
pub use videos::FALLBACK_VIDEOS;
