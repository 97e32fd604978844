//! "Ask AI" chat over the call-analysis data.

pub mod session;
pub mod suggestions;

pub use session::{ChatMessage, ChatPhase, ChatSession, Role};
pub use suggestions::SuggestionCache;
