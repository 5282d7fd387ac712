pub mod knowledge;
pub mod responder;

pub use knowledge::{KnowledgeSource, LiveKnowledge};
pub use responder::{classify, ChatbotResponder, Intent};
