pub mod config;
pub mod conversation;
pub mod error;
pub mod resolver;
pub mod state;
pub mod suggestions;
pub mod transport;

// Re-export main types for convenience
pub use config::{Position, StyleOverrides, WidgetConfig};
pub use conversation::Conversation;
pub use error::{ChatError, TransportError};
pub use resolver::resolve;
pub use state::{Direction, Message, MessageStatus, ResolvedReply};
pub use suggestions::{Suggestion, SuggestionDispatcher, Visibility};
pub use transport::{FlowRequest, FlowResponse, HttpTransport, Transport};
