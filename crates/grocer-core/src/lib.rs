pub mod config;
pub mod controller;
pub mod error;
pub mod render;
pub mod response;
pub mod transport;
pub mod view;

// Re-export main types for convenience
pub use config::Config;
pub use controller::{
    ConversationController, InteractionState, Keystroke, KeystrokeOutcome, PendingRequest,
    SubmitOutcome, TRANSPORT_ERROR_MESSAGE,
};
pub use error::TransportError;
pub use render::{ChatMessage, GroupRole, Image, MessageContent, Node, Sender};
pub use response::{classify, AgentResponse, Ingredient, MealPlan, Recipe, ShoppingItem};
pub use transport::{HttpTransport, Transport};
pub use view::{InputSizing, MessageId, ScrollMetrics, ViewSurface};
