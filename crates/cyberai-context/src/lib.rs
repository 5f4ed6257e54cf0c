//! CyberAI Context - conversation messages and context windowing
//!
//! This crate provides:
//! - The chat `Message` model shared by every other crate
//! - Token estimation and the trailing-window optimizer
//! - An in-memory session store for conversation history

pub mod error;
pub mod message;
pub mod session;
pub mod window;

pub use error::{ContextError, ContextResult};
pub use message::{Message, Sender};
pub use session::{ChatSession, SessionStore};
pub use window::{
    estimate_tokens, optimize, optimize_with, CharHeuristic, ContextWindow, TokenEstimator,
};

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{ContextError, ContextResult};
    pub use crate::message::{Message, Sender};
    pub use crate::session::SessionStore;
    pub use crate::window::{optimize, ContextWindow};
}
