//! Application-facing plumbing shared by the builder crates

pub mod message;

pub use message::{Message, MessageDispatcher, MessageLevel};
