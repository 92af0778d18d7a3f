//! Session state implementations for Lifeline.

pub mod in_memory;

pub use in_memory::InMemorySessionStore;
