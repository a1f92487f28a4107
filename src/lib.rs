//! Multi-locale content translation.
//!
//! Batch mode translates an entity into every canonical locale with one
//! provider call and persists the result. Streaming mode translates one
//! locale at a time and emits each result as an event frame, which clients
//! fold into a [`session::TranslationSession`].

pub mod batch;
pub mod bundle;
pub mod config;
pub mod consumer;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod fields;
pub mod framer;
pub mod locale;
pub mod metrics;
pub mod prompt;
pub mod provider;
pub mod schema;
pub mod server;
pub mod session;
pub mod store;
pub mod validator;
