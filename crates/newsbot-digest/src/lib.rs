//! Digest rendering and webhook delivery.

pub mod chunk;
pub mod error;
pub(crate) mod retry;
pub mod summarize;
pub mod webhook;

pub use chunk::{split_message, DEFAULT_MAX_MESSAGE_CHARS};
pub use error::DeliveryError;
pub use summarize::{summarize, Digest};
pub use webhook::{DeliveryReport, DeliverySettings, DeliverySink};
