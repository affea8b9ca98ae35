//! Delivery adapter for Skillbot.
//!
//! Wraps the answer in the messaging platform's fixed response envelope and
//! delivers it: synchronously as the HTTP response body, or asynchronously
//! by POSTing to the request's callback address. A minimum delay is
//! enforced before any delivery, per the platform's callback timing
//! expectations.

pub mod adapter;
pub mod envelope;

pub use adapter::DeliveryAdapter;
pub use envelope::{render, Envelope};
