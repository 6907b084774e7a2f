//! Secondary node
//!
//! A follower: applies replicated entries idempotently, in sequence order,
//! and hides reads past the first gap in its local log.

pub mod apply;
pub mod http;

pub use http::SecondaryState;
