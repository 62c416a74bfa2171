//! Data shapes exposed by the gateway.
//!
//! Object records are rebuilt from the store's listing on every request and
//! serialize through `ObjectResponse`, which carries the derived fields.

pub mod envelope;
pub mod object;
