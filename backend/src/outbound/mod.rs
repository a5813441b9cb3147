//! Outbound adapters implementing domain ports.
//!
//! Only process-local adapters ship with the engine; durable stores plug in
//! behind the same ports.

pub mod memory;
