//! `registrar-service` — the in-process contract a transport layer exposes.
//!
//! [`Registrar`] wires the authorization engine, the record store and the
//! lifecycle manager together. Every mutating or read operation passes
//! through the engine first; if permitted, the lifecycle manager (for trash
//! operations) or plain persistence executes.

pub mod registrar;


pub use registrar::Registrar;
