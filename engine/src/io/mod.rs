//! # IO Module
//!
//! The boundary between the engine and its presentation collaborator.
//! Maps domain results to the public DTOs defined in the `shared` crate and
//! public requests back to internal commands. The engine never exposes
//! domain state directly to a UI; everything crosses through here.

pub mod mappers;

pub use mappers::*;
