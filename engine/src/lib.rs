//! # Coinz Tracker Engine
//!
//! The economy engine behind Coinz Tracker: a child earns a virtual
//! currency ("Coinz") by spending time in learning apps and spends it to
//! unlock time-limited access to reward apps, behind a daily
//! minimum-learning gate and per-app daily ceilings.
//!
//! The engine owns the wallet, the append-only transaction history, the
//! purchase gate, the daily rollover and goal tracking. Usage monitoring,
//! notifications and UI are external collaborators: they report measured
//! minutes in, and read snapshots and typed results out.
//!
//! ## Architecture
//!
//! ```text
//! Presentation / usage monitor
//!     ↓
//! IO Layer (shared DTO mapping)
//!     ↓
//! Domain Layer (ledger, gate, rollover, goals)
//!     ↓
//! Storage Layer (CSV repositories)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use log::info;
use std::path::Path;
use std::sync::Arc;

use crate::domain::EconomyService;
use crate::storage::csv::CsvConnection;

/// Main application state holding the wired engine services.
#[derive(Clone)]
pub struct AppState {
    pub economy_service: EconomyService<CsvConnection>,
}

/// Initialize the engine over the CSV storage backend rooted at
/// `data_directory`.
pub fn initialize_engine<P: AsRef<Path>>(data_directory: P) -> Result<AppState> {
    info!("Setting up storage");
    let connection = Arc::new(CsvConnection::new(data_directory)?);

    info!("Setting up domain services");
    let economy_service = EconomyService::new(connection);

    Ok(AppState { economy_service })
}
