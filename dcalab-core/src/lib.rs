//! DcaLab Core: curve fitting, zone signals, and DCA simulation.
//!
//! This crate contains the quantitative engine:
//! - Domain types (bars, series, bands, zone events, positions, snapshots)
//! - Polynomial baseline fitting with residual deviation bands
//! - Touch-and-hold zone-crossing detection
//! - Current-price signal classification
//! - Day-by-day DCA simulation with take-profit sell-all
//! - Market summary, Bitcoin ATH projection, and series fingerprints
//!
//! Everything here is synchronous and side-effect free; orchestration lives in
//! `dcalab-runner`.

pub mod data;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod fit;
pub mod forecast;
pub mod market;
pub mod signal;
pub mod zones;

pub use engine::{simulate, SimulationConfig, SimulationError, SimulationResult};
pub use fit::{fit, FitError, FitResult, FitVariant};
pub use signal::{classify, ClassifyError, Signal, SignalKind};
pub use zones::{detect_buy_signals, detect_sell_signals};
