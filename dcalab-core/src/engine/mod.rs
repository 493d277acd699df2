//! DCA simulation engine: configuration, ledger state, and the daily replay loop.

pub mod simulator;
pub mod state;

pub use simulator::{next_take_profit, simulate, SimulationError};
pub use state::{
    DcaStrategy, DividendPolicy, NextTarget, SimulationConfig, SimulationResult,
    DIVIDEND_INTERVAL_DAYS, ZONE_BUY_MULTIPLIER,
};
