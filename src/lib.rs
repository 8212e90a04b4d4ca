pub mod config;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod models;
pub mod notify;
pub mod okx;
pub mod risk;
pub mod strategy;
pub mod trade_log;
pub mod venue;
pub mod worker;

pub use models::*;
