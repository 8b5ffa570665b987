//! CLI module for the sale contract binary

pub mod context;
pub mod contract;
pub mod output;
