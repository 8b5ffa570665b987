//! Sale Contract - Core Library
//!
//! A sale contract between a buyer and a seller moves from `Proposed` to
//! `Accepted` or `Rejected`, and only the buyer may move it. Records live
//! in an external key-value store reached through [`StateStore`].

pub mod config;
pub mod contract;
pub mod error;
pub mod manager;
pub mod response;
pub mod store;

pub use config::{Config, StoreBackend};
pub use contract::{ContractStatus, SaleContract};
pub use error::{ContractError, ErrorKind, Result};
pub use manager::{Action, ContractManager};
pub use response::Response;
pub use salecontract_ids::{ContractId, PartyId};
pub use store::{FileStore, MemoryStore, StateStore, StoreError};
