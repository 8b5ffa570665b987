//! Contract Lifecycle Manager
//!
//! Validates and persists new contracts, and applies buyer-guarded
//! `accept` / `reject` transitions to stored ones.
//!
//! Every call is a single read-modify-write against the [`StateStore`];
//! the manager keeps no state of its own between calls. All checks run
//! before the write, so a failed call never leaves a partial record.

use salecontract_ids::{ContractId, PartyId};
use std::fmt;
use tracing::{debug, dispatcher, info, info_span, warn, Dispatch};

use crate::contract::{ContractStatus, SaleContract};
use crate::error::{ContractError, Result};
use crate::store::StateStore;

/// Operations reachable through [`ContractManager::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Accept,
    Reject,
}

/// Operation name lookup table.
const ACTIONS: [(&str, Action); 2] = [("accept", Action::Accept), ("reject", Action::Reject)];

impl Action {
    /// Resolve an operation name. Names are matched exactly.
    pub fn lookup(name: &str) -> Option<Self> {
        ACTIONS
            .iter()
            .find(|(action_name, _)| *action_name == name)
            .map(|(_, action)| *action)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }

    /// Status the contract ends up in.
    pub fn target(&self) -> ContractStatus {
        match self {
            Self::Accept => ContractStatus::Accepted,
            Self::Reject => ContractStatus::Rejected,
        }
    }

    /// Every known operation name, in table order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        ACTIONS.iter().map(|(name, _)| *name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Contract lifecycle manager over a key-value store.
pub struct ContractManager<S> {
    store: S,
    /// Where this manager's log events go
    dispatch: Dispatch,
}

impl<S: StateStore> ContractManager<S> {
    /// Create a manager that logs to the caller's current default subscriber.
    pub fn new(store: S) -> Self {
        let dispatch = dispatcher::get_default(|current| current.clone());
        Self::with_dispatch(store, dispatch)
    }

    /// Create a manager that logs to `dispatch`.
    pub fn with_dispatch(store: S, dispatch: Dispatch) -> Self {
        Self { store, dispatch }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a contract from a serialized payload.
    pub fn init(&self, payload: &str) -> Result<()> {
        dispatcher::with_default(&self.dispatch, || {
            let _span = info_span!("contract", op = "init").entered();
            let contract = SaleContract::from_payload(payload).map_err(|e| {
                warn!(error = %e, "Rejected contract payload");
                e
            })?;
            self.create_inner(&contract)
        })
    }

    /// Persist a new contract.
    ///
    /// Fails if the contract is invalid or a record already exists under
    /// its id; nothing is written in either case.
    pub fn create(&self, contract: &SaleContract) -> Result<()> {
        dispatcher::with_default(&self.dispatch, || {
            let _span = info_span!("contract", op = "create").entered();
            self.create_inner(contract)
        })
    }

    fn create_inner(&self, contract: &SaleContract) -> Result<()> {
        if let Err(e) = contract.validate_new() {
            warn!(contract_id = %contract.id, error = %e, "Refused to create contract");
            return Err(e);
        }

        if self.store.get_state(contract.id.as_str())?.is_some() {
            warn!(contract_id = %contract.id, "Contract already exists");
            return Err(ContractError::invalid_argument(format!(
                "contract {} already exists",
                contract.id
            )));
        }

        let record = contract.to_record()?;
        self.store.put_state(contract.id.as_str(), &record)?;

        info!(
            contract_id = %contract.id,
            buyer = %contract.buyer,
            seller = %contract.seller,
            data_hash = %contract.data_hash,
            status = %contract.status,
            "Created contract"
        );
        Ok(())
    }

    /// Dispatch a named operation with positional arguments.
    ///
    /// On success the payload is the updated serialized record.
    pub fn invoke<A: AsRef<str>>(&self, function: &str, args: &[A]) -> Result<Vec<u8>> {
        dispatcher::with_default(&self.dispatch, || {
            let _span = info_span!("contract", op = function).entered();
            let action = match Action::lookup(function) {
                Some(action) => action,
                None => {
                    warn!(function, "Unknown action");
                    return Err(ContractError::invalid_argument(format!(
                        "unknown action {:?}, must be one of: {}",
                        function,
                        Action::names().collect::<Vec<_>>().join(", ")
                    )));
                }
            };

            if args.len() != 2 {
                warn!(action = %action, got = args.len(), "Wrong number of arguments");
                return Err(ContractError::invalid_argument(format!(
                    "expected 2 arguments (contract id, actor), got {}",
                    args.len()
                )));
            }

            let contract_id = ContractId::from(args[0].as_ref());
            let actor = PartyId::from(args[1].as_ref());
            self.transition(action, &contract_id, &actor)
                .map(|(_, record)| record)
        })
    }

    /// Accept a proposed contract on behalf of `actor`.
    pub fn accept(&self, contract_id: &ContractId, actor: &PartyId) -> Result<SaleContract> {
        self.apply(Action::Accept, contract_id, actor)
    }

    /// Reject a proposed contract on behalf of `actor`.
    pub fn reject(&self, contract_id: &ContractId, actor: &PartyId) -> Result<SaleContract> {
        self.apply(Action::Reject, contract_id, actor)
    }

    /// Load the stored contract.
    pub fn query(&self, contract_id: &ContractId) -> Result<SaleContract> {
        dispatcher::with_default(&self.dispatch, || {
            let _span = info_span!("contract", op = "query").entered();
            self.load(contract_id)
        })
    }

    fn apply(
        &self,
        action: Action,
        contract_id: &ContractId,
        actor: &PartyId,
    ) -> Result<SaleContract> {
        dispatcher::with_default(&self.dispatch, || {
            let _span = info_span!("contract", op = action.name()).entered();
            self.transition(action, contract_id, actor)
                .map(|(contract, _)| contract)
        })
    }

    fn transition(
        &self,
        action: Action,
        contract_id: &ContractId,
        actor: &PartyId,
    ) -> Result<(SaleContract, Vec<u8>)> {
        let mut contract = self.load(contract_id)?;

        if let Err(e) = contract.transition(action.target(), actor) {
            warn!(
                contract_id = %contract_id,
                actor = %actor,
                action = %action,
                status = %contract.status,
                error = %e,
                "Transition refused"
            );
            return Err(e);
        }

        let record = contract.to_record()?;
        if let Err(e) = self.store.put_state(contract_id.as_str(), &record) {
            warn!(contract_id = %contract_id, error = %e, "Failed to write contract state");
            return Err(e.into());
        }

        info!(
            contract_id = %contract_id,
            actor = %actor,
            status = %contract.status,
            "Contract {}",
            contract.status.as_str().to_ascii_lowercase()
        );
        Ok((contract, record))
    }

    fn load(&self, contract_id: &ContractId) -> Result<SaleContract> {
        // No record can live under an empty id; create refuses it.
        if contract_id.is_empty() {
            return Err(ContractError::not_found("contract id is empty"));
        }

        let bytes = match self.store.get_state(contract_id.as_str()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(contract_id = %contract_id, "Contract not found");
                return Err(ContractError::not_found(format!(
                    "contract {}",
                    contract_id
                )));
            }
            Err(e) => {
                warn!(contract_id = %contract_id, error = %e, "Failed to read contract state");
                return Err(e.into());
            }
        };

        debug!(contract_id = %contract_id, bytes = bytes.len(), "Loaded contract record");
        SaleContract::from_record(&bytes).map_err(|e| {
            warn!(contract_id = %contract_id, error = %e, "Could not decode stored contract");
            e
        })
    }
}
