//! Sale contract record and its status state machine.
//!
//! ```text
//!              accept (buyer)
//!   Proposed ─────────────────▶ Accepted
//!      │
//!      └──────────────────────▶ Rejected
//!              reject (buyer)
//! ```
//!
//! Accepted and Rejected are terminal.

use salecontract_ids::{ContractId, PartyId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ContractError, Result};

/// A sale agreement between a buyer and a seller.
///
/// Missing string fields deserialize as empty strings, so absence and `""`
/// are indistinguishable to validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleContract {
    /// Storage key
    #[serde(default, alias = "Contract")]
    pub id: ContractId,

    #[serde(default, alias = "Buyer")]
    pub buyer: PartyId,

    #[serde(default, alias = "Seller")]
    pub seller: PartyId,

    /// Opaque reference to the contract content
    #[serde(default, alias = "DataHash")]
    pub data_hash: String,

    /// Not verified
    #[serde(default, alias = "SignatureBuyer")]
    pub buyer_signature: String,

    /// Not verified
    #[serde(default, alias = "SignatureSeller")]
    pub seller_signature: String,

    #[serde(default, alias = "Status")]
    pub status: ContractStatus,
}

impl SaleContract {
    /// Create a new proposed contract
    pub fn propose(
        id: impl Into<ContractId>,
        buyer: impl Into<PartyId>,
        seller: impl Into<PartyId>,
    ) -> Self {
        Self {
            id: id.into(),
            buyer: buyer.into(),
            seller: seller.into(),
            data_hash: String::new(),
            buyer_signature: String::new(),
            seller_signature: String::new(),
            status: ContractStatus::Proposed,
        }
    }

    pub fn with_data_hash(mut self, data_hash: impl Into<String>) -> Self {
        self.data_hash = data_hash.into();
        self
    }

    pub fn with_signatures(
        mut self,
        buyer_signature: impl Into<String>,
        seller_signature: impl Into<String>,
    ) -> Self {
        self.buyer_signature = buyer_signature.into();
        self.seller_signature = seller_signature.into();
        self
    }

    /// Decode a creation payload.
    pub fn from_payload(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|e| ContractError::invalid_argument(format!("cannot decode contract: {}", e)))
    }

    /// Decode a stored record.
    ///
    /// A stored contract always went through create, so a record without an
    /// id or either party is corrupt even when it parses.
    pub fn from_record(bytes: &[u8]) -> Result<Self> {
        let contract: Self = serde_json::from_slice(bytes)
            .map_err(|e| ContractError::invalid_state(format!("corrupt record: {}", e)))?;
        let missing = [
            ("contract id", contract.id.is_empty()),
            ("buyer", contract.buyer.is_empty()),
            ("seller", contract.seller.is_empty()),
        ]
        .into_iter()
        .find_map(|(field, empty)| empty.then_some(field));
        if let Some(field) = missing {
            return Err(ContractError::invalid_state(format!(
                "corrupt record: missing {}",
                field
            )));
        }
        Ok(contract)
    }

    /// Encode for storage.
    pub fn to_record(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| ContractError::invalid_state(format!("cannot encode contract: {}", e)))
    }

    /// Check that this record may be created.
    ///
    /// Order matters: callers see the first failing rule.
    pub fn validate_new(&self) -> Result<()> {
        if self.buyer.is_empty() {
            return Err(ContractError::invalid_argument("missing buyer"));
        }
        if self.seller.is_empty() {
            return Err(ContractError::invalid_argument("missing seller"));
        }
        if self.status != ContractStatus::Proposed {
            return Err(ContractError::invalid_argument(format!(
                "only Proposed allowed on create, got {}",
                self.status
            )));
        }
        if self.id.is_empty() {
            return Err(ContractError::invalid_argument("missing contract id"));
        }
        Ok(())
    }

    /// Move to `target` on behalf of `actor`.
    ///
    /// The record is left untouched when the transition is refused.
    pub fn transition(&mut self, target: ContractStatus, actor: &PartyId) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(ContractError::invalid_transition(format!(
                "contract {} is {}, only Proposed contracts can become {}",
                self.id, self.status, target
            )));
        }
        if actor.is_empty() {
            return Err(ContractError::unauthorized(format!(
                "no actor given for contract {}",
                self.id
            )));
        }
        if *actor != self.buyer {
            return Err(ContractError::unauthorized(format!(
                "only the buyer can move contract {} to {}",
                self.id, target
            )));
        }
        self.status = target;
        Ok(())
    }
}

/// Contract status.
///
/// Serialized by name. Decoding also accepts the integer codes
/// (0 = Proposed, 1 = Accepted, 2 = Rejected) found in older records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "StatusRepr")]
pub enum ContractStatus {
    #[default]
    Proposed,
    Accepted,
    Rejected,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposed => "Proposed",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Proposed => 0,
            Self::Accepted => 1,
            Self::Rejected => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Proposed),
            1 => Some(Self::Accepted),
            2 => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Proposed)
    }

    pub fn can_transition_to(&self, target: ContractStatus) -> bool {
        matches!(
            (self, target),
            (Self::Proposed, Self::Accepted) | (Self::Proposed, Self::Rejected)
        )
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Proposed" => Ok(Self::Proposed),
            "Accepted" => Ok(Self::Accepted),
            "Rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<StatusRepr> for ContractStatus {
    type Error = String;

    fn try_from(repr: StatusRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            StatusRepr::Code(code) => {
                Self::from_code(code).ok_or_else(|| format!("unknown status code: {}", code))
            }
            StatusRepr::Name(name) => name.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sale() -> SaleContract {
        SaleContract::propose("SALE-001", "Acheteur", "Vendeur")
            .with_data_hash("Hash")
            .with_signatures("sgn1", "sgn2")
    }

    #[test]
    fn test_status_accepts_names_and_codes() {
        let by_name: ContractStatus = serde_json::from_str("\"Accepted\"").unwrap();
        let by_code: ContractStatus = serde_json::from_str("2").unwrap();
        assert_eq!(by_name, ContractStatus::Accepted);
        assert_eq!(by_code, ContractStatus::Rejected);
        assert!(serde_json::from_str::<ContractStatus>("7").is_err());
        assert!(serde_json::from_str::<ContractStatus>("\"Signed\"").is_err());
    }

    #[test]
    fn test_record_uses_camel_case_fields() {
        let json: serde_json::Value = serde_json::from_slice(&sale().to_record().unwrap()).unwrap();
        assert_eq!(json["id"], "SALE-001");
        assert_eq!(json["dataHash"], "Hash");
        assert_eq!(json["buyerSignature"], "sgn1");
        assert_eq!(json["status"], "Proposed");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let contract = SaleContract::from_payload(r#"{"id":"SALE-009","seller":"Vendeur"}"#).unwrap();
        assert!(contract.buyer.is_empty());
        assert_eq!(contract.status, ContractStatus::Proposed);
        let err = contract.validate_new().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("missing buyer"));
    }

    #[test]
    fn test_validate_new_order() {
        let mut contract = sale();
        contract.seller = PartyId::default();
        contract.status = ContractStatus::Accepted;
        let err = contract.validate_new().unwrap_err();
        assert!(err.to_string().contains("missing seller"));

        let mut contract = sale();
        contract.status = ContractStatus::Rejected;
        let err = contract.validate_new().unwrap_err();
        assert!(err.to_string().contains("only Proposed allowed on create"));

        let mut contract = sale();
        contract.id = ContractId::default();
        let err = contract.validate_new().unwrap_err();
        assert!(err.to_string().contains("missing contract id"));
    }

    #[test]
    fn test_transition_by_buyer() {
        let mut contract = sale();
        contract
            .transition(ContractStatus::Accepted, &PartyId::from("Acheteur"))
            .unwrap();
        assert_eq!(contract.status, ContractStatus::Accepted);
    }

    #[test]
    fn test_transition_refused_leaves_record() {
        let mut contract = sale();
        let err = contract
            .transition(ContractStatus::Rejected, &PartyId::from("Vendeur"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(contract, sale());
    }

    #[test]
    fn test_terminal_status_checked_before_actor() {
        let mut contract = sale();
        contract.status = ContractStatus::Accepted;
        let err = contract
            .transition(ContractStatus::Rejected, &PartyId::from("Vendeur"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert!(contract.status.is_terminal());
    }

    #[test]
    fn test_corrupt_record() {
        let err = SaleContract::from_record(b"{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_status_names_are_exact() {
        assert_eq!("Rejected".parse::<ContractStatus>(), Ok(ContractStatus::Rejected));
        for name in ["ACCEPTED", "proposed", "rejected", " Accepted"] {
            assert!(name.parse::<ContractStatus>().is_err(), "{name}");
            let json = format!("\"{}\"", name);
            assert!(serde_json::from_str::<ContractStatus>(&json).is_err(), "{name}");
        }
    }

    #[test]
    fn test_record_without_parties_is_corrupt() {
        for record in [
            r#"{}"#,
            r#"{"id":"SALE-001","seller":"Vendeur","status":"Proposed"}"#,
            r#"{"id":"SALE-001","buyer":"Acheteur","seller":""}"#,
            r#"{"buyer":"Acheteur","seller":"Vendeur"}"#,
        ] {
            let err = SaleContract::from_record(record.as_bytes()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidState, "{record}");
            assert!(err.to_string().contains("corrupt record: missing"), "{record}");
        }
    }

    #[test]
    fn test_reads_pascal_case_ledger_record() {
        let record = br#"{"Contract":"SALE-003","Buyer":"Acheteur","Seller":"Vendeur","DataHash":"Hash","SignatureBuyer":"sgn1","SignatureSeller":"sgn2","Status":0}"#;
        let contract = SaleContract::from_record(record).unwrap();

        let mut expected = sale();
        expected.id = ContractId::from("SALE-003");
        assert_eq!(contract, expected);

        let json: serde_json::Value =
            serde_json::from_slice(&contract.to_record().unwrap()).unwrap();
        assert_eq!(json["id"], "SALE-003");
        assert_eq!(json["status"], "Proposed");
    }

    #[test]
    fn test_empty_actor_is_unauthorized() {
        let mut contract = sale();
        contract.buyer = PartyId::default();
        let err = contract
            .transition(ContractStatus::Accepted, &PartyId::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(err.to_string().contains("no actor given"));
        assert_eq!(contract.status, ContractStatus::Proposed);
    }
}
