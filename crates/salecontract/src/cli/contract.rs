//! Contract commands: init, invoke (accept/reject), show

use anyhow::{Context, Result};
use salecontract::{ContractId, Response};
use std::fs;

use super::context::CliContext;

/// Create a contract. A payload starting with `@` names a file to read.
pub fn init(ctx: &CliContext, payload: &str) -> Result<Response> {
    let payload = match payload.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file: {}", path))?,
        None => payload.to_string(),
    };
    Ok(Response::from(ctx.manager.init(&payload)))
}

pub fn invoke(ctx: &CliContext, function: &str, args: &[String]) -> Response {
    Response::from(ctx.manager.invoke(function, args))
}

pub fn show(ctx: &CliContext, id: &str) -> Response {
    let result = ctx
        .manager
        .query(&ContractId::from(id))
        .and_then(|contract| contract.to_record());
    Response::from(result)
}
