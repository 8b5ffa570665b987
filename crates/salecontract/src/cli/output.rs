//! Output formatting for CLI commands

use anyhow::Result;
use salecontract::Response;

/// Print a response: the JSON envelope to stdout, or a human summary
/// (payload to stdout, failures to stderr).
pub fn print_response(response: &Response, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    if !response.is_ok() {
        eprintln!("Error: {}", response.message);
        if let Some(kind) = response.kind {
            eprintln!("  kind: {}", kind);
        }
        return Ok(());
    }

    match &response.payload {
        Some(payload) => println!("{}", serde_json::to_string_pretty(payload)?),
        None => println!("OK"),
    }
    Ok(())
}
