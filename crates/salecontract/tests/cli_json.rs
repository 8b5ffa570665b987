use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn salecontract_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_salecontract"))
}

fn run_cli(home: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(salecontract_bin());
    cmd.args(args)
        .env("SALECONTRACT_HOME", home)
        .env_remove("SALECONTRACT_STORE_DIR")
        .env("RUST_LOG", "error");
    cmd.output().expect("failed to execute salecontract CLI")
}

fn parse_json<T: DeserializeOwned>(output: &Output, args: &[&str]) -> T {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "failed to deserialize JSON output of {}: {}\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            err,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

fn run_cli_json<T: DeserializeOwned>(home: &Path, args: &[&str]) -> T {
    let output = run_cli(home, args);
    assert!(
        output.status.success(),
        "command failed: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    parse_json(&output, args)
}

fn run_cli_json_error(home: &Path, args: &[&str]) -> ResponseOutput {
    let output = run_cli(home, args);
    assert!(
        !output.status.success(),
        "command unexpectedly succeeded: {}\nstdout:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout)
    );
    parse_json(&output, args)
}

#[derive(Debug, Deserialize)]
struct ResponseOutput {
    status: u16,
    #[serde(default)]
    message: String,
    kind: Option<String>,
    payload: Option<ContractOutput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractOutput {
    id: String,
    buyer: String,
    seller: String,
    data_hash: String,
    status: String,
}

const SALE_001: &str = r#"{"id":"SALE-001","buyer":"Acheteur","seller":"Vendeur","dataHash":"Hash","buyerSignature":"sgn1","sellerSignature":"sgn2","status":"Proposed"}"#;

#[test]
fn test_init_accept_show_json() {
    let home = TempDir::new().unwrap();

    let created: ResponseOutput = run_cli_json(home.path(), &["init", SALE_001, "--json"]);
    assert_eq!(created.status, 200);
    assert!(created.payload.is_none());

    let accepted: ResponseOutput =
        run_cli_json(home.path(), &["accept", "SALE-001", "Acheteur", "--json"]);
    let contract = accepted.payload.expect("accept returns the record");
    assert_eq!(contract.status, "Accepted");
    assert_eq!(contract.buyer, "Acheteur");

    let shown: ResponseOutput = run_cli_json(home.path(), &["show", "SALE-001", "--json"]);
    let contract = shown.payload.expect("show returns the record");
    assert_eq!(contract.id, "SALE-001");
    assert_eq!(contract.seller, "Vendeur");
    assert_eq!(contract.data_hash, "Hash");
    assert_eq!(contract.status, "Accepted");

    assert!(home.path().join("state").is_dir());
    let log_files: Vec<String> = std::fs::read_dir(home.path().join("logs"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        log_files.iter().any(|name| name.starts_with("salecontract.") && name.ends_with(".log")),
        "{log_files:?}"
    );
}

#[test]
fn test_unauthorized_accept_json() {
    let home = TempDir::new().unwrap();
    let sale_004 = SALE_001.replace("SALE-001", "SALE-004");
    run_cli_json::<ResponseOutput>(home.path(), &["init", &sale_004, "--json"]);

    let refused = run_cli_json_error(
        home.path(),
        &["invoke", "accept", "SALE-004", "Vendeur", "--json"],
    );
    assert_eq!(refused.status, 500);
    assert_eq!(refused.kind.as_deref(), Some("unauthorized"));
    assert!(refused.message.contains("only the buyer"));

    let shown: ResponseOutput = run_cli_json(home.path(), &["show", "SALE-004", "--json"]);
    assert_eq!(shown.payload.unwrap().status, "Proposed");
}

#[test]
fn test_unknown_action_and_missing_contract_json() {
    let home = TempDir::new().unwrap();

    let unknown = run_cli_json_error(
        home.path(),
        &["invoke", "delete", "SALE-001", "Acheteur", "--json"],
    );
    assert_eq!(unknown.kind.as_deref(), Some("invalid_argument"));

    let missing = run_cli_json_error(home.path(), &["show", "SALE-404", "--json"]);
    assert_eq!(missing.kind.as_deref(), Some("not_found"));
}

#[test]
fn test_init_from_file_with_store_dir_override() {
    let home = TempDir::new().unwrap();
    let payload_path = home.path().join("sale.json");
    std::fs::write(&payload_path, SALE_001).unwrap();
    let store_dir = home.path().join("ledger");
    let payload_arg = format!("@{}", payload_path.display());
    let store_arg = store_dir.display().to_string();

    run_cli_json::<ResponseOutput>(
        home.path(),
        &["init", &payload_arg, "--store-dir", &store_arg, "--json"],
    );

    assert!(store_dir.is_dir());
    assert_eq!(std::fs::read_dir(&store_dir).unwrap().count(), 1);
    assert!(!home.path().join("state").exists());
}
