//! CLI integration tests for hostevm
//!
//! Runs the built binary against the in-memory ledger and temporary corpora.

use std::fs;
use std::process::Command;

const EVM_ADDRESS: &str = "0x00000000000000000000000000000000000abde1";

/// Helper to run the CLI with arguments
fn run_hostevm(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_hostevm"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("EF_TESTS")
        .env_remove("EF_TESTS_ROOT")
        .output()
        .expect("Failed to execute command")
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

// ==================== Help & Version Tests ====================

#[test]
fn test_cli_help() {
    let output = run_hostevm(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("address"));
    assert!(stdout.contains("bootstrap"));
    assert!(stdout.contains("vectors"));
}

#[test]
fn test_cli_version() {
    let output = run_hostevm(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("hostevm"));
}

// ==================== Bootstrap Tests ====================

#[test]
fn test_bootstrap_json() {
    let output = run_hostevm(&["--json", "bootstrap"]);
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["ledger_declares"], 5);
    assert_eq!(json["dispatcher_consistent"], true);
    assert_eq!(json["owner"], format!("0x{:0>64}", "1"));
    assert_ne!(json["dispatcher"], json["native_asset"]);
    assert_eq!(
        json["classes"]["dispatcher"]["source"],
        "src/kakarot/kakarot.cairo"
    );
}

#[test]
fn test_bootstrap_text_report() {
    let output = run_hostevm(&["bootstrap"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("Session ready"));
    assert!(stdout.contains("  classes:\n    native_asset:\n      class_hash:"));
    assert!(stdout.contains("dispatcher_consistent:  yes"));
    assert!(stdout.contains("        - get_account_proxy_class_hash"));
}

#[test]
fn test_bootstrap_is_reproducible() {
    let first = json_stdout(&run_hostevm(&["--json", "bootstrap"]));
    let second = json_stdout(&run_hostevm(&["--json", "bootstrap"]));
    assert_eq!(first["dispatcher"], second["dispatcher"]);
    assert_eq!(first["classes"], second["classes"]);
}

#[test]
fn test_bootstrap_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let sources = [
        "tests/fixtures/ERC20.cairo",
        "src/kakarot/accounts/contract/contract_account.cairo",
        "src/kakarot/accounts/eoa/externally_owned_account.cairo",
        "src/kakarot/accounts/proxy/proxy.cairo",
        "src/kakarot/kakarot.cairo",
    ];
    for source in sources {
        let path = dir.path().join(source);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("// {}", source)).unwrap();
    }
    let config = dir.path().join("harness.toml");
    fs::write(
        &config,
        format!("contracts_root = {:?}\n", dir.path().to_string_lossy()),
    )
    .unwrap();

    let output = run_hostevm(&[
        "--json",
        "--config",
        config.to_str().unwrap(),
        "bootstrap",
        "--from-disk",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(json_stdout(&output)["ledger_declares"], 5);
}

#[test]
fn test_bootstrap_from_disk_missing_sources() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("harness.toml");
    fs::write(
        &config,
        format!("contracts_root = {:?}\n", dir.path().to_string_lossy()),
    )
    .unwrap();

    let output = run_hostevm(&[
        "--json",
        "--config",
        config.to_str().unwrap(),
        "bootstrap",
        "--from-disk",
    ]);
    assert!(!output.status.success());
    let json = json_stdout(&output);
    assert_eq!(json["success"], false);
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("setup failed while loading tests/fixtures/ERC20.cairo"), "{}", error);
}

// ==================== Address Tests ====================

#[test]
fn test_address_matches_bootstrap_wiring() {
    let session = json_stdout(&run_hostevm(&["--json", "bootstrap"]));
    let dispatcher = session["dispatcher"].as_str().unwrap().to_string();
    let proxy = session["classes"]["account_proxy"]["class_hash"]
        .as_str()
        .unwrap()
        .to_string();

    let via_session = json_stdout(&run_hostevm(&["--json", "address", EVM_ADDRESS]));
    let explicit = json_stdout(&run_hostevm(&[
        "--json",
        "address",
        EVM_ADDRESS,
        "--deployer",
        &dispatcher,
        "--class-hash",
        &proxy,
    ]));

    assert_eq!(via_session["starknet_address"], explicit["starknet_address"]);
    assert_eq!(via_session["deployer"], dispatcher.as_str());
}

#[test]
fn test_address_distinct_accounts() {
    let a = json_stdout(&run_hostevm(&["--json", "address", EVM_ADDRESS]));
    let b = json_stdout(&run_hostevm(&[
        "--json",
        "address",
        "0x00000000000000000000000000000000000abde2",
    ]));
    assert_ne!(a["starknet_address"], b["starknet_address"]);
}

#[test]
fn test_address_invalid() {
    let output = run_hostevm(&["--json", "address", "0x1234"]);
    assert!(!output.status.success());
    let json = json_stdout(&output);
    assert!(json["error"].as_str().unwrap().contains("Invalid address"));
}

// ==================== Vector Tests ====================

#[test]
fn test_vectors_filters_network() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("st.json"),
        r#"{
            "a_Shanghai": {"network": "Shanghai"},
            "b_Shanghai": {"network": "Shanghai"},
            "c_Shanghai": {"network": "Shanghai"},
            "a_Merge": {"network": "Merge"},
            "b_Merge": {"network": "Merge"}
        }"#,
    )
    .unwrap();

    let output = run_hostevm(&["--json", "vectors", "--root", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    let json = json_stdout(&output);
    assert_eq!(json["count"], 3);
    assert_eq!(json["network"], "Shanghai");
    assert_eq!(json["ids"][0], "a_Shanghai");
}

#[test]
fn test_vectors_missing_root_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");
    let output = run_hostevm(&["--json", "vectors", "--root", missing.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["count"], 0);
}

#[test]
fn test_vectors_text_lists_ids() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("one.json"),
        r#"{"one_Shanghai": {"network": "Shanghai"}}"#,
    )
    .unwrap();
    let output = run_hostevm(&["vectors", "--root", dir.path().to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("1 vectors for Shanghai under "));
    assert!(stdout.contains("  ids: (1)\n    - one_Shanghai\n"));
}

#[test]
fn test_vectors_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.json"), "{").unwrap();
    let output = run_hostevm(&["--json", "vectors", "--root", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
}
