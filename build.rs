//! Captures build provenance for the `/version` diagnostics endpoint.
//!
//! Writes `build_info.json` into `OUT_DIR`. The dependency list comes from
//! `Cargo.lock`; settings come from the environment cargo gives build scripts.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{json, Value};

fn main() {
    println!("cargo:rerun-if-changed=Cargo.lock");
    println!("cargo:rerun-if-env-changed=CHAT_SERVICE_VERSION");

    let package = env::var("CARGO_PKG_NAME").unwrap_or_default();
    let version = env::var("CHAT_SERVICE_VERSION")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap_or_default());

    println!("cargo:rustc-env=CHAT_SERVICE_BUILD_VERSION={version}");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let dependencies = read_lockfile(&manifest_dir.join("Cargo.lock"), &package);

    let mut settings = Vec::new();
    for (key, var) in [
        ("profile", "PROFILE"),
        ("target", "TARGET"),
        ("host", "HOST"),
        ("opt-level", "OPT_LEVEL"),
        ("debug", "DEBUG"),
    ] {
        if let Ok(value) = env::var(var) {
            settings.push(json!({ "key": key, "value": value }));
        }
    }
    if let Some(rustc) = rustc_version() {
        settings.push(json!({ "key": "rustc", "value": rustc }));
    }

    let info = json!({
        "module_path": package,
        "main": { "path": package, "version": version, "sum": "" },
        "dependencies": dependencies,
        "settings": settings,
    });

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out.join("build_info.json"), info.to_string()).expect("write build_info.json");
}

fn read_lockfile(path: &Path, package: &str) -> Vec<Value> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    let Ok(lock) = content.parse::<toml::Table>() else {
        return Vec::new();
    };
    let Some(packages) = lock.get("package").and_then(|p| p.as_array()) else {
        return Vec::new();
    };

    packages
        .iter()
        .filter_map(|p| p.as_table())
        .filter(|p| p.get("name").and_then(|n| n.as_str()) != Some(package))
        .map(|p| {
            let mut dep = json!({
                "path": field(p, "name"),
                "version": field(p, "version"),
                "sum": field(p, "checksum"),
            });
            if let Some(replace) = p.get("replace").and_then(|v| v.as_str()) {
                dep["replace"] = Value::String(replace.to_string());
            }
            dep
        })
        .collect()
}

fn field<'a>(table: &'a toml::Table, key: &str) -> &'a str {
    table.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}

fn rustc_version() -> Option<String> {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let output = Command::new(rustc).arg("--version").output().ok()?;
    let version = String::from_utf8(output.stdout).ok()?;
    Some(version.trim().to_string())
}
