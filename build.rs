//! Build script for platform-health
//!
//! Exposes build metadata to `GET /version` and `healthctl --version`.

use std::process::Command;

fn main() {
    let build_time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    let git_hash = command_output("git", &["rev-parse", "--short", "HEAD"], "docs-rs-build");
    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    let rust_version = command_output("rustc", &["--version"], "stable");
    println!("cargo:rustc-env=RUST_VERSION={}", rust_version);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}

/// Trimmed stdout of `program`, `docs_rs` on docs.rs, or "unknown"
fn command_output(program: &str, args: &[&str], docs_rs: &str) -> String {
    // docs.rs builds run without git or a usable rustc
    if std::env::var("DOCS_RS").is_ok() {
        return docs_rs.to_string();
    }

    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
