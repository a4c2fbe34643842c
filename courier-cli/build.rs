// Build script: expose COURIER_VERSION to the binary.
//
// Uses the crate version, suffixed with the short commit hash when the
// checkout is not exactly on a release tag. Builds outside a git checkout
// get the plain crate version.

use std::process::Command;

fn main() {
    let base = env!("CARGO_PKG_VERSION");
    let version = match git(&["describe", "--tags", "--exact-match"]) {
        Some(tag) => tag.trim_start_matches('v').to_string(),
        None => match git(&["rev-parse", "--short", "HEAD"]) {
            Some(sha) => format!("{}+{}", base, sha),
            None => base.to_string(),
        },
    };

    println!("cargo:rustc-env=COURIER_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

/// Run a git command and return its trimmed stdout on success
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
