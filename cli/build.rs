// Build script: embeds git commit, branch and build time for `--version`.
// Source tarballs without .git can supply them through
// STREAMSQL_GIT_COMMIT / STREAMSQL_GIT_BRANCH.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn resolve(env_key: &str, git_args: &[&str]) -> String {
    std::env::var(env_key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| git(git_args))
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let commit_hash = resolve("STREAMSQL_GIT_COMMIT", &["rev-parse", "--short", "HEAD"]);
    let branch = resolve("STREAMSQL_GIT_BRANCH", &["rev-parse", "--abbrev-ref", "HEAD"]);
    let build_date = chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string();

    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", commit_hash);
    println!("cargo:rustc-env=GIT_BRANCH={}", branch);
    println!("cargo:rustc-env=BUILD_DATE={}", build_date);

    println!("cargo:rerun-if-env-changed=STREAMSQL_GIT_COMMIT");
    println!("cargo:rerun-if-env-changed=STREAMSQL_GIT_BRANCH");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs/heads/");
}
