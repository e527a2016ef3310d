use std::env;
use std::process::Command;

fn main() {
    // Release builds (or BUILD_VERSION_WITH_HASH) embed the short git hash.
    let profile = env::var("PROFILE").unwrap_or_default();
    let force_hash = env::var("BUILD_VERSION_WITH_HASH").is_ok();
    let package_version = env::var("CARGO_PKG_VERSION").unwrap_or_default();

    let version_string = if profile == "release" || force_hash {
        match git_short_hash() {
            Some(hash) => format!("{} ({})", package_version, hash),
            None => package_version,
        }
    } else {
        format!("{} (dev)", package_version)
    };

    println!("cargo:rustc-env=CFNCTL_BUILD_VERSION={}", version_string);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/packed-refs");
    println!("cargo:rerun-if-changed=Cargo.toml");
}

fn git_short_hash() -> Option<String> {
    let output = match Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        Ok(output) => output,
        Err(_) => {
            println!("cargo:warning=Failed to execute git; version will not carry a hash");
            return None;
        }
    };

    if !output.status.success() {
        println!(
            "cargo:warning=Failed to get git hash: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!hash.is_empty()).then_some(hash)
}
