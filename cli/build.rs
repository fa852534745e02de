//! Build script: embeds the dotter version string at compile time.

use std::process::Command;

fn main() {
    // Prefer DOTTER_VERSION if set (release builds), otherwise git describe.
    if let Ok(version) = std::env::var("DOTTER_VERSION") {
        println!("cargo:rustc-env=DOTTER_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=DOTTER_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-env-changed=DOTTER_VERSION");
}
