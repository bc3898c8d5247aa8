//! Build script embedding version information.

use std::process::Command;

fn main() {
    // Prefer DEVBACKUP_VERSION if set (release builds), otherwise ask git.
    if let Ok(version) = std::env::var("DEVBACKUP_VERSION") {
        println!("cargo:rustc-env=DEVBACKUP_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !version.is_empty() {
            println!("cargo:rustc-env=DEVBACKUP_VERSION={version}");
        }
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=DEVBACKUP_VERSION");
}
