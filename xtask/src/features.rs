use std::process::Command;

use anyhow::{Context, Result};

/// `flowlab-common` tiers; every combination downstream crates rely on must
/// build on its own.
const FEATURE_COMBINATIONS: &[&[&str]] = &[
    &[], // default
    &["foundation"],
    &["crypto"],
    &["observability"],
    &["test-utils"],
    &["foundation", "crypto"],
    &["crypto", "observability"],
    &["foundation", "crypto", "observability", "test-utils"],
];

const PACKAGE: &str = "flowlab-common";

/// Check that all required feature combinations compile successfully.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} {PACKAGE} feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, features) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let label = if features.is_empty() { "default" } else { joined.as_str() };

        println!(
            "\n[{}/{}] cargo check -p {PACKAGE} ({label})",
            index + 1,
            FEATURE_COMBINATIONS.len()
        );

        let mut command = Command::new("cargo");
        command.args(["check", "-p", PACKAGE, "--no-default-features"]);
        if !features.is_empty() {
            command.args(["--features", joined.as_str()]);
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run cargo check for '{label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{label}' failed to compile");
        }

        println!("✅ Features '{label}' compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
