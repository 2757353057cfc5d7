use anyhow::Result;
use layout_dom::{LOADED_ATTR, REGION_ATTR};
use layout_privacy::{MASK_ATTR, UNMASK_ATTR};

use super::context::CliContext;

pub async fn cmd_info(ctx: &CliContext) -> Result<()> {
    let layout = &ctx.config().layout;

    println!("PageMirror System Information");
    println!("=============================");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Build Date: {}", env!("BUILD_DATE"));
    println!("Git Commit: {} ({})", env!("GIT_HASH"), env!("GIT_BRANCH"));
    println!();

    println!("Configuration:");
    if ctx.from_file() {
        println!("- File: {}", ctx.config_path().display());
    } else {
        println!("- File: (defaults)");
    }
    println!(
        "- Content mode: {}",
        if layout.content { "mask sensitive" } else { "mask all" }
    );
    println!(
        "- Change tracking: {}",
        if layout.low_fidelity() { "disabled (lean + lite)" } else { "enabled" }
    );
    println!("- Masked tags: {}", layout.masking.mask_tags.join(", "));
    println!("- Excluded field tokens: {}", layout.masking.mask_exclude.join(", "));
    println!("- Unmasked input types: {}", layout.masking.mask_disable.join(", "));
    println!("- Sensitive class tokens: {}", layout.masking.mask_text.join(", "));
    println!(
        "- Selector rules: {} mask, {} unmask, {} checksum, {} region",
        layout.mask.len(),
        layout.unmask.len(),
        layout.checksum.len(),
        layout.regions.len()
    );
    println!("- Selector hash length: {}", layout.hash_length);
    println!();

    println!("Markup attributes: {MASK_ATTR}, {UNMASK_ATTR}, {REGION_ATTR}, {LOADED_ATTR}");

    Ok(())
}
