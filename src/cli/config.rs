use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde_json::Value as JsonValue;

use super::context::CliContext;
use super::output::{emit, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Get a configuration value by dotted key (e.g. `layout.masking.mask_tags`)
    Get {
        /// Configuration key
        key: String,
    },

    /// Validate the configuration file
    Validate,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    let path = ctx.config_path();
    match args.action {
        ConfigAction::Show => {
            if ctx.output() == OutputFormat::Human {
                let source = if ctx.from_file() {
                    path.display().to_string()
                } else {
                    "defaults".to_string()
                };
                println!("Current configuration ({source}):");
            }
            emit(ctx.output(), ctx.config(), || {
                serde_yaml::to_string(ctx.config()).unwrap_or_default()
            })?;
        }
        ConfigAction::Get { key } => {
            let json = serde_json::to_value(ctx.config())?;
            let segments = split_key(&key)?;
            match get_json_value(&json, &segments) {
                Some(value) => emit(ctx.output(), value, || {
                    serde_yaml::to_string(value).unwrap_or_default()
                })?,
                None => bail!("{} not found in configuration", key),
            }
        }
        ConfigAction::Validate => {
            // Loading already parsed and validated the file.
            if ctx.from_file() {
                println!("Configuration file {} is valid", path.display());
            } else {
                println!(
                    "No configuration file at {}; defaults are valid",
                    path.display()
                );
            }
        }
    }

    Ok(())
}

fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        bail!("configuration key cannot be empty");
    }
    Ok(segments)
}

fn get_json_value<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let mut current = value;
    for segment in path {
        match current {
            JsonValue::Object(map) => {
                current = map.get(*segment)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dotted_keys_walk_nested_objects() {
        let doc = json!({"layout": {"masking": {"mask_tags": ["INPUT"]}, "content": true}});
        assert_eq!(
            get_json_value(&doc, &split_key("layout.content").unwrap()),
            Some(&JsonValue::Bool(true))
        );
        assert_eq!(
            get_json_value(&doc, &split_key("layout.masking.mask_tags").unwrap()),
            Some(&json!(["INPUT"]))
        );
        assert_eq!(get_json_value(&doc, &["layout", "content", "deeper"]), None);
    }

    #[test]
    fn empty_keys_are_rejected() {
        assert!(split_key("..").is_err());
    }
}
