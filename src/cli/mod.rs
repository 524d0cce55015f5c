//! CLI definitions for stage-config
//!
//! This module defines the CLI structure using clap's derive macros and the
//! output rendering for each format.

use crate::config::{CollectOptions, Collection, merge_documents};
use crate::env::Environment;
use crate::error::Error;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the merged configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Concatenated multi-document YAML stream (default)
    #[default]
    Raw,
    /// Single deep-merged YAML document
    Yaml,
    /// Deep-merged document as pretty JSON
    Json,
}

impl OutputFormat {
    /// Render a merged stream in this format.
    pub fn render(self, stream: Vec<u8>) -> Result<Vec<u8>> {
        match self {
            OutputFormat::Raw => Ok(stream),
            OutputFormat::Yaml => {
                let merged = merge_documents(&stream)?;
                if merged.is_null() {
                    return Ok(Vec::new());
                }
                Ok(serde_yaml::to_string(&merged)?.into_bytes())
            }
            OutputFormat::Json => {
                let merged = merge_documents(&stream)?;
                let mut json = serde_json::to_vec_pretty(&merged)
                    .context("Merged config cannot be represented as JSON")?;
                json.push(b'\n');
                Ok(json)
            }
        }
    }
}

/// Collect and merge staged YAML configuration trees
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration roots; later roots override earlier ones
    #[arg(required = true, value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Active stage (overrides $STAGE)
    #[arg(short, long)]
    pub stage: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Raw)]
    pub format: OutputFormat,

    /// Print the selected files in load order instead of their content
    #[arg(long)]
    pub list: bool,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    pub log: String,
}

impl Cli {
    /// Collector options, with `--stage` taking precedence over the environment.
    pub fn collect_options(&self, env: &Environment) -> CollectOptions {
        match &self.stage {
            Some(stage) => CollectOptions::for_stage(stage.clone()),
            None => env.collect_options(),
        }
    }
}

/// Context line for a failed collection, naming the offending path when known.
pub fn failure_context(err: &Error) -> String {
    match err.path() {
        Some(path) => format!(
            "Failed to collect configuration ({} at {})",
            err.kind(),
            path.display()
        ),
        None => format!("Failed to collect configuration ({})", err.kind()),
    }
}

/// One line per selected file: path, then the stage for overrides.
pub fn format_listing(collection: &Collection) -> String {
    let mut out = String::new();
    for file in collection.files() {
        out.push_str(&file.path.display().to_string());
        if let Some(stage) = &file.stage {
            out.push_str(&format!("\t[{}]", stage));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["stage-config", "conf"]).unwrap();
        assert_eq!(cli.roots, vec![PathBuf::from("conf")]);
        assert_eq!(cli.format, OutputFormat::Raw);
        assert_eq!(cli.log, "2");
        assert!(cli.stage.is_none());
        assert!(!cli.list);
    }

    #[test]
    fn test_roots_required() {
        assert!(Cli::try_parse_from(["stage-config"]).is_err());
    }

    #[test]
    fn test_parse_multiple_roots_and_format() {
        let cli =
            Cli::try_parse_from(["stage-config", "-f", "json", "--stage", "test", "a", "b"])
                .unwrap();
        assert_eq!(cli.roots, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.stage.as_deref(), Some("test"));
    }

    #[test]
    fn test_cli_stage_overrides_environment() {
        let env = Environment::from_values("prod", "");

        let cli = Cli::try_parse_from(["stage-config", "--stage", "test", "conf"]).unwrap();
        assert_eq!(cli.collect_options(&env).stage(), Some("test"));

        let cli = Cli::try_parse_from(["stage-config", "conf"]).unwrap();
        assert_eq!(cli.collect_options(&env).stage(), Some("prod"));
    }

    #[test]
    fn test_render_yaml_merges_documents() {
        let stream = b"log:\n  level: warn\n  format: json\n---\nlog:\n  level: debug\n".to_vec();
        let rendered = OutputFormat::Yaml.render(stream).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_slice(&rendered).unwrap();
        assert_eq!(value["log"]["level"].as_str(), Some("debug"));
        assert_eq!(value["log"]["format"].as_str(), Some("json"));
    }

    #[test]
    fn test_render_json() {
        let rendered = OutputFormat::Json.render(b"port: \"8080\"\n".to_vec()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&rendered).unwrap();
        assert_eq!(value, serde_json::json!({"port": "8080"}));
    }

    #[test]
    fn test_render_raw_is_identity() {
        let stream = b"a: 1\n---\nb: 2\n".to_vec();
        assert_eq!(OutputFormat::Raw.render(stream.clone()).unwrap(), stream);
    }

    #[test]
    fn test_failure_context_names_path() {
        let err = Error::NotFound {
            path: PathBuf::from("/etc/app"),
        };
        assert_eq!(
            failure_context(&err),
            "Failed to collect configuration (not found at /etc/app)"
        );

        let err = crate::config::merge_documents(b"a: [unclosed\n").unwrap_err();
        assert_eq!(
            failure_context(&err),
            "Failed to collect configuration (decode error)"
        );
    }

    #[test]
    fn test_render_yaml_empty_stream() {
        assert!(OutputFormat::Yaml.render(Vec::new()).unwrap().is_empty());
    }
}
