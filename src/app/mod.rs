use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use ogcfilter::{CompiledFilter, CompilerConfig, compile};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Filter Encoding document ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Compiler configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum filter nesting depth (overrides the config file and
    /// OGCFILTER_MAX_DEPTH)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print the parsed filter tree to stderr
    #[arg(long)]
    pub tree: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum OutputFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

/// What the CLI reports for one compiled filter.
#[derive(Debug, Serialize)]
pub struct Report {
    pub expression: Option<String>,
    pub classitem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
}

impl From<&CompiledFilter> for Report {
    fn from(compiled: &CompiledFilter) -> Self {
        Self {
            expression: compiled.expression.as_ref().ok().cloned(),
            classitem: compiled.class_item.clone(),
            rejection: compiled.expression.as_ref().err().map(|r| r.to_string()),
        }
    }
}

pub fn load_config(cli: &Cli) -> Result<CompilerConfig> {
    let mut config = CompilerConfig::load(cli.config.as_deref())
        .context("Config: Failed to load compiler configuration")?;
    if let Some(max_depth) = cli.max_depth {
        config = config.with_max_depth(max_depth);
        config.validate()?;
    }
    Ok(config)
}

pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("CLI: Failed to read filter from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("CLI: Failed to read filter from {:?}", path))
    }
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "expression: {}\nclassitem: {}\n",
            report.expression.as_deref().unwrap_or("-"),
            report.classitem.as_deref().unwrap_or("-")
        )),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string(report).context("CLI: Failed to serialize report")?;
            json.push('\n');
            Ok(json)
        }
    }
}

pub fn run(cli: &Cli, config: &CompilerConfig) -> Result<String> {
    let text = read_input(&cli.input)?;
    let compiled = compile(&text, config).context("Filter: No filter tree could be built")?;

    if cli.tree {
        eprint!("{}", compiled.tree);
    }

    match &compiled.expression {
        Ok(expr) => tracing::info!("Expression: {}", expr),
        Err(reason) => tracing::warn!("No expression generated: {}", reason),
    }
    if let Some(item) = &compiled.class_item {
        tracing::info!("ClassItem: {}", item);
    }

    render(&Report::from(&compiled), cli.format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_report_marks_absent_parts() {
        let report = Report {
            expression: Some("([A] = 1)".into()),
            classitem: None,
            rejection: None,
        };
        assert_eq!(
            render(&report, OutputFormat::Text).unwrap(),
            "expression: ([A] = 1)\nclassitem: -\n"
        );
    }

    #[test]
    fn json_report_uses_null() {
        let report = Report {
            expression: None,
            classitem: Some("LAST_NAME".into()),
            rejection: Some("BBOX: spatial filters are not compiled to expressions".into()),
        };
        let value: serde_json::Value =
            serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();
        assert!(value["expression"].is_null());
        assert_eq!(value["classitem"], "LAST_NAME");
        assert!(value["rejection"].is_string());
    }
}
