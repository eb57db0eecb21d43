//! CLI: validate property bags, inspect composed schemas, try normalizers.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;

use control_contract::catalog::JsonCatalog;
use control_contract::error::ValidationError;
use control_contract::normalize;
use control_contract::registry::SchemaRegistry;
use control_contract::value::{bag_from_json, Value};

use crate::input::{Document, InputSettings};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate UI control props against composed control schemas
#[derive(Parser, Debug)]
#[command(name = "control-contract", version)]
pub struct CommandLineInterface {
    /// more logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate property bags for one control type
    Validate(ValidateCmd),
    /// print the composed schema of a control type as JSON Schema
    Schema(SchemaCmd),
    /// coerce one JSON literal with a named normalizer
    Normalize(NormalizeCmd),
    /// list the control types of a catalog
    List(ListCmd),
}

#[derive(Args, Debug, Clone)]
struct CatalogSettings {
    /// catalog JSON file ({"controls": {"<type>": {"schema": .., "hints": [..]}}})
    #[arg(long)]
    catalog: PathBuf,
}

#[derive(Args, Debug)]
struct ValidateCmd {
    #[command(flatten)]
    catalog_settings: CatalogSettings,

    /// control type the documents are props of
    #[arg(long)]
    control: String,

    /// reject undeclared props on closed schemas
    #[arg(long, env = "CONTROL_CONTRACT_STRICT")]
    strict: bool,

    #[command(flatten)]
    input_settings: InputSettings,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SchemaCmd {
    #[command(flatten)]
    catalog_settings: CatalogSettings,

    #[arg(long)]
    control: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct NormalizeCmd {
    #[arg(long, value_enum)]
    kind: NormalizerKind,

    /// frames only: reject unknown keys
    #[arg(long, env = "CONTROL_CONTRACT_STRICT")]
    strict: bool,

    /// JSON literal; bare words are taken as strings (e.g. 50%)
    value: String,
}

#[derive(Args, Debug)]
struct ListCmd {
    #[command(flatten)]
    catalog_settings: CatalogSettings,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum NormalizerKind {
    Dimension,
    Padding,
    Alignment,
    Offset,
    Scale,
    Skew,
    ColorMatrix,
    Frame,
}

#[derive(Debug, Serialize)]
struct DocumentReport {
    source: String,
    valid: bool,
    errors: Vec<ValidationError>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    generated_at: String,
    control: &'a str,
    strict: bool,
    checked: usize,
    invalid: usize,
    documents: &'a [DocumentReport],
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CatalogSettings {
    fn registry(&self) -> Result<SchemaRegistry> {
        let catalog = JsonCatalog::load(&self.catalog)
            .with_context(|| format!("failed to load catalog {}", self.catalog.display()))?;
        Ok(SchemaRegistry::new(catalog))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Validate(target) => target.run(),
            Command::Schema(target) => {
                let registry = target.catalog_settings.registry()?;
                let schema = require_control(&registry, &target.control)?;
                let src = serde_json::to_string_pretty(&schema.to_json_schema())?;
                emit(target.out.as_deref(), &src)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Normalize(target) => {
                let out = target.run()?;
                println!("{}", serde_json::to_string(&serde_json::Value::from(out))?);
                Ok(ExitCode::SUCCESS)
            }
            Command::List(target) => {
                let registry = target.catalog_settings.registry()?;
                let catalog = registry.catalog();
                for control in catalog.control_types() {
                    let hints = catalog.prop_hints(&control);
                    if hints.is_empty() {
                        println!("{control}");
                    } else {
                        println!("{control} {}", format!("(hints: {})", hints.join(", ")).dimmed());
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

impl ValidateCmd {
    fn run(&self) -> Result<ExitCode> {
        let registry = self.catalog_settings.registry()?;
        require_control(&registry, &self.control)?;
        let documents = self.input_settings.load_documents()?;

        let reports: Vec<DocumentReport> = documents
            .par_iter()
            .map(|doc| check_document(&registry, &self.control, self.strict, doc))
            .collect();
        let invalid = reports.iter().filter(|r| !r.valid).count();
        tracing::debug!(checked = reports.len(), invalid, "validation finished");

        let rendered = match self.format {
            ReportFormat::Text => render_text(&reports, invalid, self.out.is_none()),
            ReportFormat::Json => {
                let report = Report {
                    generated_at: chrono::Utc::now().to_rfc3339(),
                    control: &self.control,
                    strict: self.strict,
                    checked: reports.len(),
                    invalid,
                    documents: &reports,
                };
                serde_json::to_string_pretty(&report)?
            }
        };
        emit(self.out.as_deref(), &rendered)?;

        Ok(if invalid == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

impl NormalizeCmd {
    fn run(&self) -> Result<Value> {
        // accept `50%` as well as `"50%"`
        let literal = serde_json::from_str::<serde_json::Value>(&self.value)
            .unwrap_or_else(|_| serde_json::Value::String(self.value.clone()));
        let input = Value::from(literal);
        let input = Some(&input);

        let out = match self.kind {
            NormalizerKind::Dimension => normalize::normalize_dimension(input)?.map(Value::from),
            NormalizerKind::Padding => normalize::normalize_padding(input)?.map(Value::from),
            NormalizerKind::Alignment => normalize::normalize_alignment(input)?.map(Value::from),
            NormalizerKind::Offset => normalize::normalize_offset(input)?.map(Value::from),
            NormalizerKind::Scale => normalize::normalize_scale(input)?.map(Value::from),
            NormalizerKind::Skew => normalize::normalize_skew(input)?.map(Value::from),
            NormalizerKind::ColorMatrix => normalize::normalize_color_matrix(input)?.map(Value::from),
            NormalizerKind::Frame => Some(Value::from(normalize::normalize_frame(input, self.strict)?)),
        };
        Ok(out.unwrap_or(Value::Null))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn require_control(
    registry: &SchemaRegistry,
    control: &str,
) -> Result<std::sync::Arc<control_contract::schema::SchemaNode>> {
    match registry.schema_for(control) {
        Some(schema) => Ok(schema),
        None => bail!(
            "unknown control type `{control}` (catalog has: {})",
            registry.catalog().control_types().join(", ")
        ),
    }
}

fn check_document(registry: &SchemaRegistry, control: &str, strict: bool, doc: &Document) -> DocumentReport {
    let errors = match bag_from_json(doc.value.clone()) {
        Some(bag) => registry.validate_props(control, &bag, strict),
        None => {
            let found = Value::from(&doc.value).type_name();
            vec![ValidationError::new(format!("{control}.props"), format!("must be an object, got {found}"))]
        }
    };
    DocumentReport { source: doc.source.clone(), valid: errors.is_empty(), errors }
}

fn render_text(reports: &[DocumentReport], invalid: usize, color: bool) -> String {
    // files never get escapes
    if !color {
        colored::control::set_override(false);
    }

    let mut out = String::new();
    for report in reports {
        if report.valid {
            out.push_str(&format!("{} {}\n", "ok".green().bold(), report.source));
            continue;
        }
        out.push_str(&format!(
            "{} {} ({} error(s))\n",
            "invalid".red().bold(),
            report.source,
            report.errors.len()
        ));
        for err in &report.errors {
            out.push_str(&format!("  {} {}\n", err.path.yellow(), err.message));
        }
    }
    let summary = format!("{} checked, {invalid} invalid", reports.len());
    out.push_str(&if invalid == 0 { summary.green().to_string() } else { summary.red().to_string() });
    if !color {
        colored::control::unset_override();
    }
    out
}

fn emit(out: Option<&Path>, src: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, src).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            println!("{src}");
            Ok(())
        }
    }
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;
    use control_contract::catalog::StaticCatalog;
    use control_contract::schema::ObjectSchema;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new(StaticCatalog::new().with("button", ObjectSchema::new().into_node(), Vec::<String>::new()))
    }

    fn normalize(kind: NormalizerKind, value: &str) -> Value {
        NormalizeCmd { kind, strict: false, value: value.to_string() }.run().unwrap()
    }

    #[test]
    fn non_object_documents_are_reported() {
        let doc = Document { source: "d".into(), value: json!([1]) };
        let report = check_document(&registry(), "button", false, &doc);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "button.props");
        assert!(report.errors[0].message.contains("must be an object"), "{}", report.errors[0].message);

        let doc = Document { source: "e".into(), value: json!({"label": "OK"}) };
        assert!(check_document(&registry(), "button", false, &doc).valid);
    }

    #[test]
    fn bare_words_normalize_as_strings() {
        assert_eq!(normalize(NormalizerKind::Dimension, "50%"), Value::from("50%"));
        assert_eq!(normalize(NormalizerKind::Dimension, "\"12\""), Value::Float(12.0));
        assert_eq!(normalize(NormalizerKind::Padding, "null"), Value::Null);
        assert!(matches!(normalize(NormalizerKind::Padding, "[1, 2]"), Value::Array(_)));
        assert!(NormalizeCmd { kind: NormalizerKind::Dimension, strict: false, value: "true".into() }.run().is_err());
    }

    #[test]
    fn text_report_lists_documents_and_summary() {
        let reports = [
            DocumentReport { source: "a".into(), valid: true, errors: Vec::new() },
            DocumentReport {
                source: "b".into(),
                valid: false,
                errors: vec![ValidationError::new("button.props.radius", "-1 is below the minimum of 0")],
            },
        ];
        let text = render_text(&reports, 1, false);
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            [
                "ok a",
                "invalid b (1 error(s))",
                "  button.props.radius -1 is below the minimum of 0",
                "2 checked, 1 invalid",
            ]
        );
    }
}
