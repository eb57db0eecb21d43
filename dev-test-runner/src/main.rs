//! Replays `fixtures/cases/*.json` against `catalogs/sample.json`.
//!
//! Usage: `dev-test-runner [CATALOG] [CASES_GLOB]`
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;

use control_contract::{JsonCatalog, SchemaRegistry};
use control_contract::path_de::from_str_with_path;
use control_contract::value::PropertyBag;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Case {
    name: String,
    control: String,
    #[serde(default)]
    strict: bool,
    props: PropertyBag,
    expect: Expect,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Expect {
    errors: usize,
    #[serde(default)]
    paths: Vec<String>,
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let mut args = std::env::args().skip(1);
    let catalog_path = args.next().map(PathBuf::from).unwrap_or_else(|| root.join("catalogs/sample.json"));
    let cases_glob = args
        .next()
        .unwrap_or_else(|| root.join("fixtures/cases/*.json").to_string_lossy().to_string());

    let registry = SchemaRegistry::new(JsonCatalog::load(&catalog_path)?);
    let mut failed = 0usize;
    let mut total = 0usize;

    for entry in glob::glob(&cases_glob).with_context(|| format!("invalid glob {cases_glob}"))? {
        let path = entry?;
        let src = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
        let case: Case = from_str_with_path(&src).with_context(|| format!("bad case file {}", path.display()))?;
        total += 1;

        let errors = registry.validate_props(&case.control, &case.props, case.strict);
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();

        let count_ok = errors.len() == case.expect.errors;
        let paths_ok = case.expect.paths.is_empty() || paths == case.expect.paths;
        if count_ok && paths_ok {
            println!("{} {}", "PASS".green().bold(), case.name);
            continue;
        }
        failed += 1;
        println!("{} {}", "FAIL".red().bold(), case.name);
        println!("  expected {} error(s) at {:?}", case.expect.errors, case.expect.paths);
        for e in &errors {
            println!("  got {e}");
        }
    }

    let summary = format!("{total} case(s), {failed} failed");
    println!("{}", if failed == 0 { summary.green() } else { summary.red() });
    Ok(failed == 0 && total > 0)
}
