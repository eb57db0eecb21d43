//! Document loading for the CLI: paths/globs, NDJSON, pointer selection, jq.
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Args, Debug, Clone)]
pub struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    pub ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /controls/0/props)
    #[arg(long)]
    pub json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is validated separately
    #[arg(long)]
    pub jq_expr: Option<String>,

    /// One or more inputs. May be literal paths, quoted glob patterns, or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    pub input: Vec<String>,
}

/// One JSON value to check, labelled with where it came from.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: String,
    pub value: serde_json::Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    pub fn load_documents(&self) -> Result<Vec<Document>> {
        let mut out = Vec::new();
        for source_path in resolve_file_path_patterns(&self.input)? {
            let (label, text) = read_source(&source_path)?;
            for (label, value) in self.parse_source(&label, &text)? {
                self.select(label, value, &mut out)?;
            }
        }
        tracing::debug!(documents = out.len(), "loaded input documents");
        Ok(out)
    }

    fn parse_source(&self, label: &str, text: &str) -> Result<Vec<(String, serde_json::Value)>> {
        if !self.ndjson {
            let value = serde_json::from_str(text)
                .with_context(|| format!("failed to parse JSON source ({label})"))?;
            return Ok(vec![(label.to_string(), value)]);
        }
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                let at = format!("{label}:{}", i + 1);
                let value = serde_json::from_str(line).with_context(|| format!("failed to parse NDJSON line ({at})"))?;
                Ok((at, value))
            })
            .collect()
    }

    fn select(&self, label: String, value: serde_json::Value, out: &mut Vec<Document>) -> Result<()> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} selects nothing in {label}"))?,
        };
        match self.jq_expr.as_deref() {
            None => out.push(Document { source: label, value }),
            Some(jq_expr) => {
                let results = crate::jq_exec::run_jaq(jq_expr, &value)
                    .with_context(|| format!("failed to apply jq expression to {label}"))?;
                let many = results.len() > 1;
                for (i, value) in results.into_iter().enumerate() {
                    let source = if many { format!("{label}#{i}") } else { label.clone() };
                    out.push(Document { source, value });
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_source(path: &Path) -> Result<(String, String)> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
        return Ok(("<stdin>".to_string(), text));
    }
    let label = path.to_string_lossy().to_string();
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read source file {label}"))?;
    Ok((label, text))
}

pub fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let before = out.len();
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
            }
            if out.len() == before {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(ndjson: bool, json_pointer: Option<&str>, jq_expr: Option<&str>) -> InputSettings {
        InputSettings {
            ndjson,
            json_pointer: json_pointer.map(str::to_string),
            jq_expr: jq_expr.map(str::to_string),
            input: Vec::new(),
        }
    }

    #[test]
    fn ndjson_labels_lines() {
        let docs = settings(true, None, None).parse_source("f", "{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        let labels: Vec<_> = docs.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["f:1", "f:3"]);
    }

    #[test]
    fn pointer_and_jq_selection() {
        let mut out = Vec::new();
        settings(false, Some("/root"), Some(".items[]"))
            .select("f".into(), json!({"root": {"items": [{"x": 1}, {"x": 2}]}}), &mut out)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].source, "f#1");
        assert_eq!(out[1].value, json!({"x": 2}));

        let err = settings(false, Some("/missing"), None).select("f".into(), json!({}), &mut out);
        assert!(err.is_err());
    }

    #[test]
    fn unmatched_glob_is_an_error() {
        assert!(resolve_file_path_patterns(["/no/such/dir/*.json"]).is_err());
        assert_eq!(resolve_file_path_patterns(["a.json"]).unwrap(), [PathBuf::from("a.json")]);
    }
}
