use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::ValuesMap;

use super::DocumentFormat;

/// Where a saved payload is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }

    fn describe(&self) -> String {
        match self {
            OutputDestination::Stdout => "stdout".to_string(),
            OutputDestination::File(path) => path.display().to_string(),
        }
    }
}

/// Serialization settings applied to every saved payload.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![OutputDestination::Stdout],
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }

    /// Files are rewritten on every save while the form is open.
    pub fn files_only(&self) -> Self {
        self.filtered(|destination| matches!(destination, OutputDestination::File(_)))
    }

    /// Stdout receives the last saved payload once the terminal is released.
    pub fn stdout_only(&self) -> Self {
        self.filtered(|destination| matches!(destination, OutputDestination::Stdout))
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    fn filtered(&self, keep: impl Fn(&OutputDestination) -> bool) -> Self {
        Self {
            destinations: self
                .destinations
                .iter()
                .filter(|destination| keep(destination))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Writes a submitted payload to every configured destination.
///
/// Files are replaced through a sibling temporary file, so a failed save
/// never leaves a half written document behind.
pub fn emit(payload: &ValuesMap, options: &OutputOptions) -> Result<()> {
    if options.destinations.is_empty() {
        return Ok(());
    }
    let document = render(payload, options)?;
    for destination in &options.destinations {
        let written = match destination {
            OutputDestination::Stdout => write_stdout(&document),
            OutputDestination::File(path) => replace_file(path, &document),
        };
        written.with_context(|| format!("failed to write payload to {}", destination.describe()))?;
    }
    Ok(())
}

fn render(payload: &ValuesMap, options: &OutputOptions) -> Result<String> {
    let document = Value::Object(payload.clone().into_iter().collect());
    match options.format {
        DocumentFormat::Json if options.pretty => {
            serde_json::to_string_pretty(&document).context("failed to serialize JSON payload")
        }
        DocumentFormat::Json => {
            serde_json::to_string(&document).context("failed to serialize JSON payload")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::to_string(&document).context("failed to serialize YAML payload")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            let document = without_nulls(document);
            let rendered = if options.pretty {
                toml::to_string_pretty(&document)
            } else {
                toml::to_string(&document)
            };
            rendered.context("failed to serialize TOML payload")
        }
    }
}

/// TOML has no null: unset fields are left out of the document instead.
#[cfg_attr(not(feature = "toml"), allow(dead_code))]
fn without_nulls(value: Value) -> Value {
    match value {
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key, without_nulls(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(without_nulls)
                .collect(),
        ),
        other => other,
    }
}

fn write_stdout(document: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{document}")?;
    stdout.flush()
}

fn replace_file(path: &Path, document: &str) -> io::Result<()> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".partial");
    let staging = PathBuf::from(staging);
    fs::write(&staging, format!("{document}\n"))?;
    fs::rename(&staging, path).inspect_err(|_| {
        let _ = fs::remove_file(&staging);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn payload(value: Value) -> ValuesMap {
        serde_json::from_value(value).unwrap()
    }

    fn scratch(extension: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("entityform-payload-{nanos}.{extension}"))
    }

    #[test]
    fn splits_stdout_from_files() {
        let options = OutputOptions::default().with_destinations(vec![
            OutputDestination::Stdout,
            OutputDestination::file("out.json"),
        ]);
        assert_eq!(
            options.files_only().destinations,
            vec![OutputDestination::file("out.json")]
        );
        assert_eq!(options.stdout_only().destinations, vec![OutputDestination::Stdout]);
        assert!(OutputOptions::default().files_only().is_empty());
    }

    #[test]
    fn nothing_configured_writes_nothing() {
        let options = OutputOptions::default().with_destinations(Vec::new());
        emit(&payload(json!({ "ok": true })), &options).unwrap();
    }

    #[test]
    fn repeated_saves_replace_the_file() {
        let path = scratch("json");
        let options = OutputOptions::default()
            .with_pretty(false)
            .with_destinations(vec![OutputDestination::file(&path)]);
        emit(&payload(json!({ "name": "draft" })), &options).unwrap();
        emit(&payload(json!({ "name": "final" })), &options).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\"name\":\"final\"}\n");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn nulls_are_stripped_only_where_needed() {
        let nested = json!({ "qty": null, "tags": [null, "a"], "meta": { "region": null, "n": 1 } });
        assert_eq!(
            without_nulls(nested),
            json!({ "tags": ["a"], "meta": { "n": 1 } })
        );
        let rendered = render(&payload(json!({ "qty": null })), &OutputOptions::default()).unwrap();
        assert!(rendered.contains("null"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn toml_payload_with_unset_fields_is_written() {
        let path = scratch("toml");
        let options = OutputOptions::new(DocumentFormat::Toml)
            .with_destinations(vec![OutputDestination::file(&path)]);
        emit(
            &payload(json!({ "name": "Ada", "qty": null, "region": null, "tags": [] })),
            &options,
        )
        .unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("name = \"Ada\""));
        assert!(!contents.contains("qty"));
        let _ = fs::remove_file(path);
    }
}
