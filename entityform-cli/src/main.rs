use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Result, WrapErr, eyre};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use entityform::{
    FormConfig, FormUI,
    domain::parse_form_definition,
    form::TabControl,
    io::{
        DocumentFormat, OutputDestination, OutputOptions, emit, options_from_value,
        parse_document_str, values_from_value,
    },
};

const LOG_ENV: &str = "ENTITYFORM_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "entityform",
    version,
    about = "Edit records through declarative tabbed forms in the terminal"
)]
struct Cli {
    /// Form definition: file path, inline payload, or "-" for stdin
    #[arg(short = 'd', long = "form", value_name = "SPEC")]
    form: String,

    /// Initial values: file path, inline payload, or "-" for stdin
    #[arg(short = 'v', long = "values", value_name = "SPEC")]
    values: Option<String>,

    /// JSON Schema replacing the validation derived from field rules
    #[arg(short = 's', long = "schema", value_name = "SPEC")]
    schema: Option<String>,

    /// Option list for a select-like field, as FIELD=SPEC
    #[arg(long = "options", value_name = "FIELD=SPEC", action = ArgAction::Append)]
    options: Vec<String>,

    /// Tab id to open first
    #[arg(long = "tab", value_name = "ID")]
    tab: Option<String>,

    /// Output destinations ("-" writes to stdout). Defaults to stdout.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Output format; inferred from output file extensions when omitted
    #[arg(long = "format", value_name = "FORMAT")]
    format: Option<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,

    /// Write diagnostics to this file (filter with ENTITYFORM_LOG)
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Title shown at the top of the UI
    #[arg(long = "title", value_name = "TEXT")]
    title: Option<String>,

    /// Load and mount the form, report problems, then exit without a UI
    #[arg(long = "check")]
    check: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    if let Some(path) = cli.log_file.as_deref() {
        init_logging(path)?;
    }

    let mut diagnostics = DiagnosticCollector::default();
    let stdin_specs = [Some(cli.form.as_str()), cli.values.as_deref(), cli.schema.as_deref()]
        .into_iter()
        .flatten()
        .chain(cli.options.iter().filter_map(|raw| raw.split_once('=').map(|(_, spec)| spec)))
        .filter(|spec| *spec == "-")
        .count();
    if stdin_specs > 1 {
        diagnostics.push_input("stdin", "only one input may be read from stdin");
        return diagnostics.into_result();
    }

    let config = load_config(&cli, &mut diagnostics);
    let bindings = load_bindings(&cli.options, &mut diagnostics);
    let (output, file_paths) = build_output_options(&cli, &mut diagnostics);
    if !cli.check {
        ensure_output_paths_available(&file_paths, cli.force, &mut diagnostics);
    }
    diagnostics.into_result()?;
    let Some(config) = config else {
        return Err(eyre!("form definition could not be loaded"));
    };

    let field_count = config.tabs.iter().map(|tab| tab.fields().count()).sum::<usize>();
    let tab_count = config.tabs.len();
    let mut ui = FormUI::new(config).with_output(output.clone());
    if let Some(title) = cli.title.as_ref() {
        ui = ui.with_title(title.clone());
    }
    for (field, options) in bindings {
        ui = ui.bind_options(field, options);
    }

    if cli.check {
        ui.mount().map_err(|err| eyre!("{err:#}"))?;
        println!("form OK: {tab_count} tab(s), {field_count} field(s)");
        return Ok(());
    }

    match ui.run().map_err(|err| eyre!("{err:#}"))? {
        Some(values) => {
            emit(&values, &output.stdout_only()).map_err(|err| eyre!("{err:#}"))?;
        }
        None => eprintln!("left without saving"),
    }
    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| eyre!("failed to install logger: {err}"))
}

fn load_config(cli: &Cli, diagnostics: &mut DiagnosticCollector) -> Option<FormConfig> {
    let document = load_value(&cli.form, "form")
        .map_err(|err| diagnostics.push_input("form", format!("{err:#}")))
        .ok()?;
    let definition = parse_form_definition(&document)
        .map_err(|err| diagnostics.push_input("form", err.to_string()))
        .ok()?;
    let mut config = FormConfig::from(definition);

    if let Some(spec) = cli.values.as_deref() {
        match load_value(spec, "values").and_then(|value| {
            values_from_value(value).map_err(|err| eyre!("{err:#}"))
        }) {
            // Values given on the command line win over the definition's seed.
            Ok(values) => config.initial_values.extend(values),
            Err(err) => diagnostics.push_input("values", format!("{err:#}")),
        }
    }

    if let Some(spec) = cli.schema.as_deref() {
        match load_value(spec, "schema") {
            Ok(schema) => config.schema = Some(schema),
            Err(err) => diagnostics.push_input("schema", format!("{err:#}")),
        }
    }

    if let Some(id) = cli.tab.as_deref() {
        match config.tabs.iter().position(|tab| tab.id == id) {
            Some(initial) => config.tab_control = TabControl::Uncontrolled { initial },
            None => diagnostics.push_input("tab", format!("no tab with id `{id}`")),
        }
    }
    Some(config)
}

fn load_bindings(
    raw: &[String],
    diagnostics: &mut DiagnosticCollector,
) -> Vec<(String, Vec<entityform::SelectOption>)> {
    let mut bindings = Vec::new();
    for entry in raw {
        let Some((field, spec)) = entry.split_once('=') else {
            diagnostics.push_input("options", format!("`{entry}` is not FIELD=SPEC"));
            continue;
        };
        let field = field.trim();
        if field.is_empty() {
            diagnostics.push_input("options", format!("`{entry}` names no field"));
            continue;
        }
        let label = format!("options for {field}");
        match load_value(spec, &label)
            .and_then(|value| options_from_value(&value).map_err(|err| eyre!("{err:#}")))
        {
            Ok(options) => bindings.push((field.to_string(), options)),
            Err(err) => diagnostics.push_input(&label, format!("{err:#}")),
        }
    }
    bindings
}

/// Reads a spec that is a file path, "-" for stdin, or the payload itself.
fn load_value(spec: &str, label: &str) -> Result<Value> {
    if spec == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("failed to read from stdin")?;
        return parse_contents(&buffer, DocumentFormat::default(), label);
    }

    let path = PathBuf::from(spec);
    if !path.is_file() {
        return parse_contents(spec, DocumentFormat::default(), &format!("inline {label}"));
    }
    let contents = fs::read_to_string(&path)
        .wrap_err_with(|| format!("failed to read {label} from {}", path.display()))?;
    let format = DocumentFormat::from_path(&path).unwrap_or_default();
    parse_contents(&contents, format, label)
}

fn parse_contents(contents: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    match parse_document_str(contents, format) {
        Ok(value) => Ok(value),
        Err(primary) => {
            for candidate in DocumentFormat::available() {
                if *candidate == format {
                    continue;
                }
                if let Ok(value) = parse_document_str(contents, *candidate) {
                    return Ok(value);
                }
            }
            Err(eyre!(
                "failed to parse {label}: tried {} (first error: {primary:#})",
                format_list()
            ))
        }
    }
}

fn format_list() -> String {
    DocumentFormat::available()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn build_output_options(
    cli: &Cli,
    diagnostics: &mut DiagnosticCollector,
) -> (OutputOptions, Vec<PathBuf>) {
    let mut destinations = Vec::new();
    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            diagnostics.push_output("output destination cannot be empty");
        } else if raw == "-" {
            destinations.push(OutputDestination::Stdout);
        } else {
            destinations.push(OutputDestination::file(raw));
        }
    }
    if destinations.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let file_paths: Vec<PathBuf> = destinations
        .iter()
        .filter_map(|destination| match destination {
            OutputDestination::File(path) => Some(path.clone()),
            OutputDestination::Stdout => None,
        })
        .collect();

    let format = match cli.format.as_deref() {
        Some(name) => name.parse::<DocumentFormat>().unwrap_or_else(|err| {
            diagnostics.push_output(format!("{err}"));
            DocumentFormat::default()
        }),
        None => infer_format_from_files(&file_paths, diagnostics).unwrap_or_default(),
    };

    let options = OutputOptions::new(format)
        .with_pretty(!cli.no_pretty)
        .with_destinations(destinations);
    (options, file_paths)
}

fn infer_format_from_files(
    file_paths: &[PathBuf],
    diagnostics: &mut DiagnosticCollector,
) -> Option<DocumentFormat> {
    let mut detected: Option<DocumentFormat> = None;
    for path in file_paths {
        match DocumentFormat::from_path(path) {
            Some(format) => match detected {
                Some(existing) if existing != format => diagnostics.push_output(format!(
                    "output file {} uses {format} but other destinations use {existing}; align extensions",
                    path.display()
                )),
                Some(_) => {}
                None => detected = Some(format),
            },
            None => diagnostics.push_output(format!(
                "cannot infer format from output file {}; use one of {} or pass --format",
                path.display(),
                format_list()
            )),
        }
    }
    detected
}

fn ensure_output_paths_available(
    paths: &[PathBuf],
    force: bool,
    diagnostics: &mut DiagnosticCollector,
) {
    if force {
        return;
    }
    for path in paths {
        if path.exists() {
            diagnostics.push_output(format!(
                "file {} already exists (pass --force to overwrite)",
                path.display()
            ));
        }
    }
}

#[derive(Default)]
struct DiagnosticCollector {
    messages: Vec<String>,
}

impl DiagnosticCollector {
    fn push_input(&mut self, label: &str, message: impl Into<String>) {
        self.messages
            .push(format!("input ({label}): {}", message.into()));
    }

    fn push_output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("encountered input/output issues:\n");
        for (idx, msg) in self.messages.iter().enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_numbers_messages() {
        let mut diagnostics = DiagnosticCollector::default();
        diagnostics.push_input("form", "bad");
        diagnostics.push_output("worse");
        let message = diagnostics.into_result().unwrap_err().to_string();
        assert!(message.contains("1. input (form): bad"));
        assert!(message.contains("2. output: worse"));
    }

    #[test]
    fn inline_payloads_parse_when_no_file_matches() {
        let value = load_value(r#"{"a": 1}"#, "values").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn mixed_output_extensions_are_reported() {
        let mut diagnostics = DiagnosticCollector::default();
        let paths = [PathBuf::from("a.json"), PathBuf::from("b.txt")];
        let detected = infer_format_from_files(&paths, &mut diagnostics);
        assert_eq!(detected, Some(DocumentFormat::Json));
        assert!(diagnostics.into_result().is_err());
    }
}
