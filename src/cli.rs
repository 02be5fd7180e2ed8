//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use crate::adapters::doc_format::OutputFormat;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fs_source::FileSystemSource;
use crate::domain::engine::{Engine, EngineOptions};
use crate::domain::error::TmplError;
use crate::domain::prompt_types;
use crate::domain::schema::generate;
use crate::domain::type_registry::TypeRegistry;

#[derive(Parser, Debug)]
#[command(
    name = "tmpldoc",
    version,
    about = "Render templates and document their data types"
)]
pub struct Cli {
    /// INI file with an [engine] section
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tmpldoc=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a Markdown schema for a registered type
    Schema {
        type_name: String,
        /// Output file (`-` or omitted for stdout)
        #[arg(short, long)]
        output: Option<String>,
        #[arg(short, long, default_value = "markdown")]
        format: String,
    },
    /// Show a type's fields in the terminal
    Doc {
        type_name: String,
        /// table or simple
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// List registered types
    List,
    /// Render a template with JSON data
    Render {
        /// Template path relative to the template directory
        template: String,
        /// JSON data file
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        template_dir: Option<PathBuf>,
        /// Development mode: re-read the template on every load
        #[arg(long)]
        dev: bool,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let registry = prompt_types::default_registry();

    let result = match cli.command {
        Command::Schema {
            type_name,
            output,
            format,
        } => cmd_schema(&registry, &type_name, &format)
            .and_then(|doc| write_output(&doc, output.as_deref())),
        Command::Doc { type_name, format } => {
            cmd_doc(&registry, &type_name, &format).map(|doc| print!("{doc}"))
        }
        Command::List => {
            print!("{}", cmd_list(&registry));
            Ok(())
        }
        Command::Render {
            template,
            data,
            template_dir,
            dev,
        } => resolve_options(cli.config.as_deref(), template_dir, dev)
            .and_then(|options| cmd_render(&template, data.as_deref(), &options))
            .map(|out| print!("{out}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TmplError> {
    FileConfigAdapter::from_file(path).map_err(|e| TmplError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Engine options from, in increasing precedence: defaults, the config
/// file, then command-line flags.
pub fn resolve_options(
    config: Option<&Path>,
    template_dir: Option<PathBuf>,
    dev: bool,
) -> Result<EngineOptions, TmplError> {
    let mut options = match config {
        Some(path) => {
            debug!(config = %path.display(), "loading config");
            EngineOptions::from_config(&load_config(path)?)
        }
        None => EngineOptions::default(),
    };
    if let Some(dir) = template_dir {
        options.template_dir = dir;
    }
    options.development_mode |= dev;
    Ok(options)
}

fn write_output(doc: &str, output: Option<&str>) -> Result<(), TmplError> {
    match output {
        None | Some("-") => print!("{doc}"),
        Some(path) => {
            fs::write(path, doc)?;
            eprintln!("Schema written to: {path}");
        }
    }
    Ok(())
}

pub fn cmd_schema(registry: &TypeRegistry, type_name: &str, format: &str) -> Result<String, TmplError> {
    let format = OutputFormat::parse_for(format, &[OutputFormat::Markdown])?;
    let manifest = generate(&registry.get(type_name)?)?;
    Ok(format.formatter().format(&manifest))
}

pub fn cmd_doc(registry: &TypeRegistry, type_name: &str, format: &str) -> Result<String, TmplError> {
    let format = OutputFormat::parse_for(format, &[OutputFormat::Table, OutputFormat::Simple])?;
    let manifest = generate(&registry.get(type_name)?)?;
    Ok(format.formatter().format(&manifest))
}

pub fn cmd_list(registry: &TypeRegistry) -> String {
    if registry.is_empty() {
        return "No types registered.\n\nRegister types with TypeRegistry::register before listing.\n"
            .to_string();
    }

    let mut output = String::from("Available types:\n\n");
    for entry in registry.entries() {
        output.push_str(&format!("  {}\n", entry.name));
        output.push_str(&format!("    Type: {}\n", entry.type_name));
        output.push_str(&format!("    Fields: {}\n\n", entry.field_count));
    }
    output.push_str("Usage:\n");
    output.push_str("  tmpldoc schema <type-name> -o output.md\n");
    output.push_str("  tmpldoc doc <type-name>\n");
    output
}

pub fn load_data(path: &Path) -> Result<Value, TmplError> {
    let content = fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&content).map_err(|e| TmplError::DataParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    if !data.is_object() {
        return Err(TmplError::DataParse {
            file: path.display().to_string(),
            reason: "expected a JSON object at the top level".to_string(),
        });
    }
    Ok(data)
}

pub fn cmd_render(
    template: &str,
    data: Option<&Path>,
    options: &EngineOptions,
) -> Result<String, TmplError> {
    let context = match data {
        Some(path) => load_data(path)?,
        None => Value::Object(Default::default()),
    };

    debug!(
        template,
        template_dir = %options.template_dir.display(),
        development_mode = options.development_mode,
        "rendering"
    );
    let engine = Engine::new(
        FileSystemSource::new(&options.template_dir),
        options.development_mode,
    );
    let compiled = engine.load(template)?;
    Ok(engine.render(&compiled, &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn registry() -> TypeRegistry {
        prompt_types::default_registry()
    }

    #[test]
    fn cli_parses_render_flags() {
        let cli = Cli::parse_from([
            "tmpldoc",
            "--log-level",
            "debug",
            "render",
            "system.jet",
            "--data",
            "d.json",
            "--template-dir",
            "prompts",
            "--dev",
        ]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Render {
                template,
                data,
                template_dir,
                dev,
            } => {
                assert_eq!(template, "system.jet");
                assert_eq!(data, Some(PathBuf::from("d.json")));
                assert_eq!(template_dir, Some(PathBuf::from("prompts")));
                assert!(dev);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_defaults_formats() {
        let cli = Cli::parse_from(["tmpldoc", "doc", "Range"]);
        assert!(matches!(cli.command, Command::Doc { ref format, .. } if format == "table"));
        let cli = Cli::parse_from(["tmpldoc", "schema", "Range", "-o", "-"]);
        assert!(matches!(
            cli.command,
            Command::Schema { ref format, ref output, .. }
                if format == "markdown" && output.as_deref() == Some("-")
        ));
    }

    #[test]
    fn schema_markdown_for_registered_type() {
        let doc = cmd_schema(&registry(), "Range", "md").unwrap();
        assert!(doc.starts_with("# Range\n\n"));
        assert!(doc.contains("| min | f64 | `{{.min}} or {{.min}}` | Minimum value | `1` |"));
    }

    #[test]
    fn schema_rejects_table_format() {
        let err = cmd_schema(&registry(), "Range", "table").unwrap_err();
        assert!(matches!(err, TmplError::UnsupportedFormat(_)));
        assert_eq!(ExitCode::from(&err), ExitCode::from(5));
    }

    #[test]
    fn unknown_type_lists_available() {
        let err = cmd_doc(&registry(), "Nope", "table").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown type: Nope"));
        assert!(msg.contains("  - SystemPromptData (SystemPromptData)"));
    }

    #[test]
    fn doc_simple_format() {
        let doc = cmd_doc(&registry(), "Duration", "simple").unwrap();
        assert!(doc.starts_with("Type: Duration\n\nvalue\n  Type: i64\n  JSON: value\n"));
    }

    #[test]
    fn doc_rejects_markdown() {
        assert!(cmd_doc(&registry(), "Duration", "markdown").is_err());
    }

    #[test]
    fn list_is_sorted_with_counts() {
        let out = cmd_list(&registry());
        assert!(out.starts_with("Available types:\n\n  AccountInfo\n    Type: AccountInfo\n    Fields: 2\n"));
        let account = out.find("  AccountInfo\n").unwrap();
        let user = out.find("  UserPromptData\n").unwrap();
        assert!(account < user);
        assert!(out.ends_with("  tmpldoc doc <type-name>\n"));
    }

    #[test]
    fn list_empty_registry() {
        assert!(cmd_list(&TypeRegistry::new()).starts_with("No types registered."));
    }

    #[test]
    fn render_with_and_without_data() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("greet.jet"),
            "{{if .Name}}Hello, {{.Name}}!{{else}}Hello!{{end}}",
        )
        .unwrap();
        let options = EngineOptions {
            template_dir: dir.path().to_path_buf(),
            development_mode: false,
        };

        assert_eq!(cmd_render("greet", None, &options).unwrap(), "Hello!");

        let mut data = NamedTempFile::new().unwrap();
        write!(data, r#"{{"Name": "Alice"}}"#).unwrap();
        assert_eq!(
            cmd_render("greet.jet", Some(data.path()), &options).unwrap(),
            "Hello, Alice!"
        );
    }

    #[test]
    fn render_bad_data_is_data_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("t.jet"), "x").unwrap();
        let options = EngineOptions {
            template_dir: dir.path().to_path_buf(),
            development_mode: true,
        };
        let mut data = NamedTempFile::new().unwrap();
        write!(data, "[1, 2]").unwrap();
        let err = cmd_render("t.jet", Some(data.path()), &options).unwrap_err();
        assert!(matches!(err, TmplError::DataParse { .. }));
        assert_eq!(ExitCode::from(&err), ExitCode::from(2));
    }

    #[test]
    fn render_missing_template_is_load_error() {
        let dir = TempDir::new().unwrap();
        let options = EngineOptions {
            template_dir: dir.path().to_path_buf(),
            development_mode: false,
        };
        let err = cmd_render("missing.jet", None, &options).unwrap_err();
        assert!(matches!(err, TmplError::Load(_)));
        assert_eq!(ExitCode::from(&err), ExitCode::from(3));
    }

    #[test]
    fn options_precedence() {
        let mut cfg = NamedTempFile::new().unwrap();
        write!(cfg, "[engine]\ntemplate_dir = from_config\ndevelopment_mode = true\n").unwrap();

        let opts = resolve_options(Some(cfg.path()), None, false).unwrap();
        assert_eq!(opts.template_dir, PathBuf::from("from_config"));
        assert!(opts.development_mode);

        let opts = resolve_options(Some(cfg.path()), Some("from_flag".into()), false).unwrap();
        assert_eq!(opts.template_dir, PathBuf::from("from_flag"));

        let opts = resolve_options(None, None, false).unwrap();
        assert_eq!(opts, EngineOptions::default());
    }

    #[test]
    fn missing_config_is_config_error() {
        let err = resolve_options(Some(Path::new("/nonexistent/tmpldoc.ini")), None, false).unwrap_err();
        assert!(matches!(err, TmplError::ConfigParse { .. }));
    }
}
