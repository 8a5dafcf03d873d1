use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use json_prototype_core::{
    SchemaError, StructMap, Validation, Validator, ValidatorOptions, Value, keys,
};
use tracing_subscriber::EnvFilter;

/// Exit code for data that legitimately fails validation.
const EXIT_INVALID: i32 = 1;
/// Exit code for defective prototypes, bad files, and I/O problems.
const EXIT_SCHEMA: i32 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "proto-validate")]
#[command(about = "Validate JSON/YAML documents against declarative prototypes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a data document against a prototype document.
    Validate(ValidateArgs),
    /// Structurally check prototype files without any data.
    CheckProto(CheckProtoArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Prototype file (.json, .yaml or .yml).
    #[arg(long)]
    proto: PathBuf,
    /// Data file; reads stdin as JSON when omitted.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Fail when the data carries keys the prototype never declares.
    #[arg(long)]
    strict: bool,
    /// Drop undeclared keys from the output instead of passing them through.
    #[arg(long)]
    strip_unknown: bool,
    /// Omit fields whose accepted value is a blank string.
    #[arg(long)]
    omit_empty: bool,
    /// strftime pattern for date values and bounds.
    #[arg(long)]
    date_pattern: Option<String>,
    /// Output format for the normalized document.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct CheckProtoArgs {
    /// Prototype files to check.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

struct CliError {
    message: String,
    code: i32,
}

impl CliError {
    fn invalid(message: String) -> Self {
        Self {
            message,
            code: EXIT_INVALID,
        }
    }

    fn schema(message: String) -> Self {
        Self {
            message,
            code: EXIT_SCHEMA,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::CheckProto(args) => run_check_proto(args),
    };

    if let Err(err) = result {
        eprintln!("{}", err.message);
        std::process::exit(err.code);
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let prototype = load_document(&args.proto)?;
    let data = match &args.data {
        Some(path) => load_document(path)?,
        None => read_stdin_document()?,
    };

    let mut options = ValidatorOptions {
        error_on_unspecified_keys: args.strict,
        remove_unspecified_keys: args.strip_unknown,
        remove_keys_when_value_empty: args.omit_empty,
        ..Default::default()
    };
    if let Some(pattern) = args.date_pattern {
        options.date_pattern = pattern;
    }

    let validator = Validator::new(options).map_err(schema_error)?;
    match validator.validate(&data, &prototype).map_err(schema_error)? {
        Validation::Valid(output) => {
            let rendered = render(&output, args.format, args.pretty)?;
            println!("{rendered}");
            Ok(())
        }
        Validation::Invalid(report) => Err(CliError::invalid(format!(
            "validation failed:{report}"
        ))),
    }
}

fn run_check_proto(args: CheckProtoArgs) -> Result<(), CliError> {
    for path in &args.files {
        let prototype = load_document(path)?;
        check_proto_node(&prototype)
            .map_err(|reason| {
                CliError::schema(format!("bad prototype '{}': {reason}", path.display()))
            })?;
        println!("{}: ok", path.display());
    }
    Ok(())
}

/// Structural dry-run over a prototype tree: every reachable node must
/// carry a mode key, alternative lists must be non-empty, and array
/// nodes must declare an element prototype. Registry lookups (custom
/// types, normalizers, default items) are an embedder concern and are
/// not resolved here.
fn check_proto_node(node: &Value) -> Result<(), String> {
    let Some(proto) = node.as_struct() else {
        return Err(format!(
            "prototype node must be a struct, found {}",
            node.type_name()
        ));
    };
    let has = |key: &str| proto.get(key).is_some_and(|v| !v.is_null());
    if !has(keys::TYPE) && !has(keys::CLASS) && !has(keys::CUSTOM) {
        return Err("node carries none of 'type', 'class' or 'custom'".to_string());
    }

    if let Some(children) = proto.get(keys::CHILDREN) {
        check_proto_node(children)?;
    }

    match proto.get(keys::FIELDS) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Struct(pattern)) => check_field_pattern(pattern),
        Some(Value::Array(patterns)) => {
            if patterns.is_empty() {
                return Err("'fields' cannot be an empty list".to_string());
            }
            for pattern in patterns {
                let Some(pattern) = pattern.as_struct() else {
                    return Err("'fields' alternatives must be structs".to_string());
                };
                check_field_pattern(pattern)?;
            }
            Ok(())
        }
        Some(_) => Err("'fields' must be a struct or a list of structs".to_string()),
    }
}

fn check_field_pattern(pattern: &StructMap) -> Result<(), String> {
    for (field, descriptor) in pattern {
        let Some(descriptor) = descriptor.as_struct() else {
            return Err(format!("field '{field}' descriptor must be a struct"));
        };
        match descriptor.get(keys::DEFINITION) {
            None | Some(Value::Null) => {}
            Some(single @ Value::Struct(_)) => check_proto_node(single)?,
            Some(Value::Array(alternatives)) => {
                if alternatives.is_empty() {
                    return Err(format!(
                        "field '{field}' has an empty 'definition' list"
                    ));
                }
                for alternative in alternatives {
                    check_proto_node(alternative)?;
                }
            }
            Some(_) => {
                return Err(format!(
                    "field '{field}' definition must be a struct or a list of structs"
                ));
            }
        }
    }
    Ok(())
}

fn load_document(path: &Path) -> Result<Value, CliError> {
    let raw = fs::read_to_string(path)
        .map_err(|err| CliError::schema(format!("failed to read '{}': {err}", path.display())))?;
    let json: serde_json::Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&raw).map_err(|err| {
            CliError::schema(format!("failed to parse '{}': {err}", path.display()))
        })?,
        _ => serde_json::from_str(&raw).map_err(|err| {
            CliError::schema(format!("failed to parse '{}': {err}", path.display()))
        })?,
    };
    Ok(Value::from(json))
}

fn read_stdin_document() -> Result<Value, CliError> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .map_err(|err| CliError::schema(format!("failed to read stdin: {err}")))?;
    let json: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| CliError::schema(format!("failed to parse stdin: {err}")))?;
    Ok(Value::from(json))
}

fn render(output: &Value, format: OutputFormat, pretty: bool) -> Result<String, CliError> {
    let json = output.to_json();
    match format {
        OutputFormat::Json => {
            if pretty {
                serde_json::to_string_pretty(&json)
            } else {
                serde_json::to_string(&json)
            }
            .map_err(|err| CliError::schema(format!("failed to serialize output: {err}")))
        }
        OutputFormat::Yaml => serde_yaml::to_string(&json)
            .map_err(|err| CliError::schema(format!("failed to serialize output: {err}"))),
    }
}

fn schema_error(err: SchemaError) -> CliError {
    CliError::schema(format!("schema error: {err}"))
}
