//! Schema Algebra CLI
//!
//! Command-line interface for inspecting, transforming and validating against
//! dereferenced JSON Schemas.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schema_algebra::{
    load_builder, load_schema, SchemaBuilder, ValidateError, ValidatorOptions,
};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "schema-algebra")]
#[command(about = "Inspect, transform and validate against JSON Schemas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a payload against a schema
    Validate {
        /// Payload file to validate
        payload: PathBuf,

        /// Schema file (must be fully dereferenced)
        #[arg(long)]
        schema: PathBuf,

        /// Treat the payload as a non-empty array of values
        #[arg(long)]
        list: bool,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,

        /// Pretty-print the validated value
        #[arg(long)]
        pretty: bool,

        /// Do not coerce scalar types
        #[arg(long)]
        no_coerce: bool,

        /// Do not fill in defaults
        #[arg(long)]
        no_defaults: bool,

        /// Keep properties not allowed by additionalProperties: false
        #[arg(long)]
        keep_additional: bool,
    },

    /// Report the structural classification of a schema
    Inspect {
        /// Schema file (must be fully dereferenced)
        schema: PathBuf,
    },

    /// Apply property operations to a schema and print the result
    Transform {
        /// Schema file (must be fully dereferenced)
        schema: PathBuf,

        /// Keep only these properties (comma separated)
        #[arg(long, value_delimiter = ',')]
        pick: Vec<String>,

        /// Remove these properties (comma separated)
        #[arg(long, value_delimiter = ',')]
        omit: Vec<String>,

        /// Make these properties optional and all others required
        #[arg(long, value_delimiter = ',')]
        optional: Vec<String>,

        /// Make these properties required
        #[arg(long, value_delimiter = ',')]
        required: Vec<String>,

        /// Drop required at the top level
        #[arg(long)]
        all_optional: bool,

        /// Drop required at every level
        #[arg(long, conflicts_with = "all_optional")]
        deep_optional: bool,

        /// Let these properties also accept an array of themselves (comma separated)
        #[arg(long, value_delimiter = ',')]
        array: Vec<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            payload,
            schema,
            list,
            json,
            pretty,
            no_coerce,
            no_defaults,
            keep_additional,
        } => {
            let options = ValidatorOptions::default()
                .coerce_types(!no_coerce)
                .use_defaults(!no_defaults)
                .remove_additional(!keep_additional);
            run_validate(ValidateArgs {
                payload,
                schema,
                list,
                json_output: json,
                pretty,
                options,
            })
        }

        Commands::Inspect { schema } => run_inspect(schema),

        Commands::Transform {
            schema,
            pick,
            omit,
            optional,
            required,
            all_optional,
            deep_optional,
            array,
            output,
            pretty,
        } => run_transform(TransformArgs {
            schema,
            pick,
            omit,
            optional,
            required,
            all_optional,
            deep_optional,
            array,
            output,
            pretty,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

struct ValidateArgs {
    payload: PathBuf,
    schema: PathBuf,
    list: bool,
    json_output: bool,
    pretty: bool,
    options: ValidatorOptions,
}

fn run_validate(args: ValidateArgs) -> Result<(), u8> {
    let ValidateArgs {
        payload: payload_path,
        schema: schema_path,
        list,
        json_output,
        pretty,
        options,
    } = args;

    let payload = load_schema(&payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let builder = load_builder(&schema_path)
        .map_err(|e| {
            report_error(json_output, &format!("loading schema: {}", e));
            e.exit_code() as u8
        })?
        .with_validator_options(options);

    let result = if list {
        match payload {
            Value::Array(values) => builder.validate_list(values).map(Value::Array),
            _ => {
                report_error(json_output, "--list expects the payload to be a JSON array");
                return Err(2);
            }
        }
    } else {
        builder.validate(payload)
    };

    match result {
        Ok(value) => {
            if json_output {
                println!("{}", json!({ "valid": true, "value": value }));
            } else {
                println!("{}", to_json(&value, pretty)?);
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors, .. }) => {
            if json_output {
                let output = json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

fn run_inspect(schema_path: PathBuf) -> Result<(), u8> {
    let builder = load_builder(&schema_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let report = json!({
        "object": builder.is_object_schema(),
        "additional_properties": builder.has_additional_properties(),
        "combinators": builder.has_combinators(),
        "simple": builder.is_simple_object_schema(),
        "properties": builder.property_names(),
        "required": builder.required_names(),
    });
    println!("{}", to_json(&report, true)?);
    Ok(())
}

struct TransformArgs {
    schema: PathBuf,
    pick: Vec<String>,
    omit: Vec<String>,
    optional: Vec<String>,
    required: Vec<String>,
    all_optional: bool,
    deep_optional: bool,
    array: Vec<String>,
    output: Option<PathBuf>,
    pretty: bool,
}

fn run_transform(args: TransformArgs) -> Result<(), u8> {
    let mut builder = load_builder(&args.schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    apply_transforms(&mut builder, &args).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let output = to_json(&builder.to_value(), args.pretty)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", output);
        }
    }
    Ok(())
}

/// Apply the requested operations in a fixed order: pick, omit, optional,
/// required, all/deep optional, array.
fn apply_transforms(
    builder: &mut SchemaBuilder,
    args: &TransformArgs,
) -> Result<(), schema_algebra::BuilderError> {
    if !args.pick.is_empty() {
        builder.pick_properties(&as_strs(&args.pick))?;
    }
    if !args.omit.is_empty() {
        builder.omit_properties(&as_strs(&args.omit))?;
    }
    if !args.optional.is_empty() {
        builder.set_optional_properties(&as_strs(&args.optional))?;
    }
    if !args.required.is_empty() {
        builder.set_required_properties(&as_strs(&args.required))?;
    }
    if args.all_optional {
        builder.to_optionals();
    }
    if args.deep_optional {
        builder.to_deep_optionals();
    }
    if !args.array.is_empty() {
        let names = as_strs(&args.array);
        builder.transform_properties_to_array(Some(names.as_slice()))?;
    }
    Ok(())
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

fn to_json(value: &Value, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
