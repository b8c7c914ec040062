mod baker;
mod config;
mod repo;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use proof_core::{Schema, SchemaError};
use proof_form::{BakeTarget, FormEngine};

use crate::repo::ResolvedTemplate;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Visual form front-end for cookiecutter templates.
#[derive(Parser)]
#[command(
    name = "proof",
    version,
    about = "Fill, validate and bake cookiecutter templates from a web form"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive form for a template
    Run {
        /// Template location: local directory, repository URL or
        /// abbreviation (gh:user/repo)
        template: String,
        /// Subfolder holding cookiecutter.json, for multi-template repos
        #[arg(long)]
        directory: Option<String>,
        /// Where the generated project lands
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,
        /// Branch, tag or commit to check out
        #[arg(long, short = 'c')]
        checkout: Option<String>,
        /// Overwrite the output directory if it already exists
        #[arg(long, short = 'f')]
        overwrite_if_exists: bool,
        /// Cookiecutter user config, passed through to the generation engine
        #[arg(long)]
        config_file: Option<PathBuf>,
        /// Port to serve the form on
        #[arg(long, default_value = "8742")]
        port: u16,
    },

    /// Load and validate a template schema without serving the form
    Check {
        /// Template location: local directory, repository URL or
        /// abbreviation (gh:user/repo)
        template: String,
        /// Subfolder holding cookiecutter.json, for multi-template repos
        #[arg(long)]
        directory: Option<String>,
        /// Branch, tag or commit to check out
        #[arg(long, short = 'c')]
        checkout: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            template,
            directory,
            output_dir,
            checkout,
            overwrite_if_exists,
            config_file,
            port,
        } => {
            cmd_run(
                &template,
                directory.as_deref(),
                output_dir,
                checkout.as_deref(),
                overwrite_if_exists,
                config_file,
                port,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Check {
            template,
            directory,
            checkout,
        } => {
            cmd_check(
                &template,
                directory.as_deref(),
                checkout.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
    }
}

fn cmd_check(
    template: &str,
    directory: Option<&str>,
    checkout: Option<&str>,
    output: OutputFormat,
    quiet: bool,
) {
    let (resolved, schema) = load_template_schema(template, checkout, directory, output, quiet);

    if !quiet {
        match output {
            OutputFormat::Text => {
                println!(
                    "Schema OK: \"{}\" declares {} parameter(s)",
                    resolved.name,
                    schema.parameters().len()
                );
            }
            OutputFormat::Json => {
                let names: Vec<&str> = schema
                    .parameters()
                    .iter()
                    .map(|(n, _)| n.as_str())
                    .collect();
                let response = serde_json::json!({
                    "status": "ok",
                    "template": resolved.name,
                    "parameters": names,
                });
                println!("{}", response);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    template: &str,
    directory: Option<&str>,
    output_dir: Option<PathBuf>,
    checkout: Option<&str>,
    overwrite_if_exists: bool,
    config_file: Option<PathBuf>,
    port: u16,
    output: OutputFormat,
    quiet: bool,
) {
    let (resolved, schema) = load_template_schema(template, checkout, directory, output, quiet);

    let engine = FormEngine::new(schema);

    // The repo is already resolved and checked out locally, so the
    // generation engine gets the local clone, not the original reference.
    let target = BakeTarget {
        template: resolved.repo_dir.to_string_lossy().into_owned(),
        checkout: None,
        directory: directory.map(str::to_owned),
        output_dir,
        overwrite_if_exists,
        config_file,
    };

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    if let Err(e) = rt.block_on(serve::start_server(
        port,
        engine,
        target,
        resolved.name.clone(),
        quiet,
    )) {
        report_error(&format!("server error: {}", e), output, quiet);
        process::exit(1);
    }
}

/// Resolve the template to a local directory and load its schema.
/// Any failure is reported (every schema violation, not just the first)
/// and exits with status 1.
fn load_template_schema(
    template: &str,
    checkout: Option<&str>,
    directory: Option<&str>,
    output: OutputFormat,
    quiet: bool,
) -> (ResolvedTemplate, Schema) {
    let user_config = match config::load_user_config() {
        Ok(c) => c,
        Err(e) => {
            report_error(&e, output, quiet);
            process::exit(1);
        }
    };

    let resolved = match repo::resolve_template(template, checkout, directory, &user_config) {
        Ok(r) => r,
        Err(e) => {
            report_error(&e, output, quiet);
            process::exit(1);
        }
    };

    match Schema::from_file(&resolved.schema_file()) {
        Ok(schema) => (resolved, schema),
        Err(e) => {
            report_schema_error(&e, output, quiet);
            process::exit(1);
        }
    }
}

fn report_schema_error(error: &SchemaError, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", error),
        OutputFormat::Json => {
            let response = serde_json::json!({
                "error": "invalid schema",
                "issues": error.issues(),
                "message": error.to_string(),
            });
            eprintln!("{}", response);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}
