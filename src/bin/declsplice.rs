//! Command-line interface for declsplice
//! Renders a template against a declaration dump and writes the generated binding source.
//!
//! Usage:
//!   declsplice `<template>` --ast `<dump>` [-I `<dir>`]... [--config `<file>`] [-o `<file>`]
//!   declsplice --list-modules                        - List the available extraction modules

use clap::{Arg, ArgAction, ArgMatches, Command};
use config::ConfigError;
use declsplice::splice::config::{Loader, SpliceConfig};
use declsplice::splice::error::TemplateError;
use declsplice::splice::modules::ModuleRegistry;
use declsplice::splice::query::DumpService;
use declsplice::splice::template::TemplateEngine;
use std::process;
use tracing_subscriber::EnvFilter;

/// Generation failed: bad directive, query failure, ambiguous match...
const EXIT_GENERATION: i32 = 1;
/// Unusable configuration or arguments.
const EXIT_USAGE: i32 = 2;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let matches = Command::new("declsplice")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Splice C header declaration facts into binding templates")
        .arg_required_else_help(true)
        .arg(
            Arg::new("template")
                .help("Template file containing directive blocks")
                .required_unless_present("list-modules")
                .index(1),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .help("Declaration dump (JSON, or YAML by extension) to query")
                .required_unless_present("list-modules"),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .short('I')
                .help("Directory used to resolve relative header paths (replaces query.include_paths)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write the artifact here instead of stdout"),
        )
        .arg(
            Arg::new("list-modules")
                .long("list-modules")
                .help("List the available extraction modules")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("list-modules") {
        handle_list_modules_command();
        return;
    }

    handle_render_command(&matches);
}

/// Handle a render run
fn handle_render_command(matches: &ArgMatches) {
    // Both are required unless --list-modules was given.
    let (Some(template), Some(ast)) = (
        matches.get_one::<String>("template"),
        matches.get_one::<String>("ast"),
    ) else {
        eprintln!("Error: a template and --ast are required");
        process::exit(EXIT_USAGE);
    };

    let config = load_config(matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        process::exit(EXIT_USAGE);
    });

    let service = DumpService::from_path(ast)
        .unwrap_or_else(|e| {
            eprintln!("error[QueryError]: {}", e);
            process::exit(EXIT_GENERATION);
        })
        .with_include_paths(config.query.include_paths.iter().cloned());

    let engine = TemplateEngine::with_config(&service, &config).unwrap_or_else(|e| {
        eprintln!("Configuration error: query.largefile_defines: {}", e);
        process::exit(EXIT_USAGE);
    });

    let output = engine.render_file(template).unwrap_or_else(|e| {
        eprintln!("error[{}]: {}: {}", error_kind(&e), template, e);
        process::exit(EXIT_GENERATION);
    });

    match matches.get_one::<String>("output") {
        Some(path) => {
            if let Err(e) = std::fs::write(path, output) {
                eprintln!("Error writing {}: {}", path, e);
                process::exit(EXIT_GENERATION);
            }
        }
        None => print!("{}", output),
    }
}

/// Defaults, then `--config`, then command-line overrides.
fn load_config(matches: &ArgMatches) -> Result<SpliceConfig, ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(includes) = matches.get_many::<String>("include") {
        let includes: Vec<String> = includes.cloned().collect();
        loader = loader.set_override("query.include_paths", includes)?;
    }
    loader.build()
}

fn error_kind(error: &TemplateError) -> &'static str {
    match error {
        TemplateError::Directive { source, .. } => source.kind(),
        TemplateError::Io { .. } => "IoError",
        _ => "MalformedTemplate",
    }
}

/// Handle --list-modules
fn handle_list_modules_command() {
    println!("Available extraction modules:\n");
    for module in ModuleRegistry::with_defaults().list_modules() {
        println!("  {}", module.name());
        println!("    {}", module.description());
    }
}
