//! ontc CLI: run, inspect and debug OXPL programs.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, NamedSource, Result};

use ontc::ast::{render, Node};
use ontc::config::Config;
use ontc::error::OntcError;
use ontc::exec::{self, Notice};
use ontc::shell::Shell;

#[derive(Parser)]
#[command(name = "ontc", version, about = "OXPL ontology toolchain")]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/ontc/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, validate and execute a program.
    Run {
        /// OXPL source file.
        file: PathBuf,
    },

    /// Execute a program, then open the shell on its knowledge base.
    Dbgon {
        /// OXPL source file.
        file: PathBuf,
    },

    /// Open the shell on an empty session.
    Shell,

    /// Print the AST of a program.
    Ast {
        /// OXPL source file.
        file: PathBuf,

        /// Emit a Graphviz digraph instead of an indented tree.
        #[arg(long, conflicts_with = "json")]
        dot: bool,

        /// Emit the AST as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Execute a program and print its knowledge base as JSON.
    Export {
        /// OXPL source file.
        file: PathBuf,
    },
}

/// Attach the program text so span-carrying diagnostics render in context.
fn with_source(err: OntcError, path: &Path, source: &str) -> miette::Report {
    miette::Report::new(err)
        .with_source_code(NamedSource::new(path.display().to_string(), source.to_string()))
}

fn load(path: &Path) -> Result<(String, Option<Node>)> {
    let source = std::fs::read_to_string(path).into_diagnostic()?;
    let root = ontc::syntax::parse_program(&source)
        .map_err(|e| with_source(e.into(), path, &source))?;
    Ok((source, root))
}

fn echo(config: &Config, notices: &[Notice]) {
    if config.echo_notices {
        for notice in notices {
            eprintln!("{notice}");
        }
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();
    let config = Config::discover(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    match cli.command {
        Commands::Run { file } => {
            let (source, root) = load(&file)?;
            let report = exec::run_program(root.as_ref(), &config, io::stdout().lock())
                .map_err(|e| with_source(e, &file, &source))?;
            echo(&config, &report.notices);
        }

        Commands::Dbgon { file } => {
            let (source, root) = load(&file)?;
            let mut shell = Shell::new(io::stdin().lock(), io::stdout());
            let notices = exec::run_and_inspect(root.as_ref(), &config, io::stdout(), &mut shell)
                .map_err(|e| with_source(e, &file, &source))?;
            echo(&config, &notices);
        }

        Commands::Shell => {
            Shell::new(io::stdin().lock(), io::stdout())
                .run()
                .into_diagnostic()?;
        }

        Commands::Ast { file, dot, json } => {
            let (_, root) = load(&file)?;
            let Some(root) = root else {
                eprintln!("AST empty");
                return Ok(());
            };
            let text = if json {
                serde_json::to_string_pretty(&root).into_diagnostic()?
            } else if dot {
                render::dot(&root)
            } else {
                render::tree(&root)
            };
            let mut out = io::stdout().lock();
            writeln!(out, "{}", text.trim_end()).into_diagnostic()?;
        }

        Commands::Export { file } => {
            let (source, root) = load(&file)?;
            let report = exec::run_program(root.as_ref(), &config, io::sink())
                .map_err(|e| with_source(e, &file, &source))?;
            echo(&config, &report.notices);
            let json = serde_json::to_string_pretty(&report.database.export()).into_diagnostic()?;
            println!("{json}");
        }
    }

    Ok(())
}
