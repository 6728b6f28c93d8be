mod commands;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use commands::{cmd_lex, cmd_parse, cmd_translate, TranslateOptions};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// xtUML model validator and TypeScript translator.
#[derive(Parser)]
#[command(name = "xtuml", version, about = "xtUML model validator and TypeScript translator")]
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
    /// Validate a model JSON file and print its diagnostics
    Parse {
        /// Path to the model JSON file
        file: PathBuf,
    },

    /// Validate a model and translate it to TypeScript
    Translate {
        /// Path to the model JSON file
        file: PathBuf,
        /// Write the generated source here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Omit the banner header
        #[arg(long)]
        no_header: bool,
        /// Record the generation time in the header
        #[arg(long)]
        timestamp: bool,
    },

    /// Print the OAL token stream of a file (`-` reads stdin)
    Lex {
        /// Path to an OAL snippet, or `-`
        file: PathBuf,
    },
}

/// Log filter from `XTUML_LOG`; `warn` by default, `error` with `--quiet`.
fn init_tracing(quiet: bool) {
    let fallback = if quiet { "error" } else { "warn" };
    let filter = EnvFilter::try_from_env("XTUML_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match cli.command {
        Commands::Parse { file } => {
            cmd_parse(&file, cli.output, cli.quiet);
        }
        Commands::Translate {
            file,
            out,
            no_header,
            timestamp,
        } => {
            cmd_translate(
                &file,
                TranslateOptions {
                    out: out.as_deref(),
                    header: !no_header,
                    timestamp,
                },
                cli.output,
                cli.quiet,
            );
        }
        Commands::Lex { file } => {
            cmd_lex(&file, cli.output, cli.quiet);
        }
    }
}

/// Read `path`, or stdin for `-`. Exits on failure.
pub(crate) fn read_input(path: &Path, output: OutputFormat, quiet: bool) -> String {
    let result = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map(|_| buf)
    } else {
        std::fs::read_to_string(path)
    };
    match result {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
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
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
