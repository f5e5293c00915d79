use std::io::{self, Read, Write};

use clap::{Parser as ClapParser, Subcommand};
use jsonquery::cli::{
    self, CliError, DecodeOptions, EncodeOptions, EvalOptions, execute_decode, execute_encode,
    execute_eval,
};
use jsonquery::config::QueryConfig;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "jsonquery")]
#[command(about = "Query JSON with JMESPath, let-scoping and parameters; convert JSON to and from MessagePack")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a query against a JSON document
    Eval {
        /// The query to evaluate
        query: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Bind a parameter, as name=JSON (repeatable)
        #[arg(short = 'P', long = "param")]
        params: Vec<String>,

        /// Log the compiled AST and result
        #[arg(short, long)]
        debug: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Encode JSON as MessagePack (hex unless --raw)
    Encode {
        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Write raw bytes instead of hex
        #[arg(long)]
        raw: bool,
    },

    /// Decode MessagePack from stdin into JSON
    Decode {
        /// Input is hex text rather than raw bytes
        #[arg(long)]
        hex: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let mut config = QueryConfig::from_env();
    if let Commands::Eval { debug: true, .. } = cli.command {
        config.debug = true;
    }

    if let Err(e) = init_tracing(&config.log_filter()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Commands::Eval {
            query,
            input,
            params,
            pretty,
            ..
        } => read_text(input).and_then(|input| {
            let options = EvalOptions {
                query,
                input,
                params,
                pretty,
                config,
            };
            execute_eval(&options, &mut out)
        }),
        Commands::Encode { input, raw } => read_text(input).and_then(|input| {
            execute_encode(&EncodeOptions { input, raw }, &mut out)
        }),
        Commands::Decode { hex } => read_bytes().and_then(|input| {
            execute_decode(&DecodeOptions { input, hex, config }, &mut out)
        }),
    };

    if let Err(e) = result.and_then(|()| out.flush().map_err(CliError::Io)) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(directives: &str) -> Result<(), String> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(directives)
            .map_err(|e| format!("invalid log level filter: {directives}: {e}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    Ok(())
}

/// Uses `input` when given, else stdin when it is not a terminal.
fn read_text(input: Option<String>) -> Result<Option<String>, cli::CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn read_bytes() -> Result<Option<Vec<u8>>, cli::CliError> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;
    Ok(Some(buffer))
}
