use clap::{Parser as ClapParser, Subcommand};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use trellis::{
    OperatorRegistry,
    cli::{self, CliError, EvalOptions, Verbosity},
};

#[derive(ClapParser)]
#[command(name = "trellis")]
#[command(about = "Trellis - evaluate (( operator )) calls embedded in JSON documents")]
#[command(version)]
struct Cli {
    /// Print debugging output
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    /// Print trace output (implies --debug)
    #[arg(short = 'T', long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every operator call in a JSON document
    Eval {
        /// JSON input (reads --file or stdin if not provided)
        #[arg(short, long, conflicts_with = "file")]
        input: Option<String>,

        /// Read the JSON document from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Check that every operator call parses, without running any
        #[arg(long)]
        skip_eval: bool,
    },

    /// List registered operators
    Ops,
}

fn main() {
    let cli = Cli::parse();

    let verbosity = if cli.trace {
        Verbosity::Trace
    } else if cli.debug {
        Verbosity::Debug
    } else {
        Verbosity::Env
    };
    cli::init_tracing(verbosity);

    if let Err(e) = run(cli.command) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    let registry = OperatorRegistry::builtin()?;

    match command {
        Commands::Eval {
            input,
            file,
            pretty,
            skip_eval,
        } => run_eval(&registry, input, file, pretty, skip_eval),
        Commands::Ops => {
            for line in cli::describe_operators(&registry) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

fn run_eval(
    registry: &OperatorRegistry,
    input: Option<String>,
    file: Option<PathBuf>,
    pretty: bool,
    skip_eval: bool,
) -> Result<(), CliError> {
    let input = match (input, file) {
        (Some(s), _) => Some(s),
        (None, Some(path)) => Some(fs::read_to_string(path)?),
        (None, None) if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        (None, None) => None,
    };

    let options = EvalOptions { input, skip_eval };
    let output = cli::execute_eval(&options, registry)?;

    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }?;
    println!("{}", json);
    Ok(())
}
