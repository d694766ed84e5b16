use brace_lang::cli::{self, CheckOptions, CheckResult, CliError};
use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(ClapParser)]
#[command(name = "brace")]
#[command(about = "Brace - An embeddable expression and template language")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and evaluate an expression
    Check {
        /// The expression to evaluate
        expression: String,

        /// JSON object of variable bindings (reads from stdin if piped)
        #[arg(short, long)]
        input: Option<String>,

        /// Treat the expression as the body of a template string
        #[arg(short, long)]
        template: bool,

        /// Print the parsed AST as JSON instead of evaluating
        #[arg(long)]
        ast: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,
    },

    /// Check whether a schema version is supported
    VersionCheck {
        /// Version in MAJOR.MINOR.PATCH form
        version: String,
    },
}

fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(EnvFilter::from_default_env())
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            expression,
            input,
            template,
            ast,
            pretty,
            syntax_only,
        } => run_check(CheckOptions {
            expression,
            input,
            template,
            ast,
            pretty,
            syntax_only,
        }),
        Commands::VersionCheck { version } => run_version_check(&version),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{}", json);
    Ok(())
}

fn run_check(mut options: CheckOptions) -> Result<bool, CliError> {
    if options.input.is_none() && !options.syntax_only && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.input = Some(buffer);
    }

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Ast(ast) => print_json(&ast, options.pretty)?,
        CheckResult::Success(output) => print_json(&output, options.pretty)?,
    }
    Ok(true)
}

fn run_version_check(version: &str) -> Result<bool, CliError> {
    let report = cli::execute_version_check(version)?;
    print_json(&report.to_json(), false)?;
    Ok(report.supported)
}
