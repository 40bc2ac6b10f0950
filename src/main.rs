use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tally::{Config, Expr, Gateway, MemoryStore};
use tracing_subscriber::EnvFilter;

/// Scientific calculator engine
#[derive(Parser, Debug)]
#[command(name = "tally", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one expression and print its result
    Eval {
        /// Expression to evaluate, several arguments are joined by spaces
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        expression: Vec<String>,

        /// Also print the expression fully parenthesized, as it was parsed
        #[arg(long, short)]
        grouping: bool,
    },
    /// Answer JSON requests read line by line from stdin
    Serve,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Eval {
            expression,
            grouping,
        } => {
            for line in eval_lines(&expression.join(" "), grouping)? {
                println!("{}", line);
            }
        }
        Command::Serve => {
            let gateway = Gateway::with_config(MemoryStore::new(), config.history);
            let stdin = io::stdin();
            let stdout = io::stdout();
            gateway
                .serve(stdin.lock(), BufWriter::new(stdout.lock()))
                .context("request transport failed")?;
        }
    }
    Ok(())
}

/// Output of `tally eval`: the grouping if asked for, then the result and
/// its operation type
fn eval_lines(input: &str, grouping: bool) -> Result<Vec<String>> {
    let evaluation = tally::evaluate(input)?;
    let mut lines = Vec::with_capacity(2);
    if grouping {
        let expr = Expr::parse(&evaluation.expression)?;
        lines.push(expr.ast().to_string());
    }
    lines.push(format!(
        "{} ({})",
        format_result(evaluation.result),
        evaluation.operation_type
    ));
    Ok(lines)
}

/// Whole numbers without a fractional part, infinities spelled out
fn format_result(result: f64) -> String {
    if result.is_infinite() {
        return if result > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if result.fract() == 0.0 && result.abs() < 1e15 {
        format!("{:.0}", result)
    } else {
        format!("{}", result)
    }
}
