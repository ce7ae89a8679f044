// Main entry point for the RustyQL CLI
// Loads a store (from a JSON file or the built-in demo data) and runs SELECT queries against it

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use rustyql::{QueryExecutor, QueryResult, Row, Store};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// RustyQL - run SELECT statements against an in-memory store
#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with the store: {"table": [{"column": value, ...}, ...]}
    /// (default: a built-in `records` table)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Execute a single SQL query and exit
    #[arg(short, long)]
    execute: Option<String>,

    /// Print results as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so query output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let store = match &args.data {
        Some(path) => load_store(path)?,
        None => demo_store(),
    };
    tracing::info!(tables = ?store.table_names(), "store loaded");

    let executor = QueryExecutor::new(&store);

    // If a query was provided, execute it and exit
    if let Some(sql) = args.execute {
        return execute_query(&executor, &sql, args.json);
    }

    println!("╔════════════════════════════════════════════╗");
    println!("║         RustyQL Interactive Shell          ║");
    println!("╚════════════════════════════════════════════╝");
    println!();
    println!("Type SELECT queries or '.help' for help");
    println!("Type '.exit' to quit");
    println!();

    repl(&store, |sql| execute_query(&executor, sql, args.json))
}

/// Read a store from a JSON file
fn load_store(path: &Path) -> Result<Store> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Store::from_reader(BufReader::new(file))
        .with_context(|| format!("reading store from {}", path.display()))
}

/// The data used when no --data file is given
fn demo_store() -> Store {
    let rows = (1..=4)
        .map(|i| {
            Row::new()
                .with("id", i)
                .with("name", format!("Name{}", i))
                .with("description", "Some description")
                .with("value", i * 10)
        })
        .collect();

    let mut store = Store::new();
    store.insert_table("records", rows);
    store
}

/// REPL (Read-Eval-Print Loop)
/// Errors from a query are printed and the loop keeps going
fn repl<F>(store: &Store, mut execute_fn: F) -> Result<()>
where
    F: FnMut(&str) -> Result<()>,
{
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("rustyql> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            // EOF (Ctrl-D)
            println!();
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('.') {
            match input {
                ".exit" | ".quit" => {
                    println!("Goodbye!");
                    break;
                }
                ".help" => print_help(),
                ".tables" => {
                    for name in store.table_names() {
                        println!("  {}", name);
                    }
                }
                _ => {
                    println!("Unknown command: {}", input);
                    println!("Type '.help' for help");
                }
            }
            continue;
        }

        if let Err(e) = execute_fn(input) {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

/// Run one query and print its rows
fn execute_query(executor: &QueryExecutor, sql: &str, json: bool) -> Result<()> {
    let result: QueryResult = executor.query(sql)?;
    if json {
        println!("{}", result.to_json()?);
    } else {
        println!("{}", result.format());
    }
    Ok(())
}

fn print_help() {
    println!("Special Commands:");
    println!("  .help              Show this help message");
    println!("  .tables            List the tables in the store");
    println!("  .exit, .quit       Exit the shell");
    println!();
    println!("Query syntax:");
    println!("  SELECT * FROM records");
    println!("  SELECT id, name FROM records WHERE value > 30 OR name = 'Name2'");
    println!("  SELECT * FROM records WHERE id IN (1, 3) AND value >= 10.5");
    println!("  SELECT * FROM records WHERE id NOT IN (2)");
    println!();
    println!("Notes:");
    println!("  - Keywords are case-insensitive, names and strings are not");
    println!("  - Operators: = != <> > >= < <= IN, NOT IN");
    println!("  - AND binds tighter than OR; parentheses can't group conditions");
    println!();
}
