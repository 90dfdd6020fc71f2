//! Command-line interface for command-tree
//! Registers a set of usages, parses one input line against them and shows what matched.
//!
//! Usage:
//!   command-tree -c `<usage>` [-c `<usage>@<priority>` ...] `<input>`   - Match input against usages
//!   command-tree -c `<usage>` --json `<input>`                         - Print the full parse report
//!   command-tree -c `<usage>` --set `<key>=<value>` `<input>`          - Override a config value
//!
//! Exit codes: 0 when the input matched, 1 when it did not, 2 when the usages or config are invalid.

use clap::{Arg, ArgAction, Command};
use command_tree::commands::config::Loader;
use command_tree::{Arguments, CommandTree, Commands, CommandsConfig, Executable, ParseResult, SetupError};
use config::ConfigError;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    init_logging();

    let matches = Command::new("command-tree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Match a command line against a set of command usages")
        .arg_required_else_help(true)
        .arg(
            Arg::new("input")
                .help("The command line to match")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("command")
                .long("command")
                .short('c')
                .value_name("USAGE")
                .help("A command usage, e.g. 'greet <name:word> [times:int]'; append '@N' for priority N")
                .required(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("KEY=VALUE")
                .help("Override one config value, e.g. 'suggestions.limit=5'")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the full parse report as JSON")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let usages: Vec<&String> = matches
        .get_many::<String>("command")
        .map(|values| values.collect())
        .unwrap_or_default();
    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or_default();

    let overrides: Vec<&str> = matches
        .get_many::<String>("set")
        .map(|values| values.map(String::as_str).collect())
        .unwrap_or_default();

    let config = load_config(matches.get_one::<String>("config"), &overrides).unwrap_or_else(|e| {
        eprintln!("Config error: {}", e);
        std::process::exit(2);
    });

    let commands = build_commands(&usages, config).unwrap_or_else(|e| {
        eprintln!("Setup error: {}", e);
        std::process::exit(2);
    });

    let result = commands.parse((), input).unwrap_or_else(|e| {
        eprintln!("Setup error: {}", e);
        std::process::exit(2);
    });

    let matched = if matches.get_flag("json") {
        print_json(&result)
    } else {
        print_text(&result)
    };
    std::process::exit(if matched { 0 } else { 1 });
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Split `usage@priority`. A trailing `@` part that is not a number belongs to the usage.
fn split_priority(raw: &str) -> (&str, i32) {
    match raw.rsplit_once('@') {
        Some((usage, priority)) => match priority.trim().parse() {
            Ok(priority) => (usage.trim(), priority),
            Err(_) => (raw.trim(), 0),
        },
        None => (raw.trim(), 0),
    }
}

fn load_config(file: Option<&String>, overrides: &[&str]) -> Result<CommandsConfig, ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = file {
        loader = loader.with_file(path);
    }
    loader.with_overrides(overrides.iter().copied())?.build()
}

fn build_commands(usages: &[&String], config: CommandsConfig) -> Result<Commands<(), String>, SetupError> {
    let mut tree = CommandTree::new().with_config(config);
    for raw in usages {
        let (usage, priority) = split_priority(raw);
        let label = usage.to_string();
        let executable = Executable::new(move |_: &(), _: &Arguments| label.clone())
            .with_priority(priority)
            .with_label(usage);
        tree.register(usage, executable)?;
    }
    Ok(tree.freeze())
}

fn print_json(result: &ParseResult<(), String>) -> bool {
    let report = serde_json::to_string_pretty(&result.report()).unwrap_or_else(|e| {
        eprintln!("Error formatting report: {}", e);
        std::process::exit(2);
    });
    println!("{}", report);
    result.best_match().is_some()
}

fn print_text(result: &ParseResult<(), String>) -> bool {
    if let Some(found) = result.best_match() {
        println!("matched: {}", found.execute());
        println!("priority: {}", found.priority());
        for (id, value) in found.arguments().iter() {
            match value {
                Some(value) => println!("  {} = {}", id, value),
                None => println!("  {} = (absent)", id),
            }
        }
        return true;
    }

    println!("{}", result.outcome());
    if let Some(completion) = result.completion() {
        let texts: Vec<&str> = completion.suggestions.iter().map(|s| s.text()).collect();
        println!("suggestions at {}: {}", completion.position, texts.join(", "));
    }
    false
}
