use clap::{Parser, ValueEnum};
use flowbridge::diagnostics::LogLevel;
use flowbridge::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Direction choices for the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionCli {
    /// Node graph -> module graph
    Forward,
    /// Module graph -> node graph
    Reverse,
    /// Detect from the document's shape
    Auto,
}

/// Converts workflows between the node-graph and module-graph formats
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the source workflow JSON file
    workflow_path: Option<String>,
    /// Path to the mapping database JSON file
    mappings_path: Option<String>,

    /// Conversion direction
    #[arg(short, long, value_enum, default_value = "auto")]
    direction: DirectionCli,

    /// Optional path to a conversion options JSON file
    #[arg(short, long)]
    options: Option<String>,

    /// Write the converted workflow here instead of printing the full result
    #[arg(short = 'O', long)]
    output: Option<String>,

    /// Abort on the first unmapped or failing entity
    #[arg(long)]
    strict: bool,

    /// Reuse source ids where the target format allows it
    #[arg(long)]
    preserve_ids: bool,

    /// Attach per-entity detail to the debug info
    #[arg(long)]
    debug: bool,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.human {
        run_interactive();
    } else {
        run_non_interactive(cli);
    }
}

fn run_conversion(
    workflow_path: String,
    mappings_path: String,
    direction: DirectionCli,
    options: ConversionOptions,
    output: Option<String>,
) {
    let total_start = Instant::now();

    // --- 1. Loading ---
    let registry = MappingRegistry::from_loader(&JsonMappingLoader::from_file(&mappings_path))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load mappings '{}': {}", mappings_path, e)));
    let workflow_json = fs::read_to_string(&workflow_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read workflow file '{}': {}", workflow_path, e)));
    let workflow: serde_json::Value = serde_json::from_str(&workflow_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse workflow JSON: {}", e)));
    let load_duration = total_start.elapsed();

    // --- 2. Conversion ---
    let convert_start = Instant::now();
    let converter = Converter::new(&registry).with_options(options);
    let result = match direction {
        DirectionCli::Forward => converter.convert(&workflow, Direction::Forward),
        DirectionCli::Reverse => converter.convert(&workflow, Direction::Reverse),
        DirectionCli::Auto => converter.convert_auto(&workflow),
    };
    let convert_duration = convert_start.elapsed();

    // --- 3. Output ---
    match output {
        Some(path) => {
            let text = serde_json::to_string_pretty(&result.converted_workflow)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize workflow: {}", e)));
            fs::write(&path, text)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e)));
            print_summary(&result);
        }
        None => {
            let text = serde_json::to_string_pretty(&result)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize result: {}", e)));
            println!("{}", text);
        }
    }

    eprintln!("\n--- Performance Summary ---");
    eprintln!("Loading:     {:?}", load_duration);
    eprintln!("Conversion:  {:?}", convert_duration);
    eprintln!("Total:       {:?}", total_start.elapsed());

    if result.is_fatal() {
        std::process::exit(1);
    }
}

fn print_summary(result: &ConversionResult) {
    let info = &result.debug_info;
    println!(
        "Converted {} entities ({} mapped, {} placeholders)",
        info.converted_entity_count, info.mapped_count, info.unmapped_count
    );
    for entry in result.logs.iter().filter(|l| l.level != LogLevel::Info) {
        println!("  [{}] {}", entry.level, entry.message);
    }
    if !result.parameters_needing_review.is_empty() {
        println!("\nParameters needing review:");
        for review in &result.parameters_needing_review {
            println!("  {} ({}) {}: {}", review.entity_name, review.entity_id, review.path, review.reason);
        }
    }
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let workflow_path = cli
        .workflow_path
        .unwrap_or_else(|| exit_with_error("Workflow path is required in non-interactive mode."));
    let mappings_path = cli
        .mappings_path
        .unwrap_or_else(|| exit_with_error("Mappings path is required in non-interactive mode."));

    let options = match &cli.options {
        Some(path) => {
            let json = fs::read_to_string(path)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to read options file '{}': {}", path, e)));
            ConversionOptions::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse options: {}", e)))
        }
        None => ConversionOptions::new(),
    };
    let (strict, preserve_ids, debug) = (
        options.strict_mode || cli.strict,
        options.preserve_ids || cli.preserve_ids,
        options.debug || cli.debug,
    );
    let options = options.strict(strict).preserve_ids(preserve_ids).debug(debug);

    run_conversion(workflow_path, mappings_path, cli.direction, options, cli.output);
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive() {
    println!("--- Flowbridge Interactive Mode ---");

    let workflow_path = prompt_for_input("Enter workflow path", Some("data/workflow.json"));
    let mappings_path = prompt_for_input("Enter mappings path", Some("data/mappings.json"));

    let direction = loop {
        println!("\nPlease select a direction:");
        println!("  1: Auto (detect from the document)");
        println!("  2: Forward (node graph -> module graph)");
        println!("  3: Reverse (module graph -> node graph)");
        match prompt_for_input("Enter choice", Some("1")).trim() {
            "1" => break DirectionCli::Auto,
            "2" => break DirectionCli::Forward,
            "3" => break DirectionCli::Reverse,
            _ => println!("Invalid choice. Please enter 1, 2 or 3."),
        }
    };
    let strict = prompt_for_input("Strict mode? (y/n)", Some("n")).eq_ignore_ascii_case("y");

    run_conversion(
        workflow_path,
        mappings_path,
        direction,
        ConversionOptions::new().strict(strict),
        None,
    );
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or(String::new(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    if io::stdout().flush().is_err() || io::stdin().read_line(&mut line).is_err() {
        exit_with_error("Failed to read from the terminal");
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
