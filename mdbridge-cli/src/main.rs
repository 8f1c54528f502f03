// Command-line interface for mdbridge
//
// This binary converts documents between the Markdown dialects known to the mdbridge library,
// and shows the event stream a document parses into.
//
// Converting:
//
// The conversion needs a from and to pair. The from can be auto-detected from the file
// extension, while being overridable by an explicit --from flag. Both fall back to the
// [convert] table of the configuration.
// Usage:
//  mdbridge <input> --to <syntax> [--from <syntax>] [--output <file>]  - Convert (default)
//  mdbridge convert <input> --to <syntax> [--from <syntax>] [--output <file>]
//  mdbridge inspect <path> [<transform>] [--from <syntax>]  - Show the event stream
//  mdbridge --list-formats                                  - List available syntaxes
//
// Extra Parameters:
//
// Configuration keys can be overridden with --extra-<parameter-name> <value>.
// Example:
//  mdbridge inspect deep.md --extra-max-depth 16

mod transforms;

use clap::{Arg, ArgAction, Command, ValueHint};
use mdbridge::FormatRegistry;
use mdbridge_config::{BridgeConfig, Loader};
use std::collections::HashMap;
use std::fs;
use tracing_subscriber::EnvFilter;

const LOCAL_CONFIG: &str = "mdbridge.toml";

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("mdbridge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert documents between Markdown dialects")
        .long_about(
            "mdbridge parses Markdown into a stream of document events and renders event\n\
            streams back as Markdown, so any supported dialect can be converted into any other.\n\n\
            Commands:\n  \
            - convert: Convert a document between syntaxes (default)\n  \
            - inspect: Show the event stream a document parses into\n\n\
            Examples:\n  \
            mdbridge notes.md --to commonmark/0.27          # Convert (outputs to stdout)\n  \
            mdbridge notes.md --to plain/1.0 -o notes.txt   # Convert to a file\n  \
            mdbridge inspect notes.md events-json           # Events as JSON",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available syntaxes")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a mdbridge.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log pipeline stages to stderr (repeat for more detail)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the event stream of a document")
                .arg(
                    Arg::new("path")
                        .help("Path to the document")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Event view to print. Defaults to 'events-text'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source syntax (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a document between syntaxes (default command)")
                .long_about(
                    "Convert a document from one syntax to another.\n\n\
                    Syntaxes are named by id, e.g. markdown/1.2 or commonmark/0.27.\n\
                    Use --list-formats to see them all.\n\n\
                    The source syntax is auto-detected from the file extension, then taken\n\
                    from the configuration. Output goes to stdout by default, or use -o to\n\
                    specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source syntax (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target syntax (defaults to [convert] to in the configuration)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A bare file argument means the default convert command.
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && cleaned_args[1] != "inspect"
                && cleaned_args[1] != "convert"
                && cleaned_args[1] != "help"
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_logging(matches.get_count("verbose"));

    let config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        &extra_params,
    );
    let registry = build_registry(&config);

    if matches.get_flag("list-formats") {
        handle_list_formats_command(&registry);
        return;
    }

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let Some(path) = sub_matches.get_one::<String>("path") else {
                fail("path is required");
            };
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            let from = resolve_from(
                &registry,
                path,
                sub_matches.get_one::<String>("from"),
                &config,
            );
            handle_inspect_command(&registry, path, &from, transform);
        }
        Some(("convert", sub_matches)) => {
            let Some(input) = sub_matches.get_one::<String>("input") else {
                fail("input is required");
            };
            let from = resolve_from(
                &registry,
                input,
                sub_matches.get_one::<String>("from"),
                &config,
            );
            let to = sub_matches
                .get_one::<String>("to")
                .cloned()
                .unwrap_or_else(|| config.convert.to.clone());
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&registry, input, &from, &to, output);
        }
        _ => fail("Unknown subcommand. Use --help for usage information."),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

/// Source syntax: explicit flag, then file extension, then configuration.
fn resolve_from(
    registry: &FormatRegistry,
    input: &str,
    explicit: Option<&String>,
    config: &BridgeConfig,
) -> String {
    if let Some(from) = explicit {
        return from.clone();
    }
    match registry.detect_format_from_filename(input) {
        Some(detected) => detected,
        None => {
            tracing::debug!(input, fallback = %config.convert.from, "no syntax for file extension");
            config.convert.from.clone()
        }
    }
}

/// Handle the inspect command
fn handle_inspect_command(registry: &FormatRegistry, path: &str, from: &str, transform: &str) {
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });

    let output =
        transforms::execute_transform(registry, &source, from, transform).unwrap_or_else(|e| {
            eprintln!("Execution error: {e}");
            std::process::exit(1);
        });

    print!("{output}");
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
) {
    // Validate syntaxes exist
    if let Err(e) = registry.get(from) {
        fail(&e.to_string());
    }
    if let Err(e) = registry.get(to) {
        fail(&e.to_string());
    }

    let source = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    let events = registry.parse_events(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let text = registry.serialize(&events, to).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });

    match output {
        Some(path) => {
            fs::write(path, format!("{text}\n")).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => println!("{text}"),
    }
}

/// Handle the list-formats command
fn handle_list_formats_command(registry: &FormatRegistry) {
    println!("Available syntaxes:\n");
    for name in registry.list_formats() {
        let description = registry
            .get(&name)
            .map(|format| format.description())
            .unwrap_or_default();
        println!("  {name:<22}{description}");
    }
}

fn load_cli_config(
    explicit_path: Option<&str>,
    extra_params: &HashMap<String, String>,
) -> BridgeConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    apply_config_overrides(loader, extra_params)
        .and_then(Loader::build)
        .unwrap_or_else(|err| {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(1);
        })
}

/// Map `--extra-*` parameters onto configuration keys.
fn apply_config_overrides(
    mut loader: Loader,
    extra_params: &HashMap<String, String>,
) -> Result<Loader, mdbridge_config::ConfigLoadError> {
    for (key, raw) in extra_params {
        loader = match key.as_str() {
            "max-depth" => {
                let depth: i64 = raw.parse().unwrap_or_else(|_| {
                    eprintln!("Invalid number '{raw}' for --extra-max-depth");
                    std::process::exit(1);
                });
                loader.set_override("parse.max_depth", depth)?
            }
            "from" => loader.set_override("convert.from", raw.as_str())?,
            "to" => loader.set_override("convert.to", raw.as_str())?,
            other => {
                eprintln!("Unknown parameter --extra-{other}");
                std::process::exit(1);
            }
        };
    }
    Ok(loader)
}

fn build_registry(config: &BridgeConfig) -> FormatRegistry {
    let dialects = config.dialects().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    });
    FormatRegistry::with_dialects(dialects)
}
