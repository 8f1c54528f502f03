use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &["events-text", "events-json"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let path_arg = || {
        Arg::new("path")
            .help("Path to the document")
            .required(true)
            .index(1)
            .value_hint(ValueHint::FilePath)
    };
    let from_arg = || {
        Arg::new("from")
            .long("from")
            .help("Source syntax")
            .value_hint(ValueHint::Other)
    };

    let mut cmd = Command::new("mdbridge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert documents between Markdown dialects")
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available syntaxes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the event stream of a document")
                .arg(path_arg())
                .arg(
                    Arg::new("transform")
                        .index(2)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            AVAILABLE_TRANSFORMS,
                        )),
                )
                .arg(from_arg()),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a document between syntaxes")
                .arg(path_arg())
                .arg(from_arg())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target syntax")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "mdbridge", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "mdbridge", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "mdbridge", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
