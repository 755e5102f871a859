use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

use clustertop::commands;

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("Path to a config file (defaults to the user config directory)")
        .value_parser(value_parser!(PathBuf))
}

fn build_cli() -> Command {
    Command::new("clustertop")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live cluster monitor: YARN node capabilities, PDU power and topology")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("monitor")
                .about("Open the live cluster dashboard")
                .arg(config_arg())
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Refresh interval in milliseconds")
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Print the cluster view as JSON")
                .arg(config_arg())
                .arg(
                    Arg::new("watch")
                        .short('w')
                        .long("watch")
                        .help("Keep printing a line per refresh until Ctrl+C")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("pretty")
                        .short('p')
                        .long("pretty")
                        .help("Pretty-print the JSON output")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or create the configuration file")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("path").about("Print the default config file path"))
                .subcommand(
                    Command::new("show")
                        .about("Show the effective configuration")
                        .arg(config_arg()),
                )
                .subcommand(
                    Command::new("init")
                        .about("Write a config file with default values")
                        .arg(config_arg())
                        .arg(
                            Arg::new("force")
                                .short('f')
                                .long("force")
                                .help("Overwrite an existing file")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // The dashboard owns the terminal and shows fetch failures itself
    let level = match (matches.get_flag("verbose"), matches.subcommand_name()) {
        (_, Some("monitor")) => log::LevelFilter::Error,
        (true, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Info,
    };
    clustertop::init_logging_with(level);

    match matches.subcommand() {
        Some(("monitor", sub_matches)) => commands::monitor::execute(sub_matches)?,
        Some(("snapshot", sub_matches)) => commands::snapshot::execute(sub_matches)?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches)?,
        _ => {
            println!("Welcome to clustertop!");
            println!("Use 'clustertop --help' for more information.");
        }
    }

    Ok(())
}
