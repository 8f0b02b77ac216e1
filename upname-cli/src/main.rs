use clap::Parser;
use std::io::{self, IsTerminal};
use std::process;

mod apply;
mod cli;
mod plan;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let use_color = !cli.no_color && io::stdout().is_terminal();

    let result = match cli.command {
        Commands::Plan {
            roots,
            selection,
            preview,
            csv,
            json,
        } => plan::handle_plan(
            &roots,
            &selection.to_options(),
            preview.into(),
            csv,
            json,
            use_color,
        ),

        Commands::Apply {
            roots,
            selection,
            preview,
            csv,
            log,
        } => apply::handle_apply(
            &roots,
            &selection.to_options(),
            preview.into(),
            csv,
            log,
            cli.yes,
            use_color,
        ),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");

            let message = format!("{e:#}");
            let exit_code = if message.contains("non-interactive") {
                3 // Needs a TTY or --yes
            } else if message.contains("invalid root") {
                2 // Bad arguments
            } else {
                1
            };

            process::exit(exit_code);
        },
    }
}
