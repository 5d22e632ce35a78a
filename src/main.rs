mod cli;

use std::env;

use anyhow::{Context, Result};
use ics_to_csv::{convert, Outcome};
use log::{debug, warn};

fn setup_logging(verbose: bool) {
    let default_filter = if verbose {
        "ics_to_csv=debug"
    } else {
        "ics_to_csv=info"
    };

    pretty_env_logger::formatted_builder()
        .parse_filters(default_filter)
        .parse_env("LOG")
        .init();
}

fn main() -> Result<()> {
    let args = cli::parse(env::args().skip(1).collect());

    setup_logging(args.verbose);
    debug!("Output path is {}", args.output.display());

    let outcome = convert(&args.input, &args.output).with_context(|| {
        format!(
            "Failed to convert {} to {}",
            args.input.display(),
            args.output.display()
        )
    })?;

    match outcome {
        Outcome::Written(count) => {
            println!("Converted {count} events to {}", args.output.display());
        }
        Outcome::NoEvents => warn!("No events found in {}", args.input.display()),
    }

    Ok(())
}
