use std::path::PathBuf;
use std::process;

use getopts::{Matches, Options};
use ics_to_csv::DEFAULT_OUTPUT;

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub input: PathBuf,
    pub output: PathBuf,
    pub verbose: bool,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optflag("V", "version", "Print the version and exit");
    opts.optopt(
        "o",
        "output",
        "Output CSV file [Default: working_hours.csv]",
        "FILE",
    );
    opts.optflag("v", "verbose", "Log every pipeline step");
    opts
}

fn usage(opts: &Options) -> String {
    let brief = format!(
        "{} ICS_FILE\n\nConvert the timed events of an ICS file into a working-hours CSV report.",
        opts.short_usage(env!("CARGO_PKG_NAME"))
    );
    opts.usage(&brief)
}

pub fn parse(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", usage(&opts));
        process::exit(0);
    }

    if matches.opt_present("version") {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    match Args::from_matches(&matches) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{} ICS_FILE", opts.short_usage(env!("CARGO_PKG_NAME")));
            process::exit(1);
        }
    }
}

impl Args {
    fn from_matches(matches: &Matches) -> Result<Self, String> {
        let input = match matches.free.as_slice() {
            [input] => PathBuf::from(input),
            [] => return Err("Missing required argument 'ICS_FILE'".into()),
            [_, extra, ..] => return Err(format!("Unexpected argument '{extra}'")),
        };

        let output = matches
            .opt_str("output")
            .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT), PathBuf::from);

        Ok(Args {
            input,
            output,
            verbose: matches.opt_present("verbose"),
        })
    }
}
