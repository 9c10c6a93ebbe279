use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use pedpha::config::Config;
use std::io::{self, BufWriter};
use std::path::PathBuf;

fn main() -> Result<()> {
    let matches = Command::new("pedpha")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Map protein intervals onto the exons of GFF gene models, reporting genomic spans and phases.")
        .arg(
            Arg::new("gff")
                .short('g')
                .long("gff")
                .value_name("GFF")
                .help("GFF file formatted according to JGI standards (like phytozome); reads stdin when absent")
                .required(false),
        )
        .arg(
            Arg::new("intervals")
                .short('i')
                .long("intervals")
                .value_name("INTER")
                .help("File containing protein intervals (mRNA_ident, interval_ident, start, stop); lists the parsed gene models when absent")
                .required(false),
        )
        .arg(
            Arg::new("delimiter")
                .short('d')
                .long("delimiter")
                .value_name("DEL")
                .help("INTER file delimiter (defaults to whitespace)")
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Log more (repeat for debug output)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .help("Log errors only"),
        )
        .get_matches();

    let level = match (matches.get_flag("quiet"), matches.get_count("verbose")) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config {
        gff: matches.get_one::<String>("gff").map(PathBuf::from),
        intervals: matches.get_one::<String>("intervals").map(PathBuf::from),
        delimiter: matches.get_one::<String>("delimiter").cloned(),
    };

    let stdout = io::stdout();
    pedpha::run(&config, BufWriter::new(stdout.lock()))
}
