extern crate chrono;
extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
extern crate repo_auth;
extern crate shellexpand;
extern crate structopt;

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use chrono::Local;
use env_logger::Builder;
use failure::{Error, ResultExt};
use log::LevelFilter;
use repo_auth::{Config, Driver, Task};
use structopt::StructOpt;

fn main() {
    let args = Args::from_args();

    let outcome = if args.example_config {
        generate_example()
    } else {
        run(&args)
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);

        for cause in e.iter_chain().skip(1) {
            eprintln!("\tCaused By: {}", cause);
        }

        if log_enabled!(log::Level::Debug) {
            eprintln!("{}", e.backtrace());
        }

        process::exit(1);
    }
}

fn generate_example() -> Result<(), Error> {
    let example = Config::example_toml()?;

    print!("{}", example);
    Ok(())
}

fn run(args: &Args) -> Result<(), Error> {
    initialize_logging(args)?;
    let (cfg, base_dir) = args.config()?;

    if log_enabled!(log::Level::Debug) {
        for line in format!("{:#?}", cfg).lines() {
            debug!("{}", line);
        }
    }

    let driver = Driver::with_config(cfg, base_dir)
        .with_property_overrides(args.properties.iter().cloned());

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    driver.run(args.task(), &mut stdout)?;

    Ok(())
}

#[derive(Debug, Clone, PartialEq, StructOpt)]
#[structopt(about = "Register authenticated remote repositories.")]
struct Args {
    #[structopt(
        short = "c",
        long = "config",
        default_value = "repo-auth.toml",
        help = "The configuration file to use."
    )]
    config_file: String,
    #[structopt(
        short = "v",
        long = "verbose",
        parse(from_occurrences),
        help = "Verbose output (repeat for more verbosity)"
    )]
    verbosity: u64,
    #[structopt(
        short = "P",
        long = "property",
        number_of_values = 1,
        parse(try_from_str = parse_property),
        help = "Set a property (key=value), overriding every other source."
    )]
    properties: Vec<(String, String)>,
    #[structopt(
        long = "example-config",
        help = "Generate an example config and immediately exit."
    )]
    example_config: bool,
    #[structopt(subcommand)]
    cmd: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, StructOpt)]
enum Command {
    #[structopt(
        name = "print-repos",
        alias = "printRepos",
        about = "Print every registered repository."
    )]
    PrintRepos {
        #[structopt(long = "json", help = "Print the repositories as JSON.")]
        json: bool,
    },
}

impl Args {
    /// Load the config file, returning it along with the directory relative
    /// paths should be resolved against.
    pub fn config(&self) -> Result<(Config, std::path::PathBuf), Error> {
        let config_file =
            shellexpand::full(&self.config_file).context("Unable to expand wildcards")?;
        let config_file = Path::new(&*config_file);

        let cfg = Config::from_file(config_file).context("Couldn't load the config")?;
        let base_dir = match config_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => env::current_dir().context("Unable to determine the current directory")?,
        };

        Ok((cfg, base_dir))
    }

    pub fn task(&self) -> Task {
        match self.cmd {
            Some(Command::PrintRepos { json }) => Task::PrintRepos { json },
            None => Task::default(),
        }
    }
}

fn parse_property(src: &str) -> Result<(String, String), String> {
    let eq = src
        .find('=')
        .ok_or_else(|| format!("Expected \"key=value\", found \"{}\"", src))?;
    let (key, value) = (&src[..eq], &src[eq + 1..]);

    if key.is_empty() {
        return Err(format!("The property name in \"{}\" is empty", src));
    }

    Ok((key.to_string(), value.to_string()))
}

fn initialize_logging(args: &Args) -> Result<(), Error> {
    let mut builder = Builder::new();

    let level = match args.verbosity {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };

    if let Some(lvl) = level {
        builder.filter(Some("repo_auth"), lvl);
    }

    if let Ok(filter) = env::var("RUST_LOG") {
        builder.parse(&filter);
    }

    builder.format(|out, record| match record.line() {
        Some(line) => writeln!(
            out,
            "{} [{:5}] ({}#{}): {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            line,
            record.args()
        ),
        None => writeln!(
            out,
            "{} [{:5}] ({}): {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        ),
    });

    builder.try_init()?;

    Ok(())
}
