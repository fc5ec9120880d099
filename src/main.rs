use clap::{Parser, Subcommand};
use pixel_prime::pipeline::{self, PipelineError};
use pixel_prime::prime::{SearchEvent, SearchOptions};
use pixel_prime::{config, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

/// Shared flags for commands that search for primes.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the prime cache and search again even if this image was seen before
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "pixel-prime")]
#[command(version)]
#[command(about = "Turn a bitmap into the next prime and render it as HTML")]
#[command(long_about = "\
Turn a bitmap into the next prime and render it as HTML

Every pixel of a 24-bit uncompressed BMP becomes one digit: 8 for dark
pixels (luminance below 200), 1 for light ones, top row first. The smallest
prime at or above that number is written to an HTML page, one line per image
row, so the digits redraw the picture.

Run 'pixel-prime gen-config' to generate a documented pixel-prime.toml.")]
struct Cli {
    /// Config file (default: ./pixel-prime.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the found-prime cache
    #[arg(long, default_value = ".pixel-prime-cache", global = true)]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a bitmap, find the next prime and write it as an HTML page
    Render {
        /// 24-bit uncompressed BMP
        infile: PathBuf,
        /// HTML file to write
        outfile: PathBuf,
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Print the digits a bitmap decodes to, one line per row
    Digits {
        infile: PathBuf,
    },
    /// Find the smallest prime at or above a decimal number
    NextPrime {
        #[arg(allow_hyphen_values = true)]
        number: String,
    },
    /// Validate a bitmap header without decoding it
    Check {
        infile: PathBuf,
    },
    /// Print a stock pixel-prime.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    match cli.command {
        Command::Render {
            infile,
            outfile,
            cache,
        } => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            let bytes = pipeline::read_bitmap(&infile)?;
            let header = pipeline::check_bitmap(&bytes)?;
            for line in output::format_render_start(&infile, header.width_px(), header.rows()) {
                println!("{}", line);
            }
            let (tx, printer) = spawn_event_printer();
            let result = pipeline::render_bitmap(
                &bytes,
                &outfile,
                &config,
                &cli.cache_dir,
                !cache.no_cache,
                Some(tx),
            );
            printer.join().ok();
            output::print_render_report(&result?, &outfile);
        }
        Command::Digits { infile } => {
            let grid = pipeline::digits_from_bitmap(&pipeline::read_bitmap(&infile)?)?;
            output::print_digits(&grid);
        }
        Command::NextPrime { number } => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            let options = SearchOptions::from_config(&config.search);
            let (tx, printer) = spawn_event_printer();
            let result = pipeline::next_prime_from_literal(&number, &options, Some(tx));
            printer.join().ok();
            output::print_next_prime(&result?);
        }
        Command::Check { infile } => {
            let header = pipeline::check_bitmap(&pipeline::read_bitmap(&infile)?)?;
            output::print_header(&header);
            println!("==> Bitmap is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(())
}

/// Load the config named on the command line, or `./pixel-prime.toml` when
/// present, or stock defaults.
fn load_config(path: Option<&Path>) -> Result<config::PrimeConfig, PipelineError> {
    match path {
        Some(path) => {
            let raw = config::load_raw_config(path)?.ok_or_else(|| {
                config::ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file {} not found", path.display()),
                ))
            })?;
            Ok(config::resolve_config(Some(raw))?)
        }
        None => Ok(config::load_config(Path::new(config::CONFIG_FILENAME))?),
    }
}

/// Print search progress from a separate thread while the search runs.
fn spawn_event_printer() -> (Sender<SearchEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_search_event(&event) {
                println!("{}", line);
            }
        }
    });
    (tx, printer)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
