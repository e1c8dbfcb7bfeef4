use clap::{Parser, Subcommand};
use crack_bench::alloc::TrackingAllocator;
use crack_bench::candidate::{search_space, validate_target, MAX_PASSWORD_LENGTH};
use crack_bench::config::available_workers;
use crack_bench::driver::resolve_targets;
use crack_bench::export::{save_results_to_csv, BenchReport};
use crack_bench::record::summarize;
use crack_bench::{
    run_session, search_concurrent, search_sequential, BenchConfig, BenchError, ResultRecord,
    RunMode, SearchOutcome, UploadConfig,
};
use mimalloc::MiMalloc;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: TrackingAllocator<MiMalloc> = TrackingAllocator::new(MiMalloc);

#[derive(Parser)]
#[command(name = "crack-bench")]
#[command(about = "Compare sequential and concurrent brute-force search of numeric passwords", long_about = None)]
struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run a benchmark session and export the results")]
    Run {
        #[arg(long, help = "Configuration file (JSON) - CLI options override config file values")]
        config: Option<String>,

        #[arg(short, long, help = "Number of test runs")]
        runs: Option<u32>,

        #[arg(short, long, help = "Password length in digits")]
        length: Option<usize>,

        #[arg(short, long, help = "Execution mode: sequential, concurrent, both")]
        mode: Option<String>,

        #[arg(short, long, help = "Number of workers for the concurrent search")]
        workers: Option<usize>,

        #[arg(short, long = "target", help = "Password to search for (repeatable, random if omitted)")]
        targets: Vec<String>,

        #[arg(short, long, help = "CSV output file")]
        output: Option<String>,

        #[arg(long, help = "Also write a JSON report to this file")]
        json: Option<String>,

        #[arg(long, help = "Upload the CSV file to S3")]
        upload: bool,
    },

    #[command(about = "Search for a single password and print the timings")]
    Crack {
        #[arg(help = "The password to search for")]
        target: String,

        #[arg(short, long, default_value = "both")]
        mode: String,

        #[arg(short, long, help = "Number of workers (default: available cores)")]
        workers: Option<usize>,
    },

    #[command(about = "Prompt for the benchmark settings")]
    Interactive,

    #[command(about = "Generate a default benchmark configuration file")]
    InitConfig {
        #[arg(help = "Output file path (default: bench_config.json)")]
        output: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            runs,
            length,
            mode,
            workers,
            targets,
            output,
            json,
            upload,
        } => run_from_args(config, runs, length, mode, workers, targets, output, json, upload),
        Commands::Crack {
            target,
            mode,
            workers,
        } => crack_single(&target, &mode, workers),
        Commands::Interactive => run_interactive(),
        Commands::InitConfig { output } => {
            init_config_file(output.as_deref().unwrap_or("bench_config.json"))
        }
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "crack_bench=debug" } else { "crack_bench=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[allow(clippy::too_many_arguments)]
fn run_from_args(
    config_file: Option<String>,
    runs: Option<u32>,
    length: Option<usize>,
    mode: Option<String>,
    workers: Option<usize>,
    targets: Vec<String>,
    output: Option<String>,
    json: Option<String>,
    upload: bool,
) -> crack_bench::Result<()> {
    let mut config = match config_file {
        Some(path) => {
            let config = BenchConfig::load_from_file(Path::new(&path))?;
            println!("✓ Loaded configuration from: {}\n", path);
            config
        }
        None => BenchConfig::default(),
    };

    if let Some(v) = runs {
        config.repetitions = v;
    }
    if let Some(v) = length {
        config.password_length = v;
    }
    if let Some(v) = mode {
        config.mode = v.parse()?;
    }
    if let Some(v) = workers {
        config.worker_count = v;
    }
    if !targets.is_empty() {
        config.targets = targets;
    }
    if output.is_some() {
        config.output = output;
    }
    if upload && config.upload.is_none() {
        config.upload = Some(UploadConfig::default());
    }

    execute_session(&config, json.as_deref())
}

fn execute_session(config: &BenchConfig, json: Option<&str>) -> crack_bench::Result<()> {
    config.validate()?;
    let targets = resolve_targets(config, &mut rand::thread_rng())?;
    let space = config.search_space()?;

    if config.worker_count > available_workers() {
        warn!(
            workers = config.worker_count,
            available = available_workers(),
            "more workers than available cores"
        );
    }

    println!("========================================");
    println!("  PASSWORD SEARCH BENCHMARK");
    println!("========================================");
    println!("Password length: {} (search space {})", config.password_length, space);
    println!("Runs:            {}", config.repetitions);
    println!("Mode:            {}", config.mode);
    if config.mode != RunMode::Sequential {
        println!("Workers:         {}", config.worker_count);
    }
    println!("Targets:         {}", targets.join(", "));
    println!("========================================\n");

    let start_time = Instant::now();
    let records = run_session(config, &targets, print_record)?;
    print_summary(&records, start_time.elapsed());

    handle_file_output(config, &records, json);

    println!("\nAll tests complete.");
    Ok(())
}

fn print_record(record: &ResultRecord) {
    println!(
        "[{}] Run {:<4} | Target: {} | Found: {:<5} | Time: {:.4}s | Guesses/s: {:.0} | Mem: {:.3} MB",
        record.algorithm,
        record.run_id,
        record.target,
        record.found,
        record.elapsed_seconds,
        record.throughput,
        record.memory_delta_mb
    );
}

fn print_summary(records: &[ResultRecord], elapsed: std::time::Duration) {
    println!("\n========================================");
    println!("  SUMMARY");
    println!("========================================");
    for summary in summarize(records) {
        println!(
            "{} ({} workers): {}/{} found | Mean time: {:.4}s | Mean guesses/s: {:.0}",
            summary.algorithm,
            summary.worker_count,
            summary.found,
            summary.runs,
            summary.mean_elapsed_seconds,
            summary.mean_throughput
        );
    }
    println!("Total time: {:.3}s", elapsed.as_secs_f64());
    println!("========================================");
}

/// Export failures are reported but never discard the computed records
fn handle_file_output(config: &BenchConfig, records: &[ResultRecord], json: Option<&str>) {
    if let Some(json_file) = json {
        match BenchReport::new(config, records).save(Path::new(json_file)) {
            Ok(()) => println!("\nReport saved to: {}", json_file),
            Err(e) => eprintln!("Error saving JSON report: {}", e),
        }
    }

    let output = config.output_file();
    let path = Path::new(&output);
    match save_results_to_csv(records, path) {
        Ok(true) => println!("Performance data saved to {}", output),
        Ok(false) => return,
        Err(e) => {
            eprintln!("Error saving CSV file: {}", e);
            return;
        }
    }

    if let Some(upload_config) = &config.upload {
        upload_results(path, upload_config);
    }
}

#[cfg(feature = "s3")]
fn upload_results(path: &Path, config: &UploadConfig) {
    match crack_bench::upload::upload_file(path, config) {
        Ok(()) => println!(
            "Successfully uploaded {} to S3 bucket {}",
            path.display(),
            config.bucket
        ),
        Err(e) => warn!(error = %e, "upload failed, results kept locally"),
    }
}

#[cfg(not(feature = "s3"))]
fn upload_results(path: &Path, _config: &UploadConfig) {
    warn!(
        path = %path.display(),
        "upload requested but this build lacks the `s3` feature"
    );
}

fn crack_single(target: &str, mode: &str, workers: Option<usize>) -> crack_bench::Result<()> {
    let width = target.len();
    let space = search_space(width)?;
    validate_target(target, width)?;
    let mode: RunMode = mode.parse()?;
    let workers = workers.unwrap_or_else(available_workers);

    println!("Searching for: {}", target);
    println!("Search space:  {}", space);
    println!();

    if mode != RunMode::Concurrent {
        let outcome = search_sequential(target, width, space);
        print_outcome("Sequential", &outcome);
    }
    if mode != RunMode::Sequential {
        let outcome = search_concurrent(target, width, space, workers)?;
        print_outcome(&format!("Concurrent ({} workers)", workers), &outcome);
    }

    Ok(())
}

fn print_outcome(label: &str, outcome: &SearchOutcome) {
    println!("{}:", label);
    if let Some(index) = outcome.matched_index {
        println!("  Status: FOUND at index {}", index);
    } else {
        println!("  Status: NOT FOUND");
    }
    println!("  Candidates scanned: {}", outcome.candidates_scanned);
    println!("  Time elapsed: {:.6}s", outcome.elapsed.as_secs_f64());
    println!();
}

fn prompt(message: &str) -> crack_bench::Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input)? == 0 {
        return Err(BenchError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "input closed",
        )));
    }
    Ok(input.trim().to_string())
}

fn prompt_number<T: std::str::FromStr + PartialOrd>(
    message: &str,
    min: T,
    max: Option<T>,
    retry: &str,
) -> crack_bench::Result<T> {
    loop {
        if let Ok(value) = prompt(message)?.parse::<T>() {
            if value >= min && max.as_ref().map_or(true, |m| value <= *m) {
                return Ok(value);
            }
        }
        println!("{}", retry);
    }
}

fn run_interactive() -> crack_bench::Result<()> {
    let repetitions = prompt_number(
        "Enter the number of test runs (e.g., 20): ",
        1u32,
        None,
        "Invalid input. Please enter a positive number.",
    )?;

    let password_length = prompt_number(
        "Enter the desired password length (e.g., 8): ",
        1usize,
        Some(MAX_PASSWORD_LENGTH),
        &format!("Invalid input. Please enter a number between 1 and {}.", MAX_PASSWORD_LENGTH),
    )?;
    println!(
        "Password length set to {}. Search space is {}.",
        password_length,
        search_space(password_length)?
    );

    let mode = loop {
        let input = prompt(
            "\nSelect execution mode:\n 1: Sequential Only\n 2: Concurrent Only\n 3: Both\nEnter choice (1, 2, or 3): ",
        )?;
        match input.as_str() {
            "1" | "2" | "3" => break input.parse::<RunMode>()?,
            _ => println!("Invalid choice. Please enter 1, 2, or 3."),
        }
    };

    let max_workers = available_workers();
    let worker_count = if mode == RunMode::Sequential {
        1
    } else {
        prompt_number(
            &format!("\nEnter the number of workers to use (1-{}): ", max_workers),
            1usize,
            Some(max_workers),
            &format!("Invalid input. Please enter a number between 1 and {}.", max_workers),
        )?
    };

    let input = prompt(&format!(
        "\nEnter a specific {}-digit password to test (or press Enter for a random password): ",
        password_length
    ))?;
    let targets = if validate_target(&input, password_length).is_ok() {
        println!("Using custom password for all runs: {}", input);
        vec![input]
    } else {
        println!("No valid custom password entered. Using a random password for all runs.");
        Vec::new()
    };

    let upload = prompt("\nDo you want to upload the results to AWS S3? (y/n): ")?;
    let upload = if upload.eq_ignore_ascii_case("y") {
        Some(UploadConfig::default())
    } else {
        None
    };

    let config = BenchConfig {
        password_length,
        repetitions,
        worker_count,
        mode,
        targets,
        output: None,
        upload,
    };

    println!("\nStarting password search performance comparison...\n");
    execute_session(&config, None)
}

fn init_config_file(output: &str) -> crack_bench::Result<()> {
    let config = BenchConfig::default();
    config.save_to_file(Path::new(output))?;

    println!("✓ Default configuration file created: {}", output);
    println!("\nConfiguration:");
    println!("  Password length: {}", config.password_length);
    println!("  Runs:            {}", config.repetitions);
    println!("  Workers:         {}", config.worker_count);
    println!("  Mode:            {}", config.mode);
    println!("  Output:          {}", config.output_file());
    println!("\nYou can now edit this file and use:");
    println!("  cargo run --release -- run --config {}", output);
    Ok(())
}
