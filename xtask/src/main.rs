use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

const DEMO_SNAPSHOT: &str = "demos/event_snapshot.json";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the carpool workspace",
    long_about = "A unified CLI for planning the demo event, benchmarks,\n\
                  and CI checks in the carpool workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the demo event with the carpool CLI
    Plan {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run the in-memory planning example
    Example,
    /// Run Criterion benchmarks
    Bench,
    /// Run CI checks (fmt, clippy, tests, examples, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Run load tests (ignored tests in carpool_core)
    LoadTest,
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Run the example and the demo plan
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn plan_demo(json: bool) {
    let format = if json { "json" } else { "text" };
    run_cargo(&[
        "run",
        "-p",
        "carpool_cli",
        "--",
        "plan",
        "--input",
        DEMO_SNAPSHOT,
        "--format",
        format,
    ]);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&["clippy", "--all-targets", "--", "-D", "warnings"]);

    step("Test carpool_core");
    run_cargo(&["test", "-p", "carpool_core"]);

    step("Test carpool_cli");
    run_cargo(&["test", "-p", "carpool_cli"]);
}

fn ci_examples() {
    step("Run plan_event example");
    run_cargo(&["run", "-p", "carpool_core", "--example", "plan_event"]);

    step("Plan demo snapshot");
    plan_demo(false);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&["bench", "--package", "carpool_core", "--bench", "performance"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan { json } => plan_demo(json),
        Commands::Example => {
            run_cargo(&["run", "-p", "carpool_core", "--example", "plan_event"]);
        }
        Commands::Bench => {
            run_cargo(&["bench", "--package", "carpool_core", "--bench", "performance"]);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::LoadTest => {
            run_cargo(&[
                "test",
                "-p",
                "carpool_core",
                "--test",
                "load_tests",
                "--",
                "--ignored",
            ]);
        }
    }
}
