use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for ssd1305-rs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Quick checks before commit (fmt, clippy)
    Check {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        /// Run only doc tests
        #[arg(long)]
        doc: bool,
        /// Run only display (frame buffer and rasterizer) tests
        #[arg(long)]
        display: bool,
        /// Run only controller tests
        #[arg(long)]
        controller: bool,
        /// Run only bus tests
        #[arg(long)]
        bus: bool,
    },
    /// Run benchmarks
    Bench {
        /// Run a single bench target (raster_bench, flush_bench)
        name: Option<String>,
    },
    /// Run the simulator against a display configuration
    Sim {
        /// Path to the display configuration file
        #[arg(long, default_value = "display_config.toml")]
        config: String,
        /// Directory to write a PNG screenshot into
        #[arg(long)]
        screenshot: Option<String>,
        /// Enable bus tracing
        #[arg(long)]
        trace: bool,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_pipeline("CI", &CI_STEPS, verbose),
        Commands::Check { verbose } => run_pipeline("Quick Checks", &CHECK_STEPS, verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test {
            doc,
            display,
            controller,
            bus,
        } => run_test(doc, &[(display, "display"), (controller, "controller"), (bus, "bus")]),
        Commands::Bench { name } => run_bench(name.as_deref()),
        Commands::Sim {
            config,
            screenshot,
            trace,
            release,
        } => run_sim(&config, screenshot.as_deref(), trace, release),
    }
}

type Step = (&'static str, fn() -> Result<()>);

const CI_STEPS: [Step; 4] = [
    ("Format Check", fmt_check),
    ("Clippy", clippy_strict),
    ("Build", build_debug),
    ("Test", test_all),
];

const CHECK_STEPS: [Step; 2] = [("Format Check", fmt_check), ("Clippy", clippy_strict)];

fn fmt_check() -> Result<()> {
    run_fmt(true)
}

fn clippy_strict() -> Result<()> {
    run_clippy(false)
}

fn build_debug() -> Result<()> {
    run_build(false)
}

fn test_all() -> Result<()> {
    run_test(false, &[])
}

fn run_pipeline(title: &str, steps: &[Step], verbose: bool) -> Result<()> {
    println!("{}", format!("=== Running {} ===", title).bold().blue());

    let start = Instant::now();

    for (name, step) in steps {
        run_task(name, *step, verbose)?;
    }

    println!(
        "\n{} {}",
        format!("✓ {} passed in", title).green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );

    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut args = vec!["fmt", "--all"];
    if check {
        args.extend(["--", "--check"]);
    }
    cargo(&args)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut args = vec!["clippy", "--workspace", "--all-targets"];
    if fix {
        args.push("--fix");
    } else {
        args.extend(["--", "-D", "warnings"]);
    }
    cargo(&args)
}

fn run_build(release: bool) -> Result<()> {
    if release {
        cargo(&["build", "--release"])
    } else {
        cargo(&["build"])
    }
}

/// Run the test suite, or only the library tests of the selected modules
fn run_test(doc: bool, modules: &[(bool, &str)]) -> Result<()> {
    if doc {
        return cargo(&["test", "--doc"]);
    }

    let selected: Vec<&str> = modules
        .iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, module)| *module)
        .collect();

    if selected.is_empty() {
        return cargo(&["test"]);
    }

    let mut failed = Vec::new();
    for &module in &selected {
        println!("{} Running {} tests...", "→".blue(), module.bold());

        match cargo(&["test", "--lib", module]) {
            Ok(()) => println!("{} {} tests passed\n", "✓".green(), module),
            Err(e) => {
                println!("{} {} tests failed\n", "✗".red(), module);
                if selected.len() == 1 {
                    return Err(e);
                }
                failed.push(module);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Module tests failed: {}", failed.join(", "))
    }
}

fn run_bench(name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => cargo(&["bench", "--bench", name]),
        None => cargo(&["bench"]),
    }
}

fn run_sim(config: &str, screenshot: Option<&str>, trace: bool, release: bool) -> Result<()> {
    println!("{}", "=== Simulator ===".bold().blue());

    if Path::new(config).exists() {
        println!("{} Config: {}", "✓".green(), config.cyan());
    } else {
        println!(
            "{} Config not found, defaults will be written to: {}",
            "⚠".yellow().bold(),
            config.yellow()
        );
    }

    let mut args = vec!["run", "--bin", "ssd1305-sim"];
    if release {
        args.push("--release");
    }
    args.extend(["--", "--config", config]);
    if let Some(dir) = screenshot {
        args.extend(["--screenshot", dir]);
    }
    if trace {
        args.push("--trace");
    }

    let start = Instant::now();
    cargo(&args)?;

    println!(
        "\n{} Simulator finished in {}",
        "✓".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );

    Ok(())
}

fn run_task(name: &str, task: fn() -> Result<()>, verbose: bool) -> Result<()> {
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(()) => {
            if verbose {
                println!(
                    "{} ({:.2}s)",
                    "✓".green().bold(),
                    start.elapsed().as_secs_f64()
                );
            } else {
                println!("{}", "✓".green().bold());
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

/// Run cargo with the given arguments, streaming its output
fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo")
        .args(args)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("cargo {} failed with exit code: {}", args.join(" "), status);
    }

    Ok(())
}
