use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "ops_functions_lambda";
const DIST_DIR: &str = "dist";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the operations functions workspace",
    long_about = "CI checks and deployment packaging for the backup, log alert,\n\
                  feed digest and health Lambda functions."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build the function binaries and zip each one as a `bootstrap` artifact
    ServerlessPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Package a single function instead of all of them
        #[arg(value_enum, long)]
        function: Option<Function>,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Unit and integration tests for both crates
    Test,
    /// Lint + test
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Function {
    Backup,
    LogAlert,
    FeedDigest,
    Health,
}

impl Function {
    const ALL: [Self; 4] = [Self::Backup, Self::LogAlert, Self::FeedDigest, Self::Health];

    fn bin_name(self) -> &'static str {
        match self {
            Self::Backup => "backup_lambda",
            Self::LogAlert => "log_alert_lambda",
            Self::FeedDigest => "feed_digest_lambda",
            Self::Health => "health_lambda",
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn run_cargo(args: &[&str]) {
    eprintln!("+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo");
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn ensure_rust_target_installed(target: &str) {
    let output = match Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    {
        Ok(output) => output,
        Err(error) => {
            eprintln!("warning: could not list rust targets ({error}); skipping target preflight");
            return;
        }
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if output.status.success() && !installed.lines().any(|line| line.trim() == target) {
        panic!("rust target `{target}` is not installed; run `rustup target add {target}`");
    }
}

fn package_functions(target: &str, profile: BuildProfile, functions: &[Function]) {
    ensure_rust_target_installed(target);

    step("Build function binaries");
    let mut cargo_args = vec!["build", "-p", LAMBDA_PACKAGE, "--target", target];
    for function in functions {
        cargo_args.extend(["--bin", function.bin_name()]);
    }
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package bootstrap zips");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).expect("failed to create dist directory");

    let artifacts: Vec<PathBuf> = functions
        .iter()
        .map(|function| {
            let zip_path = dist_dir.join(format!("{}.zip", function.bin_name()));
            write_bootstrap_zip(&target_dir.join(function.bin_name()), &zip_path);
            zip_path
        })
        .collect();

    eprintln!("\nPackaged artifacts:");
    for artifact in artifacts {
        eprintln!("- {}", artifact.display());
    }
}

fn write_bootstrap_zip(binary_path: &Path, zip_path: &Path) {
    let binary = fs::read(binary_path)
        .unwrap_or_else(|error| panic!("failed to read {}: {error}", binary_path.display()));
    let file = fs::File::create(zip_path).expect("failed to create function zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish function zip");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test ops_functions_core");
    run_cargo(&["test", "-p", "ops_functions_core"]);

    step("Test ops_functions_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::Check => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::ServerlessPackage {
            target,
            profile,
            function,
        } => {
            let functions = match function {
                Some(function) => vec![function],
                None => Function::ALL.to_vec(),
            };
            package_functions(&target, profile, &functions);
        }
    }
}
