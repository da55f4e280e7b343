//! wheel-acquire CLI - bundle platform wheels for a build target
//!
//! Usage:
//!   wheel-acquire fetch --target <T> --version <V> --dest <DIR>   Populate a destination
//!   wheel-acquire locate --target <T> --version <V>               Show candidate artifacts
//!   wheel-acquire update-manifest --output <FILE>                 Regenerate a static manifest
//!   wheel-acquire hash <FILE>                                     Print file digests

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use wheel_acquire::core::output;
use wheel_acquire::fetch::{DirectFetch, IndexFetch, PipCommand, SourceFetch};
use wheel_acquire::locate::{IndexClient, IndexLocator, Locator, Manifest, ManifestLocator, ProfileLocator};
use wheel_acquire::{AcquireRequest, ArtifactDescriptor, Orchestrator, Settings, TargetPlatform, verify};

#[derive(Parser)]
#[command(name = "wheel-acquire")]
#[command(about = "Fetch, verify and unpack platform wheels for a bundle target")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (default: XDG config locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire every artifact for a target into a destination directory
    Fetch {
        #[command(flatten)]
        source: SourceArgs,

        /// Destination directory
        #[arg(short, long)]
        dest: PathBuf,

        /// Empty the destination first
        #[arg(long)]
        clean: bool,
    },

    /// Print the ordered candidate artifacts without fetching
    Locate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Regenerate a static manifest from the package index
    UpdateManifest {
        /// Manifest file to write (.json or .toml)
        #[arg(short, long)]
        output: PathBuf,

        /// Release to pin the manifest to
        #[arg(long, default_value = "latest")]
        version: String,
    },

    /// Print sha256, sha512, sha3-256 and blake3 digests of a file
    Hash {
        file: PathBuf,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Bundle target (macOS, win32-x64, linux-x64, ...); unknown targets use the universal wheel
    #[arg(short, long, env = "VSCETARGET")]
    target: Option<String>,

    /// Release to acquire, or "latest"
    #[arg(long, default_value = "latest")]
    version: String,

    /// Where artifact locations come from
    #[arg(short, long, value_enum, default_value_t = Source::Profile)]
    source: Source,

    /// Static manifest for the manifest sources
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Built-in platform profiles, downloaded with pip
    Profile,
    /// Package index JSON API, downloaded directly
    Index,
    /// Static manifest, downloaded directly and verified
    Manifest,
    /// Static manifest targeting only, downloaded with pip
    ManifestPip,
}

fn main() {
    if let Err(e) = run() {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch {
            source,
            dest,
            clean,
        } => {
            let target = resolve_target(source.target.as_deref());
            let (locator, version) = build_locator(&settings, &source)?;
            let fetcher = SourceFetch::new(
                DirectFetch::new(settings.http_agent()),
                IndexFetch::new(PipCommand::new(&settings.python))
                    .with_extra_args(settings.pip_args.clone()),
            );

            let summary = Orchestrator::new(locator, fetcher)
                .run(&AcquireRequest {
                    target,
                    version,
                    destination: dest.clone(),
                    clean,
                })
                .with_context(|| format!("Failed to acquire artifacts into {}", dest.display()))?;

            for artifact in &summary.artifacts {
                let verified = if artifact.verified {
                    "verified".green().to_string()
                } else {
                    "unverified".dimmed().to_string()
                };
                println!(
                    "  {} {} [{}, {}]",
                    "-".cyan(),
                    artifact.file_name,
                    artifact.source,
                    verified
                );
            }
        }

        Commands::Locate { source } => {
            let target = resolve_target(source.target.as_deref());
            let (locator, version) = build_locator(&settings, &source)?;
            let descriptors = locator
                .locate(target, &version)
                .with_context(|| format!("Failed to locate artifacts for {target}"))?;

            output::info(&format!(
                "{} candidate(s) for {} {}",
                descriptors.len(),
                target.bold(),
                version
            ));
            for (i, d) in descriptors.iter().enumerate() {
                print_descriptor(i + 1, d);
            }
        }

        Commands::UpdateManifest { output: path, version } => {
            let locator = IndexLocator::new(index_client(&settings), settings.abis.clone());
            output::action(&format!("Regenerating manifest for {} {}", settings.package, version));

            let manifest = Manifest::from_index(&locator, &version)
                .context("Failed to query the package index")?;
            manifest
                .write(&path)
                .with_context(|| format!("Failed to write manifest: {}", path.display()))?;

            let total: usize = manifest.platforms.values().map(Vec::len).sum();
            output::success(&format!("{} artifact(s) written to {}", total, path.display()));
        }

        Commands::Hash { file } => {
            let hashes = verify::compute_all_hashes(&file)
                .with_context(|| format!("Failed to hash {}", file.display()))?;
            println!("sha256   {}", hashes.sha256);
            println!("sha512   {}", hashes.sha512);
            println!("sha3-256 {}", hashes.sha3_256);
            println!("blake3   {}", hashes.blake3);
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("Failed to load settings: {}", path.display())),
        None => Settings::load().context("Failed to load settings"),
    }
}

fn resolve_target(raw: Option<&str>) -> TargetPlatform {
    match raw {
        Some(raw) => {
            let target = TargetPlatform::parse(raw);
            if target == TargetPlatform::Any && !raw.trim().eq_ignore_ascii_case("any") {
                output::warning(&format!(
                    "target '{raw}' has no platform wheels, using the universal wheel"
                ));
            }
            target
        }
        None => {
            output::warning("no target given (--target or VSCETARGET), using the universal wheel");
            TargetPlatform::Any
        }
    }
}

fn index_client(settings: &Settings) -> IndexClient {
    IndexClient::new(settings.http_agent(), &settings.index_url, &settings.package)
}

/// Locator for the chosen source, and the version to pass to it.
fn build_locator(settings: &Settings, args: &SourceArgs) -> Result<(Box<dyn Locator>, String)> {
    match args.source {
        Source::Profile => {
            // pip needs a pinned requirement
            let version = index_client(settings)
                .resolve_version(&args.version)
                .with_context(|| format!("Failed to resolve version '{}'", args.version))?;
            let locator = ProfileLocator::new(&settings.package, settings.abis.clone());
            Ok((Box::new(locator), version))
        }
        Source::Index => {
            let locator = IndexLocator::new(index_client(settings), settings.abis.clone());
            Ok((Box::new(locator), args.version.clone()))
        }
        Source::Manifest | Source::ManifestPip => {
            let Some(path) = &args.manifest else {
                bail!("--manifest is required for the manifest sources");
            };
            let manifest = Manifest::read(path)
                .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
            let locator = ManifestLocator::new(manifest, &settings.package)
                .with_index_hints(args.source == Source::ManifestPip);
            Ok((Box::new(locator), args.version.clone()))
        }
    }
}

fn print_descriptor(n: usize, d: &ArtifactDescriptor) {
    println!("  {}. {}", n, d.label().bold());
    if let Some(url) = &d.url {
        println!("     {} {}", "url:".dimmed(), url);
    }
    if let Some(digest) = &d.digest {
        println!("     {} {}", "digest:".dimmed(), digest);
    }
    let tags = d.platform_attempts();
    if tags.iter().any(Option::is_some) {
        let tags: Vec<&str> = tags.iter().filter_map(|t| t.as_deref()).collect();
        println!("     {} {}", "tags:".dimmed(), tags.join(", "));
    }
}
