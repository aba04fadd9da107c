//! Command-line interface for hollowcheck.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use globset::GlobSet;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::analysis::SourceUnit;
use crate::cancel::ScanControl;
use crate::config::{ScanConfig, DEFAULT_CONFIG_YAML};
use crate::detect::Scanner;
use crate::registry::{OfflineLookup, PackageLookup, RegistryCache, RegistryClient};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["vendor", "node_modules", "target", "__pycache__", "venv"];

/// Detect hollow code: stubs, placeholder data and hallucinated dependencies.
///
/// Hollowcheck flags code that looks complete but is not: stub functions,
/// mock or placeholder literals, and imports of packages that exist in no
/// package registry.
#[derive(Parser)]
#[command(name = "hollowcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a file or directory for hollow code
    #[command(visible_aliases = ["lint", "check"])]
    Scan(ScanArgs),
    /// Write a default configuration file
    Init(InitArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Sarif,
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Skip registry lookups; imports are reported as unverifiable
    #[arg(long)]
    pub offline: bool,

    /// Do not read or write the on-disk registry cache
    #[arg(long)]
    pub no_cache: bool,

    /// Give up on pending registry lookups after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Show suppressed findings in output
    #[arg(long)]
    pub show_suppressed: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "hollowcheck.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Collect the source units under `root`.
///
/// Unit paths are relative to `root` with `/` separators, so reports do not
/// depend on where the scan was started.
pub fn collect_units(root: &Path, excluded: &GlobSet) -> anyhow::Result<Vec<SourceUnit>> {
    if root.is_file() {
        let text = std::fs::read_to_string(root)?;
        // File name only, like the relative paths of walked units.
        let path = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().replace('\\', "/"));
        return Ok(SourceUnit::detect(path, text).into_iter().collect());
    }

    let mut units = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if excluded.is_match(&relative) {
            debug!(path = %relative, "excluded");
            continue;
        }
        let has_analyzer = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(crate::analysis::Language::from_extension)
            .is_some();
        if !has_analyzer {
            continue;
        }
        match std::fs::read_to_string(entry.path()) {
            Ok(text) => units.extend(SourceUnit::detect(relative, text)),
            Err(e) => warn!(path = %relative, error = %e, "unreadable file skipped"),
        }
    }

    Ok(units)
}

/// Package names the project itself declares, as import names.
fn detect_local_packages(base_dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    for manifest in ["Cargo.toml", "pyproject.toml"] {
        let Ok(content) = std::fs::read_to_string(base_dir.join(manifest)) else {
            continue;
        };
        if let Some(name) = parse_manifest_name(&content) {
            names.push(name.replace('-', "_"));
        }
    }
    names
}

fn parse_manifest_name(content: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref NAME: regex::Regex = regex::Regex::new(r#"(?m)^\s*name\s*=\s*"([^"]+)""#).unwrap();
    }
    NAME.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn load_config(args: &ScanArgs, root_dir: &Path) -> anyhow::Result<ScanConfig> {
    let config = match &args.config {
        Some(path) => ScanConfig::parse_file(path)?,
        None => match ScanConfig::discover(root_dir).or_else(|| ScanConfig::discover(Path::new("."))) {
            Some(path) => {
                debug!(path = %path.display(), "using config");
                ScanConfig::parse_file(path)?
            }
            None => ScanConfig::default(),
        },
    };
    Ok(config)
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };
    let root_dir = if metadata.is_dir() {
        args.path.clone()
    } else {
        args.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    };

    let config = match load_config(args, &root_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let lookup: Arc<dyn PackageLookup> = if args.offline {
        Arc::new(OfflineLookup)
    } else {
        Arc::new(RegistryClient::new(Duration::from_millis(config.dependency_lookup_timeout_ms))?)
    };

    let mut scanner = match Scanner::new(&config, lookup) {
        Ok(s) => s.allow_modules(detect_local_packages(&root_dir)),
        Err(e) => {
            eprintln!("Error: invalid config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if config.disk_cache && !args.offline && !args.no_cache {
        if let Some(cache) = RegistryCache::new(config.cache_ttl()) {
            scanner = scanner.with_disk_cache(cache);
        }
    }

    let units = collect_units(&args.path, &config.excluded_paths()?)?;
    if units.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let mut control = ScanControl::new();
    if let Some(secs) = args.timeout {
        control = control.with_timeout(Duration::from_secs(secs));
    }
    let report = scanner.scan_blocking(&units, &control)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Json => report::write_json(&mut out, &report)?,
        OutputFormat::Sarif => report::write_sarif(&mut out, &report)?,
        OutputFormat::Pretty => report::write_pretty(
            &mut out,
            &args.path.to_string_lossy(),
            &report,
            args.show_suppressed,
        )?,
    }
    out.flush()?;

    if report.has_errors() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite it");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&args.output, DEFAULT_CONFIG_YAML)?;

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to tune thresholds for your project", args.output.display());
    println!("  2. Run: hollowcheck scan .");

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_cli_parses_scan_and_alias() {
        let cli = Cli::try_parse_from(["hollowcheck", "lint", "src", "--format", "json", "--offline"]).unwrap();
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.path, PathBuf::from("src"));
                assert_eq!(args.format, OutputFormat::Json);
                assert!(args.offline);
            }
            Commands::Init(_) => panic!("expected scan"),
        }
        let cli = Cli::try_parse_from(["hollowcheck", "scan", ".", "--format", "sarif"]).unwrap();
        assert!(matches!(cli.command, Commands::Scan(args) if args.format == OutputFormat::Sarif));
        assert!(Cli::try_parse_from(["hollowcheck", "scan", ".", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_collect_units_skips_hidden_and_vendor() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        fs::write(root.join("pkg/app.py"), "x = 1\n").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}\n").unwrap();
        fs::write(root.join("notes.txt"), "TODO\n").unwrap();
        fs::write(root.join(".git/hook.py"), "x = 1\n").unwrap();
        fs::write(root.join("node_modules/lib/x.py"), "x = 1\n").unwrap();

        let units = collect_units(root, &GlobSet::empty()).unwrap();
        let paths: Vec<&str> = units.iter().map(SourceUnit::path).collect();
        assert_eq!(paths, vec!["main.rs", "pkg/app.py"]);
        assert_eq!(units[1].language_tag(), "python");
    }

    #[test]
    fn test_collect_units_single_file_is_relative() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("home/svc/app.py");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "import home\n").unwrap();

        let units = collect_units(&file, &GlobSet::empty()).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].path(), "app.py");
        assert!(!crate::detect::local_module_names(units.iter().map(SourceUnit::path)).contains("home"));
    }

    #[test]
    fn test_collect_units_excluded_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("gen")).unwrap();
        fs::write(dir.path().join("gen/out.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("keep.py"), "x = 1\n").unwrap();

        let config = ScanConfig {
            excluded_paths: vec!["gen/**".to_string()],
            ..Default::default()
        };
        let units = collect_units(dir.path(), &config.excluded_paths().unwrap()).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].path(), "keep.py");
    }

    #[test]
    fn test_detect_local_packages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"my-cool-crate\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        assert_eq!(detect_local_packages(dir.path()), vec!["my_cool_crate".to_string()]);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("hollowcheck.yaml");
        let args = InitArgs {
            output: output.clone(),
            force: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert!(ScanConfig::parse_file(&output).is_ok());
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }
}
