mod collectors;
mod config;
mod models;
mod severity;
mod smart;
mod topology;
mod util;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use collectors::smartctl::{SmartDir, Smartctl};
use collectors::TelemetrySource;
use config::Config;
use severity::Severity;
use std::io;
use std::path::PathBuf;
use topology::Mapper;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "diskmap", about = "Map ZFS pool topology to per-disk SMART health", version)]
struct Cli {
    /// Also write the annotated tree as JSON to this path
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Read pool.query JSON from a file instead of calling midclt
    #[arg(long, value_name = "PATH")]
    pools_file: Option<PathBuf>,

    /// Read disk.query JSON from a file instead of calling midclt
    #[arg(long, value_name = "PATH")]
    disks_file: Option<PathBuf>,

    /// Read saved smartctl reports from <DIR>/<disk>.txt instead of running smartctl
    #[arg(long, value_name = "DIR")]
    smart_dir: Option<PathBuf>,

    /// Query disks on parallel threads
    #[arg(long)]
    parallel: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "diskmap", &mut io::stdout());
        return Ok(());
    }

    let cfg = Config::load();
    if cli.config {
        print_config(&cfg);
        return Ok(());
    }

    run(&cli, &cfg)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli, cfg: &Config) -> Result<()> {
    let inventory = collectors::midclt::load(
        &cfg.general.midclt_path,
        cli.pools_file.as_deref(),
        cli.disks_file.as_deref(),
    )
    .context("Error fetching data")?;

    let telemetry: Box<dyn TelemetrySource> = match &cli.smart_dir {
        Some(dir) => Box::new(SmartDir::new(dir.clone())),
        None      => Box::new(Smartctl::from_config(&cfg.general)),
    };

    let pools = Mapper::new(&inventory.disks, telemetry.as_ref(), &cfg.thresholds)
        .parallel(cli.parallel)
        .map_pools(&inventory.pools);

    let disks: Vec<_> = pools.iter().flat_map(|p| &p.vdevs).flat_map(|v| v.disks()).collect();
    info!(
        pools = pools.len(),
        disks = disks.len(),
        critical = disks.iter().filter(|d| d.warnings.severity() == Severity::Critical).count(),
        "topology mapped"
    );

    let color = cfg.output.color && !cli.no_color;
    print!("{}", util::report::generate(&pools, color));

    if let Some(path) = cli.json.as_ref().or(cfg.output.json_path.as_ref()) {
        let snapshot = util::export::snapshot(pools);
        match util::export::write(path, &snapshot) {
            Ok(())  => println!("\nJSON output saved to {}", path.display()),
            Err(e)  => eprintln!("\nError saving JSON output: {:#}", e),
        }
    }
    Ok(())
}

fn print_config(cfg: &Config) {
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    let t = &cfg.thresholds;
    println!("Config: {}", path);
    println!();
    println!("[general]");
    println!("  smartctl_path = {}", cfg.general.smartctl_path);
    println!("  midclt_path   = {}", cfg.general.midclt_path);
    println!("  use_sudo      = {}", cfg.general.use_sudo);
    println!();
    println!("[thresholds]");
    println!("  sas_corrected_critical = {}", t.sas_corrected_critical);
    println!("  sas_corrected_slowdown = {}", t.sas_corrected_slowdown);
    println!("  sas_corrected_caution  = {}", t.sas_corrected_caution);
    println!("  sata_error_caution_max = {}", t.sata_error_caution_max);
    println!("  test_overdue_days      = {}", t.test_overdue_days);
    println!();
    println!("[output]");
    println!("  color     = {}", cfg.output.color);
    match &cfg.output.json_path {
        Some(p) => println!("  json_path = {}", p.display()),
        None    => println!("  json_path = (not set)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_offline_flags() {
        let cli = Cli::try_parse_from([
            "diskmap", "--pools-file", "p.json", "--disks-file", "d.json",
            "--smart-dir", "reports", "--json", "out.json", "--parallel", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.pools_file, Some(PathBuf::from("p.json")));
        assert_eq!(cli.smart_dir, Some(PathBuf::from("reports")));
        assert_eq!(cli.json, Some(PathBuf::from("out.json")));
        assert!(cli.parallel);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn offline_run_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let pools = dir.path().join("pools.json");
        let disks = dir.path().join("disks.json");
        let out = dir.path().join("out.json");
        std::fs::write(&pools, r#"[{"name": "tank", "topology": {"data": [
            {"name": "mirror-0", "type": "MIRROR", "children": [
                {"name": "ada0p2", "type": "DISK", "disk": "ada0", "guid": 111,
                 "stats": {"read_errors": 0, "write_errors": 0, "checksum_errors": 0}}
            ]}
        ]}}]"#).unwrap();
        std::fs::write(&disks, r#"[{"name": "ada0", "devname": "ada0", "zfs_guid": "111"}]"#).unwrap();

        let path = |p: &std::path::Path| p.to_str().unwrap().to_string();
        let cli = Cli::try_parse_from([
            "diskmap".to_string(), "--pools-file".into(), path(&pools),
            "--disks-file".into(), path(&disks),
            "--smart-dir".into(), path(dir.path()),
            "--json".into(), path(&out), "--no-color".into(),
        ])
        .unwrap();
        run(&cli, &Config::default()).unwrap();

        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        let disk = &v["pools"][0]["vdevs"][0]["children"][0];
        assert_eq!(disk["disk"], "ada0");
        assert!(disk["smart_data"]["error"].as_str().unwrap().starts_with("Error"));
    }
}
