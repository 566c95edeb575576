use super::TelemetrySource;
use crate::config::GeneralConfig;
use crate::smart::FAILURE_MARKER;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// smartctl exit bits 0 and 1: bad command line, or the device could not be opened.
const EXIT_FATAL_MASK: i32 = 0b011;

/// Live telemetry from `smartctl -a /dev/<disk>`.
pub struct Smartctl {
    program: String,
    sudo:    bool,
}

impl Smartctl {
    pub fn from_config(general: &GeneralConfig) -> Self {
        let sudo = general.use_sudo && !nix::unistd::geteuid().is_root();
        Self { program: general.smartctl_path.clone(), sudo }
    }

    fn command(&self) -> Command {
        if self.sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(&self.program);
            cmd
        } else {
            Command::new(&self.program)
        }
    }

    fn run(&self, disk: &str) -> Result<String> {
        let device = format!("/dev/{}", disk);
        debug!(%device, sudo = self.sudo, "running smartctl");

        let out = self.command()
            .args(["-a", &device])
            .output()
            .with_context(|| format!("failed to run {}", self.program))?;

        // Higher exit bits flag drive conditions; the report is still complete.
        let code = out.status.code().unwrap_or(EXIT_FATAL_MASK);
        let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
        if code & EXIT_FATAL_MASK != 0 || stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let detail = stderr.trim();
            let detail = if detail.is_empty() {
                stdout.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("no output").trim()
            } else {
                detail
            };
            bail!("{} (exit {})", detail, code);
        }
        Ok(stdout)
    }
}

impl TelemetrySource for Smartctl {
    fn fetch(&self, disk: &str) -> String {
        match self.run(disk) {
            Ok(text) => text,
            Err(e)   => {
                warn!(disk, error = %format!("{:#}", e), "SMART data unavailable");
                format!("{}: {:#}", FAILURE_MARKER, e)
            }
        }
    }
}

/// Saved reports, one `<disk>.txt` per device (output of `smartctl -a`).
pub struct SmartDir {
    dir: PathBuf,
}

impl SmartDir {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl TelemetrySource for SmartDir {
    fn fetch(&self, disk: &str) -> String {
        let path = self.dir.join(format!("{}.txt", disk));
        match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e)   => {
                warn!(path = %path.display(), error = %e, "no saved SMART report");
                format!("{}: {}: {}", FAILURE_MARKER, path.display(), e)
            }
        }
    }
}
