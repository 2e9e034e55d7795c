//! Host OS identification, read once at startup for the system prompt.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::process::Command;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Linux,
    MacOs,
    Windows,
    Unknown,
}

impl PlatformKind {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => PlatformKind::Linux,
            "macos" => PlatformKind::MacOs,
            "windows" => PlatformKind::Windows,
            _ => PlatformKind::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlatformKind::Linux => "linux",
            PlatformKind::MacOs => "macos",
            PlatformKind::Windows => "windows",
            PlatformKind::Unknown => "unknown",
        }
    }

    /// Package managers worth suggesting when a tool is missing.
    pub fn package_manager_hint(self) -> &'static str {
        match self {
            PlatformKind::Linux => "apt, dnf, pacman or zypper",
            PlatformKind::MacOs => "brew",
            PlatformKind::Windows => "winget or choco",
            PlatformKind::Unknown => "the system package manager",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsInfo {
    /// System name as users know it: `Linux`, `Darwin`, `Windows`.
    pub name: String,
    /// Distribution/version line, e.g. `Ubuntu 24.04 (Kernel: 6.8.0-31-generic)`.
    pub details: String,
    pub platform: PlatformKind,
    pub architecture: String,
}

pub fn detect() -> OsInfo {
    let platform = PlatformKind::current();
    let kernel = kernel_release(platform);

    let details = match platform {
        PlatformKind::Linux => {
            let os_release = fs::read_to_string("/etc/os-release")
                .or_else(|_| fs::read_to_string("/usr/lib/os-release"))
                .ok();
            linux_details(os_release.as_deref(), kernel.as_deref())
        }
        PlatformKind::MacOs => {
            let version = command_output("sw_vers", &["-productVersion"]);
            macos_details(version.as_deref(), kernel.as_deref())
        }
        PlatformKind::Windows => {
            let version = command_output("cmd", &["/C", "ver"]);
            version.unwrap_or_else(|| "Windows".to_string())
        }
        PlatformKind::Unknown => format!(
            "{} {}",
            system_name(std::env::consts::OS),
            kernel.unwrap_or_default()
        )
        .trim()
        .to_string(),
    };

    let info = OsInfo {
        name: system_name(std::env::consts::OS),
        details,
        platform,
        architecture: std::env::consts::ARCH.to_string(),
    };
    debug!(?info, "detected host operating system");
    info
}

fn system_name(os: &str) -> String {
    match os {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => "Unknown".to_string(),
            }
        }
    }
}

fn linux_details(os_release: Option<&str>, kernel: Option<&str>) -> String {
    let kernel = kernel.unwrap_or("unknown");
    let Some(contents) = os_release else {
        return format!("Linux (Kernel: {kernel})");
    };

    let vars = parse_os_release(contents);
    let name = vars
        .get("NAME")
        .map(String::as_str)
        .unwrap_or("Unknown Linux");
    match vars.get("VERSION_ID") {
        Some(version) => format!("{name} {version} (Kernel: {kernel})"),
        None => format!("{name} (Kernel: {kernel})"),
    }
}

fn macos_details(version: Option<&str>, kernel: Option<&str>) -> String {
    let kernel = kernel.unwrap_or("unknown");
    match version {
        Some(version) => format!("macOS {version} (Kernel: {kernel})"),
        None => format!("macOS (Kernel: {kernel})"),
    }
}

/// Parse `KEY=value` lines, dropping surrounding quotes.
fn parse_os_release(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(key, value)| {
            (
                key.trim().to_string(),
                value.trim().trim_matches('"').trim_matches('\'').to_string(),
            )
        })
        .collect()
}

fn kernel_release(platform: PlatformKind) -> Option<String> {
    if platform == PlatformKind::Linux {
        if let Ok(release) = fs::read_to_string("/proc/sys/kernel/osrelease") {
            let release = release.trim();
            if !release.is_empty() {
                return Some(release.to_string());
            }
        }
    }

    if platform == PlatformKind::Windows {
        return None;
    }

    command_output("uname", &["-r"])
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}
