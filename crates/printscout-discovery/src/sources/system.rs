// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printers already known to the operating system's spooler.
//
// On Unix this asks CUPS through `lpstat -p` for queue names and
// `lpoptions -p <name>` for each queue's device URI. On Windows it asks the
// print spooler through PowerShell's `Get-Printer`, emitted as JSON.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use printscout_core::types::{PrinterStatus, RawDeviceInfo};

use super::PrinterSource;
use crate::command::{CommandRunner, SystemCommands};
use crate::connectivity::DEFAULT_IPP_PORT;
use crate::heuristics::DeviceClassifier;

/// The spooler source for the platform we were built for.
pub fn platform_source(
    classifier: Arc<DeviceClassifier>,
    command_timeout: Duration,
) -> Arc<dyn PrinterSource> {
    if cfg!(windows) {
        Arc::new(PowerShellSource::new(classifier, command_timeout))
    } else {
        Arc::new(LpstatSource::new(classifier, command_timeout))
    }
}

/// OS printer enumeration through the CUPS command-line tools.
#[derive(Clone)]
pub struct LpstatSource {
    classifier: Arc<DeviceClassifier>,
    command_timeout: Duration,
    runner: Arc<dyn CommandRunner>,
}

impl LpstatSource {
    pub fn new(classifier: Arc<DeviceClassifier>, command_timeout: Duration) -> Self {
        Self {
            classifier,
            command_timeout,
            runner: Arc::new(SystemCommands),
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    async fn device_uri(&self, queue: &str) -> Option<String> {
        let output = self
            .runner
            .run("lpoptions", &["-p", queue], self.command_timeout)
            .await?;
        parse_device_uri(&output)
    }
}

#[async_trait]
impl PrinterSource for LpstatSource {
    async fn enumerate(&self) -> Vec<RawDeviceInfo> {
        let Some(output) = self
            .runner
            .run("lpstat", &["-p"], self.command_timeout)
            .await
        else {
            debug!("lpstat unavailable; no system printers");
            return Vec::new();
        };

        let mut devices = Vec::new();
        for (queue, status) in parse_lpstat(&output) {
            if !self.classifier.matches(&queue) {
                debug!(queue, "system printer is not a vendor device");
                continue;
            }
            let uri = match self.device_uri(&queue).await {
                Some(uri) => uri,
                None => format!("cups://{queue}"),
            };
            devices.push(RawDeviceInfo {
                model: self.classifier.extract_model(&queue),
                name: queue,
                uri,
                status,
            });
        }

        info!(printers = devices.len(), "system printer enumeration finished");
        devices
    }
}

/// Extract `(queue, status)` pairs from `lpstat -p` output.
///
/// Lines look like `printer Canon_MG3600 is idle.  enabled since …` or
/// `printer Office disabled since …`.
pub fn parse_lpstat(output: &str) -> Vec<(String, PrinterStatus)> {
    output
        .lines()
        .filter_map(|line| {
            let start = line.find("printer ")? + "printer ".len();
            let queue = line[start..].split_whitespace().next()?;
            let status = if line.contains("disabled") {
                PrinterStatus::Offline
            } else {
                PrinterStatus::Available
            };
            Some((queue.to_string(), status))
        })
        .collect()
}

/// Pull `device-uri=…` out of `lpoptions -p` output.
pub fn parse_device_uri(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .find_map(|token| token.strip_prefix("device-uri="))
        .filter(|uri| !uri.is_empty())
        .map(str::to_string)
}

/// PowerShell pipeline listing the spooler's printers as JSON.
pub const GET_PRINTER_SCRIPT: &str =
    "Get-Printer | Select-Object Name,DriverName,PortName,Shared,PrinterStatus | ConvertTo-Json";

/// OS printer enumeration through PowerShell's `Get-Printer`.
#[derive(Clone)]
pub struct PowerShellSource {
    classifier: Arc<DeviceClassifier>,
    command_timeout: Duration,
    runner: Arc<dyn CommandRunner>,
}

impl PowerShellSource {
    pub fn new(classifier: Arc<DeviceClassifier>, command_timeout: Duration) -> Self {
        Self {
            classifier,
            command_timeout,
            runner: Arc::new(SystemCommands),
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }
}

#[async_trait]
impl PrinterSource for PowerShellSource {
    async fn enumerate(&self) -> Vec<RawDeviceInfo> {
        let Some(output) = self
            .runner
            .run(
                "powershell",
                &["-NoProfile", "-Command", GET_PRINTER_SCRIPT],
                self.command_timeout,
            )
            .await
        else {
            debug!("Get-Printer unavailable; no system printers");
            return Vec::new();
        };

        let printers = match parse_get_printer(&output) {
            Ok(printers) => printers,
            Err(e) => {
                warn!(error = %e, "Get-Printer output is not valid JSON");
                return Vec::new();
            }
        };

        let devices: Vec<RawDeviceInfo> = printers
            .into_iter()
            .filter(|p| self.classifier.matches(&p.name))
            .map(|p| {
                let model = match p.driver_name.as_deref().map(str::trim) {
                    Some(driver) if !driver.is_empty() => driver.to_string(),
                    _ => self.classifier.extract_model(&p.name),
                };
                RawDeviceInfo {
                    uri: windows_printer_uri(&p.name, p.port_name.as_deref().unwrap_or_default()),
                    status: p.status(),
                    model,
                    name: p.name,
                }
            })
            .collect();

        info!(printers = devices.len(), "system printer enumeration finished");
        devices
    }
}

/// One entry of `Get-Printer | ConvertTo-Json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WindowsPrinter {
    #[serde(default)]
    pub name: String,
    pub driver_name: Option<String>,
    pub port_name: Option<String>,
    #[serde(default)]
    pub shared: bool,
    pub printer_status: Option<serde_json::Value>,
}

impl WindowsPrinter {
    /// Map the spooler's `PrinterStatus`, which is numeric in Windows
    /// PowerShell and may be the enum name when serialised as a string.
    pub fn status(&self) -> PrinterStatus {
        match &self.printer_status {
            None => PrinterStatus::Available,
            Some(serde_json::Value::Number(n)) => n
                .as_u64()
                .map_or(PrinterStatus::Unknown, windows_status_code),
            Some(serde_json::Value::String(s)) => windows_status_name(s),
            Some(_) => PrinterStatus::Unknown,
        }
    }
}

fn windows_status_code(code: u64) -> PrinterStatus {
    match code {
        // Normal, I/O active, busy, printing, waiting, processing,
        // initialising, warming up, toner low.
        0 | 9 | 10 | 11 | 14 | 15 | 16 | 17 | 18 => PrinterStatus::Available,
        // Paused, pending deletion, offline, not available.
        1 | 3 | 8 | 13 => PrinterStatus::Offline,
        2 | 4..=7 | 12 | 19..=23 => PrinterStatus::Error,
        _ => PrinterStatus::Unknown,
    }
}

fn windows_status_name(name: &str) -> PrinterStatus {
    match name.to_ascii_lowercase().as_str() {
        "normal" | "ioactive" | "busy" | "printing" | "waiting" | "processing"
        | "initialization" | "warmingup" | "tonerlow" => PrinterStatus::Available,
        "paused" | "pendingdeletion" | "offline" | "notavailable" => PrinterStatus::Offline,
        "error" | "paperjam" | "paperout" | "manualfeed" | "paperproblem" | "outputbinfull"
        | "notoner" | "pagepunt" | "userinterventionrequired" | "outofmemory" | "dooropen" => {
            PrinterStatus::Error
        }
        _ => PrinterStatus::Unknown,
    }
}

/// Parse `ConvertTo-Json` output. A single printer is emitted as a bare
/// object, several as an array; blank output means no printers.
pub fn parse_get_printer(output: &str) -> serde_json::Result<Vec<WindowsPrinter>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<WindowsPrinter>),
        One(WindowsPrinter),
    }

    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    Ok(match serde_json::from_str(trimmed)? {
        OneOrMany::Many(printers) => printers,
        OneOrMany::One(printer) => vec![printer],
    })
}

/// Spooler port name to a device URI: standard TCP/IP ports (`IP_10.0.0.9`
/// or `IP_10_0_0_9`) become IPP, UNC shares become SMB, anything else is
/// addressed by queue name.
pub fn windows_printer_uri(name: &str, port_name: &str) -> String {
    if let Some(host) = port_name.strip_prefix("IP_") {
        let host = host.replace('_', ".");
        return format!("ipp://{host}:{DEFAULT_IPP_PORT}/ipp/print");
    }
    if let Some(share) = port_name.strip_prefix(r"\\") {
        return format!("smb://{}", share.replace('\\', "/"));
    }
    format!("windows-printer://{name}")
}
