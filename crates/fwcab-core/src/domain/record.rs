//! Core value types extracted from a driver package.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything fwcab needs from one INF file, extracted in a single pass.
///
/// A record only exists when every field was found; a partially matched INF
/// produces a [`MissingFields`] failure instead, never a half-filled record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRecord {
    /// ESRT/UEFI resource GUID the firmware targets, lowercased.
    pub device_guid: String,

    /// Human-readable version token from `DriverVer` (e.g. "1.2.3.4").
    pub driver_version: String,

    /// Date component of `DriverVer`.
    pub driver_date: NaiveDate,

    /// Raw firmware version as written to the registry (REG_DWORD).
    pub firmware_version: u32,

    /// Payload filename from `[Firmware_CopyFiles]`, relative to the INF.
    pub firmware_file: String,
}

impl DriverRecord {
    /// Unix timestamp (seconds) of the driver date at midnight UTC.
    pub fn release_timestamp(&self) -> i64 {
        self.driver_date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc()
            .timestamp()
    }
}

/// One of the required INF fields, named for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordField {
    DeviceGuid,
    DriverVersion,
    FirmwareVersion,
    FirmwareFile,
}

impl std::fmt::Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordField::DeviceGuid => "device GUID",
            RecordField::DriverVersion => "DriverVer",
            RecordField::FirmwareVersion => "FirmwareVersion",
            RecordField::FirmwareFile => "firmware file",
        };
        f.write_str(name)
    }
}

/// Extraction failure naming every field that did not match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingFields(pub Vec<RecordField>);

impl std::fmt::Display for MissingFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "missing INF fields: {}", names.join(", "))
    }
}

/// Why a file was skipped rather than bundled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// One or more required INF fields did not match.
    MissingFields { fields: Vec<RecordField> },

    /// No known version format stringifies the raw value into the
    /// driver version string.
    NoVersionFormat {
        firmware_version: u32,
        driver_version: String,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingFields { fields } => {
                std::fmt::Display::fmt(&MissingFields(fields.clone()), f)
            }
            SkipReason::NoVersionFormat {
                firmware_version,
                driver_version,
            } => write!(
                f,
                "no version format maps {firmware_version:#010x} into {driver_version:?}"
            ),
        }
    }
}

/// fwupd category classification derived from the INF base filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirmwareCategory {
    System,
    ManagementEngine,
    Device,
}

impl FirmwareCategory {
    /// Classify by marker tokens in the INF base name. Matching is
    /// case-sensitive; vendor INFs spell these tokens in caps.
    pub fn classify(inf_name: &str) -> Self {
        if inf_name.contains("UEFI") {
            FirmwareCategory::System
        } else if inf_name.contains("ME") {
            FirmwareCategory::ManagementEngine
        } else {
            FirmwareCategory::Device
        }
    }

    /// The AppStream category string written into the metainfo document.
    pub fn as_str(&self) -> &'static str {
        match self {
            FirmwareCategory::System => "X-System",
            FirmwareCategory::ManagementEngine => "X-ManagementEngine",
            FirmwareCategory::Device => "X-Device",
        }
    }
}
