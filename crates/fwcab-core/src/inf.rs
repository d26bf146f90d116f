//! Tolerant line-oriented INF parsing and field extraction.
//!
//! INF files are `.ini`-shaped: `[Section]` headers, `key = value`
//! assignments, bare directive lines (registry AddReg rows, CopyFiles
//! entries) and `;` comments. We do not attempt the full INF grammar; the
//! parser keeps sections as ordered key/value pairs and the extractor looks
//! up exactly the four fields fwcab needs. An absent field is a named,
//! reportable absence rather than a crash further down the pipeline.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::{DriverRecord, MissingFields, RecordField};

/// One parsed line inside a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfEntry {
    /// Key of a `key = value` line; `None` for bare directive lines.
    pub key: Option<String>,
    /// Value of a `key = value` line, or the whole directive line.
    pub value: String,
}

/// A `[Name]` section with its entries in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfSection {
    pub name: String,
    pub entries: Vec<InfEntry>,
}

/// Structured view of one INF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfDocument {
    sections: Vec<InfSection>,
}

impl InfDocument {
    /// Parse decoded INF text. Never fails; unrecognised lines are kept as
    /// bare entries so token scans still see them.
    pub fn parse(text: &str) -> InfDocument {
        let mut sections: Vec<InfSection> = Vec::new();

        for raw_line in text.lines() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            if let Some(name) = section_header(line) {
                sections.push(InfSection {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                continue;
            }

            let entry = match line.split_once('=') {
                Some((key, value)) => InfEntry {
                    key: Some(key.trim().to_string()),
                    value: value.trim().to_string(),
                },
                None => InfEntry {
                    key: None,
                    value: line.to_string(),
                },
            };

            // Lines before the first header land in an unnamed section.
            if sections.is_empty() {
                sections.push(InfSection {
                    name: String::new(),
                    entries: Vec::new(),
                });
            }
            sections
                .last_mut()
                .expect("sections is non-empty here")
                .entries
                .push(entry);
        }

        InfDocument { sections }
    }

    /// First section with the given name, case-insensitive.
    pub fn section(&self, name: &str) -> Option<&InfSection> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Value of `key` in section `section`, case-insensitive on both.
    pub fn get_value(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.entries.iter().find_map(|e| {
            e.key
                .as_deref()
                .filter(|k| k.eq_ignore_ascii_case(key))
                .map(|_| e.value.as_str())
        })
    }

    /// Value of `key` in any section, searched in file order.
    pub fn find_value(&self, key: &str) -> Option<&str> {
        self.sections.iter().find_map(|s| {
            s.entries.iter().find_map(|e| {
                e.key
                    .as_deref()
                    .filter(|k| k.eq_ignore_ascii_case(key))
                    .map(|_| e.value.as_str())
            })
        })
    }

    fn all_sections(&self) -> &[InfSection] {
        &self.sections
    }
}

fn section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.find(']')?;
    Some(rest[..end].trim())
}

/// Cut a trailing `;` comment, respecting double-quoted strings.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return &line[..idx],
            _ => {}
        }
    }
    line
}

fn guid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Firmware_Install,\s*UEFI\\RES_\{([^}]+)\}")
            .expect("static regex compiles")
    })
}

/// Extract a complete [`DriverRecord`] from decoded INF text.
///
/// All four fields are attempted regardless of earlier failures so the
/// skip diagnostic can name everything that is absent at once.
pub fn extract_record(text: &str) -> Result<DriverRecord, MissingFields> {
    let doc = InfDocument::parse(text);

    // The firmware-install association may span lines, so the token scan
    // runs over comment-stripped text rather than a section lookup.
    let stripped: String = text
        .lines()
        .map(strip_comment)
        .collect::<Vec<_>>()
        .join("\n");
    let device_guid = guid_regex()
        .captures(&stripped)
        .map(|c| c[1].to_lowercase());

    let driver_ver = extract_driver_ver(&doc);
    let firmware_version = extract_firmware_version(&doc);
    let firmware_file = extract_firmware_file(&doc);

    let mut missing = Vec::new();
    if device_guid.is_none() {
        missing.push(RecordField::DeviceGuid);
    }
    if driver_ver.is_none() {
        missing.push(RecordField::DriverVersion);
    }
    if firmware_version.is_none() {
        missing.push(RecordField::FirmwareVersion);
    }
    if firmware_file.is_none() {
        missing.push(RecordField::FirmwareFile);
    }
    if !missing.is_empty() {
        return Err(MissingFields(missing));
    }

    let (driver_date, driver_version) = driver_ver.expect("checked above");
    Ok(DriverRecord {
        device_guid: device_guid.expect("checked above"),
        driver_version,
        driver_date,
        firmware_version: firmware_version.expect("checked above"),
        firmware_file: firmware_file.expect("checked above"),
    })
}

/// `DriverVer = MM/DD/YYYY,<version>`, usually under `[Version]` but
/// looked up anywhere as a fallback.
fn extract_driver_ver(doc: &InfDocument) -> Option<(NaiveDate, String)> {
    let value = doc
        .get_value("Version", "DriverVer")
        .or_else(|| doc.find_value("DriverVer"))?;
    let (date_part, version_part) = value.split_once(',')?;
    let date = NaiveDate::parse_from_str(date_part.trim(), "%m/%d/%Y").ok()?;
    let version: String = version_part
        .trim_start()
        .chars()
        .take_while(|c| !c.is_whitespace())
        .collect();
    if version.is_empty() {
        return None;
    }
    Some((date, version))
}

/// `HKR,,FirmwareVersion,%REG_DWORD%,0x...` registry directive, in any
/// AddReg-style section.
fn extract_firmware_version(doc: &InfDocument) -> Option<u32> {
    for section in doc.all_sections() {
        for entry in &section.entries {
            if entry.key.is_some() {
                continue;
            }
            let fields: Vec<&str> = entry.value.split(',').map(str::trim).collect();
            if fields.len() < 5
                || !fields[0].eq_ignore_ascii_case("HKR")
                || !fields[2].eq_ignore_ascii_case("FirmwareVersion")
                || !fields[3].eq_ignore_ascii_case("%REG_DWORD%")
            {
                continue;
            }
            let literal = fields[4];
            let Some(hex) = literal
                .strip_prefix("0x")
                .or_else(|| literal.strip_prefix("0X"))
            else {
                continue;
            };
            if let Ok(value) = u32::from_str_radix(hex, 16) {
                return Some(value);
            }
        }
    }
    None
}

/// First file named in `[Firmware_CopyFiles]`. CopyFiles rows may carry
/// `dest,source` pairs; only the first token matters.
fn extract_firmware_file(doc: &InfDocument) -> Option<String> {
    let section = doc.section("Firmware_CopyFiles")?;
    let first = section.entries.first()?;
    let token: String = first
        .value
        .split([',', ' ', '\t'])
        .next()
        .unwrap_or_default()
        .to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
