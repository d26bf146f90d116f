//! Metainfo document rendering.
//!
//! The metainfo XML is produced by substituting `{SLOT}` markers in a fixed
//! template. A built-in template is compiled into the binary; a custom one
//! can be supplied per run. Rendering is strict: a marker left over after
//! substitution (a slot the renderer does not know) is an error rather than
//! silently shipping a broken document.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{DriverRecord, FirmwareCategory, FwcabError, Result};
use crate::hash::PayloadDigestPair;
use crate::version_format::VersionFormat;

/// The template shipped with fwcab.
pub const BUILTIN_TEMPLATE: &str = include_str!("template.metainfo.xml");

/// Everything the template can reference for one driver package.
#[derive(Debug, Clone)]
pub struct MetainfoContext<'a> {
    pub record: &'a DriverRecord,
    pub format: VersionFormat,
    pub digests: &'a PayloadDigestPair,
    /// INF base filename without extension.
    pub inf_name: &'a str,
    /// Device-family identifier, fixed per run (e.g. "Surface Pro (2017)").
    pub model_name: &'a str,
}

fn slot_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Z0-9_]+)\}").expect("static regex compiles"))
}

/// Render the metainfo document from the given template.
pub fn render(template: &str, ctx: &MetainfoContext<'_>) -> Result<String> {
    let category = FirmwareCategory::classify(ctx.inf_name);
    let slots: [(&str, String); 12] = [
        ("UEFIVER", ctx.record.firmware_version.to_string()),
        ("VERSIONFMT", ctx.format.name().to_string()),
        ("TIMESTAMP", ctx.record.release_timestamp().to_string()),
        ("CATEGORY", category.as_str().to_string()),
        ("MODELFMT", ctx.inf_name.to_string()),
        ("MODEL", ctx.model_name.to_string()),
        ("MSVER", ctx.record.driver_version.clone()),
        ("DEVICE", ctx.record.device_guid.clone()),
        ("FIRMWARE", ctx.inf_name.to_string()),
        ("FWFILE", ctx.record.firmware_file.clone()),
        ("FWSHA1", ctx.digests.sha1.clone()),
        ("FWSHA256", ctx.digests.sha256.clone()),
    ];

    let mut rendered = template.to_string();
    for (name, value) in &slots {
        rendered = rendered.replace(&format!("{{{name}}}"), value);
    }

    if let Some(leftover) = slot_regex().captures(&rendered) {
        return Err(FwcabError::UnknownTemplateSlot(leftover[1].to_string()));
    }

    Ok(rendered)
}

/// Load a custom template from disk.
pub fn load_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| FwcabError::TemplateUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_record() -> DriverRecord {
        DriverRecord {
            device_guid: "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee".to_string(),
            driver_version: "1.2.3.4".to_string(),
            driver_date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            firmware_version: 0x0102_0304,
            firmware_file: "firmware.bin".to_string(),
        }
    }

    fn sample_digests() -> PayloadDigestPair {
        PayloadDigestPair {
            sha1: "da39a3ee5e6b4b0d3255bfef95601890afd80709".to_string(),
            sha256: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
                .to_string(),
        }
    }

    #[test]
    fn builtin_template_renders_every_slot() {
        let record = sample_record();
        let digests = sample_digests();
        let ctx = MetainfoContext {
            record: &record,
            format: VersionFormat::Quad,
            digests: &digests,
            inf_name: "SurfaceUEFI",
            model_name: "Surface Pro (2017)",
        };
        let doc = render(BUILTIN_TEMPLATE, &ctx).unwrap();

        assert!(doc.contains("aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee"));
        assert!(doc.contains("quad"));
        assert!(doc.contains("16909060")); // raw version, decimal
        assert!(doc.contains("1577923200")); // 2020-01-02 midnight UTC
        assert!(doc.contains("X-System"));
        assert!(doc.contains("firmware.bin"));
        assert!(doc.contains(&digests.sha1));
        assert!(doc.contains(&digests.sha256));
        assert!(!doc.contains('{'));
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let record = sample_record();
        let digests = sample_digests();
        let ctx = MetainfoContext {
            record: &record,
            format: VersionFormat::Quad,
            digests: &digests,
            inf_name: "SurfaceME",
            model_name: "Surface Pro (2017)",
        };
        let err = render("<x>{NOT_A_SLOT}</x>", &ctx).unwrap_err();
        match err {
            FwcabError::UnknownTemplateSlot(name) => assert_eq!(name, "NOT_A_SLOT"),
            other => panic!("expected UnknownTemplateSlot, got {other:?}"),
        }
    }

    #[test]
    fn category_follows_inf_name() {
        let record = sample_record();
        let digests = sample_digests();
        let ctx = MetainfoContext {
            record: &record,
            format: VersionFormat::Surface,
            digests: &digests,
            inf_name: "SurfaceTouchpad",
            model_name: "Surface Pro (2017)",
        };
        let doc = render(BUILTIN_TEMPLATE, &ctx).unwrap();
        assert!(doc.contains("X-Device"));
    }

    #[test]
    fn missing_custom_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_template(&dir.path().join("nope.xml")).unwrap_err();
        assert!(matches!(err, FwcabError::TemplateUnreadable { .. }));
    }
}
