//! fwcab Core Library
//!
//! Turns Windows INF firmware driver packages into fwupd-consumable
//! cabinet bundles: INF decoding and field extraction, version format
//! inference, payload hashing, metainfo rendering, and orchestration of
//! the external `gcab`/`msiextract` tools.

pub mod bundle;
pub mod domain;
pub mod encoding;
pub mod hash;
pub mod inf;
pub mod metainfo;
pub mod telemetry;
pub mod tools;
pub mod version_format;

pub use bundle::{
    discover_infs, process_dir, process_inf, process_msi, BatchReport, BundleOptions,
    FileOutcome, FileReport,
};
pub use domain::{
    DriverRecord, FirmwareCategory, FwcabError, MissingFields, RecordField, Result, SkipReason,
};
pub use encoding::{detect_file, TextEncoding};
pub use hash::{hash_payload, PayloadDigestPair};
pub use inf::{extract_record, InfDocument};
pub use metainfo::{MetainfoContext, BUILTIN_TEMPLATE};
pub use telemetry::init_tracing;
pub use tools::ToolContext;
pub use version_format::{bcd, resolve, VersionFormat};
