//! Domain types for driver package processing.

pub mod error;
pub mod record;

pub use error::{FwcabError, Result};
pub use record::{DriverRecord, FirmwareCategory, MissingFields, RecordField, SkipReason};
