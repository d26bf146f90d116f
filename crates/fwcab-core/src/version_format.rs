//! Numeric-to-string firmware version encodings and format inference.
//!
//! fwupd needs to know how a device stringifies its 32-bit firmware version
//! number. Vendor INFs never state this, but they do carry both the raw
//! number (`FirmwareVersion` registry value) and a human-readable version
//! (`DriverVer`). The resolver tries each known encoding against the raw
//! number and picks the one whose rendering appears inside the driver
//! version string.
//!
//! The encodings mirror fwupd's `FwupdVersionFormat` bit-field definitions.

/// A known u32 -> string version encoding.
///
/// Rendering is total and deterministic over the full u32 domain; no
/// variant can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionFormat {
    /// Undecomposed decimal.
    Plain,
    /// AA.BB from 16/16 bits.
    Pair,
    /// AA.BB.CC from 8/8/16 bits.
    Triplet,
    /// AA.BB.CC.DD from 8/8/8/8 bits.
    Quad,
    /// Quad with each byte reinterpreted as two base-10 nibbles.
    Bcd,
    /// Intel ME: 3/5/8/16 bits, top field offset by 0x0b.
    IntelMe,
    /// Intel ME (CSME): 4/4/8/16 bits.
    IntelMe2,
    /// Legacy Surface: 10/12/10 bits.
    SurfaceLegacy,
    /// Surface: 8/16/8 bits.
    Surface,
}

impl VersionFormat {
    /// All formats in resolver priority order, least specific first.
    ///
    /// The first format whose rendering matches wins; keeping the generic
    /// decompositions ahead of the vendor-specific ones makes a
    /// coincidental multi-match resolve stably.
    pub const ALL: [VersionFormat; 9] = [
        VersionFormat::Plain,
        VersionFormat::Pair,
        VersionFormat::Triplet,
        VersionFormat::Quad,
        VersionFormat::Bcd,
        VersionFormat::IntelMe,
        VersionFormat::IntelMe2,
        VersionFormat::SurfaceLegacy,
        VersionFormat::Surface,
    ];

    /// Format name as fwupd spells it in metainfo documents.
    pub fn name(&self) -> &'static str {
        match self {
            VersionFormat::Plain => "plain",
            VersionFormat::Pair => "pair",
            VersionFormat::Triplet => "triplet",
            VersionFormat::Quad => "quad",
            VersionFormat::Bcd => "BCD",
            VersionFormat::IntelMe => "intel-me",
            VersionFormat::IntelMe2 => "intel-me2",
            VersionFormat::SurfaceLegacy => "surface-legacy",
            VersionFormat::Surface => "surface",
        }
    }

    /// Stringify a raw firmware version under this encoding.
    pub fn render(&self, version: u32) -> String {
        match self {
            VersionFormat::Plain => format!("{version}"),
            VersionFormat::Pair => {
                format!("{}.{}", (version >> 16) & 0xffff, version & 0xffff)
            }
            VersionFormat::Triplet => format!(
                "{}.{}.{}",
                (version >> 24) & 0xff,
                (version >> 16) & 0xff,
                version & 0xffff
            ),
            VersionFormat::Quad => format!(
                "{}.{}.{}.{}",
                (version >> 24) & 0xff,
                (version >> 16) & 0xff,
                (version >> 8) & 0xff,
                version & 0xff
            ),
            VersionFormat::Bcd => format!(
                "{}.{}.{}.{}",
                bcd(((version >> 24) & 0xff) as u8),
                bcd(((version >> 16) & 0xff) as u8),
                bcd(((version >> 8) & 0xff) as u8),
                bcd((version & 0xff) as u8)
            ),
            VersionFormat::IntelMe => format!(
                "{}.{}.{}.{}",
                ((version >> 29) & 0x07) + 0x0b,
                (version >> 24) & 0x1f,
                (version >> 16) & 0xff,
                version & 0xffff
            ),
            VersionFormat::IntelMe2 => format!(
                "{}.{}.{}.{}",
                (version >> 28) & 0x0f,
                (version >> 24) & 0x0f,
                (version >> 16) & 0xff,
                version & 0xffff
            ),
            VersionFormat::SurfaceLegacy => format!(
                "{}.{}.{}",
                (version >> 22) & 0x3ff,
                (version >> 10) & 0xfff,
                version & 0x3ff
            ),
            VersionFormat::Surface => format!(
                "{}.{}.{}",
                (version >> 24) & 0xff,
                (version >> 8) & 0xffff,
                version & 0xff
            ),
        }
    }
}

/// Decode one byte as two packed base-10 nibbles.
///
/// No validation: nibbles above 9 still decode through the fixed
/// arithmetic (0xFF -> 165), matching fwupd.
pub fn bcd(value: u8) -> u8 {
    ((value >> 4) & 0x0f) * 10 + (value & 0x0f)
}

/// Find the encoding whose rendering of `firmware_version` occurs as a
/// substring of the human-readable `driver_version`.
///
/// Iterates [`VersionFormat::ALL`] in order; first match wins.
pub fn resolve(firmware_version: u32, driver_version: &str) -> Option<VersionFormat> {
    VersionFormat::ALL
        .iter()
        .copied()
        .find(|format| driver_version.contains(&format.render(firmware_version)))
}
