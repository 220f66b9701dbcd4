//! Canonical ids for vendor-specific spellings.
//!
//! Each source family spells some distributions differently, so each gets
//! its own table. Ids missing from a table are returned unchanged.

/// Values of `ID` in os-release files.
pub const NORMALIZED_OS_ID: &[(&str, &str)] = &[
    ("ol", "oracle"), // Oracle Linux
];

/// Values of `Distributor ID` reported by `lsb_release`.
pub const NORMALIZED_LSB_ID: &[(&str, &str)] = &[
    ("enterpriseenterprise", "oracle"), // Oracle Enterprise Linux
    ("redhatenterpriseworkstation", "rhel"), // RHEL 6, 7 Workstation
    ("redhatenterpriseserver", "rhel"), // RHEL 6, 7 Server
];

/// Ids derived from distro-release file names and from uname.
pub const NORMALIZED_DISTRO_ID: &[(&str, &str)] = &[
    ("redhat", "rhel"), // RHEL 6.x, 7.x
];

/// Lower-cases `raw`, turns blanks into underscores and maps the result
/// through `table`.
pub fn normalize(raw: &str, table: &[(&str, &str)]) -> String {
    let id = raw.to_lowercase().replace(' ', "_");
    table
        .iter()
        .find(|(from, _)| *from == id)
        .map(|(_, to)| to.to_string())
        .unwrap_or(id)
}
