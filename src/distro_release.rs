use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::AttributeMap;
use crate::error::SourceError;
use crate::os_release::OS_RELEASE_BASENAME;

/// Matches a release line *reversed*.
///
/// Version and codename sit at the end of lines such as
/// `CentOS release 7.2.1511 (Core)`, so reversing the line lets the
/// pattern anchor on them however long or oddly punctuated the name is.
/// Groups: reversed codename, reversed version, reversed name.
static RELEASE_LINE_REVERSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^)]*\)(.*)\()? *(?:STL )?([\d.+\-a-z]*\d) *(?:esaeler *)?(.+)")
        .expect("valid release line regex")
});

/// `<vendor>-release`, `<vendor>_version` and friends.
static RELEASE_BASENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)[-_](release|version)$").expect("valid basename regex"));

/// Files that match the naming convention but carry something else.
pub const IGNORED_BASENAMES: &[&str] = &[
    "debian_version",
    "lsb-release",
    "oem-release",
    OS_RELEASE_BASENAME,
    "system-release",
];

/// Scanned when the configuration directory cannot be listed. Known
/// vendors at the time of writing; not exhaustive.
pub const FALLBACK_BASENAMES: &[&str] = &[
    "SuSE-release",
    "arch-release",
    "base-release",
    "centos-release",
    "fedora-release",
    "gentoo-release",
    "mageia-release",
    "mandrake-release",
    "mandriva-release",
    "mandrivalinux-release",
    "manjaro-release",
    "oracle-release",
    "redhat-release",
    "sl-release",
    "slackware-version",
];

/// The distro-release source: the file it came from, if any, and what was
/// parsed out of it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DistroRelease {
    pub file: Option<PathBuf>,
    pub info: AttributeMap,
}

/// Vendor token of a distro-release base name, e.g. `centos` for
/// `centos-release`.
pub fn vendor_from_basename(basename: &str) -> Option<&str> {
    RELEASE_BASENAME
        .captures(basename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parses a single free-text release line into `name`, `version_id` and
/// `codename`. A line with no recognizable version becomes `name` alone.
pub fn parse_distro_release_content(line: &str) -> AttributeMap {
    let line = line.trim();
    let mut info = AttributeMap::new();
    let reversed: String = line.chars().rev().collect();

    if let Some(caps) = RELEASE_LINE_REVERSED.captures(&reversed) {
        let unreverse = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().chars().rev().collect::<String>())
                .filter(|s| !s.is_empty())
        };
        if let Some(name) = unreverse(3) {
            info.insert("name".to_string(), name);
        }
        if let Some(version) = unreverse(2) {
            info.insert("version_id".to_string(), version);
        }
        if let Some(codename) = unreverse(1) {
            info.insert("codename".to_string(), codename);
        }
    } else if !line.is_empty() {
        info.insert("name".to_string(), line.to_string());
    }
    info
}

/// Parses the first line of a distro-release file. Later lines (SLES has
/// several) are never read.
pub fn parse_distro_release_file(path: &Path) -> Result<AttributeMap, SourceError> {
    let file = fs::File::open(path).map_err(|e| SourceError::io(path, e))?;
    let mut first = Vec::new();
    BufReader::new(file)
        .read_until(b'\n', &mut first)
        .map_err(|e| SourceError::io(path, e))?;
    Ok(parse_distro_release_content(&String::from_utf8_lossy(&first)))
}

/// Reads a distro-release file the caller named explicitly.
///
/// The file is parsed whatever its name. The id comes from the base name
/// when it follows the naming convention, even if the file is empty or
/// unreadable, except that any CloudLinux name forces `cloudlinux`.
pub fn read_explicit(path: &Path) -> DistroRelease {
    let mut info = match parse_distro_release_file(path) {
        Ok(info) => info,
        Err(e) => {
            debug!("distro-release file unavailable: {e}");
            AttributeMap::new()
        }
    };

    let vendor = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(vendor_from_basename)
        .map(str::to_string);
    assign_id(&mut info, vendor);

    DistroRelease {
        file: Some(path.to_path_buf()),
        info,
    }
}

/// Searches `conf_dir` for the first distro-release file that yields a
/// name.
///
/// Candidates are visited in sorted order so that systems carrying several
/// release files (CentOS and Oracle also ship `redhat-release`) resolve
/// the same way every time.
pub fn locate(conf_dir: &Path) -> DistroRelease {
    scan(conf_dir, &candidate_basenames(conf_dir))
}

/// Tries `basenames` under `conf_dir` in the given order.
fn scan<S: AsRef<str>>(conf_dir: &Path, basenames: &[S]) -> DistroRelease {
    for basename in basenames {
        let basename = basename.as_ref();
        if IGNORED_BASENAMES.contains(&basename) {
            continue;
        }
        let Some(vendor) = vendor_from_basename(basename) else {
            continue;
        };

        let path = conf_dir.join(basename);
        let mut info = match parse_distro_release_file(&path) {
            Ok(info) => info,
            Err(e) => {
                debug!("skipping distro-release candidate: {e}");
                continue;
            }
        };
        if info.get("name").is_none_or(|name| name.is_empty()) {
            continue;
        }

        trace!("located distro-release file {}", path.display());
        assign_id(&mut info, Some(vendor.to_string()));
        return DistroRelease {
            file: Some(path),
            info,
        };
    }
    DistroRelease::default()
}

fn candidate_basenames(conf_dir: &Path) -> Vec<String> {
    match fs::read_dir(conf_dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .collect();
            names.sort();
            names
        }
        Err(source) => {
            let err = SourceError::DirectoryUnreadable {
                path: conf_dir.to_path_buf(),
                source,
            };
            debug!("{err}; falling back to well-known distro-release names");
            FALLBACK_BASENAMES.iter().map(|s| s.to_string()).collect()
        }
    }
}

fn assign_id(info: &mut AttributeMap, vendor: Option<String>) {
    let cloudlinux =
        info.get("name").is_some_and(|name| name.to_lowercase().contains("cloudlinux"));
    if cloudlinux {
        info.insert("id".to_string(), "cloudlinux".to_string());
    } else if let Some(vendor) = vendor {
        info.insert("id".to_string(), vendor);
    }
}
