use std::cell::OnceCell;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::AttributeMap;
use crate::command::{CommandRunner, SystemCommandRunner};
use crate::config::Config;
use crate::distro_release::{self, DistroRelease, parse_distro_release_content};
use crate::error::SourceError;
use crate::lsb_release::read_lsb_release;
use crate::normalize::{NORMALIZED_DISTRO_ID, NORMALIZED_LSB_ID, NORMALIZED_OS_ID, normalize};
use crate::os_release::parse_os_release;
use crate::uname::read_uname;

static VERSION_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.?(\d+)?\.?(\d+)?").expect("valid version regex"));

/// Major, minor and build number of a version string. Missing parts are
/// empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct VersionParts {
    pub major: String,
    pub minor: String,
    pub build_number: String,
}

impl VersionParts {
    pub fn parse(version: &str) -> Self {
        let Some(caps) = VERSION_PARTS.captures(version) else {
            return Self::default();
        };
        let part = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
        Self {
            major: part(1),
            minor: part(2),
            build_number: part(3),
        }
    }
}

/// Summary of the detected distribution.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DistroInfo {
    pub id: String,
    pub version: String,
    pub version_parts: VersionParts,
    pub like: String,
    pub codename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    OsRelease,
    LsbRelease,
    DistroRelease,
    Uname,
}

impl Source {
    fn id_table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Source::OsRelease => NORMALIZED_OS_ID,
            Source::LsbRelease => NORMALIZED_LSB_ID,
            Source::DistroRelease | Source::Uname => NORMALIZED_DISTRO_ID,
        }
    }
}

/// Resolves distribution attributes from os-release, `lsb_release`,
/// distro-release files and `uname`, in that order of precedence.
///
/// Every source is read at most once per instance, on first use, and kept
/// until the instance is dropped. The cache is not synchronized: share an
/// instance across threads only behind a lock, or create one per thread.
///
/// No accessor fails. A source that cannot be read counts as empty, and an
/// attribute no source provides is the empty string.
pub struct LinuxDistribution<R: CommandRunner = SystemCommandRunner> {
    config: Config,
    runner: R,
    os_release: OnceCell<AttributeMap>,
    lsb_release: OnceCell<AttributeMap>,
    distro_release: OnceCell<DistroRelease>,
    uname: OnceCell<AttributeMap>,
}

impl LinuxDistribution {
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, SystemCommandRunner)
    }
}

impl<R: CommandRunner> LinuxDistribution<R> {
    /// Uses `runner` to invoke `lsb_release` and `uname`.
    pub fn with_runner(config: Config, runner: R) -> Self {
        Self {
            config,
            runner,
            os_release: OnceCell::new(),
            lsb_release: OnceCell::new(),
            distro_release: OnceCell::new(),
            uname: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Canonical distribution id, e.g. `ubuntu`, `rhel` or `oracle`.
    pub fn id(&self) -> String {
        let chain = [
            (Source::OsRelease, "id"),
            (Source::LsbRelease, "distributor_id"),
            (Source::DistroRelease, "id"),
            (Source::Uname, "id"),
        ];
        match self.first_attr(&chain) {
            Some((source, raw)) => normalize(raw, source.id_table()),
            None => String::new(),
        }
    }

    /// Distribution name, e.g. `CentOS Linux`.
    ///
    /// With `pretty`, the os-release `PRETTY_NAME` or lsb description is
    /// preferred; failing both, the name is followed by the pretty version.
    pub fn name(&self, pretty: bool) -> String {
        if pretty {
            if let Some((_, name)) = self.first_attr(&[
                (Source::OsRelease, "pretty_name"),
                (Source::LsbRelease, "description"),
            ]) {
                return name.to_string();
            }
            let name = self.first_attr_or_empty(&[
                (Source::DistroRelease, "name"),
                (Source::Uname, "name"),
            ]);
            let version = self.version(true, false);
            return if version.is_empty() {
                name.to_string()
            } else {
                format!("{name} {version}")
            };
        }

        self.first_attr_or_empty(&[
            (Source::OsRelease, "name"),
            (Source::LsbRelease, "distributor_id"),
            (Source::DistroRelease, "name"),
            (Source::Uname, "name"),
        ])
        .to_string()
    }

    /// Distribution version, e.g. `7.2.1511`.
    ///
    /// With `best`, the candidate with the most dot-separated parts wins
    /// instead of the first one found. With `pretty`, the codename is
    /// appended in parentheses.
    pub fn version(&self, pretty: bool, best: bool) -> String {
        let from_pretty_name =
            parse_distro_release_content(self.os_release_attr("pretty_name"));
        let from_description =
            parse_distro_release_content(self.lsb_release_attr("description"));
        let candidates = [
            self.os_release_attr("version_id"),
            self.lsb_release_attr("release"),
            self.distro_release_attr("version_id"),
            attr(&from_pretty_name, "version_id"),
            attr(&from_description, "version_id"),
            self.uname_attr("release"),
        ];

        let mut version = "";
        for candidate in candidates {
            if candidate.is_empty() {
                continue;
            }
            if !best {
                version = candidate;
                break;
            }
            if version.is_empty() || candidate.split('.').count() > version.split('.').count() {
                version = candidate;
            }
        }

        if pretty && !version.is_empty() {
            let codename = self.codename();
            if !codename.is_empty() {
                return format!("{version} ({codename})");
            }
        }
        version.to_string()
    }

    pub fn version_parts(&self, best: bool) -> VersionParts {
        VersionParts::parse(&self.version(false, best))
    }

    pub fn major_version(&self, best: bool) -> String {
        self.version_parts(best).major
    }

    pub fn minor_version(&self, best: bool) -> String {
        self.version_parts(best).minor
    }

    pub fn build_number(&self, best: bool) -> String {
        self.version_parts(best).build_number
    }

    /// Space-separated ids of related distributions (os-release `ID_LIKE`).
    pub fn like(&self) -> String {
        self.os_release_attr("id_like").to_string()
    }

    pub fn codename(&self) -> String {
        self.first_attr_or_empty(&[
            (Source::OsRelease, "codename"),
            (Source::LsbRelease, "codename"),
            (Source::DistroRelease, "codename"),
        ])
        .to_string()
    }

    pub fn info(&self, pretty: bool, best: bool) -> DistroInfo {
        DistroInfo {
            id: self.id(),
            version: self.version(pretty, best),
            version_parts: self.version_parts(best),
            like: self.like(),
            codename: self.codename(),
        }
    }

    /// `(name, version, codename)`, with the id in place of the name unless
    /// `full_distribution_name` is set.
    pub fn linux_distribution(&self, full_distribution_name: bool) -> (String, String, String) {
        let name = if full_distribution_name {
            self.name(false)
        } else {
            self.id()
        };
        (name, self.version(false, false), self.codename())
    }

    pub fn os_release_attr(&self, attribute: &str) -> &str {
        attr(self.os_release_info(), attribute)
    }

    pub fn lsb_release_attr(&self, attribute: &str) -> &str {
        attr(self.lsb_release_info(), attribute)
    }

    pub fn distro_release_attr(&self, attribute: &str) -> &str {
        attr(self.distro_release_info(), attribute)
    }

    pub fn uname_attr(&self, attribute: &str) -> &str {
        attr(self.uname_info(), attribute)
    }

    fn source_attr(&self, source: Source, attribute: &str) -> &str {
        match source {
            Source::OsRelease => self.os_release_attr(attribute),
            Source::LsbRelease => self.lsb_release_attr(attribute),
            Source::DistroRelease => self.distro_release_attr(attribute),
            Source::Uname => self.uname_attr(attribute),
        }
    }

    /// First non-empty value along `chain`. Sources after the one that
    /// answers are not read.
    fn first_attr(&self, chain: &[(Source, &str)]) -> Option<(Source, &str)> {
        chain.iter().find_map(|&(source, attribute)| {
            let value = self.source_attr(source, attribute);
            (!value.is_empty()).then_some((source, value))
        })
    }

    fn first_attr_or_empty(&self, chain: &[(Source, &str)]) -> &str {
        self.first_attr(chain).map(|(_, value)| value).unwrap_or("")
    }

    pub fn os_release_info(&self) -> &AttributeMap {
        self.os_release.get_or_init(|| {
            let path = self.config.os_release_path();
            or_empty("os-release", parse_os_release(&path))
        })
    }

    pub fn lsb_release_info(&self) -> &AttributeMap {
        self.lsb_release.get_or_init(|| {
            if !self.config.include_lsb {
                return AttributeMap::new();
            }
            or_empty("lsb_release", read_lsb_release(&self.runner))
        })
    }

    pub fn distro_release_info(&self) -> &AttributeMap {
        &self.distro_release().info
    }

    pub fn uname_info(&self) -> &AttributeMap {
        self.uname.get_or_init(|| {
            if !self.config.include_uname {
                return AttributeMap::new();
            }
            or_empty("uname", read_uname(&self.runner))
        })
    }

    /// The distro-release file in use: the configured one, or the one found
    /// in the configuration directory.
    pub fn distro_release_file(&self) -> Option<&Path> {
        self.distro_release().file.as_deref()
    }

    fn distro_release(&self) -> &DistroRelease {
        self.distro_release.get_or_init(|| {
            let release = match &self.config.distro_release_file {
                Some(path) => distro_release::read_explicit(path),
                None => distro_release::locate(&self.config.unix_conf_dir),
            };
            trace!("distro-release source: {:?}", release);
            release
        })
    }
}

fn or_empty(source: &str, result: Result<AttributeMap, SourceError>) -> AttributeMap {
    match result {
        Ok(props) => {
            trace!("{source} source: {:?}", props);
            props
        }
        Err(e) => {
            debug!("{source} source unavailable: {e}");
            AttributeMap::new()
        }
    }
}

fn attr<'a>(props: &'a AttributeMap, attribute: &str) -> &'a str {
    props.get(attribute).map(String::as_str).unwrap_or("")
}
