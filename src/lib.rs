//! Linux distribution detection.
//!
//! Information is gathered from four local sources (the os-release file,
//! `lsb_release -a`, distro-release files such as `/etc/centos-release`
//! and `uname -rs`) and reconciled by [`LinuxDistribution`] using a fixed
//! precedence order.

pub mod command;
pub mod config;
pub mod distribution;
pub mod distro_release;
pub mod error;
pub mod lsb_release;
pub mod normalize;
pub mod os_release;
pub mod uname;

/// A flat mapping of lower-cased attribute name to value, as produced by
/// each source parser. An empty map means the source had nothing to say.
pub type AttributeMap = std::collections::HashMap<String, String>;

pub use command::{CommandRunner, SystemCommandRunner};
pub use config::Config;
pub use distribution::{DistroInfo, LinuxDistribution, VersionParts};
pub use error::SourceError;
