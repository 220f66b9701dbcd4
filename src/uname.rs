use std::sync::LazyLock;

use regex::Regex;

use crate::AttributeMap;
use crate::command::CommandRunner;
use crate::error::SourceError;

static UNAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+([\d.]+)").expect("valid uname regex"));

/// Runs `uname -rs` and parses its output.
pub fn read_uname(runner: &impl CommandRunner) -> Result<AttributeMap, SourceError> {
    let lines = runner.stdout_lines("uname", &["-rs"])?;
    Ok(parse_uname_content(&lines))
}

/// Parses the first line of `uname -rs` output.
///
/// A plain `Linux` kernel name says nothing about the distribution, so it
/// yields an empty map rather than a misleading id.
pub fn parse_uname_content<S: AsRef<str>>(lines: &[S]) -> AttributeMap {
    let mut props = AttributeMap::new();
    let Some(first) = lines.first() else {
        return props;
    };
    let Some(caps) = UNAME_LINE.captures(first.as_ref().trim()) else {
        return props;
    };

    let name = &caps[1];
    if name == "Linux" {
        return props;
    }
    props.insert("id".to_string(), name.to_lowercase());
    props.insert("name".to_string(), name.to_string());
    props.insert("release".to_string(), caps[2].to_string());
    props
}
