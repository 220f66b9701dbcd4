use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::AttributeMap;
use crate::error::SourceError;

pub const OS_RELEASE_BASENAME: &str = "os-release";

/// A codename embedded in VERSION, e.g. `18.04.1 LTS (Bionic Beaver)` or
/// `16.04, Xenial Xerus`.
static VERSION_CODENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\(\D+\))|,(\s+)?\D+").expect("valid codename regex"));

pub fn parse_os_release(path: &Path) -> Result<AttributeMap, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::io(path, e))?;
    parse_os_release_from_reader(file).map_err(|e| SourceError::io(path, e))
}

pub fn parse_os_release_from_reader<R: Read>(mut reader: R) -> std::io::Result<AttributeMap> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    Ok(parse_os_release_content(&String::from_utf8_lossy(&raw)))
}

/// Parses os-release content into a map keyed by lower-cased variable name.
///
/// The content is split into shell words first, so quoting, escapes, line
/// continuations and comments behave as they would when the file is
/// sourced. Words that are not `KEY=VALUE` assignments are ignored.
pub fn parse_os_release_content(content: &str) -> AttributeMap {
    let mut props = AttributeMap::new();

    for word in split_words(content) {
        if let Some((k, v)) = word.split_once('=') {
            props.insert(k.to_lowercase(), v.to_string());
        }
    }

    let codename = if let Some(codename) = props.get("version_codename") {
        Some(codename.clone())
    } else if let Some(codename) = props.get("ubuntu_codename") {
        Some(codename.clone())
    } else {
        props.get("version").and_then(|v| codename_from_version(v))
    };
    if let Some(codename) = codename {
        props.insert("codename".to_string(), codename);
    }

    props
}

fn codename_from_version(version: &str) -> Option<String> {
    let found = VERSION_CODENAME.find(version)?.as_str();
    let codename = found
        .trim_matches(|c| c == '(' || c == ')')
        .trim_matches(',')
        .trim();
    Some(codename.to_string())
}

/// Splits `content` into shell words.
///
/// Content that does not split as a whole (an unterminated quote, a
/// trailing backslash) is split again line by line, and only the lines
/// that still fail are dropped.
fn split_words(content: &str) -> Vec<String> {
    let content = strip_glued_comments(content);
    match shell_words::split(&content) {
        Ok(words) => words,
        Err(e) => {
            debug!("os-release content does not split cleanly ({e}); retrying per line");
            content
                .lines()
                .filter_map(|line| match shell_words::split(line) {
                    Ok(words) => Some(words),
                    Err(e) => {
                        debug!("skipping malformed os-release line {line:?}: {e}");
                        None
                    }
                })
                .flatten()
                .collect()
        }
    }
}

/// Drops an unquoted `#` that directly follows a word, together with the
/// rest of its line, so `ID=arch#x` reads as `ID=arch`. A `#` that starts a
/// word is left for the splitter, which treats it as a comment. Unquoted
/// carriage returns become plain separators.
fn strip_glued_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut quote = None;
    let mut after_word = false;
    let mut chars = content.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (None, '#') if after_word => {
                if chars.by_ref().any(|skipped| skipped == '\n') {
                    out.push('\n');
                }
                after_word = false;
                continue;
            }
            (None, '\\') | (Some('"'), '\\') => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
                after_word = true;
                continue;
            }
            (None, '\r') => {
                out.push(' ');
                after_word = false;
                continue;
            }
            (None, '\'' | '"') => quote = Some(c),
            (Some(open), _) if open == c => quote = None,
            _ => {}
        }
        out.push(c);
        after_word = quote.is_some() || !c.is_whitespace();
    }
    out
}
