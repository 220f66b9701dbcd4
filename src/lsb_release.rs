use crate::AttributeMap;
use crate::command::CommandRunner;
use crate::error::SourceError;

const LSB_RELEASE: &str = "lsb_release";

/// Runs `lsb_release -a` and parses its output.
pub fn read_lsb_release(runner: &impl CommandRunner) -> Result<AttributeMap, SourceError> {
    let lines = runner.stdout_lines(LSB_RELEASE, &["-a"])?;
    Ok(parse_lsb_release_content(&lines))
}

/// Parses `Label: Value` lines. Labels are lower-cased with spaces turned
/// into underscores, so `Distributor ID` becomes `distributor_id`.
pub fn parse_lsb_release_content<S: AsRef<str>>(lines: &[S]) -> AttributeMap {
    let mut props = AttributeMap::new();
    for line in lines {
        let line = line.as_ref().trim_end_matches('\n');
        let Some((k, v)) = line.split_once(':') else {
            continue;
        };
        props.insert(k.replace(' ', "_").to_lowercase(), v.trim().to_string());
    }
    props
}
