//! YAML run descriptions: a scenario file names the element set, the time
//! span and the sampling grid, so a run is reproducible from one artifact.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::propagator::GravityModel;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("bad {field}: {message}")]
    Duration {
        field: &'static str,
        message: String,
    },
    #[error("scenario needs either `file` or inline `line1`/`line2` under `tle`")]
    MissingTle,
    #[error("TLE text must contain two element lines (optionally preceded by a name)")]
    TleText,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub tle: TleSource,
    /// Propagation span, humantime form ("90h", "2days 12h").
    pub duration: String,
    /// Sampling interval, humantime form ("10m", "30s").
    pub step: String,
    #[serde(default)]
    pub gravity_model: GravityModel,
    /// Accept element lines whose checksum column is wrong.
    #[serde(default)]
    pub skip_checksum: bool,
    #[serde(default)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TleSource {
    /// Path to a TLE file; the first element set in it is used.
    pub file: Option<PathBuf>,
    pub line1: Option<String>,
    pub line2: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format {other:?} (table, json)")),
        }
    }
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn duration_minutes(&self) -> Result<f64, ScenarioError> {
        parse_minutes("duration", &self.duration)
    }

    pub fn step_minutes(&self) -> Result<f64, ScenarioError> {
        parse_minutes("step", &self.step)
    }

    /// Resolve the element lines, reading the referenced file if needed.
    pub fn tle_lines(&self) -> Result<(Option<String>, String, String), ScenarioError> {
        if let (Some(line1), Some(line2)) = (self.line1(), self.line2()) {
            return Ok((None, line1.to_string(), line2.to_string()));
        }
        let Some(file) = &self.tle.file else {
            return Err(ScenarioError::MissingTle);
        };
        split_tle_text(&fs::read_to_string(file)?)
    }

    fn line1(&self) -> Option<&str> {
        self.tle.line1.as_deref()
    }

    fn line2(&self) -> Option<&str> {
        self.tle.line2.as_deref()
    }
}

fn parse_minutes(field: &'static str, text: &str) -> Result<f64, ScenarioError> {
    humantime::parse_duration(text.trim())
        .map(|d| d.as_secs_f64() / 60.0)
        .map_err(|e| ScenarioError::Duration {
            field,
            message: e.to_string(),
        })
}

/// Split free-form TLE text into (name, line1, line2). Accepts the plain
/// two-line form and the three-line form with a leading name.
pub fn split_tle_text(text: &str) -> Result<(Option<String>, String, String), ScenarioError> {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
        .collect();

    for (i, line) in lines.iter().enumerate() {
        if line.starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            let name = if i > 0 {
                Some(lines[i - 1].trim().to_string())
            } else {
                None
            };
            return Ok((name, lines[i].to_string(), lines[i + 1].to_string()));
        }
    }
    Err(ScenarioError::TleText)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inline_scenario() {
        let yaml = r#"
tle:
  line1: "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927"
  line2: "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537"
duration: 90h
step: 10m
output: json
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.duration_minutes().unwrap(), 5400.0);
        assert_eq!(scenario.step_minutes().unwrap(), 10.0);
        assert_eq!(scenario.output, OutputFormat::Json);
        assert_eq!(scenario.gravity_model, GravityModel::Wgs84);
        assert!(!scenario.skip_checksum);
        let (name, l1, l2) = scenario.tle_lines().unwrap();
        assert!(name.is_none());
        assert!(l1.starts_with("1 25544"));
        assert!(l2.starts_with("2 25544"));
    }

    #[test]
    fn rejects_bad_duration() {
        let yaml = "tle: {line1: a, line2: b}\nduration: soon\nstep: 10m\n";
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            scenario.duration_minutes(),
            Err(ScenarioError::Duration { field: "duration", .. })
        ));
    }

    #[test]
    fn missing_tle_source_is_reported() {
        let yaml = "tle: {}\nduration: 1h\nstep: 1m\n";
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(scenario.tle_lines(), Err(ScenarioError::MissingTle)));
    }

    #[test]
    fn splits_named_tle_text() {
        let text = "ISS (ZARYA)\n1 25544U ...\n2 25544 ...\n";
        let (name, l1, l2) = split_tle_text(text).unwrap();
        assert_eq!(name.as_deref(), Some("ISS (ZARYA)"));
        assert!(l1.starts_with("1 "));
        assert!(l2.starts_with("2 "));
    }

    #[test]
    fn splits_bare_pair() {
        let text = "1 25544U ...\n2 25544 ...\n";
        let (name, _, _) = split_tle_text(text).unwrap();
        assert!(name.is_none());
    }

    #[test]
    fn garbage_text_is_rejected() {
        assert!(matches!(
            split_tle_text("not\na\ntle\n"),
            Err(ScenarioError::TleText)
        ));
    }
}
