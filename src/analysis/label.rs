//! Experiment label decoding.
//!
//! Incast trace files are named `<profile>_<scheme>_s<senders>.xml`, e.g.
//! `incast_dctcp_s128.xml` or `incast_a10_s16.xml` (PBS with alpha = 10).

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Match: "<profile>_<dctcp|a<alpha>>_s<senders>"
static LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<profile>[^_]+)_(?P<scheme>dctcp|a[^_]+)_s(?P<senders>\d+)$")
        .expect("Invalid label regex")
});

/// Errors that can occur while decoding an experiment label
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LabelError {
    #[error("File name {name:?} does not match <profile>_<scheme>_s<senders>")]
    UnrecognizedName { name: String },

    #[error("Sender count in {name:?} is out of range")]
    SenderCount { name: String },
}

/// Congestion control / scheduling scheme of a run
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum Scheme {
    Dctcp,
    /// PBS scheduling; alpha is kept as written in the file name
    Pbs { alpha: String },
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Dctcp => write!(f, "dctcp"),
            Scheme::Pbs { alpha } => write!(f, "alpha = {}", alpha),
        }
    }
}

/// Experiment parameters decoded from a trace file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExperimentLabel {
    pub profile: String,
    pub scheme: Scheme,
    pub senders: u32,
}

impl ExperimentLabel {
    /// Decode a label from a file name; everything from the first `.` on is ignored
    pub fn from_file_name(name: &str) -> Result<Self, LabelError> {
        let stem = name.split('.').next().unwrap_or(name);
        let caps = LABEL_PATTERN
            .captures(stem)
            .ok_or_else(|| LabelError::UnrecognizedName { name: name.to_string() })?;

        let scheme = match &caps["scheme"] {
            "dctcp" => Scheme::Dctcp,
            other => Scheme::Pbs {
                alpha: other[1..].to_string(),
            },
        };
        let senders = caps["senders"]
            .parse()
            .map_err(|_| LabelError::SenderCount { name: name.to_string() })?;

        Ok(Self {
            profile: caps["profile"].to_string(),
            scheme,
            senders,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, LabelError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_file_name(&name)
    }
}

impl fmt::Display for ExperimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, degree = {}", self.scheme, self.senders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dctcp_label() {
        let label = ExperimentLabel::from_file_name("incast_dctcp_s128.xml").unwrap();
        assert_eq!(label.profile, "incast");
        assert_eq!(label.scheme, Scheme::Dctcp);
        assert_eq!(label.senders, 128);
        assert_eq!(label.to_string(), "dctcp, degree = 128");
    }

    #[test]
    fn test_pbs_label() {
        let label = ExperimentLabel::from_path(Path::new("/tmp/incast/incast_a10_s16.xml")).unwrap();
        assert_eq!(label.scheme, Scheme::Pbs { alpha: "10".to_string() });
        assert_eq!(label.senders, 16);
        assert_eq!(label.to_string(), "alpha = 10, degree = 16");
    }

    #[test]
    fn test_scheme_ordering_puts_dctcp_first() {
        let pbs = Scheme::Pbs { alpha: "1".to_string() };
        assert!(Scheme::Dctcp < pbs);
    }

    #[test]
    fn test_rejects_other_names() {
        for name in ["results.xml", "incast_tcp_s4.xml", "incast_dctcp_16.xml", "incast_dctcp_s.xml", "a_b_c_d.xml"] {
            assert!(
                matches!(ExperimentLabel::from_file_name(name), Err(LabelError::UnrecognizedName { .. })),
                "{name} should be rejected"
            );
        }
        assert!(matches!(
            ExperimentLabel::from_file_name("incast_dctcp_s99999999999.xml"),
            Err(LabelError::SenderCount { .. })
        ));
    }
}
