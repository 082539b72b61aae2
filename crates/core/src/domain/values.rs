// Constrained value types: closed enumerations and the container path

use crate::domain::error::{Result, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placement constraint operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Operator {
    Eq,
    Like,
    Unlike,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Eq, Operator::Like, Operator::Unlike];

    /// Canonical wire token
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Like => "LIKE",
            Operator::Unlike => "UNLIKE",
        }
    }
}

impl FromStr for Operator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "EQ" => Ok(Operator::Eq),
            "LIKE" => Ok(Operator::Like),
            "UNLIKE" => Ok(Operator::Unlike),
            other => Err(ValidationError::UnknownOperator(other.to_string())),
        }
    }
}

impl TryFrom<String> for Operator {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Operator> for &'static str {
    fn from(op: Operator) -> Self {
        op.as_str()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volume mount mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum MountMode {
    ReadOnly,
    ReadWrite,
}

impl MountMode {
    pub const ALL: [MountMode; 2] = [MountMode::ReadOnly, MountMode::ReadWrite];

    /// Canonical wire token
    pub fn as_str(&self) -> &'static str {
        match self {
            MountMode::ReadOnly => "RO",
            MountMode::ReadWrite => "RW",
        }
    }
}

impl FromStr for MountMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RO" => Ok(MountMode::ReadOnly),
            "RW" => Ok(MountMode::ReadWrite),
            other => Err(ValidationError::UnknownMountMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for MountMode {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<MountMode> for &'static str {
    fn from(mode: MountMode) -> Self {
        mode.as_str()
    }
}

impl fmt::Display for MountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static CONTAINER_PATH: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^/[^/].*$").unwrap()
});

/// Absolute path inside the container; never the root itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerPath(String);

impl ContainerPath {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if !CONTAINER_PATH.is_match(&path) {
            return Err(ValidationError::ContainerPath(path));
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContainerPath {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContainerPath {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<ContainerPath> for String {
    fn from(path: ContainerPath) -> Self {
        path.0
    }
}

impl fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
