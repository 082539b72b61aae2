// Run Domain Model: what a job executes and with which resources

use crate::domain::error::{Result, ValidationError};
use crate::domain::values::{ContainerPath, MountMode, Operator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Artifact fetched into the sandbox before the command starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub uri: String,
    #[serde(default)]
    pub executable: bool,
    #[serde(default)]
    pub extract: bool,
    #[serde(default)]
    pub cache: bool,
}

impl Artifact {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            executable: false,
            extract: false,
            cache: false,
        }
    }
}

/// Docker image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Docker {
    image: String,
}

impl Docker {
    pub fn new(image: impl Into<String>) -> Result<Self> {
        let image = image.into();
        if image.is_empty() {
            return Err(ValidationError::Required("Docker.image"));
        }
        Ok(Self { image })
    }

    pub fn image(&self) -> &str {
        &self.image
    }
}

/// Placement constraint on agent attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    attribute: String,
    operator: Operator,
    #[serde(default)]
    value: String,
}

impl Constraint {
    pub fn new(
        attribute: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
    ) -> Result<Self> {
        let attribute = attribute.into();
        if attribute.is_empty() {
            return Err(ValidationError::Required("Constraint.attribute"));
        }
        Ok(Self {
            attribute,
            operator,
            value: value.into(),
        })
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl Placement {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// Restart policy for failed runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restart {
    #[serde(default)]
    active_deadline_seconds: i64,
    policy: String,
}

impl Restart {
    pub fn new(active_deadline_seconds: i64, policy: impl Into<String>) -> Result<Self> {
        let policy = policy.into();
        if policy.is_empty() {
            return Err(ValidationError::Required("Restart.policy"));
        }
        Ok(Self {
            active_deadline_seconds,
            policy,
        })
    }

    pub fn active_deadline_seconds(&self) -> i64 {
        self.active_deadline_seconds
    }

    pub fn policy(&self) -> &str {
        &self.policy
    }
}

/// Host directory mounted into the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    container_path: ContainerPath,
    host_path: String,
    mode: MountMode,
}

impl Volume {
    pub fn new(container_path: &str, host_path: impl Into<String>, mode: MountMode) -> Result<Self> {
        let container_path = ContainerPath::new(container_path)?;
        let host_path = host_path.into();
        if host_path.is_empty() {
            return Err(ValidationError::Required("Volume.hostPath"));
        }
        Ok(Self {
            container_path,
            host_path,
            mode,
        })
    }

    pub fn container_path(&self) -> &ContainerPath {
        &self.container_path
    }

    pub fn host_path(&self) -> &str {
        &self.host_path
    }

    pub fn mode(&self) -> MountMode {
        self.mode
    }
}

fn placement_is_empty(placement: &Option<Placement>) -> bool {
    placement.as_ref().map_or(true, Placement::is_empty)
}

/// Execution specification of a job.
///
/// Optional parts decode to empty/absent when the service leaves them out and are
/// dropped from the encoded body when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    artifacts: Vec<Artifact>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    cmd: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<String>,
    cpus: f64,
    mem: i64,
    disk: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    docker: Option<Docker>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<String, String>,
    #[serde(default)]
    max_launch_delay: i64,
    #[serde(default, skip_serializing_if = "placement_is_empty")]
    placement: Option<Placement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    restart: Option<Restart>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    user: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    volumes: Vec<Volume>,
}

impl Run {
    /// Create a run with only resources set
    ///
    /// Fails when any of `cpus`, `mem` or `disk` is not strictly positive.
    pub fn new(cpus: f64, mem: i64, disk: i64) -> Result<Self> {
        Self::builder(cpus, mem, disk).build()
    }

    pub fn builder(cpus: f64, mem: i64, disk: i64) -> RunBuilder {
        RunBuilder::new(cpus, mem, disk)
    }

    /// Check the resource invariants: `cpus`, `mem` and `disk` strictly positive
    pub fn validate(&self) -> Result<()> {
        if self.cpus.is_nan() || self.cpus <= 0.0 {
            return Err(ValidationError::NotPositive {
                field: "Run.cpus",
                value: self.cpus.to_string(),
            });
        }
        if self.mem <= 0 {
            return Err(ValidationError::NotPositive {
                field: "Run.mem",
                value: self.mem.to_string(),
            });
        }
        if self.disk <= 0 {
            return Err(ValidationError::NotPositive {
                field: "Run.disk",
                value: self.disk.to_string(),
            });
        }
        Ok(())
    }

    /// Reopen this run for edits; the result is validated again on `build`
    pub fn into_builder(self) -> RunBuilder {
        RunBuilder { run: self }
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn cpus(&self) -> f64 {
        self.cpus
    }

    pub fn mem(&self) -> i64 {
        self.mem
    }

    pub fn disk(&self) -> i64 {
        self.disk
    }

    pub fn docker(&self) -> Option<&Docker> {
        self.docker.as_ref()
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn max_launch_delay(&self) -> i64 {
        self.max_launch_delay
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    pub fn restart(&self) -> Option<&Restart> {
        self.restart.as_ref()
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }
}

/// Accumulates run fields; invariants are checked once in [`RunBuilder::build`].
#[derive(Debug, Clone)]
pub struct RunBuilder {
    run: Run,
}

impl RunBuilder {
    pub fn new(cpus: f64, mem: i64, disk: i64) -> Self {
        Self {
            run: Run {
                artifacts: Vec::new(),
                cmd: String::new(),
                args: Vec::new(),
                cpus,
                mem,
                disk,
                docker: None,
                env: BTreeMap::new(),
                max_launch_delay: 0,
                placement: None,
                restart: None,
                user: String::new(),
                volumes: Vec::new(),
            },
        }
    }

    pub fn artifact(mut self, artifact: Artifact) -> Self {
        self.run.artifacts.push(artifact);
        self
    }

    pub fn artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.run.artifacts = artifacts;
        self
    }

    pub fn cmd(mut self, cmd: impl Into<String>) -> Self {
        self.run.cmd = cmd.into();
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.run.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn cpus(mut self, cpus: f64) -> Self {
        self.run.cpus = cpus;
        self
    }

    pub fn mem(mut self, mem: i64) -> Self {
        self.run.mem = mem;
        self
    }

    pub fn disk(mut self, disk: i64) -> Self {
        self.run.disk = disk;
        self
    }

    pub fn docker(mut self, docker: Docker) -> Self {
        self.run.docker = Some(docker);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.run.env.insert(key.into(), value.into());
        self
    }

    pub fn max_launch_delay(mut self, seconds: i64) -> Self {
        self.run.max_launch_delay = seconds;
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.run.placement = Some(placement);
        self
    }

    pub fn restart(mut self, restart: Restart) -> Self {
        self.run.restart = Some(restart);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.run.user = user.into();
        self
    }

    pub fn volume(mut self, volume: Volume) -> Self {
        self.run.volumes.push(volume);
        self
    }

    pub fn build(self) -> Result<Run> {
        self.run.validate()?;
        Ok(self.run)
    }
}
