//! Container existence probe
//!
//! The session manager names user containers `jupyter-{username}`. The
//! probe asks the container runtime whether such a container is currently
//! running, catching sessions the directory still considers live after
//! their container has vanished.

use std::process::Command;
use tracing::debug;

use crate::error::ContainerError;

/// Name prefix used for per-user containers
const CONTAINER_NAME_PREFIX: &str = "jupyter-";

/// Narrow view of the container runtime consumed by the reconciler
pub trait ContainerRuntime {
    /// Whether a running container backs `username`'s session.
    fn exists(&self, username: &str) -> Result<bool, ContainerError>;
}

/// Probe backed by the `docker` CLI
pub struct DockerCli {
    binary: String,
}

impl DockerCli {
    pub fn new() -> Self {
        Self {
            binary: "docker".to_string(),
        }
    }

    /// Use a different client binary (e.g. podman).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for DockerCli {
    fn exists(&self, username: &str) -> Result<bool, ContainerError> {
        // Anchored match; a bare prefix filter would also match other
        // users whose names extend this one.
        let filter = format!("name=^{CONTAINER_NAME_PREFIX}{username}$");
        let output = Command::new(&self.binary)
            .args(["ps", "--quiet", "--filter", &filter])
            .output()?;

        if !output.status.success() {
            return Err(ContainerError::ProbeExited {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let found = !String::from_utf8_lossy(&output.stdout).trim().is_empty();
        debug!(username, found, "container probe");
        Ok(found)
    }
}
