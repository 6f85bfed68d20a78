//! Logical implementation variants and the executor identities that
//! implement them.
//!
//! The renderer records the concrete class that produced a run
//! (`CudaRayTracer`, `MetalRayTracer`, ...). A sweep only cares about the
//! logical strategy, so several identities can satisfy one variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Execution strategy selected on the renderer's command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Variant {
    Sequential,
    Shader,
    MultiThreaded,
}

/// Reverse lookup miss: the run log names an executor no variant claims.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown executor identity: {0}")]
pub struct UnknownIdentity(pub String);

/// Name parse miss for a logical variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant '{0}' (expected one of SEQUENTIAL, SHADER, MULTI_THREADED)")]
pub struct UnknownVariant(pub String);

impl Variant {
    /// Every variant, in sweep order.
    pub const ALL: [Variant; 3] = [Variant::Sequential, Variant::Shader, Variant::MultiThreaded];

    /// Upper-case name used in artifact file names and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Variant::Sequential => "SEQUENTIAL",
            Variant::Shader => "SHADER",
            Variant::MultiThreaded => "MULTI_THREADED",
        }
    }

    /// Renderer flag selecting this strategy.
    pub const fn flag(self) -> &'static str {
        match self {
            Variant::Sequential => "--sequential",
            Variant::Shader => "--shader",
            Variant::MultiThreaded => "--multi-threaded",
        }
    }

    /// Executor identities that count as a run of this variant. Never empty.
    pub const fn identities(self) -> &'static [&'static str] {
        match self {
            Variant::Sequential => &["SequentialRayTracer"],
            Variant::Shader => &["MetalRayTracer", "CudaRayTracer"],
            Variant::MultiThreaded => &["OpenMPRayTracer"],
        }
    }

    pub fn accepts(self, identity: &str) -> bool {
        self.identities().contains(&identity)
    }

    /// Owning variant of a concrete executor identity.
    pub fn from_identity(identity: &str) -> Result<Variant, UnknownIdentity> {
        Variant::ALL
            .into_iter()
            .find(|v| v.accepts(identity))
            .ok_or_else(|| UnknownIdentity(identity.to_string()))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = UnknownVariant;

    /// Accepts the upper-case name, case-insensitively, with `-` or `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == normalized)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}
