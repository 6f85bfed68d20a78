//! Builds and launches renderer invocations.
//!
//! The renderer appends its own row to the run log. Nothing here checks that
//! the row appeared; a failed render simply gets retried by the next sweep.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::space::Configuration;

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot resolve path {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Artifact file name for `config`, e.g.
/// `SEQUENTIAL_scene_simple_1280x720_s4_b2.png`.
pub fn artifact_name(config: &Configuration) -> String {
    let scene = Path::new(&config.scene);
    let stem = scene
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| config.scene.as_str().into());
    format!(
        "{}_{}_{}x{}_s{}_b{}.png",
        config.variant.name(),
        stem,
        config.size.width,
        config.size.height,
        config.samples,
        config.bounces
    )
}

/// A fully resolved renderer command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub output: PathBuf,
}

impl Invocation {
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Paths shared by every invocation of one sweep.
#[derive(Debug, Clone)]
pub struct Invoker {
    working_dir: PathBuf,
    program: PathBuf,
    timelog: PathBuf,
    output_dir: PathBuf,
}

impl Invoker {
    /// `executable` is resolved against `working_dir`. The run log and output
    /// directory are made absolute since the renderer runs elsewhere.
    pub fn new(
        working_dir: &Path,
        executable: &Path,
        timelog: &Path,
        output_dir: &Path,
    ) -> Result<Self, InvokeError> {
        let working_dir = absolute(working_dir)?;
        Ok(Self {
            program: working_dir.join(executable),
            working_dir,
            timelog: absolute(timelog)?,
            output_dir: absolute(output_dir)?,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Ensure the output directory exists and build the command for `config`.
    pub fn prepare(&self, config: &Configuration) -> Result<Invocation, InvokeError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| InvokeError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let output = self.output_dir.join(artifact_name(config));
        let args = vec![
            "-s".to_string(),
            config.scene.clone(),
            "--window-size".to_string(),
            config.size.width.to_string(),
            config.size.height.to_string(),
            "--samples".to_string(),
            config.samples.to_string(),
            "--bounces".to_string(),
            config.bounces.to_string(),
            "-b".to_string(),
            self.timelog.display().to_string(),
            "--no-window".to_string(),
            "-of".to_string(),
            output.display().to_string(),
            config.variant.flag().to_string(),
        ];

        Ok(Invocation {
            program: self.program.clone(),
            args,
            working_dir: self.working_dir.clone(),
            output,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, InvokeError> {
    std::path::absolute(path).map_err(|source| InvokeError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

/// How a launched renderer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Exited(i32),
    /// Terminated without an exit code (killed by a signal).
    Terminated,
}

impl LaunchOutcome {
    pub fn success(self) -> bool {
        self == LaunchOutcome::Exited(0)
    }
}

/// Runs an invocation to completion.
pub trait Launcher {
    fn launch(&mut self, invocation: &Invocation) -> std::io::Result<LaunchOutcome>;
}

/// Launches the renderer as a child process and blocks until it exits.
#[derive(Debug, Default, Clone)]
pub struct ProcessLauncher {
    /// Discard the renderer's stdout.
    pub quiet: bool,
}

impl Launcher for ProcessLauncher {
    fn launch(&mut self, invocation: &Invocation) -> std::io::Result<LaunchOutcome> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null());
        if self.quiet {
            cmd.stdout(Stdio::null());
        }

        let status = cmd.status()?;
        Ok(match status.code() {
            Some(code) => LaunchOutcome::Exited(code),
            None => LaunchOutcome::Terminated,
        })
    }
}
