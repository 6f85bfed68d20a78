//! Sweep configuration loaded from `raysweep.toml`.
//!
//! Relative paths are taken relative to the directory raysweep is started
//! from, except `executable` and `scene_dir`, which live in `work_dir`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use raysweep_core::{ConfigSpace, Variant, WindowSize};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "raysweep.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory the renderer runs in.
    pub work_dir: PathBuf,
    pub executable: PathBuf,
    pub scene_dir: PathBuf,
    /// Explicit scene list; empty means every `*.json` in `scene_dir`.
    pub scenes: Vec<String>,
    pub timelog: PathBuf,
    pub output_dir: PathBuf,
    pub window_sizes: Vec<[u32; 2]>,
    pub samples: Vec<u32>,
    pub bounces: Vec<u32>,
    pub variants: Vec<Variant>,
    pub baseline: Variant,
    pub speedup_chart: PathBuf,
    pub duration_chart: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("../cmake-build-debug"),
            executable: PathBuf::from("./Raytracer"),
            scene_dir: PathBuf::from("scene"),
            scenes: Vec::new(),
            timelog: PathBuf::from("../timelog.csv"),
            output_dir: PathBuf::from("./output"),
            window_sizes: vec![[800, 600], [1280, 720], [1920, 1080]],
            samples: vec![1, 2, 4, 6],
            bounces: vec![1, 2, 3, 4, 6],
            variants: Variant::ALL.to_vec(),
            baseline: Variant::Sequential,
            speedup_chart: PathBuf::from("../speedup.html"),
            duration_chart: PathBuf::from("../timelog_plot.html"),
        }
    }
}

impl Config {
    /// Load `explicit` if given, else `raysweep.toml` in the current
    /// directory if present, else the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Reject empty axes and zero values.
    pub fn validate(&self) -> Result<()> {
        if self.window_sizes.is_empty() {
            bail!("window_sizes must not be empty");
        }
        if let Some([w, h]) = self.window_sizes.iter().find(|[w, h]| *w == 0 || *h == 0) {
            bail!("window size {w}x{h} must be positive");
        }
        check_positive("samples", &self.samples)?;
        check_positive("bounces", &self.bounces)?;
        if self.variants.is_empty() {
            bail!("variants must not be empty");
        }
        Ok(())
    }

    /// Scenes to sweep, as paths relative to `work_dir`.
    pub fn resolve_scenes(&self) -> Result<Vec<String>> {
        if !self.scenes.is_empty() {
            return Ok(self.scenes.clone());
        }

        let dir = self.work_dir.join(&self.scene_dir);
        let entries = std::fs::read_dir(&dir)
            .with_context(|| format!("cannot list scene directory {}", dir.display()))?;

        let mut scenes = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("cannot list {}", dir.display()))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                scenes.push(
                    self.scene_dir
                        .join(entry.file_name())
                        .to_string_lossy()
                        .into_owned(),
                );
            }
        }
        scenes.sort();

        if scenes.is_empty() {
            bail!("no *.json scenes found in {}", dir.display());
        }
        Ok(scenes)
    }

    /// The sweep space. Repeated axis entries are kept once, at their first
    /// position, so every configuration is yielded exactly once.
    pub fn space(&self, scenes: Vec<String>) -> ConfigSpace {
        let sizes: Vec<WindowSize> = self
            .window_sizes
            .iter()
            .map(|&[w, h]| WindowSize::new(w, h))
            .collect();
        ConfigSpace {
            scenes: dedup_axis("scenes", scenes),
            sizes: dedup_axis("window_sizes", sizes),
            samples: dedup_axis("samples", self.samples.clone()),
            bounces: dedup_axis("bounces", self.bounces.clone()),
            variants: dedup_axis("variants", self.variants.clone()),
        }
    }

    pub fn executable_path(&self) -> PathBuf {
        self.work_dir.join(&self.executable)
    }
}

fn dedup_axis<T: PartialEq + std::fmt::Debug>(name: &str, values: Vec<T>) -> Vec<T> {
    let mut kept: Vec<T> = Vec::with_capacity(values.len());
    for value in values {
        if kept.contains(&value) {
            tracing::warn!(axis = name, ?value, "ignoring repeated axis entry");
        } else {
            kept.push(value);
        }
    }
    kept
}

fn check_positive(name: &str, values: &[u32]) -> Result<()> {
    if values.is_empty() {
        bail!("{name} must not be empty");
    }
    if values.contains(&0) {
        bail!("{name} must be positive");
    }
    Ok(())
}
