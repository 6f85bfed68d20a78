#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const TIMELOG_HEADER: &str = "Platform,Architecture,Git Hash,Implementation,Filename,Width,Height,Samples,Bounces,Rays,Triangles,Spheres,Encoding(ms),Raytracing(ms),Decoding(ms),Total Duration (ms)";

pub fn raysweep_bin() -> &'static str {
    env!("CARGO_BIN_EXE_raysweep")
}

/// Stand-in renderer: parses the real renderer's flags, appends one row to
/// the run log and touches the output image. Scenes whose path contains
/// "broken" exit 1 without recording anything.
const FAKE_RENDERER: &str = r#"#!/bin/sh
scene=""; width=0; height=0; samples=0; bounces=0; log=""; out=""; impl=""
while [ $# -gt 0 ]; do
  case "$1" in
    -s) scene="$2"; shift 2 ;;
    --window-size) width="$2"; height="$3"; shift 3 ;;
    --samples) samples="$2"; shift 2 ;;
    --bounces) bounces="$2"; shift 2 ;;
    -b) log="$2"; shift 2 ;;
    -of) out="$2"; shift 2 ;;
    --sequential) impl="SequentialRayTracer"; shift ;;
    --shader) impl="CudaRayTracer"; shift ;;
    --multi-threaded) impl="OpenMPRayTracer"; shift ;;
    *) shift ;;
  esac
done
echo "$scene $impl" >> invocations.txt
case "$scene" in *broken*) exit 1 ;; esac
case "$impl" in
  SequentialRayTracer) total=400 ;;
  CudaRayTracer) total=50 ;;
  *) total=100 ;;
esac
if [ ! -f "$log" ]; then
  echo "__HEADER__" > "$log"
fi
rays=$((width * height * samples))
echo "Linux,x86_64,abc1234,$impl,$scene,$width,$height,$samples,$bounces,$rays,12,2,1,$total,1,$total" >> "$log"
: > "$out"
"#;

/// Temporary benchmark setup: a work dir holding the fake renderer and
/// scenes, plus a config file pointing at it.
pub struct Fixture {
    pub root: PathBuf,
    pub work_dir: PathBuf,
    pub timelog: PathBuf,
    pub output_dir: PathBuf,
    pub config: PathBuf,
}

impl Fixture {
    pub fn new(root: &Path, scenes: &[&str]) -> Self {
        let work_dir = root.join("build");
        let scene_dir = work_dir.join("scene");
        std::fs::create_dir_all(&scene_dir).expect("create scene dir");
        for scene in scenes {
            std::fs::write(scene_dir.join(scene), "{}").expect("write scene");
        }
        write_fake_renderer(&work_dir.join("Raytracer"));

        let fixture = Self {
            root: root.to_path_buf(),
            timelog: root.join("timelog.csv"),
            output_dir: root.join("output"),
            config: root.join("raysweep.toml"),
            work_dir,
        };
        fixture.write_config("");
        fixture
    }

    /// Rewrite the config file, appending `extra` TOML lines.
    pub fn write_config(&self, extra: &str) {
        let content = format!(
            "work_dir = \"{}\"\n\
             timelog = \"{}\"\n\
             output_dir = \"{}\"\n\
             speedup_chart = \"{}\"\n\
             duration_chart = \"{}\"\n\
             window_sizes = [[4, 2]]\n\
             samples = [1]\n\
             bounces = [1, 2]\n\
             {extra}\n",
            self.work_dir.display(),
            self.timelog.display(),
            self.output_dir.display(),
            self.root.join("speedup.html").display(),
            self.root.join("duration.html").display(),
        );
        std::fs::write(&self.config, content).expect("write config");
    }

    pub fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(self.work_dir.join("invocations.txt"))
            .unwrap_or_default()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    pub fn timelog_rows(&self) -> usize {
        std::fs::read_to_string(&self.timelog)
            .map(|c| c.lines().skip(1).filter(|l| !l.trim().is_empty()).count())
            .unwrap_or(0)
    }

    /// Run raysweep from the fixture root with this fixture's config.
    pub fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(raysweep_bin());
        cmd.current_dir(&self.root);
        cmd.env_remove("RAYSWEEP_CONFIG");
        cmd.args(args);
        cmd.arg("--config").arg(&self.config);
        cmd.output().expect("run raysweep")
    }
}

#[cfg(unix)]
pub fn write_fake_renderer(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let script = FAKE_RENDERER.replace("__HEADER__", TIMELOG_HEADER);
    std::fs::write(path, script).expect("write fake renderer");
    let mut perms = std::fs::metadata(path).expect("stat renderer").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).expect("chmod renderer");
}

/// Run raysweep in `dir` without a config file.
pub fn run_raysweep_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(raysweep_bin())
        .current_dir(dir)
        .env_remove("RAYSWEEP_CONFIG")
        .args(args)
        .output()
        .expect("run raysweep")
}

pub fn assert_ok(output: &Output, context: &str) {
    assert!(
        output.status.success(),
        "{context} failed (status {:?})\nstdout:\n{}\nstderr:\n{}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn stdout_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e})\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}
