use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;

use crate::engine::{
    EngineEvent, EngineLocation, EventListener, ListenerId, Listeners, MediaEngine, ProgressEvent,
    validate_file_name,
};
use crate::foundation::error::{TrimError, TrimResult};

/// Log lines kept for the error message of a failed job.
const STDERR_TAIL_LINES: usize = 20;

/// Engine backed by the system `ffmpeg` binary.
///
/// Staged files live in the location's `workdir`, or in a temporary directory removed when the
/// engine is dropped. Jobs run with that directory as their current directory, so argument lists
/// refer to staged files by bare name.
#[derive(Default)]
pub struct FfmpegEngine {
    loaded: Option<Loaded>,
    listeners: Listeners,
}

struct Loaded {
    program: PathBuf,
    staging: Staging,
}

/// The engine's file namespace on disk.
enum Staging {
    Kept(PathBuf),
    Scratch(tempfile::TempDir),
}

impl Staging {
    fn open(workdir: Option<&Path>) -> TrimResult<Self> {
        use anyhow::Context as _;
        match workdir {
            Some(dir) => {
                std::fs::create_dir_all(dir).with_context(|| {
                    format!("failed to create engine workdir '{}'", dir.display())
                })?;
                Ok(Self::Kept(dir.to_path_buf()))
            }
            None => {
                let dir = tempfile::Builder::new()
                    .prefix("trimreel-")
                    .tempdir()
                    .context("failed to create temporary engine workdir")?;
                Ok(Self::Scratch(dir))
            }
        }
    }

    fn path(&self) -> &Path {
        match self {
            Self::Kept(dir) => dir.as_path(),
            Self::Scratch(dir) => dir.path(),
        }
    }
}

enum RawEvent {
    Log(String),
    Progress { out_time_us: i64 },
}

impl FfmpegEngine {
    /// Create an unloaded engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding staged and produced files, once loaded.
    pub fn workdir(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.staging.path())
    }

    fn loaded(&self) -> TrimResult<&Loaded> {
        self.loaded
            .as_ref()
            .ok_or_else(|| TrimError::engine("media engine is not loaded"))
    }

    fn staged_path(&self, name: &str) -> TrimResult<PathBuf> {
        validate_file_name(name)?;
        Ok(self.loaded()?.staging.path().join(name))
    }
}

impl MediaEngine for FfmpegEngine {
    #[tracing::instrument(skip(self))]
    fn load(&mut self, location: &EngineLocation) -> TrimResult<()> {
        if !is_program_runnable(&location.program) {
            return Err(TrimError::engine(format!(
                "'{}' could not be run (is ffmpeg installed and on PATH?)",
                location.program.display()
            )));
        }

        let staging = Staging::open(location.workdir())?;
        tracing::info!(workdir = %staging.path().display(), "media engine loaded");
        self.loaded = Some(Loaded {
            program: location.program.clone(),
            staging,
        });
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn on_event(&mut self, listener: EventListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn write_file(&mut self, name: &str, data: &[u8]) -> TrimResult<()> {
        let path = self.staged_path(name)?;

        use anyhow::Context as _;
        std::fs::write(&path, data)
            .with_context(|| format!("failed to stage '{}'", path.display()))?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    fn exec(&mut self, args: &[String]) -> TrimResult<()> {
        let loaded = self.loaded()?;
        let mut cmd = Command::new(&loaded.program);
        cmd.current_dir(loaded.staging.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .args([
                "-y",
                "-nostdin",
                "-hide_banner",
                "-nostats",
                "-progress",
                "pipe:1",
            ])
            .args(args);
        tracing::debug!(?args, "running ffmpeg");

        let mut child = cmd.spawn().map_err(|e| {
            TrimError::engine(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TrimError::engine("failed to open ffmpeg stdout (unexpected)"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TrimError::engine("failed to open ffmpeg stderr (unexpected)"))?;

        // Both pipes are drained concurrently so ffmpeg never blocks on a full pipe; events are
        // funnelled back here so listeners only ever run on this thread.
        let (tx, rx) = mpsc::channel();
        let log_tx = tx.clone();
        let stderr_drain = std::thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                if log_tx.send(RawEvent::Log(line)).is_err() {
                    break;
                }
            }
        });
        let progress_drain = std::thread::spawn(move || {
            let mut out_time_us = 0i64;
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                let Some((key, value)) = line.trim().split_once('=') else {
                    continue;
                };
                match key {
                    "out_time_us" | "out_time_ms" => {
                        if let Ok(v) = value.trim().parse() {
                            out_time_us = v;
                        }
                    }
                    "progress" => {
                        if tx.send(RawEvent::Progress { out_time_us }).is_err() {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        });

        let mut duration_us: Option<i64> = None;
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        for raw in rx {
            let event = match raw {
                RawEvent::Log(line) => {
                    if duration_us.is_none() {
                        duration_us = parse_duration_line(&line);
                    }
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line.clone());
                    EngineEvent::Log(line)
                }
                RawEvent::Progress { out_time_us } => EngineEvent::Progress(ProgressEvent {
                    progress: progress_fraction(out_time_us, duration_us),
                    time_us: out_time_us,
                }),
            };
            self.listeners.dispatch(&event);
        }

        stderr_drain
            .join()
            .map_err(|_| TrimError::engine("ffmpeg stderr drain thread panicked"))?;
        progress_drain
            .join()
            .map_err(|_| TrimError::engine("ffmpeg progress drain thread panicked"))?;

        let status = child.wait().map_err(|e| {
            TrimError::engine(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if !status.success() {
            let stderr = Vec::from(tail).join("\n");
            return Err(TrimError::engine(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::info!("ffmpeg job finished");
        Ok(())
    }

    fn read_file(&mut self, name: &str) -> TrimResult<Vec<u8>> {
        let path = self.staged_path(name)?;
        std::fs::read(&path)
            .map_err(|e| TrimError::engine(format!("failed to read '{}': {e}", path.display())))
    }
}

/// Return `true` when `program -version` runs successfully.
pub fn is_program_runnable(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_program_runnable(Path::new("ffmpeg"))
}

fn progress_fraction(out_time_us: i64, duration_us: Option<i64>) -> f64 {
    match duration_us {
        Some(d) if d > 0 => out_time_us as f64 / d as f64,
        _ => 0.0,
    }
}

/// Parse the input duration from an ffmpeg banner line such as
/// `  Duration: 00:01:02.50, start: 0.000000, bitrate: 1205 kb/s`.
fn parse_duration_line(line: &str) -> Option<i64> {
    let rest = line.trim_start().strip_prefix("Duration:")?;
    let stamp = rest.split(',').next()?.trim();
    let mut parts = stamp.splitn(3, ':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    let total = (hours * 3600 + minutes * 60) as f64 + seconds;
    Some((total * 1_000_000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_lines_parse_to_microseconds() {
        assert_eq!(
            parse_duration_line("  Duration: 00:01:02.50, start: 0.000000, bitrate: 1205 kb/s"),
            Some(62_500_000)
        );
        assert_eq!(parse_duration_line("  Duration: N/A, bitrate: N/A"), None);
        assert_eq!(parse_duration_line("Stream #0:0: Video: h264"), None);
    }

    #[test]
    fn fraction_is_zero_until_duration_known() {
        assert_eq!(progress_fraction(1_000_000, None), 0.0);
        assert_eq!(progress_fraction(1_000_000, Some(0)), 0.0);
        assert_eq!(progress_fraction(1_000_000, Some(4_000_000)), 0.25);
    }

    #[test]
    fn unloaded_engine_rejects_io() {
        let mut engine = FfmpegEngine::new();
        assert!(!engine.is_loaded());
        assert!(engine.write_file("a.png", b"x").is_err());
        assert!(engine.read_file("a.png").is_err());
        assert!(engine.exec(&[]).is_err());
    }

    #[test]
    fn load_fails_for_missing_program() {
        let mut engine = FfmpegEngine::new();
        let loc = EngineLocation::new("/definitely/not/a/real/ffmpeg");
        assert!(engine.load(&loc).is_err());
        assert!(!engine.is_loaded());
        assert_eq!(engine.workdir(), None);
    }

    #[test]
    fn scratch_staging_is_removed_on_drop() {
        let staging = Staging::open(None).unwrap();
        let dir = staging.path().to_path_buf();
        std::fs::write(dir.join("original.mp4"), b"video").unwrap();
        assert!(dir.is_dir());

        drop(staging);
        assert!(!dir.exists());
    }

    #[test]
    fn configured_workdir_survives_drop() {
        let dir = PathBuf::from("target").join("ffmpeg_kept_workdir");
        let _ = std::fs::remove_dir_all(&dir);

        let staging = Staging::open(Some(dir.as_path())).unwrap();
        std::fs::write(staging.path().join("output.mp4"), b"mp4").unwrap();
        drop(staging);
        assert_eq!(std::fs::read(dir.join("output.mp4")).unwrap(), b"mp4");
    }

    #[test]
    fn default_workdir_goes_away_with_the_engine() {
        if !is_ffmpeg_on_path() {
            eprintln!("skipping: ffmpeg not on PATH");
            return;
        }
        let mut engine = FfmpegEngine::new();
        engine.load(&EngineLocation::new("ffmpeg")).unwrap();
        engine.write_file("blank.png", b"png").unwrap();
        let dir = engine.workdir().unwrap().to_path_buf();
        assert!(dir.join("blank.png").is_file());

        drop(engine);
        assert!(!dir.exists());
    }
}
