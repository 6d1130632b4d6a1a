//! Editor configuration file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::engine::EngineLocation;
use crate::foundation::core::FrameSize;
use crate::foundation::error::{TrimError, TrimResult};
use crate::render::job::{DEFAULT_OUTPUT_NAME, Preset, RenderOpts};

/// JSON configuration shared by the CLI commands.
///
/// ```json
/// { "video": "talk.mp4", "transcript": "talk.json", "frame": { "width": 640, "height": 480 } }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    /// Base video.
    #[serde(default)]
    pub video: Option<PathBuf>,
    /// Transcript JSON.
    #[serde(default)]
    pub transcript: Option<PathBuf>,
    /// Image used for empty overlay slots; a transparent pixel when absent.
    #[serde(default)]
    pub placeholder: Option<PathBuf>,
    /// Common frame size for intro concatenation.
    #[serde(default)]
    pub frame: FrameSize,
    /// Encoder preset.
    #[serde(default)]
    pub preset: Preset,
    /// ffmpeg executable.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
    /// Staging directory for the engine; a temporary directory deleted after the run when absent.
    #[serde(default)]
    pub workdir: Option<PathBuf>,
    /// Name of the produced file.
    #[serde(default = "default_output_name")]
    pub output_name: String,
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_output_name() -> String {
    DEFAULT_OUTPUT_NAME.to_owned()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            video: None,
            transcript: None,
            placeholder: None,
            frame: FrameSize::default(),
            preset: Preset::default(),
            ffmpeg: default_ffmpeg(),
            workdir: None,
            output_name: default_output_name(),
        }
    }
}

impl EditorConfig {
    /// Read a config file. Relative paths inside it resolve against its directory.
    pub fn from_path(path: &Path) -> TrimResult<Self> {
        use anyhow::Context as _;
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let mut cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| TrimError::serde(format!("parse config '{}': {e}", path.display())))?;

        let root = path.parent().unwrap_or_else(|| Path::new("."));
        cfg.resolve_relative_to(root);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Join every relative file path onto `root`. The ffmpeg program is left alone unless it
    /// names a path rather than a bare command.
    pub fn resolve_relative_to(&mut self, root: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        for p in [
            &mut self.video,
            &mut self.transcript,
            &mut self.placeholder,
            &mut self.workdir,
        ]
        .into_iter()
        .flatten()
        {
            resolve(p);
        }
        if self.ffmpeg.components().count() > 1 {
            resolve(&mut self.ffmpeg);
        }
    }

    /// Check values the engine cannot cope with.
    pub fn validate(&self) -> TrimResult<()> {
        self.frame.validate()?;
        if self.output_name.trim().is_empty() {
            return Err(TrimError::validation("output_name must not be empty"));
        }
        crate::engine::validate_file_name(&self.output_name)?;
        Ok(())
    }

    /// Render options derived from this config.
    pub fn render_opts(&self) -> RenderOpts {
        RenderOpts {
            frame: self.frame,
            preset: self.preset,
            output_name: self.output_name.clone(),
        }
    }

    /// Engine location for the configured program and workdir.
    pub fn engine_location(&self) -> EngineLocation {
        let location = EngineLocation::new(self.ffmpeg.clone());
        match &self.workdir {
            Some(dir) => location.with_workdir(dir),
            None => location,
        }
    }
}
