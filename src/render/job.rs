use std::fmt;
use std::str::FromStr;

use crate::assets::RenderAssets;
use crate::filter_graph::{FilterGraph, FilterTemplate};
use crate::foundation::core::FrameSize;
use crate::foundation::error::TrimError;

/// Name the base video is staged under.
pub const BASE_VIDEO_NAME: &str = "original.mp4";
/// Name the transparent placeholder is staged under.
pub const PLACEHOLDER_NAME: &str = "blank.png";
/// Default name of the produced file and of the download.
pub const DEFAULT_OUTPUT_NAME: &str = "output.mp4";

/// x264 speed preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Fastest, lowest quality per bit.
    #[default]
    Ultrafast,
    /// `superfast`.
    Superfast,
    /// `veryfast`.
    Veryfast,
    /// `faster`.
    Faster,
    /// `fast`.
    Fast,
    /// `medium`.
    Medium,
    /// `slow`.
    Slow,
    /// `slower`.
    Slower,
    /// Slowest, best quality per bit.
    Veryslow,
}

impl Preset {
    const ALL: [Preset; 9] = [
        Self::Ultrafast,
        Self::Superfast,
        Self::Veryfast,
        Self::Faster,
        Self::Fast,
        Self::Medium,
        Self::Slow,
        Self::Slower,
        Self::Veryslow,
    ];

    /// Name as ffmpeg spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Superfast => "superfast",
            Self::Veryfast => "veryfast",
            Self::Faster => "faster",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
            Self::Slower => "slower",
            Self::Veryslow => "veryslow",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = TrimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TrimError::validation(format!("unknown preset '{s}'")))
    }
}

/// Output shape of a render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOpts {
    /// Common size for base and intro when concatenating.
    pub frame: FrameSize,
    /// Encoder speed preset.
    pub preset: Preset,
    /// Engine output name, also used as the download name.
    pub output_name: String,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            frame: FrameSize::default(),
            preset: Preset::default(),
            output_name: DEFAULT_OUTPUT_NAME.to_owned(),
        }
    }
}

/// Fully resolved engine job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobArgs {
    /// Input names in engine order: base, intro, left, right.
    pub inputs: [String; 4],
    /// The filter graph.
    pub graph: FilterGraph,
    /// Encoder preset.
    pub preset: Preset,
    /// Output name.
    pub output: String,
}

impl JobArgs {
    /// Resolve inputs and graph for the selected assets. Empty slots use the placeholder.
    pub fn plan(assets: &RenderAssets, opts: &RenderOpts) -> Self {
        let mut inputs = [
            BASE_VIDEO_NAME.to_owned(),
            PLACEHOLDER_NAME.to_owned(),
            PLACEHOLDER_NAME.to_owned(),
            PLACEHOLDER_NAME.to_owned(),
        ];
        for (slot, asset) in assets.selected() {
            inputs[slot.input_index()] = asset.name().to_owned();
        }
        Self {
            inputs,
            graph: FilterTemplate::select(assets.has_intro()).build(opts.frame),
            preset: opts.preset,
            output: opts.output_name.clone(),
        }
    }

    /// Flatten into the engine argument list.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(20);
        for input in &self.inputs {
            args.push("-i".to_owned());
            args.push(input.clone());
        }
        args.push("-filter_complex".to_owned());
        args.push(self.graph.to_string());

        let labels = self.graph.output_labels();
        if !labels.is_empty() {
            args.extend(["-vsync".to_owned(), "vfr".to_owned()]);
            for label in labels {
                args.push("-map".to_owned());
                args.push((*label).to_owned());
            }
        }

        args.push("-preset".to_owned());
        args.push(self.preset.as_str().to_owned());
        args.push(self.output.clone());
        args
    }
}
