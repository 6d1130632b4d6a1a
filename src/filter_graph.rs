//! Filter-graph expressions handed to the media engine.
//!
//! Input layout is fixed: `0` base video, `1` intro (or placeholder), `2` left overlay,
//! `3` right overlay. Unselected slots carry the transparent placeholder, so every template
//! references all four inputs.

use std::fmt;

use crate::assets::AssetSlot;
use crate::foundation::core::FrameSize;

/// Overlay position for the right-hand icon: flush right, top edge.
const RIGHT_OVERLAY: &str = "overlay=x=(main_w-overlay_w):0";

/// The two graph shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterTemplate {
    /// Scale base and intro to a common size, decorate both, concatenate intro then base.
    IntroConcat,
    /// Decorate the base video in place.
    OverlayOnly,
}

impl FilterTemplate {
    /// Pick the template. Only intro presence matters.
    pub fn select(has_intro: bool) -> Self {
        if has_intro {
            Self::IntroConcat
        } else {
            Self::OverlayOnly
        }
    }

    /// Return `true` when the graph emits the labelled `[v]`/`[a]` pair that must be mapped.
    pub fn concatenates(self) -> bool {
        matches!(self, Self::IntroConcat)
    }

    /// Build the graph for `frame`. The size only matters for [`FilterTemplate::IntroConcat`].
    pub fn build(self, frame: FrameSize) -> FilterGraph {
        let left = video_in(AssetSlot::LeftOverlay.input_index());
        let right = video_in(AssetSlot::RightOverlay.input_index());
        let chains = match self {
            Self::IntroConcat => {
                let intro = AssetSlot::Intro.input_index();
                let scale = format!("scale={}:{},setsar=1", frame.width, frame.height);
                vec![
                    format!("{}{scale}[base0]", video_in(0)),
                    format!("[base0]{left}overlay[base1]"),
                    format!("[base1]{right}{RIGHT_OVERLAY}[base]"),
                    format!("{}{scale}[intro0]", video_in(intro)),
                    format!("[intro0]{left}overlay[intro1]"),
                    format!("[intro1]{right}{RIGHT_OVERLAY}[intro]"),
                    format!("[intro][{intro}:a][base][0:a]concat=n=2:v=1:a=1[v][a]"),
                ]
            }
            Self::OverlayOnly => vec![
                format!("{}{left}overlay[v0]", video_in(0)),
                format!("[v0]{right}{RIGHT_OVERLAY}"),
            ],
        };
        FilterGraph {
            template: self,
            chains,
        }
    }
}

/// Video stream label of engine input `index`.
fn video_in(index: usize) -> String {
    format!("[{index}:v]")
}

/// A rendered `-filter_complex` expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterGraph {
    template: FilterTemplate,
    chains: Vec<String>,
}

impl FilterGraph {
    /// Template the graph was built from.
    pub fn template(&self) -> FilterTemplate {
        self.template
    }

    /// Individual filter chains, in order.
    pub fn chains(&self) -> &[String] {
        &self.chains
    }

    /// Labelled outputs that need explicit `-map` arguments.
    pub fn output_labels(&self) -> &'static [&'static str] {
        if self.template.concatenates() {
            &["[v]", "[a]"]
        } else {
            &[]
        }
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.chains.join(";\n"))
    }
}
