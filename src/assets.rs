//! User-supplied render inputs: the intro clip and the two corner overlays.

use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{TrimError, TrimResult};

/// One of the three optional input slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetSlot {
    /// Clip played before the base video.
    Intro,
    /// Image pinned to the top-left corner.
    LeftOverlay,
    /// Image pinned to the top-right corner.
    RightOverlay,
}

impl AssetSlot {
    /// All slots in engine input order.
    pub const ALL: [AssetSlot; 3] = [Self::Intro, Self::LeftOverlay, Self::RightOverlay];

    /// Engine input index (`0` is the base video).
    pub fn input_index(self) -> usize {
        match self {
            Self::Intro => 1,
            Self::LeftOverlay => 2,
            Self::RightOverlay => 3,
        }
    }

    /// Advisory media-type filter for pickers. Not enforced.
    pub fn accept(self) -> &'static str {
        match self {
            Self::Intro => "video/*",
            Self::LeftOverlay | Self::RightOverlay => "image/*",
        }
    }

    /// Short human label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::LeftOverlay => "left icon",
            Self::RightOverlay => "right icon",
        }
    }
}

/// A named in-memory file. Cloning shares the bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderAsset {
    name: String,
    bytes: Arc<[u8]>,
}

impl RenderAsset {
    /// Wrap bytes under `name`.
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file, keeping its file name.
    pub fn from_path(path: &Path) -> TrimResult<Self> {
        use anyhow::Context as _;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                TrimError::validation(format!("'{}' has no usable file name", path.display()))
            })?
            .to_owned();
        let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
        Ok(Self::new(name, bytes))
    }

    /// File name the asset is staged under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// The three optional slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderAssets {
    intro: Option<RenderAsset>,
    left: Option<RenderAsset>,
    right: Option<RenderAsset>,
}

impl RenderAssets {
    /// Store `asset` in `slot`, replacing any previous selection.
    pub fn select(&mut self, slot: AssetSlot, asset: RenderAsset) {
        *self.slot_mut(slot) = Some(asset);
    }

    /// Empty `slot`.
    pub fn clear(&mut self, slot: AssetSlot) {
        *self.slot_mut(slot) = None;
    }

    /// Asset in `slot`, if selected.
    pub fn get(&self, slot: AssetSlot) -> Option<&RenderAsset> {
        match slot {
            AssetSlot::Intro => self.intro.as_ref(),
            AssetSlot::LeftOverlay => self.left.as_ref(),
            AssetSlot::RightOverlay => self.right.as_ref(),
        }
    }

    /// Return `true` when an intro clip is selected.
    pub fn has_intro(&self) -> bool {
        self.intro.is_some()
    }

    /// Return `true` when any slot is filled.
    pub fn has_any(&self) -> bool {
        AssetSlot::ALL.iter().any(|&slot| self.get(slot).is_some())
    }

    /// Selected assets with their slots, in input order.
    pub fn selected(&self) -> impl Iterator<Item = (AssetSlot, &RenderAsset)> {
        AssetSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|a| (slot, a)))
    }

    fn slot_mut(&mut self, slot: AssetSlot) -> &mut Option<RenderAsset> {
        match slot {
            AssetSlot::Intro => &mut self.intro,
            AssetSlot::LeftOverlay => &mut self.left,
            AssetSlot::RightOverlay => &mut self.right,
        }
    }
}

/// 1x1 fully transparent PNG used to fill unselected slots.
pub fn blank_png() -> TrimResult<Vec<u8>> {
    use anyhow::Context as _;
    let img = image::RgbaImage::new(1, 1);
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .context("encode placeholder png")?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_and_clear_track_presence() {
        let mut assets = RenderAssets::default();
        assert!(!assets.has_any());

        assets.select(AssetSlot::RightOverlay, RenderAsset::new("r.png", vec![1u8]));
        assert!(assets.has_any());
        assert!(!assets.has_intro());

        assets.select(AssetSlot::Intro, RenderAsset::new("i.mp4", vec![2u8]));
        let order: Vec<_> = assets.selected().map(|(s, _)| s).collect();
        assert_eq!(order, vec![AssetSlot::Intro, AssetSlot::RightOverlay]);

        assets.clear(AssetSlot::Intro);
        assets.clear(AssetSlot::RightOverlay);
        assert!(!assets.has_any());
    }

    #[test]
    fn slots_map_to_fixed_inputs() {
        let idx: Vec<_> = AssetSlot::ALL.iter().map(|s| s.input_index()).collect();
        assert_eq!(idx, vec![1, 2, 3]);
        assert_eq!(AssetSlot::Intro.accept(), "video/*");
    }

    #[test]
    fn blank_png_decodes_as_transparent_pixel() {
        let bytes = blank_png().unwrap();
        let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }
}
