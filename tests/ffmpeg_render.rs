#[cfg(feature = "media-ffmpeg")]
mod ffmpeg_render {
    use std::path::{Path, PathBuf};
    use std::process::Command;

    use trimreel::{
        AssetSlot, DirectorySink, EngineLocation, FfmpegEngine, MediaEngine, RenderAsset,
        RenderOpts, RenderRequestBuilder, is_ffmpeg_on_path,
    };

    fn synth(args: &[&str], out: &Path) -> anyhow::Result<()> {
        let status = Command::new("ffmpeg")
            .args(["-v", "error", "-y"])
            .args(args)
            .arg(out)
            .status()?;
        anyhow::ensure!(status.success(), "ffmpeg failed creating {}", out.display());
        Ok(())
    }

    fn synth_media(root: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(root)?;
        for (name, tone) in [("base.mp4", "440"), ("intro.mp4", "220")] {
            synth(
                &[
                    "-f",
                    "lavfi",
                    "-i",
                    "testsrc=size=64x48:rate=10",
                    "-f",
                    "lavfi",
                    "-i",
                    &format!("sine=frequency={tone}:sample_rate=48000"),
                    "-t",
                    "1",
                    "-pix_fmt",
                    "yuv420p",
                    "-c:v",
                    "libx264",
                    "-c:a",
                    "aac",
                ],
                &root.join(name),
            )?;
        }
        synth(
            &["-f", "lavfi", "-i", "color=c=red:size=8x8", "-frames:v", "1"],
            &root.join("icon.png"),
        )?;
        Ok(())
    }

    fn render_once(root: &Path, with_intro: bool) -> anyhow::Result<(PathBuf, Vec<String>)> {
        let mut builder = RenderRequestBuilder::with_blank_placeholder(
            RenderAsset::from_path(&root.join("base.mp4"))?,
            RenderOpts::default(),
        )?;
        builder.select_asset(
            AssetSlot::LeftOverlay,
            RenderAsset::from_path(&root.join("icon.png"))?,
        );
        if with_intro {
            builder.select_asset(
                AssetSlot::Intro,
                RenderAsset::from_path(&root.join("intro.mp4"))?,
            );
        }

        let mut engine = FfmpegEngine::new();
        engine.load(&EngineLocation::new("ffmpeg"))?;
        let workdir = engine.workdir().map(Path::to_path_buf);

        let messages = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink_messages = std::sync::Arc::clone(&messages);
        let path = builder.render(
            &mut engine,
            &mut DirectorySink::new(root.join("out")),
            move |msg| sink_messages.lock().unwrap().push(msg.to_owned()),
        )?;
        assert!(!builder.status().is_rendering);

        drop(engine);
        if let Some(dir) = workdir {
            assert!(!dir.exists(), "staging dir {} left behind", dir.display());
        }

        let messages = messages.lock().unwrap().clone();
        Ok((path, messages))
    }

    #[test]
    fn overlay_and_intro_renders_produce_mp4() -> anyhow::Result<()> {
        if !is_ffmpeg_on_path() {
            eprintln!("skipping: ffmpeg not on PATH");
            return Ok(());
        }
        let root = PathBuf::from("target").join("ffmpeg_render");
        synth_media(&root)?;

        let (path, messages) = render_once(&root, false)?;
        assert!(std::fs::metadata(&path)?.len() > 0);
        assert!(messages.iter().all(|m| m.contains("% (rendered time:")));

        let (path, _) = render_once(&root, true)?;
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("output.mp4"));
        assert!(std::fs::metadata(&path)?.len() > 0);
        Ok(())
    }
}
