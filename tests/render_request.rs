use trimreel::{
    AssetSlot, EngineEvent, EngineLocation, EngineScript, FilterTemplate, InMemoryDownload,
    InMemoryEngine, MediaEngine, ProgressEvent, RenderAsset, RenderOpts, RenderRequestBuilder,
    TrimError,
};

fn builder() -> RenderRequestBuilder {
    RenderRequestBuilder::with_blank_placeholder(
        RenderAsset::new("talk.mp4", b"base-video".to_vec()),
        RenderOpts::default(),
    )
    .unwrap()
}

fn loaded(script: EngineScript) -> InMemoryEngine {
    let mut engine = InMemoryEngine::new(script);
    engine.load(&EngineLocation::new("ffmpeg")).unwrap();
    engine
}

fn progress(progress: f64, time_us: i64) -> ProgressEvent {
    ProgressEvent { progress, time_us }
}

#[test]
fn overlay_render_stages_inputs_and_downloads_output() {
    let mut b = builder();
    b.select_asset(
        AssetSlot::LeftOverlay,
        RenderAsset::new("left.png", b"L".to_vec()),
    );
    b.select_asset(
        AssetSlot::RightOverlay,
        RenderAsset::new("right.png", b"R".to_vec()),
    );

    let mut engine = loaded(EngineScript {
        output: b"rendered".to_vec(),
        ..EngineScript::default()
    });
    let mut sink = InMemoryDownload::new();
    let path = b.render(&mut engine, &mut sink, |_| {}).unwrap();

    assert_eq!(path.to_str(), Some("output.mp4"));
    assert_eq!(
        sink.files(),
        &[("output.mp4".to_owned(), b"rendered".to_vec())]
    );

    let files = engine.files();
    assert_eq!(files["original.mp4"], b"base-video");
    assert!(files.contains_key("blank.png"));
    assert_eq!(files["left.png"], b"L");
    assert_eq!(files["right.png"], b"R");

    let args = &engine.submitted()[0];
    assert_eq!(args[3], "blank.png", "intro slot falls back to the placeholder");
    assert!(!args.iter().any(|a| a.contains("concat")));
}

#[test]
fn template_depends_only_on_the_intro() {
    let mut b = builder();
    b.select_asset(
        AssetSlot::LeftOverlay,
        RenderAsset::new("left.png", vec![1u8]),
    );
    b.select_asset(
        AssetSlot::RightOverlay,
        RenderAsset::new("right.png", vec![1u8]),
    );
    assert_eq!(b.template(), FilterTemplate::OverlayOnly);

    b.select_asset(AssetSlot::Intro, RenderAsset::new("intro.mp4", vec![1u8]));
    assert_eq!(b.template(), FilterTemplate::IntroConcat);

    b.clear_asset(AssetSlot::LeftOverlay);
    b.clear_asset(AssetSlot::RightOverlay);
    assert_eq!(b.template(), FilterTemplate::IntroConcat);

    let args = b.job_args().to_args();
    assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "[a]"));
    assert!(args.windows(2).any(|w| w[0] == "-vsync" && w[1] == "vfr"));
}

#[test]
fn progress_messages_are_reported_verbatim() {
    let mut b = builder();
    b.select_asset(AssetSlot::Intro, RenderAsset::new("intro.mp4", vec![1u8]));
    let mut engine = loaded(EngineScript {
        logs: vec!["Input #0".to_owned()],
        progress: vec![progress(0.5, 2_500_000), progress(0.25, 1_000_000)],
        output: vec![0u8],
        ..EngineScript::default()
    });

    let task = b.spawn_render(engine, InMemoryDownload::new());
    let messages: Vec<String> = task.updates().collect();
    let outcome = task.join().unwrap();

    assert_eq!(
        messages,
        vec![
            "50 % (rendered time: 2 s)".to_owned(),
            "25 % (rendered time: 1 s)".to_owned(),
        ]
    );
    assert!(outcome.result.is_ok());
    assert_eq!(outcome.sink.files().len(), 1);
    engine = outcome.engine;
    assert_eq!(engine.listener_count(), 0);
}

#[test]
fn spawned_render_keeps_the_callers_log_listener() {
    let mut b = builder();
    b.select_asset(AssetSlot::Intro, RenderAsset::new("intro.mp4", vec![1u8]));
    let mut engine = loaded(EngineScript {
        logs: vec!["Input #0".to_owned(), "Input #1".to_owned()],
        output: vec![0u8],
        ..EngineScript::default()
    });

    let (log_tx, log_rx) = std::sync::mpsc::channel();
    engine.on_event(Box::new(move |event: &EngineEvent| {
        if let EngineEvent::Log(line) = event {
            let _ = log_tx.send(line.clone());
        }
    }));

    let task = b.spawn_render(engine, InMemoryDownload::new());
    let first = task.join().unwrap();
    assert!(first.result.is_ok());
    assert_eq!(first.engine.listener_count(), 1);

    let task = b.spawn_render(first.engine, first.sink);
    let second = task.join().unwrap();
    assert!(second.result.is_ok());
    assert_eq!(second.sink.files().len(), 2);

    let lines: Vec<String> = log_rx.try_iter().collect();
    assert_eq!(lines, ["Input #0", "Input #1", "Input #0", "Input #1"]);
}

#[test]
fn busy_flag_clears_after_a_failed_job() {
    let mut b = builder();
    b.select_asset(
        AssetSlot::RightOverlay,
        RenderAsset::new("right.png", vec![1u8]),
    );
    let mut engine = loaded(EngineScript {
        progress: vec![progress(0.1, 100_000)],
        fail_exec: Some("Conversion failed!".to_owned()),
        ..EngineScript::default()
    });

    let err = b
        .render(&mut engine, &mut InMemoryDownload::new(), |_| {})
        .unwrap_err();
    assert!(matches!(err, TrimError::Engine(_)));
    assert!(!b.status().is_rendering);
    assert_eq!(engine.listener_count(), 0);

    // The builder is usable again once the failure is cleared.
    let mut retry = loaded(EngineScript {
        output: vec![7u8],
        ..EngineScript::default()
    });
    assert!(
        b.render(&mut retry, &mut InMemoryDownload::new(), |_| {})
            .is_ok()
    );
    assert!(!b.status().is_rendering);
}

#[test]
fn busy_flag_clears_when_download_fails() {
    let mut b = builder();
    b.select_asset(
        AssetSlot::LeftOverlay,
        RenderAsset::new("left.png", vec![1u8]),
    );
    let mut engine = loaded(EngineScript {
        output: Vec::new(),
        ..EngineScript::default()
    });
    let mut sink = FailingSink;
    assert!(b.render(&mut engine, &mut sink, |_| {}).is_err());
    assert!(!b.status().is_rendering);
}

#[test]
fn unloaded_engine_is_refused() {
    let mut b = builder();
    b.select_asset(
        AssetSlot::LeftOverlay,
        RenderAsset::new("left.png", vec![1u8]),
    );
    let mut engine = InMemoryEngine::new(EngineScript {
        fail_load: Some("core fetch failed".to_owned()),
        ..EngineScript::default()
    });
    assert!(engine.load(&EngineLocation::new("ffmpeg")).is_err());
    let err = b
        .render(&mut engine, &mut InMemoryDownload::new(), |_| {})
        .unwrap_err();
    assert!(err.to_string().contains("not loaded"));
}

struct FailingSink;

impl trimreel::DownloadSink for FailingSink {
    fn save(&mut self, _file_name: &str, _bytes: &[u8]) -> trimreel::TrimResult<std::path::PathBuf> {
        Err(TrimError::validation("download blocked"))
    }
}
