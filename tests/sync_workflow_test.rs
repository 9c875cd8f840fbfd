use lyric_sync::{
    AppConfig, EditorSession, LineStore, LineTiming, LyricFormat, MemoryDraftStore, SyncedLine,
    converter::{
        export_lyrics, import_lyrics,
        processors::formatting_analyzer::{IssueKind, analyze, fix_all, fix_one},
    },
    store::reconcile_lines,
    sync::{
        media::{MediaPort, SimulatedMedia},
        synchronizer::{MarkOutcome, NudgeBound, Synchronizer},
    },
};
use lyric_sync_core::{
    TtmlGenerationOptions,
    time::{format_lrc_time, format_ttml_time, parse_time_to_seconds},
};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lyric_sync=trace"));
    let _ = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn synced(text: &str, begin: f64, end: f64) -> SyncedLine {
    SyncedLine::new(text).with_timing(LineTiming::Synced { begin, end })
}

#[test]
fn test_time_round_trip() {
    init_tracing();
    for centis in (0..400_000).step_by(997) {
        let seconds = f64::from(centis) / 100.0;
        let lrc = parse_time_to_seconds(&format_lrc_time(seconds)).unwrap();
        let ttml = parse_time_to_seconds(&format_ttml_time(seconds)).unwrap();
        assert!((lrc - seconds).abs() <= 0.005, "{seconds} -> {lrc}");
        assert!((ttml - seconds).abs() <= 0.005, "{seconds} -> {ttml}");
    }
}

#[test]
fn test_full_session_to_ttml_and_back() {
    init_tracing();
    let mut config = AppConfig::default();
    config.ttml = TtmlGenerationOptions {
        format: false,
        ..Default::default()
    };
    let mut session = EditorSession::new(config.clone(), MemoryDraftStore::new());
    let mut media = SimulatedMedia::new(Some(120.0));

    session.load_text("Rock & roll <live>\n\nSecond verse");
    media.play().unwrap();
    media.advance(2.0);
    assert_eq!(session.mark(&media), MarkOutcome::BeginMarked);
    media.advance(3.0);
    assert_eq!(
        session.mark(&media),
        MarkOutcome::EndMarked {
            advanced_to: Some(2)
        }
    );
    media.advance(1.0);
    session.mark(&media);
    media.advance(4.0);
    session.mark(&media);
    assert!(session.all_lines_synced());

    let ttml = session.export(LyricFormat::Ttml).unwrap();
    assert!(ttml.contains("Rock &amp; roll &lt;live&gt;"));

    let reimported = import_lyrics(&ttml, LyricFormat::Ttml, &config).unwrap();
    let texts: Vec<_> = reimported.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["Rock & roll <live>", "Second verse"]);
    assert_eq!(reimported.lines[1].begin(), Some(6.0));
    assert_eq!(reimported.lines[1].end(), Some(10.0));
}

#[test]
fn test_lrc_silence_marker() {
    let lines = vec![synced("A", 0.0, 2.0), synced("B", 17.0, 18.0)];
    let lrc = export_lyrics(&lines, LyricFormat::Lrc, &AppConfig::default()).unwrap();
    assert_eq!(lrc, "[00:00.00]A\n[00:02.00]\n[00:17.00]B\n[00:18.00]");

    let lines = vec![synced("A", 0.0, 2.0), synced("B", 12.0, 13.0)];
    let lrc = export_lyrics(&lines, LyricFormat::Lrc, &AppConfig::default()).unwrap();
    assert_eq!(lrc, "[00:00.00]A\n[00:12.00]B\n[00:13.00]");
}

#[test]
fn test_reflow_preserves_timing() {
    let old = vec![synced("One", 1.0, 2.0), synced("Two", 3.0, 4.0), synced("Three", 5.0, 6.0)];
    let new = reconcile_lines(&old, "Zero\nTwo\nOne\nThree!");

    assert_eq!(new[1].id, old[1].id);
    assert_eq!(new[2].id, old[0].id);
    assert_eq!(new[2].timing, old[0].timing);
    assert_eq!(new[0].timing, LineTiming::Unsynced);
    assert_eq!(new[3].timing, LineTiming::Unsynced);
}

#[test]
fn test_gap_invariant_with_marks_then_nudges() {
    init_tracing();
    let mut store = LineStore::from_text("a\nb\nc");
    let mut sync = Synchronizer::default();
    let mut media = SimulatedMedia::new(Some(20.0));

    for (begin, end) in [(1.0, 2.0), (2.05, 3.0), (3.0, 4.0)] {
        sync.mark(&mut store, begin);
        sync.mark(&mut store, end);
    }
    for index in 0..3 {
        sync.nudge(&mut store, index, NudgeBound::End, 0.0, &mut media)
            .unwrap();
        sync.nudge(&mut store, index, NudgeBound::Begin, 0.0, &mut media)
            .unwrap();
    }

    let lines = store.lines();
    for pair in lines.windows(2) {
        let gap = pair[1].begin().unwrap() - pair[0].end().unwrap();
        assert!(gap >= 0.1 - 1e-6, "gap {gap}");
    }
}

#[test]
fn test_analysis_scenarios() {
    let lines: Vec<SyncedLine> = ["", "Hello", "World", ""].into_iter().map(SyncedLine::new).collect();
    let result = analyze(&lines);
    assert_eq!(result.get(IssueKind::StartEmpty).len(), 1);
    assert_eq!(result.get(IssueKind::EndEmpty).len(), 1);
    let fixed = fix_all(&fix_all(&lines, IssueKind::StartEmpty), IssueKind::EndEmpty);
    let texts: Vec<_> = fixed.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello", "World"]);
    assert!(analyze(&fixed).is_clean());

    let lines = vec![SyncedLine::new("hello world")];
    let issue = analyze(&lines).get(IssueKind::Capitalization)[0].clone();
    assert_eq!(fix_one(&lines, &issue.line_id, issue.kind)[0].text, "Hello world");
}

/// 处理事件直到队列为空（处理事件本身可能产生新的事件，例如自动暂停）。
fn pump(session: &mut EditorSession<MemoryDraftStore>, media: &mut SimulatedMedia) {
    loop {
        let events = media.drain_events();
        if events.is_empty() {
            break;
        }
        for event in events {
            session.handle_media_event(event, media);
        }
    }
}

#[test]
fn test_segment_audition_stops_and_pause_clears_target() {
    let mut session = EditorSession::new(AppConfig::default(), MemoryDraftStore::new());
    let mut media = SimulatedMedia::new(Some(30.0));
    session
        .import("[00:01.00]One\n[00:02.00]Two\n[00:04.00]", LyricFormat::Lrc)
        .unwrap();

    session.select_line(0, &mut media).unwrap();
    pump(&mut session, &mut media);
    assert_eq!(session.tracker().active_index(), Some(0));

    media.advance(0.5);
    pump(&mut session, &mut media);
    assert!(!media.is_paused());
    media.advance(0.6);
    pump(&mut session, &mut media);
    assert!(media.is_paused());
    assert_eq!(session.synchronizer().segment().stop_at(), None);
    assert!(!session.tracker().is_polling());

    session.play_from_end(0, &mut media).unwrap();
    media.pause();
    pump(&mut session, &mut media);
    assert_eq!(session.synchronizer().segment().stop_at(), None);
}

#[test]
fn test_tracker_follows_playback() {
    let mut session = EditorSession::new(AppConfig::default(), MemoryDraftStore::new());
    let mut media = SimulatedMedia::new(Some(10.0));
    session
        .import("[00:01.00]One\n[00:02.00]Two\n[00:04.00]", LyricFormat::Lrc)
        .unwrap();

    media.play().unwrap();
    for event in media.drain_events() {
        session.handle_media_event(event, &mut media);
    }
    let mut changes = Vec::new();
    for _ in 0..10 {
        media.advance(0.5);
        media.drain_events();
        if session.on_frame(&media) {
            changes.push(session.tracker().active_index());
        }
    }
    assert_eq!(changes, vec![Some(0), Some(1), None]);
}
