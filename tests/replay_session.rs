use std::path::PathBuf;

use steady_emotion::config::Config;
use steady_emotion::feedback::FALLBACK_FEEDBACK;
use steady_emotion::session::Session;
use steady_emotion::source::{LabelSource, LineSource, SessionTimer};
use steady_emotion::SessionReport;
use tokio::io::BufReader;

fn replay_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("short_replay.txt")
}

#[tokio::test]
async fn replay_file_produces_expected_report() {
    let file = tokio::fs::File::open(replay_path()).await.unwrap();
    let mut source = LineSource::new(BufReader::new(file), SessionTimer::start());
    let config = Config {
        feedback_seed: Some(5),
        ..Config::default()
    };
    let mut session = Session::from_config(&config, 0.0).unwrap();

    let mut changes = Vec::new();
    while let Some(frame) = source.next_frame().await.unwrap() {
        let annotation = session.process(&frame).unwrap();
        if annotation.transitioned {
            changes.push((frame.timestamp, annotation.emotion.clone(), annotation.feedback));
        }
    }
    assert_eq!(session.frames(), 17);

    // neutral at 0.0, then happy once the cooldown has passed at 5.6
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].0, 0.0);
    assert_eq!(changes[0].1.as_deref(), Some("neutral"));
    assert_eq!(changes[0].2, FALLBACK_FEEDBACK);
    assert_eq!(changes[1].0, 5.6);
    assert_eq!(changes[1].1.as_deref(), Some("happy"));

    let end = session.last_timestamp();
    let report = session.finish(end).unwrap();
    assert!((report.duration("neutral").unwrap() - 5.6).abs() < 1e-9);
    assert!((report.duration("happy").unwrap() - 1.6).abs() < 1e-9);
    assert_eq!(report.count("neutral"), 12);
    assert_eq!(report.count("happy"), 5);
    assert_eq!(
        report.summary_lines(),
        vec![
            "Neutral Duration: 5.60 seconds".to_string(),
            "Happy Duration: 1.60 seconds".to_string(),
        ]
    );

    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("report.json");
    report.save_json(&json).unwrap();
    assert_eq!(SessionReport::load_json(&json).unwrap(), report);
}
