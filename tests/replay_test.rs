//! Integration tests for script replay

use notch_touch::config::Config;
use notch_touch::platform::{CutoutRect, PlatformCall};
use notch_touch::runtime::{load_script, parse_script, replay, ScriptError};
use std::path::PathBuf;

fn demo_script() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("long_press.jsonl")
}

#[test]
fn test_demo_script_replay() {
    let script = load_script(&demo_script()).expect("demo script should parse");
    let report = replay(&Config::default(), &script);

    let torch: Vec<(u64, bool)> = report
        .steps
        .iter()
        .filter_map(|s| match s.call {
            PlatformCall::SetTorchMode { enabled, .. } => Some((s.at_ms, enabled)),
            _ => None,
        })
        .collect();
    assert_eq!(torch, vec![(1_500, true), (5_400, false)]);

    let locks: Vec<u64> = report
        .calls(|c| *c == PlatformCall::LockScreen)
        .map(|s| s.at_ms)
        .collect();
    assert_eq!(locks, vec![3_150]);

    let moved: Vec<CutoutRect> = report
        .steps
        .iter()
        .filter_map(|s| match &s.call {
            PlatformCall::UpdateSurface(params) => Some(params.bounds),
            _ => None,
        })
        .collect();
    assert_eq!(moved, vec![CutoutRect::new(0, 40, 30, 100)]);

    assert_eq!(report.calls(|c| *c == PlatformCall::NudgeVolume).count(), 0);
    assert_eq!(report.calls(|c| *c == PlatformCall::HeavyClick).count(), 1);

    assert_eq!(report.stats.long_presses, 2);
    assert_eq!(report.stats.double_taps, 1);
    assert_eq!(report.stats.torch_requests, 2);
    assert_eq!(report.stats.relayouts, 1);
}

#[test]
fn test_connect_order() {
    let report = replay(&Config::default(), &[]);
    let first: Vec<PlatformCall> = report
        .steps
        .iter()
        .take_while(|s| s.at_ms == 0)
        .map(|s| s.call.clone())
        .take(3)
        .collect();

    assert_eq!(first[0], PlatformCall::RegisterTorchCallback);
    assert!(matches!(first[1], PlatformCall::AddSurface(_)));
    assert!(matches!(first[2], PlatformCall::Subscribe(_)));
}

#[test]
fn test_legacy_screen_cycle() {
    let mut config = Config::default();
    config.simulation.rotation_callbacks = false;
    let script = parse_script(
        r#"
{"at_ms": 100, "event": "screen_off"}
{"at_ms": 200, "event": "rotate", "rotation": "90"}
{"at_ms": 300, "event": "configuration_changed"}
{"at_ms": 400, "event": "screen_on"}
"#,
    )
    .unwrap();

    let report = replay(&config, &script);
    let overlay: Vec<(u64, PlatformCall)> = report
        .steps
        .iter()
        .filter(|s| {
            matches!(
                s.call,
                PlatformCall::AddSurface(_)
                    | PlatformCall::UpdateSurface(_)
                    | PlatformCall::RemoveSurface
            )
        })
        .map(|s| (s.at_ms, s.call.clone()))
        .collect();

    assert_eq!(overlay.len(), 4);
    assert_eq!(overlay[1], (100, PlatformCall::RemoveSurface));
    match &overlay[2] {
        (400, PlatformCall::AddSurface(params)) => {
            assert_eq!(params.bounds, CutoutRect::new(0, 40, 30, 100))
        }
        other => panic!("expected re-attach at 400, got {other:?}"),
    }
    assert_eq!(overlay[3].1, PlatformCall::RemoveSurface);
}

#[test]
fn test_touch_at_end_of_clock() {
    let script = parse_script(
        r#"{"at_ms": 18446744073709551000, "event": "touch", "action": "down", "x": 50, "y": 10}"#,
    )
    .unwrap();

    let report = replay(&Config::default(), &script);
    let torch: Vec<u64> = report
        .calls(|c| matches!(c, PlatformCall::SetTorchMode { .. }))
        .map(|s| s.at_ms)
        .collect();
    assert_eq!(torch, vec![u64::MAX]);
    assert_eq!(report.stats.touches, 1);
}

#[test]
fn test_bad_script_is_rejected() {
    let err = parse_script("{\"at_ms\": \"soon\", \"event\": \"screen_on\"}").unwrap_err();
    assert!(matches!(err, ScriptError::Parse { line: 1, .. }));
    assert!(err.to_string().starts_with("Line 1"));

    let missing = load_script(&PathBuf::from("/nonexistent/script.jsonl")).unwrap_err();
    assert!(matches!(missing, ScriptError::Io(_)));
}
