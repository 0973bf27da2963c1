//! Monitor lifecycle against scripted collaborators, on paused tokio time

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use vigil_core::{AttentionConfig, Sample, SampleOrigin, VigilError};
use vigil_runtime::{Monitor, VisibilityFlag};
use vigil_session::LiveStatus;
use vigil_test::{
    CameraCalls, CameraMode, DetectorCalls, FaceBuilder, MockFrame, RecordingReporter, Scene,
    ScriptedCamera, ScriptedDetector,
};

type TestMonitor = Monitor<ScriptedCamera, ScriptedDetector, VisibilityFlag, RecordingReporter>;

struct Rig {
    monitor: TestMonitor,
    scene: Scene,
    visibility: VisibilityFlag,
    reporter: RecordingReporter,
    camera: Arc<CameraCalls>,
    detector: Arc<DetectorCalls>,
}

fn rig_with(
    frame: MockFrame,
    camera_mode: CameraMode,
    detector: ScriptedDetector,
    reporter: RecordingReporter,
) -> Rig {
    let scene = Scene::new(frame);
    let camera = ScriptedCamera::new(scene.clone()).with_mode(camera_mode);
    let visibility = VisibilityFlag::new();
    let camera_calls = camera.calls();
    let detector_calls = detector.calls();
    let monitor = Monitor::new(
        AttentionConfig::default(),
        camera,
        detector,
        visibility.clone(),
        reporter.clone(),
    );
    Rig {
        monitor,
        scene,
        visibility,
        reporter,
        camera: camera_calls,
        detector: detector_calls,
    }
}

fn rig(frame: MockFrame) -> Rig {
    rig_with(
        frame,
        CameraMode::Ready,
        ScriptedDetector::new(),
        RecordingReporter::new(),
    )
}

fn attentive() -> MockFrame {
    MockFrame::Face(FaceBuilder::attentive().build())
}

fn values(samples: &[Sample]) -> Vec<u8> {
    samples.iter().map(Sample::value).collect()
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[tokio::test(start_paused = true)]
async fn test_attentive_session_end_to_end() {
    let mut rig = rig(attentive());
    assert!(rig.monitor.start().await.unwrap());

    sleep(ms(5500)).await;
    assert_eq!(values(&rig.monitor.samples()), vec![100; 5]);

    let outcome = rig.monitor.stop().await.unwrap();
    assert!(outcome.delivered());
    assert_eq!(outcome.summary.total_samples, 5);
    assert_eq!(outcome.summary.average_score_0to100, 100);
    assert_eq!(outcome.summary.time_adjusted_average_0to100, 95);
    assert_eq!(outcome.summary.session_duration_ms, 5500);

    let log = rig.reporter.log();
    assert_eq!(log.started, 1);
    assert_eq!(log.samples.len(), 5);
    assert!(log.samples.iter().all(|t| !t.absent && t.ear.is_some()));
    assert_eq!(log.summaries.len(), 1);
    assert_eq!(log.summaries[0].average_score_100, 100);

    assert_eq!(rig.camera.open_streams(), 0);
    assert_eq!(rig.detector.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_and_stop_are_idempotent() {
    let mut rig = rig(attentive());
    assert!(rig.monitor.start().await.unwrap());
    assert!(!rig.monitor.start().await.unwrap());
    assert_eq!(rig.detector.configured(), 1);
    assert_eq!(rig.camera.opened(), 1);

    sleep(ms(1500)).await;
    assert!(rig.monitor.stop().await.is_some());
    assert!(rig.monitor.stop().await.is_none());
    assert_eq!(rig.detector.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_model_load_failure_leaves_monitor_idle() {
    let mut rig = rig_with(
        attentive(),
        CameraMode::Ready,
        ScriptedDetector::failing_configure(),
        RecordingReporter::new(),
    );

    let err = rig.monitor.start().await.unwrap_err();
    assert!(matches!(err, VigilError::ModelLoadFailed(_)));
    assert!(!rig.monitor.is_running());
    assert_eq!(rig.camera.opened(), 0);
    assert!(rig.monitor.stop().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_camera_failures_release_detector() {
    for mode in [CameraMode::PermissionDenied, CameraMode::Unavailable] {
        let mut rig = rig_with(
            attentive(),
            mode,
            ScriptedDetector::new(),
            RecordingReporter::new(),
        );

        let err = rig.monitor.start().await.unwrap_err();
        assert!(err.is_acquisition_failure());
        assert!(!rig.monitor.is_running());
        assert_eq!(rig.detector.released(), 1);
        assert_eq!(rig.reporter.log().started, 0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_hidden_ticks_score_zero() {
    let mut rig = rig(attentive());
    rig.monitor.start().await.unwrap();

    sleep(ms(2500)).await;
    rig.visibility.set_hidden(true);
    sleep(ms(2000)).await;

    let samples = rig.monitor.samples();
    assert_eq!(values(&samples), vec![100, 100, 0, 0]);
    assert!(samples[2..].iter().all(|s| s.origin == SampleOrigin::Hidden));

    rig.visibility.set_hidden(false);
    sleep(ms(1000)).await;
    assert_eq!(rig.monitor.samples().last().map(Sample::value), Some(100));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_detector_counts_as_absence() {
    let mut rig = rig(MockFrame::Stall);
    rig.monitor.start().await.unwrap();

    sleep(ms(4500)).await;
    assert_eq!(values(&rig.monitor.samples()), vec![80, 40, 0, 0]);

    let outcome = rig.monitor.stop().await.unwrap();
    assert_eq!(outcome.summary.total_samples, 4);
    assert_eq!(rig.detector.released(), 1);
    assert_eq!(rig.camera.open_streams(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_detector_errors_count_as_absence() {
    let mut rig = rig(MockFrame::Fail);
    rig.monitor.start().await.unwrap();

    sleep(ms(4500)).await;
    assert_eq!(values(&rig.monitor.samples()), vec![80, 40, 0, 0]);
    assert!(rig.detector.inferred() > 10);
    assert_eq!(
        rig.monitor.live().unwrap().status,
        LiveStatus::FaceNotDetected
    );
}

#[tokio::test(start_paused = true)]
async fn test_summary_delivery_failure_keeps_summary() {
    let mut rig = rig_with(
        attentive(),
        CameraMode::Ready,
        ScriptedDetector::new(),
        RecordingReporter::new().failing_summary(),
    );
    rig.monitor.start().await.unwrap();
    sleep(ms(3500)).await;

    let outcome = rig.monitor.stop().await.unwrap();
    assert!(!outcome.delivered());
    assert!(matches!(outcome.delivery, Err(VigilError::ReportFailed(_))));
    assert_eq!(outcome.summary.total_samples, 3);
    assert_eq!(rig.reporter.log().summary_attempts, 1);
    assert!(!rig.monitor.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_telemetry_failures_do_not_interrupt_sampling() {
    let mut rig = rig_with(
        attentive(),
        CameraMode::Ready,
        ScriptedDetector::new(),
        RecordingReporter::new().failing_samples(),
    );
    rig.monitor.start().await.unwrap();
    sleep(ms(3500)).await;

    assert_eq!(rig.monitor.samples().len(), 3);
    let log = rig.reporter.log();
    assert_eq!(log.sample_attempts, 3);
    assert!(log.samples.is_empty());

    let outcome = rig.monitor.stop().await.unwrap();
    assert!(outcome.delivered());
}

#[tokio::test(start_paused = true)]
async fn test_anonymous_caller_sends_nothing() {
    let mut rig = rig_with(
        attentive(),
        CameraMode::Ready,
        ScriptedDetector::new(),
        RecordingReporter::anonymous(),
    );
    rig.monitor.start().await.unwrap();
    sleep(ms(2500)).await;

    let outcome = rig.monitor.stop().await.unwrap();
    assert!(matches!(outcome.delivery, Err(VigilError::NotAuthenticated)));
    assert_eq!(outcome.summary.total_samples, 2);

    let log = rig.reporter.log();
    assert_eq!(log.started, 0);
    assert_eq!(log.sample_attempts, 0);
    assert_eq!(log.summary_attempts, 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_starts_clean() {
    let mut rig = rig(attentive());
    rig.monitor.start().await.unwrap();
    sleep(ms(3500)).await;
    rig.monitor.stop().await.unwrap();

    rig.scene.set(MockFrame::NoFace);
    assert!(rig.monitor.start().await.unwrap());
    sleep(ms(2500)).await;

    // Seeded again rather than carrying the previous session's 100
    assert_eq!(values(&rig.monitor.samples()), vec![80, 40]);
    let outcome = rig.monitor.stop().await.unwrap();
    assert_eq!(outcome.summary.total_samples, 2);

    assert_eq!(rig.detector.configured(), 2);
    assert_eq!(rig.detector.released(), 2);
    assert_eq!(rig.camera.opened(), 2);
    assert_eq!(rig.camera.open_streams(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_drop_releases_resources() {
    let rig = rig(attentive());
    let Rig {
        mut monitor,
        camera,
        detector,
        ..
    } = rig;
    monitor.start().await.unwrap();
    sleep(ms(1500)).await;

    drop(monitor);
    sleep(ms(10)).await;

    assert_eq!(camera.open_streams(), 0);
    assert_eq!(detector.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_delivers_summary() {
    let Rig {
        mut monitor,
        reporter,
        detector,
        ..
    } = rig(attentive());
    monitor.start().await.unwrap();
    sleep(ms(3500)).await;

    drop(monitor);
    sleep(ms(10)).await;

    let log = reporter.log();
    assert_eq!(log.summary_attempts, 1);
    assert_eq!(log.summaries.len(), 1);
    assert_eq!(log.summaries[0].total_samples, 3);
    assert_eq!(log.summaries[0].average_score_100, 100);
    assert_eq!(log.summaries[0].session_ms, 3500);
    assert_eq!(detector.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_after_stop_sends_one_summary() {
    let Rig {
        mut monitor,
        reporter,
        ..
    } = rig(attentive());
    monitor.start().await.unwrap();
    sleep(ms(2500)).await;
    monitor.stop().await.unwrap();

    drop(monitor);
    sleep(ms(10)).await;
    assert_eq!(reporter.log().summary_attempts, 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_of_anonymous_session_sends_nothing() {
    let Rig {
        mut monitor,
        reporter,
        ..
    } = rig_with(
        attentive(),
        CameraMode::Ready,
        ScriptedDetector::new(),
        RecordingReporter::anonymous(),
    );
    monitor.start().await.unwrap();
    sleep(ms(2500)).await;

    drop(monitor);
    sleep(ms(10)).await;
    assert_eq!(reporter.log().summary_attempts, 0);
}

#[tokio::test(start_paused = true)]
async fn test_stuck_telemetry_calls_are_abandoned() {
    let mut rig = rig_with(
        attentive(),
        CameraMode::Ready,
        ScriptedDetector::new(),
        RecordingReporter::new().hanging_samples(),
    );
    rig.monitor.start().await.unwrap();
    sleep(ms(5500)).await;

    // Each call gets one interval; only the latest is still outstanding
    assert_eq!(rig.reporter.log().sample_attempts, 5);
    assert_eq!(rig.reporter.pending_samples(), 1);
    assert_eq!(values(&rig.monitor.samples()), vec![100; 5]);

    let outcome = rig.monitor.stop().await.unwrap();
    assert!(outcome.delivered());
    sleep(ms(1000)).await;
    assert_eq!(rig.reporter.pending_samples(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stream_end_releases_early_and_keeps_sampling() {
    let mut rig = rig(attentive());
    rig.monitor.start().await.unwrap();
    sleep(ms(1500)).await;

    rig.scene.end();
    sleep(ms(500)).await;
    assert!(rig.monitor.is_running());
    assert_eq!(rig.camera.open_streams(), 0);
    assert_eq!(rig.detector.released(), 1);

    sleep(ms(2500)).await;
    let samples = rig.monitor.samples();
    assert_eq!(samples.len(), 4);
    assert_eq!(samples[3].origin, SampleOrigin::SoftAbsence);

    assert!(rig.monitor.stop().await.is_some());
    assert_eq!(rig.detector.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_live_stats_follow_session() {
    let mut rig = rig(attentive());
    assert!(rig.monitor.live().is_none());
    rig.monitor.start().await.unwrap();

    sleep(ms(2500)).await;
    let live = rig.monitor.live().unwrap();
    assert_eq!(live.status.label(), "attentive");
    assert_eq!(live.displayed_score.value(), 100);
    assert_eq!(live.running_average, 100);
    assert_eq!(live.attentive_pct, 100);
    assert_eq!(live.total_samples, 2);
    assert_eq!(live.elapsed, ms(2500));
}
