//! Integration tests for the detect, decide, composite pipeline.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use frame_redact_core::{
    Detections, ElementId, Frame, FrameSink, FrameSource, Gender, PolicySettings, ProgressEvent,
    ProgressSink, Redactor, ResultOutput,
};
use frame_redact_test_support::{
    FaceBuilder, MaskBuilder, MockDetector, MockFrameSink, MockFrameSource, MockProgressSink,
    MockResultOutput, SyntheticFrameBuilder,
};

fn frame(element: &str) -> Frame {
    SyntheticFrameBuilder::with_element(&SyntheticFrameBuilder::checkerboard(32, 32), element)
}

fn one_man() -> Detections {
    Detections {
        faces: vec![FaceBuilder::male([4.0, 4.0, 14.0, 14.0])],
        mask: None,
    }
}

fn men_only() -> PolicySettings {
    PolicySettings {
        blur_men: true,
        ..PolicySettings::disabled()
    }
}

#[test]
fn test_failing_detector_falls_back() {
    let redactor = Redactor::new(MockDetector::failing("model crashed"));
    let outcome = redactor
        .process(&frame("a"), &PolicySettings::disabled())
        .unwrap();

    assert!(outcome.fallback);
    assert!(outcome.is_redacted());
    assert!(redactor.is_redacted(&ElementId::from("a")));
    assert_eq!(redactor.detector().calls(), 1);
}

#[test]
fn test_not_ready_detector_is_never_called() {
    let redactor = Redactor::new(MockDetector::not_ready());
    let outcome = redactor
        .process(&frame("a"), &PolicySettings::default())
        .unwrap();

    assert!(outcome.fallback);
    assert_eq!(redactor.detector().calls(), 0);
}

#[test]
fn test_nothing_detected_leaves_frame_untouched() {
    let redactor = Redactor::new(MockDetector::empty());
    let gradient = SyntheticFrameBuilder::horizontal_gradient(32, 8);
    let outcome = redactor
        .process(&gradient, &PolicySettings::default())
        .unwrap();

    assert!(!outcome.is_redacted());
    assert!(!outcome.fallback);
    assert_eq!(outcome.faces_detected, 0);
    assert_eq!(redactor.detector().calls(), 1);
}

#[test]
fn test_mismatched_detector_mask_falls_back() {
    let redactor = Redactor::new(MockDetector::returning(Detections {
        faces: vec![],
        mask: Some(MaskBuilder::with_coverage(2, 2, 1.0)),
    }));
    let outcome = redactor
        .process(&frame("a"), &PolicySettings::default())
        .unwrap();

    assert!(outcome.fallback);
}

#[test]
fn test_flagged_face_redacted() {
    let redactor = Redactor::new(MockDetector::returning(one_man()));
    let outcome = redactor.process(&frame("a"), &men_only()).unwrap();

    assert_eq!(outcome.faces_detected, 1);
    assert_eq!(outcome.faces_redacted, 1);
    assert!(!outcome.fallback);

    let report = outcome.report("2026-01-01T00:00:00Z".into(), None);
    assert!(report.redacted);
    assert_eq!(report.element.as_str(), "a");
}

#[test]
fn test_women_policy_leaves_man_alone() {
    let redactor = Redactor::new(MockDetector::returning(one_man()));
    let settings = PolicySettings {
        blur_women: true,
        ..PolicySettings::disabled()
    };

    let outcome = redactor.process(&frame("a"), &settings).unwrap();
    assert!(!outcome.is_redacted());
    assert!(!redactor.is_redacted(&ElementId::from("a")));
}

#[test]
fn test_low_confidence_label_only_blurred_by_face_flag() {
    let unsure = FaceBuilder::face([4.0, 4.0, 14.0, 14.0], Gender::Male, 0.3);
    let redactor = Redactor::new(MockDetector::returning(Detections {
        faces: vec![unsure],
        mask: None,
    }));

    let outcome = redactor.process(&frame("a"), &men_only()).unwrap();
    assert!(!outcome.is_redacted());

    let outcome = redactor
        .process(&frame("a"), &PolicySettings::default())
        .unwrap();
    assert_eq!(outcome.faces_redacted, 1);
}

#[test]
fn test_face_blur_stays_inside_padded_box() {
    let bright = SyntheticFrameBuilder::single_bright_pixel(32, 32, 8, 8);
    let redactor = Redactor::new(MockDetector::returning(one_man()));

    let outcome = redactor.process(&bright, &men_only()).unwrap();
    let blurred = outcome.frame.unwrap();

    let [r, _, _, a] = blurred.pixel(8, 8).unwrap();
    assert!(r < 255);
    assert_eq!(a, 255);
    assert_eq!(blurred.pixel(30, 30), Some([0, 0, 0, 255]));
}

#[test]
fn test_headless_body_redacted() {
    let redactor = Redactor::new(MockDetector::returning(Detections {
        faces: vec![],
        mask: Some(MaskBuilder::rect(32, 32, 0, 0, 16, 32)),
    }));
    let settings = PolicySettings {
        blur_bodies: true,
        ..PolicySettings::disabled()
    };

    let outcome = redactor.process(&frame("a"), &settings).unwrap();
    assert!(outcome.body_redacted);
    assert_eq!(outcome.faces_redacted, 0);
}

#[test]
fn test_settings_change_lifts_redaction() {
    let redactor = Redactor::new(MockDetector::returning(one_man()));
    let element = ElementId::from("a");

    redactor.process(&frame("a"), &PolicySettings::default()).unwrap();
    assert!(redactor.is_redacted(&element));

    let outcome = redactor
        .process(&frame("a"), &PolicySettings::disabled())
        .unwrap();
    assert!(!outcome.is_redacted());
    assert!(!redactor.is_redacted(&element));
    assert_eq!(redactor.detector().calls(), 2);
}

#[test]
fn test_batch_through_ports() {
    let source = MockFrameSource::new(vec![frame("a"), frame("b")]);
    let sink = MockFrameSink::new();
    let output = MockResultOutput::new();
    let progress = MockProgressSink::new();
    let redactor = Redactor::new(MockDetector::returning(one_man()));

    let mut processed = 0;
    for (index, item) in source.frames().enumerate() {
        let frame = item.unwrap();
        progress.on_event(ProgressEvent::Started {
            element: frame.element().to_string(),
            index,
            total: source.count_hint(),
        });
        let outcome = redactor.process(&frame, &men_only()).unwrap();
        let written = outcome
            .frame
            .as_ref()
            .map(|f| sink.write(f).unwrap())
            .unwrap_or_default();
        let report = outcome.report("2026-01-01T00:00:00Z".into(), written);
        output.write(&report).unwrap();
        progress.on_event(ProgressEvent::Completed { report });
        processed += 1;
    }
    output.flush().unwrap();
    progress.on_event(ProgressEvent::Finished {
        processed,
        skipped: 0,
    });

    assert_eq!(source.iteration_count(), 1);
    assert_eq!(redactor.detector().calls(), 2);
    assert_eq!(sink.frames().len(), 2);
    assert!(output.reports().iter().all(|r| r.redacted && r.faces_redacted == 1));
    assert_eq!(output.flush_count(), 1);
    assert_eq!(progress.completed_count(), 2);
    assert_eq!(progress.finished_counts(), Some((2, 0)));

    // Blurred output differs from the source only around the face.
    let written = sink.frames();
    let blurred = &written[0];
    assert_ne!(blurred.data(), frame("a").data());
    assert_eq!(blurred.pixel(31, 31), frame("a").pixel(31, 31));
}
