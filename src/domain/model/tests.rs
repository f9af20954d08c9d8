// Unit tests for domain models

use super::*;

#[test]
fn test_resolution_parse() {
    let resolution = Resolution::parse("640x480").unwrap();
    assert_eq!(resolution, Resolution { width: 640, height: 480 });
    assert_eq!(Resolution::parse(" 1280:720 ").unwrap().to_string(), "1280x720");
}

#[test]
fn test_resolution_rejects_zero_and_garbage() {
    assert!(matches!(
        Resolution::parse("0x480"),
        Err(DomainError::InvalidRequest(_))
    ));
    assert!(matches!(
        Resolution::parse("640"),
        Err(DomainError::InvalidRequest(_))
    ));
    assert!(matches!(
        Resolution::parse("-640x480"),
        Err(DomainError::InvalidRequest(_))
    ));
}

#[test]
fn test_default_options_are_identity() {
    let options = TransformOptions::default();
    assert_eq!(options.speed_factor, 1.0);
    assert!(!options.changes_speed());
    assert!(options.target_resolution.is_none());
    assert!(options.volume_factor.is_none());
    assert!(options.validate().is_ok());
}

#[test]
fn test_options_reject_non_positive_factors() {
    for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let options = TransformOptions::default().with_speed(speed);
        assert!(
            matches!(options.validate(), Err(DomainError::InvalidRequest(_))),
            "speed {} should be rejected",
            speed
        );
    }

    let options = TransformOptions::default().with_volume(0.0);
    assert!(matches!(options.validate(), Err(DomainError::InvalidRequest(_))));

    let options = TransformOptions {
        target_resolution: Some(Resolution { width: 640, height: 0 }),
        ..TransformOptions::default()
    };
    assert!(matches!(options.validate(), Err(DomainError::InvalidRequest(_))));
}

#[test]
fn test_options_reject_speed_without_finite_reciprocal() {
    let options = TransformOptions::default().with_speed(5e-324);
    assert!(matches!(options.validate(), Err(DomainError::InvalidRequest(_))));

    let err = MergeRequest::from_json(r#"{"inputs": ["a.mp4"], "options": {"speedFactor": 5e-324}}"#)
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidRequest(_)));

    // Tiny but invertible factors stay valid.
    assert!(TransformOptions::default().with_speed(1e-7).validate().is_ok());
}

#[test]
fn test_request_requires_inputs() {
    let result = MergeRequest::new(vec![], TransformOptions::default());
    assert!(matches!(result, Err(DomainError::InvalidRequest(_))));

    let result = MergeRequest::new(
        vec!["a.mp4".to_string(), "  ".to_string()],
        TransformOptions::default(),
    );
    assert!(matches!(result, Err(DomainError::InvalidRequest(msg)) if msg.contains("1")));
}

#[test]
fn test_request_allows_duplicate_inputs() {
    let request = MergeRequest::new(
        vec!["a.mp4".to_string(), "a.mp4".to_string()],
        TransformOptions::default(),
    )
    .unwrap();
    assert_eq!(request.input_count(), 2);
}

#[test]
fn test_request_from_bridge_json() {
    let json = r#"{
        "inputs": ["a.mp4", "b.mp4"],
        "options": {
            "speedFactor": 1.5,
            "targetResolution": { "width": 640, "height": 480 },
            "volumeFactor": 3.0
        }
    }"#;
    let request = MergeRequest::from_json(json).unwrap();
    assert_eq!(request.inputs, vec!["a.mp4", "b.mp4"]);
    assert_eq!(request.options.speed_factor, 1.5);
    assert_eq!(
        request.options.target_resolution,
        Some(Resolution { width: 640, height: 480 })
    );
    assert_eq!(request.options.volume_factor, Some(3.0));
}

#[test]
fn test_request_from_json_defaults_options() {
    let request = MergeRequest::from_json(r#"{ "inputs": ["a.mp4"] }"#).unwrap();
    assert_eq!(request.options, TransformOptions::default());

    let err = MergeRequest::from_json(r#"{ "inputs": [] }"#).unwrap_err();
    assert!(matches!(err, DomainError::InvalidRequest(_)));

    let err = MergeRequest::from_json("not json").unwrap_err();
    assert!(matches!(err, DomainError::InvalidRequest(msg) if msg.contains("Malformed")));
}

#[test]
fn test_merge_output_source_uri() {
    let output = MergeOutput::new("/tmp/mergex/abc-merged.mp4");
    assert_eq!(output.source_uri(), "file:///tmp/mergex/abc-merged.mp4");
}
