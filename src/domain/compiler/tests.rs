// Unit tests for the filter-graph compiler

use std::collections::HashSet;
use std::path::Path;

use super::*;
use crate::domain::model::Resolution;

fn inputs(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn arg_after<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
        .collect()
}

#[test]
fn test_scenario_default_options() {
    let command = compile(
        &inputs(&["a.mp4", "b.mp4"]),
        &TransformOptions::default(),
        Path::new("/tmp/out.mp4"),
    )
    .unwrap();

    let expected: Vec<String> = [
        "-i",
        "a.mp4",
        "-i",
        "b.mp4",
        "-strict",
        "-2",
        "-movflags",
        "faststart",
        "-filter_complex",
        "[0:v][0:a][1:v][1:a]concat=n=2:v=1:a=1:unsafe=1[v][a]",
        "-map",
        "[v]",
        "-map",
        "[a]",
        "/tmp/out.mp4",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    assert_eq!(command.args, expected);
    assert_eq!(command.graph.len(), 1);
    assert_eq!(command.output_path, Path::new("/tmp/out.mp4"));
}

#[test]
fn test_scenario_all_transforms() {
    let options = TransformOptions::default()
        .with_speed(1.5)
        .with_resolution(Resolution::new(640, 480).unwrap())
        .with_volume(3.0);
    let command = compile(
        &inputs(&["a.mp4", "b.mp4", "c.mp4"]),
        &options,
        Path::new("out.mp4"),
    )
    .unwrap();

    let kinds: Vec<StageKind> = command.graph.stages().iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StageKind::Concat,
            StageKind::TimestampScale,
            StageKind::Tempo,
            StageKind::Scale,
            StageKind::Gain,
        ]
    );

    assert_eq!(
        arg_after(&command.args, "-filter_complex"),
        vec![
            "[0:v][0:a][1:v][1:a][2:v][2:a]concat=n=3:v=1:a=1:unsafe=1[v][a];\
             [v]setpts=1.5*PTS[v1];\
             [a]atempo=0.666667[a1];\
             [v1]scale=640:480[v2];\
             [a1]volume=3:precision=fixed[a2]"
        ]
    );
    assert_eq!(arg_after(&command.args, "-map"), vec!["[v2]", "[a2]"]);
    assert_eq!(command.args.last().map(String::as_str), Some("out.mp4"));
}

#[test]
fn test_compile_is_deterministic() {
    let options = TransformOptions::default().with_speed(0.75).with_volume(1.25);
    let clips = inputs(&["x.mov", "y.mov", "x.mov"]);
    let first = compile(&clips, &options, Path::new("o.mp4")).unwrap();
    let second = compile(&clips, &options, Path::new("o.mp4")).unwrap();
    assert_eq!(first.args, second.args);
    assert_eq!(first, second);
}

#[test]
fn test_input_count_fidelity() {
    for count in 1..=6 {
        let clips: Vec<String> = (0..count).map(|i| format!("clip{}.mp4", i)).collect();
        let command = compile(&clips, &TransformOptions::default(), Path::new("o.mp4")).unwrap();

        assert_eq!(arg_after(&command.args, "-i"), clips.iter().map(String::as_str).collect::<Vec<_>>());
        let concat = &command.graph.stages()[0];
        assert!(concat.filter.starts_with(&format!("concat=n={}:", count)));
        assert_eq!(concat.inputs.len(), count * 2);
    }
}

#[test]
fn test_pad_names_are_unique() {
    let option_sets = [
        TransformOptions::default(),
        TransformOptions::default().with_speed(2.0),
        TransformOptions::default().with_volume(0.5),
        TransformOptions::default().with_resolution(Resolution::new(320, 240).unwrap()),
        TransformOptions::default()
            .with_speed(0.2)
            .with_resolution(Resolution::new(320, 240).unwrap())
            .with_volume(4.0),
    ];

    for options in &option_sets {
        let command = compile(&inputs(&["a.mp4", "b.mp4"]), options, Path::new("o.mp4")).unwrap();
        let produced = command.graph.produced_pads();
        let unique: HashSet<_> = produced.iter().collect();
        assert_eq!(unique.len(), produced.len(), "duplicate pad for {:?}", options);
    }
}

#[test]
fn test_cursor_untouched_without_transforms() {
    let command = compile(&inputs(&["a.mp4"]), &TransformOptions::default(), Path::new("o.mp4")).unwrap();
    let concat = &command.graph.stages()[0];
    assert_eq!(
        arg_after(&command.args, "-map"),
        vec![concat.outputs[0].label(), concat.outputs[1].label()]
    );
}

#[test]
fn test_audio_cursor_untouched_when_only_video_changes() {
    let options = TransformOptions::default().with_resolution(Resolution::new(1280, 720).unwrap());
    let command = compile(&inputs(&["a.mp4", "b.mp4"]), &options, Path::new("o.mp4")).unwrap();
    assert_eq!(arg_after(&command.args, "-map"), vec!["[v1]", "[a]"]);
}

#[test]
fn test_video_cursor_untouched_when_only_volume_changes() {
    let options = TransformOptions::default().with_volume(0.5);
    let command = compile(&inputs(&["a.mp4"]), &options, Path::new("o.mp4")).unwrap();
    assert_eq!(arg_after(&command.args, "-map"), vec!["[v]", "[a1]"]);
    assert!(command.graph.serialize().ends_with("[a]volume=0.5:precision=fixed[a1]"));
}

#[test]
fn test_validation_errors() {
    let err = compile(&[], &TransformOptions::default(), Path::new("o.mp4")).unwrap_err();
    assert!(matches!(err, DomainError::InvalidRequest(_)));

    let err = compile(
        &inputs(&["a.mp4"]),
        &TransformOptions::default().with_speed(0.0),
        Path::new("o.mp4"),
    )
    .unwrap_err();
    assert!(matches!(err, DomainError::InvalidRequest(_)));

    let err = compile(
        &inputs(&["a.mp4"]),
        &TransformOptions::default().with_volume(-2.0),
        Path::new("o.mp4"),
    )
    .unwrap_err();
    assert!(matches!(err, DomainError::InvalidRequest(_)));

    let options = TransformOptions {
        target_resolution: Some(Resolution { width: 0, height: 480 }),
        ..TransformOptions::default()
    };
    let err = compile(&inputs(&["a.mp4"]), &options, Path::new("o.mp4")).unwrap_err();
    assert!(matches!(err, DomainError::InvalidRequest(_)));
}

#[test]
fn test_tempo_chain_stays_within_bounds() {
    assert_eq!(tempo_chain(0.25), vec![0.5, 0.5]);
    assert_eq!(tempo_chain(4.0), vec![2.0, 2.0]);
    assert_eq!(tempo_chain(1.0), vec![1.0]);

    for factor in [0.01, 0.3, 0.75, 1.9, 3.0, 17.0] {
        let chain = tempo_chain(factor);
        assert!(chain.iter().all(|step| (ATEMPO_MIN..=ATEMPO_MAX).contains(step)));
        let product: f64 = chain.iter().product();
        assert!((product - factor).abs() < 1e-9, "chain for {} multiplies to {}", factor, product);
    }
}

#[test]
fn test_large_speed_change_is_a_single_tempo_stage() {
    let options = TransformOptions::default().with_speed(4.0);
    let command = compile(&inputs(&["a.mp4"]), &options, Path::new("o.mp4")).unwrap();
    let tempo = &command.graph.stages()[2];
    assert_eq!(tempo.kind, StageKind::Tempo);
    assert_eq!(tempo.filter, "atempo=0.5,atempo=0.5");
    assert_eq!(tempo.to_string(), "[a]atempo=0.5,atempo=0.5[a1]");
    assert_eq!(command.graph.stages()[1].filter, "setpts=4*PTS");
}

#[test]
fn test_format_factor() {
    assert_eq!(format_factor(1.5), "1.5");
    assert_eq!(format_factor(3.0), "3");
    assert_eq!(format_factor(2.0 / 3.0), "0.666667");
    assert_eq!(format_factor(0.1), "0.1");
    assert_eq!(format_factor(0.0), "0");
    assert_eq!(format_factor(1e-7), "0.0000001");
    assert_eq!(format_factor(-1e-7), "-0.0000001");
}

#[test]
fn test_tiny_factors_are_not_rendered_as_zero() {
    let options = TransformOptions::default().with_speed(1e-7).with_volume(1e-7);
    let command = compile(&inputs(&["a.mp4"]), &options, Path::new("o.mp4")).unwrap();

    let stages = command.graph.stages();
    assert_eq!(stages[1].filter, "setpts=0.0000001*PTS");
    assert_eq!(stages[3].filter, "volume=0.0000001:precision=fixed");
    assert!(!stages[2].filter.split(',').any(|step| step == "atempo=0"));
}

#[test]
fn test_uninvertible_speed_is_rejected_before_building() {
    let options = TransformOptions::default().with_speed(5e-324);
    let err = compile(&inputs(&["a.mp4"]), &options, Path::new("o.mp4")).unwrap_err();
    assert!(matches!(err, DomainError::InvalidRequest(_)));
}

#[test]
fn test_compile_request_matches_compile() {
    let request = MergeRequest::new(inputs(&["a.mp4", "b.mp4"]), TransformOptions::default()).unwrap();
    let via_request = compile_request(&request, Path::new("o.mp4")).unwrap();
    let direct = compile(&request.inputs, &request.options, Path::new("o.mp4")).unwrap();
    assert_eq!(via_request, direct);
}
