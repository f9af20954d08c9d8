//! Filter-graph compiler
//!
//! Turns an ordered clip list plus [`TransformOptions`] into the engine's
//! argument vector. The compiler is pure: no I/O, and the same request
//! always yields the same arguments.

use std::path::Path;

use crate::domain::errors::DomainError;
use crate::domain::graph::{FilterGraph, FilterStage, PadAllocator, PadRef, StageKind, StreamKind};
use crate::domain::model::{validate_inputs, MergeCommand, MergeRequest, TransformOptions};

/// Bounds accepted by a single `atempo` filter on every engine version we target
const ATEMPO_MIN: f64 = 0.5;
const ATEMPO_MAX: f64 = 2.0;

/// Container and compatibility flags emitted ahead of the filter graph
const CONTAINER_FLAGS: [&str; 4] = ["-strict", "-2", "-movflags", "faststart"];

/// Compile a merge request against a destination path
pub fn compile_request(request: &MergeRequest, output_path: &Path) -> Result<MergeCommand, DomainError> {
    compile(&request.inputs, &request.options, output_path)
}

/// Build the engine argument vector for merging `inputs` into `output_path`
pub fn compile(
    inputs: &[String],
    options: &TransformOptions,
    output_path: &Path,
) -> Result<MergeCommand, DomainError> {
    validate_inputs(inputs)?;
    options.validate()?;

    let (graph, video, audio) = build_graph(inputs.len(), options);

    graph
        .validate(inputs.len(), &[video.clone(), audio.clone()])
        .map_err(|e| DomainError::InternalError(format!("Compiled filter graph is malformed: {}", e)))?;

    let mut args = Vec::with_capacity(inputs.len() * 2 + 12);
    for input in inputs {
        args.push("-i".to_string());
        args.push(input.clone());
    }
    args.extend(CONTAINER_FLAGS.iter().map(|flag| flag.to_string()));
    args.push("-filter_complex".to_string());
    args.push(graph.serialize());
    args.push("-map".to_string());
    args.push(video.label());
    args.push("-map".to_string());
    args.push(audio.label());
    args.push(output_path.to_string_lossy().to_string());

    Ok(MergeCommand {
        args,
        output_path: output_path.to_path_buf(),
        graph,
    })
}

/// Thread the video and audio cursors through every enabled stage.
///
/// Returns the graph plus the final video and audio pads.
fn build_graph(input_count: usize, options: &TransformOptions) -> (FilterGraph, PadRef, PadRef) {
    let mut graph = FilterGraph::new();
    let mut pads = PadAllocator::new();

    let concat_inputs = (0..input_count)
        .flat_map(|index| {
            [
                PadRef::input(index, StreamKind::Video),
                PadRef::input(index, StreamKind::Audio),
            ]
        })
        .collect();
    let mut video = pads.fresh(StreamKind::Video);
    let mut audio = pads.fresh(StreamKind::Audio);
    graph.push(FilterStage::new(
        StageKind::Concat,
        concat_inputs,
        format!("concat=n={}:v=1:a=1:unsafe=1", input_count),
        vec![video.clone(), audio.clone()],
    ));

    if options.changes_speed() {
        let factor = options.speed_factor;

        let next = pads.fresh(StreamKind::Video);
        graph.push(FilterStage::new(
            StageKind::TimestampScale,
            vec![video],
            format!("setpts={}*PTS", format_factor(factor)),
            vec![next.clone()],
        ));
        video = next;

        let next = pads.fresh(StreamKind::Audio);
        graph.push(FilterStage::new(
            StageKind::Tempo,
            vec![audio],
            tempo_filter(1.0 / factor),
            vec![next.clone()],
        ));
        audio = next;
    }

    if let Some(resolution) = options.target_resolution {
        let next = pads.fresh(StreamKind::Video);
        graph.push(FilterStage::new(
            StageKind::Scale,
            vec![video],
            format!("scale={}:{}", resolution.width, resolution.height),
            vec![next.clone()],
        ));
        video = next;
    }

    if let Some(volume) = options.volume_factor {
        let next = pads.fresh(StreamKind::Audio);
        graph.push(FilterStage::new(
            StageKind::Gain,
            vec![audio],
            format!("volume={}:precision=fixed", format_factor(volume)),
            vec![next.clone()],
        ));
        audio = next;
    }

    (graph, video, audio)
}

/// Chain of `atempo` filters whose product is `factor`, each within engine bounds
pub fn tempo_filter(factor: f64) -> String {
    tempo_chain(factor)
        .into_iter()
        .map(|step| format!("atempo={}", format_factor(step)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a tempo factor into steps inside `[ATEMPO_MIN, ATEMPO_MAX]`
pub fn tempo_chain(factor: f64) -> Vec<f64> {
    let mut steps = Vec::new();
    let mut remaining = factor;

    while remaining > ATEMPO_MAX {
        steps.push(ATEMPO_MAX);
        remaining /= ATEMPO_MAX;
    }
    while remaining < ATEMPO_MIN {
        steps.push(ATEMPO_MIN);
        remaining /= ATEMPO_MIN;
    }
    steps.push(remaining);
    steps
}

/// Six-decimal rendering with trailing zeros removed (`1.5`, `0.666667`, `3`).
///
/// Non-zero values too small for six decimals use the shortest exact form
/// instead, so they never collapse to `0`.
pub fn format_factor(value: f64) -> String {
    let rendered = format!("{:.6}", value);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" || trimmed == "-0" {
        if value == 0.0 {
            "0".to_string()
        } else {
            format!("{}", value)
        }
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests;
