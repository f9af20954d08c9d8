//! Filter-graph intermediate representation
//!
//! Stages are kept as typed values with explicit input and output pads and
//! only turned into the engine's `-filter_complex` string at the very end.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Kind of elementary stream a pad carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    /// Stream specifier used in raw input references and pad names
    pub fn specifier(&self) -> &'static str {
        match self {
            StreamKind::Video => "v",
            StreamKind::Audio => "a",
        }
    }
}

/// Reference to a pad inside the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PadRef {
    /// Raw stream of an input file, e.g. `[0:v]`
    Input { index: usize, kind: StreamKind },
    /// Pad produced by a stage, e.g. `[v1]`
    Named(String),
}

impl PadRef {
    pub fn input(index: usize, kind: StreamKind) -> Self {
        PadRef::Input { index, kind }
    }

    pub fn named(name: impl Into<String>) -> Self {
        PadRef::Named(name.into())
    }

    /// Bracketed label as it appears in the graph and in `-map`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PadRef::Input { index, kind } => write!(f, "[{}:{}]", index, kind.specifier()),
            PadRef::Named(name) => write!(f, "[{}]", name),
        }
    }
}

/// Hands out pad names that are never reused within one graph
#[derive(Debug, Default)]
pub struct PadAllocator {
    issued: HashMap<StreamKind, usize>,
}

impl PadAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `v`, `v1`, `v2`, ... for video; `a`, `a1`, ... for audio
    pub fn fresh(&mut self, kind: StreamKind) -> PadRef {
        let counter = self.issued.entry(kind).or_insert(0);
        let name = if *counter == 0 {
            kind.specifier().to_string()
        } else {
            format!("{}{}", kind.specifier(), counter)
        };
        *counter += 1;
        PadRef::Named(name)
    }
}

/// What a stage does, kept alongside the rendered filter text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Concat,
    TimestampScale,
    Tempo,
    Scale,
    Gain,
}

/// One filter stage: consumed pads, filter expression, produced pads
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStage {
    pub kind: StageKind,
    pub inputs: Vec<PadRef>,
    pub filter: String,
    pub outputs: Vec<PadRef>,
}

impl FilterStage {
    pub fn new(
        kind: StageKind,
        inputs: Vec<PadRef>,
        filter: impl Into<String>,
        outputs: Vec<PadRef>,
    ) -> Self {
        Self {
            kind,
            inputs,
            filter: filter.into(),
            outputs,
        }
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pad in &self.inputs {
            write!(f, "{}", pad)?;
        }
        write!(f, "{}", self.filter)?;
        for pad in &self.outputs {
            write!(f, "{}", pad)?;
        }
        Ok(())
    }
}

/// Pad wiring problems found by [`FilterGraph::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    UndefinedPad { stage: usize, pad: String },
    PadConsumedTwice { stage: usize, pad: String },
    PadProducedTwice { stage: usize, pad: String },
    InputOutOfRange { stage: usize, index: usize },
    InputStageOutput { stage: usize, pad: String },
    DanglingPad { pad: String },
    UnmappedOutput { pad: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::UndefinedPad { stage, pad } => {
                write!(f, "stage {} consumes undefined pad {}", stage, pad)
            }
            GraphError::PadConsumedTwice { stage, pad } => {
                write!(f, "stage {} consumes pad {} which was already consumed", stage, pad)
            }
            GraphError::PadProducedTwice { stage, pad } => {
                write!(f, "stage {} produces pad {} which already exists", stage, pad)
            }
            GraphError::InputOutOfRange { stage, index } => {
                write!(f, "stage {} references input {} which does not exist", stage, index)
            }
            GraphError::InputStageOutput { stage, pad } => {
                write!(f, "stage {} declares raw input reference {} as an output", stage, pad)
            }
            GraphError::DanglingPad { pad } => {
                write!(f, "pad {} is produced but never consumed or mapped", pad)
            }
            GraphError::UnmappedOutput { pad } => {
                write!(f, "mapped pad {} is not produced by any stage", pad)
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Ordered list of filter stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    stages: Vec<FilterStage>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: FilterStage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Every named pad produced by any stage, in production order
    pub fn produced_pads(&self) -> Vec<&PadRef> {
        self.stages.iter().flat_map(|stage| stage.outputs.iter()).collect()
    }

    /// Wire string for `-filter_complex`
    pub fn serialize(&self) -> String {
        self.stages
            .iter()
            .map(|stage| stage.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Check single-pass pad wiring.
    ///
    /// Named pads must be produced before they are consumed, be produced and
    /// consumed at most once, and end up either consumed by a later stage or
    /// listed in `mapped`. Raw input references must point at an existing
    /// input.
    pub fn validate(&self, input_count: usize, mapped: &[PadRef]) -> Result<(), GraphError> {
        let mut available: HashSet<&PadRef> = HashSet::new();
        let mut produced: HashSet<&PadRef> = HashSet::new();

        for (stage_index, stage) in self.stages.iter().enumerate() {
            for pad in &stage.inputs {
                match pad {
                    PadRef::Input { index, .. } => {
                        if *index >= input_count {
                            return Err(GraphError::InputOutOfRange {
                                stage: stage_index,
                                index: *index,
                            });
                        }
                    }
                    PadRef::Named(_) => {
                        if !available.remove(pad) {
                            return Err(if produced.contains(pad) {
                                GraphError::PadConsumedTwice {
                                    stage: stage_index,
                                    pad: pad.label(),
                                }
                            } else {
                                GraphError::UndefinedPad {
                                    stage: stage_index,
                                    pad: pad.label(),
                                }
                            });
                        }
                    }
                }
            }

            for pad in &stage.outputs {
                if matches!(pad, PadRef::Input { .. }) {
                    return Err(GraphError::InputStageOutput {
                        stage: stage_index,
                        pad: pad.label(),
                    });
                }
                if !produced.insert(pad) {
                    return Err(GraphError::PadProducedTwice {
                        stage: stage_index,
                        pad: pad.label(),
                    });
                }
                available.insert(pad);
            }
        }

        for pad in mapped {
            if matches!(pad, PadRef::Named(_)) && !available.remove(pad) {
                return Err(GraphError::UnmappedOutput { pad: pad.label() });
            }
        }

        // Iteration order of the leftovers is unspecified; report the first in stage order.
        if let Some(pad) = self
            .produced_pads()
            .into_iter()
            .find(|pad| available.contains(pad))
        {
            return Err(GraphError::DanglingPad { pad: pad.label() });
        }

        Ok(())
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
