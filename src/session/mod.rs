//! Everything one sketching session owns, behind a single `reset()`.

pub mod annotation;
pub mod symbols;

use crate::draw::model::{Color, Point, Position};
use crate::draw::surface::DrawingSurface;
use crate::recognize::client::RecognitionService;
use crate::recognize::error::{RecognitionError, SubmitError};
use crate::recognize::protocol::{RecognitionRequest, ResultRecord};
use crate::settings::Settings;
use annotation::{Annotation, AnnotationList};
use symbols::SymbolTable;

/// Where annotations land before any sketch has been recognized.
pub const DEFAULT_POSITION: Position = Position::new(10.0, 200.0);

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStatus {
    Idle,
    Busy,
    Succeeded { annotations: usize },
    Failed(String),
}

/// A captured sketch waiting to be sent. `generation` ties the eventual
/// outcome back to the session state it was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub generation: u64,
    pub request: RecognitionRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSubmission {
    pub generation: u64,
    pub outcome: Result<Vec<ResultRecord>, RecognitionError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Applied {
        annotations: usize,
        next_position: Position,
    },
    Failed(RecognitionError),
    /// Arrived after a reset (or with nothing pending) and was discarded.
    Stale,
}

#[derive(Debug, Clone)]
pub struct Session {
    surface: DrawingSurface,
    symbols: SymbolTable,
    annotations: AnnotationList,
    next_position: Position,
    status: SubmitStatus,
    generation: u64,
    clear_after_result: bool,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            surface: DrawingSurface::new(
                settings.canvas_width,
                settings.canvas_height,
                settings.stroke_style(),
            ),
            symbols: SymbolTable::default(),
            annotations: AnnotationList::with_capacity(settings.max_annotations),
            next_position: DEFAULT_POSITION,
            status: SubmitStatus::Idle,
            generation: 0,
            clear_after_result: settings.clear_after_result,
        }
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.surface
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.annotations.as_slice()
    }

    pub fn next_position(&self) -> Position {
        self.next_position
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status, SubmitStatus::Busy)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn select_color(&mut self, color: Color) {
        self.surface.set_color(color);
    }

    pub fn begin_stroke(&mut self, point: Point) {
        self.surface.begin_stroke(point);
    }

    pub fn extend_stroke(&mut self, point: Point) {
        self.surface.extend_stroke(point);
    }

    pub fn end_stroke(&mut self) {
        self.surface.end_stroke();
    }

    /// Drop an annotation at `position`. The annotation stays where it was
    /// dropped and the drop point also becomes the default placement for the
    /// next result.
    pub fn drag_annotation(&mut self, index: usize, position: Position) -> bool {
        let Some(annotation) = self.annotations.get_mut(index) else {
            return false;
        };
        annotation.position = position;
        self.next_position = position;
        true
    }

    /// Captures the sketch and marks the session busy. Rejected while another
    /// submission is pending.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitError> {
        if self.is_busy() {
            tracing::debug!("submit ignored; request already in flight");
            return Err(SubmitError::Busy);
        }
        let image = self
            .surface
            .capture_image()
            .map_err(|e| SubmitError::Capture(format!("{e:#}")))?;
        self.status = SubmitStatus::Busy;
        tracing::info!(
            generation = self.generation,
            vars = self.symbols.len(),
            "submitting sketch"
        );
        Ok(PendingSubmission {
            generation: self.generation,
            request: RecognitionRequest {
                image,
                dict_of_vars: self.symbols.clone(),
            },
        })
    }

    pub fn complete_submit(&mut self, completed: CompletedSubmission) -> SubmitOutcome {
        if completed.generation != self.generation || !self.is_busy() {
            tracing::debug!(
                generation = completed.generation,
                current = self.generation,
                "discarding stale recognition result"
            );
            return SubmitOutcome::Stale;
        }

        let records = match completed.outcome {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!("recognition failed: {err}");
                self.status = SubmitStatus::Failed(err.to_string());
                return SubmitOutcome::Failed(err);
            }
        };

        let produced = self.apply_records(&records);
        self.status = SubmitStatus::Succeeded {
            annotations: produced,
        };

        let bounds = self.surface.content_bounds();
        if bounds.is_empty() {
            tracing::debug!("no drawn pixels; placing at degenerate bounds centre");
        }
        self.next_position = bounds.center();

        if self.clear_after_result && produced > 0 {
            self.surface.clear();
        }

        tracing::info!(
            records = records.len(),
            annotations = produced,
            x = self.next_position.x,
            y = self.next_position.y,
            "recognition applied"
        );
        SubmitOutcome::Applied {
            annotations: produced,
            next_position: self.next_position,
        }
    }

    /// Runs a whole submission on the calling thread.
    pub fn submit(
        &mut self,
        service: &dyn RecognitionService,
    ) -> Result<SubmitOutcome, SubmitError> {
        let pending = self.begin_submit()?;
        let outcome = service.recognize(&pending.request);
        Ok(self.complete_submit(CompletedSubmission {
            generation: pending.generation,
            outcome,
        }))
    }

    fn apply_records(&mut self, records: &[ResultRecord]) -> usize {
        let mut produced = 0;
        for record in records {
            if record.error {
                tracing::debug!(expr = %record.expression, "skipping record flagged as error");
                continue;
            }
            self.annotations
                .push(Annotation::new(record.annotation_text(), self.next_position));
            produced += 1;

            if record.is_assignment {
                match record.assignment_target() {
                    Some(name) => self.symbols.assign(name, record.result.clone()),
                    None => tracing::warn!(
                        expr = %record.expression,
                        "assignment without a variable name"
                    ),
                }
            }
        }
        produced
    }

    /// Clears the sketch, annotations and variables and restores the default
    /// placement. Any submission still in flight is abandoned.
    pub fn reset(&mut self) {
        self.surface.end_stroke();
        self.surface.clear();
        self.annotations.clear();
        self.symbols.clear();
        self.next_position = DEFAULT_POSITION;
        self.status = SubmitStatus::Idle;
        self.generation += 1;
        tracing::info!(generation = self.generation, "session reset");
    }
}
