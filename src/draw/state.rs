use crate::draw::model::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeLifecycle {
    Idle,
    Drawing,
}

/// Stroke progress. Only the last point of the active stroke is retained;
/// everything already drawn lives in the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Drawing {
        last: Point,
    },
}

impl StrokeState {
    pub fn lifecycle(self) -> StrokeLifecycle {
        match self {
            Self::Idle => StrokeLifecycle::Idle,
            Self::Drawing { .. } => StrokeLifecycle::Drawing,
        }
    }

    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Drawing { .. })
    }
}
