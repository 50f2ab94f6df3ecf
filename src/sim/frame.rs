/// Render boundary: a self-contained snapshot of what to draw,
/// and the sink that draws it.

use std::io;

use crate::domain::fog::VisibilityOverlay;
use crate::domain::grid::Grid;
use crate::sim::world::{Outcome, WorldState};

#[derive(Clone, Debug)]
pub struct Frame {
    pub grid: Grid,
    /// `None` when fog is off and every cell is visible.
    pub fog: Option<VisibilityOverlay>,
    pub status: String,
    pub outcome: Option<Outcome>,
}

impl Frame {
    pub fn capture(world: &WorldState) -> Self {
        Frame {
            grid: world.grid.clone(),
            fog: world.fog_enabled.then(|| world.fog.clone()),
            status: world.status_line(),
            outcome: world.outcome,
        }
    }

    pub fn is_visible(&self, x: usize, y: usize) -> bool {
        self.fog.as_ref().is_none_or(|fog| fog.is_revealed(x, y))
    }
}

/// Anything that can present a frame.
pub trait RenderSink {
    fn apply_frame(&mut self, frame: &Frame) -> io::Result<()>;
}
