/// Fog of war: a boolean overlay the same size as the grid.
/// Cells only ever go from hidden to revealed.

#[derive(Clone, Debug)]
pub struct VisibilityOverlay {
    revealed: Vec<Vec<bool>>,
    width: usize,
    height: usize,
}

impl VisibilityOverlay {
    pub fn new(width: usize, height: usize) -> Self {
        VisibilityOverlay { revealed: vec![vec![false; width]; height], width, height }
    }

    /// Out-of-grid cells are never revealed.
    pub fn is_revealed(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.revealed[y][x]
    }

    /// Reveal the rectangle `center ± radius` on each axis, clipped to
    /// the grid. Idempotent.
    pub fn reveal(&mut self, cx: usize, cy: usize, radius_x: usize, radius_y: usize) {
        if self.width == 0 || self.height == 0 { return; }
        let min_x = cx.saturating_sub(radius_x);
        let max_x = (cx + radius_x).min(self.width - 1);
        let min_y = cy.saturating_sub(radius_y);
        let max_y = (cy + radius_y).min(self.height - 1);
        if min_x > max_x || min_y > max_y { return; }
        for row in &mut self.revealed[min_y..=max_y] {
            row[min_x..=max_x].fill(true);
        }
    }

    #[cfg(test)]
    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().flatten().filter(|r| **r).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_is_rectangular_and_clipped() {
        let mut fog = VisibilityOverlay::new(10, 6);
        fog.reveal(1, 1, 3, 1);
        // x 0..=4, y 0..=2
        assert_eq!(fog.revealed_count(), 5 * 3);
        assert!(fog.is_revealed(4, 2));
        assert!(fog.is_revealed(0, 0));
        assert!(!fog.is_revealed(5, 1));
        assert!(!fog.is_revealed(1, 3));
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut fog = VisibilityOverlay::new(8, 8);
        fog.reveal(4, 4, 1, 1);
        let once = fog.revealed_count();
        fog.reveal(4, 4, 1, 1);
        assert_eq!(fog.revealed_count(), once);
    }

    #[test]
    fn reveal_never_hides() {
        let mut fog = VisibilityOverlay::new(12, 3);
        fog.reveal(1, 1, 1, 0);
        fog.reveal(10, 1, 1, 0);
        for x in 0..=2 {
            assert!(fog.is_revealed(x, 1), "cell {x} was hidden again");
        }
        assert!(fog.is_revealed(11, 1));
    }

    #[test]
    fn out_of_grid_is_hidden() {
        let fog = VisibilityOverlay::new(2, 2);
        assert!(!fog.is_revealed(7, 0));
    }
}
