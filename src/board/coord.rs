//! Grid coordinates and distance metrics.

use std::fmt;

/// A coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
}

impl Coord {
    /// Creates a new coordinate.
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Taxicab distance, used for attack and movement ranges.
    pub fn manhattan(self, other: Coord) -> u32 {
        u32::from(self.x.abs_diff(other.x)) + u32::from(self.y.abs_diff(other.y))
    }

    /// King-move distance, used for merge adjacency.
    pub fn chebyshev(self, other: Coord) -> u32 {
        u32::from(self.x.abs_diff(other.x).max(self.y.abs_diff(other.y)))
    }

    /// Cardinal neighbors (up, down, left, right) that fall inside a
    /// `width` x `height` grid.
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    pub fn cardinal(self, width: u16, height: u16) -> ([Coord; 4], usize) {
        let mut out = [Coord::new(0, 0); 4];
        let mut n = 0;
        if self.y > 0 {
            out[n] = Coord::new(self.x, self.y - 1);
            n += 1;
        }
        if self.y + 1 < height {
            out[n] = Coord::new(self.x, self.y + 1);
            n += 1;
        }
        if self.x > 0 {
            out[n] = Coord::new(self.x - 1, self.y);
            n += 1;
        }
        if self.x + 1 < width {
            out[n] = Coord::new(self.x + 1, self.y);
            n += 1;
        }
        (out, n)
    }

    /// Moore neighbors (all eight surrounding cells) inside the grid.
    pub fn moore(self, width: u16, height: u16) -> ([Coord; 8], usize) {
        let mut out = [Coord::new(0, 0); 8];
        let mut n = 0;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let x = i32::from(self.x) + dx;
                let y = i32::from(self.y) + dy;
                if x < 0 || y < 0 || x >= i32::from(width) || y >= i32::from(height) {
                    continue;
                }
                out[n] = Coord::new(x as u16, y as u16);
                n += 1;
            }
        }
        (out, n)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        let a = Coord::new(1, 1);
        let b = Coord::new(3, 2);
        assert_eq!(a.manhattan(b), 3);
        assert_eq!(a.chebyshev(b), 2);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn cardinal_center_and_corner() {
        let (_, n) = Coord::new(5, 5).cardinal(10, 10);
        assert_eq!(n, 4);

        let (adj, n) = Coord::new(0, 0).cardinal(10, 10);
        let adj = &adj[..n];
        assert_eq!(n, 2);
        assert!(adj.contains(&Coord::new(0, 1)));
        assert!(adj.contains(&Coord::new(1, 0)));
    }

    #[test]
    fn moore_counts() {
        assert_eq!(Coord::new(5, 5).moore(10, 10).1, 8);
        assert_eq!(Coord::new(0, 0).moore(10, 10).1, 3);
        assert_eq!(Coord::new(9, 5).moore(10, 10).1, 5);
        assert_eq!(Coord::new(0, 0).moore(1, 1).1, 0);
    }
}
