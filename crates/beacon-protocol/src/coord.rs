use serde::{Deserialize, Serialize};

/// Absolute cell on the square simulation grid. `y` grows northwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const ORIGIN: GridPos = GridPos { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_squared(self, other: GridPos) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Largest per-axis distance (king moves).
    #[inline]
    pub fn chebyshev(self, other: GridPos) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    #[inline]
    pub fn within_radius(self, other: GridPos, radius: u32) -> bool {
        let r = i64::from(radius);
        self.distance_squared(other) <= r * r
    }

    pub fn offset_to(self, other: GridPos) -> Offset {
        Offset {
            dx: other.x - self.x,
            dy: other.y - self.y,
        }
    }
}

impl std::ops::Add<Offset> for GridPos {
    type Output = GridPos;

    fn add(self, offset: Offset) -> GridPos {
        GridPos {
            x: self.x + offset.dx,
            y: self.y + offset.dy,
        }
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Small relative displacement between two cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    #[inline]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Residue of `value` in `[0, window)`.
#[inline]
pub fn residue(value: i32, window: u32) -> u32 {
    (i64::from(value).rem_euclid(i64::from(window))) as u32
}

/// Inverse of [`residue`] given a nearby reference value.
///
/// Picks the delta from `reference` in `[-window/2, window/2)` that matches the
/// residue. Exact only when the true value lies in that range around
/// `reference`.
pub fn unwrap_residue(residue: u32, window: u32, reference: i32) -> i32 {
    let window = i64::from(window);
    let half = window / 2;
    let base = i64::from(reference).rem_euclid(window);
    let mut delta = (i64::from(residue) - base).rem_euclid(window);
    if delta >= half {
        delta -= window;
    }
    (i64::from(reference) + delta) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residue_handles_negative_coordinates() {
        assert_eq!(residue(-1, 128), 127);
        assert_eq!(residue(130, 128), 2);
        assert_eq!(residue(0, 128), 0);
    }

    #[test]
    fn unwrap_picks_nearest_representative() {
        // 126 is 4 cells west of 130 across the window boundary.
        assert_eq!(unwrap_residue(residue(126, 128), 128, 130), 126);
        assert_eq!(unwrap_residue(residue(190, 128), 128, 130), 190);
        assert_eq!(unwrap_residue(residue(-40, 128), 128, 10), -40);
    }

    #[test]
    fn unwrap_is_exact_across_the_half_open_window() {
        let reference = 1000;
        for delta in -64..64 {
            let value = reference + delta;
            assert_eq!(unwrap_residue(residue(value, 128), 128, reference), value);
        }
        // One past the window aliases to the other side.
        let aliased = unwrap_residue(residue(reference + 64, 128), 128, reference);
        assert_eq!(aliased, reference - 64);
    }

    #[test]
    fn radius_uses_squared_euclidean_distance() {
        let a = GridPos::new(0, 0);
        assert!(a.within_radius(GridPos::new(3, 4), 5));
        assert!(!a.within_radius(GridPos::new(4, 4), 5));
        assert_eq!(a.chebyshev(GridPos::new(-4, 3)), 4);
        assert_eq!(a + a.offset_to(GridPos::new(7, -2)), GridPos::new(7, -2));
    }
}
