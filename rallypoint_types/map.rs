use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_id(&self, world_size: i32) -> u32 {
        ((world_size - self.y) * (world_size * 2 + 1) + (world_size + self.x + 1)) as u32
    }

    /// Returns the distance between two points on the wrapping map.
    pub fn distance(&self, position: &Position, world_size: i32) -> f64 {
        let mut x_diff = (self.x - position.x).abs();
        let mut y_diff = (self.y - position.y).abs();

        if x_diff > world_size {
            x_diff = (2 * world_size + 1) - x_diff;
        }

        if y_diff > world_size {
            y_diff = (2 * world_size + 1) - y_diff;
        }

        (((x_diff * x_diff) + (y_diff * y_diff)) as f64).sqrt()
    }

    /// Travel time in milliseconds for a unit moving at `speed` tiles per hour.
    pub fn calculate_travel_time_millis(
        &self,
        position: &Position,
        speed: u8,
        world_size: i32,
        server_speed: u8,
    ) -> i64 {
        let distance = self.distance(position, world_size);
        let travel_time_millis = distance / speed as f64 * 3_600_000.0;

        (travel_time_millis / server_speed.max(1) as f64).round() as i64
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}|{})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_straight_line() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.distance(&b, 100), 5.0);
    }

    #[test]
    fn test_distance_wraps_around_the_map_edge() {
        let a = Position::new(-100, 0);
        let b = Position::new(100, 0);
        // 201 tiles wide map: the two edges are neighbours.
        assert_eq!(a.distance(&b, 100), 1.0);
    }

    #[test]
    fn test_travel_time_uses_speed_and_server_speed() {
        let a = Position::new(0, 0);
        let b = Position::new(10, 0);

        // 10 tiles at 6 tiles/hour = 10/6 hours = 6000 seconds
        assert_eq!(a.calculate_travel_time_millis(&b, 6, 100, 1), 6_000_000);
        assert_eq!(a.calculate_travel_time_millis(&b, 6, 100, 3), 2_000_000);
    }

    #[test]
    fn test_position_to_id() {
        assert_eq!(Position::new(-100, 100).to_id(100), 1);
    }
}
