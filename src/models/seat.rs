//! Seat model emitted by the seat allocator

use serde::{Deserialize, Serialize};

/// Side of the vehicle relative to the direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Left,
    Right,
}

/// Position of a seat within its half-row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatPosition {
    Window,
    Middle,
    Aisle,
}

/// A single seat with its estimated sun exposure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    /// e.g. `L3A`, `R12C`
    pub seat_id: String,
    /// 1-based row number, front to back
    pub row: u32,
    pub side: Side,
    pub position: SeatPosition,
    /// Estimated minutes of direct sun, rounded to 2 decimals
    pub exposure_minutes: f64,
    /// Exposure relative to the most exposed seat, in [0, 1]
    pub exposure_ratio: f64,
}
