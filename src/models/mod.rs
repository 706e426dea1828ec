//! Data models for the Seatify service
//!
//! This module contains the core domain models organized by concern:
//! - Location: Coordinates and route polylines
//! - Exposure: Per-quadrant sun exposure totals
//! - Seat: Seat identity and per-seat exposure

pub mod exposure;
pub mod location;
pub mod seat;

// Re-export all public types for convenient access
pub use exposure::{ExposureTotals, Quadrant};
pub use location::{Coordinate, Polyline};
pub use seat::{Seat, SeatPosition, Side};
