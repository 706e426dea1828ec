//! Per-quadrant exposure totals

use serde::{Deserialize, Serialize};

/// Sun-exposure bucket relative to the vehicle heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    FrontLeft,
    BackLeft,
    FrontRight,
    BackRight,
}

/// Accumulated minutes of direct sun per quadrant
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureTotals {
    pub front_left: f64,
    pub back_left: f64,
    pub front_right: f64,
    pub back_right: f64,
}

impl ExposureTotals {
    #[must_use]
    pub fn new(front_left: f64, back_left: f64, front_right: f64, back_right: f64) -> Self {
        Self {
            front_left,
            back_left,
            front_right,
            back_right,
        }
    }

    pub fn add(&mut self, quadrant: Quadrant, minutes: f64) {
        match quadrant {
            Quadrant::FrontLeft => self.front_left += minutes,
            Quadrant::BackLeft => self.back_left += minutes,
            Quadrant::FrontRight => self.front_right += minutes,
            Quadrant::BackRight => self.back_right += minutes,
        }
    }

    #[must_use]
    pub fn get(&self, quadrant: Quadrant) -> f64 {
        match quadrant {
            Quadrant::FrontLeft => self.front_left,
            Quadrant::BackLeft => self.back_left,
            Quadrant::FrontRight => self.front_right,
            Quadrant::BackRight => self.back_right,
        }
    }

    /// Sum over all four quadrants
    #[must_use]
    pub fn total(&self) -> f64 {
        self.front_left + self.back_left + self.front_right + self.back_right
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.total() == 0.0
    }
}
