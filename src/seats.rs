//! Seat Allocator
//!
//! Spreads the four quadrant totals over a fixed 12-row, 5-seat layout.
//! Front rows lean on the front quadrants, rear rows on the back ones.

use crate::models::{ExposureTotals, Seat, SeatPosition, Side};

/// Rows in the default seat map.
pub const TOTAL_ROWS: u32 = 12;

/// (id prefix, id suffix, side, position, share of the side's sun)
const ROW_LAYOUT: [(char, char, Side, SeatPosition, f64); 5] = [
    ('L', 'A', Side::Left, SeatPosition::Window, 1.00),
    ('L', 'B', Side::Left, SeatPosition::Aisle, 0.25),
    ('R', 'C', Side::Right, SeatPosition::Window, 1.00),
    ('R', 'B', Side::Right, SeatPosition::Middle, 0.40),
    ('R', 'A', Side::Right, SeatPosition::Aisle, 0.15),
];

/// Round to `places` decimals, exact halves going to the even neighbour.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Per-seat exposure for `total_rows` rows, row-major, seats in layout order.
///
/// `exposure_ratio` is relative to the most exposed seat and is 0 for every
/// seat when nothing is exposed.
#[must_use]
pub fn build_seat_list(exposure: &ExposureTotals, total_rows: u32) -> Vec<Seat> {
    let rows = f64::from(total_rows);
    let mut seats = Vec::with_capacity(total_rows as usize * ROW_LAYOUT.len());

    for row in 1..=total_rows {
        let front_weight = (rows - f64::from(row)) / rows;
        let back_weight = f64::from(row) / rows;

        let left_base = front_weight * exposure.front_left + back_weight * exposure.back_left;
        let right_base = front_weight * exposure.front_right + back_weight * exposure.back_right;

        for (prefix, suffix, side, position, multiplier) in ROW_LAYOUT {
            let base = match side {
                Side::Left => left_base,
                Side::Right => right_base,
            };
            seats.push(Seat {
                seat_id: format!("{prefix}{row}{suffix}"),
                row,
                side,
                position,
                exposure_minutes: round_to(base * multiplier, 2),
                exposure_ratio: 0.0,
            });
        }
    }

    let max_exposure = seats
        .iter()
        .map(|seat| seat.exposure_minutes)
        .fold(0.0_f64, f64::max);

    if max_exposure > 0.0 {
        for seat in &mut seats {
            seat.exposure_ratio = round_to(seat.exposure_minutes / max_exposure, 3);
        }
    }

    seats
}
