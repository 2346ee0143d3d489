//! Seat Map Module
//!
//! Narrow-body cabin layout (A B C - D E F) and the window seats that face the sun.

use serde::Serialize;

use crate::solar::ScenicSide;

/// Rows in the default cabin
pub const DEFAULT_ROWS: u32 = 28;

const COLUMNS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// Cabin side relative to the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CabinSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seat {
    pub row: u32,
    pub column: char,
    pub side: CabinSide,
    pub window: bool,
}

impl Seat {
    /// Seat label such as "12A"
    pub fn id(&self) -> String {
        format!("{}{}", self.row, self.column)
    }

    fn faces(&self, side: ScenicSide) -> bool {
        match side {
            ScenicSide::Left => self.side == CabinSide::Left,
            ScenicSide::Right => self.side == CabinSide::Right,
            ScenicSide::None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatMap {
    pub rows: u32,
    pub seats: Vec<Seat>,
}

impl SeatMap {
    /// Single-aisle layout with `rows` rows of six seats; A and F are windows.
    pub fn narrow_body(rows: u32) -> Self {
        let seats = (1..=rows)
            .flat_map(|row| {
                COLUMNS.iter().map(move |&column| Seat {
                    row,
                    column,
                    side: if column < 'D' { CabinSide::Left } else { CabinSide::Right },
                    window: column == 'A' || column == 'F',
                })
            })
            .collect();
        Self { rows, seats }
    }

    /// Window seats on the scenic side, row by row. With no preferred side every
    /// window seat qualifies.
    pub fn golden_seats(&self, side: ScenicSide) -> Vec<&Seat> {
        self.seats.iter().filter(|s| s.window && s.faces(side)).collect()
    }

    pub fn golden_seat_ids(&self, side: ScenicSide) -> Vec<String> {
        self.golden_seats(side).into_iter().map(Seat::id).collect()
    }
}

impl Default for SeatMap {
    fn default() -> Self {
        Self::narrow_body(DEFAULT_ROWS)
    }
}

/// One-line seating advice for a scenic side.
pub fn recommendation(side: ScenicSide) -> &'static str {
    match side {
        ScenicSide::Left => "Prefer a left window (A) for sun views",
        ScenicSide::Right => "Prefer a right window (F) for sun views",
        ScenicSide::None => "Either side is fine at this time",
    }
}
