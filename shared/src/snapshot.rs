use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One immutable read of full simulation state at a tick. Fetched fresh from
/// `GET /api/state` every loop iteration, drawn once, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub map: MapGrid,
    /// Index 0 is team A's base, index 1 is team B's.
    pub bases: [Base; 2],
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl Snapshot {
    /// Checks the grid invariant before the renderer indexes into it.
    /// A violation is fatal for the frame, not for the session.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        self.map.validate()
    }
}

/// Row-major terrain grid of single-character codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapGrid {
    pub width: u32,
    pub height: u32,
    pub grid: Vec<Vec<char>>,
}

impl MapGrid {
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.width == 0 || self.height == 0 {
            return Err(SnapshotError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.grid.len() != self.height as usize {
            return Err(SnapshotError::RowCount {
                expected: self.height,
                found: self.grid.len(),
            });
        }
        for (row, cells) in self.grid.iter().enumerate() {
            if cells.len() != self.width as usize {
                return Err(SnapshotError::RowWidth {
                    row,
                    expected: self.width,
                    found: cells.len(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    pub x: i32,
    pub y: i32,
    /// May go negative when a killing blow overshoots; the status readout
    /// clamps for display, the wire value stays as sent.
    pub hp: i32,
}

/// A unit on the field. Coordinates are grid coordinates but not necessarily
/// cell-center aligned; units can sit partway between cells mid-move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub x: f64,
    pub y: f64,
    pub team: Team,
}

/// One of the two opposing sides.
///
/// Wire decoding is lossy on purpose: `"A"` is team A, anything else is
/// team B, so an unexpected team code degrades to a color choice instead of
/// failing the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Team {
    A,
    B,
}

impl<'de> Deserialize<'de> for Team {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        Ok(if code == "A" { Team::A } else { Team::B })
    }
}

/// Terrain kind behind a grid code. Unrecognized codes map to `Unknown`
/// rather than erroring; the renderer shows them as background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Open,
    Wall,
    Water,
    Unknown,
}

impl Terrain {
    pub fn from_code(code: char) -> Self {
        match code {
            '.' => Terrain::Open,
            '#' => Terrain::Wall,
            '~' => Terrain::Water,
            _ => Terrain::Unknown,
        }
    }
}

/// A snapshot whose declared dimensions disagree with its grid data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    EmptyGrid { width: u32, height: u32 },
    RowCount { expected: u32, found: usize },
    RowWidth { row: usize, expected: u32, found: usize },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::EmptyGrid { width, height } => {
                write!(f, "grid dimensions {width}x{height} must be positive")
            }
            SnapshotError::RowCount { expected, found } => {
                write!(f, "grid has {found} rows, expected {expected}")
            }
            SnapshotError::RowWidth {
                row,
                expected,
                found,
            } => {
                write!(f, "grid row {row} has {found} cells, expected {expected}")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}
