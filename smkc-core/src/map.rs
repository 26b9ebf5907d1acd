//! Fixed layout of an SMKC `#MAP` section and the typed views used to
//! walk it.
//!
//! A track map is a 128x128 grid of tiles. Each tile is an opaque
//! two-character code; a map line carries 32 of them behind a `#`
//! sentinel, and four consecutive lines make up one grid row.

use std::fmt;

use crate::{MirrorError, Result};

pub const MAP_MARKER: &str = "#MAP";
pub const SENTINEL: char = '#';

pub const TILE_CHARS: usize = 2;
pub const PAYLOAD_CHARS: usize = 64;
pub const DATA_LINE_CHARS: usize = 1 + PAYLOAD_CHARS;
pub const TILES_PER_LINE: usize = PAYLOAD_CHARS / TILE_CHARS;
pub const LINES_PER_ROW: usize = 4;
pub const TILES_PER_ROW: usize = TILES_PER_LINE * LINES_PER_ROW;
pub const ROWS_PER_MAP: usize = 128;
pub const MAP_DATA_LINES: usize = ROWS_PER_MAP * LINES_PER_ROW;

/// One tile code. Never decoded, only moved around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile<'a>(&'a str);

impl<'a> Tile<'a> {
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

impl fmt::Display for Tile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A map line with its sentinel stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLine<'a> {
    payload: &'a str,
}

impl<'a> DataLine<'a> {
    /// Accepts a raw line (terminator included) when it starts with the
    /// sentinel and its trimmed form is exactly `DATA_LINE_CHARS` long.
    pub fn parse(line: &'a str) -> Option<Self> {
        if !line.starts_with(SENTINEL) {
            return None;
        }
        let trimmed = line.trim();
        if trimmed.chars().count() != DATA_LINE_CHARS {
            return None;
        }
        Some(Self {
            payload: &trimmed[SENTINEL.len_utf8()..],
        })
    }

    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// Splits the payload into tiles, left to right. Splits on character
    /// boundaries so a stray non-ASCII code cannot tear a tile in half.
    pub fn tiles(&self) -> Vec<Tile<'a>> {
        let payload = self.payload;
        let starts: Vec<usize> = payload
            .char_indices()
            .map(|(offset, _)| offset)
            .step_by(TILE_CHARS)
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let end = starts.get(n + 1).copied().unwrap_or(payload.len());
                Tile(&payload[start..end])
            })
            .collect()
    }
}

/// One full grid row, flattened from `LINES_PER_ROW` data lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    tiles: Vec<Tile<'a>>,
}

impl<'a> Row<'a> {
    /// `index` is the row's position in the map and only feeds the error.
    pub fn from_lines(index: usize, lines: &[DataLine<'a>]) -> Result<Self> {
        let tiles: Vec<Tile<'a>> = lines.iter().flat_map(|line| line.tiles()).collect();
        if tiles.len() != TILES_PER_ROW {
            return Err(MirrorError::RowWidth {
                row: index,
                tiles: tiles.len(),
            });
        }
        Ok(Self { tiles })
    }

    pub fn tiles(&self) -> &[Tile<'a>] {
        &self.tiles
    }

    /// Horizontal flip: tile `i` moves to `TILES_PER_ROW - 1 - i`.
    pub fn mirrored(mut self) -> Self {
        self.tiles.reverse();
        self
    }

    /// Re-chunks the row into sentinel-prefixed map lines.
    pub fn to_lines(&self, terminator: &str) -> Vec<String> {
        self.tiles
            .chunks(TILES_PER_LINE)
            .map(|chunk| {
                let mut line =
                    String::with_capacity(DATA_LINE_CHARS + terminator.len());
                line.push(SENTINEL);
                for tile in chunk {
                    line.push_str(tile.as_str());
                }
                line.push_str(terminator);
                line
            })
            .collect()
    }
}
