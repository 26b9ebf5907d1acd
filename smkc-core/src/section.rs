use std::fmt;

use log::debug;
use serde::Serialize;

use crate::map::{DataLine, MAP_MARKER};

/// Why collection of map lines stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanEnd {
    MarkerMissing,
    /// 0-based index of the first line after the marker that is not map data.
    NonDataLine { index: usize },
    EndOfInput,
}

impl fmt::Display for ScanEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanEnd::MarkerMissing => write!(f, "no {MAP_MARKER} marker found"),
            ScanEnd::NonDataLine { index } => {
                write!(f, "map data stops at line {}", index + 1)
            }
            ScanEnd::EndOfInput => write!(f, "map data runs to end of file"),
        }
    }
}

/// The run of map lines following the first `#MAP` marker.
///
/// `start` indexes the line right after the marker, or is 0 when there
/// is no marker at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSection<'a> {
    pub start: usize,
    pub lines: Vec<DataLine<'a>>,
    pub end: ScanEnd,
}

impl MapSection<'_> {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn marker_found(&self) -> bool {
        self.end != ScanEnd::MarkerMissing
    }
}

#[derive(Clone, Copy)]
enum ScanState {
    Seeking,
    Collecting,
    Stopped(ScanEnd),
}

/// Finds the first marker line and collects the map lines after it.
///
/// Collection stops for good at the first line that fails
/// [`DataLine::parse`]; a later marker is never looked at.
pub fn locate_map_section<'a>(lines: &[&'a str]) -> MapSection<'a> {
    let mut state = ScanState::Seeking;
    let mut start = 0;
    let mut data = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        state = match state {
            ScanState::Seeking if line.trim() == MAP_MARKER => {
                start = index + 1;
                ScanState::Collecting
            }
            ScanState::Seeking => ScanState::Seeking,
            ScanState::Collecting => match DataLine::parse(line) {
                Some(data_line) => {
                    data.push(data_line);
                    ScanState::Collecting
                }
                None => ScanState::Stopped(ScanEnd::NonDataLine { index }),
            },
            ScanState::Stopped(_) => break,
        };
    }

    let end = match state {
        ScanState::Seeking => ScanEnd::MarkerMissing,
        ScanState::Collecting => ScanEnd::EndOfInput,
        ScanState::Stopped(end) => end,
    };

    debug!(
        "map section: start={} data_lines={} end={:?}",
        start,
        data.len(),
        end
    );

    MapSection {
        start,
        lines: data,
        end,
    }
}
