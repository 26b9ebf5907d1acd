use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod map;
pub mod mirror;
pub mod reassemble;
pub mod section;

use map::{Row, LINES_PER_ROW, MAP_DATA_LINES};
use reassemble::{line_terminator, split_lines};

pub use section::{locate_map_section, MapSection, ScanEnd};

pub const INPUT_SUFFIX: &str = ".smkc";
pub const OUTPUT_TAG: &str = "-reversed";
pub const LAYOUT_SUFFIX: &str = ".layout.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorSettings {
    pub input_path: PathBuf,
    /// Overrides the `*-reversed.smkc` name derived from `input_path`.
    pub output_path: Option<PathBuf>,
    pub dry_run: bool,
    /// Also write the map layout dump next to the output.
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// 1-based line number of the first map line.
    pub section_start_line: usize,
    pub data_lines: usize,
    pub rows: usize,
    pub total_lines: usize,
    pub written: bool,
    pub layout_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("Unexpected MAP line count: {found}. Expected {expected} ({end})")]
    CountMismatch {
        found: usize,
        expected: usize,
        end: ScanEnd,
    },
    #[error("MAP section not aligned to 4-line rows ({lines} data lines)")]
    RowMisalignment { lines: usize },
    #[error("MAP row {row} has {tiles} tiles, expected 128")]
    RowWidth { row: usize, tiles: usize },
    #[error("configuration error: {0}")]
    Config(String),
}

impl MirrorError {
    /// True for errors caused by the layout of the map section itself.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            MirrorError::CountMismatch { .. }
                | MirrorError::RowMisalignment { .. }
                | MirrorError::RowWidth { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;

/// A mirrored track file, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredDocument {
    pub text: String,
    pub section_start: usize,
    pub data_lines: usize,
    pub total_lines: usize,
}

/// Fails unless the section holds exactly one full map.
pub fn check_section(section: &MapSection<'_>) -> Result<()> {
    if section.len() != MAP_DATA_LINES {
        return Err(MirrorError::CountMismatch {
            found: section.len(),
            expected: MAP_DATA_LINES,
            end: section.end,
        });
    }
    Ok(())
}

/// Locates, validates and mirrors the map in `text`. Every line outside
/// the map section comes back untouched.
pub fn mirror_document(text: &str) -> Result<MirroredDocument> {
    let lines = split_lines(text);
    let section = locate_map_section(&lines);
    check_section(&section)?;

    let terminator = line_terminator(lines[section.start]);
    let mirrored = mirror::mirror_rows(&section.lines, terminator)?;
    let output = reassemble::reassemble(&lines, section.start, &mirrored);

    debug!(
        "reassembled {} lines ({} in, {} map lines replaced at {})",
        output.len(),
        lines.len(),
        mirrored.len(),
        section.start
    );

    Ok(MirroredDocument {
        text: output.concat(),
        section_start: section.start,
        data_lines: mirrored.len(),
        total_lines: output.len(),
    })
}

/// `track.smkc` becomes `track-reversed.smkc`. Other names get the tag in
/// front of their extension, or at the end when there is none.
pub fn derive_output_path(input: &Path) -> PathBuf {
    let Some(name) = input.file_name().and_then(|n| n.to_str()) else {
        let mut raw = input.as_os_str().to_owned();
        raw.push(OUTPUT_TAG);
        return PathBuf::from(raw);
    };

    let renamed = match name.strip_suffix(INPUT_SUFFIX) {
        Some(stem) => format!("{stem}{OUTPUT_TAG}{INPUT_SUFFIX}"),
        None => match name.rfind('.') {
            Some(dot) if dot > 0 => format!("{}{}{}", &name[..dot], OUTPUT_TAG, &name[dot..]),
            _ => format!("{name}{OUTPUT_TAG}"),
        },
    };
    input.with_file_name(renamed)
}

/// Where `run` writes the debug layout dump for `output`.
pub fn layout_path(output: &Path) -> PathBuf {
    let mut raw = output.as_os_str().to_owned();
    raw.push(LAYOUT_SUFFIX);
    PathBuf::from(raw)
}

fn points_at_input(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

pub fn run(settings: MirrorSettings) -> Result<MirrorReport> {
    if !settings.input_path.is_file() {
        return Err(MirrorError::NotFound {
            path: settings.input_path,
        });
    }

    let text = fs::read_to_string(&settings.input_path)?;
    let document = mirror_document(&text)?;

    let output_path = settings
        .output_path
        .clone()
        .unwrap_or_else(|| derive_output_path(&settings.input_path));
    if points_at_input(&settings.input_path, &output_path) {
        return Err(MirrorError::Config(format!(
            "Output path would overwrite the input: {}",
            output_path.display()
        )));
    }

    let mut written_layout = None;
    if settings.dry_run {
        debug!("dry run, not writing {}", output_path.display());
    } else {
        fs::write(&output_path, &document.text)?;
        info!("wrote {}", output_path.display());

        if settings.debug {
            let lines = split_lines(&text);
            let layout = debug_dump_map_section(&locate_map_section(&lines));
            let path = layout_path(&output_path);
            fs::write(&path, layout)?;
            info!("wrote map layout to {}", path.display());
            written_layout = Some(path);
        }
    }

    Ok(MirrorReport {
        input_path: settings.input_path,
        output_path,
        section_start_line: document.section_start + 1,
        data_lines: document.data_lines,
        rows: document.data_lines / LINES_PER_ROW,
        total_lines: document.total_lines,
        written: !settings.dry_run,
        layout_path: written_layout,
    })
}

/// Human-readable layout of a located map section, one grid row per line.
pub fn debug_dump_map_section(section: &MapSection<'_>) -> String {
    let mut out = String::new();

    if section.marker_found() {
        out.push_str(&format!("{} marker: line {}\n", map::MAP_MARKER, section.start));
    } else {
        out.push_str(&format!("{} marker: not found\n", map::MAP_MARKER));
    }
    out.push_str(&format!(
        "data lines: {} (expected {})\n",
        section.len(),
        MAP_DATA_LINES
    ));
    out.push_str(&format!("scan end: {}\n", section.end));

    for (index, group) in section.lines.chunks(LINES_PER_ROW).enumerate() {
        match Row::from_lines(index, group) {
            Ok(row) => {
                let tiles: Vec<String> = row.tiles().iter().map(|t| t.to_string()).collect();
                out.push_str(&format!("row {:03}: {}\n", index, tiles.join(" ")));
            }
            Err(err) => out.push_str(&format!("row {:03}: {}\n", index, err)),
        }
    }

    out
}
