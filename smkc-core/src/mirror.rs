use log::debug;

use crate::map::{DataLine, Row, LINES_PER_ROW};
use crate::{MirrorError, Result};

/// Flips every grid row left to right.
///
/// Rows keep their vertical order; only the tiles inside each row are
/// repositioned. Every output line is `#` + 64 tile characters +
/// `terminator`.
pub fn mirror_rows(lines: &[DataLine<'_>], terminator: &str) -> Result<Vec<String>> {
    if lines.len() % LINES_PER_ROW != 0 {
        return Err(MirrorError::RowMisalignment { lines: lines.len() });
    }

    let mut out = Vec::with_capacity(lines.len());
    for (index, group) in lines.chunks(LINES_PER_ROW).enumerate() {
        let row = Row::from_lines(index, group)?.mirrored();
        out.extend(row.to_lines(terminator));
    }

    debug!("mirrored {} rows", lines.len() / LINES_PER_ROW);
    Ok(out)
}
