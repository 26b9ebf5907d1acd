//! Splitting a track file into lines and splicing the mirrored map back in.

/// Splits `text` into lines that keep their terminators, so joining them
/// again reproduces `text` byte for byte. `\n`, `\r\n` and a bare `\r` all
/// end a line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let end = match bytes[i] {
            b'\n' => i + 1,
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => i + 2,
            b'\r' => i + 1,
            _ => {
                i += 1;
                continue;
            }
        };
        lines.push(&text[start..end]);
        start = end;
        i = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Terminator to use for rebuilt map lines, taken from an original one.
pub fn line_terminator(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\r') {
        "\r"
    } else {
        "\n"
    }
}

/// Replaces `mirrored.len()` lines starting at `start` with `mirrored`.
///
/// The skip is purely by count; the replaced lines are not re-checked.
pub fn reassemble<'a>(original: &[&'a str], start: usize, mirrored: &'a [String]) -> Vec<&'a str> {
    let start = start.min(original.len());
    let resume = (start + mirrored.len()).min(original.len());

    let mut out = Vec::with_capacity(start + mirrored.len() + (original.len() - resume));
    out.extend_from_slice(&original[..start]);
    out.extend(mirrored.iter().map(String::as_str));
    out.extend_from_slice(&original[resume..]);
    out
}
