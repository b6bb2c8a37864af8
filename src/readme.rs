use crate::error::{ContribError, Result};

pub const DEFAULT_START_MARKER: &str = "<!--CONTRIB_SUMMARY_START-->";
pub const DEFAULT_END_MARKER: &str = "<!--CONTRIB_SUMMARY_END-->";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub start: String,
    pub end: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

/// Replace everything strictly between the marker lines with `block`.
///
/// Marker lines match on their trimmed content. Text outside the markers,
/// including the marker lines themselves, is kept byte for byte. Missing
/// markers, or an end marker before the start marker, leave the document
/// alone and return `MarkerNotFound`.
pub fn patch_document(document: &str, block: &str, markers: &Markers) -> Result<String> {
    let (_, interior_start) = find_marker_line(document, &markers.start, 0)
        .ok_or_else(|| ContribError::MarkerNotFound(markers.start.clone()))?;
    let (interior_end, _) = find_marker_line(document, &markers.end, interior_start)
        .ok_or_else(|| ContribError::MarkerNotFound(markers.end.clone()))?;

    let mut patched = String::with_capacity(document.len() + block.len());
    patched.push_str(&document[..interior_start]);
    patched.push_str(block);
    if !block.is_empty() && !block.ends_with('\n') {
        patched.push('\n');
    }
    patched.push_str(&document[interior_end..]);
    Ok(patched)
}

/// Byte offsets `(line_start, next_line_start)` of the first line at or after
/// `from` whose trimmed content is `marker`.
fn find_marker_line(document: &str, marker: &str, from: usize) -> Option<(usize, usize)> {
    let mut offset = from;
    for line in document[from..].split_inclusive('\n') {
        let next = offset + line.len();
        if line.trim() == marker {
            return Some((offset, next));
        }
        offset = next;
    }
    None
}
