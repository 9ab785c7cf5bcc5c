//! GitLab CI collapsible section markers.
//!
//! The job log viewer folds everything between a `section_start` and the
//! `section_end` carrying the same id. Both markers erase their own line
//! (`ESC[0K` + carriage return) so they stay invisible in the rendered log.
//! The layout must match byte for byte or GitLab shows the raw text.

use cifold_ids::SectionId;

/// Erase-in-line escape sequence surrounding every marker.
pub const ERASE_LINE: &str = "\x1b[0K";

/// Opening marker for section `id`.
pub fn section_start(id: &SectionId, started_at: i64, collapsed: bool) -> String {
    format!("{ERASE_LINE}section_start:{started_at}:{id}[collapsed={collapsed}]\r{ERASE_LINE}")
}

/// Closing marker for section `id`.
pub fn section_end(id: &SectionId, ended_at: i64) -> String {
    format!("{ERASE_LINE}section_end:{ended_at}:{id}\r{ERASE_LINE}")
}

/// Whole seconds for a marker timestamp.
///
/// Missing, negative or non-finite values become 0; fractions are truncated.
pub fn unix_ts(ts: Option<f64>) -> i64 {
    match ts {
        Some(secs) if secs.is_finite() && secs >= 0.0 => secs.trunc() as i64,
        _ => 0,
    }
}

/// A marker recovered from log text, used to audit output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Marker {
    Start {
        id: String,
        ts: i64,
        collapsed: bool,
    },
    End {
        id: String,
        ts: i64,
    },
}

impl Marker {
    pub fn id(&self) -> &str {
        match self {
            Marker::Start { id, .. } | Marker::End { id, .. } => id,
        }
    }
}

/// Extract every marker from `log`, in order of appearance.
pub fn scan_markers(log: &str) -> Vec<Marker> {
    log.split(ERASE_LINE)
        .filter_map(|chunk| parse_marker(chunk.strip_suffix('\r')?))
        .collect()
}

fn parse_marker(body: &str) -> Option<Marker> {
    if let Some(rest) = body.strip_prefix("section_start:") {
        let (ts, rest) = rest.split_once(':')?;
        let (id, flag) = rest.strip_suffix(']')?.rsplit_once("[collapsed=")?;
        return Some(Marker::Start {
            id: id.to_string(),
            ts: ts.parse().ok()?,
            collapsed: flag.parse().ok()?,
        });
    }
    let rest = body.strip_prefix("section_end:")?;
    let (ts, id) = rest.split_once(':')?;
    Some(Marker::End {
        id: id.to_string(),
        ts: ts.parse().ok()?,
    })
}

/// Check that markers nest properly: every end closes the innermost open
/// start with the same id, nothing stays open, and no id is opened twice.
pub fn markers_balanced(markers: &[Marker]) -> bool {
    let mut open: Vec<&str> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for marker in markers {
        match marker {
            Marker::Start { id, .. } => {
                if !seen.insert(id.as_str()) {
                    return false;
                }
                open.push(id);
            }
            Marker::End { id, .. } => {
                if open.pop() != Some(id.as_str()) {
                    return false;
                }
            }
        }
    }
    open.is_empty()
}
