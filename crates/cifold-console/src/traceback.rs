//! Plain-text rendering of captured failures.

use cifold_ports::TracebackOptions;
use cifold_schema::result::{ExcInfo, Frame};

/// One rendered slot of a traceback: a frame, or a run of frames cut out.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameSlot<'a> {
    Frame(&'a Frame),
    Hidden(usize),
}

/// Frames to show, after dropping internal frames (unless requested) and
/// cutting the middle out of stacks longer than `max_frames`.
///
/// A cut stack keeps its first `max_frames / 2` frames and fills the rest of
/// the budget from the end, where the failing call is.
pub fn select_frames<'a>(frames: &'a [Frame], options: &TracebackOptions) -> Vec<FrameSlot<'a>> {
    let kept: Vec<&Frame> = frames
        .iter()
        .filter(|frame| options.show_internal_calls || !frame.internal)
        .collect();

    let budget = options.max_frames;
    if kept.len() <= budget {
        return kept.into_iter().map(FrameSlot::Frame).collect();
    }

    let head = budget / 2;
    let tail = budget - head;
    let hidden = kept.len() - budget;

    let mut slots = Vec::with_capacity(budget + 1);
    slots.extend(kept[..head].iter().copied().map(FrameSlot::Frame));
    slots.push(FrameSlot::Hidden(hidden));
    slots.extend(kept[kept.len() - tail..].iter().copied().map(FrameSlot::Frame));
    slots
}

/// Traceback lines, last line being `Type: message`.
pub fn format_traceback(exc_info: &ExcInfo, options: &TracebackOptions) -> Vec<String> {
    let slots = select_frames(&exc_info.frames, options);
    let mut lines = Vec::new();

    if !slots.is_empty() {
        lines.push("Traceback (most recent call last):".to_string());
    }
    for slot in slots {
        match slot {
            FrameSlot::Frame(frame) => {
                lines.push(format!(
                    "  File \"{}\", line {}, in {}",
                    frame.filename, frame.lineno, frame.name
                ));
                if let Some(line) = frame
                    .line
                    .as_deref()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                {
                    lines.push(format!("    {line}"));
                }
                if options.show_locals {
                    for (name, value) in &frame.locals {
                        lines.push(format!("      {name} = {value}"));
                    }
                }
            }
            FrameSlot::Hidden(1) => lines.push("  ... 1 frame hidden ...".to_string()),
            FrameSlot::Hidden(n) => lines.push(format!("  ... {n} frames hidden ...")),
        }
    }

    if exc_info.message.is_empty() {
        lines.push(exc_info.type_name.clone());
    } else {
        lines.push(format!("{}: {}", exc_info.type_name, exc_info.message));
    }
    lines
}
