use serde::Serialize;

/// A maximal run of one label; `start` and `end` are inclusive positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment<L> {
    pub start: usize,
    pub end: usize,
    pub label: L,
}

/// Collapse a per-position label path into contiguous runs, in path order.
pub fn summarize<L: PartialEq + Clone>(path: &[L]) -> Vec<Segment<L>> {
    let mut segments: Vec<Segment<L>> = Vec::new();
    for (i, label) in path.iter().enumerate() {
        match segments.last_mut() {
            Some(seg) if seg.label == *label => seg.end = i,
            _ => segments.push(Segment {
                start: i,
                end: i,
                label: label.clone(),
            }),
        }
    }
    segments
}
