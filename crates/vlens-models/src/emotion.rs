//! Dominant-emotion reduction across the faces of one frame.

use crate::sentinel::NO_FACE;

/// Most frequent label, ties broken by first appearance.
///
/// Returns `None` when `labels` is empty.
pub fn dominant_emotion<I, S>(labels: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // (label, count) in first-seen order
    let mut counts: Vec<(String, usize)> = Vec::new();
    for label in labels {
        let label = label.as_ref();
        match counts.iter_mut().find(|(seen, _)| seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label.to_string(), 1)),
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (label, count) in counts {
        let better = best
            .as_ref()
            .map_or(true, |(_, best_count)| count > *best_count);
        if better {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

/// Dominant emotion for display, or the "No face detected" sentinel.
pub fn emotion_label<S: AsRef<str>>(faces: &[S]) -> String {
    dominant_emotion(faces).unwrap_or_else(|| NO_FACE.to_string())
}
