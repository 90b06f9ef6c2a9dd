use super::matcher::LineVerdict;
use std::collections::{BTreeSet, VecDeque};

/// Expand anchor lines into context windows and return the surviving lines.
///
/// `verdicts[i]` classifies `lines[i]`. Every anchor is emitted together with
/// up to `context_lines` neighbours on each side; overlapping windows are
/// merged so a physical line is emitted at most once, and excluded lines are
/// never pulled in as context. The result keeps input order.
pub fn assemble<'a>(
    lines: &[&'a str],
    verdicts: &[LineVerdict],
    context_lines: usize,
) -> Vec<&'a str> {
    debug_assert_eq!(lines.len(), verdicts.len());

    if context_lines == 0 {
        return lines
            .iter()
            .zip(verdicts)
            .filter(|(_, verdict)| **verdict == LineVerdict::Anchor)
            .map(|(line, _)| *line)
            .collect();
    }

    let emittable = |idx: usize| verdicts[idx] != LineVerdict::Excluded;
    let mut emitted: BTreeSet<usize> = BTreeSet::new();
    let mut pending: VecDeque<usize> = VecDeque::new();

    for (idx, verdict) in verdicts.iter().enumerate() {
        if *verdict != LineVerdict::Anchor {
            if pending.len() == context_lines {
                pending.pop_front();
            }
            pending.push_back(idx);
            continue;
        }

        for before in pending.drain(..) {
            if emittable(before) {
                emitted.insert(before);
            }
        }

        emitted.insert(idx);

        let last = idx.saturating_add(context_lines).min(lines.len() - 1);
        for after in idx + 1..=last {
            if emittable(after) {
                emitted.insert(after);
            }
        }
    }

    emitted.into_iter().map(|idx| lines[idx]).collect()
}
