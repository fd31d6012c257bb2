//! Writing changed rows back into a file buffer.

use core_host::{BufferView, EditTransaction, Extent, RegionStyle};
use core_results::LineMap;
use tracing::{debug, trace, warn};

/// Replace each changed line of `view` whose current text differs from the
/// new text, all inside one edit transaction.
///
/// Lines are visited in ascending order and each extent is resolved after the
/// previous replacement, so the returned extents cover the new text as it
/// sits in the buffer afterwards. When at least one line changed the extents
/// are annotated under `key`; otherwise no annotation is made.
pub fn apply_changes<V: BufferView + ?Sized>(
    view: &mut V,
    changes: &LineMap,
    key: &str,
    style: &RegionStyle,
) -> Vec<Extent> {
    let mut marked = Vec::new();
    {
        let mut tx = EditTransaction::begin(view);
        for (&line, new_text) in changes {
            let Some(start) = tx.text_point(line) else {
                warn!(target: "actions.apply", view = %tx.id(), line, "line_past_end");
                continue;
            };
            let extent = tx.line_extent(start);
            if tx.substr(extent) == *new_text {
                trace!(target: "actions.apply", line, "line_unchanged");
                continue;
            }
            tx.replace(extent, new_text);
            tx.scroll_to(start);
            marked.push(Extent::new(extent.start, extent.start + new_text.len()));
        }
    }
    if !marked.is_empty() {
        view.add_regions(key, &marked, style);
    }
    debug!(
        target: "actions.apply",
        view = %view.id(),
        requested = changes.len(),
        replaced = marked.len(),
        "changes_applied"
    );
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_host::ViewId;
    use core_host::memory::TextView;
    use pretty_assertions::assert_eq;

    const KEY: &str = "FindResultsReplaceChanges";

    fn view(text: &str) -> TextView {
        TextView::scratch(ViewId(1), "b.txt", text)
    }

    #[test]
    fn replaces_only_differing_lines() {
        let mut v = view("zero\none\nfoo bar\nthree\n");
        let changes = LineMap::from([
            (1, "one".to_string()),
            (2, "foo CHANGED".to_string()),
        ]);
        let marked = apply_changes(&mut v, &changes, KEY, &RegionStyle::bookmark());
        assert_eq!(v.text(), "zero\none\nfoo CHANGED\nthree\n");
        assert_eq!(marked, vec![Extent::new(9, 20)]);
        assert_eq!(v.regions(KEY), Some(&marked[..]));
        assert_eq!(v.scroll_position(), Some(9));
        assert_eq!(v.completed_edits(), 1);
    }

    #[test]
    fn no_annotation_when_nothing_changes() {
        let mut v = view("a\nb\n");
        let changes = LineMap::from([(0, "a".to_string())]);
        let marked = apply_changes(&mut v, &changes, KEY, &RegionStyle::bookmark());
        assert!(marked.is_empty());
        assert_eq!(v.regions(KEY), None);
        assert_eq!(v.scroll_position(), None);
    }

    #[test]
    fn later_extents_account_for_earlier_growth() {
        let mut v = view("a\nb\nc");
        let changes = LineMap::from([(0, "AAAA".to_string()), (2, "C".to_string())]);
        let marked = apply_changes(&mut v, &changes, KEY, &RegionStyle::bookmark());
        assert_eq!(v.text(), "AAAA\nb\nC");
        assert_eq!(marked, vec![Extent::new(0, 4), Extent::new(7, 8)]);
        assert_eq!(v.substr(marked[1]), "C");
    }

    #[test]
    fn lines_past_the_end_are_skipped() {
        let mut v = view("only\n");
        let changes = LineMap::from([(7, "ghost".to_string()), (0, "ONLY".to_string())]);
        let marked = apply_changes(&mut v, &changes, KEY, &RegionStyle::bookmark());
        assert_eq!(v.text(), "ONLY\n");
        assert_eq!(marked.len(), 1);
        assert_eq!(v.edit_depth(), 0);
    }
}
