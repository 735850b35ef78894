//! Property tests over arbitrary record-cache operation sequences.

use std::sync::Arc;

use proptest::prelude::*;

use lurk_buffer::{Passthrough, Record, RecordList};
use lurk_text::WrapMode;

#[derive(Debug, Clone)]
enum Op {
    Append(usize),
    Prepend(usize),
    PopFirst,
    PopLast,
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToBottom(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1usize..6).prop_map(Op::Append),
        (1usize..6).prop_map(Op::Prepend),
        Just(Op::PopFirst),
        Just(Op::PopLast),
        (0usize..12).prop_map(Op::ScrollUp),
        (0usize..12).prop_map(Op::ScrollDown),
        (1usize..8).prop_map(Op::ScrollToBottom),
        Just(Op::Clear),
    ]
}

fn record(lines: usize) -> Arc<Record> {
    let raw = vec!["x"; lines].join("\n");
    Arc::new(Record::build(None, raw.as_bytes(), 5, WrapMode::WordChar, &Passthrough).unwrap())
}

fn check_invariants(list: &RecordList) {
    assert_eq!(list.total_lines(), list.lines_above() + list.lines_below());
    match list.screen_top() {
        Some(top) => {
            assert!(list.screen_top_offset() < top.line_count());
            assert!(!list.is_empty());
            // The cursor line itself counts below, so a non-empty list always
            // has at least one line below.
            assert!(list.lines_below() >= 1);
        }
        None => {
            assert!(list.is_empty());
            assert_eq!(list.total_lines(), 0);
            assert_eq!(list.screen_top_offset(), 0);
        }
    }
}

proptest! {
    #[test]
    fn invariants_hold_under_arbitrary_ops(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut list = RecordList::new();
        let mut expected_total: i64 = 0;

        for op in ops {
            match op {
                Op::Append(n) => {
                    list.append(record(n));
                    expected_total += n as i64;
                }
                Op::Prepend(n) => {
                    list.prepend(record(n));
                    expected_total += n as i64;
                }
                Op::PopFirst => {
                    if let Some(r) = list.pop_first() {
                        expected_total -= r.line_count() as i64;
                    }
                }
                Op::PopLast => {
                    if let Some(r) = list.pop_last() {
                        expected_total -= r.line_count() as i64;
                    }
                }
                Op::ScrollUp(n) => {
                    let moved = list.scroll_up(n);
                    prop_assert!(moved <= n);
                }
                Op::ScrollDown(n) => {
                    let moved = list.scroll_down(n);
                    prop_assert!(moved <= n);
                }
                Op::ScrollToBottom(height) => list.scroll_to_bottom(height),
                Op::Clear => {
                    list.clear();
                    expected_total = 0;
                }
            }
            prop_assert_eq!(list.total_lines() as i64, expected_total);
            check_invariants(&list);
        }
    }

    #[test]
    fn scroll_round_trip_away_from_boundaries(
        sizes in prop::collection::vec(1usize..5, 1..10),
        down in 0usize..40,
        k in 1usize..10,
    ) {
        let mut list = RecordList::new();
        for n in &sizes {
            list.append(record(*n));
        }
        list.scroll_down(down);

        // Only meaningful when neither direction hits a boundary.
        if list.lines_below() > k && list.lines_above() >= k {
            let before = (list.lines_above(), list.screen_top_offset());
            prop_assert_eq!(list.scroll_up(k), k);
            prop_assert_eq!(list.scroll_down(k), k);
            prop_assert_eq!((list.lines_above(), list.screen_top_offset()), before);
        }
    }

    #[test]
    fn screen_lines_partition_is_consistent(
        sizes in prop::collection::vec(1usize..5, 0..10),
        down in 0usize..30,
        height in 1usize..8,
    ) {
        let mut list = RecordList::new();
        for n in &sizes {
            list.append(record(*n));
        }
        list.scroll_down(down);

        let s = list.screen_lines(height);
        prop_assert_eq!(s.above, list.lines_above());
        prop_assert!(s.on <= height);
        prop_assert_eq!(s.on + s.below, list.lines_below());
        prop_assert_eq!(s.above + s.on + s.below, list.total_lines());
    }

    #[test]
    fn lines_to_render_never_exceeds_below(
        sizes in prop::collection::vec(1usize..5, 0..10),
        down in 0usize..30,
        count in 0usize..20,
    ) {
        let mut list = RecordList::new();
        for n in &sizes {
            list.append(record(*n));
        }
        list.scroll_down(down);

        let rendered = list.lines_to_render(count);
        prop_assert_eq!(rendered.len(), count.min(list.lines_below()));
    }
}
