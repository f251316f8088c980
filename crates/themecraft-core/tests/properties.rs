//! Property tests for scene history, hierarchy integrity, resizing and snapping.

use kurbo::{Rect, Vec2};
use proptest::prelude::*;
use themecraft_core::geometry::{handle_anchor, resize_from_handle};
use themecraft_core::snap::snap_move;
use themecraft_core::{
    DeleteMode, DesignElement, ElementId, ElementPatch, ResizeHandle, SceneStore, SnapConfig, SnapMode,
};

#[derive(Debug, Clone)]
enum Op {
    Insert { frame: (f64, f64, f64, f64), container: bool, parent: Option<usize> },
    Move { target: usize, delta: (f64, f64) },
    Delete { target: usize, reparent: bool },
    Reparent { target: usize, parent: Option<usize> },
    Group { a: usize, b: usize },
    Ungroup { target: usize },
    BringToFront { target: usize },
    ReverseRoot,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let coord = -500.0..500.0f64;
    let size = 1.0..200.0f64;
    prop_oneof![
        3 => (coord.clone(), coord.clone(), size.clone(), size, any::<bool>(), proptest::option::of(0usize..16))
            .prop_map(|(x, y, w, h, container, parent)| Op::Insert { frame: (x, y, w, h), container, parent }),
        2 => (0usize..16, -50.0..50.0f64, -50.0..50.0f64)
            .prop_map(|(target, dx, dy)| Op::Move { target, delta: (dx, dy) }),
        1 => (0usize..16, any::<bool>()).prop_map(|(target, reparent)| Op::Delete { target, reparent }),
        1 => (0usize..16, proptest::option::of(0usize..16))
            .prop_map(|(target, parent)| Op::Reparent { target, parent }),
        1 => (0usize..16, 0usize..16).prop_map(|(a, b)| Op::Group { a, b }),
        1 => (0usize..16).prop_map(|target| Op::Ungroup { target }),
        1 => (0usize..16).prop_map(|target| Op::BringToFront { target }),
        1 => Just(Op::ReverseRoot),
    ]
}

fn pick(store: &SceneStore, index: usize) -> Option<ElementId> {
    let ids = store.state().paint_order();
    if ids.is_empty() { None } else { Some(ids[index % ids.len()]) }
}

/// Apply `op`, ignoring rejections (they must leave the store untouched).
fn apply(store: &mut SceneStore, op: &Op) {
    let _ = match op {
        Op::Insert { frame: (x, y, w, h), container, parent } => {
            let frame = Rect::new(*x, *y, x + w, y + h);
            let element = if *container {
                DesignElement::container(frame)
            } else {
                DesignElement::rectangle(frame)
            };
            let parent = match parent {
                Some(index) => pick(store, *index),
                None => None,
            };
            store.insert_element(element, parent).map(|_| ())
        }
        Op::Move { target, delta: (dx, dy) } => match pick(store, *target) {
            Some(id) => store.update_elements(&[id], &ElementPatch::translate(Vec2::new(*dx, *dy))),
            None => Ok(()),
        },
        Op::Delete { target, reparent } => match pick(store, *target) {
            Some(id) => {
                let mode = if *reparent { DeleteMode::Reparent } else { DeleteMode::Cascade };
                store.delete_elements(&[id], mode)
            }
            None => Ok(()),
        },
        Op::Reparent { target, parent } => match pick(store, *target) {
            Some(id) => {
                let parent = match parent {
                    Some(index) => pick(store, *index),
                    None => None,
                };
                store.reparent(&[id], parent)
            }
            None => Ok(()),
        },
        Op::Group { a, b } => match (pick(store, *a), pick(store, *b)) {
            (Some(a), Some(b)) => store.group(&[a, b]).map(|_| ()),
            _ => Ok(()),
        },
        Op::Ungroup { target } => match pick(store, *target) {
            Some(id) => store.ungroup(id).map(|_| ()),
            None => Ok(()),
        },
        Op::BringToFront { target } => match pick(store, *target) {
            Some(id) => store.bring_to_front(&[id]),
            None => Ok(()),
        },
        Op::ReverseRoot => {
            let mut order = store.state().ordered_children(None);
            order.reverse();
            store.reorder(None, &order)
        }
    };
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn undo_redo_are_inverse(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let mut store = SceneStore::new();
        let mut states = vec![store.state().clone()];
        for op in &ops {
            let revision = store.revision();
            apply(&mut store, op);
            if store.revision() != revision {
                states.push(store.state().clone());
            }
        }

        let steps = states.len() - 1;
        for expected in states.iter().rev().skip(1) {
            prop_assert!(store.undo());
            prop_assert_eq!(store.state(), expected);
        }
        prop_assert!(!store.undo());
        prop_assert_eq!(store.state(), &states[0]);

        for expected in states.iter().skip(1) {
            prop_assert!(store.redo());
            prop_assert_eq!(store.state(), expected);
        }
        prop_assert!(!store.redo());
        prop_assert_eq!(store.undo_len(), steps);
    }

    #[test]
    fn hierarchy_stays_valid(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut store = SceneStore::new();
        for op in &ops {
            apply(&mut store, op);
            prop_assert!(store.state().validate().is_ok(), "invalid after {:?}", op);
            for element in store.state().elements() {
                prop_assert!(!store.state().is_ancestor(element.id, element.id));
                for child in &element.children {
                    prop_assert!(store.state().contains(*child));
                }
            }
        }
    }

    #[test]
    fn resize_keeps_opposite_anchor(
        x in -1000.0..1000.0f64,
        y in -1000.0..1000.0f64,
        w in 8.0..500.0f64,
        h in 8.0..500.0f64,
        dx in -800.0..800.0f64,
        dy in -800.0..800.0f64,
        handle_index in 0usize..8,
    ) {
        let handle = ResizeHandle::ALL[handle_index];
        let rect = Rect::new(x, y, x + w, y + h);
        let resized = resize_from_handle(handle, rect, Vec2::new(dx, dy)).unwrap();
        let before = handle_anchor(handle, rect);
        let after = handle_anchor(handle, resized);
        prop_assert!((before.x - after.x).abs() < 1e-9, "{:?}: {:?} -> {:?}", handle, before, after);
        prop_assert!((before.y - after.y).abs() < 1e-9, "{:?}: {:?} -> {:?}", handle, before, after);
        prop_assert!(resized.width() >= 8.0 - 1e-9);
        prop_assert!(resized.height() >= 8.0 - 1e-9);
    }

    #[test]
    fn snap_lands_exactly_on_sibling_edge(
        sibling_x in -500.0..500.0f64,
        sibling_width in 30.0..60.0f64,
        width in 200.0..300.0f64,
        gap in -5.9..5.9f64,
    ) {
        // Widths differ enough that only the left edges can pair up
        let config = SnapConfig { mode: SnapMode::Guides, ..Default::default() };
        let sibling = Rect::new(sibling_x, 0.0, sibling_x + sibling_width, 40.0);
        let moving = Rect::new(0.0, 1000.0, width, 1040.0);
        let delta = Vec2::new(sibling_x + gap, 0.0);
        let result = snap_move(moving, delta, &[sibling], &config, 1.0);
        prop_assert_eq!(result.rect.x0, sibling.x0);
        prop_assert!((result.rect.width() - width).abs() < 1e-9);
    }
}
