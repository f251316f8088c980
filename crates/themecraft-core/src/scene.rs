//! Scene store: the element tree, the selection and the undo history.
//!
//! Elements live in an arena keyed by id with explicit `parent_id`/`children`
//! links, so a snapshot for undo is a plain clone of [`SceneState`]. Every
//! committed operation validates against a scratch copy and only swaps it in
//! on success, so a rejected call never leaves a partial mutation behind.

use crate::element::{DesignElement, ElementId, ElementPatch};
use crate::error::{SceneError, SceneResult};
use crate::geometry::bounding_box_of;
use crate::history::{DEFAULT_HISTORY_DEPTH, History};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// How [`SceneStore::select`] combines ids with the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    /// Clear, then select the given ids.
    #[default]
    Replace,
    /// Deselect ids that are selected, select the others.
    Toggle,
    /// Only ever add.
    Add,
}

/// What happens to the children of a deleted container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Delete the whole subtree.
    #[default]
    Cascade,
    /// Promote children into the deleted element's slot.
    Reparent,
}

/// The committed element tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    pub(crate) elements: BTreeMap<ElementId, DesignElement>,
    pub(crate) root_order: Vec<ElementId>,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ElementId) -> Option<&DesignElement> {
        self.elements.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements, ordered by id.
    pub fn elements(&self) -> impl Iterator<Item = &DesignElement> {
        self.elements.values()
    }

    /// Top-level element ids.
    pub fn root_order(&self) -> &[ElementId] {
        &self.root_order
    }

    /// Ordered children of `parent`, or the top-level list for `None`.
    pub fn children_of(&self, parent: Option<ElementId>) -> &[ElementId] {
        match parent {
            None => &self.root_order,
            Some(id) => self.elements.get(&id).map(|e| e.children.as_slice()).unwrap_or(&[]),
        }
    }

    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id).and_then(|e| e.parent_id)
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if result.len() > self.elements.len() || parent == id {
                break;
            }
            result.push(parent);
            current = self.parent_of(parent);
        }
        result
    }

    /// Whether `ancestor` is a transitive parent of `id`.
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// All descendants of `id` in depth-first pre-order.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack: Vec<ElementId> = self.children_of(Some(id)).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if result.contains(&next) {
                continue;
            }
            result.push(next);
            stack.extend(self.children_of(Some(next)).iter().rev().copied());
        }
        result
    }

    /// The top-level ancestor of `id` (or `id` itself).
    pub fn top_level(&self, id: ElementId) -> ElementId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// Siblings of `parent` sorted by z-order, back to front.
    pub fn ordered_children(&self, parent: Option<ElementId>) -> Vec<ElementId> {
        let mut ids = self.children_of(parent).to_vec();
        ids.sort_by_key(|id| self.elements.get(id).map(|e| e.z_order).unwrap_or_default());
        ids
    }

    /// Every element back to front: parents before children, siblings by z-order.
    pub fn paint_order(&self) -> Vec<ElementId> {
        let mut result = Vec::with_capacity(self.elements.len());
        let mut stack: Vec<ElementId> = self.ordered_children(None).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.ordered_children(Some(id)).into_iter().rev());
        }
        result
    }

    /// Topmost element under `point`.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<ElementId> {
        self.paint_order()
            .into_iter()
            .rev()
            .find(|id| self.elements.get(id).is_some_and(|e| e.hit_test(point, tolerance)))
    }

    /// Top-level elements whose rotated bounds intersect `rect`.
    pub fn elements_in_rect(&self, rect: Rect) -> Vec<ElementId> {
        let rect = rect.abs();
        self.ordered_children(None)
            .into_iter()
            .filter(|id| {
                self.elements.get(id).is_some_and(|e| {
                    let bounds = e.bounds();
                    bounds.x0 <= rect.x1 && bounds.x1 >= rect.x0 && bounds.y0 <= rect.y1 && bounds.y1 >= rect.y0
                })
            })
            .collect()
    }

    /// Union of the rotated bounds of `ids`.
    pub fn bounds_of(&self, ids: &[ElementId]) -> Option<Rect> {
        bounding_box_of(ids.iter().filter_map(|id| self.elements.get(id)).map(|e| e.bounds()))
    }

    /// Rotated bounds of the children of `parent`, skipping `exclude`.
    pub fn sibling_bounds(&self, parent: Option<ElementId>, exclude: &HashSet<ElementId>) -> Vec<Rect> {
        self.children_of(parent)
            .iter()
            .filter(|id| !exclude.contains(id))
            .filter_map(|id| self.elements.get(id))
            .map(|e| e.bounds())
            .collect()
    }

    /// Check every structural invariant of the tree.
    pub fn validate(&self) -> SceneResult<()> {
        let mut listed = HashSet::new();
        let lists = std::iter::once((None, &self.root_order)).chain(
            self.elements
                .values()
                .filter(|e| e.is_container())
                .map(|e| (Some(e.id), &e.children)),
        );
        for (parent, list) in lists {
            let mut z_seen = HashSet::new();
            for child in list {
                let element = self.elements.get(child).ok_or(SceneError::NotFound(*child))?;
                if element.parent_id != parent {
                    return Err(SceneError::InvalidHierarchy(format!(
                        "{child} is listed under {parent:?} but its parent is {:?}",
                        element.parent_id
                    )));
                }
                if !listed.insert(*child) {
                    return Err(SceneError::InvalidHierarchy(format!("{child} is listed twice")));
                }
                if !z_seen.insert(element.z_order) {
                    return Err(SceneError::InvalidHierarchy(format!(
                        "duplicate z-order {} under {parent:?}",
                        element.z_order
                    )));
                }
            }
        }

        for element in self.elements.values() {
            if !element.is_container() && !element.children.is_empty() {
                return Err(SceneError::InvalidHierarchy(format!(
                    "{} is a {} and cannot have children",
                    element.id,
                    element.kind.name()
                )));
            }
            if !listed.contains(&element.id) {
                return Err(SceneError::InvalidHierarchy(format!(
                    "{} is not attached to the tree",
                    element.id
                )));
            }
            let mut steps = 0;
            let mut current = element.parent_id;
            while let Some(parent) = current {
                if parent == element.id || steps > self.elements.len() {
                    return Err(SceneError::InvalidHierarchy(format!(
                        "{} is its own ancestor",
                        element.id
                    )));
                }
                steps += 1;
                current = self.parent_of(parent);
            }
            element.validate()?;
        }
        Ok(())
    }

    fn require(&self, id: ElementId) -> SceneResult<&DesignElement> {
        self.elements.get(&id).ok_or(SceneError::NotFound(id))
    }

    fn require_container(&self, parent: Option<ElementId>) -> SceneResult<()> {
        if let Some(id) = parent {
            let element = self.require(id)?;
            if !element.is_container() {
                return Err(SceneError::InvalidHierarchy(format!(
                    "{id} is a {} and cannot have children",
                    element.kind.name()
                )));
            }
        }
        Ok(())
    }

    fn siblings_mut(&mut self, parent: Option<ElementId>) -> Option<&mut Vec<ElementId>> {
        match parent {
            None => Some(&mut self.root_order),
            Some(id) => self.elements.get_mut(&id).map(|e| &mut e.children),
        }
    }

    fn next_z(&self, parent: Option<ElementId>) -> i64 {
        self.children_of(parent)
            .iter()
            .filter_map(|id| self.elements.get(id))
            .map(|e| e.z_order + 1)
            .max()
            .unwrap_or(0)
    }

    /// Reassign z-order by list position.
    fn renumber(&mut self, parent: Option<ElementId>) {
        let ids = self.children_of(parent).to_vec();
        for (index, id) in ids.iter().enumerate() {
            if let Some(element) = self.elements.get_mut(id) {
                element.z_order = index as i64;
            }
        }
    }

    fn detach(&mut self, id: ElementId) {
        let parent = self.parent_of(id);
        if let Some(list) = self.siblings_mut(parent) {
            list.retain(|child| *child != id);
        }
        if let Some(element) = self.elements.get_mut(&id) {
            element.parent_id = None;
        }
    }

    fn attach(&mut self, id: ElementId, parent: Option<ElementId>) {
        let z = self.next_z(parent);
        if let Some(list) = self.siblings_mut(parent) {
            list.push(id);
        }
        if let Some(element) = self.elements.get_mut(&id) {
            element.parent_id = parent;
            element.z_order = z;
        }
    }

    /// Insert a childless element under `parent` on top of its siblings.
    fn insert_child(&mut self, mut element: DesignElement, parent: Option<ElementId>) -> SceneResult<ElementId> {
        self.require_container(parent)?;
        element.validate()?;
        element.children.clear();
        element.parent_id = None;
        let id = element.id;
        self.elements.insert(id, element);
        self.attach(id, parent);
        Ok(id)
    }

    fn remove_subtree(&mut self, id: ElementId) {
        let doomed = self.descendants(id);
        self.detach(id);
        self.elements.remove(&id);
        for child in doomed {
            self.elements.remove(&child);
        }
    }

    /// Remove `id` and splice its children into its slot.
    fn remove_promoting_children(&mut self, id: ElementId) -> Vec<ElementId> {
        let Some(element) = self.elements.remove(&id) else {
            return Vec::new();
        };
        let parent = element.parent_id;
        if let Some(list) = self.siblings_mut(parent) {
            match list.iter().position(|child| *child == id) {
                Some(index) => {
                    list.splice(index..=index, element.children.iter().copied());
                }
                None => list.extend(element.children.iter().copied()),
            }
        }
        for child in &element.children {
            if let Some(child) = self.elements.get_mut(child) {
                child.parent_id = parent;
            }
        }
        self.renumber(parent);
        element.children
    }

    /// Apply `patch` to a single element, without touching its descendants.
    fn apply_patch(&mut self, id: ElementId, patch: &ElementPatch) -> SceneResult<()> {
        let element = self.elements.get_mut(&id).ok_or(SceneError::NotFound(id))?;
        patch.apply(element)?;
        Ok(())
    }

    fn paste_into(&mut self, fragment: &ClipboardFragment, offset: Vec2) -> SceneResult<Vec<ElementId>> {
        let by_id: HashMap<ElementId, &DesignElement> =
            fragment.elements.iter().map(|e| (e.id, e)).collect();
        let mut roots = Vec::with_capacity(fragment.roots.len());
        for root in &fragment.roots {
            let source = by_id.get(root).ok_or(SceneError::NotFound(*root))?;
            let parent = source
                .parent_id
                .filter(|p| self.elements.get(p).is_some_and(|e| e.is_container()));
            roots.push(self.insert_copy(&by_id, source, parent, offset)?);
        }
        Ok(roots)
    }

    fn insert_copy(
        &mut self,
        by_id: &HashMap<ElementId, &DesignElement>,
        source: &DesignElement,
        parent: Option<ElementId>,
        offset: Vec2,
    ) -> SceneResult<ElementId> {
        let mut copy = source.clone();
        copy.id = Uuid::new_v4();
        copy.translate(offset);
        let id = self.insert_child(copy, parent)?;
        for child in &source.children {
            if let Some(child) = by_id.get(child) {
                self.insert_copy(by_id, child, Some(id), offset)?;
            }
        }
        Ok(id)
    }
}

/// A copied sub-forest, independent of the scene it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipboardFragment {
    /// Copied elements with no copied ancestor, in paint order.
    pub roots: Vec<ElementId>,
    /// Roots and all their descendants.
    pub elements: Vec<DesignElement>,
}

impl ClipboardFragment {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Owns the scene, the selection and the undo history.
///
/// Committed operations push exactly one undo entry when they change the
/// scene. A transient gesture (see [`SceneStore::begin_transient`]) mutates a
/// live view that only reaches the history on [`SceneStore::commit_transient`].
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    state: SceneState,
    selection: Vec<ElementId>,
    history: History<SceneState>,
    /// Pre-gesture snapshot while a transient gesture is active.
    transient_base: Option<SceneState>,
    revision: u64,
    /// Also counts transient changes.
    live_revision: u64,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::with_history_depth(DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_history_depth(depth: usize) -> Self {
        Self {
            state: SceneState::new(),
            selection: Vec::new(),
            history: History::new(depth),
            transient_base: None,
            revision: 0,
            live_revision: 0,
        }
    }

    /// The live scene, including any in-progress transient changes.
    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// The last committed scene.
    pub fn committed_state(&self) -> &SceneState {
        self.transient_base.as_ref().unwrap_or(&self.state)
    }

    pub fn get(&self, id: ElementId) -> Option<&DesignElement> {
        self.state.get(id)
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    /// Increments on every committed change, undo, redo and load.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Increments whenever the live scene changes, committed or not.
    pub fn live_revision(&self) -> u64 {
        self.live_revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.history.redo_len()
    }

    /// Replace the whole scene, clearing history and selection.
    ///
    /// Invalid scenes are rejected and the current scene is kept.
    pub fn load(&mut self, state: SceneState) -> SceneResult<()> {
        state.validate().inspect_err(|err| log::warn!("Rejected scene load: {err}"))?;
        self.transient_base = None;
        self.state = state;
        self.history.clear();
        self.selection.clear();
        self.revision += 1;
        self.live_revision += 1;
        log::info!("Loaded scene with {} elements", self.state.len());
        Ok(())
    }

    /// Insert `element` under `parent` (top level for `None`) with a fresh id.
    ///
    /// The element lands above its siblings and any `children` it carries are
    /// dropped.
    pub fn insert_element(&mut self, mut element: DesignElement, parent: Option<ElementId>) -> SceneResult<ElementId> {
        self.settle();
        element.id = Uuid::new_v4();
        let mut next = self.state.clone();
        let id = next.insert_child(element, parent).inspect_err(log_rejection)?;
        self.commit(next, "insert");
        Ok(id)
    }

    /// Apply `patch` to each element of `ids`.
    ///
    /// Moving a container moves its descendants along with it.
    pub fn update_elements(&mut self, ids: &[ElementId], patch: &ElementPatch) -> SceneResult<()> {
        self.settle();
        let mut next = self.state.clone();
        Self::patch_into(&mut next, ids, patch).inspect_err(log_rejection)?;
        self.commit(next, "update");
        Ok(())
    }

    fn patch_into(state: &mut SceneState, ids: &[ElementId], patch: &ElementPatch) -> SceneResult<()> {
        let targets: HashSet<ElementId> = ids.iter().copied().collect();
        let mut deltas = HashMap::new();
        for id in ids {
            let before = state.require(*id)?.position;
            state.apply_patch(*id, patch)?;
            let after = state.require(*id)?.position;
            deltas.insert(*id, after - before);
        }
        if patch.moves() {
            let all: Vec<ElementId> = state.elements.keys().copied().collect();
            for id in all.into_iter().filter(|id| !targets.contains(id)) {
                let inherited = state.ancestors(id).into_iter().find_map(|a| deltas.get(&a).copied());
                if let (Some(delta), Some(element)) = (inherited, state.elements.get_mut(&id)) {
                    element.translate(delta);
                }
            }
        }
        Ok(())
    }

    /// Delete `ids`, handling container children per `mode`.
    pub fn delete_elements(&mut self, ids: &[ElementId], mode: DeleteMode) -> SceneResult<()> {
        self.settle();
        self.require_all(ids)?;
        let mut next = self.state.clone();
        for id in ids {
            if !next.contains(*id) {
                continue;
            }
            match mode {
                DeleteMode::Cascade => next.remove_subtree(*id),
                DeleteMode::Reparent => {
                    next.remove_promoting_children(*id);
                }
            }
        }
        self.commit(next, "delete");
        Ok(())
    }

    /// Change the selection. Returns whether it changed.
    pub fn select(&mut self, ids: &[ElementId], mode: SelectMode) -> SceneResult<bool> {
        self.require_all(ids)?;
        let before = self.selection.clone();
        match mode {
            SelectMode::Replace => {
                self.selection.clear();
                for id in ids {
                    if !self.selection.contains(id) {
                        self.selection.push(*id);
                    }
                }
            }
            SelectMode::Toggle => {
                for id in ids {
                    match self.selection.iter().position(|s| s == id) {
                        Some(index) => {
                            self.selection.remove(index);
                        }
                        None => self.selection.push(*id),
                    }
                }
            }
            SelectMode::Add => {
                for id in ids {
                    if !self.selection.contains(id) {
                        self.selection.push(*id);
                    }
                }
            }
        }
        Ok(self.selection != before)
    }

    /// Select every top-level element.
    pub fn select_all(&mut self) -> bool {
        let all = self.state.ordered_children(None);
        let changed = self.selection != all;
        self.selection = all;
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = !self.selection.is_empty();
        self.selection.clear();
        changed
    }

    /// Reassign z-order of `parent`'s children by their position in `ordered`.
    ///
    /// `ordered` must be a permutation of the current children.
    pub fn reorder(&mut self, parent: Option<ElementId>, ordered: &[ElementId]) -> SceneResult<()> {
        self.settle();
        self.state.require_container(parent).inspect_err(log_rejection)?;
        self.require_all(ordered)?;
        let mut current = self.state.children_of(parent).to_vec();
        let mut requested = ordered.to_vec();
        current.sort();
        requested.sort();
        if current != requested {
            let err = SceneError::InvalidHierarchy(
                "reorder must list every sibling exactly once".to_string(),
            );
            log_rejection(&err);
            return Err(err);
        }
        let mut next = self.state.clone();
        if let Some(list) = next.siblings_mut(parent) {
            *list = ordered.to_vec();
        }
        next.renumber(parent);
        self.commit(next, "reorder");
        Ok(())
    }

    /// Raise `ids` above their siblings, keeping their relative order.
    pub fn bring_to_front(&mut self, ids: &[ElementId]) -> SceneResult<()> {
        self.restack(ids, true)
    }

    /// Lower `ids` below their siblings, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &[ElementId]) -> SceneResult<()> {
        self.restack(ids, false)
    }

    fn restack(&mut self, ids: &[ElementId], to_front: bool) -> SceneResult<()> {
        self.settle();
        self.require_all(ids)?;
        let moving: HashSet<ElementId> = ids.iter().copied().collect();
        let mut parents = Vec::new();
        for id in ids {
            let parent = self.state.parent_of(*id);
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
        let mut next = self.state.clone();
        for parent in parents {
            let (mut picked, rest): (Vec<ElementId>, Vec<ElementId>) = next
                .ordered_children(parent)
                .into_iter()
                .partition(|id| moving.contains(id));
            let order = if to_front {
                let mut order = rest;
                order.append(&mut picked);
                order
            } else {
                picked.extend(rest);
                picked
            };
            if let Some(list) = next.siblings_mut(parent) {
                *list = order;
            }
            next.renumber(parent);
        }
        self.commit(next, if to_front { "bring to front" } else { "send to back" });
        Ok(())
    }

    /// Move `ids` under `new_parent` (top level for `None`).
    ///
    /// Rejects moves that would make an element its own ancestor.
    pub fn reparent(&mut self, ids: &[ElementId], new_parent: Option<ElementId>) -> SceneResult<()> {
        self.settle();
        self.require_all(ids)?;
        self.state.require_container(new_parent).inspect_err(log_rejection)?;
        if let Some(target) = new_parent {
            for id in ids {
                if *id == target || self.state.is_ancestor(*id, target) {
                    let err = SceneError::InvalidHierarchy(format!(
                        "{id} cannot be moved into its own descendant {target}"
                    ));
                    log_rejection(&err);
                    return Err(err);
                }
            }
        }
        let mut next = self.state.clone();
        for id in ids {
            if next.parent_of(*id) == new_parent {
                continue;
            }
            next.detach(*id);
            next.attach(*id, new_parent);
        }
        self.commit(next, "reparent");
        Ok(())
    }

    /// Wrap siblings `ids` in a new container sized to their bounds.
    pub fn group(&mut self, ids: &[ElementId]) -> SceneResult<ElementId> {
        self.settle();
        self.require_all(ids)?;
        let Some(first) = ids.first() else {
            return Err(SceneError::InvalidHierarchy("nothing to group".to_string()));
        };
        let parent = self.state.parent_of(*first);
        if ids.iter().any(|id| self.state.parent_of(*id) != parent) {
            let err = SceneError::InvalidHierarchy("grouped elements must share a parent".to_string());
            log_rejection(&err);
            return Err(err);
        }
        let bounds = self
            .state
            .bounds_of(ids)
            .ok_or_else(|| SceneError::InvalidHierarchy("nothing to group".to_string()))?;

        let mut next = self.state.clone();
        let siblings = next.ordered_children(parent);
        let members: Vec<ElementId> = siblings.iter().copied().filter(|id| ids.contains(id)).collect();
        let slot = siblings.iter().position(|id| ids.contains(id)).unwrap_or(siblings.len());
        let mut order: Vec<ElementId> = siblings.into_iter().filter(|id| !ids.contains(id)).collect();

        let mut container = DesignElement::container(bounds);
        container.parent_id = parent;
        container.children = members.clone();
        let container_id = container.id;
        next.elements.insert(container_id, container);
        for member in &members {
            if let Some(element) = next.elements.get_mut(member) {
                element.parent_id = Some(container_id);
            }
        }
        order.insert(slot.min(order.len()), container_id);
        if let Some(list) = next.siblings_mut(parent) {
            *list = order;
        }
        next.renumber(parent);
        next.renumber(Some(container_id));

        self.commit(next, "group");
        self.selection = vec![container_id];
        Ok(container_id)
    }

    /// Remove a container, promoting its children into its slot.
    pub fn ungroup(&mut self, container: ElementId) -> SceneResult<Vec<ElementId>> {
        self.settle();
        let element = self.state.require(container).inspect_err(log_rejection)?;
        if !element.is_container() {
            let err = SceneError::InvalidHierarchy(format!("{container} is not a container"));
            log_rejection(&err);
            return Err(err);
        }
        let mut next = self.state.clone();
        let children = next.remove_promoting_children(container);
        self.commit(next, "ungroup");
        self.selection = children.clone();
        Ok(children)
    }

    /// Copy `ids` and their descendants.
    ///
    /// Ids whose ancestor is also copied are folded into that ancestor.
    pub fn copy(&self, ids: &[ElementId]) -> SceneResult<ClipboardFragment> {
        self.require_all(ids)?;
        let picked: HashSet<ElementId> = ids.iter().copied().collect();
        let roots: Vec<ElementId> = self
            .state
            .paint_order()
            .into_iter()
            .filter(|id| picked.contains(id))
            .filter(|id| !self.state.ancestors(*id).iter().any(|a| picked.contains(a)))
            .collect();
        let mut elements = Vec::new();
        for root in &roots {
            for id in std::iter::once(*root).chain(self.state.descendants(*root)) {
                if let Some(element) = self.state.get(id) {
                    elements.push(element.clone());
                }
            }
        }
        Ok(ClipboardFragment { roots, elements })
    }

    /// Insert a copy of `fragment` shifted by `offset`, with fresh ids.
    ///
    /// Roots go back under their original parent when it still exists, at the
    /// top level otherwise. The pasted roots become the selection.
    pub fn paste(&mut self, fragment: &ClipboardFragment, offset: Vec2) -> SceneResult<Vec<ElementId>> {
        self.settle();
        if fragment.is_empty() {
            return Ok(Vec::new());
        }
        let mut next = self.state.clone();
        let roots = next.paste_into(fragment, offset).inspect_err(log_rejection)?;
        self.commit(next, "paste");
        self.selection = roots.clone();
        Ok(roots)
    }

    /// Copy then paste `ids` in one undo entry.
    pub fn duplicate(&mut self, ids: &[ElementId], offset: Vec2) -> SceneResult<Vec<ElementId>> {
        let fragment = self.copy(ids)?;
        self.paste(&fragment, offset)
    }

    /// Start a transient gesture. Nested calls keep the first snapshot.
    pub fn begin_transient(&mut self) {
        if self.transient_base.is_none() {
            self.transient_base = Some(self.state.clone());
        }
    }

    pub fn is_transient(&self) -> bool {
        self.transient_base.is_some()
    }

    /// Apply per-element patches to the live view without touching history.
    ///
    /// Patches are applied atomically; descendants are not moved implicitly.
    pub fn preview(&mut self, updates: &[(ElementId, ElementPatch)]) -> SceneResult<()> {
        if self.transient_base.is_none() {
            return Err(SceneError::NoActiveGesture);
        }
        let mut next = self.state.clone();
        for (id, patch) in updates {
            next.apply_patch(*id, patch)?;
        }
        if next != self.state {
            self.state = next;
            self.live_revision += 1;
        }
        Ok(())
    }

    /// Paste into the live view of a transient gesture.
    pub fn preview_paste(&mut self, fragment: &ClipboardFragment, offset: Vec2) -> SceneResult<Vec<ElementId>> {
        if self.transient_base.is_none() {
            return Err(SceneError::NoActiveGesture);
        }
        let mut next = self.state.clone();
        let roots = next.paste_into(fragment, offset)?;
        self.state = next;
        self.live_revision += 1;
        self.selection = roots.clone();
        Ok(roots)
    }

    /// Commit the live view as a single undo entry.
    ///
    /// Returns whether anything changed; an unchanged gesture leaves no entry.
    pub fn commit_transient(&mut self) -> SceneResult<bool> {
        let base = self.transient_base.take().ok_or(SceneError::NoActiveGesture)?;
        let live = std::mem::replace(&mut self.state, base);
        Ok(self.commit(live, "gesture"))
    }

    /// Drop the live view and restore the pre-gesture scene.
    pub fn cancel_transient(&mut self) -> SceneResult<()> {
        let base = self.transient_base.take().ok_or(SceneError::NoActiveGesture)?;
        if base != self.state {
            self.state = base;
            self.live_revision += 1;
        }
        self.prune_selection();
        log::debug!("Cancelled transient gesture");
        Ok(())
    }

    /// Step back one committed change. Returns `false` if there is none.
    pub fn undo(&mut self) -> bool {
        self.settle();
        let current = self.state.clone();
        match self.history.undo(current) {
            Some(previous) => {
                self.state = previous;
                self.after_history_step();
                true
            }
            None => {
                log::debug!("Nothing to undo");
                false
            }
        }
    }

    /// Re-apply the last undone change. Returns `false` if there is none.
    pub fn redo(&mut self) -> bool {
        self.settle();
        let current = self.state.clone();
        match self.history.redo(current) {
            Some(next) => {
                self.state = next;
                self.after_history_step();
                true
            }
            None => {
                log::debug!("Nothing to redo");
                false
            }
        }
    }

    fn after_history_step(&mut self) {
        self.revision += 1;
        self.live_revision += 1;
        self.prune_selection();
    }

    /// A committed operation arriving mid-gesture drops the live view first.
    fn settle(&mut self) {
        if let Some(base) = self.transient_base.take() {
            log::debug!("Discarding transient gesture before committed operation");
            if base != self.state {
                self.state = base;
                self.live_revision += 1;
            }
            self.prune_selection();
        }
    }

    fn require_all(&self, ids: &[ElementId]) -> SceneResult<()> {
        for id in ids {
            self.state.require(*id).inspect_err(log_rejection)?;
        }
        Ok(())
    }

    fn prune_selection(&mut self) {
        let state = &self.state;
        self.selection.retain(|id| state.contains(*id));
    }

    /// Swap in `next`, recording the current state for undo if it differs.
    fn commit(&mut self, next: SceneState, action: &str) -> bool {
        if next == self.state {
            log::debug!("{action}: no change");
            return false;
        }
        let previous = std::mem::replace(&mut self.state, next);
        self.history.push(previous);
        self.revision += 1;
        self.live_revision += 1;
        self.prune_selection();
        log::debug!("{action}: committed revision {}", self.revision);
        true
    }
}

fn log_rejection(err: &SceneError) {
    log::debug!("Rejected scene operation: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, x + w, y + h)
    }

    fn store_with_two() -> (SceneStore, ElementId, ElementId) {
        let mut store = SceneStore::new();
        let a = store.insert_element(DesignElement::rectangle(rect(0.0, 0.0, 50.0, 50.0)), None).unwrap();
        let b = store.insert_element(DesignElement::rectangle(rect(100.0, 0.0, 50.0, 50.0)), None).unwrap();
        (store, a, b)
    }

    #[test]
    fn test_insert_assigns_fresh_id_and_z() {
        let mut store = SceneStore::new();
        let element = DesignElement::rectangle(rect(0.0, 0.0, 10.0, 10.0));
        let original_id = element.id;
        let a = store.insert_element(element, None).unwrap();
        let b = store.insert_element(DesignElement::rectangle(rect(0.0, 0.0, 10.0, 10.0)), None).unwrap();
        assert_ne!(a, original_id);
        assert_eq!(store.get(a).unwrap().z_order, 0);
        assert_eq!(store.get(b).unwrap().z_order, 1);
        assert_eq!(store.state().root_order(), &[a, b]);
        assert_eq!(store.undo_len(), 2);
    }

    #[test]
    fn test_insert_into_non_container_is_rejected() {
        let (mut store, a, _) = store_with_two();
        let before = store.state().clone();
        let result = store.insert_element(DesignElement::rectangle(rect(0.0, 0.0, 5.0, 5.0)), Some(a));
        assert!(matches!(result, Err(SceneError::InvalidHierarchy(_))));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_unknown_id_is_not_found_and_state_unchanged() {
        let (mut store, a, _) = store_with_two();
        let before = store.state().clone();
        let undo_len = store.undo_len();
        let ghost = Uuid::new_v4();
        let result = store.update_elements(&[a, ghost], &ElementPatch::translate(Vec2::new(5.0, 0.0)));
        assert_eq!(result, Err(SceneError::NotFound(ghost)));
        assert_eq!(store.state(), &before);
        assert_eq!(store.undo_len(), undo_len);
    }

    #[test]
    fn test_update_moves_container_descendants() {
        let mut store = SceneStore::new();
        let frame = store.insert_element(DesignElement::container(rect(0.0, 0.0, 200.0, 200.0)), None).unwrap();
        let child = store
            .insert_element(DesignElement::rectangle(rect(10.0, 10.0, 20.0, 20.0)), Some(frame))
            .unwrap();
        store.update_elements(&[frame], &ElementPatch::translate(Vec2::new(5.0, 7.0))).unwrap();
        assert_eq!(store.get(child).unwrap().position, Point::new(15.0, 17.0));
    }

    #[test]
    fn test_select_modes() {
        let (mut store, a, b) = store_with_two();
        store.select(&[a], SelectMode::Replace).unwrap();
        assert_eq!(store.selection(), &[a]);
        store.select(&[b], SelectMode::Add).unwrap();
        assert_eq!(store.selection(), &[a, b]);
        store.select(&[a], SelectMode::Toggle).unwrap();
        assert_eq!(store.selection(), &[b]);
        store.select(&[a], SelectMode::Toggle).unwrap();
        assert_eq!(store.selection(), &[b, a]);
        store.select(&[b], SelectMode::Add).unwrap();
        assert_eq!(store.selection(), &[b, a]);
        store.select(&[a], SelectMode::Replace).unwrap();
        assert_eq!(store.selection(), &[a]);
    }

    #[test]
    fn test_selection_is_not_historized() {
        let (mut store, a, _) = store_with_two();
        let undo_len = store.undo_len();
        store.select(&[a], SelectMode::Replace).unwrap();
        assert_eq!(store.undo_len(), undo_len);
    }

    #[test]
    fn test_undo_prunes_selection() {
        let (mut store, _, b) = store_with_two();
        store.select(&[b], SelectMode::Replace).unwrap();
        assert!(store.undo());
        assert!(store.get(b).is_none());
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_delete_cascade_and_reparent() {
        let mut store = SceneStore::new();
        let frame = store.insert_element(DesignElement::container(rect(0.0, 0.0, 200.0, 200.0)), None).unwrap();
        let other = store.insert_element(DesignElement::rectangle(rect(300.0, 0.0, 20.0, 20.0)), None).unwrap();
        let child = store
            .insert_element(DesignElement::rectangle(rect(10.0, 10.0, 20.0, 20.0)), Some(frame))
            .unwrap();

        let mut cascade = store.clone();
        cascade.delete_elements(&[frame], DeleteMode::Cascade).unwrap();
        assert!(cascade.get(child).is_none());
        assert_eq!(cascade.state().root_order(), &[other]);
        cascade.state().validate().unwrap();

        store.delete_elements(&[frame], DeleteMode::Reparent).unwrap();
        assert_eq!(store.get(child).unwrap().parent_id, None);
        assert_eq!(store.state().root_order(), &[child, other]);
        store.state().validate().unwrap();
    }

    #[test]
    fn test_reorder_requires_permutation() {
        let (mut store, a, b) = store_with_two();
        store.reorder(None, &[b, a]).unwrap();
        assert_eq!(store.get(b).unwrap().z_order, 0);
        assert_eq!(store.get(a).unwrap().z_order, 1);
        assert!(matches!(store.reorder(None, &[a]), Err(SceneError::InvalidHierarchy(_))));
    }

    #[test]
    fn test_reparent_rejects_cycle() {
        let mut store = SceneStore::new();
        let outer = store.insert_element(DesignElement::container(rect(0.0, 0.0, 200.0, 200.0)), None).unwrap();
        let inner = store
            .insert_element(DesignElement::container(rect(10.0, 10.0, 50.0, 50.0)), Some(outer))
            .unwrap();
        assert!(matches!(store.reparent(&[outer], Some(inner)), Err(SceneError::InvalidHierarchy(_))));
        assert!(matches!(store.reparent(&[outer], Some(outer)), Err(SceneError::InvalidHierarchy(_))));
        store.reparent(&[inner], None).unwrap();
        assert_eq!(store.get(inner).unwrap().parent_id, None);
        assert!(store.get(outer).unwrap().children.is_empty());
        store.state().validate().unwrap();
    }

    #[test]
    fn test_group_and_ungroup() {
        let (mut store, a, b) = store_with_two();
        let group = store.group(&[a, b]).unwrap();
        let container = store.get(group).unwrap();
        assert_eq!(container.frame(), rect(0.0, 0.0, 150.0, 50.0));
        assert_eq!(container.children, vec![a, b]);
        assert_eq!(store.selection(), &[group]);
        store.state().validate().unwrap();

        let children = store.ungroup(group).unwrap();
        assert_eq!(children, vec![a, b]);
        assert!(store.get(group).is_none());
        assert_eq!(store.state().root_order(), &[a, b]);
        store.state().validate().unwrap();
    }

    #[test]
    fn test_copy_paste_uses_fresh_ids_and_offset() {
        let mut store = SceneStore::new();
        let frame = store.insert_element(DesignElement::container(rect(0.0, 0.0, 100.0, 100.0)), None).unwrap();
        store
            .insert_element(DesignElement::rectangle(rect(10.0, 10.0, 20.0, 20.0)), Some(frame))
            .unwrap();
        let fragment = store.copy(&[frame]).unwrap();
        assert_eq!(fragment.elements.len(), 2);

        let pasted = store.paste(&fragment, Vec2::new(10.0, 10.0)).unwrap();
        assert_eq!(pasted.len(), 1);
        assert_ne!(pasted[0], frame);
        let copy = store.get(pasted[0]).unwrap();
        assert_eq!(copy.position, Point::new(10.0, 10.0));
        let child = store.get(copy.children[0]).unwrap();
        assert_eq!(child.position, Point::new(20.0, 20.0));
        assert_eq!(child.parent_id, Some(pasted[0]));
        assert_eq!(store.selection(), pasted.as_slice());
        assert_eq!(store.state().len(), 4);
        store.state().validate().unwrap();
    }

    #[test]
    fn test_bring_to_front_and_send_to_back() {
        let (mut store, a, b) = store_with_two();
        store.bring_to_front(&[a]).unwrap();
        assert_eq!(store.state().ordered_children(None), vec![b, a]);
        store.send_to_back(&[a]).unwrap();
        assert_eq!(store.state().ordered_children(None), vec![a, b]);
    }

    #[test]
    fn test_transient_commit_is_single_entry() {
        let (mut store, a, _) = store_with_two();
        let undo_len = store.undo_len();
        store.begin_transient();
        for x in 1..=10 {
            let patch = ElementPatch { position: Some(Point::new(x as f64, 0.0)), ..Default::default() };
            store.preview(&[(a, patch)]).unwrap();
        }
        assert_eq!(store.undo_len(), undo_len);
        assert!(store.commit_transient().unwrap());
        assert_eq!(store.undo_len(), undo_len + 1);
        assert_eq!(store.get(a).unwrap().position, Point::new(10.0, 0.0));

        assert!(store.undo());
        assert_eq!(store.get(a).unwrap().position, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_transient_cancel_restores() {
        let (mut store, a, _) = store_with_two();
        store.begin_transient();
        store.preview(&[(a, ElementPatch::translate(Vec2::new(40.0, 0.0)))]).unwrap();
        store.cancel_transient().unwrap();
        assert_eq!(store.get(a).unwrap().position, Point::new(0.0, 0.0));
        assert!(!store.is_transient());
        assert_eq!(store.cancel_transient(), Err(SceneError::NoActiveGesture));
    }

    #[test]
    fn test_unchanged_gesture_leaves_no_entry() {
        let (mut store, _, _) = store_with_two();
        let undo_len = store.undo_len();
        store.begin_transient();
        assert!(!store.commit_transient().unwrap());
        assert_eq!(store.undo_len(), undo_len);
    }

    #[test]
    fn test_empty_undo_redo_are_noops() {
        let mut store = SceneStore::new();
        assert!(!store.undo());
        assert!(!store.redo());
    }

    #[test]
    fn test_validate_detects_cycle() {
        let mut state = SceneState::new();
        let mut a = DesignElement::container(rect(0.0, 0.0, 10.0, 10.0));
        let mut b = DesignElement::container(rect(0.0, 0.0, 10.0, 10.0));
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        a.children = vec![b.id];
        b.children = vec![a.id];
        state.elements.insert(a.id, a);
        state.elements.insert(b.id, b);
        assert!(matches!(state.validate(), Err(SceneError::InvalidHierarchy(_))));

        let mut store = SceneStore::new();
        assert!(store.load(state).is_err());
        assert!(store.state().is_empty());
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut store = SceneStore::new();
        let back = store.insert_element(DesignElement::rectangle(rect(0.0, 0.0, 100.0, 100.0)), None).unwrap();
        let front = store.insert_element(DesignElement::rectangle(rect(50.0, 50.0, 100.0, 100.0)), None).unwrap();
        assert_eq!(store.state().hit_test(Point::new(75.0, 75.0), 0.0), Some(front));
        assert_eq!(store.state().hit_test(Point::new(25.0, 25.0), 0.0), Some(back));
        assert_eq!(store.state().hit_test(Point::new(500.0, 500.0), 0.0), None);
    }
}
