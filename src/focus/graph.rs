use crate::focus::tree::{Element, ElementId, ElementTree, Scope, SectionId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A section registered by the active screen: grouping id plus its spoken
/// group label. Registered sections that no current element references are
/// treated as absent — they never partition traversal or prefix speech.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusableSection {
    pub id: SectionId,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FocusOutcome {
    /// Focus landed on an element; `spoken` is the full announcement,
    /// including the section label when the section changed.
    Moved { id: ElementId, spoken: String },
    /// Up/Down with a single section in scope. The caller may route this to
    /// speech as a notice.
    NoOtherSection,
    /// Nothing to do (empty scope, single candidate, or stale state).
    Unchanged,
}

/// Resolves directional key input into focus changes over the current tree.
///
/// Traversal re-scans the candidate set on every call rather than keeping a
/// prebuilt index; the tree is small and replaced wholesale on transitions,
/// so a stale index is a bigger hazard than the walk is a cost.
#[derive(Debug, Default)]
pub struct FocusGraph {
    sections: Vec<FocusableSection>,
    focused: Option<ElementId>,
}

impl FocusGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered section list. Idempotent.
    pub fn register_sections(&mut self, sections: Vec<FocusableSection>) {
        self.sections = sections;
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Forget the focused element. Ids are positional, so focus held across a
    /// screen transition could alias an unrelated element in the new tree.
    pub fn clear(&mut self) {
        self.focused = None;
    }

    /// Move focus to the first candidate of the given container. Used for the
    /// deterministic handoff after screen and modal transitions.
    pub fn anchor(&mut self, tree: &ElementTree, scope: Scope) -> FocusOutcome {
        let candidates = tree.candidates(scope);
        match candidates.first() {
            Some(first) => self.move_to(tree, first),
            None => {
                self.focused = None;
                FocusOutcome::Unchanged
            }
        }
    }

    /// Like `anchor`, but prefers a specific element (focus restore after a
    /// modal closes). Falls back to the first candidate if the preferred
    /// element is gone, disabled, or hidden.
    pub fn anchor_restore(
        &mut self,
        tree: &ElementTree,
        scope: Scope,
        prefer: Option<ElementId>,
    ) -> FocusOutcome {
        if let Some(id) = prefer {
            let candidates = tree.candidates(scope);
            if let Some(el) = candidates.iter().find(|e| e.id == id) {
                return self.move_to(tree, el);
            }
        }
        self.anchor(tree, scope)
    }

    /// Resolve one directional key press against the current tree.
    ///
    /// The candidate set is restricted to the modal container when a modal is
    /// open and to the main container otherwise. Left/Right wrap in document
    /// order; Up/Down jump between distinct sections.
    pub fn on_directional_key(
        &mut self,
        tree: &ElementTree,
        direction: Direction,
        modal_open: bool,
    ) -> FocusOutcome {
        let scope = if modal_open { Scope::Modal } else { Scope::Main };
        let candidates = tree.candidates(scope);
        if candidates.len() < 2 {
            return FocusOutcome::Unchanged;
        }

        match direction {
            Direction::Left | Direction::Right => {
                let current = self
                    .focused
                    .and_then(|id| candidates.iter().position(|e| e.id == id));
                let len = candidates.len();
                let next = match (current, direction) {
                    (Some(i), Direction::Right) => (i + 1) % len,
                    (Some(i), Direction::Left) => (i + len - 1) % len,
                    (None, Direction::Right) => 0,
                    (None, _) => len - 1,
                    (Some(_), _) => unreachable!("outer match restricts to Left/Right"),
                };
                self.move_to(tree, candidates[next])
            }
            Direction::Up | Direction::Down => self.move_between_sections(tree, &candidates, direction),
        }
    }

    fn move_between_sections(
        &mut self,
        tree: &ElementTree,
        candidates: &[&Element],
        direction: Direction,
    ) -> FocusOutcome {
        // Distinct section markers in candidate order. Elements without a
        // marker form one shared unsectioned group.
        let mut groups: Vec<(Option<SectionId>, usize)> = Vec::new();
        for (i, el) in candidates.iter().enumerate() {
            if !groups.iter().any(|(s, _)| *s == el.section) {
                groups.push((el.section, i));
            }
        }
        if groups.len() < 2 {
            return FocusOutcome::NoOtherSection;
        }

        let current_section = self
            .focused
            .and_then(|id| candidates.iter().find(|e| e.id == id))
            .map(|e| e.section);
        let current_group = current_section.and_then(|s| groups.iter().position(|(g, _)| *g == s));

        let target_group = match (current_group, direction) {
            (Some(g), Direction::Down) => (g + 1) % groups.len(),
            (Some(g), Direction::Up) => (g + groups.len() - 1) % groups.len(),
            (None, Direction::Down) => 0,
            (None, _) => groups.len() - 1,
            (Some(_), _) => unreachable!("caller restricts to Up/Down"),
        };
        let first_of_group = groups[target_group].1;
        self.move_to(tree, candidates[first_of_group])
    }

    /// Commit the move and compose the announcement. The section label is
    /// prepended exactly once, only when the enclosing section changed.
    fn move_to(&mut self, tree: &ElementTree, target: &Element) -> FocusOutcome {
        let previous_section = self
            .focused
            .and_then(|id| tree.get(id))
            .and_then(|e| e.section);
        let crossed = target.section.is_some() && target.section != previous_section;

        let mut spoken = String::new();
        if crossed {
            if let Some(label) = self.section_label(target.section) {
                spoken.push_str(label);
                spoken.push_str(". ");
            }
        }
        spoken.push_str(target.spoken_label());

        self.focused = Some(target.id);
        FocusOutcome::Moved {
            id: target.id,
            spoken,
        }
    }

    fn section_label(&self, id: Option<SectionId>) -> Option<&str> {
        let id = id?;
        self.sections
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.label.as_str())
    }
}
