use crate::screens::Action;

/// Identity of an interactive element within one build of the tree.
///
/// Ids are positional: the tree is replaced wholesale on every screen or modal
/// transition and the builders assign ids in document order, so an id captured
/// for focus restore stays valid for as long as the same screen is mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// Section-grouping annotation declared by the screen that owns the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SectionId(pub &'static str);

/// Which container an element lives in. Modal chrome never mixes with the
/// main screen's candidate set and vice versa.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Main,
    Modal,
}

#[derive(Clone, Debug)]
pub struct Element {
    pub id: ElementId,
    pub label: String,
    /// Spoken text that supersedes the visible label when present.
    pub spoken_override: Option<String>,
    pub enabled: bool,
    pub visible: bool,
    pub interactive: bool,
    /// Nearest enclosing section marker, if any.
    pub section: Option<SectionId>,
    pub scope: Scope,
    pub action: Action,
}

impl Element {
    pub fn spoken_label(&self) -> &str {
        self.spoken_override.as_deref().unwrap_or(&self.label)
    }
}

/// Declaratively annotated element set in document order.
///
/// Screens replace this wholesale on mount; there is no partial diffing, and
/// traversal re-scans it on every key press rather than keeping an index.
#[derive(Clone, Debug, Default)]
pub struct ElementTree {
    pub elements: Vec<Element>,
}

impl ElementTree {
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// All enabled, visible, interactive elements inside the given container,
    /// in document order. Computed fresh on each call.
    pub fn candidates(&self, scope: Scope) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| e.scope == scope && e.interactive && e.enabled && e.visible)
            .collect()
    }

    pub fn has_scope(&self, scope: Scope) -> bool {
        self.elements.iter().any(|e| e.scope == scope)
    }
}

/// Imperative builder used by the screen definitions.
pub struct TreeBuilder {
    elements: Vec<Element>,
    next_id: u64,
    scope: Scope,
    section: Option<SectionId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            next_id: 0,
            scope: Scope::Main,
            section: None,
        }
    }

    /// Switch subsequent items into the modal container.
    pub fn begin_modal(&mut self) {
        self.scope = Scope::Modal;
        self.section = None;
    }

    /// Subsequent items carry this section marker.
    pub fn section(&mut self, id: SectionId) {
        self.section = Some(id);
    }

    pub fn end_section(&mut self) {
        self.section = None;
    }

    pub fn item(&mut self, label: impl Into<String>, action: Action) -> ElementId {
        self.push(label.into(), None, true, true, action)
    }

    pub fn item_spoken(
        &mut self,
        label: impl Into<String>,
        spoken: impl Into<String>,
        action: Action,
    ) -> ElementId {
        self.push(label.into(), Some(spoken.into()), true, true, action)
    }

    pub fn item_disabled(&mut self, label: impl Into<String>, action: Action) -> ElementId {
        self.push(label.into(), None, false, true, action)
    }

    /// Visible text that is not part of the focus order.
    pub fn static_text(&mut self, label: impl Into<String>) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.push(Element {
            id,
            label: label.into(),
            spoken_override: None,
            enabled: false,
            visible: true,
            interactive: false,
            section: self.section,
            scope: self.scope,
            action: Action::None,
        });
        id
    }

    fn push(
        &mut self,
        label: String,
        spoken_override: Option<String>,
        enabled: bool,
        visible: bool,
        action: Action,
    ) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.push(Element {
            id,
            label,
            spoken_override,
            enabled,
            visible,
            interactive: true,
            section: self.section,
            scope: self.scope,
            action,
        });
        id
    }

    pub fn build(self) -> ElementTree {
        ElementTree {
            elements: self.elements,
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
