use crate::ir::Edge;

/// Which node, if any, the user has focused. Only the focused node's outgoing
/// edges are routed and drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(String),
}

impl Selection {
    /// Clicking the selected node toggles it off; any other node takes over.
    pub fn click_node(&mut self, id: &str) {
        *self = match &*self {
            Selection::Selected(current) if current == id => Selection::Unselected,
            _ => Selection::Selected(id.to_string()),
        };
    }

    pub fn click_background(&mut self) {
        *self = Selection::Unselected;
    }

    pub fn clear(&mut self) {
        *self = Selection::Unselected;
    }

    pub fn selected(&self) -> Option<&str> {
        match self {
            Selection::Selected(id) => Some(id),
            Selection::Unselected => None,
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected() == Some(id)
    }

    /// Edges leaving the selected node, in declared order.
    pub fn visible_edges<'a>(&self, edges: &'a [Edge]) -> Vec<&'a Edge> {
        match self.selected() {
            Some(id) => edges.iter().filter(|edge| edge.from == id).collect(),
            None => Vec::new(),
        }
    }
}
