use crate::config::LayoutConfig;
use crate::ir::Diagram;
use crate::layout::{Layout, MeasuredHeights, compute_layout};
use crate::selection::Selection;

/// Long-lived state behind one rendered diagram.
///
/// Inputs arrive one at a time (resize notifications, height measurements,
/// clicks) and only mark the session dirty; the layout is rebuilt lazily the
/// next time [`DiagramSession::layout`] is called, so a burst of resize events
/// costs one pass with the latest width.
#[derive(Debug, Clone)]
pub struct DiagramSession {
    diagram: Diagram,
    config: LayoutConfig,
    viewport_width: f32,
    measured: MeasuredHeights,
    selection: Selection,
    cached: Option<Layout>,
    passes: usize,
}

impl DiagramSession {
    pub fn new(diagram: Diagram, config: LayoutConfig) -> Self {
        Self {
            diagram,
            config,
            viewport_width: 0.0,
            measured: MeasuredHeights::new(),
            selection: Selection::default(),
            cached: None,
            passes: 0,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn measured(&self) -> &MeasuredHeights {
        &self.measured
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Number of layout passes run so far.
    pub fn pass_count(&self) -> usize {
        self.passes
    }

    pub fn is_dirty(&self) -> bool {
        self.cached.is_none()
    }

    fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Stores the latest viewport width. Unusable values read as "unknown" (0).
    pub fn set_viewport_width(&mut self, width: f32) -> bool {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        if width == self.viewport_width {
            return false;
        }
        self.viewport_width = width;
        self.invalidate();
        true
    }

    /// Feeds one rendered height back. Returns `true` if a relayout is due.
    pub fn record_measured_height(&mut self, id: &str, height: f32) -> bool {
        if !self.diagram.contains(id) {
            log::trace!(node = id; "Measured height for unknown node ignored");
            return false;
        }
        let changed = self.measured.record(id, height);
        if changed {
            self.invalidate();
        }
        changed
    }

    pub fn record_measured_heights<I, S>(&mut self, entries: I) -> bool
    where
        I: IntoIterator<Item = (S, f32)>,
        S: AsRef<str>,
    {
        let mut changed = false;
        for (id, height) in entries {
            changed |= self.record_measured_height(id.as_ref(), height);
        }
        changed
    }

    pub fn click_node(&mut self, id: &str) {
        let before = self.selection.clone();
        self.selection.click_node(id);
        if self.selection != before {
            self.invalidate();
        }
    }

    pub fn click_background(&mut self) {
        if self.selection != Selection::Unselected {
            self.selection.click_background();
            self.invalidate();
        }
    }

    /// Swaps in a new diagram: selection resets, cached heights survive only
    /// for nodes that still exist.
    pub fn reload(&mut self, diagram: Diagram) {
        self.measured.retain_nodes(|id| diagram.contains(id));
        self.diagram = diagram;
        self.selection.clear();
        self.invalidate();
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
        self.invalidate();
    }

    /// Current layout, recomputed only if an input changed since the last call.
    pub fn layout(&mut self) -> &Layout {
        let layout = match self.cached.take() {
            Some(layout) => layout,
            None => {
                self.passes += 1;
                log::debug!(pass = self.passes, viewport = self.viewport_width; "Recomputing layout");
                compute_layout(
                    &self.diagram,
                    &self.measured,
                    self.viewport_width,
                    &self.selection,
                    &self.config,
                )
            }
        };
        self.cached.insert(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DiagramSession {
        let mut diagram = Diagram::new();
        diagram.push_row(["A", "B"]);
        diagram.push_row(["C"]);
        diagram.add_transitions("A", ["B", "C", "A"]);
        diagram.add_transitions("B", ["C"]);
        DiagramSession::new(diagram, LayoutConfig::default())
    }

    #[test]
    fn same_measurement_twice_is_a_no_op() {
        let mut session = session();
        session.set_viewport_width(1000.0);
        let before = session.layout().clone();
        assert_eq!(session.pass_count(), 1);

        assert!(session.record_measured_height("A", 260.0));
        let after = session.layout().clone();
        assert_eq!(session.pass_count(), 2);
        assert_ne!(before, after);

        assert!(!session.record_measured_height("A", 260.0));
        assert!(!session.is_dirty());
        session.layout();
        assert_eq!(session.pass_count(), 2);
    }

    #[test]
    fn resize_burst_costs_one_pass() {
        let mut session = session();
        session.layout();
        for width in [400.0, 600.0, 900.0, 1400.0] {
            session.set_viewport_width(width);
        }
        assert!(!session.set_viewport_width(1400.0));
        let layout = session.layout().clone();
        assert_eq!(session.pass_count(), 2);
        assert!(layout.canvas.width >= 1400.0);
    }

    #[test]
    fn negative_viewport_reads_as_unknown() {
        let mut session = session();
        session.set_viewport_width(-50.0);
        assert_eq!(session.viewport_width(), 0.0);
        let width = session.layout().node_width;
        assert_eq!(width, LayoutConfig::default().grid.min_node_width);
    }

    #[test]
    fn selection_gates_edges() {
        let mut session = session();
        session.set_viewport_width(1000.0);
        assert!(session.layout().edges.is_empty());

        session.click_node("A");
        assert_eq!(session.layout().edges.len(), 3);

        session.click_background();
        assert!(session.layout().edges.is_empty());
        assert_eq!(session.selection(), &Selection::Unselected);
    }

    #[test]
    fn reload_clears_selection_and_prunes_heights() {
        let mut session = session();
        session.record_measured_heights([("A", 200.0), ("C", 220.0)]);
        session.click_node("A");

        let mut next = Diagram::new();
        next.push_row(["A", "D"]);
        session.reload(next);

        assert_eq!(session.selection(), &Selection::Unselected);
        assert_eq!(session.measured().get("A"), Some(200.0));
        assert_eq!(session.measured().get("C"), None);
        assert_eq!(session.layout().nodes["A"].height, 200.0);
    }

    #[test]
    fn unknown_node_measurement_is_ignored() {
        let mut session = session();
        assert!(!session.record_measured_height("Nope", 100.0));
        assert!(session.measured().is_empty());
    }
}
