use std::collections::{BTreeMap, HashMap};

/// How an event tile affects the model. Drives tile ordering and tile colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    Transition,
    Cost,
    Utility,
    Disutility,
    Both,
    Other,
}

impl ImpactType {
    /// Exact, case-sensitive match on the model's `impact_type` token.
    pub fn from_token(token: &str) -> Self {
        match token {
            "transition" => Self::Transition,
            "cost" => Self::Cost,
            "utility" => Self::Utility,
            "disutility" => Self::Disutility,
            "both" => Self::Both,
            _ => Self::Other,
        }
    }

    /// Sort rank for tiles inside a node. Lower ranks come first.
    pub fn rank(self) -> u8 {
        match self {
            Self::Transition => 0,
            Self::Cost => 1,
            Self::Utility => 2,
            Self::Disutility => 3,
            Self::Both | Self::Other => 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub name: String,
    pub impact: ImpactType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub tiles: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub key: String,
    pub from: String,
    pub to: String,
    pub is_loop: bool,
}

impl Edge {
    pub fn new(from: &str, to: &str, key: String) -> Self {
        Self {
            key,
            from: from.to_string(),
            to: to.to_string(),
            is_loop: from == to,
        }
    }
}

pub fn edge_key(from: &str, to: &str) -> String {
    format!("{from}\u{2192}{to}")
}

/// Row-grouped nodes plus the directed edges between them.
///
/// Rows keep their declared order; blank slots are dropped on insertion and a
/// name that already sits in an earlier slot is not placed a second time.
/// Edges may reference names that are not in any row; those are skipped at
/// routing time rather than rejected here.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub rows: Vec<Vec<String>>,
    pub nodes: BTreeMap<String, Node>,
    pub edges: Vec<Edge>,
    pair_counts: HashMap<(String, String), usize>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_row<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut row = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || self.nodes.contains_key(name) {
                continue;
            }
            self.ensure_node(name, None);
            row.push(name.to_string());
        }
        self.rows.push(row);
    }

    pub fn ensure_node(&mut self, id: &str, label: Option<String>) {
        let entry = self.nodes.entry(id.to_string()).or_insert(Node {
            id: id.to_string(),
            label: id.to_string(),
            tiles: Vec::new(),
        });
        if let Some(label) = label {
            entry.label = label;
        }
    }

    pub fn set_tiles(&mut self, id: &str, tiles: Vec<Tile>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.tiles = tiles;
        }
    }

    /// Appends one edge per destination, keeping adjacency order.
    pub fn add_transitions<I, S>(&mut self, from: &str, to: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for dest in to {
            self.add_edge(from, dest.as_ref());
        }
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from = from.trim();
        let to = to.trim();
        if from.is_empty() || to.is_empty() {
            return;
        }
        let seen = self
            .pair_counts
            .entry((from.to_string(), to.to_string()))
            .or_insert(0);
        let key = if *seen == 0 {
            edge_key(from, to)
        } else {
            format!("{}#{}", edge_key(from, to), seen)
        };
        *seen += 1;
        self.edges.push(Edge::new(from, to, key));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn tile_count(&self, id: &str) -> usize {
        self.nodes.get(id).map(|node| node.tiles.len()).unwrap_or(0)
    }

    /// Position of `id` in the palette order (row-major placement order).
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.rows.iter().flatten().position(|name| name == id)
    }
}
