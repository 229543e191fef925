//! Loads the backend decision-model document into a [`Diagram`].
//!
//! The document is the model bundle the backend serves: health states, a
//! transition adjacency, an optional row grouping and the event definitions
//! that become tiles inside each state box. Both strict JSON and JSON5 are
//! accepted. Shape problems inside the document are normalized away; only a
//! document that cannot be read at all, or that names no states, is an error.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::ir::{Diagram, ImpactType, Tile};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model is neither valid JSON nor JSON5: {0}")]
    Syntax(String),
    #[error("model has an unexpected shape: {0}")]
    Shape(String),
    #[error("model defines no states (expected `state_diagram` or `health_states`)")]
    NoStates,
}

#[derive(Debug, Default, Deserialize)]
struct ModelFile {
    #[serde(default)]
    health_states: Vec<Option<String>>,
    #[serde(default)]
    state_labels: BTreeMap<String, String>,
    transition_matrix_data: Option<TransitionMatrixData>,
    transitions: Option<Map<String, Value>>,
    state_diagram: Option<Vec<Option<Vec<Option<String>>>>>,
    #[serde(default)]
    event_data: Vec<EventRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct TransitionMatrixData {
    #[serde(default)]
    metadata: TransitionMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct TransitionMetadata {
    transitions: Option<Map<String, Value>>,
    state_diagram: Option<Vec<Option<Vec<Option<String>>>>>,
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    event_name: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    metadata: EventMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct EventMetadata {
    #[serde(default)]
    applies_to_states: Vec<String>,
    impact_type: Option<String>,
    enabled: Option<bool>,
}

pub fn parse_model(input: &str) -> Result<Diagram, ModelError> {
    let value = match serde_json::from_str::<Value>(input) {
        Ok(value) => value,
        Err(json_err) => json5::from_str::<Value>(input)
            .map_err(|_| ModelError::Syntax(json_err.to_string()))?,
    };
    model_from_value(value)
}

pub fn model_from_value(value: Value) -> Result<Diagram, ModelError> {
    let mut file: ModelFile =
        serde_json::from_value(value).map_err(|err| ModelError::Shape(err.to_string()))?;

    let metadata = file
        .transition_matrix_data
        .take()
        .map(|data| data.metadata)
        .unwrap_or_default();
    let rows = metadata.state_diagram.or(file.state_diagram.take());
    let transitions = metadata.transitions.or(file.transitions.take());

    let mut diagram = Diagram::new();
    match rows {
        Some(rows) => {
            for row in rows {
                diagram.push_row(row.unwrap_or_default().into_iter().flatten());
            }
        }
        None => {
            for state in file.health_states.iter().flatten() {
                diagram.push_row([state]);
            }
        }
    }
    if diagram.nodes.is_empty() {
        return Err(ModelError::NoStates);
    }

    for (id, label) in &file.state_labels {
        if diagram.contains(id) {
            diagram.ensure_node(id, Some(label.clone()));
        }
    }

    for (id, tiles) in event_tiles(&diagram, &file.event_data) {
        diagram.set_tiles(&id, tiles);
    }

    if let Some(transitions) = transitions {
        for (from, targets) in &transitions {
            let Some(targets) = targets.as_array() else {
                log::debug!(state = from.as_str(); "Ignoring non-list transition entry");
                continue;
            };
            diagram.add_transitions(from, targets.iter().filter_map(Value::as_str));
        }
    }

    log::debug!(
        rows = diagram.rows.len(),
        nodes = diagram.nodes.len(),
        edges = diagram.edges.len();
        "Model loaded"
    );
    Ok(diagram)
}

/// Enabled events grouped under each placed state, ordered by impact rank,
/// then source path, then event name.
fn event_tiles(diagram: &Diagram, events: &[EventRecord]) -> BTreeMap<String, Vec<Tile>> {
    let mut by_state: BTreeMap<String, Vec<&EventRecord>> = BTreeMap::new();
    for event in events {
        if event.metadata.enabled == Some(false) {
            continue;
        }
        for state in &event.metadata.applies_to_states {
            if diagram.contains(state) {
                by_state.entry(state.clone()).or_default().push(event);
            }
        }
    }

    by_state
        .into_iter()
        .map(|(state, mut list)| {
            list.sort_by(|a, b| compare_events(a, b));
            let tiles = list
                .into_iter()
                .map(|event| Tile {
                    name: event.event_name.clone(),
                    impact: impact_of(event),
                })
                .collect();
            (state, tiles)
        })
        .collect()
}

fn impact_of(event: &EventRecord) -> ImpactType {
    event
        .metadata
        .impact_type
        .as_deref()
        .map(ImpactType::from_token)
        .unwrap_or(ImpactType::Other)
}

fn compare_events(a: &EventRecord, b: &EventRecord) -> Ordering {
    impact_of(a)
        .rank()
        .cmp(&impact_of(b).rank())
        .then_with(|| a.path.cmp(&b.path))
        .then_with(|| a.event_name.cmp(&b.event_name))
}
