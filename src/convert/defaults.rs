//! Default ids, names and positions, applied once per entity before conversion.

use crate::diagnostics::Diagnostics;
use crate::model::{Entity, Platform, Position};
use ahash::AHashSet;

const ORIGIN_X: f64 = 250.0;
const ORIGIN_Y: f64 = 300.0;
const SPACING_X: f64 = 220.0;

/// Id and name an entity will carry in the target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
}

impl Identity {
    /// Numeric form of the id, for module-graph targets.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }
}

/// Canvas position for the `index`-th entity when the source had none.
pub fn default_position(index: usize) -> Position {
    Position::new(ORIGIN_X + index as f64 * SPACING_X, ORIGIN_Y)
}

/// Human label for a type string: `http:ActionSendData` -> `Action Send Data`.
pub fn type_label(entity_type: &str) -> String {
    let last = entity_type
        .rsplit(|c: char| c == ':' || c == '.')
        .next()
        .unwrap_or(entity_type);

    let mut words: Vec<String> = Vec::new();
    for part in last.split(|c: char| c == '-' || c == '_' || c.is_whitespace()) {
        let mut word = String::new();
        for c in part.chars() {
            if c.is_uppercase() && !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
            word.push(c);
        }
        if !word.is_empty() {
            words.push(word);
        }
    }

    let label = words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if label.is_empty() { "Entity".to_string() } else { label }
}

/// Name for an entity that came without one.
pub fn derived_name(entity_type: &str, id: &str) -> String {
    format!("{} {}", type_label(entity_type), id)
}

/// Computes the target identity of every entity, in traversal order.
///
/// Module-graph ids are `1..N`; node-graph ids are `node-<n>`. With
/// `preserve_ids`, source ids are reused where the target id type allows it;
/// a node id that is not a positive integer (or repeats one already taken)
/// falls back to the next free number with a warning. Node-graph names are
/// made unique by appending ` 1`, ` 2`, ...
pub fn assign_identities(
    entities: &[Entity],
    target: Platform,
    preserve_ids: bool,
    diagnostics: &mut Diagnostics,
) -> Vec<Identity> {
    let ids = match target {
        Platform::ModuleGraph => numeric_ids(entities, preserve_ids, diagnostics),
        Platform::NodeGraph => entities
            .iter()
            .enumerate()
            .map(|(i, e)| {
                if preserve_ids && !e.id.is_empty() {
                    e.id.clone()
                } else {
                    format!("node-{}", i + 1)
                }
            })
            .collect(),
    };

    let mut taken: AHashSet<String> = AHashSet::new();
    entities
        .iter()
        .zip(ids)
        .map(|(entity, id)| {
            let base = if entity.name.trim().is_empty() {
                derived_name(&entity.entity_type, &entity.id)
            } else {
                entity.name.clone()
            };
            let name = match target {
                Platform::NodeGraph => unique_name(&base, &mut taken),
                Platform::ModuleGraph => base,
            };
            Identity { id, name }
        })
        .collect()
}

fn numeric_ids(entities: &[Entity], preserve_ids: bool, diagnostics: &mut Diagnostics) -> Vec<String> {
    if !preserve_ids {
        return (1..=entities.len()).map(|n| n.to_string()).collect();
    }

    let mut used: AHashSet<u64> = AHashSet::new();
    let mut claimed: Vec<Option<u64>> = Vec::with_capacity(entities.len());
    for entity in entities {
        let parsed = entity.id.trim().parse::<u64>().ok().filter(|&n| n > 0);
        claimed.push(parsed.filter(|n| used.insert(*n)));
    }

    let mut next = 1;
    entities
        .iter()
        .zip(claimed)
        .map(|(entity, claim)| {
            let id = match claim {
                Some(n) => n,
                None => {
                    while used.contains(&next) {
                        next += 1;
                    }
                    used.insert(next);
                    diagnostics.warn(format!(
                        "Id '{}' of entity '{}' cannot be kept as a numeric id; using {}",
                        entity.id, entity.name, next
                    ));
                    next
                }
            };
            id.to_string()
        })
        .collect()
}

fn unique_name(base: &str, taken: &mut AHashSet<String>) -> String {
    if taken.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{} {}", base, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Applies default position to `entity` if it has none.
pub fn ensure_position(entity: &mut Entity, index: usize) {
    if entity.position.is_none() {
        entity.position = Some(default_position(index));
    }
}
