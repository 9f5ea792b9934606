//! Read-only graph view of a resolved production chain
//!
//! Vertices are item names; an edge `consumer -> ingredient` carries the
//! demand that consumer places on the ingredient. The graph is projected from
//! a finished [`Resolution`] and never feeds back into resolution.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::resolver::Resolution;

#[derive(Debug, Clone, Default)]
struct Vertex {
    rate: f64,
    /// ingredient -> demand placed on it by this vertex
    ingredients: BTreeMap<String, f64>,
    consumers: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DemandGraph {
    vertices: BTreeMap<String, Vertex>,
}

impl DemandGraph {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        let mut vertices: BTreeMap<String, Vertex> = resolution
            .demands
            .iter()
            .map(|(name, &rate)| {
                (
                    name.clone(),
                    Vertex {
                        rate,
                        ..Vertex::default()
                    },
                )
            })
            .collect();

        for edge in &resolution.contributions {
            if let Some(vertex) = vertices.get_mut(&edge.consumer) {
                *vertex.ingredients.entry(edge.ingredient.clone()).or_default() += edge.rate;
            }
            if let Some(vertex) = vertices.get_mut(&edge.ingredient) {
                if !vertex.consumers.contains(&edge.consumer) {
                    vertex.consumers.push(edge.consumer.clone());
                }
            }
        }

        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn rate(&self, item: &str) -> Option<f64> {
        self.vertices.get(item).map(|v| v.rate)
    }

    /// Ingredients of `item` with the demand `item` places on each.
    pub fn ingredients(&self, item: &str) -> Vec<(&str, f64)> {
        self.vertices
            .get(item)
            .map(|v| {
                v.ingredients
                    .iter()
                    .map(|(name, &rate)| (name.as_str(), rate))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Items that consume `item`, in the order they were first seen.
    pub fn consumers(&self, item: &str) -> Vec<&str> {
        self.vertices
            .get(item)
            .map(|v| v.consumers.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Sum of the demand every consumer places on `item`.
    pub fn inbound_rate(&self, item: &str) -> f64 {
        self.vertices
            .values()
            .filter_map(|v| v.ingredients.get(item))
            .sum()
    }

    /// Items with no ingredients: what has to be mined.
    pub fn raw_items(&self) -> Vec<&str> {
        self.vertices
            .iter()
            .filter(|(_, v)| v.ingredients.is_empty())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Render as a Graphviz digraph.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph production {\n    rankdir=LR;\n");
        for (name, vertex) in &self.vertices {
            let id = dot_escape(name);
            let _ = writeln!(out, "    \"{}\" [label=\"{}\\n{:.3}/s\"];", id, id, vertex.rate);
        }
        for (name, vertex) in &self.vertices {
            for (ingredient, rate) in &vertex.ingredients {
                let _ = writeln!(
                    out,
                    "    \"{}\" -> \"{}\" [label=\"{:.3}/s\"];",
                    dot_escape(ingredient),
                    dot_escape(name),
                    rate
                );
            }
        }
        out.push_str("}\n");
        out
    }
}

/// Escape a name for use inside a double-quoted DOT string.
fn dot_escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}
