//! Query resolution and section highlighting
//!
//! A search always resets every indexed section to the default tint before
//! looking anything up, so at most one section is highlighted afterwards
//! and repeating a search gives the same result.

use crate::category::CategoryTable;
use crate::color::Tint;
use crate::index::NodeIndex;
use crate::query::Query;
use crate::scene::NodeId;
use crate::traits::Tintable;
use serde::{Deserialize, Serialize};

/// Tints used for idle and highlighted sections
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightPolicy {
    pub default_tint: Tint,
    pub highlight_tint: Tint,
}

impl Default for HighlightPolicy {
    fn default() -> Self {
        Self {
            default_tint: Tint::from_hex(0x999999),
            highlight_tint: Tint::from_hex(0x4dff4d),
        }
    }
}

/// Outcome of one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The query mapped to a section present in the index
    Highlighted {
        query: Query,
        node_name: String,
        node: NodeId,
    },
    /// Unknown category, or its section is not in the index (yet)
    NoMatch { query: Query },
}

impl Resolution {
    pub fn query(&self) -> &Query {
        match self {
            Resolution::Highlighted { query, .. } | Resolution::NoMatch { query } => query,
        }
    }

    pub fn highlighted_node(&self) -> Option<NodeId> {
        match self {
            Resolution::Highlighted { node, .. } => Some(*node),
            Resolution::NoMatch { .. } => None,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Highlighted { query, node_name, .. } => {
                write!(f, "{} highlighted for '{}'", node_name, query)
            }
            Resolution::NoMatch { query } => write!(f, "no matching section for '{}'", query),
        }
    }
}

/// Reset every indexed section, then highlight the one `text`/`selection` maps to.
///
/// Only tints of nodes held by `index` are touched.
pub fn resolve_and_highlight<T>(
    text: &str,
    selection: &str,
    index: &NodeIndex,
    categories: &CategoryTable,
    policy: &HighlightPolicy,
    target: &mut T,
) -> Resolution
where
    T: Tintable + ?Sized,
{
    let query = Query::from_inputs(text, selection);

    for id in index.node_ids() {
        target.set_tint(id, policy.default_tint);
    }

    let found = categories
        .lookup(query.as_str())
        .and_then(|name| index.get(name).map(|id| (name, id)));

    match found {
        Some((name, id)) => {
            target.set_tint(id, policy.highlight_tint);
            log::info!("{} color changed to {}", name, policy.highlight_tint);
            Resolution::Highlighted {
                query,
                node_name: name.to_string(),
                node: id,
            }
        }
        None => {
            log::info!("No matching section for query: '{}'", query);
            Resolution::NoMatch { query }
        }
    }
}
