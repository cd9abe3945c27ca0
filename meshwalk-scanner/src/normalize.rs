//! Turns fetched status documents into [`NodeRecord`]s.
//!
//! Only documents carrying both coordinates produce a record. Tunnel links
//! reported by a supernode are relabeled so map renderers can tell them
//! apart from ordinary tunnels.

use serde_json::{Map, Value};

use crate::document::{RawDocument, SUPERNODE_TUNNEL_LINK_TYPE, TUNNEL_LINK_TYPE, is_truthy};
use crate::record::NodeRecord;

/// How a successfully fetched document counts toward the walk totals.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Named and geolocated.
    Mapped(NodeRecord),
    /// Named, but without a usable location.
    NonMapped,
    /// No self-reported name; counted nowhere.
    Anonymous,
}

pub fn classify(doc: &RawDocument) -> Classification {
    if doc.identity().is_none() {
        return Classification::Anonymous;
    }
    match normalize(doc) {
        Some(record) => Classification::Mapped(record),
        None => Classification::NonMapped,
    }
}

/// Build the output record for `doc`, or `None` if it lacks a location.
pub fn normalize(doc: &RawDocument) -> Option<NodeRecord> {
    if !doc.has_location() {
        return None;
    }

    let mut link_info = match &doc.link_info {
        Some(value) if is_truthy(Some(value)) => value.clone(),
        _ => Value::Object(Map::new()),
    };
    if doc.is_supernode() {
        relabel_tunnels(&mut link_info);
    }

    Some(NodeRecord {
        node: doc.node.clone(),
        lastseen: doc.lastseen.clone(),
        lat: doc.lat.clone(),
        lon: doc.lon.clone(),
        meshrf: doc
            .meshrf
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new())),
        chanbw: doc.chanbw.clone(),
        node_details: doc.node_details.clone().unwrap_or_default(),
        interfaces: doc.interfaces.clone(),
        link_info: flatten(link_info),
        lqm: doc.lqm.clone(),
    })
}

fn relabel_tunnels(link_info: &mut Value) {
    match link_info {
        Value::Object(map) => map.values_mut().for_each(relabel_tunnel),
        Value::Array(items) => items.iter_mut().for_each(relabel_tunnel),
        _ => {}
    }
}

fn relabel_tunnel(entry: &mut Value) {
    if let Some(link_type) = entry.get_mut("linkType")
        && *link_type == TUNNEL_LINK_TYPE
    {
        *link_type = Value::String(SUPERNODE_TUNNEL_LINK_TYPE.to_string());
    }
}

// Keyed by neighbor address; the keys carry nothing the values don't.
fn flatten(link_info: Value) -> Vec<Value> {
    match link_info {
        Value::Object(map) => map.into_iter().map(|(_, entry)| entry).collect(),
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}
