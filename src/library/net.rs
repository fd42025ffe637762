//! Nets, designators and layout: the board-level passes run once the
//! circuit is elaborated.

use hashbrown::{HashMap, HashSet};

use super::{
    ELECTRICAL, HasDesignator, HasDesignatorDefined, HasDesignatorPrefix, HasOverriddenName,
    HasPcbLayout, HasPcbPosition, HasPcbPositionDefined, NET, PAD,
};
use crate::graph::Graph;
use crate::model::NodeId;
use crate::Result;

const ELLIPSIS: &str = "...";

// ============================================================================
// Nets
// ============================================================================

/// Make sure every connectivity class of `Electrical` interfaces under
/// `roots` carries a [`NET`]. Returns one net per class, in the order the
/// classes were first met.
pub fn collect_nets(graph: &mut Graph, roots: &[NodeId]) -> Result<Vec<NodeId>> {
    let mut electricals = Vec::new();
    for root in roots {
        if graph.node(*root)?.is_a(&ELECTRICAL) {
            electricals.push(*root);
        }
        electricals.extend(graph.nodes_of_type(*root, &ELECTRICAL)?);
    }

    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut nets = Vec::new();
    for electrical in electricals {
        if !seen.insert(electrical) {
            continue;
        }
        let mut class = vec![electrical];
        class.extend(graph.connected_interfaces(electrical)?);
        seen.extend(class.iter().copied());

        let existing: Vec<NodeId> = class
            .iter()
            .filter_map(|member| net_of_part(graph, *member))
            .collect();
        let net = match existing.as_slice() {
            [] => {
                let net = graph.create(&NET)?;
                let part_of = graph.child(net, "part_of")?;
                graph.connect(part_of, electrical)?;
                tracing::debug!(net = %net, class = class.len(), "net created");
                net
            }
            [net] => *net,
            [net, ..] => {
                tracing::debug!(net = %net, nets = existing.len(), "several nets on one class, keeping the first");
                *net
            }
        };
        nets.push(net);
    }
    Ok(nets)
}

/// The net owning `electrical` as its `part_of` interface.
fn net_of_part(graph: &Graph, electrical: NodeId) -> Option<NodeId> {
    let (parent, name) = graph.parent(electrical).ok()??;
    (name == "part_of" && graph.node(parent).ok()?.is_a(&NET)).then_some(parent)
}

/// The component and pin number of the pad `electrical` belongs to.
pub fn pad_owner(graph: &Graph, electrical: NodeId) -> Option<(NodeId, String)> {
    let (pad, name) = graph.parent(electrical).ok()??;
    if name != "net" || !graph.node(pad).ok()?.is_a(&PAD) {
        return None;
    }
    let (footprint, pin) = graph.parent(pad).ok()??;
    let (component, _) = graph.parent(footprint).ok()??;
    Some((component, pin))
}

/// Deterministic name of `net`.
///
/// An overridden name wins. Otherwise the sorted `designator-pin` pairs of
/// every pad on the net, joined with `-` and cut to the configured limit.
/// Nets without designated pads fall back to their hierarchical name.
pub fn net_name(graph: &Graph, net: NodeId) -> Result<String> {
    if graph.has_trait::<dyn HasOverriddenName>(net) {
        return Ok(graph.get_trait::<dyn HasOverriddenName>(net)?.name().to_string());
    }

    let part_of = graph.child(net, "part_of")?;
    let mut class = vec![part_of];
    class.extend(graph.connected_interfaces(part_of)?);

    let mut segments: Vec<String> = class
        .into_iter()
        .filter_map(|member| pad_owner(graph, member))
        .filter_map(|(component, pin)| {
            let designator = graph.get_trait::<dyn HasDesignator>(component).ok()?;
            Some(format!("{}-{pin}", designator.designator()))
        })
        .collect();
    if segments.is_empty() {
        return Ok(graph.full_name(net));
    }
    segments.sort();
    segments.dedup();

    Ok(truncate_name(segments.join("-"), graph.config().net_name_limit))
}

fn truncate_name(name: String, limit: usize) -> String {
    if name.chars().count() <= limit {
        return name;
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = name.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

// ============================================================================
// Designators
// ============================================================================

/// Give every module under `root` that has a designator prefix but no
/// designator the lowest free number for its prefix.
///
/// Modules are visited in full-name order. Returns the new assignments.
pub fn assign_designators(graph: &mut Graph, root: NodeId) -> Result<Vec<(NodeId, String)>> {
    let mut candidates = vec![root];
    candidates.extend(graph.descendants(root)?);

    let mut taken: HashMap<String, HashSet<u32>> = HashMap::new();
    let mut pending = Vec::new();
    for node in candidates {
        if !graph.has_trait::<dyn HasDesignatorPrefix>(node) {
            continue;
        }
        let prefix = graph.get_trait::<dyn HasDesignatorPrefix>(node)?.prefix().to_string();
        if graph.has_trait::<dyn HasDesignator>(node) {
            let designator = graph.get_trait::<dyn HasDesignator>(node)?.designator();
            if let Some(number) = designator.strip_prefix(prefix.as_str()).and_then(|n| n.parse().ok()) {
                taken.entry(prefix).or_default().insert(number);
            }
            continue;
        }
        pending.push((graph.full_name(node), node, prefix));
    }
    pending.sort();

    let mut assigned = Vec::with_capacity(pending.len());
    for (_, node, prefix) in pending {
        let used = taken.entry(prefix.clone()).or_default();
        let number = (1..).find(|n| !used.contains(n)).unwrap_or(1);
        used.insert(number);

        let designator = format!("{prefix}{number}");
        tracing::debug!(node = %node, designator = %designator, "designator assigned");
        graph.add_trait(node, HasDesignatorDefined(designator.clone()))?;
        assigned.push((node, designator));
    }
    Ok(assigned)
}

// ============================================================================
// Layout
// ============================================================================

/// Place the children named by `node`'s `has_pcb_layout`, relative to the
/// position of `node` itself when it has one.
pub fn apply_pcb_layout(graph: &mut Graph, node: NodeId) -> Result<()> {
    let placements = graph.get_trait::<dyn HasPcbLayout>(node)?.placements().to_vec();
    let origin = graph
        .get_trait::<dyn HasPcbPosition>(node)
        .ok()
        .map(|p| p.position());

    for (path, position) in placements {
        let child = graph.descendant(node, &path)?;
        let placed = match &origin {
            Some(origin) => position.relative_to(origin),
            None => position,
        };
        tracing::trace!(node = %child, x = placed.x, y = placed.y, "placed");
        graph.add_trait(child, HasPcbPositionDefined(placed))?;
    }
    Ok(())
}
