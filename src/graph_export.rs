//! Dependency graph export for visualization and debugging.
//!
//! Builds a static graph from registration descriptors: one node per
//! registration, one edge per constructor parameter. Nothing is resolved
//! while building the graph.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::lifecycle::Lifecycle;
use crate::traits::ParameterKind;

/// A registration: one implementation at one position of a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// `Contract[position]`
    pub id: String,
    pub contract: String,
    pub implementation: String,
    pub position: usize,
    pub lifecycle: Lifecycle,
    /// Open generic template registration
    pub open: bool,
}

/// A constructor parameter of `from` targeting registration `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub kind: ParameterKind,
    /// Whether `to` is a registered node; generic targets bound from a template never are
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub registration_count: usize,
    pub singleton_count: usize,
    pub per_request_count: usize,
    pub open_count: usize,
    /// Edges pointing at nothing registered
    pub unresolved_edges: usize,
    pub has_cycles: bool,
    /// RFC 3339 export timestamp
    pub exported_at: String,
    pub version: String,
}

/// Serializable dependency graph.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Component, Constructor, ServiceCollection};
/// use ferrous_wire::graph_export::DependencyGraph;
///
/// struct Leaf;
/// impl Component for Leaf {
///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::new(|_| Ok(Leaf))] }
/// }
/// struct Root;
/// impl Component for Root {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|args| { args.next::<Leaf>()?; Ok(Root) }).param::<Leaf>()]
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton::<Leaf, Leaf>().unwrap();
/// services.add_per_request::<Root, Root>().unwrap();
///
/// let graph = DependencyGraph::from_descriptors(&services.descriptors());
/// assert_eq!(graph.nodes.len(), 2);
/// assert_eq!(graph.edges.len(), 1);
/// assert!(!graph.metadata.has_cycles);
/// assert!(graph.to_dot().starts_with("digraph"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: GraphMetadata,
}

impl DependencyGraph {
    pub fn from_descriptors(descriptors: &[ServiceDescriptor]) -> Self {
        let nodes: Vec<GraphNode> = descriptors
            .iter()
            .map(|d| GraphNode {
                id: node_id(d.contract_name(), d.position),
                contract: d.contract_name().to_string(),
                implementation: d.implementation_name().to_string(),
                position: d.position,
                lifecycle: d.lifecycle,
                open: d.open,
            })
            .collect();

        let mut positions: HashMap<&str, usize> = HashMap::new();
        for d in descriptors.iter().filter(|d| !d.open) {
            *positions.entry(d.contract_name()).or_default() += 1;
        }

        let mut edges = Vec::new();
        for d in descriptors {
            let from = node_id(d.contract_name(), d.position);
            for parameter in &d.parameters {
                let target = parameter.contract.name();
                let registered = positions.get(target).copied().unwrap_or(0);
                match parameter.kind {
                    ParameterKind::Collection if registered > 0 => {
                        edges.extend((0..registered).map(|position| GraphEdge {
                            from: from.clone(),
                            to: node_id(target, position),
                            kind: parameter.kind,
                            resolved: true,
                        }));
                    }
                    _ => {
                        let position = parameter.key.ordinal();
                        edges.push(GraphEdge {
                            from: from.clone(),
                            to: node_id(target, position),
                            kind: parameter.kind,
                            resolved: position < registered,
                        });
                    }
                }
            }
        }

        let metadata = GraphMetadata {
            registration_count: nodes.len(),
            singleton_count: nodes.iter().filter(|n| n.lifecycle == Lifecycle::Singleton).count(),
            per_request_count: nodes.iter().filter(|n| n.lifecycle == Lifecycle::PerRequest).count(),
            open_count: nodes.iter().filter(|n| n.open).count(),
            unresolved_edges: edges.iter().filter(|e| !e.resolved).count(),
            has_cycles: has_cycles(&nodes, &edges),
            exported_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        Self { nodes, edges, metadata }
    }

    pub fn to_json(&self) -> DiResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DiError::Export(e.to_string()))
    }

    pub fn to_yaml(&self) -> DiResult<String> {
        serde_yaml::to_string(self).map_err(|e| DiError::Export(e.to_string()))
    }

    /// Graphviz DOT rendering. Singletons are filled, collection edges bold,
    /// unresolved edges dashed.
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph DependencyGraph {\n");
        output.push_str("  rankdir=TB;\n");
        output.push_str("  node [shape=box];\n\n");

        for node in &self.nodes {
            let style = match (node.open, node.lifecycle) {
                (true, _) => "style=dashed",
                (false, Lifecycle::Singleton) => "style=filled, fillcolor=lightblue",
                (false, Lifecycle::PerRequest) => "style=solid",
            };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n{}\", {}];\n",
                escape(&node.id),
                escape(&node.id),
                escape(&node.implementation),
                style
            ));
        }

        output.push('\n');

        for edge in &self.edges {
            let style = match (edge.resolved, edge.kind) {
                (false, _) => "dashed",
                (true, ParameterKind::Collection) => "bold",
                (true, _) => "solid",
            };
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [style={}];\n",
                escape(&edge.from),
                escape(&edge.to),
                style
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn node_id(contract: &str, position: usize) -> String {
    format!("{contract}[{position}]")
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

fn has_cycles(nodes: &[GraphNode], edges: &[GraphEdge]) -> bool {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges.iter().filter(|e| e.resolved) {
        adjacency.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
    }

    fn visit<'a>(
        node: &'a str,
        adjacency: &HashMap<&'a str, Vec<&'a str>>,
        visiting: &mut HashSet<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> bool {
        if done.contains(node) {
            return false;
        }
        if !visiting.insert(node) {
            return true;
        }
        let cyclic = adjacency
            .get(node)
            .is_some_and(|next| next.iter().any(|n| visit(*n, adjacency, visiting, done)));
        visiting.remove(node);
        done.insert(node);
        cyclic
    }

    let mut visiting = HashSet::new();
    let mut done = HashSet::new();
    nodes
        .iter()
        .any(|n| visit(n.id.as_str(), &adjacency, &mut visiting, &mut done))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::ParameterDescriptor;
    use crate::key::{ContractId, DependencyKey, ImplementationId};

    trait A {}
    trait B {}
    struct ImplA;
    struct ImplB;

    fn descriptor<C: ?Sized + 'static, I: 'static>(position: usize, parameters: Vec<ParameterDescriptor>) -> ServiceDescriptor {
        ServiceDescriptor {
            contract: ContractId::of::<C>(),
            position,
            implementation: ImplementationId::of::<I>(),
            lifecycle: Lifecycle::PerRequest,
            parameters,
            open: false,
        }
    }

    fn single<C: ?Sized + 'static>(key: usize) -> ParameterDescriptor {
        ParameterDescriptor {
            contract: ContractId::of::<C>(),
            kind: ParameterKind::Single,
            key: DependencyKey::new(key),
        }
    }

    #[test]
    fn cycles_are_flagged() {
        let graph = DependencyGraph::from_descriptors(&[
            descriptor::<dyn A, ImplA>(0, vec![single::<dyn B>(0)]),
            descriptor::<dyn B, ImplB>(0, vec![single::<dyn A>(0)]),
        ]);
        assert!(graph.metadata.has_cycles);
        assert_eq!(graph.metadata.unresolved_edges, 0);
    }

    #[test]
    fn out_of_range_keys_are_unresolved() {
        let graph = DependencyGraph::from_descriptors(&[
            descriptor::<dyn A, ImplA>(0, vec![single::<dyn B>(3)]),
            descriptor::<dyn B, ImplB>(0, Vec::new()),
        ]);
        assert!(!graph.metadata.has_cycles);
        assert_eq!(graph.metadata.unresolved_edges, 1);
        assert!(graph.to_dot().contains("style=dashed"));
    }

    #[test]
    fn collection_edges_fan_out() {
        let all_b = ParameterDescriptor {
            contract: ContractId::of::<dyn B>(),
            kind: ParameterKind::Collection,
            key: DependencyKey::DEFAULT,
        };
        let graph = DependencyGraph::from_descriptors(&[
            descriptor::<dyn A, ImplA>(0, vec![all_b]),
            descriptor::<dyn B, ImplB>(0, Vec::new()),
            descriptor::<dyn B, ImplA>(1, Vec::new()),
        ]);
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edges.iter().all(|e| e.resolved && e.kind == ParameterKind::Collection));

        let json = graph.to_json().unwrap();
        let parsed: DependencyGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.nodes, graph.nodes);
    }
}
