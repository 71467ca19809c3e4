use serde::Serialize;

/// Whole-graph export consumed by visualization clients.
#[derive(Debug, Clone, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub username: String,
    pub age: u32,
    pub popularity_score: f64,
}

/// One directed observation of a friendship. The relation is symmetric, so
/// every friendship shows up twice, once per direction. Consumers that want
/// undirected edges deduplicate on their side; collapsing pairs here would
/// change the documented edge count.
#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}
