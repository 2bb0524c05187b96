//! Run context passed into nodes.

/// Where a node call sits inside its run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Run the node is executing for.
    pub run_id: String,
    /// Id the node is registered under.
    pub node_id: String,
    /// Index of the checkpoint the node reads from; its patch lands at `checkpoint + 1`.
    pub checkpoint: u64,
}
