//! Knowledge lookup trait

/// Knowledge retrieval interface
///
/// Implementations:
/// - `KnowledgeRetriever` - literal keyword match against a static table
pub trait Retriever: Send + Sync + 'static {
    /// Knowledge text relevant to `query`, or the no-knowledge sentinel
    fn retrieve(&self, query: &str) -> String;

    /// Get retriever name for logging
    fn name(&self) -> &str;
}
