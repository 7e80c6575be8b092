mod revision_store;
mod schema_provider;
mod temporal_graph;

pub use revision_store::IRevisionStore;
pub use schema_provider::{ISchemaProvider, SchemaRegistry};
pub use temporal_graph::ITemporalGraph;
