//! Cursor / session: the in-memory working set, the Live/Rewound state
//! machine, and atomic batch execution.
//!
//! ```text
//!   Live ──travel(At|Next|Previous|Inception)──▶ Rewound { at }
//!    ▲                                              │
//!    └──────── advance_to_now / travel(Now) ────────┘
//! ```
//!
//! Writes are only accepted while Live.

mod batch;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use tempora_core::config::TemporalConfig;
use tempora_core::errors::TemporaResult;
use tempora_core::models::{NodeQuery, Resolution, TemporalSelector};
use tempora_core::node::ChangeObserver;
use tempora_core::traits::{IRevisionStore, ISchemaProvider};
use tempora_core::{Clock, Guid, Node, Timestamp};

use crate::resolver;

/// Temporal mode of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Tracking the present; writes allowed.
    Live,
    /// Viewing a past instant; read-only.
    Rewound { at: Timestamp },
}

pub(crate) type SharedNode = Arc<Mutex<Node>>;

/// Working set of loaded nodes over a shared revision store.
///
/// Created per request and dropped at request end. Each loaded node sits
/// behind its own mutex so concurrent operations on different nodes never
/// contend.
pub struct Cursor<S: IRevisionStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    schema: Option<Arc<dyn ISchemaProvider>>,
    config: TemporalConfig,
    observers: Vec<Arc<dyn ChangeObserver>>,
    mode: CursorMode,
    /// Timestamp of the last resolution or commit.
    timestamp: Timestamp,
    last_commit: Option<Timestamp>,
    nodes: HashMap<Guid, SharedNode>,
}

impl<S: IRevisionStore> Cursor<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: TemporalConfig) -> Self {
        Self {
            store,
            clock,
            schema: None,
            config,
            observers: Vec::new(),
            mode: CursorMode::Live,
            timestamp: Timestamp::MIN,
            last_commit: None,
            nodes: HashMap::new(),
        }
    }

    /// Validate operations against, and derive create defaults from, `schema`.
    pub fn with_schema(mut self, schema: Arc<dyn ISchemaProvider>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Attach `observer` to every node this cursor loads or creates.
    pub fn with_observer(mut self, observer: Arc<dyn ChangeObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    pub fn is_live(&self) -> bool {
        self.mode == CursorMode::Live
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// GUIDs in the working set, sorted.
    pub fn guids(&self) -> Vec<Guid> {
        let mut guids: Vec<Guid> = self.nodes.keys().copied().collect();
        guids.sort();
        guids
    }

    pub fn contains(&self, guid: &Guid) -> bool {
        self.nodes.contains_key(guid)
    }

    /// Snapshot of a loaded node.
    pub async fn node(&self, guid: &Guid) -> Option<Node> {
        let shared = self.nodes.get(guid)?;
        let node = shared.lock().await;
        Some(node.clone())
    }

    /// Resolve `guids` at the cursor's instant and add them to the working
    /// set. Already-loaded nodes are kept as they are, pending changes
    /// included. Unknown GUIDs are skipped. Returns how many were added.
    pub async fn load(&mut self, guids: &[Guid]) -> TemporaResult<usize> {
        let selector = match self.mode {
            CursorMode::Live => TemporalSelector::Now,
            CursorMode::Rewound { at } => TemporalSelector::At(at),
        };
        let missing: Vec<Guid> = guids
            .iter()
            .filter(|g| !self.nodes.contains_key(g))
            .copied()
            .collect();
        if missing.is_empty() {
            return Ok(0);
        }

        let resolution =
            resolver::resolve(self.store.as_ref(), &missing, selector, self.clock.now()).await?;
        let added = resolution.len();
        self.absorb(resolution);
        debug!(requested = missing.len(), added, "loaded nodes into cursor");
        Ok(added)
    }

    /// Resolve `query` and rebuild the working set from the result. `Now`
    /// leaves the cursor Live; every other selector rewinds it to the
    /// resolved timestamp.
    pub async fn travel(&mut self, query: &NodeQuery) -> TemporaResult<Resolution> {
        let resolution =
            resolver::resolve(self.store.as_ref(), &query.guids, query.selector, self.clock.now())
                .await?;

        self.mode = if query.selector.is_now() {
            CursorMode::Live
        } else {
            CursorMode::Rewound {
                at: resolution.timestamp,
            }
        };
        self.nodes.clear();
        self.absorb(resolution.clone());
        debug!(mode = ?self.mode, nodes = self.nodes.len(), "cursor travelled");
        Ok(resolution)
    }

    /// Back to Live, with the working set rebuilt from `guids` at Now.
    pub async fn advance_to_now(&mut self, guids: &[Guid]) -> TemporaResult<Resolution> {
        self.travel(&NodeQuery::now(guids.to_vec())).await
    }

    fn absorb(&mut self, resolution: Resolution) {
        self.timestamp = resolution.timestamp;
        for (guid, revision) in resolution.revisions {
            let node = self.attach_observers(Node::from_revision(&revision));
            self.nodes
                .entry(guid)
                .or_insert_with(|| Arc::new(Mutex::new(node)));
        }
    }

    fn attach_observers(&self, mut node: Node) -> Node {
        for observer in &self.observers {
            node.add_observer(observer.clone());
        }
        node
    }
}
