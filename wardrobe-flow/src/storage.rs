use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{error::Result, formatter::Formatter, graph::StepGraph, wizard::Wizard};

/// A wizard shared between requests for the same session.
pub type SharedWizard = Arc<Mutex<Wizard>>;

/// Session information
#[derive(Clone)]
pub struct Session {
    pub id: String,
    pub graph_id: String,
    pub wizard: SharedWizard,
}

impl Session {
    pub fn new_from_graph(
        sid: String,
        graph: Arc<StepGraph>,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            id: sid,
            graph_id: graph.id.clone(),
            wizard: Arc::new(Mutex::new(Wizard::new(graph, formatter))),
        }
    }
}

/// Trait for storing and retrieving sessions
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: Session) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Session>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory implementation of SessionStorage
#[derive(Default)]
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, Session>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}
