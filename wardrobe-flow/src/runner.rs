//! FlowRunner – loads a session, applies exactly **one** wizard command and
//! reports the resulting state.
//!
//! Web handlers use it so each request is one load → apply → snapshot round
//! trip. The session's wizard lock is held only while the command is
//! applied; a submission keeps running on its own task afterwards, which is
//! what lets a later `Reset` cancel it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    answers::AnswerRecord,
    catalog::StepOption,
    error::{Result, WizardError},
    formatter::{Formatter, Recommendation},
    graph::StepGraph,
    storage::{Session, SessionStorage},
    wizard::Wizard,
};

/// One user action against a wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Command {
    /// Collect a finished submission, if any, and report.
    Refresh,
    Start,
    Advance(String),
    Back,
    Submit,
    Reset,
}

/// Read-only view of a wizard, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSnapshot {
    pub session_id: String,
    pub position: u8,
    pub view: String,
    pub progress: f64,
    pub answers: AnswerRecord,
    pub options: Vec<StepOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WizardSnapshot {
    pub fn capture(session_id: &str, wizard: &Wizard) -> Self {
        Self {
            session_id: session_id.to_string(),
            position: wizard.position(),
            view: wizard.view().to_string(),
            progress: wizard.progress(),
            answers: wizard.answers().clone(),
            options: wizard.options(),
            recommendation: wizard.recommendation().cloned(),
            error: wizard.error().map(|e| e.to_string()),
        }
    }
}

/// High-level helper that orchestrates the common _load → apply → report_ pattern.
#[derive(Clone)]
pub struct FlowRunner {
    graph: Arc<StepGraph>,
    formatter: Arc<dyn Formatter>,
    storage: Arc<dyn SessionStorage>,
}

impl FlowRunner {
    pub fn new(
        graph: Arc<StepGraph>,
        formatter: Arc<dyn Formatter>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            graph,
            formatter,
            storage,
        }
    }

    /// Create a session on the welcome screen and persist it.
    pub async fn create_session(&self) -> Result<WizardSnapshot> {
        let session = Session::new_from_graph(
            Uuid::new_v4().to_string(),
            self.graph.clone(),
            self.formatter.clone(),
        );
        let snapshot = {
            let wizard = session.wizard.lock().await;
            WizardSnapshot::capture(&session.id, &wizard)
        };

        info!(session_id = %session.id, graph_id = %session.graph_id, "Session created");
        self.storage.save(session).await?;
        Ok(snapshot)
    }

    /// Apply `command` to the session's wizard.
    ///
    /// A finished submission is always collected first, so a snapshot never
    /// reports loading for work that is already done.
    pub async fn run(&self, session_id: &str, command: Command) -> Result<WizardSnapshot> {
        // 1. Load session
        let session = self
            .storage
            .get(session_id)
            .await?
            .ok_or_else(|| WizardError::SessionNotFound(session_id.to_string()))?;

        // 2. Apply exactly one command
        let snapshot = {
            let mut wizard = session.wizard.lock().await;
            wizard.poll().await;

            match &command {
                Command::Refresh => {}
                Command::Start => {
                    wizard.start()?;
                }
                Command::Advance(value) => {
                    wizard.advance(value)?;
                }
                Command::Back => {
                    wizard.go_back()?;
                }
                Command::Submit => wizard.submit()?,
                Command::Reset => wizard.reset(),
            }

            info!(
                session_id = %session_id,
                command = ?command,
                position = wizard.position(),
                "Command applied"
            );
            WizardSnapshot::capture(session_id, &wizard)
        };

        // 3. Persist so the next call starts where we left off
        self.storage.save(session).await?;

        Ok(snapshot)
    }

    pub async fn delete(&self, session_id: &str) -> Result<()> {
        if self.storage.get(session_id).await?.is_none() {
            return Err(WizardError::SessionNotFound(session_id.to_string()));
        }
        self.storage.delete(session_id).await
    }
}
