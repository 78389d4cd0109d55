pub mod answers;
pub mod catalog;
pub mod error;
pub mod formatter;
pub mod graph;
pub mod runner;
pub mod step;
pub mod storage;
pub mod wizard;

// Re-export commonly used types
pub use answers::{AnswerRecord, Gender, Height, RecommendationType, Style};
pub use catalog::StepOption;
pub use error::{Result, WizardError};
#[cfg(feature = "http")]
pub use formatter::HttpFormatter;
pub use formatter::{
    CrawlRequest, CrawlResponse, Formatter, LocalFormatter, Recommendation, WithTimeout,
};
pub use graph::{StepGraph, StepGraphBuilder};
pub use runner::{Command, FlowRunner, WizardSnapshot};
pub use step::Step;
pub use storage::{InMemorySessionStorage, Session, SessionStorage};
pub use wizard::{Stage, Wizard};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_simple_wizard_execution() {
        let mut wizard = Wizard::new(
            Arc::new(StepGraph::wardrobe()),
            Arc::new(LocalFormatter::new()),
        );

        wizard.start().unwrap();
        for value in ["female", "pear", "tall", "vintage", "bottom", "skirt", "blouse", "white"] {
            wizard.advance(value).unwrap();
        }
        wizard.submit().unwrap();

        let recommendation = wizard.wait_for_recommendation().await.unwrap().clone();
        assert_eq!(recommendation, formatter::format(wizard.answers()));
        assert_eq!(wizard.step(), Step::Results);
    }

    #[tokio::test]
    async fn test_storage() {
        let storage = InMemorySessionStorage::new();
        let session = Session::new_from_graph(
            "session1".to_string(),
            Arc::new(StepGraph::wardrobe()),
            Arc::new(LocalFormatter::new()),
        );

        session.wizard.lock().await.start().unwrap();
        storage.save(session).await.unwrap();

        let retrieved = storage.get("session1").await.unwrap().unwrap();
        assert_eq!(retrieved.graph_id, "wardrobe");
        assert_eq!(retrieved.wizard.lock().await.step(), Step::Gender);

        storage.delete("session1").await.unwrap();
        assert!(storage.get("session1").await.unwrap().is_none());
    }
}
