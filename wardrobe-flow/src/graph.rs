use std::sync::Arc;

use crate::{answers::AnswerRecord, step::Step};

/// Type alias for edge condition functions
pub type EdgeCondition = Arc<dyn Fn(&AnswerRecord) -> bool + Send + Sync>;

/// Edge between steps in the graph
#[derive(Clone)]
pub struct Edge {
    pub from: Step,
    pub to: Step,
    pub condition: Option<EdgeCondition>,
}

impl Edge {
    fn applies(&self, answers: &AnswerRecord) -> bool {
        self.condition.as_ref().is_none_or(|condition| condition(answers))
    }
}

/// Transition table for the questionnaire.
///
/// Forward moves take the first edge out of the current step whose condition
/// holds for the current answers. Backward moves are the predecessor on the
/// forward path, so every skip is mirrored on the way back without a second
/// rule.
pub struct StepGraph {
    pub id: String,
    edges: Vec<Edge>,
    start_step: Step,
}

impl StepGraph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            edges: Vec::new(),
            start_step: Step::Welcome,
        }
    }

    /// The fashion questionnaire: linear, except that a full-outfit request
    /// goes straight from the type question to the current-clothes question.
    pub fn wardrobe() -> Self {
        let full_outfit = |answers: &AnswerRecord| answers.is_full_outfit();

        StepGraphBuilder::new("wardrobe")
            .set_start_step(Step::Welcome)
            .add_edge(Step::Welcome, Step::Gender)
            .add_edge(Step::Gender, Step::BodyShape)
            .add_edge(Step::BodyShape, Step::Height)
            .add_edge(Step::Height, Step::Style)
            .add_edge(Step::Style, Step::RecommendationType)
            .add_conditional_edge(
                Step::RecommendationType,
                full_outfit,
                Step::CurrentClothesType, // yes - skip the specific item
                Step::SpecificItem,       // else - pick a garment first
            )
            .add_edge(Step::SpecificItem, Step::CurrentClothesType)
            .add_edge(Step::CurrentClothesType, Step::CurrentClothesColor)
            .build()
    }

    pub fn start_step(&self) -> Step {
        self.start_step
    }

    /// Find the next step based on edges and conditions
    pub fn find_next_step(&self, current: Step, answers: &AnswerRecord) -> Option<Step> {
        self.edges
            .iter()
            .find(|edge| edge.from == current && edge.applies(answers))
            .map(|edge| edge.to)
    }

    /// Find the step that leads to `current` on the path the answers select.
    pub fn find_previous_step(&self, current: Step, answers: &AnswerRecord) -> Option<Step> {
        let path = self.path(answers);
        let index = path.iter().position(|step| *step == current)?;
        index.checked_sub(1).map(|previous| path[previous])
    }

    /// Every step reachable from the start for the given answers, in order.
    pub fn path(&self, answers: &AnswerRecord) -> Vec<Step> {
        let mut path = vec![self.start_step];
        let mut current = self.start_step;
        while let Some(next) = self.find_next_step(current, answers) {
            if path.contains(&next) {
                break;
            }
            path.push(next);
            current = next;
        }
        path
    }

    /// Input steps on the current path; the denominator of progress.
    pub fn input_steps(&self, answers: &AnswerRecord) -> Vec<Step> {
        self.path(answers)
            .into_iter()
            .filter(|step| step.is_input())
            .collect()
    }
}

/// Builder for creating step graphs
pub struct StepGraphBuilder {
    graph: StepGraph,
}

impl StepGraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            graph: StepGraph::new(id),
        }
    }

    pub fn add_edge(mut self, from: Step, to: Step) -> Self {
        self.graph.edges.push(Edge {
            from,
            to,
            condition: None,
        });
        self
    }

    /// Add a two-way branch: `yes` when the predicate holds, `no` otherwise.
    pub fn add_conditional_edge<F>(mut self, from: Step, condition: F, yes: Step, no: Step) -> Self
    where
        F: Fn(&AnswerRecord) -> bool + Send + Sync + 'static,
    {
        let condition: EdgeCondition = Arc::new(condition);
        let negated = condition.clone();
        self.graph.edges.push(Edge {
            from,
            to: yes,
            condition: Some(condition),
        });
        self.graph.edges.push(Edge {
            from,
            to: no,
            condition: Some(Arc::new(move |answers: &AnswerRecord| !negated(answers))),
        });
        self
    }

    pub fn set_start_step(mut self, step: Step) -> Self {
        self.graph.start_step = step;
        self
    }

    pub fn build(self) -> StepGraph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::RecommendationType;

    fn with_type(kind: Option<RecommendationType>) -> AnswerRecord {
        AnswerRecord {
            recommendation_type: kind,
            ..AnswerRecord::default()
        }
    }

    #[test]
    fn full_outfit_path_skips_specific_item() {
        let graph = StepGraph::wardrobe();
        let answers = with_type(Some(RecommendationType::FullOutfit));

        let positions: Vec<u8> = graph.path(&answers).iter().map(|s| s.position()).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4, 5, 7, 8]);
        assert_eq!(
            graph.find_previous_step(Step::CurrentClothesType, &answers),
            Some(Step::RecommendationType)
        );
    }

    #[test]
    fn single_item_path_visits_every_step() {
        let graph = StepGraph::wardrobe();
        for kind in [None, Some(RecommendationType::Top), Some(RecommendationType::Bottom)] {
            let answers = with_type(kind);
            assert_eq!(graph.input_steps(&answers), Step::INPUTS.to_vec());
            assert_eq!(
                graph.find_previous_step(Step::CurrentClothesType, &answers),
                Some(Step::SpecificItem)
            );
        }
    }

    #[test]
    fn ends_have_no_neighbours() {
        let graph = StepGraph::wardrobe();
        let answers = AnswerRecord::default();
        assert_eq!(graph.find_previous_step(Step::Welcome, &answers), None);
        assert_eq!(graph.find_next_step(Step::CurrentClothesColor, &answers), None);
        assert_eq!(
            graph.input_steps(&answers).last(),
            Some(&Step::CurrentClothesColor)
        );
    }

    #[test]
    fn path_stops_on_cycles() {
        let graph = StepGraphBuilder::new("loop")
            .add_edge(Step::Welcome, Step::Gender)
            .add_edge(Step::Gender, Step::Welcome)
            .build();
        assert_eq!(graph.path(&AnswerRecord::default()), vec![Step::Welcome, Step::Gender]);
    }
}
