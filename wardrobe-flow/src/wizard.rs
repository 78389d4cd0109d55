use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{
    answers::AnswerRecord,
    catalog::{self, StepOption},
    error::{Result, WizardError},
    formatter::{Formatter, Recommendation},
    graph::StepGraph,
    step::Step,
};

/// Steps from which the record may be submitted. The current-clothes
/// questions are optional, so either one can be the last answered.
const SUBMIT_STEPS: [Step; 2] = [Step::CurrentClothesType, Step::CurrentClothesColor];

/// Where the wizard is, carrying only what that state needs.
#[derive(Debug)]
pub enum Stage {
    /// Presenting the welcome screen or an input question.
    Input(Step),
    /// Waiting on the formatter. `from` is the step that submitted.
    Loading {
        from: Step,
        task: JoinHandle<Result<Recommendation>>,
    },
    Results(Recommendation),
    /// The formatter failed; `submit` retries, `go_back` returns to `from`.
    Failed { from: Step, error: WizardError },
}

/// Questionnaire state machine.
///
/// Owns the answers and the current stage and changes them only through
/// [`start`](Self::start), [`advance`](Self::advance),
/// [`go_back`](Self::go_back), [`submit`](Self::submit) and
/// [`reset`](Self::reset). A rejected call leaves both untouched.
pub struct Wizard {
    graph: Arc<StepGraph>,
    formatter: Arc<dyn Formatter>,
    answers: AnswerRecord,
    stage: Stage,
}

impl Wizard {
    pub fn new(graph: Arc<StepGraph>, formatter: Arc<dyn Formatter>) -> Self {
        let start = graph.start_step();
        Self {
            graph,
            formatter,
            answers: AnswerRecord::new(),
            stage: Stage::Input(start),
        }
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Step being rendered. A failed submission reports the loading step.
    pub fn step(&self) -> Step {
        match &self.stage {
            Stage::Input(step) => *step,
            Stage::Loading { .. } | Stage::Failed { .. } => Step::Loading,
            Stage::Results(_) => Step::Results,
        }
    }

    pub fn position(&self) -> u8 {
        self.step().position()
    }

    /// Name of the screen to render: a step name or `failed`.
    pub fn view(&self) -> &'static str {
        match &self.stage {
            Stage::Failed { .. } => "failed",
            _ => self.step().as_str(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.stage, Stage::Loading { .. })
    }

    pub fn recommendation(&self) -> Option<&Recommendation> {
        match &self.stage {
            Stage::Results(recommendation) => Some(recommendation),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WizardError> {
        match &self.stage {
            Stage::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Options for the current step, derived from the answers as they are now.
    pub fn options(&self) -> Vec<StepOption> {
        match &self.stage {
            Stage::Input(step) => catalog::options(*step, &self.answers),
            _ => Vec::new(),
        }
    }

    /// Percentage of the current path's input steps reached so far.
    ///
    /// The denominator follows the answers, so it shrinks as soon as a full
    /// outfit is chosen and grows back if the choice is changed.
    pub fn progress(&self) -> f64 {
        let Stage::Input(step) = &self.stage else {
            return 100.0;
        };
        let inputs = self.graph.input_steps(&self.answers);
        if inputs.is_empty() {
            return 0.0;
        }
        let reached = inputs
            .iter()
            .position(|input| input == step)
            .map_or(0, |index| index + 1);
        reached as f64 / inputs.len() as f64 * 100.0
    }

    /// Leave the welcome screen.
    pub fn start(&mut self) -> Result<Step> {
        let start = self.graph.start_step();
        match self.stage {
            Stage::Input(step) if step == start => {}
            _ => return Err(WizardError::invalid(self.step(), "the wizard has already started")),
        }

        let next = self
            .graph
            .find_next_step(start, &self.answers)
            .ok_or_else(|| WizardError::invalid(start, "no step follows the start"))?;
        self.stage = Stage::Input(next);
        debug!(step = %next, "Wizard started");
        Ok(next)
    }

    /// Record `value` for the current question and move forward.
    ///
    /// The final question keeps its position; it is left through
    /// [`submit`](Self::submit).
    pub fn advance(&mut self, value: &str) -> Result<Step> {
        let current = match self.stage {
            Stage::Input(step) if step.is_input() => step,
            _ => {
                return Err(WizardError::invalid(
                    self.step(),
                    "no answer is collected at this step",
                ));
            }
        };

        self.answers.set(current, value)?;

        if let Some(next) = self.graph.find_next_step(current, &self.answers) {
            self.stage = Stage::Input(next);
        }

        let step = self.step();
        debug!(from = %current, to = %step, value = %value, "Answer recorded");
        Ok(step)
    }

    /// Return to the previous question on the current path. Answers are kept.
    pub fn go_back(&mut self) -> Result<Step> {
        let previous = match &self.stage {
            Stage::Input(step) => self
                .graph
                .find_previous_step(*step, &self.answers)
                .unwrap_or(*step),
            Stage::Failed { from, .. } => *from,
            Stage::Loading { .. } | Stage::Results(_) => {
                return Err(WizardError::invalid(
                    self.step(),
                    "cannot go back from this step; reset instead",
                ));
            }
        };

        self.stage = Stage::Input(previous);
        debug!(step = %previous, "Moved back");
        Ok(previous)
    }

    /// Hand the answers to the formatter on a background task.
    ///
    /// Valid from the current-clothes questions, or from a failed attempt as
    /// a retry, once every required answer for the chosen path is present.
    pub fn submit(&mut self) -> Result<()> {
        let from = match &self.stage {
            Stage::Input(step) if SUBMIT_STEPS.contains(step) => *step,
            Stage::Failed { from, .. } => *from,
            Stage::Loading { .. } => {
                return Err(WizardError::invalid(
                    Step::Loading,
                    "a submission is already in flight",
                ));
            }
            _ => {
                return Err(WizardError::invalid(
                    self.step(),
                    "answers can only be submitted from the last questions",
                ));
            }
        };

        let missing = self.answers.missing_fields();
        if !missing.is_empty() {
            return Err(WizardError::invalid(
                self.step(),
                format!("missing required answers: {}", missing.join(", ")),
            ));
        }

        info!(from = %from, answers = ?self.answers, "Submitting answers");
        let formatter = Arc::clone(&self.formatter);
        let answers = self.answers.clone();
        let task = tokio::spawn(async move { formatter.recommend(answers).await });

        self.stage = Stage::Loading { from, task };
        Ok(())
    }

    /// Wait for the in-flight submission and move to results or failed.
    ///
    /// Cancel-safe: dropping the returned future leaves the submission
    /// running and the wizard loading.
    pub async fn wait_for_recommendation(&mut self) -> Result<&Recommendation> {
        if let Stage::Loading { from, task } = &mut self.stage {
            let from = *from;
            self.stage = match task.await {
                Ok(Ok(recommendation)) => {
                    info!("Recommendation ready");
                    Stage::Results(recommendation)
                }
                Ok(Err(error)) => {
                    error!(error = %error, "Formatter failed");
                    Stage::Failed { from, error }
                }
                Err(join_error) => {
                    error!(error = %join_error, "Formatter task did not complete");
                    Stage::Failed {
                        from,
                        error: WizardError::FormatterFailure(join_error.to_string()),
                    }
                }
            };
        }

        match &self.stage {
            Stage::Results(recommendation) => Ok(recommendation),
            Stage::Failed { error, .. } => Err(error.clone()),
            _ => Err(WizardError::invalid(self.step(), "nothing has been submitted")),
        }
    }

    /// Collect a finished submission without waiting on an unfinished one.
    pub async fn poll(&mut self) {
        let finished = matches!(&self.stage, Stage::Loading { task, .. } if task.is_finished());
        if finished {
            if let Err(e) = self.wait_for_recommendation().await {
                warn!(error = %e, "Submission finished with an error");
            }
        }
    }

    /// Back to the welcome screen with no answers. Any in-flight submission
    /// is aborted and its result never observed.
    pub fn reset(&mut self) {
        if let Stage::Loading { task, .. } = &self.stage {
            info!("Aborting in-flight submission");
            task.abort();
        }
        self.answers = AnswerRecord::new();
        self.stage = Stage::Input(self.graph.start_step());
        debug!("Wizard reset");
    }
}

impl Drop for Wizard {
    fn drop(&mut self) {
        if let Stage::Loading { task, .. } = &self.stage {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{LocalFormatter, format};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts calls and completed calls, finishing after `delay`.
    #[derive(Default)]
    struct CountingFormatter {
        calls: AtomicUsize,
        completed: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl Formatter for CountingFormatter {
        async fn recommend(&self, answers: AnswerRecord) -> Result<Recommendation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(format(&answers))
        }
    }

    struct FailingFormatter;

    #[async_trait]
    impl Formatter for FailingFormatter {
        async fn recommend(&self, _answers: AnswerRecord) -> Result<Recommendation> {
            Err(WizardError::FormatterFailure("upstream unavailable".to_string()))
        }
    }

    fn wizard() -> Wizard {
        Wizard::new(Arc::new(StepGraph::wardrobe()), Arc::new(LocalFormatter::new()))
    }

    fn counting(delay: Duration) -> (Wizard, Arc<CountingFormatter>) {
        let formatter = Arc::new(CountingFormatter {
            delay,
            ..CountingFormatter::default()
        });
        let wizard = Wizard::new(Arc::new(StepGraph::wardrobe()), formatter.clone());
        (wizard, formatter)
    }

    /// Start and answer each value in turn, recording every position visited.
    fn walk(wizard: &mut Wizard, values: &[&str]) -> Vec<u8> {
        let mut visited = vec![wizard.position()];
        wizard.start().unwrap();
        visited.push(wizard.position());
        for value in values {
            let before = wizard.position();
            wizard.advance(value).unwrap();
            if wizard.position() != before {
                visited.push(wizard.position());
            }
        }
        visited
    }

    const FULL_OUTFIT: [&str; 6] = ["male", "rectangle", "average", "casual", "full-outfit", "t-shirt"];
    const SINGLE_TOP: [&str; 8] = [
        "female", "hourglass", "short", "formal", "top", "blouse", "skirt", "black",
    ];

    #[tokio::test]
    async fn full_outfit_scenario_skips_specific_item() {
        let mut wizard = wizard();
        let visited = walk(&mut wizard, &FULL_OUTFIT);
        assert_eq!(visited, vec![0, 1, 2, 3, 4, 5, 7, 8]);

        wizard.submit().unwrap();
        assert_eq!(wizard.position(), 9);
        assert!(wizard.is_loading());

        wizard.wait_for_recommendation().await.unwrap();
        assert_eq!(wizard.position(), 10);
        assert_eq!(wizard.answers().specific_item, None);
        assert_eq!(wizard.answers().current_clothes_color, None);
    }

    #[tokio::test]
    async fn single_item_scenario_visits_every_step() {
        let mut wizard = wizard();
        let visited = walk(&mut wizard, &SINGLE_TOP);
        assert_eq!(visited, vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(wizard.answers().specific_item.as_deref(), Some("blouse"));

        wizard.submit().unwrap();
        let recommendation = wizard.wait_for_recommendation().await.unwrap();
        for word in ["hourglass", "formal", "black"] {
            assert!(recommendation.analysis.contains(word), "missing {word}");
        }
    }

    #[test]
    fn advance_on_welcome_is_rejected() {
        let mut wizard = wizard();
        let err = wizard.advance("male").unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { step: Step::Welcome, .. }));
        assert_eq!(wizard.answers(), &AnswerRecord::default());
        assert_eq!(wizard.position(), 0);
    }

    #[test]
    fn unknown_option_leaves_state_untouched() {
        let mut wizard = wizard();
        wizard.start().unwrap();
        assert!(wizard.advance("robot").is_err());
        assert_eq!(wizard.step(), Step::Gender);
        assert_eq!(wizard.answers().gender, None);
    }

    #[test]
    fn going_back_keeps_the_answer() {
        let mut wizard = wizard();
        walk(&mut wizard, &["female", "pear"]);
        assert_eq!(wizard.step(), Step::Height);

        assert_eq!(wizard.go_back().unwrap(), Step::BodyShape);
        assert_eq!(wizard.answers().body_shape.as_deref(), Some("pear"));
    }

    #[test]
    fn go_back_on_welcome_is_a_no_op() {
        let mut wizard = wizard();
        assert_eq!(wizard.go_back().unwrap(), Step::Welcome);
        assert_eq!(wizard.position(), 0);
    }

    #[test]
    fn skip_is_mirrored_going_back() {
        let mut wizard = wizard();
        walk(&mut wizard, &FULL_OUTFIT[..5]);
        assert_eq!(wizard.step(), Step::CurrentClothesType);

        assert_eq!(wizard.go_back().unwrap(), Step::RecommendationType);
        assert_eq!(wizard.go_back().unwrap(), Step::Style);
    }

    #[test]
    fn changing_type_after_going_back_reenters_specific_item() {
        let mut wizard = wizard();
        walk(&mut wizard, &FULL_OUTFIT[..5]);
        wizard.go_back().unwrap();

        assert_eq!(wizard.advance("bottom").unwrap(), Step::SpecificItem);
        let ids: Vec<String> = wizard.options().into_iter().map(|o| o.id).collect();
        assert!(ids.contains(&"jeans".to_string()));

        assert_eq!(wizard.advance("jeans").unwrap(), Step::CurrentClothesType);
        assert_eq!(wizard.go_back().unwrap(), Step::SpecificItem);
    }

    #[test]
    fn switching_to_full_outfit_drops_specific_item() {
        let mut wizard = wizard();
        walk(&mut wizard, &SINGLE_TOP[..6]);
        wizard.go_back().unwrap();
        wizard.go_back().unwrap();
        assert_eq!(wizard.step(), Step::RecommendationType);

        wizard.advance("full-outfit").unwrap();
        assert_eq!(wizard.answers().specific_item, None);
        assert!(wizard.answers().is_complete());
    }

    #[test]
    fn last_question_keeps_its_position() {
        let mut wizard = wizard();
        walk(&mut wizard, &SINGLE_TOP);
        assert_eq!(wizard.step(), Step::CurrentClothesColor);
        wizard.advance("white").unwrap();
        assert_eq!(wizard.step(), Step::CurrentClothesColor);
        assert_eq!(wizard.answers().current_clothes_color.as_deref(), Some("white"));
    }

    #[test]
    fn progress_tracks_the_current_path() {
        let mut wizard = wizard();
        assert_eq!(wizard.progress(), 0.0);

        walk(&mut wizard, &FULL_OUTFIT[..4]);
        assert_eq!(wizard.step(), Step::RecommendationType);
        assert_eq!(wizard.progress(), 5.0 / 8.0 * 100.0);

        wizard.advance("full-outfit").unwrap();
        assert_eq!(wizard.progress(), 6.0 / 7.0 * 100.0);
        wizard.advance("jeans").unwrap();
        assert_eq!(wizard.progress(), 100.0);

        wizard.go_back().unwrap();
        wizard.go_back().unwrap();
        wizard.advance("top").unwrap();
        assert_eq!(wizard.progress(), 6.0 / 8.0 * 100.0);
    }

    #[tokio::test]
    async fn submit_requires_every_required_answer() {
        let mut wizard = wizard();
        walk(&mut wizard, &SINGLE_TOP[..5]);
        assert_eq!(wizard.step(), Step::SpecificItem);
        assert!(wizard.submit().is_err());

        // Reach the last questions without ever answering the specific item.
        let mut wizard = wizard_at_clothes_without_specific_item();
        let err = wizard.submit().unwrap_err();
        assert!(err.to_string().contains("specificItem"));
        assert_eq!(wizard.step(), Step::CurrentClothesType);
    }

    fn wizard_at_clothes_without_specific_item() -> Wizard {
        let mut wizard = wizard();
        walk(&mut wizard, &FULL_OUTFIT[..5]);
        wizard.go_back().unwrap();
        wizard.advance("top").unwrap();
        wizard.go_back().unwrap();
        wizard.advance("full-outfit").unwrap();
        wizard.answers.recommendation_type = Some(crate::answers::RecommendationType::Top);
        wizard
    }

    #[tokio::test]
    async fn second_submit_while_loading_is_rejected() {
        let (mut wizard, formatter) = counting(Duration::from_millis(50));
        walk(&mut wizard, &SINGLE_TOP);

        wizard.submit().unwrap();
        let err = wizard.submit().unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { step: Step::Loading, .. }));
        assert!(wizard.advance("red").is_err());

        let first = wizard.wait_for_recommendation().await.unwrap().clone();
        assert_eq!(formatter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, format(wizard.answers()));
    }

    #[tokio::test]
    async fn reset_cancels_in_flight_submission() {
        let (mut wizard, formatter) = counting(Duration::from_millis(50));
        walk(&mut wizard, &SINGLE_TOP);
        wizard.submit().unwrap();
        tokio::task::yield_now().await;

        wizard.reset();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(formatter.completed.load(Ordering::SeqCst), 0);
        assert_eq!(wizard.step(), Step::Welcome);
        assert_eq!(wizard.answers(), &AnswerRecord::default());
        assert!(wizard.recommendation().is_none());
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let mut wizard = wizard();
        walk(&mut wizard, &SINGLE_TOP);
        wizard.submit().unwrap();
        wizard.wait_for_recommendation().await.unwrap();

        wizard.reset();
        let once = (wizard.step(), wizard.answers().clone());
        wizard.reset();
        assert_eq!((wizard.step(), wizard.answers().clone()), once);
        assert_eq!(once, (Step::Welcome, AnswerRecord::default()));
    }

    #[tokio::test]
    async fn formatter_failure_can_be_retried_or_backed_out_of() {
        let mut wizard = Wizard::new(Arc::new(StepGraph::wardrobe()), Arc::new(FailingFormatter));
        walk(&mut wizard, &SINGLE_TOP);

        wizard.submit().unwrap();
        let err = wizard.wait_for_recommendation().await.unwrap_err();
        assert!(matches!(err, WizardError::FormatterFailure(_)));
        assert_eq!(wizard.view(), "failed");
        assert_eq!(wizard.error(), Some(&err));

        wizard.submit().unwrap();
        assert!(wizard.is_loading());
        assert!(wizard.wait_for_recommendation().await.is_err());

        assert_eq!(wizard.go_back().unwrap(), Step::CurrentClothesColor);
        assert_eq!(wizard.answers().current_clothes_color.as_deref(), Some("black"));
    }

    #[tokio::test]
    async fn poll_only_collects_finished_work() {
        let (mut wizard, _formatter) = counting(Duration::from_millis(200));
        walk(&mut wizard, &SINGLE_TOP);
        wizard.submit().unwrap();

        wizard.poll().await;
        assert!(wizard.is_loading());

        tokio::time::sleep(Duration::from_millis(300)).await;
        wizard.poll().await;
        assert_eq!(wizard.step(), Step::Results);
    }
}
