use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in the questionnaire.
///
/// Input steps map one-to-one onto the fields of
/// [`AnswerRecord`](crate::AnswerRecord); `Welcome`, `Loading` and `Results`
/// carry no field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Welcome,
    Gender,
    BodyShape,
    Height,
    Style,
    RecommendationType,
    SpecificItem,
    CurrentClothesType,
    CurrentClothesColor,
    Loading,
    Results,
}

impl Step {
    /// Every input step in forward order.
    pub const INPUTS: [Step; 8] = [
        Step::Gender,
        Step::BodyShape,
        Step::Height,
        Step::Style,
        Step::RecommendationType,
        Step::SpecificItem,
        Step::CurrentClothesType,
        Step::CurrentClothesColor,
    ];

    /// Numeric position shown to clients.
    pub fn position(self) -> u8 {
        match self {
            Step::Welcome => 0,
            Step::Gender => 1,
            Step::BodyShape => 2,
            Step::Height => 3,
            Step::Style => 4,
            Step::RecommendationType => 5,
            Step::SpecificItem => 6,
            Step::CurrentClothesType => 7,
            Step::CurrentClothesColor => 8,
            Step::Loading => 9,
            Step::Results => 10,
        }
    }

    /// Name of the answer field written at this step.
    pub fn field(self) -> Option<&'static str> {
        match self {
            Step::Gender => Some("gender"),
            Step::BodyShape => Some("bodyShape"),
            Step::Height => Some("height"),
            Step::Style => Some("style"),
            Step::RecommendationType => Some("recommendationType"),
            Step::SpecificItem => Some("specificItem"),
            Step::CurrentClothesType => Some("currentClothesType"),
            Step::CurrentClothesColor => Some("currentClothesColor"),
            Step::Welcome | Step::Loading | Step::Results => None,
        }
    }

    pub fn is_input(self) -> bool {
        self.field().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Welcome => "welcome",
            Step::Gender => "gender",
            Step::BodyShape => "body_shape",
            Step::Height => "height",
            Step::Style => "style",
            Step::RecommendationType => "recommendation_type",
            Step::SpecificItem => "specific_item",
            Step::CurrentClothesType => "current_clothes_type",
            Step::CurrentClothesColor => "current_clothes_color",
            Step::Loading => "loading",
            Step::Results => "results",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_positions_are_contiguous() {
        let positions: Vec<u8> = Step::INPUTS.iter().map(|s| s.position()).collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(Step::INPUTS.iter().all(|s| s.is_input()));
        assert!(!Step::Welcome.is_input());
        assert!(!Step::Loading.is_input());
    }
}
