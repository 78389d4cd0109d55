//! Option sets presented at each input step.

use serde::{Deserialize, Serialize};

use crate::{
    answers::{AnswerRecord, Gender, Height, RecommendationType, Style},
    step::Step,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    pub id: String,
    pub label: String,
}

impl StepOption {
    fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

const MALE_BODY_SHAPES: &[(&str, &str)] = &[
    ("rectangle", "Rectangle"),
    ("triangle", "Triangle"),
    ("inverted-triangle", "Inverted Triangle"),
    ("oval", "Oval"),
];

const FEMALE_BODY_SHAPES: &[(&str, &str)] = &[
    ("hourglass", "Hourglass"),
    ("pear", "Pear"),
    ("apple", "Apple"),
    ("rectangle", "Rectangle"),
    ("inverted-triangle", "Inverted Triangle"),
];

const TOP_ITEMS: &[(&str, &str)] = &[
    ("t-shirt", "T-Shirt"),
    ("blouse", "Blouse"),
    ("sweater", "Sweater"),
    ("blazer", "Blazer"),
];

const BOTTOM_ITEMS: &[(&str, &str)] = &[
    ("jeans", "Jeans"),
    ("skirt", "Skirt"),
    ("trousers", "Trousers"),
    ("shorts", "Shorts"),
];

const CURRENT_CLOTHES: &[(&str, &str)] = &[
    ("t-shirt", "T-Shirt"),
    ("shirt", "Shirt"),
    ("blouse", "Blouse"),
    ("sweater", "Sweater"),
    ("blazer", "Blazer"),
    ("jeans", "Jeans"),
    ("trousers", "Trousers"),
    ("skirt", "Skirt"),
    ("shorts", "Shorts"),
    ("dress", "Dress"),
];

const COLORS: &[(&str, &str)] = &[
    ("black", "Black"),
    ("white", "White"),
    ("navy", "Navy"),
    ("grey", "Grey"),
    ("beige", "Beige"),
    ("brown", "Brown"),
    ("red", "Red"),
    ("green", "Green"),
    ("blue", "Blue"),
    ("pink", "Pink"),
];

/// Options to present at `step`, derived from the answers given so far.
///
/// Body shapes follow the selected gender (defaulting to the wider female
/// set) and specific items follow the recommendation type. Non-input steps
/// and the specific-item step of a full-outfit path have no options.
pub fn options(step: Step, answers: &AnswerRecord) -> Vec<StepOption> {
    match step {
        Step::Gender => Gender::ALL
            .iter()
            .map(|g| StepOption::new(g.as_str(), label_for(g.as_str()).as_str()))
            .collect(),
        Step::BodyShape => match answers.gender {
            Some(Gender::Male) => table(MALE_BODY_SHAPES),
            _ => table(FEMALE_BODY_SHAPES),
        },
        Step::Height => Height::ALL
            .iter()
            .map(|h| StepOption::new(h.as_str(), label_for(h.as_str()).as_str()))
            .collect(),
        Step::Style => Style::ALL
            .iter()
            .map(|s| StepOption::new(s.as_str(), label_for(s.as_str()).as_str()))
            .collect(),
        Step::RecommendationType => RecommendationType::ALL
            .iter()
            .map(|r| StepOption::new(r.as_str(), label_for(r.as_str()).as_str()))
            .collect(),
        Step::SpecificItem => match answers.recommendation_type {
            Some(RecommendationType::Top) => table(TOP_ITEMS),
            Some(RecommendationType::Bottom) => table(BOTTOM_ITEMS),
            Some(RecommendationType::FullOutfit) | None => Vec::new(),
        },
        Step::CurrentClothesType => table(CURRENT_CLOTHES),
        Step::CurrentClothesColor => table(COLORS),
        Step::Welcome | Step::Loading | Step::Results => Vec::new(),
    }
}

fn table(entries: &[(&str, &str)]) -> Vec<StepOption> {
    entries
        .iter()
        .map(|(id, label)| StepOption::new(id, label))
        .collect()
}

/// "full-outfit" -> "Full Outfit"
pub(crate) fn label_for(id: &str) -> String {
    id.split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
