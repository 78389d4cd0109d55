use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    error::{Result, WizardError},
    step::Step,
};

/// Declares an option enum whose variants round-trip through a fixed string id.
macro_rules! option_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $id:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $id,)+
                }
            }

            pub fn from_id(id: &str) -> Option<Self> {
                match id {
                    $($id => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

option_enum!(Gender {
    Male => "male",
    Female => "female",
});

option_enum!(Height {
    Short => "short",
    Average => "average",
    Tall => "tall",
});

option_enum!(Style {
    Casual => "casual",
    Formal => "formal",
    Vintage => "vintage",
    Sporty => "sporty",
});

option_enum!(
    /// Which part of an outfit the user wants suggestions for.
    RecommendationType {
        Top => "top",
        Bottom => "bottom",
        FullOutfit => "full-outfit",
    }
);

/// Answers collected so far. Each field is written only by its own step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Height>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_type: Option<RecommendationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_clothes_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_clothes_color: Option<String>,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_full_outfit(&self) -> bool {
        self.recommendation_type == Some(RecommendationType::FullOutfit)
    }

    /// Write `value` into the field owned by `step`.
    ///
    /// Enum-backed fields must match one of their ids; string fields are
    /// stored verbatim. Choosing a full outfit drops any specific item picked
    /// on an earlier pass since that step is no longer on the path.
    pub fn set(&mut self, step: Step, value: &str) -> Result<()> {
        match step {
            Step::Gender => self.gender = Some(parse(step, value, Gender::from_id)?),
            Step::BodyShape => self.body_shape = Some(value.to_string()),
            Step::Height => self.height = Some(parse(step, value, Height::from_id)?),
            Step::Style => self.style = Some(parse(step, value, Style::from_id)?),
            Step::RecommendationType => {
                let kind = parse(step, value, RecommendationType::from_id)?;
                if kind == RecommendationType::FullOutfit {
                    self.specific_item = None;
                }
                self.recommendation_type = Some(kind);
            }
            Step::SpecificItem => self.specific_item = Some(value.to_string()),
            Step::CurrentClothesType => self.current_clothes_type = Some(value.to_string()),
            Step::CurrentClothesColor => self.current_clothes_color = Some(value.to_string()),
            Step::Welcome | Step::Loading | Step::Results => {
                return Err(WizardError::invalid(step, "no answer field at this step"));
            }
        }
        Ok(())
    }

    /// Required fields that are still unset for the currently chosen path.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.gender.is_none() {
            missing.push("gender");
        }
        if self.body_shape.is_none() {
            missing.push("bodyShape");
        }
        if self.height.is_none() {
            missing.push("height");
        }
        if self.style.is_none() {
            missing.push("style");
        }
        match self.recommendation_type {
            None => missing.push("recommendationType"),
            Some(RecommendationType::FullOutfit) => {}
            Some(_) if self.specific_item.is_none() => missing.push("specificItem"),
            Some(_) => {}
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

fn parse<T>(step: Step, value: &str, from_id: fn(&str) -> Option<T>) -> Result<T> {
    from_id(value).ok_or_else(|| WizardError::invalid(step, format!("unknown option '{value}'")))
}
