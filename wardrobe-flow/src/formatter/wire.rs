//! JSON shapes exchanged with the `/fashion-crawler` endpoint.

use serde::{Deserialize, Serialize};

use crate::{
    answers::{AnswerRecord, Gender, Height, RecommendationType, Style},
    error::{Result, WizardError},
};

/// Request body. Every field defaults to empty so a sparse request still
/// formats with neutral wording instead of being rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlRequest {
    pub gender: String,
    pub body_shape: String,
    pub height: String,
    pub style: String,
    pub recommendation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_color: Option<String>,
}

impl CrawlRequest {
    /// Read the request back into answers; unknown enum ids become unset.
    pub fn answers(&self) -> AnswerRecord {
        AnswerRecord {
            gender: Gender::from_id(&self.gender),
            body_shape: non_empty(&self.body_shape),
            height: Height::from_id(&self.height),
            style: Style::from_id(&self.style),
            recommendation_type: RecommendationType::from_id(&self.recommendation_type),
            specific_item: None,
            current_clothes_type: self.current_item.as_deref().and_then(non_empty),
            current_clothes_color: self.current_color.as_deref().and_then(non_empty),
        }
    }
}

impl From<&AnswerRecord> for CrawlRequest {
    fn from(answers: &AnswerRecord) -> Self {
        Self {
            gender: answers.gender.map(|g| g.as_str()).unwrap_or_default().to_string(),
            body_shape: answers.body_shape.clone().unwrap_or_default(),
            height: answers.height.map(|h| h.as_str()).unwrap_or_default().to_string(),
            style: answers.style.map(|s| s.as_str()).unwrap_or_default().to_string(),
            recommendation_type: answers
                .recommendation_type
                .map(|r| r.as_str())
                .unwrap_or_default()
                .to_string(),
            current_item: answers.current_clothes_type.clone(),
            current_color: answers.current_clothes_color.clone(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Product card pointing at a retailer search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FashionItem {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryLink {
    pub item: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleAnalysis {
    pub color_analysis: String,
    pub style_analysis: String,
    pub accessory_suggestions: Vec<String>,
    pub accessory_links: Vec<AccessoryLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResponse {
    pub recommendations: Vec<FashionItem>,
    pub analysis: StyleAnalysis,
    pub query: String,
}

impl CrawlResponse {
    /// Reject responses that decode but cannot be shown as a recommendation.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.color_analysis.trim().is_empty()
            && self.analysis.style_analysis.trim().is_empty()
        {
            return Err(WizardError::MalformedResponse(
                "analysis text is empty".to_string(),
            ));
        }
        if self.analysis.accessory_suggestions.is_empty() {
            return Err(WizardError::MalformedResponse(
                "no accessory suggestions".to_string(),
            ));
        }
        if let Some(link) = self
            .analysis
            .accessory_links
            .iter()
            .find(|link| link.item.trim().is_empty() || link.url.trim().is_empty())
        {
            return Err(WizardError::MalformedResponse(format!(
                "incomplete accessory link: {link:?}"
            )));
        }
        Ok(())
    }
}

/// Body returned with a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;
    use serde_json::json;

    #[test]
    fn request_omits_absent_optionals() {
        let mut answers = AnswerRecord::new();
        answers.set(Step::Gender, "male").unwrap();
        answers.set(Step::RecommendationType, "full-outfit").unwrap();

        let value = serde_json::to_value(CrawlRequest::from(&answers)).unwrap();
        assert_eq!(value["recommendationType"], "full-outfit");
        assert!(value.get("currentItem").is_none());
        assert!(value.get("currentColor").is_none());
    }

    #[test]
    fn sparse_request_reads_as_partial_answers() {
        let request: CrawlRequest =
            serde_json::from_value(json!({ "gender": "female", "style": "unknown" })).unwrap();
        let answers = request.answers();
        assert_eq!(answers.gender, Some(Gender::Female));
        assert_eq!(answers.style, None);
        assert_eq!(answers.body_shape, None);
    }

    #[test]
    fn empty_analysis_is_malformed() {
        let response = CrawlResponse {
            recommendations: Vec::new(),
            analysis: StyleAnalysis {
                color_analysis: String::new(),
                style_analysis: " ".to_string(),
                accessory_suggestions: vec!["belt".to_string()],
                accessory_links: Vec::new(),
            },
            query: String::new(),
        };
        assert!(matches!(
            response.validate(),
            Err(WizardError::MalformedResponse(_))
        ));
    }
}
