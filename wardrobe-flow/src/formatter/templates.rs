//! Deterministic text and link templates.
//!
//! Nothing here reads a clock, a random source or the network: identical
//! answers always yield identical output. Missing gender or style fall back
//! to neutral wording and unisex links.

use crate::{
    answers::{AnswerRecord, Gender, RecommendationType},
    catalog::capitalize,
};

use super::{
    Recommendation,
    wire::{AccessoryLink, CrawlResponse, FashionItem, StyleAnalysis},
};

struct Retailer {
    name: &'static str,
    base_url: &'static str,
    price: &'static str,
}

const RETAILERS: [Retailer; 3] = [
    Retailer {
        name: "Myntra",
        base_url: "https://www.myntra.com",
        price: "₹999",
    },
    Retailer {
        name: "Ajio",
        base_url: "https://www.ajio.com",
        price: "₹1,499",
    },
    Retailer {
        name: "Amazon Fashion",
        base_url: "https://www.amazon.in",
        price: "₹1,999",
    },
];

const MALE_ACCESSORY_LINKS: [(&str, &str); 4] = [
    ("Watch", "https://www.myntra.com/watches?f=Categories:Watches&rawQuery=men+watches"),
    ("Belt", "https://www.ajio.com/shop/men-belts"),
    ("Shoes", "https://www.amazon.in/s?k=men+formal+shoes"),
    ("Bag", "https://www.myntra.com/bags?f=Categories:Backpacks&rawQuery=men+bags"),
];

const FEMALE_ACCESSORY_LINKS: [(&str, &str); 4] = [
    ("Watch", "https://www.myntra.com/watches?f=Categories:Watches&rawQuery=women+watches"),
    ("Belt", "https://www.ajio.com/shop/women-belts"),
    ("Shoes", "https://www.amazon.in/s?k=women+heels"),
    ("Bag", "https://www.myntra.com/handbags"),
];

const NEUTRAL_ACCESSORY_LINKS: [(&str, &str); 4] = [
    ("Watch", "https://www.myntra.com/watches"),
    ("Belt", "https://www.ajio.com/shop/belts"),
    ("Shoes", "https://www.amazon.in/s?k=shoes"),
    ("Bag", "https://www.myntra.com/bags"),
];

const MALE_IMAGE_BASE: u64 = 1_516_826_957_135;
const FEMALE_IMAGE_BASE: u64 = 1_469_334_031_218;
const NEUTRAL_IMAGE: &str =
    "https://images.unsplash.com/photo-1441984904996-e0b6ba687e04?w=400&h=600&fit=crop";

fn gender_word(answers: &AnswerRecord) -> &'static str {
    answers.gender.map(|g| g.as_str()).unwrap_or("unisex")
}

fn style_word(answers: &AnswerRecord) -> &'static str {
    answers.style.map(|s| s.as_str()).unwrap_or("versatile")
}

fn type_word(answers: &AnswerRecord) -> &'static str {
    answers
        .recommendation_type
        .map(|r| r.as_str())
        .unwrap_or("clothing")
}

fn body_shape_word(answers: &AnswerRecord) -> &str {
    answers.body_shape.as_deref().unwrap_or("unique")
}

/// "female formal top that matches black skirt"
pub fn build_search_query(answers: &AnswerRecord) -> String {
    let mut query = format!(
        "{} {} {}",
        gender_word(answers),
        style_word(answers),
        type_word(answers)
    );

    let single_item = matches!(
        answers.recommendation_type,
        Some(RecommendationType::Top | RecommendationType::Bottom)
    );
    if let (true, Some(item), Some(color)) = (
        single_item,
        &answers.current_clothes_type,
        &answers.current_clothes_color,
    ) {
        query.push_str(&format!(" that matches {color} {item}"));
    }

    query
}

pub fn color_analysis(answers: &AnswerRecord) -> String {
    let shape = body_shape_word(answers);
    let style = style_word(answers);

    match (&answers.current_clothes_color, &answers.current_clothes_type) {
        (Some(color), Some(item)) => format!(
            "{} is an excellent choice for your {shape} body shape. Your {color} {item} \
             enhances your natural features and complements your {style} style preference.",
            capitalize(color)
        ),
        (Some(color), None) => format!(
            "{} is an excellent choice for your {shape} body shape and complements your \
             {style} style preference.",
            capitalize(color)
        ),
        (None, Some(item)) => format!(
            "Your {shape} body shape works beautifully with {style} style pieces, and your \
             {item} is a great base to build on."
        ),
        (None, None) => format!("Your {shape} body shape works beautifully with {style} style pieces."),
    }
}

pub fn style_summary(answers: &AnswerRecord) -> String {
    format!(
        "Your {} style preference works perfectly with your body shape. The recommended pieces \
         will accentuate your best features while maintaining comfort and confidence.",
        style_word(answers)
    )
}

pub fn accessory_suggestions(answers: &AnswerRecord) -> Vec<String> {
    let (statement, shoes) = match answers.gender {
        Some(Gender::Male) => ("A classic watch", "formal shoes"),
        Some(Gender::Female) => ("Minimal jewelry", "heels or flats"),
        None => ("A simple accessory", "shoes"),
    };

    vec![
        "Add a statement belt to define your proportions".to_string(),
        "Consider layering with a complementary jacket".to_string(),
        format!("{statement} works best with {} style", style_word(answers)),
        format!("Choose {shoes} that elongate your silhouette"),
        "A structured bag completes the look".to_string(),
    ]
}

pub fn accessory_links(answers: &AnswerRecord) -> Vec<AccessoryLink> {
    let table = match answers.gender {
        Some(Gender::Male) => &MALE_ACCESSORY_LINKS,
        Some(Gender::Female) => &FEMALE_ACCESSORY_LINKS,
        None => &NEUTRAL_ACCESSORY_LINKS,
    };

    table
        .iter()
        .map(|(item, url)| AccessoryLink {
            item: item.to_string(),
            url: url.to_string(),
        })
        .collect()
}

/// One product card per retailer, linking to a search built from the answers.
pub fn retailer_recommendations(answers: &AnswerRecord) -> Vec<FashionItem> {
    let gender_path = match answers.gender {
        Some(Gender::Male) => "men",
        Some(Gender::Female) => "women",
        None => "clothing",
    };
    let category = match answers.recommendation_type {
        Some(RecommendationType::Top) => "tshirts",
        Some(RecommendationType::Bottom) => "jeans",
        Some(RecommendationType::FullOutfit) | None => "clothing",
    };
    let kind_label = match answers.recommendation_type {
        Some(RecommendationType::FullOutfit) => "Outfit".to_string(),
        Some(kind) => capitalize(kind.as_str()),
        None => "Clothing".to_string(),
    };
    let search = format!(
        "{}+{}+{}",
        gender_word(answers),
        style_word(answers),
        type_word(answers)
    )
    .replace(' ', "+");

    let audience = match answers.gender {
        Some(gender) => gender.as_str(),
        None => "everyone",
    };
    let matching = match &answers.current_clothes_color {
        Some(color) => format!(
            "Matches perfectly with {color} {}. ",
            answers.current_clothes_type.as_deref().unwrap_or("clothing")
        ),
        None => String::new(),
    };

    RETAILERS
        .iter()
        .enumerate()
        .map(|(index, retailer)| {
            let url = match retailer.name {
                "Myntra" => format!(
                    "{}/{gender_path}?f=Categories:{category}&rawQuery={search}",
                    retailer.base_url
                ),
                "Ajio" => format!("{}/shop/{category}", retailer.base_url),
                _ => format!("{}/s?k={search}", retailer.base_url),
            };

            FashionItem {
                title: format!(
                    "{} {kind_label} - {}",
                    capitalize(style_word(answers)),
                    retailer.name
                ),
                description: format!(
                    "Trending {} {} for {audience}. {matching}Premium quality from top Indian brands.",
                    style_word(answers),
                    type_word(answers)
                ),
                image_url: image_url(answers.gender, index as u64),
                price: retailer.price.to_string(),
                url,
            }
        })
        .collect()
}

fn image_url(gender: Option<Gender>, index: u64) -> String {
    let base = match gender {
        Some(Gender::Male) => MALE_IMAGE_BASE,
        Some(Gender::Female) => FEMALE_IMAGE_BASE,
        None => return NEUTRAL_IMAGE.to_string(),
    };
    format!(
        "https://images.unsplash.com/photo-{}?w=400&h=600&fit=crop",
        base + index
    )
}

/// Full endpoint payload for the given answers.
pub fn crawl_response(answers: &AnswerRecord) -> CrawlResponse {
    CrawlResponse {
        recommendations: retailer_recommendations(answers),
        analysis: StyleAnalysis {
            color_analysis: color_analysis(answers),
            style_analysis: style_summary(answers),
            accessory_suggestions: accessory_suggestions(answers),
            accessory_links: accessory_links(answers),
        },
        query: build_search_query(answers),
    }
}

/// Format answers into a recommendation without leaving the process.
pub fn format(answers: &AnswerRecord) -> Recommendation {
    Recommendation::from(crawl_response(answers))
}
