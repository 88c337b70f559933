//! Indicative scholarship estimate shown on the admissions pages.
//!
//! The figures are a rough guide for prospective students and are not an offer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::workflows::cv_submission::domain::FieldErrors;

pub const RECOMMENDED_UNIVERSITIES: [&str; 4] = [
    "University of Manchester",
    "University of Leeds",
    "Queen Mary University of London",
    "University of Sheffield",
];

const REQUIRED: &str = "Required";
const EXTRACURRICULAR_BONUS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nationality {
    Uk,
    Eu,
    International,
}

impl Nationality {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "uk" => Some(Self::Uk),
            "eu" | "eea" => Some(Self::Eu),
            "international" => Some(Self::International),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    Undergraduate,
    Postgraduate,
    Phd,
}

impl CourseLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "undergraduate" => Some(Self::Undergraduate),
            "postgraduate" | "masters" => Some(Self::Postgraduate),
            "phd" | "doctoral" => Some(Self::Phd),
            _ => None,
        }
    }

    const fn base_amount(self) -> u32 {
        match self {
            CourseLevel::Undergraduate => 5000,
            CourseLevel::Postgraduate => 7500,
            CourseLevel::Phd => 10000,
        }
    }

    const fn tuition_fee(self) -> u32 {
        match self {
            CourseLevel::Undergraduate => 20000,
            CourseLevel::Postgraduate => 25000,
            CourseLevel::Phd => 30000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeBand {
    Excellent,
    Good,
    Average,
    Below,
}

impl GradeBand {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "average" => Some(Self::Average),
            "below" => Some(Self::Below),
            _ => None,
        }
    }

    /// Multiplier in tenths so the arithmetic stays exact.
    const fn multiplier_tenths(self) -> u32 {
        match self {
            GradeBand::Excellent => 15,
            GradeBand::Good => 12,
            GradeBand::Average => 10,
            GradeBand::Below => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnglishLevel {
    Native,
    Advanced,
    Intermediate,
    Basic,
}

impl EnglishLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "native" => Some(Self::Native),
            "advanced" => Some(Self::Advanced),
            "intermediate" => Some(Self::Intermediate),
            "basic" => Some(Self::Basic),
            _ => None,
        }
    }

    const fn bonus(self) -> u32 {
        match self {
            EnglishLevel::Native => 1000,
            EnglishLevel::Advanced => 750,
            EnglishLevel::Intermediate => 500,
            EnglishLevel::Basic => 0,
        }
    }
}

/// Calculator inputs; every choice is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScholarshipRequest {
    pub nationality: Option<Nationality>,
    pub course_level: Option<CourseLevel>,
    pub grades: Option<GradeBand>,
    pub english_level: Option<EnglishLevel>,
    pub has_extra_curricular: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipEstimate {
    pub amount: u32,
    pub is_eligible: bool,
    pub percentage_covered: u32,
    pub recommended_universities: Vec<String>,
}

pub fn estimate(request: &ScholarshipRequest) -> Result<ScholarshipEstimate, FieldErrors> {
    let mut errors = FieldErrors::default();
    if request.nationality.is_none() {
        errors.insert("nationality", REQUIRED);
    }
    if request.course_level.is_none() {
        errors.insert("courseLevel", REQUIRED);
    }
    if request.grades.is_none() {
        errors.insert("grades", REQUIRED);
    }
    if request.english_level.is_none() {
        errors.insert("englishLevel", REQUIRED);
    }

    let (Some(course), Some(grades), Some(english)) =
        (request.course_level, request.grades, request.english_level)
    else {
        return Err(errors);
    };
    errors.into_result()?;

    let extra = if request.has_extra_curricular {
        EXTRACURRICULAR_BONUS
    } else {
        0
    };
    let amount = course.base_amount() * grades.multiplier_tenths() / 10 + english.bonus() + extra;
    let tuition = course.tuition_fee();
    let percentage_covered = ((amount * 100 + tuition / 2) / tuition).min(100);

    Ok(ScholarshipEstimate {
        amount,
        is_eligible: grades != GradeBand::Below || english != EnglishLevel::Basic,
        percentage_covered,
        recommended_universities: RECOMMENDED_UNIVERSITIES
            .iter()
            .map(|name| name.to_string())
            .collect(),
    })
}

pub fn scholarship_router() -> Router {
    Router::new().route("/api/v1/scholarships/estimate", post(estimate_handler))
}

pub(crate) async fn estimate_handler(Json(request): Json<ScholarshipRequest>) -> Response {
    match estimate(&request) {
        Ok(estimate) => (StatusCode::OK, Json(estimate)).into_response(),
        Err(errors) => {
            let payload = json!({ "errors": errors });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
    }
}
