use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The fixed catalog of study methods offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudyMethod {
    #[serde(rename = "Practice Quizzes")]
    PracticeQuizzes,
    #[serde(rename = "Reading Sections")]
    ReadingSections,
    #[serde(rename = "Flashcards")]
    Flashcards,
    #[serde(rename = "Mind Mapping")]
    MindMapping,
    #[serde(rename = "Group Study")]
    GroupStudy,
    #[serde(rename = "Videos")]
    Videos,
}

impl StudyMethod {
    pub const ALL: [StudyMethod; 6] = [
        StudyMethod::PracticeQuizzes,
        StudyMethod::ReadingSections,
        StudyMethod::Flashcards,
        StudyMethod::MindMapping,
        StudyMethod::GroupStudy,
        StudyMethod::Videos,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StudyMethod::PracticeQuizzes => "Practice Quizzes",
            StudyMethod::ReadingSections => "Reading Sections",
            StudyMethod::Flashcards => "Flashcards",
            StudyMethod::MindMapping => "Mind Mapping",
            StudyMethod::GroupStudy => "Group Study",
            StudyMethod::Videos => "Videos",
        }
    }

    /// Looks a form value up in the catalog, ignoring case and surrounding whitespace.
    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for StudyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated plan request. Only `validation::validate_form` builds one from user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanRequest {
    pub subject: String,
    pub deadline: NaiveDate,
    pub sections: Vec<String>,
    pub study_methods: Vec<StudyMethod>,
    /// Sessions per week.
    pub frequency: u32,
    /// Minutes per session.
    pub duration: u32,
    /// Optional word whose definition is worked into the tips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub define: Option<String>,
}

impl StudyPlanRequest {
    pub fn sections_joined(&self) -> String {
        self.sections.join(", ")
    }

    pub fn study_methods_joined(&self) -> String {
        self.study_methods
            .iter()
            .map(StudyMethod::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The pair of generated artifacts for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub study_schedule: String,
    pub study_tips: String,
}

/// Successful generation: the plan plus an echo of the request for the later save step.
/// Clients send the same shape back to save it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    #[serde(flatten)]
    pub plan: GeneratedPlan,
    pub request: StudyPlanRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_method_lookup_is_case_insensitive() {
        assert_eq!(
            StudyMethod::from_label(" practice quizzes "),
            Some(StudyMethod::PracticeQuizzes)
        );
        assert_eq!(StudyMethod::from_label("Flashcards"), Some(StudyMethod::Flashcards));
        assert_eq!(StudyMethod::from_label("Cramming"), None);
    }

    #[test]
    fn test_study_method_serializes_as_label() {
        let json = serde_json::to_string(&StudyMethod::MindMapping).unwrap();
        assert_eq!(json, "\"Mind Mapping\"");
    }

    #[test]
    fn test_plan_response_flattens_plan_fields() {
        let response = PlanResponse {
            plan: GeneratedPlan {
                study_schedule: "# Week 1".into(),
                study_tips: "- Sleep".into(),
            },
            request: StudyPlanRequest {
                subject: "History".into(),
                deadline: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                sections: vec!["The Great War".into()],
                study_methods: vec![StudyMethod::Flashcards],
                frequency: 3,
                duration: 60,
                define: None,
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["studySchedule"], "# Week 1");
        assert_eq!(value["studyTips"], "- Sleep");
        assert_eq!(value["request"]["deadline"], "2024-12-31");
        assert_eq!(value["request"]["studyMethods"][0], "Flashcards");
        assert!(value["request"].get("define").is_none());
    }
}
