// Prompt constants for the free-form study planner.

use crate::llm_client::prompts::{render_template, JSON_ONLY_INSTRUCTION};

/// System prompt. Replace `{json_only}` before sending.
const STUDY_PLANNER_SYSTEM_TEMPLATE: &str = r#"You are a study planner assistant.

Always respond using this shape:

{
  "planSummary": string,
  "tasks": [
    {
      "title": string,
      "dueDate": string | null,
      "estimatedMinutes": number,
      "priority": "low" | "medium" | "high"
    }
  ],
  "notes": string
}

{json_only}"#;

/// User prompt template. Replace `{input}` before sending.
const USER_PROMPT_TEMPLATE: &str = "User input:\n{input}\n";

pub fn study_planner_system() -> String {
    render_template(STUDY_PLANNER_SYSTEM_TEMPLATE, &[("json_only", JSON_ONLY_INSTRUCTION)])
}

pub fn build_user_prompt(input: &str) -> String {
    render_template(USER_PROMPT_TEMPLATE, &[("input", input)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input_braces_are_kept() {
        assert_eq!(
            build_user_prompt("Plan {input} for {json_only}"),
            "User input:\nPlan {input} for {json_only}\n"
        );
    }

    #[test]
    fn test_user_prompt_wraps_input() {
        assert_eq!(
            build_user_prompt("Exam on Friday"),
            "User input:\nExam on Friday\n"
        );
    }

    #[test]
    fn test_system_prompt_declares_schema() {
        let system = study_planner_system();
        assert!(system.contains("\"planSummary\""));
        assert!(system.contains("\"estimatedMinutes\""));
        assert!(system.contains("valid JSON only"));
        assert!(!system.contains("{json_only}"));
    }
}
