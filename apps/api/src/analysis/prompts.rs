// Resume analysis prompt template.
// Placeholders are substituted by `build_prompt` in a single pass over the
// template, so substituted values are never scanned again.

use crate::analysis::models::AnalysisRequest;

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the resume below against the candidate's target role, target company and years of experience.

Target Role: {target_role}
Target Company: {target_company}
Years of Experience sought: {years_of_experience}

Resume Text for Analysis:
---
{resume_text}
---

Return a single JSON object with exactly two top-level keys:

1. "extracted_fields": an object with the parsed resume data. Use null for a missing single value and [] for a missing list.
   - "name" (string)
   - "email" (string)
   - "phone" (string)
   - "linkedin" (string, full URL)
   - "skills" (array of strings, industry-relevant keywords)
   - "work_experience" (array of {"company", "role", "dates", "description"}; description summarizes responsibilities and quantified achievements)
   - "education" (array of {"degree", "institution", "dates"})
   - "summary_or_objective" (string)
   - "certifications" (array of strings)
   - "projects" (array of {"name", "description"})
   - "languages" (array of strings, with proficiency if stated)

2. "questionnaire_prompt": a multi-paragraph string of personalized feedback that
   - opens with a strength of the resume relevant to the target role,
   - names 1-3 concrete areas for improvement with actionable advice (missing metrics, missing role keywords, unclear progression, formatting),
   - gives tailoring advice for the target company, or for that type of company if none is given,
   - ends with a numbered questionnaire of 3-5 questions that help the candidate write stronger content.
   Separate paragraphs with blank lines ("\n\n") and use "*" for bullet points.

Example of the expected structure:
{
  "extracted_fields": {
    "name": "Alex Johnson",
    "email": "alex.j@example.com",
    "phone": "+1 (555) 123-4567",
    "linkedin": "https://www.linkedin.com/in/alexjohnson",
    "skills": ["Python", "SQL", "Machine Learning", "Communication"],
    "work_experience": [
      {"company": "Data Insights Corp", "role": "Data Scientist", "dates": "Jan 2022 - Present", "description": "Built churn models (15% reduction); automated pipelines saving 10 hours/week."}
    ],
    "education": [
      {"degree": "B.Sc. Computer Science", "institution": "City College", "dates": "2014-2018"}
    ],
    "summary_or_objective": "Data Scientist with 4+ years of experience shipping ML models.",
    "certifications": [],
    "projects": [
      {"name": "Sales Forecasting Dashboard", "description": "SQL and Python dashboard that improved forecast accuracy by 10%."}
    ],
    "languages": ["English (Native)"]
  },
  "questionnaire_prompt": "Your resume shows strong, quantified data science work.\n\nTo stand out for this role, consider:\n\n* **Scale:** describe data volumes and system size.\n* **Leadership:** call out projects you led.\n\nQuestions to refine your resume:\n\n1. How large were the datasets you worked with?\n2. Which project are you proudest of, and why?\n3. Where did your work change a business decision?"
}"#;

/// Fills the analysis template for one request.
pub fn build_prompt(request: &AnalysisRequest, resume_text: &str) -> String {
    let years = request.years_of_experience.to_string();
    let company = request.target_company.as_deref().unwrap_or("Not specified");
    let values: [(&str, &str); 4] = [
        ("{target_role}", request.target_role.as_str()),
        ("{target_company}", company),
        ("{years_of_experience}", years.as_str()),
        ("{resume_text}", resume_text),
    ];

    let mut prompt = String::with_capacity(ANALYSIS_PROMPT_TEMPLATE.len() + resume_text.len());
    let mut rest = ANALYSIS_PROMPT_TEMPLATE;
    while let Some(open) = rest.find('{') {
        prompt.push_str(&rest[..open]);
        rest = &rest[open..];
        match values.iter().find(|(name, _)| rest.starts_with(name)) {
            Some((name, value)) => {
                prompt.push_str(value);
                rest = &rest[name.len()..];
            }
            None => {
                // Literal brace, e.g. in the example JSON.
                prompt.push('{');
                rest = &rest[1..];
            }
        }
    }
    prompt.push_str(rest);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn request(company: Option<&str>) -> AnalysisRequest {
        AnalysisRequest {
            document: Bytes::new(),
            target_role: "Backend Engineer".to_string(),
            target_company: company.map(String::from),
            years_of_experience: 5.0,
        }
    }

    #[test]
    fn test_prompt_contains_request_fields() {
        let prompt = build_prompt(&request(Some("Acme")), "Jane Doe\nRust, Go");
        assert!(prompt.contains("Target Role: Backend Engineer"));
        assert!(prompt.contains("Target Company: Acme"));
        assert!(prompt.contains("Years of Experience sought: 5\n"));
        assert!(prompt.contains("Jane Doe\nRust, Go"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_missing_company_says_not_specified() {
        let prompt = build_prompt(&request(None), "text");
        assert!(prompt.contains("Target Company: Not specified"));
    }

    #[test]
    fn test_resume_text_is_not_reinterpreted_as_placeholders() {
        let prompt = build_prompt(&request(None), "I like {target_role} braces");
        assert!(prompt.contains("I like {target_role} braces"));
    }

    #[test]
    fn test_placeholder_tokens_in_fields_stay_literal() {
        let mut req = request(Some("{years_of_experience} Corp"));
        req.target_role = "Engineer {resume_text}".to_string();
        let prompt = build_prompt(&req, "RESUME BODY");
        assert!(prompt.contains("Target Role: Engineer {resume_text}\n"));
        assert!(prompt.contains("Target Company: {years_of_experience} Corp\n"));
        assert!(prompt.contains("Years of Experience sought: 5\n"));
        assert_eq!(prompt.matches("RESUME BODY").count(), 1);
        assert!(prompt.contains("---\nRESUME BODY\n---"));
    }

    #[test]
    fn test_example_json_braces_are_kept() {
        let prompt = build_prompt(&request(None), "text");
        assert!(prompt.contains(r#"(array of {"company", "role", "dates", "description"};"#));
        assert!(prompt.contains("Example of the expected structure:\n{\n  \"extracted_fields\": {"));
        assert_eq!(prompt.matches('{').count(), ANALYSIS_PROMPT_TEMPLATE.matches('{').count() - 4);
    }
}
