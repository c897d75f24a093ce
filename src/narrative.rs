// Narrative generation: turn a facts bundle into executive-summary text.
//
// Two interchangeable strategies implement `Narrator`:
// - `TemplateNarrator` fills a fixed Markdown template and is fully
//   deterministic.
// - `ExternalNarrator` asks a chat-completion service for the summary and
//   falls back to the template when the call fails or returns nothing.
use crate::error::{PipelineError, Result};
use crate::types::FactsBundle;
use crate::util::format_int;
use log::{debug, warn};
use serde_json::json;
use std::time::Duration;

pub trait Narrator {
    fn name(&self) -> &'static str;

    /// Render the narrative. Implementations only read the facts.
    fn narrate(&self, facts: &FactsBundle) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl Narrator for TemplateNarrator {
    fn name(&self) -> &'static str {
        "template"
    }

    fn narrate(&self, facts: &FactsBundle) -> String {
        render_template(facts)
    }
}

pub fn render_template(facts: &FactsBundle) -> String {
    let top = &facts.top_region_by_completion;
    let bottom = &facts.bottom_region_by_completion;
    let mut out = String::new();

    out.push_str("### 📊 **Performance Summary**\n");
    out.push_str(&format!("- Total Trainees: {}\n", format_int(facts.total_trainees)));
    out.push_str(&format!("- Total Placed: {}\n", format_int(facts.total_placed)));
    out.push_str(&format!(
        "- Average Course Completion: {:.2}%\n",
        facts.avg_completion
    ));
    out.push_str(&format!(
        "- Overall Placement Rate: {:.2}%\n",
        facts.placement_rate
    ));
    out.push_str(&format!("- Top Region by Completion: **{}**\n", top));
    out.push_str(&format!("- Region Needing Support: **{}**\n", bottom));

    out.push_str("\n### 💡 **AI-Driven Insights**\n");
    out.push_str(
        "- Regions with higher completion rates show stronger placement outcomes, \
         indicating effective training and learner engagement.\n",
    );
    out.push_str(&format!(
        "- There’s a noticeable opportunity to boost performance in `{}` by analyzing \
         methods used in `{}`.\n",
        bottom, top
    ));
    out.push_str(
        "- Trainee engagement and course completion strongly correlate with \
         employability outcomes.\n",
    );

    out.push_str("\n### ✅ **Suggested Actions**\n");
    out.push_str(&format!(
        "- Conduct peer-learning workshops for trainers in `{}`.\n",
        bottom
    ));
    out.push_str(&format!(
        "- Replicate best practices from `{}` across other regions.\n",
        top
    ));
    out.push_str(
        "- Enhance post-training support to increase placement conversion rates by 5–10%.\n",
    );
    out
}

pub const SYSTEM_PROMPT: &str = "You are a helpful analyst.";

/// Prompt sent to the external generator. The facts are embedded as JSON.
pub fn build_prompt(facts: &FactsBundle) -> Result<String> {
    let facts_json = serde_json::to_string(facts)?;
    Ok(format!(
        "You are an executive analyst for a training NGO. Given the following facts about a \
         training program, write a concise executive summary of 4-5 sentences and 2 short \
         actionable suggestions (each 1 sentence).\n\
         Facts: {}\n\
         Instructions: Use plain language, be concise, avoid inventing facts, and provide two \
         practical suggestions.",
        facts_json
    ))
}

/// A chat-completion backend: system + user message in, reply text out.
pub trait CompletionClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

pub struct ExternalNarrator<C> {
    client: C,
}

impl<C: CompletionClient> ExternalNarrator<C> {
    pub fn new(client: C) -> Self {
        ExternalNarrator { client }
    }

    fn request(&self, facts: &FactsBundle) -> Result<String> {
        let prompt = build_prompt(facts)?;
        let reply = self.client.complete(SYSTEM_PROMPT, &prompt)?;
        Ok(reply.trim().to_string())
    }
}

impl<C: CompletionClient> Narrator for ExternalNarrator<C> {
    fn name(&self) -> &'static str {
        "external"
    }

    fn narrate(&self, facts: &FactsBundle) -> String {
        match self.request(facts) {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                warn!("External narrative was empty, using template summary");
                render_template(facts)
            }
            Err(e) => {
                warn!("External narrative failed: {}; using template summary", e);
                render_template(facts)
            }
        }
    }
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    http: reqwest::blocking::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PipelineError::Narrative(format!("failed to build HTTP client: {}", e)))?;
        Ok(OpenAiClient {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            http,
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt}
            ],
            "max_tokens": 250,
            "temperature": 0.2
        });
        debug!("requesting narrative from {} ({})", self.base_url, self.model);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PipelineError::Narrative(format!("API call failed: {}", e)))?;

        let response_json: serde_json::Value = response
            .json()
            .map_err(|e| PipelineError::Narrative(format!("failed to parse response: {}", e)))?;

        response_json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PipelineError::Narrative("no content in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn facts() -> FactsBundle {
        FactsBundle {
            total_trainees: 12_345,
            total_placed: 9_876,
            avg_completion: 70.0,
            placement_rate: 80.0,
            top_region_by_completion: "North".to_string(),
            bottom_region_by_completion: "South".to_string(),
        }
    }

    struct FakeClient {
        reply: Option<String>,
        seen: RefCell<Vec<String>>,
    }

    impl FakeClient {
        fn new(reply: Option<&str>) -> Self {
            FakeClient {
                reply: reply.map(str::to_string),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompletionClient for FakeClient {
        fn complete(&self, _system: &str, prompt: &str) -> Result<String> {
            self.seen.borrow_mut().push(prompt.to_string());
            self.reply
                .clone()
                .ok_or_else(|| PipelineError::Narrative("offline".to_string()))
        }
    }

    #[test]
    fn test_template_is_deterministic() {
        let f = facts();
        assert_eq!(render_template(&f), render_template(&f));
    }

    #[test]
    fn test_template_contains_every_fact() {
        let text = render_template(&facts());
        assert!(text.contains("Total Trainees: 12,345"));
        assert!(text.contains("Total Placed: 9,876"));
        assert!(text.contains("Average Course Completion: 70.00%"));
        assert!(text.contains("Overall Placement Rate: 80.00%"));
        assert!(text.contains("Top Region by Completion: **North**"));
        assert!(text.contains("Region Needing Support: **South**"));
        assert!(text.contains("workshops for trainers in `South`"));
        assert!(text.contains("best practices from `North`"));
    }

    #[test]
    fn test_template_sections_in_order() {
        let text = render_template(&facts());
        let summary = text.find("Performance Summary").unwrap();
        let insights = text.find("AI-Driven Insights").unwrap();
        let actions = text.find("Suggested Actions").unwrap();
        assert!(summary < insights && insights < actions);
    }

    #[test]
    fn test_template_keeps_report_wording() {
        let text = render_template(&facts());
        assert!(text.contains("### 💡 **AI-Driven Insights**\n"));
        assert!(text.contains(
            "- There’s a noticeable opportunity to boost performance in `South`"
        ));
        assert!(text.contains("placement conversion rates by 5–10%.\n"));
    }

    #[test]
    fn test_template_with_empty_regions() {
        let f = FactsBundle::default();
        let text = render_template(&f);
        assert!(text.contains("Top Region by Completion: ****"));
        assert!(text.contains("Overall Placement Rate: 0.00%"));
    }

    #[test]
    fn test_prompt_embeds_facts_json() {
        let prompt = build_prompt(&facts()).unwrap();
        assert!(prompt.contains("\"total_trainees\":12345"));
        assert!(prompt.contains("\"top_region_by_completion\":\"North\""));
    }

    #[test]
    fn test_external_reply_is_trimmed() {
        let n = ExternalNarrator::new(FakeClient::new(Some("  Things went well.\n")));
        assert_eq!(n.narrate(&facts()), "Things went well.");
        assert_eq!(n.client.seen.borrow().len(), 1);
    }

    #[test]
    fn test_external_failure_falls_back_to_template() {
        let f = facts();
        let n = ExternalNarrator::new(FakeClient::new(None));
        assert_eq!(n.narrate(&f), render_template(&f));
    }

    #[test]
    fn test_external_empty_reply_falls_back_to_template() {
        let f = facts();
        let n = ExternalNarrator::new(FakeClient::new(Some("   ")));
        assert_eq!(n.narrate(&f), render_template(&f));
    }
}
