//! Markdown summary renderer adapter.
//!
//! Renders a finished session as a markdown document: one section per
//! visible step and topic, listing the collected field values and, for
//! scored topics, the accepted answer.

use chrono::{SecondsFormat, Utc};

use super::file_name_with_extension;
use crate::domain::engine::visible_topics;
use crate::domain::schema::{FlowSchema, TopicSchema};
use crate::domain::session::{SessionState, TopicData};
use crate::ports::{RenderError, RenderedDocument, SummaryRenderer};

const CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// Template-based implementation of `SummaryRenderer`.
#[derive(Debug, Clone)]
pub struct MarkdownSummaryRenderer {
    include_timestamp: bool,
}

impl Default for MarkdownSummaryRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownSummaryRenderer {
    pub fn new() -> Self {
        Self {
            include_timestamp: true,
        }
    }

    /// Omits the "Generated" line, which makes output reproducible.
    pub fn without_timestamp(mut self) -> Self {
        self.include_timestamp = false;
        self
    }

    fn header(&self, schema: &FlowSchema, state: &SessionState) -> String {
        let title = schema.document.title.as_deref().unwrap_or(&schema.title);
        let mut out = format!("# {}\n\n", title);
        out.push_str(&format!("**Session:** {}\n", state.session_id));
        if self.include_timestamp {
            out.push_str(&format!(
                "**Generated:** {}\n",
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        out.push('\n');
        out
    }

    fn topic_section(&self, level: &str, topic: &TopicSchema, data: Option<&TopicData>) -> String {
        let mut section = format!("{} {}\n\n", level, topic.title);
        if !topic.description.trim().is_empty() {
            section.push_str(&format!("*{}*\n\n", topic.description.trim()));
        }

        let Some(data) = data else {
            section.push_str("*Not answered*\n\n");
            return section;
        };

        let mut wrote_any = false;
        for field in &topic.fields {
            if let Some(value) = data.field(&field.key).filter(|v| v.is_filled()) {
                section.push_str(&format!("- **{}:** {}\n", field.label, value.display()));
                wrote_any = true;
            }
        }
        if wrote_any {
            section.push('\n');
        }

        if let Some(score) = &data.score {
            section.push_str(&format!("> {}\n\n", score.value));
            wrote_any = true;
        }

        if !wrote_any {
            section.push_str("*Not answered*\n\n");
        }
        section
    }
}

impl SummaryRenderer for MarkdownSummaryRenderer {
    fn render(
        &self,
        schema: &FlowSchema,
        state: &SessionState,
    ) -> Result<RenderedDocument, RenderError> {
        if !state.done {
            return Err(RenderError::Incomplete(state.session_id.to_string()));
        }

        let mut doc = self.header(schema, state);
        let mut current_step = None;
        for placed in visible_topics(schema, state) {
            let level = match placed.step {
                Some(step) => {
                    if current_step != Some(&step.id) {
                        doc.push_str(&format!("## {}\n\n", step.title));
                        current_step = Some(&step.id);
                    }
                    "###"
                }
                None => "##",
            };
            doc.push_str(&self.topic_section(level, placed.topic, state.topic(&placed.topic.id)));
        }

        tracing::debug!(session_id = %state.session_id, bytes = doc.len(), "summary rendered");

        Ok(RenderedDocument {
            bytes: doc.into_bytes(),
            content_type: CONTENT_TYPE.to_string(),
            file_name: file_name_with_extension(&schema.document.file_name, "md"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{FieldValue, TopicId};
    use crate::domain::session::{TopicScore, TopicStatus};

    fn schema() -> FlowSchema {
        serde_json::from_str(
            r#"{"name":"s","title":"Initiative Intake",
                "document":{"fileName":"initiative.md"},
                "steps":[
                  {"id":"idea","title":"The Idea","topics":[
                    {"id":"pitch","title":"Pitch","description":"One line summary","intro":"?",
                     "fields":[{"key":"name","label":"Name","required":true},
                               {"key":"areas","label":"Areas","type":"multiselect","options":["finance","ops"]}]},
                    {"id":"budget","title":"Budget","intro":"?",
                     "showIf":{"field":"areas","operator":"contains","value":"finance"}}]},
                  {"id":"impact","title":"Impact","topics":[
                    {"id":"value","title":"Value","intro":"?",
                     "completion":{"mode":"scored","minConfidence":0.7,"prePrompt":"Assess"}}]}
                ]}"#,
        )
        .unwrap()
    }

    fn finished(schema: &FlowSchema) -> SessionState {
        let mut state = SessionState::start(schema).unwrap();
        let pitch = state.topic_mut(&TopicId::new("pitch").unwrap()).unwrap();
        pitch.fields.insert("name".into(), FieldValue::text("Solar roofs"));
        pitch
            .fields
            .insert("areas".into(), FieldValue::choices(["ops"]));
        pitch.status = TopicStatus::Complete;
        let value = state.topic_mut(&TopicId::new("value").unwrap()).unwrap();
        value.status = TopicStatus::Complete;
        value.score = Some(TopicScore {
            value: "Cuts energy cost by a third".into(),
            confidence: 0.9,
            needs_more_input: false,
            missing: Vec::new(),
        });
        state.done = true;
        state
    }

    #[test]
    fn refuses_incomplete_session() {
        let schema = schema();
        let state = SessionState::start(&schema).unwrap();
        let err = MarkdownSummaryRenderer::new()
            .render(&schema, &state)
            .unwrap_err();
        assert!(matches!(err, RenderError::Incomplete(_)));
    }

    #[test]
    fn renders_visible_topics_with_values() {
        let schema = schema();
        let state = finished(&schema);

        let doc = MarkdownSummaryRenderer::new()
            .without_timestamp()
            .render(&schema, &state)
            .unwrap();
        let text = String::from_utf8(doc.bytes).unwrap();

        assert_eq!(doc.file_name, "initiative.md");
        assert_eq!(doc.content_type, CONTENT_TYPE);
        assert!(text.starts_with("# Initiative Intake\n"));
        assert!(text.contains(&format!("**Session:** {}", state.session_id)));
        assert!(!text.contains("**Generated:**"));
        assert!(text.contains("## The Idea"));
        assert!(text.contains("### Pitch"));
        assert!(text.contains("*One line summary*"));
        assert!(text.contains("- **Name:** Solar roofs"));
        assert!(text.contains("- **Areas:** ops"));
        assert!(text.contains("> Cuts energy cost by a third"));
        // Hidden: areas does not contain finance.
        assert!(!text.contains("Budget"));
    }

    #[test]
    fn includes_timestamp_by_default() {
        let schema = schema();
        let doc = MarkdownSummaryRenderer::new()
            .render(&schema, &finished(&schema))
            .unwrap();
        assert!(String::from_utf8(doc.bytes).unwrap().contains("**Generated:** "));
    }
}
