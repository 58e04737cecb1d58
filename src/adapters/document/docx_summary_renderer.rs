//! Word summary renderer adapter.
//!
//! Lays a finished session out as a `.docx`: a centred title, the session
//! id, then one heading per started step and topic. Completed topics get a
//! "Summary:" block with the collected field values and the accepted
//! answer of scored topics.

use std::io::Cursor;

use docx_rs::{AlignmentType, Docx, Paragraph, Run, Style, StyleType};

use super::file_name_with_extension;
use crate::domain::engine::visible_topics;
use crate::domain::schema::{FlowSchema, StepSchema};
use crate::domain::session::{SessionState, TopicStatus};
use crate::ports::{RenderError, RenderedDocument, SummaryRenderer};

const CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// One paragraph of the summary before it is laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Title(String),
    SessionLine(String),
    StepHeading(String),
    TopicHeading(String),
    Description(String),
    SummaryLabel,
    Text(String),
}

impl Block {
    fn into_paragraph(self) -> Paragraph {
        match self {
            Block::Title(text) => Paragraph::new()
                .add_run(Run::new().add_text(text))
                .style("Heading1")
                .align(AlignmentType::Center),
            Block::SessionLine(text) | Block::Description(text) => {
                Paragraph::new().add_run(Run::new().add_text(text).italic())
            }
            Block::StepHeading(text) => heading("Heading1", text),
            Block::TopicHeading(text) => heading("Heading2", text),
            Block::SummaryLabel => heading("Heading3", "Summary:"),
            Block::Text(text) => Paragraph::new().add_run(Run::new().add_text(text)),
        }
    }
}

fn heading(style: &str, text: impl Into<String>) -> Paragraph {
    Paragraph::new()
        .add_run(Run::new().add_text(text))
        .style(style)
}

fn heading_style(id: &str, name: &str, size: usize) -> Style {
    Style::new(id, StyleType::Paragraph)
        .name(name)
        .size(size)
        .bold()
}

/// Renders summaries as Word documents with `docx-rs`.
#[derive(Debug, Clone, Default)]
pub struct DocxSummaryRenderer;

impl DocxSummaryRenderer {
    pub fn new() -> Self {
        Self
    }

    fn outline(&self, schema: &FlowSchema, state: &SessionState) -> Vec<Block> {
        let title = schema.document.title.as_deref().unwrap_or(&schema.title);
        let mut blocks = vec![
            Block::Title(title.to_string()),
            Block::SessionLine(format!("Session ID: {}", state.session_id)),
        ];

        let started = |status: Option<TopicStatus>| {
            status.is_some_and(|s| s != TopicStatus::NotStarted)
        };

        let mut current_step: Option<&StepSchema> = None;
        for placed in visible_topics(schema, state) {
            let data = state.topic(&placed.topic.id);
            if !started(data.map(|d| d.status)) {
                continue;
            }

            if let Some(step) = placed.step {
                if current_step.map(|s| &s.id) != Some(&step.id) {
                    blocks.push(Block::StepHeading(step.title.clone()));
                    current_step = Some(step);
                }
            }

            let topic = placed.topic;
            blocks.push(Block::TopicHeading(topic.title.clone()));
            if !topic.description.trim().is_empty() {
                blocks.push(Block::Description(topic.description.trim().to_string()));
            }

            let Some(data) = data.filter(|d| d.status == TopicStatus::Complete) else {
                continue;
            };
            let mut values: Vec<String> = topic
                .fields
                .iter()
                .filter_map(|field| {
                    data.field(&field.key)
                        .filter(|v| v.is_filled())
                        .map(|v| format!("{}: {}", field.label, v.display()))
                })
                .collect();
            if let Some(score) = &data.score {
                values.push(score.value.clone());
            }
            if !values.is_empty() {
                blocks.push(Block::SummaryLabel);
                blocks.extend(values.into_iter().map(Block::Text));
            }
        }
        blocks
    }

    fn pack(&self, blocks: Vec<Block>) -> Result<Vec<u8>, RenderError> {
        let docx = blocks.into_iter().fold(
            Docx::new()
                .add_style(heading_style("Heading1", "Heading 1", 32))
                .add_style(heading_style("Heading2", "Heading 2", 28))
                .add_style(heading_style("Heading3", "Heading 3", 24)),
            |docx, block| docx.add_paragraph(block.into_paragraph()),
        );

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| RenderError::Failed(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

impl SummaryRenderer for DocxSummaryRenderer {
    fn render(
        &self,
        schema: &FlowSchema,
        state: &SessionState,
    ) -> Result<RenderedDocument, RenderError> {
        if !state.done {
            return Err(RenderError::Incomplete(state.session_id.to_string()));
        }

        let bytes = self.pack(self.outline(schema, state))?;
        tracing::debug!(session_id = %state.session_id, bytes = bytes.len(), "summary rendered");

        Ok(RenderedDocument {
            bytes,
            content_type: CONTENT_TYPE.to_string(),
            file_name: file_name_with_extension(&schema.document.file_name, "docx"),
        })
    }
}
