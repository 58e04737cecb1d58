//! Topic completion strategies.
//!
//! A strategy runs one user turn on the active topic: it talks to the
//! model, appends the assistant reply to the transcript, records field
//! values or the score, and marks the topic Complete when satisfied.

use async_trait::async_trait;

use super::extractor::{check_completion, missing_required, FieldExtractor};
use super::model::ModelClient;
use super::retry::{call_scored, call_text};
use super::EngineError;
use crate::domain::foundation::SessionId;
use crate::domain::schema::{CompletionMode, FlowSchema, TopicSchema};
use crate::domain::session::{Role, TopicData, TopicStatus};
use crate::ports::{CallPurpose, CompletionRequest, MessageRole, RequestMetadata};

const DEFAULT_PERSONA: &str = "You are a friendly intake assistant. Ask one short, specific \
question at a time to collect the missing information. Do not repeat information the user \
already gave.";

/// Per-turn inputs shared by every strategy.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub session_id: SessionId,
    pub schema: &'a FlowSchema,
    pub topic: &'a TopicSchema,
    /// Messages of transcript included in prompts (0 = all).
    pub transcript_window: usize,
    pub malformed_json_retries: u32,
}

impl TurnContext<'_> {
    pub(crate) fn metadata(&self) -> RequestMetadata {
        RequestMetadata::new(self.session_id, uuid::Uuid::new_v4().to_string())
            .with_topic(self.topic.id.clone())
    }
}

/// Runs a user turn for one completion mode.
#[async_trait]
pub trait CompletionStrategy: Send + Sync {
    /// Processes the latest user message already appended to `data`.
    ///
    /// Returns the assistant reply, which is also appended to the transcript.
    async fn run_turn(
        &self,
        ctx: &TurnContext<'_>,
        data: &mut TopicData,
    ) -> Result<String, EngineError>;
}

/// Completes once every required field is filled.
#[derive(Debug, Clone)]
pub struct RequiredFieldsStrategy {
    extractor: FieldExtractor,
    client: ModelClient,
}

impl RequiredFieldsStrategy {
    pub fn new(client: ModelClient) -> Self {
        Self {
            extractor: FieldExtractor::new(client.clone()),
            client,
        }
    }

    fn follow_up_request(&self, ctx: &TurnContext<'_>, data: &TopicData) -> CompletionRequest {
        let missing = missing_required(&data.fields, &ctx.topic.fields);
        let collected = data
            .fields
            .iter()
            .map(|(k, v)| format!("- {}: {}", k, v.display()))
            .collect::<Vec<_>>()
            .join("\n");
        let missing_list = missing
            .iter()
            .map(|f| format!("- {}", f.label))
            .collect::<Vec<_>>()
            .join("\n");

        let mut system = ctx
            .topic
            .prompts
            .system
            .clone()
            .unwrap_or_else(|| DEFAULT_PERSONA.to_string());
        system.push_str(&format!(
            "\n\nCurrent topic: {}.",
            ctx.topic.title
        ));
        if !ctx.topic.description.trim().is_empty() {
            system.push_str(&format!(" {}", ctx.topic.description.trim()));
        }
        system.push_str(&format!(
            "\n\nAlready collected:\n{}\n\nStill needed:\n{}",
            if collected.is_empty() { "- nothing yet".to_string() } else { collected },
            missing_list
        ));

        let mut request = CompletionRequest::new(ctx.metadata())
            .with_system_prompt(system)
            .with_temperature(0.7)
            .with_purpose(CallPurpose::Reply);
        for message in data.recent_transcript(ctx.transcript_window) {
            let role = match message.role {
                Role::User => MessageRole::User,
                Role::Assistant => MessageRole::Assistant,
            };
            request = request.with_message(role, message.text.clone());
        }
        request
    }
}

/// Reply used when the model cannot produce a follow-up question.
fn fallback_follow_up(ctx: &TurnContext<'_>, data: &TopicData) -> String {
    let labels: Vec<_> = missing_required(&data.fields, &ctx.topic.fields)
        .into_iter()
        .map(|f| f.label.as_str())
        .collect();
    if labels.is_empty() {
        format!("Could you tell me a bit more about {}?", ctx.topic.title)
    } else {
        format!("Could you tell me a bit more about: {}?", labels.join(", "))
    }
}

#[async_trait]
impl CompletionStrategy for RequiredFieldsStrategy {
    async fn run_turn(
        &self,
        ctx: &TurnContext<'_>,
        data: &mut TopicData,
    ) -> Result<String, EngineError> {
        let conversation = data.conversation_text(ctx.transcript_window);
        let delta = self
            .extractor
            .extract(
                &conversation,
                &ctx.topic.fields,
                ctx.topic.prompts.extraction_hint.as_deref(),
                ctx.metadata(),
            )
            .await;
        data.merge_fields(delta);

        let reply = if check_completion(&data.fields, &ctx.topic.fields) {
            data.transition(TopicStatus::Complete)?;
            format!("Thanks, that covers {}.", ctx.topic.title)
        } else {
            let request = self.follow_up_request(ctx, data);
            call_text(&self.client, request, ctx.malformed_json_retries)
                .await?
                .unwrap_or_else(|| fallback_follow_up(ctx, data))
        };

        data.push_assistant(reply.clone());
        Ok(reply)
    }
}

/// Completes once the model reports enough confidence and no missing input.
#[derive(Debug, Clone)]
pub struct ScoredDialogueStrategy {
    client: ModelClient,
}

impl ScoredDialogueStrategy {
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompletionStrategy for ScoredDialogueStrategy {
    async fn run_turn(
        &self,
        ctx: &TurnContext<'_>,
        data: &mut TopicData,
    ) -> Result<String, EngineError> {
        let CompletionMode::Scored {
            min_confidence,
            pre_prompt,
        } = &ctx.topic.completion
        else {
            return Err(EngineError::InvalidState(format!(
                "topic {} is not scored",
                ctx.topic.id
            )));
        };

        let conversation = data.conversation_text(ctx.transcript_window);
        let mut request = CompletionRequest::new(ctx.metadata())
            .with_message(MessageRole::User, format!("{}\n\n{}", pre_prompt, conversation))
            .with_purpose(CallPurpose::ScoredEvaluation);
        if let Some(system) = &ctx.topic.prompts.system {
            request = request.with_system_prompt(system.clone());
        }

        let call = call_scored(&self.client, request, ctx.malformed_json_retries).await?;
        let score = call.score;
        let reply = score.value.clone();

        if !score.needs_more_input && score.confidence >= *min_confidence {
            data.transition(TopicStatus::Complete)?;
        }
        tracing::debug!(
            topic_id = %ctx.topic.id,
            confidence = score.confidence,
            needs_more_input = score.needs_more_input,
            attempts = call.attempts,
            "scored evaluation"
        );

        data.score = Some(score);
        data.push_assistant(reply.clone());
        Ok(reply)
    }
}
