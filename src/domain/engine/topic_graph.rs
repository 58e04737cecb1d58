//! Topic graph engine.
//!
//! Drives one inbound message through the active topic: bootstrap or
//! completion strategy, then the transition table, then activation of the
//! next topic. Works on an owned copy of the session so a failed call
//! leaves the caller's persisted state untouched.

use std::sync::Arc;
use std::time::Duration;

use super::completion::{
    CompletionStrategy, RequiredFieldsStrategy, ScoredDialogueStrategy, TurnContext,
};
use super::model::ModelClient;
use super::transition::{decide, Transition};
use super::EngineError;
use crate::domain::foundation::TopicId;
use crate::domain::schema::{CompletionMode, FlowSchema, TopicSchema};
use crate::domain::session::SessionState;
use crate::ports::AIProvider;

/// Default number of transcript messages included in prompts.
pub const DEFAULT_TRANSCRIPT_WINDOW: usize = 10;
/// Default extra attempts for malformed model output.
pub const DEFAULT_MALFORMED_JSON_RETRIES: u32 = 2;
/// Default bound on a single model call.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// Engine-wide defaults; schema and topic settings override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub transcript_window: usize,
    pub malformed_json_retries: u32,
    pub llm_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            transcript_window: DEFAULT_TRANSCRIPT_WINDOW,
            malformed_json_retries: DEFAULT_MALFORMED_JSON_RETRIES,
            llm_timeout: DEFAULT_LLM_TIMEOUT,
        }
    }
}

/// Result of processing one message.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub state: SessionState,
    /// Never empty.
    pub reply: String,
    /// `None` for a bootstrap or a no-op.
    pub transition: Option<Transition>,
}

/// Orchestrates the per-topic state machine.
pub struct TopicGraphEngine {
    required_fields: RequiredFieldsStrategy,
    scored: ScoredDialogueStrategy,
    settings: EngineSettings,
}

impl TopicGraphEngine {
    pub fn new(provider: Arc<dyn AIProvider>, settings: EngineSettings) -> Self {
        let client = ModelClient::new(provider, settings.llm_timeout);
        Self {
            required_fields: RequiredFieldsStrategy::new(client.clone()),
            scored: ScoredDialogueStrategy::new(client),
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn strategy_for(&self, topic: &TopicSchema) -> &dyn CompletionStrategy {
        match topic.completion {
            CompletionMode::RequiredFields => &self.required_fields,
            CompletionMode::Scored { .. } => &self.scored,
        }
    }

    /// Posts the active topic's intro if its transcript is empty.
    ///
    /// No model call is made. Returns the intro, or the latest assistant
    /// message when the topic was already started.
    pub fn bootstrap(
        &self,
        schema: &FlowSchema,
        mut state: SessionState,
    ) -> Result<ProcessOutcome, EngineError> {
        let active = state.active_topic_id.clone();
        let reply = activate(schema, &mut state, &active)?;
        tracing::debug!(
            session_id = %state.session_id,
            topic_id = %active,
            "topic bootstrapped"
        );
        Ok(ProcessOutcome {
            state,
            reply,
            transition: None,
        })
    }

    /// Processes one inbound message against the active topic.
    ///
    /// A missing or blank message on an unstarted topic bootstraps it; on a
    /// started topic it repeats the latest assistant message.
    pub async fn process(
        &self,
        schema: &FlowSchema,
        mut state: SessionState,
        message: Option<&str>,
    ) -> Result<ProcessOutcome, EngineError> {
        let message = message.map(str::trim).filter(|m| !m.is_empty());

        if state.done {
            return Ok(ProcessOutcome {
                state,
                reply: schema.completion_message.clone(),
                transition: Some(Transition::Complete),
            });
        }

        let Some(message) = message else {
            return self.bootstrap(schema, state);
        };

        let active_id = state.active_topic_id.clone();
        let topic = schema
            .topic(&active_id)
            .ok_or_else(|| EngineError::UnknownTopic(active_id.clone()))?;

        let mut reply = String::new();
        if state.needs_bootstrap() {
            reply = activate(schema, &mut state, &active_id)?;
        }

        let ctx = TurnContext {
            session_id: state.session_id,
            schema,
            topic,
            transcript_window: schema
                .transcript_window_for(topic)
                .unwrap_or(self.settings.transcript_window),
            malformed_json_retries: schema
                .retries_for(topic)
                .unwrap_or(self.settings.malformed_json_retries),
        };

        let data = state
            .active_topic_mut()
            .ok_or_else(|| EngineError::InvalidState(format!("no data for topic {}", active_id)))?;
        if data.is_complete() {
            return Err(EngineError::InvalidState(format!(
                "active topic {} is already complete",
                active_id
            )));
        }
        data.begin();
        data.push_user(message);

        let turn_reply = self.strategy_for(topic).run_turn(&ctx, data).await?;
        let topic_completed = data.is_complete();
        reply = join(reply, turn_reply);

        if topic_completed && state.revisiting_topic_id.as_ref() == Some(&active_id) {
            state.revisiting_topic_id = None;
        }

        let transition = decide(schema, &state);
        tracing::info!(
            session_id = %state.session_id,
            topic_id = %active_id,
            transition = ?transition,
            "message processed"
        );

        match &transition {
            Transition::Stay => {}
            Transition::AdvanceTopic { topic } | Transition::AdvanceStep { topic, .. } => {
                if state.resume_topic_id.is_some() && state.revisiting_topic_id.is_none() {
                    state.resume_topic_id = None;
                }
                let next = activate(schema, &mut state, topic)?;
                reply = join(reply, next);
            }
            Transition::Complete => {
                state.done = true;
                state.revisiting_topic_id = None;
                state.resume_topic_id = None;
                reply = join(reply, schema.completion_message.clone());
            }
        }

        Ok(ProcessOutcome {
            state,
            reply,
            transition: Some(transition),
        })
    }
}

/// Makes `topic_id` active and returns the text to show for it.
fn activate(
    schema: &FlowSchema,
    state: &mut SessionState,
    topic_id: &TopicId,
) -> Result<String, EngineError> {
    let placed = schema
        .placed(topic_id)
        .ok_or_else(|| EngineError::UnknownTopic(topic_id.clone()))?;

    state.active_topic_id = topic_id.clone();
    state.active_step_id = placed.step_id().cloned();

    let data = state
        .topic_mut(topic_id)
        .ok_or_else(|| EngineError::InvalidState(format!("no data for topic {}", topic_id)))?;
    data.begin();

    if data.transcript.is_empty() {
        data.push_assistant(placed.topic.intro.clone());
        return Ok(placed.topic.intro.clone());
    }
    Ok(data
        .last_assistant_message()
        .map(str::to_string)
        .unwrap_or_else(|| placed.topic.intro.clone()))
}

fn join(first: String, second: String) -> String {
    if first.is_empty() {
        second
    } else {
        format!("{}\n\n{}", first, second)
    }
}
