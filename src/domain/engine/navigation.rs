//! Explicit revisit of a completed topic.

use super::NavigationError;
use crate::domain::foundation::{StepId, TopicId};
use crate::domain::schema::FlowSchema;
use crate::domain::session::SessionState;

/// Message returned when the target is already active.
pub const ALREADY_ACTIVE_MESSAGE: &str = "Already on target topic";

/// How a navigation request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    Revisit,
    AlreadyActive,
}

/// Result of a successful navigation.
#[derive(Debug, Clone)]
pub struct Navigated {
    pub state: SessionState,
    pub message: String,
    pub kind: NavigationKind,
}

/// Acknowledgement posted to a reopened topic.
pub fn revisit_acknowledgement(title: &str) -> String {
    format!(
        "No worries, keen to revisit {}. What would you like to change?",
        title
    )
}

/// Reopens `topic_id` for editing.
///
/// Validation happens before any mutation, so an error leaves `state`
/// exactly as it was.
pub fn navigate(
    schema: &FlowSchema,
    mut state: SessionState,
    topic_id: &TopicId,
    step_id: Option<&StepId>,
) -> Result<Navigated, NavigationError> {
    let placed = schema
        .placed(topic_id)
        .filter(|_| state.topics.contains_key(topic_id))
        .ok_or_else(|| NavigationError::UnknownTopic(topic_id.clone()))?;

    if let Some(step_id) = step_id {
        let step = schema
            .step(step_id)
            .ok_or_else(|| NavigationError::UnknownStep(step_id.clone()))?;
        if !step.topics.iter().any(|t| &t.id == topic_id) {
            return Err(NavigationError::TopicNotInStep {
                topic: topic_id.clone(),
                step: step_id.clone(),
            });
        }
    }

    if &state.active_topic_id == topic_id {
        return Ok(Navigated {
            state,
            message: ALREADY_ACTIVE_MESSAGE.to_string(),
            kind: NavigationKind::AlreadyActive,
        });
    }

    let is_complete = state.topic(topic_id).is_some_and(|t| t.is_complete());
    if !is_complete {
        return Err(NavigationError::NotComplete(topic_id.clone()));
    }

    let message = revisit_acknowledgement(&placed.topic.title);
    let previous = std::mem::replace(&mut state.active_topic_id, topic_id.clone());
    state.resume_topic_id = Some(previous);
    state.revisiting_topic_id = Some(topic_id.clone());
    state.active_step_id = placed.step_id().cloned();
    state.done = false;

    if let Some(data) = state.topic_mut(topic_id) {
        data.reopen()
            .map_err(|_| NavigationError::NotComplete(topic_id.clone()))?;
        data.push_assistant(message.clone());
    }

    tracing::info!(
        session_id = %state.session_id,
        topic_id = %topic_id,
        "topic reopened for revisit"
    );

    Ok(Navigated {
        state,
        message,
        kind: NavigationKind::Revisit,
    })
}
