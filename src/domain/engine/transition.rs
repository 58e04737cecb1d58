//! Transition table.
//!
//! Pure decision over a session snapshot, evaluated after every turn.

use serde::Serialize;

use super::visibility::{first_visible_incomplete, is_visible, next_visible_incomplete};
use crate::domain::foundation::{StepId, TopicId};
use crate::domain::schema::{FlowSchema, PlacedTopic};
use crate::domain::session::{SessionState, TopicStatus};

/// What happens to the session after a processed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// Active topic still open.
    Stay,
    /// Next topic within the same step (or a flat schema).
    AdvanceTopic { topic: TopicId },
    /// Next topic starts a different step.
    AdvanceStep { step: StepId, topic: TopicId },
    /// Every visible topic is complete.
    Complete,
}

/// Decides the next transition.
///
/// Candidate order once the active topic is complete: the topic recorded
/// in `resume_topic_id` (if still visible and open), the first visible open
/// topic after the active one, then the first visible open topic anywhere.
pub fn decide(schema: &FlowSchema, state: &SessionState) -> Transition {
    let active_complete = state
        .active_topic()
        .map_or(false, |t| t.status == TopicStatus::Complete);
    if !active_complete {
        return Transition::Stay;
    }

    let target = resume_candidate(schema, state)
        .or_else(|| next_visible_incomplete(schema, state, &state.active_topic_id))
        .or_else(|| first_visible_incomplete(schema, state));

    match target {
        None => Transition::Complete,
        Some(placed) => advance_to(&placed, state),
    }
}

fn resume_candidate<'a>(schema: &'a FlowSchema, state: &SessionState) -> Option<PlacedTopic<'a>> {
    let resume = state.resume_topic_id.as_ref()?;
    if resume == &state.active_topic_id {
        return None;
    }
    let placed = schema.placed(resume)?;
    let open = state
        .topic(resume)
        .map_or(true, |t| t.status != TopicStatus::Complete);
    (open && is_visible(&placed, schema, state)).then_some(placed)
}

fn advance_to(placed: &PlacedTopic<'_>, state: &SessionState) -> Transition {
    let topic = placed.topic.id.clone();
    match placed.step_id() {
        Some(step) if state.active_step_id.as_ref() != Some(step) => Transition::AdvanceStep {
            step: step.clone(),
            topic,
        },
        _ => Transition::AdvanceTopic { topic },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::FieldValue;

    fn stepped() -> FlowSchema {
        serde_json::from_str(
            r#"{"name":"s","title":"S","steps":[
                {"id":"one","title":"One","topics":[
                    {"id":"a","title":"A","intro":"A?",
                     "fields":[{"key":"interest","label":"I","type":"multiselect","options":["finance","ops"]}]},
                    {"id":"b","title":"B","intro":"B?",
                     "showIf":{"field":"interest","operator":"contains","value":"finance"}}]},
                {"id":"two","title":"Two","topics":[{"id":"c","title":"C","intro":"C?"}]}
            ]}"#,
        )
        .unwrap()
    }

    fn id(s: &str) -> TopicId {
        TopicId::new(s).unwrap()
    }

    fn complete(state: &mut SessionState, topic: &str) {
        state.topic_mut(&id(topic)).unwrap().status = TopicStatus::Complete;
    }

    #[test]
    fn stays_while_active_open() {
        let schema = stepped();
        let mut state = SessionState::start(&schema).unwrap();
        state.active_topic_mut().unwrap().begin();
        assert_eq!(decide(&schema, &state), Transition::Stay);
    }

    #[test]
    fn skips_hidden_topic_and_changes_step() {
        let schema = stepped();
        let mut state = SessionState::start(&schema).unwrap();
        complete(&mut state, "a");
        assert_eq!(
            decide(&schema, &state),
            Transition::AdvanceStep {
                step: StepId::new("two").unwrap(),
                topic: id("c")
            }
        );
    }

    #[test]
    fn advances_within_step_when_conditional_topic_visible() {
        let schema = stepped();
        let mut state = SessionState::start(&schema).unwrap();
        state
            .topic_mut(&id("a"))
            .unwrap()
            .fields
            .insert("interest".into(), FieldValue::choices(["finance"]));
        complete(&mut state, "a");
        assert_eq!(
            decide(&schema, &state),
            Transition::AdvanceTopic { topic: id("b") }
        );
    }

    #[test]
    fn completes_when_nothing_visible_is_open() {
        let schema = stepped();
        let mut state = SessionState::start(&schema).unwrap();
        complete(&mut state, "a");
        complete(&mut state, "c");
        state.active_topic_id = id("c");
        assert_eq!(decide(&schema, &state), Transition::Complete);
    }

    #[test]
    fn prefers_resume_topic_after_revisit() {
        let schema = stepped();
        let mut state = SessionState::start(&schema).unwrap();
        complete(&mut state, "a");
        state.topic_mut(&id("c")).unwrap().begin();
        state.active_topic_id = id("a");
        state.active_step_id = Some(StepId::new("one").unwrap());
        state.revisiting_topic_id = Some(id("a"));
        state.resume_topic_id = Some(id("c"));
        assert_eq!(
            decide(&schema, &state),
            Transition::AdvanceStep {
                step: StepId::new("two").unwrap(),
                topic: id("c")
            }
        );
    }

    #[test]
    fn falls_back_to_earlier_open_topic() {
        let schema = stepped();
        let mut state = SessionState::start(&schema).unwrap();
        state
            .topic_mut(&id("a"))
            .unwrap()
            .fields
            .insert("interest".into(), FieldValue::choices(["finance"]));
        complete(&mut state, "a");
        complete(&mut state, "c");
        state.active_topic_id = id("c");
        state.active_step_id = Some(StepId::new("two").unwrap());
        assert_eq!(
            decide(&schema, &state),
            Transition::AdvanceStep {
                step: StepId::new("one").unwrap(),
                topic: id("b")
            }
        );
    }
}
