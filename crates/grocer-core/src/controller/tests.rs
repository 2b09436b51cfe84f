use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::*;
use crate::render::{MessageContent, Node, Sender, CART_CALL_TO_ACTION, SHOPPING_LIST_HEADING};

/// In-memory view surface that records what the controller does to it.
#[derive(Default)]
struct RecordingView {
    next_id: u64,
    messages: Vec<(MessageId, ChatMessage)>,
    input: String,
    submit_enabled: bool,
    focused: bool,
    focus_calls: usize,
    height_resets: usize,
    grow_calls: usize,
}

impl RecordingView {
    fn with_input(text: &str) -> Self {
        Self {
            input: text.to_string(),
            submit_enabled: true,
            ..Default::default()
        }
    }

    fn log(&self) -> Vec<&ChatMessage> {
        self.messages.iter().map(|(_, m)| m).collect()
    }

    fn typing_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|(_, m)| m.is_typing_indicator())
            .count()
    }
}

impl ViewSurface for RecordingView {
    fn append_message(&mut self, message: ChatMessage) -> MessageId {
        self.next_id += 1;
        let id = MessageId::new(self.next_id);
        self.messages.push((id, message));
        id
    }

    fn remove_message(&mut self, id: MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|(existing, _)| *existing != id);
        self.messages.len() != before
    }

    fn read_input_text(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn focus_input(&mut self) {
        self.focused = true;
        self.focus_calls += 1;
    }

    fn auto_grow_input(&mut self) {
        self.grow_calls += 1;
    }

    fn reset_input_height(&mut self) {
        self.height_resets += 1;
    }
}

/// Transport that replays canned results and records every call.
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Value, String>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn replying(replies: Vec<Result<Value, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, message: &str) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(message.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(reason)) => Err(TransportError::Decode(reason)),
            None => Err(TransportError::Decode("no scripted reply".to_string())),
        }
    }
}

fn controller(
    input: &str,
    replies: Vec<Result<Value, String>>,
) -> ConversationController<RecordingView, ScriptedTransport> {
    ConversationController::new(
        RecordingView::with_input(input),
        ScriptedTransport::replying(replies),
    )
}

fn meal_plan_payload() -> Value {
    json!({
        "type": "meal_plan",
        "message": "Here's your meal plan!",
        "meal_plan": [{
            "id": "1",
            "name": "Spaghetti Carbonara",
            "image": "https://example.com/carbonara.jpg",
            "ingredients": [
                { "name": "pasta", "measure": "400g" },
                { "name": "eggs", "measure": "4" },
                { "name": "bacon", "measure": "200g" }
            ]
        }],
        "shopping_list": [
            { "name": "eggs", "needed": 2 },
            { "name": "bacon", "needed": 1 }
        ]
    })
}

#[tokio::test]
async fn test_text_reply_round_trip() {
    let mut chat = controller(
        "Test message",
        vec![Ok(json!({ "type": "text", "message": "Bot response" }))],
    );

    let outcome = chat.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Started(_)));
    assert_eq!(chat.transport().calls(), vec!["Test message".to_string()]);
    assert_eq!(
        chat.view().log(),
        vec![
            &render_user_message("Test message"),
            &render_bot_message(Some("Bot response")),
        ]
    );
    assert!(chat.view().submit_enabled);
    assert_eq!(chat.view().input, "");
    assert_eq!(chat.state(), InteractionState::Idle);
}

#[tokio::test]
async fn test_input_is_trimmed_before_sending() {
    let mut chat = controller("  plan my week \n", vec![Ok(json!({ "message": "ok" }))]);

    chat.submit().await;

    assert_eq!(chat.transport().calls(), vec!["plan my week".to_string()]);
    assert_eq!(chat.view().log()[0], &render_user_message("plan my week"));
}

#[tokio::test]
async fn test_empty_input_is_ignored() {
    for input in ["", "   ", "\n\t "] {
        let mut chat = controller(input, Vec::new());

        let outcome = chat.submit().await;

        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert!(chat.transport().calls().is_empty());
        assert!(chat.view().messages.is_empty());
        assert_eq!(chat.state(), InteractionState::Idle);
        assert!(chat.view().submit_enabled);
    }
}

#[test]
fn test_begin_submit_enters_sending() {
    let mut chat = controller("hello", Vec::new());

    let outcome = chat.begin_submit();

    assert_eq!(
        outcome,
        SubmitOutcome::Started(PendingRequest { message: "hello".to_string() })
    );
    assert_eq!(chat.state(), InteractionState::Sending);
    assert!(!chat.view().submit_enabled);
    assert_eq!(chat.view().input, "");
    assert_eq!(chat.view().height_resets, 1);

    let log = chat.view().log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], &render_user_message("hello"));
    assert!(log[1].is_typing_indicator());
    assert_eq!(log[1].sender, Sender::Bot);
}

#[tokio::test]
async fn test_second_submit_while_sending_is_blocked() {
    let mut chat = controller("first", vec![Ok(json!({ "message": "late" }))]);

    let first = chat.begin_submit();
    assert!(matches!(first, SubmitOutcome::Started(_)));

    chat.view_mut().input = "second".to_string();
    let second = chat.submit().await;

    assert_eq!(second, SubmitOutcome::Blocked);
    assert!(chat.transport().calls().is_empty());
    assert_eq!(chat.view().typing_count(), 1);
    assert_eq!(chat.view().messages.len(), 2);
    assert_eq!(chat.view().input, "second");
}

#[test]
fn test_completion_replaces_typing_indicator() {
    let mut chat = controller("hello", Vec::new());
    chat.begin_submit();

    chat.complete(Ok(json!({ "message": "hi there" })));

    assert_eq!(chat.view().typing_count(), 0);
    assert_eq!(
        chat.view().log(),
        vec![&render_user_message("hello"), &render_bot_message(Some("hi there"))]
    );
    assert_eq!(chat.state(), InteractionState::Idle);
}

#[test]
fn test_completion_while_idle_is_ignored() {
    let mut chat = controller("", Vec::new());

    chat.complete(Ok(json!({ "message": "stray" })));

    assert!(chat.view().messages.is_empty());
    assert_eq!(chat.view().focus_calls, 0);
}

#[tokio::test]
async fn test_transport_failure_shows_error_bubble() {
    let mut chat = controller("hello", vec![Err("connection refused".to_string())]);

    chat.submit().await;

    let log = chat.view().log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1], &render_bot_message(Some(TRANSPORT_ERROR_MESSAGE)));
    assert_eq!(chat.view().typing_count(), 0);
    assert!(chat.view().submit_enabled);
    assert!(chat.view().focused);
    assert_eq!(chat.state(), InteractionState::Idle);
}

#[tokio::test]
async fn test_focus_restored_on_success() {
    let mut chat = controller("hello", vec![Ok(json!({ "message": "hey" }))]);

    chat.submit().await;

    assert_eq!(chat.view().focus_calls, 1);
}

#[tokio::test]
async fn test_null_message_renders_empty_bubble() {
    let mut chat = controller("hello", vec![Ok(json!({ "type": "text", "message": null }))]);

    chat.submit().await;

    let last = chat.view().log()[1];
    assert_eq!(last.sender, Sender::Bot);
    assert_eq!(last.content, MessageContent::Text(None));
    assert_eq!(chat.state(), InteractionState::Idle);
}

#[tokio::test]
async fn test_meal_plan_reply() {
    let mut chat = controller("plan my week", vec![Ok(meal_plan_payload())]);

    chat.submit().await;

    let log = chat.view().log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], &render_user_message("plan my week"));

    let MessageContent::Node(root) = &log[1].content else {
        panic!("expected meal plan node");
    };
    let lists: Vec<&Vec<String>> = root
        .descendants()
        .into_iter()
        .filter_map(|n| match n {
            Node::List(items) => Some(items),
            _ => None,
        })
        .collect();
    assert_eq!(
        lists,
        vec![
            &vec!["400g pasta".to_string(), "4 eggs".to_string(), "200g bacon".to_string()],
            &vec!["eggs (need 2)".to_string(), "bacon (need 1)".to_string()],
        ]
    );

    let text = root.text_content();
    assert_eq!(text.matches(SHOPPING_LIST_HEADING).count(), 1);
    assert_eq!(text.matches(CART_CALL_TO_ACTION).count(), 1);
}

#[tokio::test]
async fn test_meal_plan_without_shopping_list() {
    let mut payload = meal_plan_payload();
    payload["shopping_list"] = json!([]);
    let mut chat = controller("plan my week", vec![Ok(payload)]);

    chat.submit().await;

    let text = chat.view().log()[1].text_content();
    assert!(text.contains("Spaghetti Carbonara"));
    assert!(!text.contains(SHOPPING_LIST_HEADING));
    assert!(!text.contains("add to cart"));
}

#[tokio::test]
async fn test_consecutive_cycles() {
    let mut chat = controller(
        "one",
        vec![Err("timeout".to_string()), Ok(json!({ "message": "two back" }))],
    );

    chat.submit().await;
    chat.view_mut().input = "two".to_string();
    chat.submit().await;

    assert_eq!(chat.transport().calls(), vec!["one".to_string(), "two".to_string()]);
    let texts: Vec<String> = chat.view().log().iter().map(|m| m.text_content()).collect();
    assert_eq!(
        texts,
        vec![
            "one".to_string(),
            TRANSPORT_ERROR_MESSAGE.to_string(),
            "two".to_string(),
            "two back".to_string(),
        ]
    );
}

#[test]
fn test_enter_submits() {
    let mut chat = controller("Test message", Vec::new());

    let outcome = chat.handle_keystroke(Keystroke::Enter { line_break: false });

    assert!(matches!(outcome, KeystrokeOutcome::Submit(SubmitOutcome::Started(_))));
    assert_eq!(chat.state(), InteractionState::Sending);
}

#[test]
fn test_modified_enter_inserts_newline() {
    let mut chat = controller("Test message", Vec::new());

    let outcome = chat.handle_keystroke(Keystroke::Enter { line_break: true });

    assert_eq!(outcome, KeystrokeOutcome::InsertNewline);
    assert_eq!(chat.state(), InteractionState::Idle);
    assert!(chat.view().messages.is_empty());
}

#[test]
fn test_other_keys_pass_through() {
    let mut chat = controller("x", Vec::new());
    assert_eq!(chat.handle_keystroke(Keystroke::Other), KeystrokeOutcome::PassThrough);
}

#[test]
fn test_input_changed_grows_input() {
    let mut chat = controller("one\ntwo", Vec::new());
    chat.input_changed();
    assert_eq!(chat.view().grow_calls, 1);
}
