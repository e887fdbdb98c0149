//! Sequential prompt runner
//!
//! Walks an ordered list of [`PromptSpec`]s, one at a time, threading the
//! accumulated [`PromptState`] through them. Each step sees exactly the
//! answers of the steps before it. A step stops the sequence when the user
//! picks the cancel value or the render layer fails (Ctrl+C, an aborted
//! editor, a broken terminal); the state gathered so far is kept.
//!
//! Ctrl+C never reaches the process as a signal while a prompt is shown:
//! inquire reads the terminal in raw mode and reports the key press as
//! `OperationInterrupted`, which the renderer returns as an error and the
//! runner turns into cancellation.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::prompt::{Choice, PromptKind, PromptSpec, PromptState};

/// Label of the synthetic entry appended to select prompts
pub const CANCEL_LABEL: &str = "(Cancel)";

/// Upper bound on visible rows of a select prompt
pub const MAX_PAGE_SIZE: usize = 10;

/// A fully resolved select prompt, ready to be shown
#[derive(Debug, Clone, PartialEq)]
pub struct SelectRequest<'a> {
    pub message: &'a str,
    pub choices: &'a [Choice],
    pub page_size: usize,
    /// Position of the synthetic cancel entry, if one was appended
    pub cancel_index: Option<usize>,
}

/// Terminal side of the runner
///
/// Each method blocks until the user answers. `Ok(None)` means the prompt
/// was dismissed without an answer; an `Err` means the prompt was
/// interrupted or could not be shown.
pub trait Renderer {
    fn select(&mut self, request: &SelectRequest<'_>) -> Result<Option<Value>>;

    fn input(&mut self, message: &str) -> Result<Option<String>>;

    fn editor(&mut self, message: &str) -> Result<String>;
}

/// Runs prompt sequences from a fixed initial state
#[derive(Debug, Clone, Default)]
pub struct PromptRunner {
    initial: Map<String, Value>,
}

impl PromptRunner {
    pub fn new(initial: Map<String, Value>) -> Self {
        Self { initial }
    }

    /// Runs `specs` in order and returns the final state
    ///
    /// The returned state is cancelled if any step was cancelled; later specs
    /// are then never resolved.
    pub fn run<R: Renderer + ?Sized>(&self, renderer: &mut R, specs: &[PromptSpec]) -> PromptState {
        let mut state = PromptState::new(self.initial.clone());

        for spec in specs {
            if state.is_cancelled() {
                break;
            }
            state = step(renderer, state, spec);
        }
        state
    }
}

fn step<R: Renderer + ?Sized>(renderer: &mut R, state: PromptState, spec: &PromptSpec) -> PromptState {
    let message = spec.resolve_message(&state);
    let cancel_value = spec.cancel_value();

    match render(renderer, spec, &state, &message, &cancel_value) {
        Ok(value) if value == cancel_value => {
            tracing::debug!(prompt = spec.name(), "prompt cancelled by user");
            state.cancel()
        }
        Ok(value) => spec.apply(state, value),
        Err(err) => {
            tracing::debug!(prompt = spec.name(), error = %err, "prompt interrupted");
            state.cancel()
        }
    }
}

fn render<R: Renderer + ?Sized>(
    renderer: &mut R,
    spec: &PromptSpec,
    state: &PromptState,
    message: &str,
    cancel_value: &Value,
) -> Result<Value> {
    match spec.kind() {
        PromptKind::Select => {
            let mut choices = spec.resolve_choices(state);
            let cancel_index = spec.adds_cancel_choice().then(|| {
                choices.push(Choice::new(CANCEL_LABEL, cancel_value.clone()));
                choices.len() - 1
            });
            let request = SelectRequest {
                message,
                choices: &choices,
                page_size: page_size(spec.page_size(), choices.len()),
                cancel_index,
            };
            let answer = renderer.select(&request)?;
            Ok(answer.unwrap_or_else(|| cancel_value.clone()))
        }
        PromptKind::Input => {
            let answer = renderer.input(message)?;
            Ok(answer.map(Value::String).unwrap_or_else(|| cancel_value.clone()))
        }
        PromptKind::Editor => renderer.editor(message).map(Value::String),
    }
}

fn page_size(requested: Option<usize>, choice_count: usize) -> usize {
    requested.unwrap_or(choice_count).clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::error::Error;

    /// One scripted reaction of the test renderer
    #[derive(Debug, Clone)]
    pub(crate) enum Answer {
        Pick(Value),
        Text(String),
        Dismiss,
        Interrupt,
    }

    /// Renderer that replays canned answers and records what it was shown
    #[derive(Default)]
    pub(crate) struct ScriptedRenderer {
        answers: VecDeque<Answer>,
        pub(crate) messages: Vec<String>,
        pub(crate) choices: Vec<Vec<Choice>>,
        pub(crate) page_sizes: Vec<usize>,
        pub(crate) cancel_indices: Vec<Option<usize>>,
    }

    impl ScriptedRenderer {
        pub(crate) fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                ..Self::default()
            }
        }

        fn next(&mut self, message: &str) -> Answer {
            self.messages.push(message.to_string());
            self.answers.pop_front().expect("no scripted answer left")
        }
    }

    impl Renderer for ScriptedRenderer {
        fn select(&mut self, request: &SelectRequest<'_>) -> Result<Option<Value>> {
            self.choices.push(request.choices.to_vec());
            self.page_sizes.push(request.page_size);
            self.cancel_indices.push(request.cancel_index);
            match self.next(request.message) {
                Answer::Pick(value) => Ok(Some(value)),
                Answer::Text(text) => Ok(Some(Value::String(text))),
                Answer::Dismiss => Ok(None),
                Answer::Interrupt => Err(Error::Cancelled),
            }
        }

        fn input(&mut self, message: &str) -> Result<Option<String>> {
            match self.next(message) {
                Answer::Text(text) => Ok(Some(text)),
                Answer::Pick(value) => Ok(value.as_str().map(str::to_string)),
                Answer::Dismiss => Ok(None),
                Answer::Interrupt => Err(Error::Cancelled),
            }
        }

        fn editor(&mut self, message: &str) -> Result<String> {
            match self.next(message) {
                Answer::Text(text) => Ok(text),
                Answer::Pick(value) => Ok(value.to_string()),
                Answer::Dismiss | Answer::Interrupt => Err(Error::Cancelled),
            }
        }
    }

    fn runner() -> PromptRunner {
        let initial = json!({ "project": "", "epic": "" });
        PromptRunner::new(initial.as_object().cloned().unwrap())
    }

    #[test]
    fn test_later_choices_see_earlier_answers() {
        let specs = vec![
            PromptSpec::select("project")
                .with_choices(["ENBL", "ABC"])
                .on_apply(|state, value| state.with("project", value).with("seen_a", true)),
            PromptSpec::select("reporter").with_choices_fn(|state| {
                assert_eq!(state.get("seen_a"), Some(&json!(true)));
                vec![Choice::new(format!("dev of {}", state.get_str("project")), "acc-1")]
            }),
            PromptSpec::input("epic")
                .with_message_fn(|state| format!("Epic for {}", state.get_str("project"))),
        ];
        let mut renderer = ScriptedRenderer::new([
            Answer::Pick(json!("ABC")),
            Answer::Pick(json!("acc-1")),
            Answer::Text("ABC-1".into()),
        ]);

        let state = runner().run(&mut renderer, &specs);

        assert!(!state.is_cancelled());
        assert_eq!(state.get_str("project"), "ABC");
        assert_eq!(state.get_str("reporter"), "acc-1");
        assert_eq!(state.get_str("epic"), "ABC-1");
        assert_eq!(renderer.choices[1][0].label, "dev of ABC");
        assert_eq!(renderer.messages[2], "Epic for ABC");
    }

    #[test]
    fn test_cancel_on_second_step_skips_third() {
        let third_resolved = Rc::new(Cell::new(false));
        let third_applied = Rc::new(Cell::new(false));
        let (resolved, applied) = (third_resolved.clone(), third_applied.clone());

        let specs = vec![
            PromptSpec::select("project").with_choices(["ENBL"]),
            PromptSpec::input("epic"),
            PromptSpec::select("reporter")
                .with_message_fn(move |_| {
                    resolved.set(true);
                    "Reporter".into()
                })
                .on_apply(move |state, value| {
                    applied.set(true);
                    state.with("reporter", value)
                }),
        ];
        let mut renderer = ScriptedRenderer::new([Answer::Pick(json!("ENBL")), Answer::Text(String::new())]);

        let state = runner().run(&mut renderer, &specs);

        assert!(state.is_cancelled());
        assert_eq!(state.get_str("project"), "ENBL");
        assert_eq!(state.get_str("epic"), "");
        assert!(!third_resolved.get());
        assert!(!third_applied.get());
        assert_eq!(renderer.messages.len(), 2);
    }

    #[test]
    fn test_cancel_choice_is_appended_with_cancel_value() {
        let specs = vec![PromptSpec::select("project")
            .with_choices(["ENBL", "ABC"])
            .with_cancel_value("__cancel__")];
        let mut renderer = ScriptedRenderer::new([Answer::Pick(json!("__cancel__"))]);

        let state = runner().run(&mut renderer, &specs);

        let shown = &renderer.choices[0];
        assert_eq!(shown.len(), 3);
        assert_eq!(shown[2], Choice::new(CANCEL_LABEL, "__cancel__"));
        assert_eq!(renderer.cancel_indices, vec![Some(2)]);
        assert!(state.is_cancelled());
        assert_eq!(state.get_str("project"), "");
    }

    #[test]
    fn test_no_cancel_choice_when_disabled() {
        let specs = vec![PromptSpec::select("project")
            .with_choices(["ENBL"])
            .without_cancel_choice()];
        let mut renderer = ScriptedRenderer::new([Answer::Pick(json!("ENBL"))]);

        runner().run(&mut renderer, &specs);

        assert_eq!(renderer.choices[0], vec![Choice::from("ENBL")]);
        assert_eq!(renderer.cancel_indices, vec![None]);
    }

    #[test]
    fn test_explicit_null_cancel_value_allows_empty_answer() {
        let specs = vec![
            PromptSpec::input("epic").with_cancel_value(Value::Null),
            PromptSpec::input("note"),
        ];
        let mut renderer = ScriptedRenderer::new([Answer::Text(String::new()), Answer::Text("x".into())]);

        let state = runner().run(&mut renderer, &specs);

        assert!(!state.is_cancelled());
        assert_eq!(state.get("epic"), Some(&json!("")));
        assert_eq!(state.get_str("note"), "x");
    }

    #[test]
    fn test_dismissed_select_maps_to_cancel() {
        let specs = vec![PromptSpec::select("project").with_choices(["ENBL"])];
        let mut renderer = ScriptedRenderer::new([Answer::Dismiss]);

        let state = runner().run(&mut renderer, &specs);

        assert!(state.is_cancelled());
    }

    #[test]
    fn test_dismissed_input_maps_to_cancel() {
        let specs = vec![
            PromptSpec::input("epic").with_cancel_value("__cancel__"),
            PromptSpec::input("never"),
        ];
        let mut renderer = ScriptedRenderer::new([Answer::Dismiss]);

        let state = runner().run(&mut renderer, &specs);

        assert!(state.is_cancelled());
        assert_eq!(state.get_str("epic"), "");
        assert!(state.get("never").is_none());
        assert_eq!(renderer.messages.len(), 1);
    }

    #[test]
    fn test_interrupt_cancels_remaining_steps() {
        let specs = vec![
            PromptSpec::input("epic"),
            PromptSpec::editor("tickets"),
            PromptSpec::input("never"),
        ];
        let mut renderer = ScriptedRenderer::new([Answer::Text("ENBL-1".into()), Answer::Interrupt]);

        let state = runner().run(&mut renderer, &specs);

        assert!(state.is_cancelled());
        assert_eq!(state.get_str("epic"), "ENBL-1");
        assert!(state.get("tickets").is_none());
        assert!(state.get("never").is_none());
        assert_eq!(renderer.messages.len(), 2);
    }

    #[test]
    fn test_empty_sequence_returns_initial_state() {
        let mut renderer = ScriptedRenderer::default();
        let state = runner().run(&mut renderer, &[]);

        assert!(!state.is_cancelled());
        assert_eq!(state.get("project"), Some(&json!("")));
        assert!(renderer.messages.is_empty());
    }

    #[test]
    fn test_page_size_is_bounded() {
        assert_eq!(page_size(None, 3), 3);
        assert_eq!(page_size(None, 25), MAX_PAGE_SIZE);
        assert_eq!(page_size(Some(5), 25), 5);
        assert_eq!(page_size(Some(40), 25), MAX_PAGE_SIZE);
        assert_eq!(page_size(None, 0), 1);
    }

    #[test]
    fn test_select_page_size_counts_cancel_entry() {
        let specs = vec![PromptSpec::select("project").with_choices(["A", "B"])];
        let mut renderer = ScriptedRenderer::new([Answer::Pick(json!("A"))]);

        runner().run(&mut renderer, &specs);

        assert_eq!(renderer.page_sizes, vec![3]);
    }

    #[test]
    fn test_editor_text_is_applied() {
        let specs = vec![PromptSpec::editor("tickets")];
        let mut renderer = ScriptedRenderer::new([Answer::Text("Task A\nTask B".into())]);

        let state = runner().run(&mut renderer, &specs);

        assert_eq!(state.get_str("tickets"), "Task A\nTask B");
    }
}
