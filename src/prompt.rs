//! Declarative prompt steps
//!
//! A [`PromptSpec`] describes one interactive step: what kind of prompt to
//! show, the message and choices (either fixed or derived from the answers
//! gathered so far), and how the answer is folded into the [`PromptState`].
//! Specs are built once and never mutated; everything that varies between
//! runs flows in through the state they are resolved against.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::Error;

/// The kinds of interactive step a spec can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Single choice from a list
    Select,
    /// Single line of free text
    Input,
    /// Multi-line text written in an external editor
    Editor,
}

/// Parses the lowercase kind names used in logs and `Display`
///
/// Specs are built from the enum directly, so the runner never sees an
/// unknown kind; [`Error::UnknownPromptKind`] is only produced here, when a
/// kind arrives as text.
impl FromStr for PromptKind {
    type Err = Error;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "select" => Ok(PromptKind::Select),
            "input" => Ok(PromptKind::Input),
            "editor" => Ok(PromptKind::Editor),
            other => Err(Error::UnknownPromptKind(other.to_string())),
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PromptKind::Select => "select",
            PromptKind::Input => "input",
            PromptKind::Editor => "editor",
        };
        f.write_str(name)
    }
}

/// Answers accumulated while walking a prompt sequence
///
/// Fields are only ever added or overwritten (last write wins), never
/// removed. Once cancelled, the state is frozen by the runner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptState {
    fields: Map<String, Value>,
    cancelled: bool,
}

impl PromptState {
    /// Creates a state seeded with the given fields, not cancelled
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            cancelled: false,
        }
    }

    /// Sets a field and returns self for chaining
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String field, or `""` when absent or not a string
    pub fn get_str(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub(crate) fn cancel(mut self) -> Self {
        self.cancelled = true;
        self
    }
}

/// A value given up front or computed from the current state
pub enum Resolvable<T> {
    Literal(T),
    Derived(Box<dyn Fn(&PromptState) -> T>),
}

impl<T: Clone> Resolvable<T> {
    pub fn resolve(&self, state: &PromptState) -> T {
        match self {
            Resolvable::Literal(value) => value.clone(),
            Resolvable::Derived(derive) => derive(state),
        }
    }
}

impl<T> fmt::Debug for Resolvable<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolvable::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Resolvable::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl From<&str> for Resolvable<String> {
    fn from(value: &str) -> Self {
        Resolvable::Literal(value.to_string())
    }
}

impl From<String> for Resolvable<String> {
    fn from(value: String) -> Self {
        Resolvable::Literal(value)
    }
}

/// One entry of a select prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    /// Text shown to the user
    pub label: String,
    /// Value handed to the reducer when this entry is picked
    pub value: Value,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl From<&str> for Choice {
    fn from(label: &str) -> Self {
        Choice::new(label, label)
    }
}

impl From<String> for Choice {
    fn from(label: String) -> Self {
        Choice::new(label.clone(), label)
    }
}

type Reducer = Box<dyn Fn(PromptState, Value) -> PromptState>;

/// Description of a single interactive step
pub struct PromptSpec {
    kind: PromptKind,
    name: String,
    message: Resolvable<String>,
    choices: Resolvable<Vec<Choice>>,
    on_apply: Option<Reducer>,
    cancel_value: Option<Value>,
    add_cancel: bool,
    page_size: Option<usize>,
}

impl PromptSpec {
    /// Creates a spec of the given kind storing its answer under `name`
    ///
    /// The message defaults to the name itself.
    pub fn new(kind: PromptKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            message: Resolvable::Literal(name.clone()),
            name,
            choices: Resolvable::Literal(Vec::new()),
            on_apply: None,
            cancel_value: None,
            add_cancel: true,
            page_size: None,
        }
    }

    pub fn select(name: impl Into<String>) -> Self {
        Self::new(PromptKind::Select, name)
    }

    pub fn input(name: impl Into<String>) -> Self {
        Self::new(PromptKind::Input, name)
    }

    pub fn editor(name: impl Into<String>) -> Self {
        Self::new(PromptKind::Editor, name)
    }

    /// Sets a fixed message and returns self for chaining
    pub fn with_message(mut self, message: impl Into<Resolvable<String>>) -> Self {
        self.message = message.into();
        self
    }

    /// Derives the message from the state at the time the step runs
    pub fn with_message_fn(mut self, message: impl Fn(&PromptState) -> String + 'static) -> Self {
        self.message = Resolvable::Derived(Box::new(message));
        self
    }

    /// Sets a fixed choice list; plain strings become `label == value`
    pub fn with_choices<C: Into<Choice>>(mut self, choices: impl IntoIterator<Item = C>) -> Self {
        self.choices = Resolvable::Literal(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Derives the choice list from the state at the time the step runs
    pub fn with_choices_fn(
        mut self,
        choices: impl Fn(&PromptState) -> Vec<Choice> + 'static,
    ) -> Self {
        self.choices = Resolvable::Derived(Box::new(choices));
        self
    }

    /// Replaces the default `state[name] = value` reducer
    pub fn on_apply(mut self, reducer: impl Fn(PromptState, Value) -> PromptState + 'static) -> Self {
        self.on_apply = Some(Box::new(reducer));
        self
    }

    /// Declares the answer that means "the user cancelled this step"
    ///
    /// Declaring `Value::Null` is distinct from not declaring anything; an
    /// undeclared cancel value is the empty string.
    pub fn with_cancel_value(mut self, value: impl Into<Value>) -> Self {
        self.cancel_value = Some(value.into());
        self
    }

    /// Do not append the synthetic "(Cancel)" entry to a select prompt
    pub fn without_cancel_choice(mut self) -> Self {
        self.add_cancel = false;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn adds_cancel_choice(&self) -> bool {
        self.add_cancel
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn resolve_message(&self, state: &PromptState) -> String {
        self.message.resolve(state)
    }

    pub fn resolve_choices(&self, state: &PromptState) -> Vec<Choice> {
        self.choices.resolve(state)
    }

    pub fn cancel_value(&self) -> Value {
        self.cancel_value
            .clone()
            .unwrap_or_else(|| Value::String(String::new()))
    }

    /// Folds an answer into the state
    pub fn apply(&self, state: PromptState, value: Value) -> PromptState {
        match &self.on_apply {
            Some(reducer) => reducer(state, value),
            None => state.with(self.name.clone(), value),
        }
    }
}

impl fmt::Debug for PromptSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptSpec")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("message", &self.message)
            .field("choices", &self.choices)
            .field("cancel_value", &self.cancel_value)
            .field("add_cancel", &self.add_cancel)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
