//! Interactive setup of missing configuration values.

use std::fmt;
use std::io::{self, BufRead, Write};

use toml::Value;
use tracing::{debug, warn};

use super::{ConfigError, LayeredConfig};
use crate::BoxError;

/// Line-oriented user interaction used by [`LayeredConfig::run_wizard`].
pub trait Terminal {
    /// Shows `prompt` and returns the line typed, without the line terminator.
    fn prompt_line(&mut self, prompt: &str) -> io::Result<String>;

    fn display_message(&mut self, message: &str);
}

/// [`Terminal`] over the process's stdin and stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdTerminal;

impl Terminal for StdTerminal {
    fn prompt_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    fn display_message(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Checks a candidate answer. `Ok(false)` asks again silently; `Err` shows
/// the error to the user and asks again.
pub type Validator = Box<dyn Fn(&LayeredConfig, &Value) -> Result<bool, BoxError>>;

/// Fallback answer for a [`Prompt`].
pub enum PromptDefault {
    Value(Value),
    Computed(Box<dyn Fn() -> Value>),
}

impl PromptDefault {
    fn resolve(&self) -> Value {
        match self {
            PromptDefault::Value(value) => value.clone(),
            PromptDefault::Computed(compute) => compute(),
        }
    }
}

impl fmt::Debug for PromptDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            PromptDefault::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// One question asked by the wizard.
///
/// The answer is stored under `key` in the current environment. An existing
/// value for `key` takes priority over the prompt's own default.
pub struct Prompt {
    key: String,
    text: String,
    default: Option<PromptDefault>,
    validate: Option<Validator>,
}

impl Prompt {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            default: None,
            validate: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(PromptDefault::Value(value.into()));
        self
    }

    /// Computes the default when the prompt is shown.
    pub fn with_default_fn(mut self, compute: impl Fn() -> Value + 'static) -> Self {
        self.default = Some(PromptDefault::Computed(Box::new(compute)));
        self
    }

    pub fn with_validator(
        mut self,
        validate: impl Fn(&LayeredConfig, &Value) -> Result<bool, BoxError> + 'static,
    ) -> Self {
        self.validate = Some(Box::new(validate));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prompt")
            .field("key", &self.key)
            .field("text", &self.text)
            .field("default", &self.default)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

impl LayeredConfig {
    /// Asks each prompt in turn and stores the answers in the current
    /// environment.
    ///
    /// An empty answer takes the default (or an empty string when there is
    /// none). Answers are kept in memory; call [`save`](Self::save) to persist
    /// them.
    #[tracing::instrument(skip_all, fields(environment = %self.environment()))]
    pub fn run_wizard<T>(&mut self, prompts: &[Prompt], terminal: &mut T) -> Result<(), ConfigError>
    where
        T: Terminal + ?Sized,
    {
        for prompt in prompts {
            let default = self.wizard_default(prompt)?;
            let text = match default.as_ref().filter(|value| is_truthy(value)) {
                Some(value) => format!("{} [{}]: ", prompt.text, display_value(value)),
                None => format!("{}: ", prompt.text),
            };

            let answer = loop {
                let line = terminal.prompt_line(&text).map_err(ConfigError::Prompt)?;
                let candidate = if line.is_empty() {
                    default
                        .clone()
                        .unwrap_or_else(|| Value::String(String::new()))
                } else {
                    Value::String(line)
                };

                let Some(validate) = &prompt.validate else {
                    break candidate;
                };
                match validate(self, &candidate) {
                    Ok(true) => break candidate,
                    Ok(false) => debug!(key = %prompt.key, "answer rejected"),
                    Err(e) => {
                        warn!(key = %prompt.key, error = %e, "validator failed");
                        terminal.display_message(&e.to_string());
                    }
                }
            };

            self.set(prompt.key.clone(), answer)?;
        }
        Ok(())
    }

    fn wizard_default(&self, prompt: &Prompt) -> Result<Option<Value>, ConfigError> {
        if let Some(existing) = self.current_table()?.and_then(|t| t.get(&prompt.key)) {
            return Ok(Some(existing.clone()));
        }
        Ok(prompt.default.as_ref().map(PromptDefault::resolve))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.is_empty(),
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Boolean(b) => *b,
        Value::Array(items) => !items.is_empty(),
        Value::Table(table) => !table.is_empty(),
        Value::Datetime(_) => true,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, Default)]
    struct ScriptedTerminal {
        answers: VecDeque<String>,
        prompts: Vec<String>,
        messages: Vec<String>,
    }

    impl ScriptedTerminal {
        fn answering(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl Terminal for ScriptedTerminal {
        fn prompt_line(&mut self, prompt: &str) -> io::Result<String> {
            self.prompts.push(prompt.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
        }

        fn display_message(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    fn empty_config() -> LayeredConfig {
        "[default]".parse().unwrap()
    }

    #[test]
    fn test_empty_answer_takes_default() {
        let mut config = empty_config();
        let mut terminal = ScriptedTerminal::answering(&[""]);

        config
            .run_wizard(&[Prompt::new("user", "Username").with_default("foo")], &mut terminal)
            .unwrap();

        assert_eq!(terminal.prompts, ["Username [foo]: "]);
        assert_eq!(config.get("user").unwrap().as_str(), Some("foo"));
    }

    #[test]
    fn test_answer_overrides_default() {
        let mut config = empty_config();
        let mut terminal = ScriptedTerminal::answering(&["bar"]);

        config
            .run_wizard(&[Prompt::new("user", "Username").with_default("foo")], &mut terminal)
            .unwrap();
        assert_eq!(config.get("user").unwrap().as_str(), Some("bar"));
    }

    #[test]
    fn test_no_default_prompts_plainly() {
        let mut config = empty_config();
        let mut terminal = ScriptedTerminal::answering(&[""]);

        config
            .run_wizard(&[Prompt::new("token", "API token")], &mut terminal)
            .unwrap();

        assert_eq!(terminal.prompts, ["API token: "]);
        assert_eq!(config.get("token").unwrap().as_str(), Some(""));
    }

    #[test]
    fn test_existing_value_beats_prompt_default() {
        let mut config: LayeredConfig = "[default]\nport = 8080".parse().unwrap();
        let mut terminal = ScriptedTerminal::answering(&[""]);

        config
            .run_wizard(&[Prompt::new("port", "Port").with_default(80_i64)], &mut terminal)
            .unwrap();

        assert_eq!(terminal.prompts, ["Port [8080]: "]);
        assert_eq!(config.get("port").unwrap().as_integer(), Some(8080));
    }

    #[test]
    fn test_computed_default() {
        let mut config = empty_config();
        let mut terminal = ScriptedTerminal::answering(&[""]);

        let prompt = Prompt::new("host", "Host").with_default_fn(|| Value::from("localhost"));
        config.run_wizard(&[prompt], &mut terminal).unwrap();

        assert_eq!(terminal.prompts, ["Host [localhost]: "]);
        assert_eq!(config.get("host").unwrap().as_str(), Some("localhost"));
    }

    #[test]
    fn test_validator_rejects_then_accepts() {
        let mut config = empty_config();
        let mut terminal = ScriptedTerminal::answering(&["nope", "yes"]);

        let prompt = Prompt::new("answer", "Continue?")
            .with_validator(|_, value| Ok(value.as_str() == Some("yes")));
        config.run_wizard(&[prompt], &mut terminal).unwrap();

        assert_eq!(terminal.prompts.len(), 2);
        assert!(terminal.messages.is_empty());
        assert_eq!(config.get("answer").unwrap().as_str(), Some("yes"));
    }

    #[test]
    fn test_validator_error_is_shown_and_retried() {
        let mut config = empty_config();
        let mut terminal = ScriptedTerminal::answering(&["abc", "42"]);

        let prompt = Prompt::new("port", "Port").with_validator(|_, value| {
            let text = value.as_str().unwrap_or_default();
            text.parse::<u16>().map(|_| true).map_err(|e| e.into())
        });
        config.run_wizard(&[prompt], &mut terminal).unwrap();

        assert_eq!(terminal.prompts.len(), 2);
        assert_eq!(terminal.messages, ["invalid digit found in string"]);
        assert_eq!(config.get("port").unwrap().as_str(), Some("42"));
    }

    #[test]
    fn test_validator_sees_config() {
        let mut config: LayeredConfig = "[default]\nuser = \"admin\"".parse().unwrap();
        let mut terminal = ScriptedTerminal::answering(&["admin", "guest"]);

        let prompt = Prompt::new("backup_user", "Backup user").with_validator(|config, value| {
            let primary = config.get("user")?.to_value();
            Ok(&primary != value)
        });
        config.run_wizard(&[prompt], &mut terminal).unwrap();

        assert_eq!(config.get("backup_user").unwrap().as_str(), Some("guest"));
    }

    #[test]
    fn test_answers_go_to_current_environment() {
        let mut config = empty_config();
        config.set_environment("staging");
        let mut terminal = ScriptedTerminal::answering(&["x"]);

        config
            .run_wizard(&[Prompt::new("key", "Key")], &mut terminal)
            .unwrap();

        assert_eq!(config.raw()["staging"]["key"].as_str(), Some("x"));
        assert!(!config.raw()["default"].as_table().unwrap().contains_key("key"));
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut config = empty_config();
        let mut terminal = ScriptedTerminal::answering(&[]);

        let result = config.run_wizard(&[Prompt::new("key", "Key")], &mut terminal);
        assert!(matches!(result, Err(ConfigError::Prompt(_))));
    }
}
