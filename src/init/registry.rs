use std::fmt;

use indexmap::IndexMap;
use toml::Value;
use tracing::{debug, warn};

use super::InitError;
use crate::BoxError;

/// Keyword state threaded through every initializer of a run.
///
/// Only TOML values can be carried. Live resources such as connection handles
/// cannot be passed between initializers this way; keep those in the
/// application's own state and put identifiers or settings here instead.
pub type SharedState = toml::Table;

/// What an initializer hands back: `Some` non-empty state replaces the
/// shared state, `None` (or an empty table) leaves it untouched.
pub type InitResult = Result<Option<SharedState>, BoxError>;

type Initializer = Box<dyn FnMut(&SharedState) -> InitResult>;

/// Registry of named start-up callbacks with "run before" constraints.
///
/// Components register initializers in any order; the application then calls
/// [`run_all`](Self::run_all) once. Each initializer completes at most once for
/// the lifetime of the registry. One that fails stays pending and is retried
/// by the next [`run_all`](Self::run_all).
///
/// Ordering is a single pass over the registered keys. When a key is visited,
/// the initializers registered as `before` it are run first, one level deep:
/// a prerequisite's own prerequisites are not chased from there.
///
/// ## Example
///
/// ```
/// use ignition::{InitRegistry, SharedState};
///
/// let mut registry = InitRegistry::new();
/// registry.register("app", |_state: &SharedState| Ok(None));
/// registry
///     .initializer("database")
///     .before("app")
///     .register(|state: &SharedState| {
///         let mut next = state.clone();
///         next.insert("db".into(), "connected".into());
///         Ok(Some(next))
///     });
///
/// registry.run_all("demo", SharedState::new())?;
/// assert_eq!(registry.shared_state()["db"].as_str(), Some("connected"));
/// # Ok::<(), ignition::InitError>(())
/// ```
#[derive(Default)]
pub struct InitRegistry {
    /// `None` marks an initializer that already ran.
    initializers: IndexMap<String, Option<Initializer>>,
    /// Key -> initializers that must run immediately before it.
    dependencies: IndexMap<String, Vec<String>>,
    shared_state: SharedState,
}

impl InitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts registering the initializer `key`.
    ///
    /// Add ordering constraints with [`Registration::before`] and finish with
    /// [`Registration::register`].
    pub fn initializer(&mut self, key: impl Into<String>) -> Registration<'_> {
        Registration {
            registry: self,
            key: key.into(),
            before: Vec::new(),
        }
    }

    /// Registers `callback` under `key` with no ordering constraints.
    pub fn register<F>(&mut self, key: impl Into<String>, callback: F)
    where
        F: FnMut(&SharedState) -> InitResult + 'static,
    {
        self.initializer(key).register(callback);
    }

    fn insert(&mut self, key: String, before: Vec<String>, callback: Initializer) {
        if matches!(self.initializers.get(&key), Some(None)) {
            warn!(key = %key, "initializer already ran; ignoring re-registration");
            return;
        }

        for target in before {
            self.dependencies
                .entry(target)
                .or_default()
                .push(key.clone());
        }
        self.initializers.insert(key, Some(callback));
    }

    /// Runs every pending initializer, prerequisites first.
    ///
    /// `name` and `options` are merged into the shared state, which is then
    /// passed to each initializer in turn. Keys registered while this call is
    /// running are not visited until the next call. Calling this again after
    /// everything has run does nothing.
    ///
    /// If an initializer fails, the state built up to that point is still
    /// kept in [`shared_state`](Self::shared_state).
    #[tracing::instrument(skip(self, options))]
    pub fn run_all(&mut self, name: &str, options: SharedState) -> Result<(), InitError> {
        for (key, value) in options {
            self.shared_state.insert(key, value);
        }
        self.shared_state
            .insert("name".to_string(), Value::String(name.to_string()));

        let mut state = self.shared_state.clone();
        let result = self.run_pass(&mut state);
        self.shared_state = state;
        result
    }

    fn run_pass(&mut self, state: &mut SharedState) -> Result<(), InitError> {
        let snapshot: Vec<String> = self.initializers.keys().cloned().collect();

        for key in snapshot {
            if !self.is_pending(&key) {
                continue;
            }

            if let Some(prerequisites) = self.dependencies.get(&key).cloned() {
                for prerequisite in prerequisites {
                    if let Some(next) = self.run_one(&prerequisite, state)? {
                        *state = next;
                    }
                }
            }

            if let Some(next) = self.run_one(&key, state)? {
                *state = next;
            }
        }
        Ok(())
    }

    /// Runs the single initializer `key` with `state`.
    ///
    /// Returns `Ok(None)` if it already ran. On success the slot is cleared and
    /// the state to carry forward is returned: the callback's result when it
    /// produced a non-empty table, else `state` unchanged. On failure the slot
    /// is left pending.
    pub fn run_one(
        &mut self,
        key: &str,
        state: &SharedState,
    ) -> Result<Option<SharedState>, InitError> {
        let slot = self
            .initializers
            .get_mut(key)
            .ok_or_else(|| InitError::UnknownInitializer {
                key: key.to_string(),
            })?;

        let Some(callback) = slot.as_mut() else {
            debug!(key, "initializer already ran");
            return Ok(None);
        };

        debug!(key, "running initializer");
        let result = callback(state);
        if result.is_ok() {
            *slot = None;
        }
        match result {
            Ok(Some(next)) if !next.is_empty() => Ok(Some(next)),
            Ok(_) => Ok(Some(state.clone())),
            Err(source) => {
                warn!(key, error = %source, "initializer failed");
                Err(InitError::Failed {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    /// Returns `true` if `key` is registered and has not run yet.
    pub fn is_pending(&self, key: &str) -> bool {
        matches!(self.initializers.get(key), Some(Some(_)))
    }

    /// Keys still waiting to run, in registration order.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.initializers
            .iter()
            .filter(|(_, slot)| slot.is_some())
            .map(|(key, _)| key.as_str())
    }

    /// State accumulated by the last [`run_all`](Self::run_all).
    pub fn shared_state(&self) -> &SharedState {
        &self.shared_state
    }
}

impl fmt::Debug for InitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitRegistry")
            .field("pending", &self.pending().collect::<Vec<_>>())
            .field("dependencies", &self.dependencies)
            .field("shared_state", &self.shared_state)
            .finish()
    }
}

/// Pending registration returned by [`InitRegistry::initializer`].
#[must_use = "registrations do nothing until .register() is called"]
pub struct Registration<'a> {
    registry: &'a mut InitRegistry,
    key: String,
    before: Vec<String>,
}

impl Registration<'_> {
    /// Requires this initializer to run before `key`.
    pub fn before(mut self, key: impl Into<String>) -> Self {
        self.before.push(key.into());
        self
    }

    pub fn register<F>(self, callback: F)
    where
        F: FnMut(&SharedState) -> InitResult + 'static,
    {
        self.registry.insert(self.key, self.before, Box::new(callback));
    }
}
