//! Newsletter and suggestion intake.
//!
//! Submissions land in an injected store rather than a module-level list, so
//! a multi-worker deployment never depends on shared mutable module state.
//! Validation failures are ordinary outcome values, never errors.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Longest accepted field value after sanitization.
const MAX_FIELD_CHARS: usize = 10_000;

/// Accepted suggestion kinds, matching the form's select options.
pub const SUGGESTION_KINDS: [&str; 6] =
    ["ask", "recipe", "request", "complaint", "feature", "other"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Success { message: String },
    Error { message: String },
}

impl FormOutcome {
    fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message } | Self::Error { message } => message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub kind: String,
    pub message: String,
    pub email: Option<String>,
}

/// Where accepted submissions go. The production deployment keeps the
/// in-memory store; anything durable implements the same trait.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn is_subscribed(&self, email: &str) -> bool;
    async fn add_subscriber(&self, email: String);
    async fn add_suggestion(&self, suggestion: Suggestion);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    subscribers: Mutex<Vec<String>>,
    suggestions: Mutex<Vec<Suggestion>>,
}

impl MemoryStore {
    pub async fn suggestions(&self) -> Vec<Suggestion> {
        self.suggestions.lock().await.clone()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn is_subscribed(&self, email: &str) -> bool {
        self.subscribers.lock().await.iter().any(|s| s == email)
    }

    async fn add_subscriber(&self, email: String) {
        self.subscribers.lock().await.push(email);
    }

    async fn add_suggestion(&self, suggestion: Suggestion) {
        self.suggestions.lock().await.push(suggestion);
    }
}

/// Trim, strip angle brackets, cap the length.
pub fn sanitize_input(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect();
    cleaned.chars().take(MAX_FIELD_CHARS).collect()
}

/// Shape check only: one `@` with something before it, and a dot somewhere
/// in the domain part. Deliverability is the mail provider's problem.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

#[derive(Clone)]
pub struct FormService {
    store: Arc<dyn SubmissionStore>,
}

impl FormService {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }

    pub async fn subscribe(&self, email: &str) -> FormOutcome {
        let email = sanitize_input(email);
        if email.is_empty() {
            return FormOutcome::error("Email address is required.");
        }
        if !is_valid_email(&email) {
            return FormOutcome::error("That email address doesn't look right.");
        }
        if self.store.is_subscribed(&email).await {
            return FormOutcome::error("You're already subscribed.");
        }

        self.store.add_subscriber(email).await;
        FormOutcome::success("Thanks for subscribing!")
    }

    pub async fn suggest(&self, kind: &str, message: &str, email: &str) -> FormOutcome {
        let kind = sanitize_input(kind);
        let message = sanitize_input(message);
        let email = sanitize_input(email);

        if !SUGGESTION_KINDS.contains(&kind.as_str()) {
            return FormOutcome::error("Pick a suggestion type from the list.");
        }
        if message.is_empty() {
            return FormOutcome::error("Tell us something — the message is required.");
        }
        if !email.is_empty() && !is_valid_email(&email) {
            return FormOutcome::error("That email address doesn't look right.");
        }

        self.store
            .add_suggestion(Suggestion {
                kind,
                message,
                email: (!email.is_empty()).then_some(email),
            })
            .await;
        FormOutcome::success("Thanks, we got your suggestion.")
    }
}
