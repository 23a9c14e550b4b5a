use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MessageRole;

/// One conversation turn.
///
/// Immutable once appended to the store. User turns never carry
/// `confidence`, `contexts`, or `latency_ms` — the constructors below are
/// the only way to build a `Message`, and they enforce that shape.
///
/// IDs are random v4 UUIDs rather than creation timestamps, so two turns
/// created within the same millisecond can never collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Backend-reported answer reliability in [0, 1]. Assistant-only.
    pub confidence: Option<f32>,
    /// Source excerpts the backend cites as evidence. Assistant-only.
    pub contexts: Option<Vec<String>>,
    /// Round-trip time of the request that produced this turn. Assistant-only.
    pub latency_ms: Option<u64>,
}

impl Message {
    /// A turn authored by the advisor (the human user).
    pub fn user(content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: MessageRole::User,
            content: content.to_string(),
            created_at: Utc::now(),
            confidence: None,
            contexts: None,
            latency_ms: None,
        }
    }

    /// An answer turn produced by a successful backend response.
    pub fn assistant(
        content: &str,
        confidence: Option<f32>,
        contexts: Option<Vec<String>>,
        latency_ms: Option<u64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: MessageRole::Assistant,
            content: content.to_string(),
            created_at: Utc::now(),
            confidence,
            contexts,
            latency_ms,
        }
    }

    /// The fixed apology turn appended when the backend is unavailable.
    /// Carries no confidence, contexts, or latency.
    pub fn fallback(content: &str) -> Self {
        Self::assistant(content, None, None, None)
    }
}
