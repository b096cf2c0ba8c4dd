//! Todo domain model.
//!
//! # Responsibility
//! - Define the todo record and its two-state status cycle.
//! - Normalize title/description input before it reaches the store.
//!
//! # Invariants
//! - `id` is stable and never reused for another todo.
//! - `title` is trimmed and non-empty.
//! - `description` is either `None` or trimmed non-empty text.
//! - `updated_at >= created_at`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a todo.
pub type TodoId = Uuid;

/// Completion state of a todo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Open item, the state every todo starts in.
    #[default]
    Pending,
    /// Item marked done by the user.
    Completed,
}

impl TodoStatus {
    /// Returns the other state of the two-state cycle.
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }

    /// Stable lowercase label used by logs and FFI payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl Display for TodoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create/update request carrying raw, not yet normalized user input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoInput {
    pub title: String,
    pub description: Option<String>,
}

impl TodoInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Canonical todo record.
///
/// Timestamps are Unix epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TodoItemWire")]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TodoItem {
    /// Builds a new pending todo from raw input.
    ///
    /// Returns `None` when the title is blank after trimming.
    pub fn create(id: TodoId, input: &TodoInput, now_epoch_ms: i64) -> Option<Self> {
        let title = normalize_title(&input.title)?;
        Some(Self {
            id,
            title,
            description: normalize_description(input.description.as_deref()),
            status: TodoStatus::Pending,
            created_at: now_epoch_ms,
            updated_at: now_epoch_ms,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == TodoStatus::Completed
    }

    /// Validates record-level invariants.
    ///
    /// # Errors
    /// - `NilId` when `id` is the nil UUID.
    /// - `BlankTitle` / `UntrimmedTitle` when `title` is not normalized.
    /// - `EmptyDescription` / `UntrimmedDescription` when `description` is not normalized.
    /// - `UpdatedBeforeCreated` when `updated_at < created_at`.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.id.is_nil() {
            return Err(TodoValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TodoValidationError::BlankTitle);
        }
        if self.title.trim() != self.title {
            return Err(TodoValidationError::UntrimmedTitle);
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(TodoValidationError::EmptyDescription);
            }
            if description.trim() != description {
                return Err(TodoValidationError::UntrimmedDescription);
            }
        }
        if self.updated_at < self.created_at {
            return Err(TodoValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Trims a title; blank input yields `None`.
pub fn normalize_title(title: &str) -> Option<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims an optional description; empty-after-trim is stored as absent.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Record-level invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    NilId,
    BlankTitle,
    UntrimmedTitle,
    EmptyDescription,
    UntrimmedDescription,
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "todo id must not be nil"),
            Self::BlankTitle => write!(f, "todo title must not be blank"),
            Self::UntrimmedTitle => write!(f, "todo title must be trimmed"),
            Self::EmptyDescription => {
                write!(f, "todo description must be absent rather than empty")
            }
            Self::UntrimmedDescription => write!(f, "todo description must be trimmed"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
        }
    }
}

impl Error for TodoValidationError {}

#[derive(Deserialize)]
struct TodoItemWire {
    id: TodoId,
    title: String,
    description: Option<String>,
    status: TodoStatus,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<TodoItemWire> for TodoItem {
    type Error = TodoValidationError;

    fn try_from(value: TodoItemWire) -> Result<Self, Self::Error> {
        let item = Self {
            id: value.id,
            title: value.title,
            description: value.description,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        };
        item.validate()?;
        Ok(item)
    }
}
