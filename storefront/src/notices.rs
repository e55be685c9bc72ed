// storefront/src/notices.rs

//! One-shot notices queued by an action and shown on the next page the user loads.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
  Info,
  Success,
  Warning,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
  pub level: NoticeLevel,
  pub message: String,
}

impl Notice {
  pub fn info(message: impl Into<String>) -> Self {
    Self {
      level: NoticeLevel::Info,
      message: message.into(),
    }
  }

  pub fn success(message: impl Into<String>) -> Self {
    Self {
      level: NoticeLevel::Success,
      message: message.into(),
    }
  }

  pub fn warning(message: impl Into<String>) -> Self {
    Self {
      level: NoticeLevel::Warning,
      message: message.into(),
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      level: NoticeLevel::Error,
      message: message.into(),
    }
  }
}

/// Per-user notice queues, shared by all workers.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
  queues: Arc<Mutex<HashMap<Uuid, Vec<Notice>>>>,
}

impl NoticeBoard {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, user_id: Uuid, notice: Notice) {
    self.queues.lock().entry(user_id).or_default().push(notice);
  }

  /// Removes and returns the user's notices, oldest first.
  pub fn drain(&self, user_id: Uuid) -> Vec<Notice> {
    self.queues.lock().remove(&user_id).unwrap_or_default()
  }
}
