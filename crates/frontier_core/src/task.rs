use std::fmt;

use crate::DocumentRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageEventKind {
    Add,
    Delete,
}

impl ImageEventKind {
    /// Maps the wire `type` field; unknown kinds yield `None` and are skipped.
    pub fn from_wire(kind: &str) -> Option<Self> {
        match kind {
            "add" => Some(ImageEventKind::Add),
            "del" => Some(ImageEventKind::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEvent {
    pub id: String,
    pub kind: ImageEventKind,
}

impl ImageEvent {
    pub fn add(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ImageEventKind::Add,
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ImageEventKind::Delete,
        }
    }
}

/// Extracted feature of one image, waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub id: String,
    pub value: i64,
}

impl Feature {
    pub fn new(id: impl Into<String>, value: i64) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Collect,
    Extract,
    Save,
    Delete,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Collect => "collect",
            TaskKind::Extract => "extract",
            TaskKind::Save => "save",
            TaskKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Unit of work carried by the task queue.
///
/// A retry is always a fresh `Task` built from the same payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Collect { doc: DocumentRef },
    Extract { ids: Vec<String> },
    Save { features: Vec<Feature> },
    Delete { ids: Vec<String> },
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Collect { .. } => TaskKind::Collect,
            Task::Extract { .. } => TaskKind::Extract,
            Task::Save { .. } => TaskKind::Save,
            Task::Delete { .. } => TaskKind::Delete,
        }
    }

    /// Number of items in the payload (1 for a collect).
    pub fn len(&self) -> usize {
        match self {
            Task::Collect { .. } => 1,
            Task::Extract { ids } | Task::Delete { ids } => ids.len(),
            Task::Save { features } => features.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
