/// Which directory operation an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOp {
    Load,
    Create,
    Update,
    Delete,
}

impl DirectoryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            DirectoryOp::Load => "load",
            DirectoryOp::Create => "create",
            DirectoryOp::Update => "update",
            DirectoryOp::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// What the presentation layer reads to inform the operator: close the dialog
/// on success, keep it open and show the message on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEvent {
    pub operation: DirectoryOp,
    pub outcome: Outcome,
}

impl DirectoryEvent {
    pub fn success(operation: DirectoryOp) -> Self {
        Self {
            operation,
            outcome: Outcome::Success,
        }
    }

    pub fn failure(operation: DirectoryOp, message: impl Into<String>) -> Self {
        Self {
            operation,
            outcome: Outcome::Failure(message.into()),
        }
    }
}
