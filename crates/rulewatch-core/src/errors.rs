use rulewatch_core_types::RequestId;
use thiserror::Error;

/// Result type alias using RuleWatchError
pub type Result<T> = std::result::Result<T, RuleWatchError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling and for assertions in tests. Fetch failures are not part
/// of this taxonomy: they are recorded outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidUrl,
    NotFound,
    ConstraintViolation,
    /// The at-most-one-live rule invariant does not hold after reconciliation
    InvariantViolation,

    // Integration/IO
    Config,
    Serialization,
    Persistence,
    ExternalService,
    /// The capture was cancelled before anything was persisted
    Cancelled,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidUrl => "ERR_INVALID_URL",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the capture
/// context (source, snapshot, request) needed to debug a failed run.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    source_id: Option<String>,
    snapshot_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            source_id: None,
            snapshot_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add source ID context
    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self
    }

    /// Add snapshot ID context
    pub fn with_snapshot_id(mut self, id: impl Into<String>) -> Self {
        self.snapshot_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the source ID context, if any
    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    /// Get the snapshot ID context, if any
    pub fn snapshot_id(&self) -> Option<&str> {
        self.snapshot_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(source_id) = &self.source_id {
            write!(f, " (source_id: {})", source_id)?;
        }
        if let Some(snapshot_id) = &self.snapshot_id {
            write!(f, " (snapshot_id: {})", snapshot_id)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for rulewatch operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleWatchError {
    /// Source identifier is empty or padded with whitespace
    #[error("Invalid source id: {reason}")]
    InvalidSourceId { reason: String },

    /// Source URL failed to parse or uses an unsupported scheme
    #[error("Invalid source url {url}: {reason}")]
    InvalidSourceUrl { url: String, reason: String },

    /// Batch size outside the supported range
    #[error("Invalid batch size {size}: must be between 1 and {max}")]
    InvalidBatchSize { size: usize, max: usize },

    /// Snapshot not found in store
    #[error("Snapshot not found: {snapshot_id}")]
    SnapshotNotFound { snapshot_id: String },

    /// More than one live record for one rule of one source
    #[error("Source {source_id} has {live_count} live records for rule {rule:?}")]
    LiveInvariantViolated {
        source_id: String,
        rule: String,
        live_count: usize,
    },

    /// Seed payload could not be decoded
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<RuleWatchError> for ExError {
    fn from(err: RuleWatchError) -> Self {
        match err {
            RuleWatchError::InvalidSourceId { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("validate_source")
                .with_message(reason),

            RuleWatchError::InvalidSourceUrl { url, reason } => {
                ExError::new(ExErrorKind::InvalidUrl)
                    .with_op("validate_source")
                    .with_entity_id(url)
                    .with_message(reason)
            }

            RuleWatchError::InvalidBatchSize { size, max } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("write_rule_batches")
                    .with_message(format!("batch size {} outside 1..={}", size, max))
            }

            RuleWatchError::SnapshotNotFound { snapshot_id } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_snapshot_id(snapshot_id)
                    .with_message("Snapshot not found")
            }

            RuleWatchError::LiveInvariantViolated {
                source_id,
                rule,
                live_count,
            } => ExError::new(ExErrorKind::InvariantViolation)
                .with_op("verify_live_invariant")
                .with_source_id(source_id)
                .with_entity_id(rule)
                .with_message(format!("{} live records for one rule", live_count)),

            RuleWatchError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for RuleWatchError {
    fn from(err: serde_json::Error) -> Self {
        RuleWatchError::Serialization {
            message: err.to_string(),
        }
    }
}
