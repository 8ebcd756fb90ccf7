use crate::value::ValueType;
use thiserror::Error;

/// Result type alias using NetprintError
pub type Result<T> = std::result::Result<T, NetprintError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// raised by the engine. Each kind maps to a stable error code that can be
/// used for programmatic error handling, testing, and report output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration (service definitions, rule files, catalogs)
    InvalidInput,
    InvalidRule,
    UnknownChunk,
    UnknownFilter,
    RuleOrderViolation,
    UnregisteredConversion,
    DuplicateName,
    UnknownComponent,
    ReservedName,

    // Extraction
    /// A converter rejected the value it was handed
    ConversionFailed,
    /// A record field did not have the runtime type a match rule requires
    TypeMismatch,

    // Diff
    /// Desired and observed footprints do not pair up by device and key
    FootprintMisaligned,

    // Integration/IO
    Io,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidRule => "ERR_INVALID_RULE",
            ExErrorKind::UnknownChunk => "ERR_UNKNOWN_CHUNK",
            ExErrorKind::UnknownFilter => "ERR_UNKNOWN_FILTER",
            ExErrorKind::RuleOrderViolation => "ERR_RULE_ORDER_VIOLATION",
            ExErrorKind::UnregisteredConversion => "ERR_UNREGISTERED_CONVERSION",
            ExErrorKind::DuplicateName => "ERR_DUPLICATE_NAME",
            ExErrorKind::UnknownComponent => "ERR_UNKNOWN_COMPONENT",
            ExErrorKind::ReservedName => "ERR_RESERVED_NAME",
            ExErrorKind::ConversionFailed => "ERR_CONVERSION_FAILED",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::FootprintMisaligned => "ERR_FOOTPRINT_MISALIGNED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }

    /// True for kinds that describe a broken definition rather than bad data
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ExErrorKind::InvalidInput
                | ExErrorKind::InvalidRule
                | ExErrorKind::UnknownChunk
                | ExErrorKind::UnknownFilter
                | ExErrorKind::RuleOrderViolation
                | ExErrorKind::UnregisteredConversion
                | ExErrorKind::DuplicateName
                | ExErrorKind::UnknownComponent
                | ExErrorKind::ReservedName
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification kind plus the extraction coordinates
/// (device, key, rule index) needed to label a failure inside a batch.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    device: Option<String>,
    key: Option<String>,
    rule_index: Option<usize>,
    message: String,
    source: Option<Box<ExError>>,
    details: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            device: None,
            key: None,
            rule_index: None,
            message: String::new(),
            source: None,
            details: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add device context
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Add extraction key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add the index of the offending rule
    pub fn with_rule_index(mut self, rule_index: usize) -> Self {
        self.rule_index = Some(rule_index);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Add itemised details (e.g. every unpaired footprint entry)
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
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

    /// Get the device context, if any
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Get the extraction key context, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Get the rule index context, if any
    pub fn rule_index(&self) -> Option<usize> {
        self.rule_index
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Get itemised details, if any
    pub fn details(&self) -> Option<&[String]> {
        self.details.as_deref()
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
        if let Some(device) = &self.device {
            write!(f, " (device: {})", device)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(rule_index) = self.rule_index {
            write!(f, " (rule: #{})", rule_index)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Typed error taxonomy for netprint operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetprintError {
    // ===== Rule configuration =====
    /// A rule declares a conversion pair that has no registered converter
    #[error("Rule #{rule_index}: no conversion registered from {from} to {to}")]
    UnregisteredConversion {
        rule_index: usize,
        from: ValueType,
        to: ValueType,
    },

    /// A rule reads a chunk that the service definition never declares
    #[error("Rule #{rule_index} references undeclared chunk: {chunk_name}")]
    UnknownChunk {
        rule_index: usize,
        chunk_name: String,
    },

    /// An indirect rule reads a field that no earlier rule writes
    #[error("Rule #{rule_index} reads field {field} before any earlier rule writes it")]
    RuleOrderViolation { rule_index: usize, field: String },

    /// A split-search directive reads a filter that has not been captured yet
    #[error("Rule #{rule_index} searches from filter {filter} which no rule up to it captures")]
    UnknownFilter { rule_index: usize, filter: String },

    /// A split-search directive set has an unsupported arity
    #[error("Rule #{rule_index}: split-search needs one or two directives, got {directives}")]
    InvalidSplitSearch {
        rule_index: usize,
        directives: usize,
    },

    /// A rule is structurally unusable
    #[error("Rule #{rule_index} is invalid: {reason}")]
    InvalidRule { rule_index: usize, reason: String },

    // ===== Catalog configuration =====
    /// Two service components share a name
    #[error("Duplicate service component: {name}")]
    DuplicateComponent { name: String },

    /// A service component has no keys to test
    #[error("Service component {name} has no component keys")]
    EmptyComponent { name: String },

    /// A service-type definition names a component that is not declared
    #[error("Service type {type_name} references unknown component: {component}")]
    UnknownComponent { type_name: String, component: String },

    /// Two service-type definitions share a name
    #[error("Duplicate service type: {name}")]
    DuplicateServiceType { name: String },

    /// A service-type name collides with a classification sentinel
    #[error("Service type name is reserved: {name}")]
    ReservedServiceType { name: String },

    /// The service definition document could not be interpreted
    #[error("Invalid service definition: {reason}")]
    InvalidDefinition { reason: String },

    // ===== Extraction =====
    /// A converter rejected its input value
    #[error("Cannot convert {value} from {from} to {to}: {reason}")]
    ConversionFailed {
        from: ValueType,
        to: ValueType,
        value: String,
        reason: String,
    },

    /// A field had a different runtime type than the rule requires
    #[error("Rule #{rule_index}: field {field} expected {expected}, found {found}")]
    TypeMismatch {
        rule_index: usize,
        field: String,
        expected: String,
        found: String,
    },

    // ===== Diff =====
    /// Desired and observed footprints do not pair up
    #[error("Footprints are misaligned: {} unpaired entries", orphans.len())]
    FootprintMisaligned { orphans: Vec<String> },

    // ===== IO =====
    /// A file could not be read
    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<NetprintError> for ExError {
    fn from(err: NetprintError) -> Self {
        match err {
            NetprintError::UnregisteredConversion {
                rule_index,
                from,
                to,
            } => ExError::new(ExErrorKind::UnregisteredConversion)
                .with_rule_index(rule_index)
                .with_message(format!("No conversion registered from {} to {}", from, to)),

            NetprintError::UnknownChunk {
                rule_index,
                chunk_name,
            } => ExError::new(ExErrorKind::UnknownChunk)
                .with_rule_index(rule_index)
                .with_message(format!("Undeclared chunk: {}", chunk_name)),

            NetprintError::RuleOrderViolation { rule_index, field } => {
                ExError::new(ExErrorKind::RuleOrderViolation)
                    .with_rule_index(rule_index)
                    .with_message(format!("Field {} is read before it is written", field))
            }

            NetprintError::UnknownFilter { rule_index, filter } => {
                ExError::new(ExErrorKind::UnknownFilter)
                    .with_rule_index(rule_index)
                    .with_message(format!("Filter {} is not captured", filter))
            }

            NetprintError::InvalidSplitSearch {
                rule_index,
                directives,
            } => ExError::new(ExErrorKind::InvalidRule)
                .with_rule_index(rule_index)
                .with_message(format!(
                    "Split-search needs one or two directives, got {}",
                    directives
                )),

            NetprintError::InvalidRule { rule_index, reason } => {
                ExError::new(ExErrorKind::InvalidRule)
                    .with_rule_index(rule_index)
                    .with_message(reason)
            }

            NetprintError::DuplicateComponent { name } => {
                ExError::new(ExErrorKind::DuplicateName)
                    .with_message(format!("Duplicate service component: {}", name))
            }

            NetprintError::EmptyComponent { name } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Service component {} has no keys", name)),

            NetprintError::UnknownComponent {
                type_name,
                component,
            } => ExError::new(ExErrorKind::UnknownComponent).with_message(format!(
                "Service type {} references unknown component {}",
                type_name, component
            )),

            NetprintError::DuplicateServiceType { name } => {
                ExError::new(ExErrorKind::DuplicateName)
                    .with_message(format!("Duplicate service type: {}", name))
            }

            NetprintError::ReservedServiceType { name } => ExError::new(ExErrorKind::ReservedName)
                .with_message(format!("Service type name is reserved: {}", name)),

            NetprintError::InvalidDefinition { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }

            NetprintError::ConversionFailed {
                from,
                to,
                value,
                reason,
            } => ExError::new(ExErrorKind::ConversionFailed).with_message(format!(
                "Cannot convert {} from {} to {}: {}",
                value, from, to, reason
            )),

            NetprintError::TypeMismatch {
                rule_index,
                field,
                expected,
                found,
            } => ExError::new(ExErrorKind::TypeMismatch)
                .with_rule_index(rule_index)
                .with_message(format!(
                    "Field {} expected {}, found {}",
                    field, expected, found
                )),

            NetprintError::FootprintMisaligned { orphans } => {
                ExError::new(ExErrorKind::FootprintMisaligned)
                    .with_message(format!("{} unpaired footprint entries", orphans.len()))
                    .with_details(orphans)
            }

            NetprintError::Io { path, message } => ExError::new(ExErrorKind::Io)
                .with_message(format!("{}: {}", path, message)),

            NetprintError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to NetprintError
impl From<serde_json::Error> for NetprintError {
    fn from(err: serde_json::Error) -> Self {
        NetprintError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from serde_yaml::Error to NetprintError
impl From<serde_yaml::Error> for NetprintError {
    fn from(err: serde_yaml::Error) -> Self {
        NetprintError::Serialization {
            message: err.to_string(),
        }
    }
}
