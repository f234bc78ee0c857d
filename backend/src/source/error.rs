//! Error types for layer source operations.
//!
//! Every failure carries a structured context naming the operation, layer and
//! location that was tried, so the status line can show where data was looked for.

use std::fmt;

/// Result type for layer source operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Structured context for fetch errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "fetch_layer", "fetch_index")
    pub operation: Option<String>,
    /// Layer identifier, if the failure concerns a layer file
    pub layer: Option<String>,
    /// Location that was tried (URL or file path)
    pub location: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_layer(mut self, layer: impl ToString) -> Self {
        self.layer = Some(layer.to_string());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref layer) = self.layer {
            parts.push(format!("layer={}", layer));
        }
        if let Some(ref location) = self.location {
            parts.push(format!("location={}", location));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for layer source operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Nothing published at the location.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {message} {context}")]
    HttpStatus {
        status: u16,
        message: String,
        context: ErrorContext,
    },

    /// Network or I/O failure before a response was read.
    #[error("Transport error: {message} {context}")]
    Transport {
        message: String,
        context: ErrorContext,
    },

    /// Body is not valid JSON.
    #[error("Parse error: {message} {context}")]
    Parse {
        message: String,
        context: ErrorContext,
    },

    /// Body is JSON but lacks the expected shape.
    #[error("Format error: {message} {context}")]
    Format {
        message: String,
        context: ErrorContext,
    },

    /// Location could not be built from the requested key.
    #[error("Invalid location: {message} {context}")]
    InvalidLocation {
        message: String,
        context: ErrorContext,
    },

    /// Source misconfiguration.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

impl FetchError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn invalid_location(message: impl Into<String>) -> Self {
        Self::InvalidLocation {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Whether the document exists but has the wrong shape.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::NotFound { context, .. }
            | Self::HttpStatus { context, .. }
            | Self::Transport { context, .. }
            | Self::Parse { context, .. }
            | Self::Format { context, .. }
            | Self::InvalidLocation { context, .. }
            | Self::Configuration { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::NotFound { context, .. }
            | Self::HttpStatus { context, .. }
            | Self::Transport { context, .. }
            | Self::Parse { context, .. }
            | Self::Format { context, .. }
            | Self::InvalidLocation { context, .. }
            | Self::Configuration { context, .. } => context,
        }
    }

    /// Short reason shown to users, without the context block.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message, .. }
            | Self::HttpStatus { message, .. }
            | Self::Transport { message, .. }
            | Self::Parse { message, .. }
            | Self::Format { message, .. }
            | Self::InvalidLocation { message, .. }
            | Self::Configuration { message, .. } => message,
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.context_mut().location = Some(location.into());
        self
    }

    pub fn with_layer(mut self, layer: impl ToString) -> Self {
        self.context_mut().layer = Some(layer.to_string());
        self
    }
}
