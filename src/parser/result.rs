use crate::model::package::sdk;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub type ParseResult<T> = Result<T, ParseError>;

/// Historically tolerated input problems that newer target SDKs reject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferredErrorKind {
    /// `<action>` or `<category>` with `android:name=""`
    EmptyIntentActionCategory,
}

impl DeferredErrorKind {
    /// Highest target SDK for which the problem is still tolerated
    pub fn enabled_after(&self) -> u32 {
        match self {
            DeferredErrorKind::EmptyIntentActionCategory => sdk::Q,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeferredErrorKind::EmptyIntentActionCategory => "empty_intent_action_category",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeferredError {
    pub kind: DeferredErrorKind,
    pub message: String,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    /// Missing or malformed required input; the enclosing component is discarded
    #[error("{0}")]
    #[diagnostic(code(manifest::invalid))]
    Invalid(String),

    /// A deferred error escalated by the package's target SDK
    #[error("{message}")]
    #[diagnostic(
        code(manifest::deferred),
        help("older target SDKs only get a warning for this")
    )]
    Deferred {
        kind: DeferredErrorKind,
        message: String,
    },

    /// The platform package contradicts itself
    #[error("{0}")]
    #[diagnostic(code(manifest::internal))]
    Internal(String),

    #[error("Malformed XML at byte {position}: {message}")]
    #[diagnostic(code(manifest::xml))]
    Xml { message: String, position: usize },
}

impl ParseError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ParseError::Invalid(message.into())
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, ParseError::Deferred { .. })
    }
}

/// Collects deferred errors for one manifest parse.
///
/// A deferred error is tolerated and recorded unless the target SDK is known
/// and newer than the error kind allows. Errors recorded before `<uses-sdk>`
/// is seen are re-checked by [`ParseInput::enable_deferred_errors`].
#[derive(Debug, Default)]
pub struct ParseInput {
    target_sdk: Option<u32>,
    tolerate: bool,
    deferred: Vec<DeferredError>,
}

impl ParseInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never escalates deferred errors
    pub fn tolerant() -> Self {
        Self {
            tolerate: true,
            ..Self::default()
        }
    }

    pub fn for_target_sdk(target_sdk: u32) -> Self {
        Self {
            target_sdk: Some(target_sdk),
            ..Self::default()
        }
    }

    fn escalates(&self, kind: DeferredErrorKind) -> bool {
        !self.tolerate && self.target_sdk.map_or(false, |sdk| sdk > kind.enabled_after())
    }

    pub fn defer_error(
        &mut self,
        message: impl Into<String>,
        kind: DeferredErrorKind,
    ) -> ParseResult<()> {
        let message = message.into();
        if self.escalates(kind) {
            return Err(ParseError::Deferred { kind, message });
        }

        warn!("Tolerating {}: {}", kind.as_str(), message);
        self.deferred.push(DeferredError { kind, message });
        Ok(())
    }

    /// Called once the target SDK is known
    pub fn enable_deferred_errors(&mut self, target_sdk: u32) -> ParseResult<()> {
        self.target_sdk = Some(target_sdk);
        if let Some(error) = self.deferred.iter().find(|e| self.escalates(e.kind)) {
            return Err(ParseError::Deferred {
                kind: error.kind,
                message: error.message.clone(),
            });
        }
        Ok(())
    }

    pub fn deferred_errors(&self) -> &[DeferredError] {
        &self.deferred
    }

    pub fn into_deferred_errors(self) -> Vec<DeferredError> {
        self.deferred
    }
}
