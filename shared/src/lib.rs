// lib.rs - Valentine card client core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod api;
pub mod app;
pub mod bottom_bar;
pub mod capabilities;
pub mod collections;
pub mod config;
pub mod event;
pub mod form;
pub mod model;
pub mod pending;
pub mod router;
pub mod screens;
pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::{App, Model};
pub use capabilities::{Capabilities, Effect};
pub use config::AppConfig;
pub use crux_core::App as CruxApp;
pub use event::Event;
pub use view::ViewModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Authentication,
    Authorization,
    Validation,
    NotFound,
    Serialization,
    Deserialization,
    InvalidState,
    Internal,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Authentication => "AUTH_ERROR",
            Self::Authorization => "FORBIDDEN",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::Internal => "INTERNAL_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Не удалось связаться с сервером. Проверьте подключение и попробуйте ещё раз.".into()
            }
            ErrorKind::Authentication => "Сессия недействительна. Откройте приложение заново.".into(),
            ErrorKind::Authorization => "Недостаточно прав для этого действия.".into(),
            ErrorKind::Validation | ErrorKind::InvalidState => self.message.clone(),
            ErrorKind::NotFound => "Запрошенный объект не найден.".into(),
            ErrorKind::Serialization | ErrorKind::Deserialization => {
                "Ошибка обработки данных.".into()
            }
            ErrorKind::Internal | ErrorKind::Unknown => {
                "Что-то пошло не так. Попробуйте ещё раз.".into()
            }
        }
    }

    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&str>) -> Self {
        let kind = match status {
            400 => ErrorKind::Validation,
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Authorization,
            404 => ErrorKind::NotFound,
            500..=599 => ErrorKind::Internal,
            _ => ErrorKind::Unknown,
        };

        let message = body
            .and_then(|b| serde_json::from_str::<ApiErrorResponse>(b).ok())
            .and_then(|e| e.detail.or(e.message))
            .unwrap_or_else(|| format!("HTTP error: {status}"));

        let mut error = Self::new(kind, message).with_context("http_status", status.to_string());
        if let Some(body) = body {
            error = error.with_internal(body);
        }
        error
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

/// Error body shape used by the REST backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub type AppResult<T> = Result<T, AppError>;

impl From<router::RouterError> for AppError {
    fn from(e: router::RouterError) -> Self {
        let kind = match &e {
            router::RouterError::NotRegistered(_) => ErrorKind::NotFound,
            _ => ErrorKind::InvalidState,
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<bottom_bar::BarError> for AppError {
    fn from(e: bottom_bar::BarError) -> Self {
        AppError::new(ErrorKind::InvalidState, e.to_string())
    }
}

impl From<collections::CollectionError> for AppError {
    fn from(e: collections::CollectionError) -> Self {
        AppError::new(ErrorKind::NotFound, e.to_string())
    }
}

impl From<form::FormError> for AppError {
    fn from(e: form::FormError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

impl From<capabilities::HttpError> for AppError {
    fn from(e: capabilities::HttpError) -> Self {
        let kind = match &e {
            capabilities::HttpError::ConnectionError { .. }
            | capabilities::HttpError::Timeout { .. } => ErrorKind::Network,
            capabilities::HttpError::InvalidResponse { .. } => ErrorKind::Deserialization,
            capabilities::HttpError::SerializationError { .. } => ErrorKind::Serialization,
            _ => ErrorKind::InvalidState,
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<api::ApiError> for AppError {
    fn from(e: api::ApiError) -> Self {
        match e {
            api::ApiError::Status { status, body } => Self::from_http_status(status, Some(&body)),
            api::ApiError::Transport(http) => http.into(),
            api::ApiError::NotAuthenticated => {
                AppError::new(ErrorKind::Authentication, "no API token available")
            }
            api::ApiError::Decode(reason) => {
                AppError::new(ErrorKind::Deserialization, "malformed response").with_internal(reason)
            }
        }
    }
}
