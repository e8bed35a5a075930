//! REST client for the valentine backend.
//!
//! The core never performs I/O: every call here only builds an [`HttpRequest`] for the shell,
//! and [`decode`] turns the shell's answer back into typed data.

use serde::de::DeserializeOwned;
use thiserror::Error;
use url::form_urlencoded;

use crate::capabilities::{ContentType, HttpError, HttpRequest, HttpResult};
use crate::model::{
    CreateValentineRequest, EmployeeId, TokenGrant, UploadFile, UserId, ValentineId,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Transport(#[from] HttpError),
    #[error("request requires an API token")]
    NotAuthenticated,
    #[error("unexpected response body: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub employee_id: EmployeeId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClient {
    base_url: String,
    csrf_token: Option<String>,
    session: Option<Session>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            csrf_token: None,
            session: None,
        }
    }

    #[must_use]
    pub fn with_csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token;
        self
    }

    pub fn authenticate(&mut self, grant: &TokenGrant) {
        self.session = Some(Session {
            token: grant.token.clone(),
            employee_id: grant.employee_id,
            user_id: grant.user_id,
        });
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        let session = self.session.as_ref().ok_or(ApiError::NotAuthenticated)?;
        Ok(request.with_header("Authorization", format!("Token {}", session.token))?)
    }

    pub fn get_token(&self, telegram_user_id: &str) -> Result<HttpRequest, ApiError> {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("telegram_user_id", telegram_user_id)
            .finish();
        let url = format!("{}?{query}", self.endpoint("get-token/"));
        Ok(HttpRequest::get(url)?)
    }

    pub fn employee_list(&self) -> Result<HttpRequest, ApiError> {
        self.authorized(HttpRequest::get(self.endpoint("employee/"))?)
    }

    pub fn valentine_list(&self) -> Result<HttpRequest, ApiError> {
        self.authorized(HttpRequest::get(self.endpoint("my-valentines/"))?)
    }

    pub fn create_valentine(
        &self,
        payload: &CreateValentineRequest,
    ) -> Result<HttpRequest, ApiError> {
        let request = HttpRequest::post(self.endpoint("my-valentines/"))?.with_json(payload)?;
        self.authorized(request)
    }

    pub fn delete_valentine(&self, id: ValentineId) -> Result<HttpRequest, ApiError> {
        self.authorized(HttpRequest::delete(
            self.endpoint(&format!("my-valentines/{id}/")),
        )?)
    }

    pub fn mark_valentine_read(&self, id: ValentineId) -> Result<HttpRequest, ApiError> {
        let request = HttpRequest::post(self.endpoint(&format!("my-valentines/{id}/mark-read/")))?;
        self.authorized(request)
    }

    pub fn received_valentines(&self) -> Result<HttpRequest, ApiError> {
        self.authorized(HttpRequest::get(self.endpoint("my-valentines/received/"))?)
    }

    pub fn valentine_image_list(&self) -> Result<HttpRequest, ApiError> {
        self.authorized(HttpRequest::get(self.endpoint("my-images/"))?)
    }

    /// Multipart upload with `image` and `owner_id` parts.
    pub fn upload_valentine_image(
        &self,
        file: &UploadFile,
        owner: UserId,
    ) -> Result<HttpRequest, ApiError> {
        let boundary = format!("----valentine{}", uuid::Uuid::new_v4().simple());
        let body = multipart_body(&boundary, file, owner);

        let mut request = HttpRequest::post(self.endpoint("load-valentine-image/"))?
            .with_body(&ContentType::Multipart { boundary }, body)?;
        if let Some(csrf) = &self.csrf_token {
            request = request.with_header("X-CSRFToken", csrf.as_str())?;
        }
        self.authorized(request)
    }
}

fn multipart_body(boundary: &str, file: &UploadFile, owner: UserId) -> Vec<u8> {
    let file_name = header_safe(&file.file_name).replace('"', "");
    let mime_type = header_safe(&file.mime_type);
    let mut body = Vec::with_capacity(file.bytes.len() + 512);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {mime_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&file.bytes);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"owner_id\"\r\n\r\n");
    body.extend_from_slice(owner.to_string().as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// Part headers are line-based; shell-supplied values must not break out of their line.
fn header_safe(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// Fails with [`ApiError::Status`] on any non-2xx answer.
pub fn expect_success(result: HttpResult) -> Result<(), ApiError> {
    let response = result?;
    if response.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status {
            status: response.status(),
            body: String::from_utf8_lossy(response.body()).into_owned(),
        })
    }
}

pub fn decode<T: DeserializeOwned>(result: HttpResult) -> Result<T, ApiError> {
    let response = result?;
    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status(),
            body: String::from_utf8_lossy(response.body()).into_owned(),
        });
    }
    serde_json::from_slice(response.body()).map_err(|e| ApiError::Decode(e.to_string()))
}
