use gloo_net::http::Request;
use log::{error, info};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("could not reach the mail service: {0}")]
    Network(#[from] gloo_net::Error),
    #[error("failed to send the report email")]
    SendFailed,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReportEmailRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub analysis_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
}

impl ReportEmailRequest {
    pub fn validate(&self) -> Result<(), MailError> {
        if self.email.trim().is_empty() {
            return Err(MailError::MissingField("email"));
        }
        if self.analysis_id.trim().is_empty() {
            return Err(MailError::MissingField("analysis_id"));
        }
        Ok(())
    }
}

/// Asks the remote mail function to send the report email. One attempt,
/// no retry; on a non-2xx answer the body is logged and a generic error
/// returned.
pub async fn send_report_email(request: &ReportEmailRequest) -> Result<Value, MailError> {
    request.validate()?;

    let response = Request::post(config::get_mail_function_url())
        .header("Content-Type", "application/json")
        .header(
            "Authorization",
            &format!("Bearer {}", config::get_mail_function_key()),
        )
        .json(request)?
        .send()
        .await?;

    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!("Mail function returned {}: {}", status, body);
        return Err(MailError::SendFailed);
    }

    info!("Report email queued for analysis {}", request.analysis_id);
    Ok(response.json::<Value>().await?)
}
