// Minimal client for the Twilio Programmable Messaging API.
//
// Only what verification needs: send a plain SMS from a configured number.

use std::collections::HashMap;

pub mod models;
use reqwest::{header, Client};

use crate::models::{MessageResponse, TwilioApiError};

const DEFAULT_API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 format (or a messaging service SID)
    pub from_number: String,
}

/// Errors returned by [`TwilioService`]
#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    #[error("request to Twilio failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Twilio returned {status}: {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("message {sid} was not accepted (status: {status})")]
    Rejected { sid: String, status: String },
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    api_base: String,
    client: Client,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self::with_api_base(options, DEFAULT_API_BASE)
    }

    /// Point the client at a different API host (used against local stubs)
    pub fn with_api_base(options: TwilioOptions, api_base: impl Into<String>) -> Self {
        Self {
            options,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn messages_url(&self) -> String {
        format!(
            "{base}/Accounts/{sid}/Messages.json",
            base = self.api_base,
            sid = self.options.account_sid
        )
    }

    /// Send a text message to `recipient`.
    ///
    /// Succeeds once Twilio has queued the message. Twilio reports
    /// carrier-level delivery asynchronously, so a queued message is the
    /// strongest guarantee available at request time.
    pub async fn send_sms(
        &self,
        recipient: &str,
        body: &str,
    ) -> Result<MessageResponse, TwilioError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let form_body = self.message_form(recipient, body);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(headers)
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let api_error = serde_json::from_str::<TwilioApiError>(&error_body).ok();
            return Err(TwilioError::Api {
                status: status.as_u16(),
                code: api_error.as_ref().and_then(|e| e.code),
                message: api_error
                    .map(|e| e.message)
                    .unwrap_or(error_body),
            });
        }

        let message = response.json::<MessageResponse>().await?;
        if message.is_failed() {
            return Err(TwilioError::Rejected {
                sid: message.sid,
                status: message.status,
            });
        }

        Ok(message)
    }

    fn message_form<'a>(&'a self, recipient: &'a str, body: &'a str) -> HashMap<&'static str, &'a str> {
        let mut form_body = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("From", self.options.from_number.as_str());
        form_body.insert("Body", body);
        form_body
    }
}
