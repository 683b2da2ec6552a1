//! Staff-side redemption validator
//!
//! Single-state tool: staff type (or scan) a redemption code and submit it
//! to the check-and-mark-used endpoint. The server is the sole arbiter of
//! one-time use; the history list here is cosmetic convenience for the
//! counter, nothing more.

use serde_json::Value;

use crate::api::{RedemptionApi, ValidateOutcome};
use crate::errors::AppError;
use crate::models::redemption::{ValidationCode, ValidationRecord};
use crate::redemption::Notice;
use crate::validation;
use crate::log_warn;

/// Most-recent-first, bounded.
pub const HISTORY_LIMIT: usize = 5;

#[derive(Default)]
pub struct ValidatorTool {
    input: String,
    history: Vec<ValidationRecord>,
    notice: Option<Notice>,
}

impl ValidatorTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> &[ValidationRecord] {
        &self.history
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Validate the typed code. Codes are case-normalized to uppercase
    /// before submission. On success the input is cleared for the next
    /// scan; on failure it is retained so staff can correct and retry.
    pub async fn submit<A: RedemptionApi + Sync>(&mut self, api: &A) -> Result<(), AppError> {
        let code = self.input.trim().to_uppercase();

        if let Err(message) = validation::validate_redemption_code(&code) {
            self.notice = Some(Notice::Error(message));
            return Ok(());
        }

        match api.validate_code(&code).await? {
            ValidateOutcome::Valid(record) => {
                self.notice = Some(Notice::Info(record.message.clone()));
                self.history.insert(0, record);
                self.history.truncate(HISTORY_LIMIT);
                self.input.clear();
            }
            ValidateOutcome::Rejected(failure) => {
                let mut message = failure.display_message();

                let code_kind = failure
                    .status_code
                    .as_deref()
                    .map(ValidationCode::from_wire);
                if code_kind == Some(ValidationCode::AlreadyUsed) {
                    if let Some(at) = failure.raw.get("redeemed_at").and_then(Value::as_str) {
                        message = format!("{} (redeemed at {})", message, at);
                    }
                }

                log_warn!("VALIDATOR", "Redemption code rejected");
                self.notice = Some(Notice::Error(message));
            }
        }

        Ok(())
    }
}
