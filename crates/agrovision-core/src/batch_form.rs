//! Batch creation form.

use agrovision_api_models::{BatchCreateRequest, BatchRecord, parse_wire_date};
use agrovision_gateway::RemoteGateway;

use crate::error::{ClientError, ClientResult};
use crate::validation::all_present;

/// Shown when a required field is blank.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all the required fields.";
/// Shown when the sowing date does not parse.
pub const INVALID_DATE_MESSAGE: &str = "Sowing date must be a date in YYYY-MM-DD format.";
/// Shown alongside the classified error when creation fails.
pub const CREATE_FAILED_MESSAGE: &str = "Failed to add batch. Please try again.";

/// Editable form state. Fields hold raw user input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchForm {
    /// Batch name.
    pub name: String,
    /// Crop type.
    pub kind: String,
    /// Sowing date, `YYYY-MM-DD`.
    pub sowing_date: String,
    /// Growing substrate.
    pub substrate: String,
    last_error: Option<ClientError>,
}

impl BatchForm {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Error from the last submission.
    #[must_use]
    pub const fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Banner for the last submission: the validation message, or the generic
    /// failure notice when the request itself failed.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        self.last_error.as_ref().map(|error| {
            if error.is_validation() {
                error.user_message()
            } else {
                CREATE_FAILED_MESSAGE.to_string()
            }
        })
    }

    /// Build the request body from the current input.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when a field is blank or the date is malformed.
    pub fn to_request(&self) -> ClientResult<BatchCreateRequest> {
        if !all_present(&[
            self.name.as_str(),
            self.kind.as_str(),
            self.sowing_date.as_str(),
            self.substrate.as_str(),
        ]) {
            return Err(ClientError::validation(MISSING_FIELDS_MESSAGE));
        }
        let sowing_date = parse_wire_date(self.sowing_date.trim())
            .ok_or_else(|| ClientError::validation(INVALID_DATE_MESSAGE))?;
        Ok(BatchCreateRequest {
            name: self.name.trim().to_string(),
            kind: self.kind.trim().to_string(),
            sowing_date,
            substrate: self.substrate.trim().to_string(),
        })
    }

    /// Validate and submit. The form resets on success and keeps its input on failure.
    ///
    /// # Errors
    ///
    /// Returns the validation error (no request made) or the classified creation failure.
    pub async fn submit(&mut self, gateway: &dyn RemoteGateway) -> ClientResult<BatchRecord> {
        let request = match self.to_request() {
            Ok(request) => request,
            Err(error) => {
                self.last_error = Some(error.clone());
                return Err(error);
            }
        };
        match gateway.create_batch(&request).await {
            Ok(record) => {
                tracing::info!(batch_id = %record.batch_id, "batch created");
                *self = Self::default();
                Ok(record)
            }
            Err(err) => {
                let error = ClientError::from(err);
                tracing::warn!(error = %error, "batch creation failed");
                self.last_error = Some(error.clone());
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrovision_gateway::GatewayError;
    use agrovision_test_support::fixtures::sample_batch;
    use agrovision_test_support::mocks::{GatewayCall, ScriptedGateway};
    use chrono::NaiveDate;

    fn filled() -> BatchForm {
        BatchForm {
            name: " Batch 4 ".to_string(),
            kind: "microgreens".to_string(),
            sowing_date: "2024-03-01".to_string(),
            substrate: "coco coir".to_string(),
            ..BatchForm::default()
        }
    }

    #[tokio::test]
    async fn blank_field_is_rejected_without_request() {
        let gateway = ScriptedGateway::new();
        let mut form = BatchForm {
            substrate: "  ".to_string(),
            ..filled()
        };

        let err = form.submit(&gateway).await.expect_err("blank substrate");
        assert_eq!(err, ClientError::validation(MISSING_FIELDS_MESSAGE));
        assert_eq!(form.notice().as_deref(), Some(MISSING_FIELDS_MESSAGE));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_date_is_rejected_without_request() {
        let gateway = ScriptedGateway::new();
        let mut form = BatchForm {
            sowing_date: "next tuesday".to_string(),
            ..filled()
        };
        let err = form.submit(&gateway).await.expect_err("bad date");
        assert_eq!(err, ClientError::validation(INVALID_DATE_MESSAGE));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn success_sends_trimmed_request_and_resets() {
        let gateway = ScriptedGateway::new();
        gateway.push_created(Ok(sample_batch(4)));
        let mut form = filled();

        let record = form.submit(&gateway).await.expect("created");
        assert_eq!(record, sample_batch(4));
        assert_eq!(form, BatchForm::default());
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::CreateBatch(BatchCreateRequest {
                name: "Batch 4".to_string(),
                kind: "microgreens".to_string(),
                sowing_date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
                substrate: "coco coir".to_string(),
            })]
        );
    }

    #[tokio::test]
    async fn failure_keeps_input_and_reports_notice() {
        let gateway = ScriptedGateway::new();
        gateway.push_created(Err(GatewayError::Server {
            status: 500,
            message: None,
        }));
        let mut form = filled();

        let err = form.submit(&gateway).await.expect_err("server error");
        assert_eq!(err.user_message(), "Server Error: Something went wrong.");
        assert_eq!(form.name, " Batch 4 ");
        assert_eq!(form.notice().as_deref(), Some(CREATE_FAILED_MESSAGE));
    }
}
