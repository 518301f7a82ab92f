use async_trait::async_trait;
use tracing::warn;

use crate::applying::{ApplicationSubmitter, ApplyError, CoverLetterWriter, SubmissionReceipt};
use crate::hh_client::{HhClient, HhError};
use crate::models::posting::Posting;
use crate::models::resume::ResumeVariation;

/// Applies through `POST /negotiations` with the user's published resume.
///
/// The platform only accepts resumes published there, so the tailored
/// variation shapes the cover letter while `resume_id` names the published one.
pub struct HhApplicationSubmitter {
    hh: HhClient,
    resume_id: Option<String>,
    cover_letters: Option<CoverLetterWriter>,
}

impl HhApplicationSubmitter {
    pub fn new(
        hh: HhClient,
        resume_id: Option<String>,
        cover_letters: Option<CoverLetterWriter>,
    ) -> Self {
        Self {
            hh,
            resume_id,
            cover_letters,
        }
    }
}

#[async_trait]
impl ApplicationSubmitter for HhApplicationSubmitter {
    async fn submit(
        &self,
        variation: &ResumeVariation,
        posting: &Posting,
    ) -> Result<SubmissionReceipt, ApplyError> {
        let resume_id = self.resume_id.as_deref().ok_or_else(|| {
            ApplyError::SubmissionRejected("no published resume configured".to_string())
        })?;

        let letter = match &self.cover_letters {
            Some(writer) => match writer.write(variation, posting).await {
                Ok(letter) => Some(letter),
                Err(e) => {
                    warn!(
                        posting_id = %posting.id,
                        "Cover letter drafting failed, applying without one: {e}"
                    );
                    None
                }
            },
            None => None,
        };

        let external_application_id = self
            .hh
            .apply(&posting.id, resume_id, letter.as_deref())
            .await?;

        Ok(SubmissionReceipt {
            external_application_id,
        })
    }
}

impl From<HhError> for ApplyError {
    fn from(err: HhError) -> Self {
        match err {
            HhError::Unauthorized { message, .. } => ApplyError::AuthenticationLost(message),
            HhError::Api { status, message } if is_business_refusal(status) => {
                ApplyError::SubmissionRejected(message)
            }
            other => ApplyError::SubmissionFailed(other.to_string()),
        }
    }
}

/// 400 / 403 / 404 / 409: the platform understood and refused the application.
fn is_business_refusal(status: u16) -> bool {
    matches!(status, 400 | 403 | 404 | 409)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::fixtures::posting;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::Router;
    use serde_json::json;
    use uuid::Uuid;

    fn variation() -> ResumeVariation {
        ResumeVariation {
            id: Uuid::new_v4(),
            base_resume_id: Uuid::new_v4(),
            posting_id: "1".to_string(),
            title: "t".to_string(),
            content: json!({}),
            adaptations: vec![],
        }
    }

    /// Local stand-in for `POST /negotiations` answering 201 with an optional `Location`.
    async fn negotiations_server(location: Option<&'static str>) -> String {
        let app = Router::new().route(
            "/negotiations",
            post(move || async move {
                match location {
                    Some(location) => {
                        (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
                    }
                    None => StatusCode::CREATED.into_response(),
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_created_without_location_counts_as_submitted() {
        let hh = HhClient::new(
            negotiations_server(None).await,
            Some("token".to_string()),
            "JobScout-test".to_string(),
        );
        let submitter = HhApplicationSubmitter::new(hh, Some("resume-1".to_string()), None);

        let receipt = submitter
            .submit(&variation(), &posting("1", "Rust Developer"))
            .await
            .unwrap();
        assert_eq!(receipt.external_application_id, None);
    }

    #[tokio::test]
    async fn test_created_with_location_reports_negotiation_id() {
        let hh = HhClient::new(
            negotiations_server(Some("/negotiations/777")).await,
            Some("token".to_string()),
            "JobScout-test".to_string(),
        );
        let submitter = HhApplicationSubmitter::new(hh, Some("resume-1".to_string()), None);

        let receipt = submitter
            .submit(&variation(), &posting("1", "Rust Developer"))
            .await
            .unwrap();
        assert_eq!(receipt.external_application_id.as_deref(), Some("777"));
    }

    #[test]
    fn test_already_applied_is_rejection() {
        let err: ApplyError = HhError::Api {
            status: 403,
            message: "negotiations:already_applied".to_string(),
        }
        .into();
        assert!(matches!(err, ApplyError::SubmissionRejected(m) if m.contains("already_applied")));
    }

    #[test]
    fn test_server_error_is_failure() {
        let err: ApplyError = HhError::Api {
            status: 503,
            message: "unavailable".to_string(),
        }
        .into();
        assert!(matches!(err, ApplyError::SubmissionFailed(_)));

        let err: ApplyError = HhError::RateLimited { retry_after: None }.into();
        assert!(matches!(err, ApplyError::SubmissionFailed(_)));
    }

    #[test]
    fn test_unauthorized_is_authentication_lost() {
        let err: ApplyError = HhError::Unauthorized {
            status: 401,
            message: "token expired".to_string(),
        }
        .into();
        assert!(matches!(err, ApplyError::AuthenticationLost(_)));
    }

    #[tokio::test]
    async fn test_missing_resume_id_rejects_without_calling_platform() {
        // Unroutable base URL: reaching the network would surface as SubmissionFailed.
        let hh = HhClient::new(
            "http://127.0.0.1:9".to_string(),
            None,
            "JobScout-test".to_string(),
        );
        let submitter = HhApplicationSubmitter::new(hh, None, None);

        let result = submitter.submit(&variation(), &posting("1", "Rust Developer")).await;
        assert!(matches!(result, Err(ApplyError::SubmissionRejected(_))));
    }
}
