//! HH Client: the single point of entry for the job platform (HeadHunter API).
//!
//! Both the Catalog Gateway and the Application Submitter go through this
//! client, so authentication, User-Agent handling and status classification
//! live in one place.

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::posting::{Posting, SalaryRange};

#[derive(Debug, Error)]
pub enum HhError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authorization rejected (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Rate limited by the job platform")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// Parameters for `GET /vacancies`. Multi-valued filters are sent as repeated keys.
#[derive(Debug, Clone, Default)]
pub struct VacancySearch {
    pub specializations: Vec<String>,
    pub areas: Vec<String>,
    pub page: u32,
    pub per_page: u32,
}

impl VacancySearch {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        pairs.extend(
            self.specializations
                .iter()
                .map(|s| ("specialization", s.clone())),
        );
        pairs.extend(self.areas.iter().map(|a| ("area", a.clone())));
        pairs
    }
}

#[derive(Debug, Deserialize)]
pub struct VacancySearchResponse {
    #[serde(default)]
    pub items: Vec<VacancyItem>,
    #[serde(default)]
    pub found: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct VacancyItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub employer: Option<NamedRef>,
    pub area: Option<NamedRef>,
    pub salary: Option<SalaryRange>,
    pub snippet: Option<Snippet>,
    pub alternate_url: Option<String>,
    #[serde(default)]
    pub key_skills: Vec<NamedRef>,
}

#[derive(Debug, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Snippet {
    pub requirement: Option<String>,
    pub responsibility: Option<String>,
}

impl From<VacancyItem> for Posting {
    fn from(item: VacancyItem) -> Self {
        let (requirement, responsibility) = item
            .snippet
            .map(|s| (s.requirement, s.responsibility))
            .unwrap_or((None, None));

        Posting {
            id: item.id,
            title: item.name,
            company: item.employer.map(|e| e.name).unwrap_or_default(),
            salary: item.salary,
            area: item.area.map(|a| a.name),
            requirement: requirement.map(|r| strip_highlight(&r)),
            responsibility: responsibility.map(|r| strip_highlight(&r)),
            url: item.alternate_url,
            key_skills: item.key_skills.into_iter().map(|s| s.name).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HhErrorBody {
    description: Option<String>,
    #[serde(default)]
    errors: Vec<HhErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct HhErrorEntry {
    #[serde(rename = "type")]
    kind: String,
    value: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HhClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    user_agent: String,
}

impl HhClient {
    pub fn new(base_url: String, access_token: Option<String>, user_agent: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            user_agent,
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(header::USER_AGENT, &self.user_agent);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// `GET /vacancies`: one page of search results.
    pub async fn search_vacancies(
        &self,
        search: &VacancySearch,
    ) -> Result<VacancySearchResponse, HhError> {
        let response = self
            .request(self.client.get(format!("{}/vacancies", self.base_url)))
            .query(&search.query_pairs())
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let body = response.text().await?;
        let parsed: VacancySearchResponse = serde_json::from_str(&body)?;

        debug!(
            "Vacancy search page {} returned {} items (found={})",
            parsed.page,
            parsed.items.len(),
            parsed.found
        );
        Ok(parsed)
    }

    /// `POST /negotiations`: applies to a vacancy with a published resume.
    ///
    /// Any 2xx means the application was created. The negotiation id comes from
    /// the `Location` header and is `None` when the platform omits it.
    pub async fn apply(
        &self,
        vacancy_id: &str,
        resume_id: &str,
        message: Option<&str>,
    ) -> Result<Option<String>, HhError> {
        let mut form = vec![("vacancy_id", vacancy_id), ("resume_id", resume_id)];
        if let Some(message) = message {
            form.push(("message", message));
        }

        let response = self
            .request(self.client.post(format!("{}/negotiations", self.base_url)))
            .form(&form)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let negotiation_id = negotiation_id_from_location(location);
        if negotiation_id.is_none() {
            warn!(vacancy_id, "Negotiation created without a usable Location header ('{location}')");
        }
        Ok(negotiation_id)
    }
}

async fn ensure_success(response: Response) -> Result<Response, HhError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();
    Err(classify_failure(status, &body, retry_after))
}

/// Maps a non-success response onto the error taxonomy the gateway and submitter rely on.
fn classify_failure(status: StatusCode, body: &str, retry_after: Option<Duration>) -> HhError {
    let message = describe_error_body(body);

    if status == StatusCode::UNAUTHORIZED {
        return HhError::Unauthorized {
            status: status.as_u16(),
            message,
        };
    }
    if status == StatusCode::FORBIDDEN && message.contains("bad_authorization") {
        return HhError::Unauthorized {
            status: status.as_u16(),
            message,
        };
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return HhError::RateLimited { retry_after };
    }
    HhError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Renders `{"errors":[{"type":"negotiations","value":"already_applied"}]}` as
/// `negotiations:already_applied`; falls back to the description or raw body.
fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<HhErrorBody>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .iter()
            .map(|e| match &e.value {
                Some(value) => format!("{}:{}", e.kind, value),
                None => e.kind.clone(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Ok(parsed) => parsed.description.unwrap_or_else(|| body.to_string()),
        Err(_) => body.trim().to_string(),
    }
}

fn negotiation_id_from_location(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty() && !id.contains(':'))
        .map(|id| id.to_string())
}

/// Search snippets wrap matched terms in `<highlighttext>` tags.
fn strip_highlight(text: &str) -> String {
    text.replace("<highlighttext>", "")
        .replace("</highlighttext>", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_maps_to_postings() {
        let body = r#"{
            "items": [{
                "id": "93211",
                "name": "Rust Developer",
                "employer": {"name": "Acme"},
                "area": {"id": "1", "name": "Moscow"},
                "salary": {"from": 250000, "to": null, "currency": "RUR"},
                "snippet": {
                    "requirement": "Experience with <highlighttext>Rust</highlighttext>",
                    "responsibility": null
                },
                "alternate_url": "https://hh.ru/vacancy/93211"
            }],
            "found": 412,
            "pages": 5,
            "per_page": 100,
            "page": 0
        }"#;

        let response: VacancySearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.found, 412);
        assert_eq!(response.pages, 5);

        let posting: Posting = response.items.into_iter().next().unwrap().into();
        assert_eq!(posting.id, "93211");
        assert_eq!(posting.company, "Acme");
        assert_eq!(posting.area.as_deref(), Some("Moscow"));
        assert_eq!(posting.requirement.as_deref(), Some("Experience with Rust"));
        assert!(posting.responsibility.is_none());
        assert_eq!(posting.salary.unwrap().from, Some(250000));
    }

    #[test]
    fn test_query_pairs_repeat_multi_valued_filters() {
        let search = VacancySearch {
            specializations: vec!["1.221".to_string()],
            areas: vec!["1".to_string(), "2".to_string()],
            page: 3,
            per_page: 50,
        };
        let pairs = search.query_pairs();
        assert!(pairs.contains(&("page", "3".to_string())));
        assert!(pairs.contains(&("specialization", "1.221".to_string())));
        assert_eq!(pairs.iter().filter(|(k, _)| *k == "area").count(), 2);
    }

    #[test]
    fn test_classify_unauthorized() {
        let err = classify_failure(StatusCode::UNAUTHORIZED, "", None);
        assert!(matches!(err, HhError::Unauthorized { status: 401, .. }));
    }

    #[test]
    fn test_classify_forbidden_bad_authorization_as_unauthorized() {
        let body = r#"{"errors":[{"type":"oauth","value":"bad_authorization"}]}"#;
        let err = classify_failure(StatusCode::FORBIDDEN, body, None);
        assert!(matches!(err, HhError::Unauthorized { status: 403, .. }));
    }

    #[test]
    fn test_classify_rate_limited_keeps_retry_after() {
        let err = classify_failure(
            StatusCode::TOO_MANY_REQUESTS,
            "",
            Some(Duration::from_secs(2)),
        );
        match err {
            HhError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(2)))
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_business_error_keeps_reason() {
        let body = r#"{"errors":[{"type":"negotiations","value":"already_applied"}]}"#;
        match classify_failure(StatusCode::FORBIDDEN, body, None) {
            HhError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "negotiations:already_applied");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn test_negotiation_id_from_location() {
        assert_eq!(
            negotiation_id_from_location("/negotiations/1234567"),
            Some("1234567".to_string())
        );
        assert_eq!(
            negotiation_id_from_location("https://api.hh.ru/negotiations/42/"),
            Some("42".to_string())
        );
        assert_eq!(negotiation_id_from_location(""), None);
    }
}
