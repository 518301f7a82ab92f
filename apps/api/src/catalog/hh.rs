use async_trait::async_trait;

use crate::catalog::{CatalogError, CatalogGateway, CatalogPage};
use crate::hh_client::{HhClient, HhError, VacancySearch};

/// Catalog Gateway over `GET /vacancies`. Page tokens are zero-based page numbers.
///
/// `max_pages` bounds how deep a single query goes; the reported `total` is
/// capped to what those pages can deliver so progress counters stay honest.
pub struct HhCatalogGateway {
    hh: HhClient,
    per_page: u32,
    max_pages: u32,
}

impl HhCatalogGateway {
    pub fn new(hh: HhClient, per_page: u32, max_pages: u32) -> Self {
        Self {
            hh,
            per_page: per_page.clamp(1, 100),
            max_pages: max_pages.max(1),
        }
    }
}

#[async_trait]
impl CatalogGateway for HhCatalogGateway {
    async fn fetch(
        &self,
        specializations: &[String],
        cities: &[String],
        page_token: Option<&str>,
    ) -> Result<CatalogPage, CatalogError> {
        let page = parse_page_token(page_token)?;

        let response = self
            .hh
            .search_vacancies(&VacancySearch {
                specializations: specializations.to_vec(),
                areas: cities.to_vec(),
                page,
                per_page: self.per_page,
            })
            .await?;

        let window = PageWindow {
            per_page: self.per_page,
            max_pages: self.max_pages,
        };

        Ok(CatalogPage {
            total: window.reachable_total(response.found),
            next_page_token: window.next_page(page, response.pages).map(|p| p.to_string()),
            items: response.items.into_iter().map(Into::into).collect(),
        })
    }
}

impl From<HhError> for CatalogError {
    fn from(err: HhError) -> Self {
        match err {
            HhError::Unauthorized { message, .. } => CatalogError::AuthenticationLost(message),
            HhError::RateLimited { retry_after } => CatalogError::RateLimited { retry_after },
            other => CatalogError::TransportFailure(other.to_string()),
        }
    }
}

fn parse_page_token(token: Option<&str>) -> Result<u32, CatalogError> {
    match token {
        None => Ok(0),
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| CatalogError::TransportFailure(format!("invalid page token '{raw}'"))),
    }
}

#[derive(Debug, Clone, Copy)]
struct PageWindow {
    per_page: u32,
    max_pages: u32,
}

impl PageWindow {
    fn reachable_total(&self, found: u32) -> u32 {
        found.min(self.per_page.saturating_mul(self.max_pages))
    }

    fn next_page(&self, current: u32, reported_pages: u32) -> Option<u32> {
        let next = current + 1;
        (next < reported_pages.min(self.max_pages)).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_window_caps_total() {
        let window = PageWindow {
            per_page: 100,
            max_pages: 1,
        };
        assert_eq!(window.reachable_total(2_450), 100);
        assert_eq!(window.reachable_total(37), 37);
        assert_eq!(window.next_page(0, 25), None);
    }

    #[test]
    fn test_multi_page_window_stops_at_reported_pages() {
        let window = PageWindow {
            per_page: 50,
            max_pages: 4,
        };
        assert_eq!(window.next_page(0, 2), Some(1));
        assert_eq!(window.next_page(1, 2), None);
        assert_eq!(window.next_page(2, 10), Some(3));
        assert_eq!(window.next_page(3, 10), None);
        assert_eq!(window.reachable_total(1_000), 200);
    }

    #[test]
    fn test_page_token_parsing() {
        assert_eq!(parse_page_token(None).unwrap(), 0);
        assert_eq!(parse_page_token(Some("3")).unwrap(), 3);
        assert!(matches!(
            parse_page_token(Some("abc")),
            Err(CatalogError::TransportFailure(_))
        ));
    }

    #[test]
    fn test_hh_errors_map_to_catalog_taxonomy() {
        let auth: CatalogError = HhError::Unauthorized {
            status: 401,
            message: "token expired".to_string(),
        }
        .into();
        assert!(matches!(auth, CatalogError::AuthenticationLost(_)));

        let limited: CatalogError = HhError::RateLimited { retry_after: None }.into();
        assert!(matches!(limited, CatalogError::RateLimited { .. }));

        let server: CatalogError = HhError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        }
        .into();
        assert!(matches!(server, CatalogError::TransportFailure(_)));
    }
}
