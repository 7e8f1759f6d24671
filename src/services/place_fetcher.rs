use crate::error::{AppError, Result};
use crate::models::{Coordinates, Place};
use crate::services::google_places::{NearbySearch, PlacesProvider};
use futures::future::try_join_all;
use std::time::Duration;

/// Collects raw candidates for trip segments from a nearby-search provider.
pub struct PlaceFetcher<'a> {
    provider: &'a dyn PlacesProvider,
    max_pages: usize,
    page_delay: Duration,
}

impl<'a> PlaceFetcher<'a> {
    pub fn new(provider: &'a dyn PlacesProvider, max_pages: usize) -> Self {
        PlaceFetcher {
            provider,
            max_pages: max_pages.max(1),
            page_delay: Duration::ZERO,
        }
    }

    /// Wait this long before every continuation page.
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Candidates around one segment center: the price-filtered query
    /// followed by the unfiltered one.
    pub async fn fetch_segment(&self, center: Coordinates, radius_m: f64) -> Result<Vec<Place>> {
        let mut places = self
            .fetch_chain(NearbySearch::new(center, radius_m, true))
            .await?;
        places.extend(
            self.fetch_chain(NearbySearch::new(center, radius_m, false))
                .await?,
        );

        tracing::debug!(
            lat = center.lat,
            lng = center.lng,
            candidates = places.len(),
            "Fetched {} candidate places",
            places.len()
        );
        Ok(places)
    }

    /// All segments at once. Output order follows `centers`.
    pub async fn fetch_segments(
        &self,
        centers: &[(Coordinates, f64)],
    ) -> Result<Vec<Vec<Place>>> {
        try_join_all(
            centers
                .iter()
                .map(|(center, radius_m)| self.fetch_segment(*center, *radius_m)),
        )
        .await
    }

    /// Follow `next_page_token` for up to `max_pages` pages.
    ///
    /// The first page must succeed. A failure on a later page keeps what
    /// was collected so far.
    async fn fetch_chain(&self, query: NearbySearch) -> Result<Vec<Place>> {
        let mut places = Vec::new();
        let mut query = query;

        for page in 0..self.max_pages {
            if page > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let result = match self.provider.search_nearby(&query).await {
                Ok(result) => result,
                Err(e) if page == 0 => {
                    return Err(match e {
                        AppError::ProviderUnavailable(_) => e,
                        other => AppError::ProviderUnavailable(other.to_string()),
                    });
                }
                Err(e) => {
                    let degraded = AppError::ProviderDegraded(e.to_string());
                    tracing::warn!(
                        page = page,
                        by_price = query.query_by_price,
                        "Stopping place pagination: {}",
                        degraded
                    );
                    break;
                }
            };

            places.extend(result.results);
            match result.next_page_token {
                Some(token) if !token.is_empty() => query = query.next_page(token),
                _ => break,
            }
        }

        Ok(places)
    }
}
