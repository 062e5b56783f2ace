//! `PodcastIndex` pairs a `PodcastIndexClient` with a `Transport` so each
//! query is a single method call.
//!
//! Every method runs the same three steps through `round_trip`: build the
//! request, execute it once, parse the response. Nothing is retried or
//! cached; every failure reaches the caller as returned by the failing step.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::client::PodcastIndexClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::query::Filters;
use crate::transport::UreqTransport;
use crate::types::{Category, Episode, NewPodcast, Podcast, RecentPodcast};

#[derive(Debug, Clone)]
pub struct PodcastIndex<T> {
    client: PodcastIndexClient,
    transport: T,
}

impl PodcastIndex<UreqTransport> {
    /// Client and ureq transport built from the same configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(PodcastIndexClient::from_config(config), UreqTransport::new(config))
    }
}

impl<T: Transport> PodcastIndex<T> {
    pub fn new(client: PodcastIndexClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PodcastIndexClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn round_trip<R>(
        &self,
        request: HttpRequest,
        parse: impl FnOnce(&PodcastIndexClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        debug!(url = %request.url, "sending podcast index request");
        let response = self.transport.execute(&request)?;
        debug!(url = %request.url, status = response.status, "received podcast index response");
        parse(&self.client, response)
    }

    pub fn search_podcasts(&self, term: &str) -> Result<Vec<Podcast>, ApiError> {
        self.round_trip(
            self.client.build_search_podcasts(term),
            PodcastIndexClient::parse_search_podcasts,
        )
    }

    /// See `PodcastIndexClient::build_search_podcasts_with`.
    pub fn search_podcasts_with(
        &self,
        term: &str,
        clean: bool,
        max: u32,
    ) -> Result<Vec<Podcast>, ApiError> {
        self.round_trip(
            self.client.build_search_podcasts_with(term, clean, max),
            PodcastIndexClient::parse_search_podcasts,
        )
    }

    pub fn search_episodes_by_person(&self, term: &str) -> Result<Vec<Episode>, ApiError> {
        self.round_trip(
            self.client.build_search_episodes_by_person(term),
            PodcastIndexClient::parse_search_episodes_by_person,
        )
    }

    pub fn podcast_by_feed_url(&self, feed_url: &str) -> Result<Podcast, ApiError> {
        self.round_trip(
            self.client.build_podcast_by_feed_url(feed_url),
            PodcastIndexClient::parse_podcast_by_feed_url,
        )
    }

    pub fn podcast_by_feed_id(&self, id: &str) -> Result<Podcast, ApiError> {
        self.round_trip(
            self.client.build_podcast_by_feed_id(id),
            PodcastIndexClient::parse_podcast_by_feed_id,
        )
    }

    pub fn podcast_by_itunes_id(&self, id: &str) -> Result<Podcast, ApiError> {
        self.round_trip(
            self.client.build_podcast_by_itunes_id(id),
            PodcastIndexClient::parse_podcast_by_itunes_id,
        )
    }

    pub fn episodes_by_feed_id(
        &self,
        id: &str,
        max: u32,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Episode>, ApiError> {
        self.round_trip(
            self.client.build_episodes_by_feed_id(id, max, since),
            PodcastIndexClient::parse_episodes_by_feed_id,
        )
    }

    pub fn episodes_by_feed_url(
        &self,
        feed_url: &str,
        max: u32,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Episode>, ApiError> {
        self.round_trip(
            self.client.build_episodes_by_feed_url(feed_url, max, since),
            PodcastIndexClient::parse_episodes_by_feed_url,
        )
    }

    pub fn episodes_by_itunes_id(
        &self,
        id: &str,
        max: u32,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Episode>, ApiError> {
        self.round_trip(
            self.client.build_episodes_by_itunes_id(id, max, since),
            PodcastIndexClient::parse_episodes_by_itunes_id,
        )
    }

    pub fn episode_by_id(&self, id: &str) -> Result<Episode, ApiError> {
        self.round_trip(
            self.client.build_episode_by_id(id),
            PodcastIndexClient::parse_episode_by_id,
        )
    }

    pub fn random_episodes(&self, filters: &Filters, max: u32) -> Result<Vec<Episode>, ApiError> {
        self.round_trip(
            self.client.build_random_episodes(filters, max),
            PodcastIndexClient::parse_random_episodes,
        )
    }

    pub fn recent_episodes(
        &self,
        before: u64,
        max: u32,
        exclude: &str,
    ) -> Result<Vec<Episode>, ApiError> {
        self.round_trip(
            self.client.build_recent_episodes(before, max, exclude),
            PodcastIndexClient::parse_recent_episodes,
        )
    }

    pub fn recent_podcasts(
        &self,
        filters: &Filters,
        max: u32,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RecentPodcast>, ApiError> {
        self.round_trip(
            self.client.build_recent_podcasts(filters, max, since),
            PodcastIndexClient::parse_recent_podcasts,
        )
    }

    pub fn new_podcasts(&self) -> Result<Vec<NewPodcast>, ApiError> {
        self.round_trip(
            self.client.build_new_podcasts(),
            PodcastIndexClient::parse_new_podcasts,
        )
    }

    pub fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.round_trip(
            self.client.build_categories(),
            PodcastIndexClient::parse_categories,
        )
    }

    pub fn trending_podcasts(
        &self,
        filters: &Filters,
        max: u32,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Podcast>, ApiError> {
        self.round_trip(
            self.client.build_trending_podcasts(filters, max, since),
            PodcastIndexClient::parse_trending_podcasts,
        )
    }

    /// Submit a feed to the index. Success carries no data.
    pub fn add_by_feed_url(&self, feed_url: &str) -> Result<(), ApiError> {
        self.round_trip(
            self.client.build_add_by_feed_url(feed_url),
            PodcastIndexClient::parse_add_by_feed_url,
        )
    }
}
