//! Stateless HTTP request builder and response parser for the Podcast Index
//! API.
//!
//! # Design
//! `PodcastIndexClient` holds only its base URL and the headers it stamps on
//! every request, and carries no mutable state between calls. Each operation
//! is split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`. The caller (or
//! `PodcastIndex`, which pairs the client with a `Transport`) executes the
//! round-trip in between.
//!
//! All `parse_*` methods funnel through `parse_envelope`: reject non-2xx,
//! decode the envelope, check the status flag, then hand out the payload.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{
    before_clause, clean_clause, encode, exclude_clause, max_clause, quoted, since_clause, Filters,
    QueryKind,
};
use crate::types::{
    AddFeedEnvelope, CategoriesEnvelope, Category, Envelope, Episode, EpisodeEnvelope,
    EpisodesEnvelope, NewPodcast, NewPodcastsEnvelope, Podcast, PodcastEnvelope, PodcastsEnvelope,
    RandomEpisodesEnvelope, RecentPodcast, RecentPodcastsEnvelope,
};

/// Synchronous, stateless client for the Podcast Index API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct PodcastIndexClient {
    base_url: String,
    user_agent: Option<String>,
}

impl PodcastIndexClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            ..Self::new(&config.base_url)
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, kind: QueryKind, query: &str) -> HttpRequest {
        let url = if query.is_empty() {
            format!("{}/{}", self.base_url, kind.endpoint())
        } else {
            format!("{}/{}?{query}", self.base_url, kind.endpoint())
        };
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if let Some(ua) = &self.user_agent {
            headers.push(("user-agent".to_string(), ua.clone()));
        }
        HttpRequest { url, headers }
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Search podcasts by title, author or owner.
    pub fn build_search_podcasts(&self, term: &str) -> HttpRequest {
        self.build_search_podcasts_with(term, false, 0)
    }

    /// Search with explicit-content filtering and a result cap.
    ///
    /// - `clean` keeps only feeds not marked `itunes:explicit`
    /// - `max` caps the result count; 0 uses the service default
    pub fn build_search_podcasts_with(&self, term: &str, clean: bool, max: u32) -> HttpRequest {
        let query = format!(
            "q={}&fulltext{}{}",
            quoted(term),
            clean_clause(clean),
            max_clause(max)
        );
        self.request(QueryKind::SearchPodcasts, &query)
    }

    pub fn parse_search_podcasts(&self, response: HttpResponse) -> Result<Vec<Podcast>, ApiError> {
        parse_envelope::<PodcastsEnvelope>(QueryKind::SearchPodcasts, response)
    }

    /// Episodes mentioning a person in person tags, title, description, or
    /// the feed's owner and author.
    pub fn build_search_episodes_by_person(&self, term: &str) -> HttpRequest {
        let query = format!("q={}&fulltext", quoted(term));
        self.request(QueryKind::SearchEpisodesByPerson, &query)
    }

    pub fn parse_search_episodes_by_person(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Episode>, ApiError> {
        parse_envelope::<EpisodesEnvelope>(QueryKind::SearchEpisodesByPerson, response)
    }

    // -----------------------------------------------------------------------
    // Podcast lookup
    // -----------------------------------------------------------------------

    pub fn build_podcast_by_feed_url(&self, feed_url: &str) -> HttpRequest {
        let query = format!("url={}&fulltext", encode(feed_url));
        self.request(QueryKind::PodcastByFeedUrl, &query)
    }

    pub fn parse_podcast_by_feed_url(&self, response: HttpResponse) -> Result<Podcast, ApiError> {
        parse_envelope::<PodcastEnvelope>(QueryKind::PodcastByFeedUrl, response)
    }

    pub fn build_podcast_by_feed_id(&self, id: &str) -> HttpRequest {
        let query = format!("id={}&fulltext", encode(id));
        self.request(QueryKind::PodcastByFeedId, &query)
    }

    pub fn parse_podcast_by_feed_id(&self, response: HttpResponse) -> Result<Podcast, ApiError> {
        parse_envelope::<PodcastEnvelope>(QueryKind::PodcastByFeedId, response)
    }

    pub fn build_podcast_by_itunes_id(&self, id: &str) -> HttpRequest {
        let query = format!("id={}&fulltext", encode(id));
        self.request(QueryKind::PodcastByItunesId, &query)
    }

    pub fn parse_podcast_by_itunes_id(&self, response: HttpResponse) -> Result<Podcast, ApiError> {
        parse_envelope::<PodcastEnvelope>(QueryKind::PodcastByItunesId, response)
    }

    // -----------------------------------------------------------------------
    // Episode lookup
    // -----------------------------------------------------------------------

    /// Episodes of one feed. `max` of 0 uses the service default and `since`
    /// of `None` disables the time filter.
    pub fn build_episodes_by_feed_id(
        &self,
        id: &str,
        max: u32,
        since: Option<DateTime<Utc>>,
    ) -> HttpRequest {
        let query = format!(
            "id={}&fulltext{}{}",
            encode(id),
            max_clause(max),
            since_clause(since)
        );
        self.request(QueryKind::EpisodesByFeedId, &query)
    }

    pub fn parse_episodes_by_feed_id(&self, response: HttpResponse) -> Result<Vec<Episode>, ApiError> {
        parse_envelope::<EpisodesEnvelope>(QueryKind::EpisodesByFeedId, response)
    }

    /// Same as `build_episodes_by_feed_id`, keyed by the feed URL. The URL is
    /// sent quoted.
    pub fn build_episodes_by_feed_url(
        &self,
        feed_url: &str,
        max: u32,
        since: Option<DateTime<Utc>>,
    ) -> HttpRequest {
        let query = format!(
            "url={}&fulltext{}{}",
            quoted(feed_url),
            max_clause(max),
            since_clause(since)
        );
        self.request(QueryKind::EpisodesByFeedUrl, &query)
    }

    pub fn parse_episodes_by_feed_url(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Episode>, ApiError> {
        parse_envelope::<EpisodesEnvelope>(QueryKind::EpisodesByFeedUrl, response)
    }

    pub fn build_episodes_by_itunes_id(
        &self,
        id: &str,
        max: u32,
        since: Option<DateTime<Utc>>,
    ) -> HttpRequest {
        let query = format!(
            "id={}&fulltext{}{}",
            encode(id),
            max_clause(max),
            since_clause(since)
        );
        self.request(QueryKind::EpisodesByItunesId, &query)
    }

    pub fn parse_episodes_by_itunes_id(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Episode>, ApiError> {
        parse_envelope::<EpisodesEnvelope>(QueryKind::EpisodesByItunesId, response)
    }

    pub fn build_episode_by_id(&self, id: &str) -> HttpRequest {
        let query = format!("id={}&fulltext", encode(id));
        self.request(QueryKind::EpisodeById, &query)
    }

    pub fn parse_episode_by_id(&self, response: HttpResponse) -> Result<Episode, ApiError> {
        parse_envelope::<EpisodeEnvelope>(QueryKind::EpisodeById, response)
    }

    // -----------------------------------------------------------------------
    // Discovery
    // -----------------------------------------------------------------------

    /// Random episodes. Category includes and excludes can be combined. The
    /// service returns one episode when `max` is 0.
    pub fn build_random_episodes(&self, filters: &Filters, max: u32) -> HttpRequest {
        let query = format!("fulltext{}{}", max_clause(max), filters.clauses());
        self.request(QueryKind::RandomEpisodes, &query)
    }

    pub fn parse_random_episodes(&self, response: HttpResponse) -> Result<Vec<Episode>, ApiError> {
        parse_envelope::<RandomEpisodesEnvelope>(QueryKind::RandomEpisodes, response)
    }

    /// Most recent episodes across the whole index.
    ///
    /// - `before` returns only episodes older than that episode id; 0 disables
    /// - `exclude` drops episodes with this text in title or URL; empty disables
    pub fn build_recent_episodes(&self, before: u64, max: u32, exclude: &str) -> HttpRequest {
        let query = format!(
            "fulltext{}{}{}",
            max_clause(max),
            exclude_clause(exclude),
            before_clause(before)
        );
        self.request(QueryKind::RecentEpisodes, &query)
    }

    pub fn parse_recent_episodes(&self, response: HttpResponse) -> Result<Vec<Episode>, ApiError> {
        parse_envelope::<EpisodesEnvelope>(QueryKind::RecentEpisodes, response)
    }

    pub fn build_recent_podcasts(
        &self,
        filters: &Filters,
        max: u32,
        since: Option<DateTime<Utc>>,
    ) -> HttpRequest {
        let query = format!(
            "fulltext{}{}{}",
            max_clause(max),
            filters.clauses(),
            since_clause(since)
        );
        self.request(QueryKind::RecentPodcasts, &query)
    }

    pub fn parse_recent_podcasts(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<RecentPodcast>, ApiError> {
        parse_envelope::<RecentPodcastsEnvelope>(QueryKind::RecentPodcasts, response)
    }

    /// Up to 1000 feeds added during the last week.
    pub fn build_new_podcasts(&self) -> HttpRequest {
        self.request(QueryKind::NewPodcasts, "")
    }

    pub fn parse_new_podcasts(&self, response: HttpResponse) -> Result<Vec<NewPodcast>, ApiError> {
        parse_envelope::<NewPodcastsEnvelope>(QueryKind::NewPodcasts, response)
    }

    pub fn build_categories(&self) -> HttpRequest {
        self.request(QueryKind::Categories, "")
    }

    pub fn parse_categories(&self, response: HttpResponse) -> Result<Vec<Category>, ApiError> {
        parse_envelope::<CategoriesEnvelope>(QueryKind::Categories, response)
    }

    pub fn build_trending_podcasts(
        &self,
        filters: &Filters,
        max: u32,
        since: Option<DateTime<Utc>>,
    ) -> HttpRequest {
        let query = format!(
            "fulltext{}{}{}",
            max_clause(max),
            filters.clauses(),
            since_clause(since)
        );
        self.request(QueryKind::TrendingPodcasts, &query)
    }

    pub fn parse_trending_podcasts(&self, response: HttpResponse) -> Result<Vec<Podcast>, ApiError> {
        parse_envelope::<PodcastsEnvelope>(QueryKind::TrendingPodcasts, response)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    pub fn build_add_by_feed_url(&self, feed_url: &str) -> HttpRequest {
        let query = format!("url={}", encode(feed_url));
        self.request(QueryKind::AddByFeedUrl, &query)
    }

    pub fn parse_add_by_feed_url(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_envelope::<AddFeedEnvelope>(QueryKind::AddByFeedUrl, response)
    }
}

/// Status-then-payload interpretation shared by every `parse_*` method.
///
/// A false status wins over whatever the payload field holds.
fn parse_envelope<E: Envelope>(kind: QueryKind, response: HttpResponse) -> Result<E::Payload, ApiError> {
    check_status(&response)?;
    let envelope: E = serde_json::from_str(&response.body)?;
    if !envelope.status() {
        debug!(query = %kind, "service reported a false status");
        return Err(ApiError::NotFound(kind));
    }
    envelope.into_payload().ok_or_else(|| {
        debug!(query = %kind, "service returned no record");
        ApiError::NotFound(kind)
    })
}

/// Map non-2xx status codes to `ApiError::HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
