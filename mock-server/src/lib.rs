//! A stand-in for the Podcast Index API.
//!
//! Serves every endpoint the client queries from an in-memory `Catalog`,
//! reading query strings the way the real service does: bare flags
//! (`fulltext`, `clean`), comma-separated lists (`lang`, `cat`, `notcat`),
//! quoted search terms and epoch-second `since` values. Replies use the
//! service's envelope with a string `status`.

pub mod catalog;

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub use catalog::{Catalog, Category, Episode, Podcast};

pub type Db = Arc<RwLock<Catalog>>;

type Params = Query<HashMap<String, String>>;
type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    app_with(Catalog::seeded())
}

pub fn app_with(catalog: Catalog) -> Router {
    let db: Db = Arc::new(RwLock::new(catalog));
    Router::new()
        .route("/search/byterm", get(search_by_term))
        .route("/search/byperson", get(search_by_person))
        .route("/podcasts/byfeedurl", get(podcast_by_feed_url))
        .route("/podcasts/byfeedid", get(podcast_by_feed_id))
        .route("/podcasts/byitunesid", get(podcast_by_itunes_id))
        .route("/podcasts/trending", get(trending_podcasts))
        .route("/episodes/byfeedid", get(episodes_by_feed_id))
        .route("/episodes/byfeedurl", get(episodes_by_feed_url))
        .route("/episodes/byitunesid", get(episodes_by_itunes_id))
        .route("/episodes/byid", get(episode_by_id))
        .route("/episodes/random", get(random_episodes))
        .route("/recent/episodes", get(recent_episodes))
        .route("/recent/feeds", get(recent_feeds))
        .route("/recent/newfeeds", get(new_feeds))
        .route("/categories/list", get(list_categories))
        .route("/add/byfeedurl", get(add_by_feed_url))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

async fn search_by_term(State(db): State<Db>, Query(params): Params) -> Reply {
    let term = required(&params, "q").map(|q| unquote(&q).to_lowercase())?;
    let clean = params.contains_key("clean");
    let max = max_param(&params, 10);
    let catalog = db.read().await;
    let feeds: Vec<&Podcast> = catalog
        .podcasts
        .iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&term)
                || p.author.to_lowercase().contains(&term)
                || p.owner_name.to_lowercase().contains(&term)
        })
        .filter(|p| !(clean && p.explicit))
        .take(max)
        .collect();
    Ok(Json(json!({ "status": "true", "count": feeds.len(), "feeds": feeds })))
}

async fn search_by_person(State(db): State<Db>, Query(params): Params) -> Reply {
    let person = required(&params, "q").map(|q| unquote(&q).to_lowercase())?;
    let catalog = db.read().await;
    let items: Vec<&Episode> = catalog
        .episodes
        .iter()
        .filter(|e| {
            e.persons.iter().any(|p| p.to_lowercase().contains(&person))
                || e.title.to_lowercase().contains(&person)
                || e.description.to_lowercase().contains(&person)
        })
        .collect();
    Ok(Json(json!({ "status": "true", "count": items.len(), "items": items })))
}

// ---------------------------------------------------------------------------
// Podcast lookup
// ---------------------------------------------------------------------------

/// Unknown URLs are answered with a false status.
async fn podcast_by_feed_url(State(db): State<Db>, Query(params): Params) -> Reply {
    let url = required(&params, "url")?;
    let catalog = db.read().await;
    Ok(Json(match catalog.podcast_by_url(&url) {
        Some(feed) => json!({ "status": "true", "feed": feed }),
        None => json!({ "status": "false", "feed": [], "description": "No feeds match this url." }),
    }))
}

/// Unknown ids are answered with a true status and an empty `feed` array.
async fn podcast_by_feed_id(State(db): State<Db>, Query(params): Params) -> Reply {
    let id = id_param(&params, "id")?;
    let catalog = db.read().await;
    Ok(Json(single_feed(catalog.podcast(id))))
}

async fn podcast_by_itunes_id(State(db): State<Db>, Query(params): Params) -> Reply {
    let id = id_param(&params, "id")?;
    let catalog = db.read().await;
    Ok(Json(single_feed(catalog.podcast_by_itunes_id(id))))
}

fn single_feed(feed: Option<&Podcast>) -> Value {
    match feed {
        Some(feed) => json!({ "status": "true", "feed": feed }),
        None => json!({ "status": "true", "feed": [], "description": "No feeds match this id." }),
    }
}

// ---------------------------------------------------------------------------
// Episodes
// ---------------------------------------------------------------------------

async fn episodes_by_feed_id(State(db): State<Db>, Query(params): Params) -> Reply {
    let id = id_param(&params, "id")?;
    let catalog = db.read().await;
    Ok(Json(feed_episodes(&catalog, catalog.podcast(id), &params)))
}

async fn episodes_by_feed_url(State(db): State<Db>, Query(params): Params) -> Reply {
    let url = required(&params, "url")?;
    let catalog = db.read().await;
    Ok(Json(feed_episodes(&catalog, catalog.podcast_by_url(unquote(&url)), &params)))
}

async fn episodes_by_itunes_id(State(db): State<Db>, Query(params): Params) -> Reply {
    let id = id_param(&params, "id")?;
    let catalog = db.read().await;
    Ok(Json(feed_episodes(&catalog, catalog.podcast_by_itunes_id(id), &params)))
}

/// A feed's episodes, newest first, honouring `max` and `since`. An unknown
/// feed yields a false status.
fn feed_episodes(catalog: &Catalog, feed: Option<&Podcast>, params: &HashMap<String, String>) -> Value {
    let Some(feed) = feed else {
        return json!({ "status": "false", "items": [], "description": "No feeds match this id." });
    };
    let since = since_param(params);
    let mut items: Vec<&Episode> = catalog
        .episodes_of(feed.id)
        .filter(|e| e.date_published >= since)
        .collect();
    items.sort_by(|a, b| b.date_published.cmp(&a.date_published));
    items.truncate(max_param(params, 10));
    json!({ "status": "true", "count": items.len(), "items": items })
}

async fn episode_by_id(State(db): State<Db>, Query(params): Params) -> Reply {
    let id = id_param(&params, "id")?;
    let catalog = db.read().await;
    Ok(Json(match catalog.episodes.iter().find(|e| e.id == id) {
        Some(episode) => json!({ "status": "true", "episode": episode }),
        None => json!({ "status": "true", "episode": [], "description": "No episodes match this id." }),
    }))
}

/// Deterministic stand-in for random selection: catalogue order.
async fn random_episodes(State(db): State<Db>, Query(params): Params) -> Reply {
    let filter = FeedFilter::from_params(&params);
    let catalog = db.read().await;
    let episodes: Vec<&Episode> = catalog
        .episodes
        .iter()
        .filter(|e| catalog.podcast(e.feed_id).is_some_and(|f| filter.matches(f)))
        .take(max_param(&params, 1))
        .collect();
    Ok(Json(json!({ "status": "true", "count": episodes.len(), "episodes": episodes })))
}

async fn recent_episodes(State(db): State<Db>, Query(params): Params) -> Reply {
    let exclude = params
        .get("excludeString")
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty());
    let before = params.get("before").and_then(|b| b.parse::<u64>().ok());
    let catalog = db.read().await;
    let mut items: Vec<&Episode> = catalog
        .episodes
        .iter()
        .filter(|e| before.map_or(true, |before| e.id < before))
        .filter(|e| {
            exclude.as_ref().map_or(true, |x| {
                !e.title.to_lowercase().contains(x) && !e.enclosure_url.to_lowercase().contains(x)
            })
        })
        .collect();
    items.sort_by(|a, b| b.date_published.cmp(&a.date_published));
    items.truncate(max_param(&params, 10));
    Ok(Json(json!({ "status": "true", "count": items.len(), "items": items })))
}

// ---------------------------------------------------------------------------
// Feed listings
// ---------------------------------------------------------------------------

async fn recent_feeds(State(db): State<Db>, Query(params): Params) -> Reply {
    let catalog = db.read().await;
    let feeds: Vec<Value> = filtered_feeds(&catalog, &params, |p| p.newest_item_publish_time, 40)
        .into_iter()
        .map(|p| {
            json!({
                "id": p.id,
                "url": p.url,
                "title": p.title,
                "newestItemPublishTime": p.newest_item_publish_time,
                "description": p.description,
                "image": p.image,
                "itunesId": p.itunes_id,
                "language": p.language,
                "categories": p.categories,
            })
        })
        .collect();
    Ok(Json(json!({ "status": "true", "count": feeds.len(), "feeds": feeds })))
}

async fn trending_podcasts(State(db): State<Db>, Query(params): Params) -> Reply {
    let catalog = db.read().await;
    let feeds = filtered_feeds(&catalog, &params, |p| p.trend_score, 10);
    Ok(Json(json!({ "status": "true", "count": feeds.len(), "feeds": feeds })))
}

/// Feeds passing the list filters and `since`, sorted descending by `key`.
fn filtered_feeds<'a>(
    catalog: &'a Catalog,
    params: &HashMap<String, String>,
    key: impl Fn(&Podcast) -> i64,
    default_max: usize,
) -> Vec<&'a Podcast> {
    let filter = FeedFilter::from_params(params);
    let since = since_param(params);
    let mut feeds: Vec<&Podcast> = catalog
        .podcasts
        .iter()
        .filter(|p| filter.matches(p) && p.newest_item_publish_time >= since)
        .collect();
    feeds.sort_by_key(|p| std::cmp::Reverse(key(*p)));
    feeds.truncate(max_param(params, default_max));
    feeds
}

async fn new_feeds(State(db): State<Db>) -> Json<Value> {
    let catalog = db.read().await;
    let mut feeds: Vec<&Podcast> = catalog.podcasts.iter().collect();
    feeds.sort_by_key(|p| std::cmp::Reverse(p.time_added));
    feeds.truncate(1000);
    let feeds: Vec<Value> = feeds
        .into_iter()
        .map(|p| {
            json!({
                "id": p.id,
                "url": p.url,
                "timeAdded": p.time_added,
                "status": "confirmed",
                "contentHash": "",
                "language": p.language,
            })
        })
        .collect();
    Json(json!({ "status": "true", "count": feeds.len(), "feeds": feeds }))
}

async fn list_categories(State(db): State<Db>) -> Json<Value> {
    let catalog = db.read().await;
    Json(json!({ "status": "true", "count": catalog.categories.len(), "feeds": catalog.categories }))
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

async fn add_by_feed_url(State(db): State<Db>, Query(params): Params) -> Reply {
    let url = required(&params, "url")?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Ok(Json(json!({ "status": "false", "description": "Invalid feed url." })));
    }
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();
    let feed_id = db.write().await.add_feed(&url, now);
    Ok(Json(json!({ "status": "true", "feedId": feed_id, "description": "Feed added." })))
}

// ---------------------------------------------------------------------------
// Query parameter helpers
// ---------------------------------------------------------------------------

struct FeedFilter {
    languages: Vec<String>,
    categories: Vec<String>,
    not_categories: Vec<String>,
}

impl FeedFilter {
    fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            languages: list_param(params, "lang"),
            categories: list_param(params, "cat"),
            not_categories: list_param(params, "notcat"),
        }
    }

    /// Languages and categories match case-insensitively; categories match by
    /// name or id. `unknown` selects feeds without a language.
    fn matches(&self, feed: &Podcast) -> bool {
        let in_category = |wanted: &String| {
            feed.categories
                .iter()
                .any(|(id, name)| id == wanted || name.eq_ignore_ascii_case(wanted))
        };
        let language_ok = self.languages.is_empty()
            || self.languages.iter().any(|lang| {
                (lang.eq_ignore_ascii_case("unknown") && feed.language.is_empty())
                    || lang.eq_ignore_ascii_case(&feed.language)
            });
        let category_ok = self.categories.is_empty() || self.categories.iter().any(in_category);
        let not_category_ok = !self.not_categories.iter().any(in_category);
        language_ok && category_ok && not_category_ok
    }
}

fn bad_request(message: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "status": "false", "description": message })),
    )
}

fn required(params: &HashMap<String, String>, key: &str) -> Result<String, (StatusCode, Json<Value>)> {
    params
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| bad_request(format!("missing required parameter {key}")))
}

fn id_param(params: &HashMap<String, String>, key: &str) -> Result<u64, (StatusCode, Json<Value>)> {
    let raw = required(params, key)?;
    raw.parse()
        .map_err(|_| bad_request(format!("parameter {key} must be numeric")))
}

/// `max` when present and positive, otherwise the endpoint default.
fn max_param(params: &HashMap<String, String>, default: usize) -> usize {
    params
        .get("max")
        .and_then(|m| m.parse::<usize>().ok())
        .filter(|m| *m > 0)
        .unwrap_or(default)
}

fn since_param(params: &HashMap<String, String>) -> i64 {
    params
        .get("since")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn list_param(params: &HashMap<String, String>, key: &str) -> Vec<String> {
    params
        .get(key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
