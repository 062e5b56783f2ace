//! End-to-end queries against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every
//! `PodcastIndex` operation over real HTTP through `UreqTransport`. Validates
//! that query strings built by the core are read correctly by a server and
//! that the server's envelopes decode into the core's records.

use chrono::{TimeZone, Utc};
use podcastindex::{ApiError, ClientConfig, Filters, PodcastIndex, QueryKind, UreqTransport};

/// Serve the seeded mock catalogue on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn api() -> PodcastIndex<UreqTransport> {
    let config = ClientConfig::new(&start_server()).with_user_agent("podcastindex-tests/1.0");
    PodcastIndex::from_config(&config)
}

fn ids<T>(records: &[T], id: impl Fn(&T) -> u64) -> Vec<u64> {
    records.iter().map(id).collect()
}

#[test]
fn search_podcasts_end_to_end() {
    let api = api();

    let all = api.search_podcasts("python").unwrap();
    assert_eq!(ids(&all, |p| p.id), vec![75075, 5500]);
    assert_eq!(all[0].title, "Talk Python To Me");
    assert_eq!(all[0].categories.get("102").map(String::as_str), Some("Technology"));

    let clean = api.search_podcasts_with("python", true, 10).unwrap();
    assert_eq!(ids(&clean, |p| p.id), vec![75075]);

    let capped = api.search_podcasts_with("python", false, 1).unwrap();
    assert_eq!(capped.len(), 1);

    assert!(api.search_podcasts("no such show").unwrap().is_empty());
}

#[test]
fn search_episodes_by_person_end_to_end() {
    let episodes = api().search_episodes_by_person("John C. Dvorak").unwrap();
    assert_eq!(ids(&episodes, |e| e.id), vec![2001]);
    assert!(episodes[0].explicit);
}

#[test]
fn podcast_lookups_end_to_end() {
    let api = api();

    let by_id = api.podcast_by_feed_id("41504").unwrap();
    assert_eq!(by_id.title, "No Agenda");
    assert!(by_id.explicit);

    let by_url = api
        .podcast_by_feed_url("https://mp3s.nashownotes.com/pc20rss.xml")
        .unwrap();
    assert_eq!(by_url.id, 920666);

    let by_itunes = api.podcast_by_itunes_id("979020229").unwrap();
    assert_eq!(by_itunes.id, 75075);
    assert_eq!(by_itunes.episode_count, Some(2));
}

#[test]
fn podcast_lookups_report_not_found() {
    let api = api();

    let err = api.podcast_by_feed_id("1").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(QueryKind::PodcastByFeedId)));

    let err = api.podcast_by_feed_url("https://nowhere.example/rss").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(QueryKind::PodcastByFeedUrl)));
    assert_eq!(err.to_string(), "could not find a podcast for that feed URL");

    let err = api.podcast_by_itunes_id("42").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn malformed_identifier_is_an_http_error() {
    let err = api().podcast_by_feed_id("not-a-number").unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
}

#[test]
fn episodes_by_feed_end_to_end() {
    let api = api();
    let since = Utc.with_ymd_and_hms(2023, 11, 8, 0, 0, 0).unwrap();

    let all = api.episodes_by_feed_id("920666", 0, None).unwrap();
    assert_eq!(ids(&all, |e| e.id), vec![1001, 1000]);
    assert_eq!(all[0].published_at().unwrap().timestamp(), 1_700_000_000);

    let recent = api.episodes_by_feed_id("920666", 0, Some(since)).unwrap();
    assert_eq!(ids(&recent, |e| e.id), vec![1001]);

    let by_url = api
        .episodes_by_feed_url("https://talkpython.fm/episodes/rss", 1, None)
        .unwrap();
    assert_eq!(ids(&by_url, |e| e.id), vec![3001]);

    let by_itunes = api.episodes_by_itunes_id("1173690032", 5, None).unwrap();
    assert_eq!(ids(&by_itunes, |e| e.id), vec![4001]);
    assert_eq!(by_itunes[0].feed_id, Some(5500));

    let err = api.episodes_by_feed_id("12345", 0, None).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(QueryKind::EpisodesByFeedId)));
}

#[test]
fn episode_by_id_end_to_end() {
    let api = api();

    let episode = api.episode_by_id("5001").unwrap();
    assert_eq!(episode.title, "Capítulo 12");
    assert_eq!(episode.feed_language.as_deref(), Some("es"));

    let err = api.episode_by_id("999999").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(QueryKind::EpisodeById)));
}

#[test]
fn random_episodes_end_to_end() {
    let api = api();

    let one = api.random_episodes(&Filters::new(), 0).unwrap();
    assert_eq!(one.len(), 1);

    let filters = Filters::new().category("Technology").not_category("Education");
    let tech = api.random_episodes(&filters, 10).unwrap();
    assert_eq!(ids(&tech, |e| e.id), vec![1001, 1000, 4001]);

    let spanish = api
        .random_episodes(&Filters::new().language("es"), 10)
        .unwrap();
    assert_eq!(ids(&spanish, |e| e.id), vec![5001]);
}

#[test]
fn recent_episodes_end_to_end() {
    let api = api();

    let latest = api.recent_episodes(0, 2, "").unwrap();
    assert_eq!(ids(&latest, |e| e.id), vec![1001, 2001]);

    let older = api.recent_episodes(3001, 0, "trailer").unwrap();
    assert_eq!(ids(&older, |e| e.id), vec![1001, 1000, 5001]);
}

#[test]
fn recent_and_trending_podcasts_end_to_end() {
    let api = api();
    let since = Utc.with_ymd_and_hms(2023, 11, 8, 0, 0, 0).unwrap();

    let recent = api
        .recent_podcasts(&Filters::new().language("en"), 0, Some(since))
        .unwrap();
    assert_eq!(ids(&recent, |p| p.id), vec![920666, 41504]);
    assert_eq!(recent[0].newest_item_at().unwrap().timestamp(), 1_700_000_000);

    let trending = api.trending_podcasts(&Filters::new(), 3, None).unwrap();
    assert_eq!(ids(&trending, |p| p.id), vec![920666, 75075, 41504]);
    assert_eq!(trending[0].trend_score, Some(9));

    let no_news = api
        .trending_podcasts(&Filters::new().not_category("News"), 0, None)
        .unwrap();
    assert_eq!(ids(&no_news, |p| p.id), vec![75075, 5500, 300]);
}

#[test]
fn new_podcasts_and_categories_end_to_end() {
    let api = api();

    let newest = api.new_podcasts().unwrap();
    assert_eq!(newest.len(), 5);
    assert_eq!(newest[0].id, 300);
    assert!(newest[0].added_at().is_some());

    let categories = api.categories().unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Comedy", "News", "Politics", "Technology", "Education"]);
}

#[test]
fn add_by_feed_url_lifecycle() {
    let api = api();
    let feed_url = "http://example.com/feed.xml";

    // Step 1: the feed is unknown.
    let err = api.podcast_by_feed_url(feed_url).unwrap_err();
    assert!(err.is_not_found());

    // Step 2: a rejected submission changes nothing.
    let err = api.add_by_feed_url("ftp://example.com/feed.xml").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(QueryKind::AddByFeedUrl)));
    assert_eq!(api.new_podcasts().unwrap().len(), 5);

    // Step 3: add it.
    api.add_by_feed_url(feed_url).unwrap();

    // Step 4: it can be looked up and is listed as new.
    let podcast = api.podcast_by_feed_url(feed_url).unwrap();
    assert_eq!(podcast.id, 920667);
    assert_eq!(api.new_podcasts().unwrap()[0].url, feed_url);

    // Step 5: adding again is accepted and does not duplicate.
    api.add_by_feed_url(feed_url).unwrap();
    assert_eq!(api.new_podcasts().unwrap().len(), 6);
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = PodcastIndex::from_config(&ClientConfig::new(&format!("http://{addr}")));
    let err = api.categories().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn sub_second_timeout_still_reaches_the_server() {
    let config = ClientConfig::new(&start_server())
        .with_timeout(std::time::Duration::from_millis(500))
        .unwrap();
    let categories = PodcastIndex::from_config(&config).categories().unwrap();
    assert_eq!(categories.len(), 5);
}
