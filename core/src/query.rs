//! Query-string construction for the Podcast Index API.
//!
//! # Design
//! Every clause builder returns either a complete `&key[=value]` fragment or
//! an empty string, so callers can concatenate them unconditionally and a
//! clause is never emitted half-formed. Values are percent-encoded; keys and
//! separators are not.

use std::fmt;

use chrono::{DateTime, Utc};

/// The operations the service supports. Each kind owns its endpoint path and
/// the message reported when the service answers with a false status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    SearchPodcasts,
    SearchEpisodesByPerson,
    PodcastByFeedUrl,
    PodcastByFeedId,
    PodcastByItunesId,
    EpisodesByFeedId,
    EpisodesByFeedUrl,
    EpisodesByItunesId,
    EpisodeById,
    RandomEpisodes,
    RecentEpisodes,
    RecentPodcasts,
    NewPodcasts,
    Categories,
    TrendingPodcasts,
    AddByFeedUrl,
}

impl QueryKind {
    /// Endpoint path relative to the API base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            QueryKind::SearchPodcasts => "search/byterm",
            QueryKind::SearchEpisodesByPerson => "search/byperson",
            QueryKind::PodcastByFeedUrl => "podcasts/byfeedurl",
            QueryKind::PodcastByFeedId => "podcasts/byfeedid",
            QueryKind::PodcastByItunesId => "podcasts/byitunesid",
            QueryKind::EpisodesByFeedId => "episodes/byfeedid",
            QueryKind::EpisodesByFeedUrl => "episodes/byfeedurl",
            QueryKind::EpisodesByItunesId => "episodes/byitunesid",
            QueryKind::EpisodeById => "episodes/byid",
            QueryKind::RandomEpisodes => "episodes/random",
            QueryKind::RecentEpisodes => "recent/episodes",
            QueryKind::RecentPodcasts => "recent/feeds",
            QueryKind::NewPodcasts => "recent/newfeeds",
            QueryKind::Categories => "categories/list",
            QueryKind::TrendingPodcasts => "podcasts/trending",
            QueryKind::AddByFeedUrl => "add/byfeedurl",
        }
    }

    pub fn not_found_message(self) -> &'static str {
        match self {
            QueryKind::SearchPodcasts => "could not find a podcast for that term",
            QueryKind::SearchEpisodesByPerson => "could not find an episode for that person",
            QueryKind::PodcastByFeedUrl => "could not find a podcast for that feed URL",
            QueryKind::PodcastByFeedId => "could not find a podcast for that id",
            QueryKind::PodcastByItunesId => "could not find a podcast for that iTunes id",
            QueryKind::EpisodesByFeedId => "could not get episodes by feed id",
            QueryKind::EpisodesByFeedUrl => "could not get episodes by feed URL",
            QueryKind::EpisodesByItunesId => "could not get episodes by iTunes id",
            QueryKind::EpisodeById => "could not find episode",
            QueryKind::RandomEpisodes => "could not get random episodes",
            QueryKind::RecentEpisodes => "could not get recent episodes",
            QueryKind::RecentPodcasts => "could not find the recently updated podcasts",
            QueryKind::NewPodcasts => "could not find the newest podcasts",
            QueryKind::Categories => "could not list categories",
            QueryKind::TrendingPodcasts => "could not find the trending podcasts",
            QueryKind::AddByFeedUrl => "could not add podcast by feed URL",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// List filters shared by the random, recent and trending queries.
///
/// Empty lists leave the corresponding clause out. `"unknown"` is accepted as
/// a language tag for feeds that do not declare one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub languages: Vec<String>,
    pub categories: Vec<String>,
    pub not_categories: Vec<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn not_category(mut self, category: impl Into<String>) -> Self {
        self.not_categories.push(category.into());
        self
    }

    /// `lang`, `cat` and `notcat` clauses, in that order.
    pub fn clauses(&self) -> String {
        format!(
            "{}{}{}",
            filter_clause(FilterKind::Language, &self.languages),
            filter_clause(FilterKind::Category, &self.categories),
            filter_clause(FilterKind::NotCategory, &self.not_categories),
        )
    }
}

/// Which list filter a clause renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Language,
    Category,
    NotCategory,
}

impl FilterKind {
    pub fn key(self) -> &'static str {
        match self {
            FilterKind::Language => "lang",
            FilterKind::Category => "cat",
            FilterKind::NotCategory => "notcat",
        }
    }
}

/// `&max=N`, or nothing when `max` is 0 so the service default applies.
pub fn max_clause(max: u32) -> String {
    if max == 0 {
        return String::new();
    }
    format!("&max={max}")
}

/// `&since=<epoch seconds>`. `None` and the Unix epoch itself mean unfiltered.
pub fn since_clause(since: Option<DateTime<Utc>>) -> String {
    match since.map(|t| t.timestamp()) {
        Some(secs) if secs != 0 => format!("&since={secs}"),
        _ => String::new(),
    }
}

pub fn clean_clause(clean: bool) -> String {
    if clean {
        "&clean".to_string()
    } else {
        String::new()
    }
}

/// `&key=v1,v2,...` with each value percent-encoded before joining.
pub fn filter_clause<S: AsRef<str>>(kind: FilterKind, values: &[S]) -> String {
    if values.is_empty() {
        return String::new();
    }
    let joined = values
        .iter()
        .map(|v| encode(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    format!("&{}={joined}", kind.key())
}

/// `&excludeString=...`, omitted for an empty string.
pub fn exclude_clause(exclude: &str) -> String {
    if exclude.is_empty() {
        return String::new();
    }
    format!("&excludeString={}", encode(exclude))
}

/// `&before=ID`, omitted when the cursor is 0.
pub fn before_clause(before: u64) -> String {
    if before == 0 {
        return String::new();
    }
    format!("&before={before}")
}

/// Wrap a free-text term in literal double quotes and encode the result.
pub fn quoted(term: &str) -> String {
    encode(&format!("\"{term}\""))
}

pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn max_zero_is_omitted() {
        assert_eq!(max_clause(0), "");
        assert_eq!(max_clause(25), "&max=25");
    }

    #[test]
    fn since_unset_or_epoch_is_omitted() {
        assert_eq!(since_clause(None), "");
        assert_eq!(since_clause(Some(DateTime::<Utc>::UNIX_EPOCH)), "");
        let t = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        assert_eq!(since_clause(Some(t)), "&since=1700000000");
    }

    #[test]
    fn clean_flag_is_bare() {
        assert_eq!(clean_clause(true), "&clean");
        assert_eq!(clean_clause(false), "");
    }

    #[test]
    fn filter_joins_values_with_commas() {
        let empty: [&str; 0] = [];
        assert_eq!(filter_clause(FilterKind::Language, &empty), "");
        assert_eq!(filter_clause(FilterKind::Language, &["en"]), "&lang=en");
        assert_eq!(
            filter_clause(FilterKind::Category, &["News", "Comedy", "True Crime"]),
            "&cat=News,Comedy,True%20Crime"
        );
        assert_eq!(filter_clause(FilterKind::NotCategory, &["9"]), "&notcat=9");
    }

    #[test]
    fn filters_render_in_fixed_order() {
        let filters = Filters::new()
            .not_category("Sports")
            .category("News")
            .language("en")
            .language("unknown");
        assert_eq!(filters.clauses(), "&lang=en,unknown&cat=News&notcat=Sports");
        assert_eq!(Filters::new().clauses(), "");
    }

    #[test]
    fn exclude_and_before_are_optional() {
        assert_eq!(exclude_clause(""), "");
        assert_eq!(exclude_clause("ad break"), "&excludeString=ad%20break");
        assert_eq!(before_clause(0), "");
        assert_eq!(before_clause(12345), "&before=12345");
    }

    #[test]
    fn quoted_term_keeps_quotes_inside_the_value() {
        assert_eq!(quoted("python"), "%22python%22");
        assert_eq!(quoted("no agenda"), "%22no%20agenda%22");
    }

    #[test]
    fn not_found_messages_are_distinct() {
        use std::collections::HashSet;
        let kinds = [
            QueryKind::SearchPodcasts,
            QueryKind::SearchEpisodesByPerson,
            QueryKind::PodcastByFeedUrl,
            QueryKind::PodcastByFeedId,
            QueryKind::PodcastByItunesId,
            QueryKind::EpisodesByFeedId,
            QueryKind::EpisodesByFeedUrl,
            QueryKind::EpisodesByItunesId,
            QueryKind::EpisodeById,
            QueryKind::RandomEpisodes,
            QueryKind::RecentEpisodes,
            QueryKind::RecentPodcasts,
            QueryKind::NewPodcasts,
            QueryKind::Categories,
            QueryKind::TrendingPodcasts,
            QueryKind::AddByFeedUrl,
        ];
        let messages: HashSet<_> = kinds.iter().map(|k| k.not_found_message()).collect();
        assert_eq!(messages.len(), kinds.len());
    }
}
