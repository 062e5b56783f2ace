//! Domain DTOs and response envelopes for the Podcast Index API.
//!
//! # Design
//! Records mirror the service's camelCase JSON and default every field, so a
//! payload missing optional data still decodes. The service is loose with its
//! types (string or boolean status, boolean or integer `explicit`, `null` for
//! empty text), and the small deserializers at the bottom of this module
//! absorb that before it reaches callers.
//!
//! Envelopes implement `Envelope` so the client can check the status flag
//! before touching the payload with one generic routine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, IgnoredAny, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// A podcast feed as returned by search, lookup and trending queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Podcast {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    pub original_url: Option<String>,
    pub link: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub author: Option<String>,
    pub owner_name: Option<String>,
    pub image: Option<String>,
    pub artwork: Option<String>,
    pub last_update_time: Option<i64>,
    pub last_crawl_time: Option<i64>,
    pub last_parse_time: Option<i64>,
    pub last_good_http_status_time: Option<i64>,
    pub last_http_status: Option<u16>,
    pub content_type: Option<String>,
    pub itunes_id: Option<u64>,
    pub generator: Option<String>,
    pub language: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub explicit: bool,
    #[serde(rename = "type")]
    pub medium_type: Option<i64>,
    pub dead: Option<i64>,
    pub crawl_errors: Option<i64>,
    pub parse_errors: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub categories: BTreeMap<String, String>,
    pub locked: Option<i64>,
    pub image_url_hash: Option<u64>,
    pub episode_count: Option<u64>,
    pub newest_item_publish_time: Option<i64>,
    pub trend_score: Option<i64>,
}

impl Podcast {
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.last_update_time.and_then(from_epoch)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Episode {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub link: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub guid: Option<String>,
    pub date_published: Option<i64>,
    pub date_published_pretty: Option<String>,
    pub date_crawled: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub enclosure_url: String,
    pub enclosure_type: Option<String>,
    pub enclosure_length: Option<u64>,
    pub duration: Option<u64>,
    #[serde(deserialize_with = "flag")]
    pub explicit: bool,
    pub episode: Option<u32>,
    pub episode_type: Option<String>,
    pub season: Option<u32>,
    pub image: Option<String>,
    pub feed_itunes_id: Option<u64>,
    pub feed_image: Option<String>,
    pub feed_id: Option<u64>,
    pub feed_title: Option<String>,
    pub feed_language: Option<String>,
    pub chapters_url: Option<String>,
    pub transcript_url: Option<String>,
}

impl Episode {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.date_published.and_then(from_epoch)
    }
}

/// A feed from `recent/feeds`, which uses a slimmer shape than `Podcast`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecentPodcast {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub newest_item_publish_time: Option<i64>,
    pub oldest_item_publish_time: Option<i64>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub itunes_id: Option<u64>,
    pub language: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub categories: BTreeMap<String, String>,
}

impl RecentPodcast {
    pub fn newest_item_at(&self) -> Option<DateTime<Utc>> {
        self.newest_item_publish_time.and_then(from_epoch)
    }
}

/// A feed added to the index during the last week (`recent/newfeeds`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewPodcast {
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    pub time_added: Option<i64>,
    pub status: Option<String>,
    pub content_hash: Option<String>,
    pub language: Option<String>,
}

impl NewPodcast {
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        self.time_added.and_then(from_epoch)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

fn from_epoch(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// A decoded response body: a status flag plus an optional payload.
pub trait Envelope: DeserializeOwned {
    type Payload;

    fn status(&self) -> bool;

    /// `None` when the service sent no usable payload.
    fn into_payload(self) -> Option<Self::Payload>;
}

/// Status flag that accepts both `"true"`/`"false"` and native booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub bool);

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(Status(b)),
            Raw::Text(s) => match s.as_str() {
                "true" => Ok(Status(true)),
                "false" => Ok(Status(false)),
                other => Err(de::Error::invalid_value(
                    Unexpected::Str(other),
                    &r#""true" or "false""#,
                )),
            },
        }
    }
}

macro_rules! list_envelope {
    ($(#[$meta:meta])* $name:ident, $field:ident, $record:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Deserialize)]
        pub struct $name {
            pub status: Status,
            #[serde(default, deserialize_with = "null_as_default")]
            pub $field: Vec<$record>,
        }

        impl Envelope for $name {
            type Payload = Vec<$record>;

            fn status(&self) -> bool {
                self.status.0
            }

            fn into_payload(self) -> Option<Self::Payload> {
                Some(self.$field)
            }
        }
    };
}

macro_rules! record_envelope {
    ($(#[$meta:meta])* $name:ident, $field:ident, $record:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Deserialize)]
        pub struct $name {
            pub status: Status,
            #[serde(default, deserialize_with = "record_or_empty")]
            pub $field: Option<$record>,
        }

        impl Envelope for $name {
            type Payload = $record;

            fn status(&self) -> bool {
                self.status.0
            }

            fn into_payload(self) -> Option<Self::Payload> {
                self.$field
            }
        }
    };
}

list_envelope!(
    /// `search/byterm` and `podcasts/trending`.
    PodcastsEnvelope, feeds, Podcast
);
list_envelope!(
    /// Every query answering with an `items` array of episodes.
    EpisodesEnvelope, items, Episode
);
list_envelope!(RecentPodcastsEnvelope, feeds, RecentPodcast);
list_envelope!(NewPodcastsEnvelope, feeds, NewPodcast);
list_envelope!(
    /// `categories/list` reuses the `feeds` key for its categories.
    CategoriesEnvelope, feeds, Category
);
list_envelope!(
    /// `episodes/random` answers with `episodes` rather than `items`.
    RandomEpisodesEnvelope, episodes, Episode
);
record_envelope!(
    /// `podcasts/byfeedurl`, `podcasts/byfeedid` and `podcasts/byitunesid`.
    PodcastEnvelope, feed, Podcast
);
record_envelope!(EpisodeEnvelope, episode, Episode);

/// `add/byfeedurl` carries no payload beyond the new feed id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFeedEnvelope {
    pub status: Status,
    #[serde(default)]
    pub feed_id: Option<u64>,
}

impl Envelope for AddFeedEnvelope {
    type Payload = ();

    fn status(&self) -> bool {
        self.status.0
    }

    fn into_payload(self) -> Option<()> {
        Some(())
    }
}

// ---------------------------------------------------------------------------
// Lenient field deserializers
// ---------------------------------------------------------------------------

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `explicit` is a boolean on feeds and `0`/`1` on episodes.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Bool(b)) => Ok(b),
        Some(Raw::Int(n)) => Ok(n != 0),
        None => Ok(false),
    }
}

/// Unknown ids come back as `"feed": []` with a true status.
fn record_or_empty<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    // Arrays must be tried first: defaulted structs also accept `[]` as a
    // sequence and would decode it as an all-default record.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Empty(Vec<IgnoredAny>),
        Record(T),
    }

    match Option::<Raw<T>>::deserialize(deserializer)? {
        Some(Raw::Record(record)) => Ok(Some(record)),
        Some(Raw::Empty(items)) if items.is_empty() => Ok(None),
        Some(Raw::Empty(items)) => Err(de::Error::invalid_length(
            items.len(),
            &"a single record or an empty array",
        )),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_strings_and_booleans() {
        let s: Status = serde_json::from_str(r#""true""#).unwrap();
        assert!(s.0);
        let s: Status = serde_json::from_str(r#""false""#).unwrap();
        assert!(!s.0);
        let s: Status = serde_json::from_str("true").unwrap();
        assert!(s.0);
        let s: Status = serde_json::from_str("false").unwrap();
        assert!(!s.0);
    }

    #[test]
    fn status_rejects_other_values() {
        assert!(serde_json::from_str::<Status>(r#""yes""#).is_err());
        assert!(serde_json::from_str::<Status>("1").is_err());
    }

    #[test]
    fn envelope_without_status_is_rejected() {
        let result: Result<PodcastsEnvelope, _> = serde_json::from_str(r#"{"feeds":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn podcast_decodes_service_shape() {
        let json = r#"{
            "id": 920666,
            "title": "Podcasting 2.0",
            "url": "https://mp3s.nashownotes.com/pc20rss.xml",
            "originalUrl": "http://mp3s.nashownotes.com/pc20rss.xml",
            "description": "The Podcast Index presents Podcasting 2.0",
            "author": "Podcast Index LLC",
            "ownerName": "Podcast Index LLC",
            "lastUpdateTime": 1700000000,
            "itunesId": 1584274529,
            "generator": null,
            "language": "en",
            "explicit": false,
            "type": 0,
            "dead": 0,
            "categories": {"9": "Business", "44": "Technology"},
            "episodeCount": 150
        }"#;
        let podcast: Podcast = serde_json::from_str(json).unwrap();
        assert_eq!(podcast.id, 920666);
        assert_eq!(podcast.title, "Podcasting 2.0");
        assert_eq!(podcast.itunes_id, Some(1584274529));
        assert!(podcast.generator.is_none());
        assert_eq!(podcast.categories.get("44").map(String::as_str), Some("Technology"));
        assert_eq!(podcast.last_updated_at().unwrap().timestamp(), 1700000000);
    }

    #[test]
    fn null_text_and_categories_decode_as_empty() {
        let podcast: Podcast =
            serde_json::from_str(r#"{"id":1,"title":null,"categories":null}"#).unwrap();
        assert_eq!(podcast.title, "");
        assert!(podcast.categories.is_empty());
    }

    #[test]
    fn explicit_accepts_integer_flag() {
        let episode: Episode = serde_json::from_str(r#"{"id":7,"explicit":1}"#).unwrap();
        assert!(episode.explicit);
        let episode: Episode = serde_json::from_str(r#"{"id":7,"explicit":0}"#).unwrap();
        assert!(!episode.explicit);
        let episode: Episode = serde_json::from_str(r#"{"id":7,"explicit":null}"#).unwrap();
        assert!(!episode.explicit);
    }

    #[test]
    fn empty_array_stands_in_for_missing_record() {
        let env: PodcastEnvelope =
            serde_json::from_str(r#"{"status":"true","feed":[]}"#).unwrap();
        assert!(env.status());
        assert!(env.into_payload().is_none());

        let env: EpisodeEnvelope = serde_json::from_str(r#"{"status":"true"}"#).unwrap();
        assert!(env.into_payload().is_none());
    }

    #[test]
    fn non_empty_array_in_place_of_record_is_rejected() {
        let result: Result<PodcastEnvelope, _> =
            serde_json::from_str(r#"{"status":"true","feed":[{"id":1}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_list_decodes_as_empty() {
        let env: EpisodesEnvelope = serde_json::from_str(r#"{"status":"true"}"#).unwrap();
        assert_eq!(env.into_payload(), Some(Vec::new()));
    }

    #[test]
    fn episode_published_at_uses_epoch_seconds() {
        let episode: Episode =
            serde_json::from_str(r#"{"id":1,"datePublished":1700000000}"#).unwrap();
        assert_eq!(
            episode.published_at().unwrap().to_rfc3339(),
            "2023-11-14T22:13:20+00:00"
        );
    }
}
