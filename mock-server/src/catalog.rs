//! In-memory catalogue served by the mock Podcast Index.
//!
//! Types here are defined independently of `podcastindex-core` and serialize
//! to the service's camelCase wire shape, so integration tests catch schema
//! drift between the two crates.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Podcast {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub link: String,
    pub description: String,
    pub author: String,
    pub owner_name: String,
    pub image: String,
    pub language: String,
    pub itunes_id: Option<u64>,
    pub explicit: bool,
    pub categories: BTreeMap<String, String>,
    pub episode_count: u64,
    pub newest_item_publish_time: i64,
    pub trend_score: i64,
    #[serde(skip)]
    pub time_added: i64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: u64,
    pub title: String,
    pub link: String,
    pub description: String,
    pub guid: String,
    pub date_published: i64,
    pub enclosure_url: String,
    pub enclosure_type: String,
    pub duration: u64,
    /// The service sends `0`/`1` here, unlike the boolean on feeds.
    pub explicit: u8,
    pub feed_id: u64,
    pub feed_itunes_id: Option<u64>,
    pub feed_language: String,
    #[serde(skip)]
    pub persons: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub podcasts: Vec<Podcast>,
    pub episodes: Vec<Episode>,
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn podcast(&self, id: u64) -> Option<&Podcast> {
        self.podcasts.iter().find(|p| p.id == id)
    }

    pub fn podcast_by_url(&self, url: &str) -> Option<&Podcast> {
        self.podcasts.iter().find(|p| p.url == url)
    }

    pub fn podcast_by_itunes_id(&self, itunes_id: u64) -> Option<&Podcast> {
        self.podcasts.iter().find(|p| p.itunes_id == Some(itunes_id))
    }

    pub fn episodes_of(&self, feed_id: u64) -> impl Iterator<Item = &Episode> {
        self.episodes.iter().filter(move |e| e.feed_id == feed_id)
    }

    /// Register a feed URL, returning the id of the new or existing feed.
    pub fn add_feed(&mut self, url: &str, now: i64) -> u64 {
        if let Some(existing) = self.podcast_by_url(url) {
            return existing.id;
        }
        let id = self.podcasts.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        self.podcasts.push(Podcast {
            id,
            title: String::new(),
            url: url.to_string(),
            link: String::new(),
            description: String::new(),
            author: String::new(),
            owner_name: String::new(),
            image: String::new(),
            language: String::new(),
            itunes_id: None,
            explicit: false,
            categories: BTreeMap::new(),
            episode_count: 0,
            newest_item_publish_time: 0,
            trend_score: 0,
            time_added: now,
        });
        id
    }

    /// A small, fixed catalogue covering every filter the endpoints support.
    pub fn seeded() -> Self {
        let categories = vec![
            category(16, "Comedy"),
            category(55, "News"),
            category(59, "Politics"),
            category(102, "Technology"),
            category(104, "Education"),
        ];

        let podcasts = vec![
            podcast(PodcastSeed {
                id: 920666,
                title: "Podcasting 2.0",
                url: "https://mp3s.nashownotes.com/pc20rss.xml",
                author: "Podcast Index LLC",
                language: "en",
                itunes_id: Some(1584274529),
                explicit: false,
                categories: &[(102, "Technology"), (55, "News")],
                newest: 1_700_000_000,
                trend_score: 9,
                time_added: 1_699_900_000,
            }),
            podcast(PodcastSeed {
                id: 41504,
                title: "No Agenda",
                url: "http://feed.nashownotes.com/rss.xml",
                author: "Adam Curry & John C. Dvorak",
                language: "en",
                itunes_id: Some(269169796),
                explicit: true,
                categories: &[(55, "News"), (59, "Politics")],
                newest: 1_699_990_000,
                trend_score: 7,
                time_added: 1_600_000_000,
            }),
            podcast(PodcastSeed {
                id: 75075,
                title: "Talk Python To Me",
                url: "https://talkpython.fm/episodes/rss",
                author: "Michael Kennedy",
                language: "en-us",
                itunes_id: Some(979020229),
                explicit: false,
                categories: &[(102, "Technology"), (104, "Education")],
                newest: 1_699_000_000,
                trend_score: 8,
                time_added: 1_500_000_000,
            }),
            podcast(PodcastSeed {
                id: 5500,
                title: "Python Bytes",
                url: "https://pythonbytes.fm/episodes/rss",
                author: "Michael Kennedy and Brian Okken",
                language: "en",
                itunes_id: Some(1173690032),
                explicit: true,
                categories: &[(102, "Technology")],
                newest: 1_698_000_000,
                trend_score: 5,
                time_added: 1_550_000_000,
            }),
            podcast(PodcastSeed {
                id: 300,
                title: "La Tertulia",
                url: "https://example.es/tertulia.xml",
                author: "Radio Ejemplo",
                language: "es",
                itunes_id: None,
                explicit: false,
                categories: &[(16, "Comedy")],
                newest: 1_690_000_000,
                trend_score: 3,
                time_added: 1_699_950_000,
            }),
        ];

        let mut catalog = Catalog {
            podcasts,
            episodes: Vec::new(),
            categories,
        };
        let seeds = [
            (1001, 920666, "Episode 150: Value4Value", 1_700_000_000, 0, &["Adam Curry", "Dave Jones"][..]),
            (1000, 920666, "Episode 149: Boostagrams", 1_699_000_000, 0, &["Adam Curry", "Dave Jones"][..]),
            (2001, 41504, "1600: Trailer Park", 1_699_990_000, 1, &["Adam Curry", "John C. Dvorak"][..]),
            (3001, 75075, "#440: Talking Python", 1_698_500_000, 0, &["Michael Kennedy"][..]),
            (3000, 75075, "Season trailer", 1_697_000_000, 0, &["Michael Kennedy"][..]),
            (4001, 5500, "#360 Bytes of news", 1_698_000_000, 1, &["Michael Kennedy", "Brian Okken"][..]),
            (5001, 300, "Capítulo 12", 1_690_000_000, 0, &["Ana Ruiz"][..]),
        ];
        for (id, feed_id, title, published, explicit, persons) in seeds {
            let episode = catalog.episode(id, feed_id, title, published, explicit, persons);
            catalog.episodes.push(episode);
        }
        for podcast in &mut catalog.podcasts {
            podcast.episode_count = catalog
                .episodes
                .iter()
                .filter(|e| e.feed_id == podcast.id)
                .count() as u64;
        }
        catalog
    }

    fn episode(
        &self,
        id: u64,
        feed_id: u64,
        title: &str,
        published: i64,
        explicit: u8,
        persons: &[&str],
    ) -> Episode {
        let feed = self.podcast(feed_id);
        Episode {
            id,
            title: title.to_string(),
            link: format!("https://example.com/episodes/{id}"),
            description: format!("{title}, with {}", persons.join(" and ")),
            guid: format!("urn:episode:{id}"),
            date_published: published,
            enclosure_url: format!("https://example.com/media/{id}.mp3"),
            enclosure_type: "audio/mpeg".to_string(),
            duration: 3600,
            explicit,
            feed_id,
            feed_itunes_id: feed.and_then(|f| f.itunes_id),
            feed_language: feed.map(|f| f.language.clone()).unwrap_or_default(),
            persons: persons.iter().map(|p| p.to_string()).collect(),
        }
    }
}

struct PodcastSeed {
    id: u64,
    title: &'static str,
    url: &'static str,
    author: &'static str,
    language: &'static str,
    itunes_id: Option<u64>,
    explicit: bool,
    categories: &'static [(u32, &'static str)],
    newest: i64,
    trend_score: i64,
    time_added: i64,
}

fn podcast(seed: PodcastSeed) -> Podcast {
    Podcast {
        id: seed.id,
        title: seed.title.to_string(),
        url: seed.url.to_string(),
        link: format!("https://example.com/podcasts/{}", seed.id),
        description: format!("About {}", seed.title),
        author: seed.author.to_string(),
        owner_name: seed.author.to_string(),
        image: format!("https://example.com/art/{}.png", seed.id),
        language: seed.language.to_string(),
        itunes_id: seed.itunes_id,
        explicit: seed.explicit,
        categories: seed
            .categories
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect(),
        episode_count: 0,
        newest_item_publish_time: seed.newest,
        trend_score: seed.trend_score,
        time_added: seed.time_added,
    }
}

fn category(id: u32, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
    }
}
