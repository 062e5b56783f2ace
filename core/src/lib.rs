//! Synchronous client for the Podcast Index directory API.
//!
//! # Overview
//! Turns typed queries (search, lookups by feed or iTunes id, recent,
//! trending and random listings, categories, feed submission) into query
//! URLs and decodes the JSON replies into `Podcast`, `Episode` and
//! `Category` records.
//!
//! # Design
//! - `PodcastIndexClient` is stateless and never does I/O: `build_*` returns
//!   an `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - `PodcastIndex` joins a client to a `Transport` and performs exactly one
//!   request per call. Authentication belongs to the transport.
//! - A false `status` in a reply becomes `ApiError::NotFound`, naming the
//!   query, even when the payload field is populated.
//!
//! ```no_run
//! use podcastindex::{ClientConfig, PodcastIndex};
//!
//! let api = PodcastIndex::from_config(&ClientConfig::from_env()?);
//! for podcast in api.search_podcasts_with("rust", true, 10)? {
//!     println!("{} - {}", podcast.id, podcast.title);
//! }
//! # Ok::<(), podcastindex::ApiError>(())
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod transport;
pub mod types;

pub use api::PodcastIndex;
pub use client::PodcastIndexClient;
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use http::{HttpRequest, HttpResponse, Transport};
pub use query::{Filters, QueryKind};
pub use transport::UreqTransport;
pub use types::{Category, Episode, NewPodcast, Podcast, RecentPodcast};
