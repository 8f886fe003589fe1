//! Query pipeline - from a raw utterance to an ordered list of reply messages
//!
//! This crate turns one free-text request plus its delivery channel into a
//! channel-appropriate reply:
//! - Cleans the utterance and short-circuits greetings and canned answers
//! - Extracts a leading quantity into a result limit
//! - Classifies the rest through an ordered, first-match-commits rule cascade
//! - Runs the matched intent against provider adapters and composes the reply
//!
//! # Architecture
//!
//! 1. **Normalization** (`normalize`) - punctuation, agent addressing, politeness
//! 2. **Canned answers** (`canned`) - literal replies, games, help
//! 3. **Quantity** (`quantity`) - "5 cats", "a few dogs", "all the owls"
//! 4. **Cascade** (`cascade`) - pattern rules mapping text to an `Intent`
//! 5. **Dispatch** (`dispatch`) - one handler per intent, provider failures become apologies
//! 6. **Composition** (`compose`, `publish`) - inline markup on web, published links elsewhere
//!
//! # Key Types
//!
//! - `Agent` - the pipeline entry point (see `runtime`)
//! - `Providers` - the bundle of adapter trait objects the pipeline calls
//! - `Chooser` (from `wren-core`) - every random draw goes through it

pub mod adapters;
pub mod canned;
pub mod cascade;
pub mod compose;
pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod persona;
pub mod phrases;
pub mod publish;
pub mod quantity;
pub mod runtime;
pub mod suggestions;

#[cfg(test)]
mod testing;

pub use adapters::{
    AnswerEngine, ArtifactSource, CauseFinder, Dictionary, EcoSafety, FragmentRenderer, Geocoder, ImageSearch,
    Providers, PublishDestination, ShortenerProvider, SmsSender, TweetSearch, VideoSearch,
};
pub use error::{AgentError, DispatchError};
pub use persona::Persona;
pub use publish::{ArtifactPublisher, LinkShortener};
pub use runtime::{Agent, Query};
pub use suggestions::Suggestions;
