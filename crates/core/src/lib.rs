pub mod config;
pub mod domain;
pub mod errors;
pub mod random;

pub use domain::channel::Channel;
pub use domain::intent::{Coordinates, Intent};
pub use domain::limit::Limit;
pub use domain::message::{escape_markup, unescape_markup, Message, Reply};
pub use domain::resource::{ResourceRegistry, ResourceType};
pub use domain::results::{
    AnswerResponse, CauseItem, Definition, Facility, GeocodeOutcome, ImageItem, ListView,
    Location, ResultItems, SafetyArea, SafetyReport, TweetItem, VideoItem,
};
pub use errors::{
    ApplicationError, DomainError, InterfaceError, ProviderError, PublishError, RenderError,
};
pub use random::{Chooser, FirstChoice, RandomSource, ScriptedChoice};
