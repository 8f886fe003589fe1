pub mod channel;
pub mod intent;
pub mod limit;
pub mod message;
pub mod resource;
pub mod results;
