pub mod chain;
pub mod constants;
pub mod error;
pub mod events;
pub mod food;
pub mod input;
pub mod math;
pub mod merge;
pub mod motion;
pub mod path;
pub mod room;
pub mod spacing;
pub mod types;
