// Transcode pipeline, independent of the command line

pub mod core;
pub mod encoder;
pub mod hardware;
pub mod probe;
pub mod validate;

pub use self::core::*;
