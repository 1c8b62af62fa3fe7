//! WallSpan - multi-display wallpaper spanning.
//!
//! Fetches photos from Unsplash and either stretches one photo across the
//! whole virtual desktop or gives every display its own. A rotation
//! controller drives timed rotations and a browsable preview history.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;
pub mod schema;
pub mod storage;
pub mod unsplash;
pub mod wallpaper;
