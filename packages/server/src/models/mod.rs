pub mod auth;
pub mod feed;
pub mod follow;
pub mod plant;
pub mod shared;
pub mod story;
pub mod usage;
