pub mod asset;
pub mod auth;
pub mod avatar;
pub mod cutting;
pub mod feed;
pub mod follow;
pub mod plant;
pub mod story;
pub mod update;
pub mod upload;
pub mod usage;
