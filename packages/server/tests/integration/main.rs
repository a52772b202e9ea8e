mod common;

mod auth;
mod follow;
mod quota;
mod story;
