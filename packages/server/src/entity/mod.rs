pub mod asset;
pub mod follower;
pub mod plant;
pub mod plant_cutting;
pub mod plant_update;
pub mod story;
pub mod user;
