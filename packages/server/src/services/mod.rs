pub mod assets;
pub mod follow;
pub mod ingest;
pub mod quota;
pub mod visibility;
