pub mod media_service;
pub mod metadata_service;
