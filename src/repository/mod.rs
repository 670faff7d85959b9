pub mod bouquet_index;
pub mod favourites_repository;
pub mod playlist_cache;
pub mod settings_repository;
