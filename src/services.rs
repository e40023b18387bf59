pub mod discussion_service;
pub mod game_service;
