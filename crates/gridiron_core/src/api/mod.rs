pub mod json_api;

pub use json_api::{
    aggregate_season_json, classify_play_json, process_game_json, GameRequest, GameResponse,
    PlayRequest, PlayResponse, SeasonRequest, SeasonResponse,
};
