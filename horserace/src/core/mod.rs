pub mod betting;
pub mod handle_race;
pub mod horse;
pub mod odds;
pub mod race;
pub mod stable;
