pub mod race_feed;
