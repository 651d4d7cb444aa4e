pub mod prelude;

pub mod categories;
pub mod episodes;
pub mod favorites;
pub mod genres;
pub mod media;
pub mod movie_genres;
pub mod movies;
pub mod ratings;
pub mod seasons;
pub mod series;
pub mod series_genres;
pub mod users;
pub mod watch_history;
pub mod watchlist;
