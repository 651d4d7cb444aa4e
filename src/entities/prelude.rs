pub use super::categories::Entity as Categories;
pub use super::episodes::Entity as Episodes;
pub use super::favorites::Entity as Favorites;
pub use super::genres::Entity as Genres;
pub use super::media::Entity as Media;
pub use super::movie_genres::Entity as MovieGenres;
pub use super::movies::Entity as Movies;
pub use super::ratings::Entity as Ratings;
pub use super::seasons::Entity as Seasons;
pub use super::series::Entity as Series;
pub use super::series_genres::Entity as SeriesGenres;
pub use super::users::Entity as Users;
pub use super::watch_history::Entity as WatchHistory;
pub use super::watchlist::Entity as Watchlist;
