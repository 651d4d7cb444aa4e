//! Demo catalog used by `reelhub seed` and the integration tests.

use anyhow::Result;
use tracing::info;

use super::{NewEpisode, NewMedia, NewMovie, NewSeason, NewSeries, Store};
use crate::domain::{AssetType, MediaParentKind, SeriesStatus};

/// Ids of the rows inserted by [`seed_demo_catalog`].
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    pub categories: Vec<i32>,
    pub genres: Vec<i32>,
    pub movies: Vec<i32>,
    pub series: Vec<i32>,
    pub seasons: Vec<i32>,
    pub episodes: Vec<i32>,
    pub skipped: bool,
}

/// Inserts the demo catalog once; does nothing when categories already exist.
pub async fn seed_demo_catalog(store: &Store) -> Result<SeedReport> {
    if store.count_categories().await? > 0 {
        info!("Catalog already seeded, skipping");
        return Ok(SeedReport {
            skipped: true,
            ..SeedReport::default()
        });
    }

    let mut report = SeedReport::default();

    let action = store
        .create_category("Action", Some("Films et séries d'action pleins d'adrénaline"), 1)
        .await?;
    let drama = store
        .create_category("Drame", Some("Histoires émouvantes et profondes"), 3)
        .await?;
    let scifi = store
        .create_category(
            "Science-Fiction",
            Some("Aventures futuristes et technologiques"),
            4,
        )
        .await?;
    report.categories = vec![action.id, drama.id, scifi.id];

    let adventure = store
        .create_genre("Aventure", Some("Voyages et découvertes"))
        .await?;
    let romance = store
        .create_genre("Romance", Some("Histoires d'amour"))
        .await?;
    let crime = store
        .create_genre("Policier", Some("Enquêtes et mystères"))
        .await?;
    let fantasy = store
        .create_genre("Fantasy", Some("Mondes imaginaires et magie"))
        .await?;
    report.genres = vec![adventure.id, romance.id, crime.id, fantasy.id];

    let inception = store
        .create_movie(NewMovie {
            title: "Inception".to_string(),
            description: Some(
                "Dom Cobb est un voleur expérimenté dans l'art périlleux de l'extraction."
                    .to_string(),
            ),
            release_year: Some(2010),
            duration: Some(148),
            director: Some("Christopher Nolan".to_string()),
            cast: Some("Leonardo DiCaprio, Joseph Gordon-Levitt, Elliot Page".to_string()),
            rating_avg: 8.8,
            trailer_url: Some("https://www.youtube.com/watch?v=YoHD9XEInc0".to_string()),
            maturity_rating: Some("PG-13".to_string()),
            is_featured: true,
            category_id: scifi.id,
            tmdb_id: Some(27205),
            imdb_id: Some("tt1375666".to_string()),
            ..NewMovie::default()
        })
        .await?;
    let dark_knight = store
        .create_movie(NewMovie {
            title: "The Dark Knight".to_string(),
            description: Some(
                "Batman se bat contre un criminel connu sous le nom du Joker.".to_string(),
            ),
            release_year: Some(2008),
            duration: Some(152),
            director: Some("Christopher Nolan".to_string()),
            cast: Some("Christian Bale, Heath Ledger, Aaron Eckhart".to_string()),
            rating_avg: 9.0,
            poster_url: Some(
                "https://image.tmdb.org/t/p/w500/qJ2tW6WMUDux911r6m7haRef0WH.jpg".to_string(),
            ),
            trailer_url: Some("https://www.youtube.com/watch?v=EXeTwQWrcwY".to_string()),
            maturity_rating: Some("PG-13".to_string()),
            is_featured: true,
            category_id: action.id,
            tmdb_id: Some(155),
            imdb_id: Some("tt0468569".to_string()),
            ..NewMovie::default()
        })
        .await?;
    report.movies = vec![inception.id, dark_knight.id];

    store.attach_movie_genre(inception.id, adventure.id).await?;
    store.attach_movie_genre(inception.id, fantasy.id).await?;
    store.attach_movie_genre(dark_knight.id, adventure.id).await?;
    store.attach_movie_genre(dark_knight.id, crime.id).await?;

    let stranger_things = store
        .create_series(NewSeries {
            title: "Stranger Things".to_string(),
            description: Some(
                "Quand un jeune garçon disparaît, une petite ville découvre une affaire mystérieuse."
                    .to_string(),
            ),
            release_year: Some(2016),
            end_year: None,
            creator: Some("The Duffer Brothers".to_string()),
            cast: Some("Millie Bobby Brown, Finn Wolfhard, Winona Ryder".to_string()),
            status: SeriesStatus::Ongoing,
            rating_avg: 8.7,
            trailer_url: Some("https://www.youtube.com/watch?v=b9EkMc79ZSU".to_string()),
            maturity_rating: Some("16+".to_string()),
            is_featured: true,
            category_id: scifi.id,
            tmdb_id: Some(66732),
            ..NewSeries::default()
        })
        .await?;
    let breaking_bad = store
        .create_series(NewSeries {
            title: "Breaking Bad".to_string(),
            description: Some(
                "Un professeur de chimie atteint d'un cancer s'associe à un ancien élève."
                    .to_string(),
            ),
            release_year: Some(2008),
            end_year: Some(2013),
            creator: Some("Vince Gilligan".to_string()),
            cast: Some("Bryan Cranston, Aaron Paul, Anna Gunn".to_string()),
            status: SeriesStatus::Completed,
            rating_avg: 9.5,
            trailer_url: Some("https://www.youtube.com/watch?v=HhesaQXLuRY".to_string()),
            maturity_rating: Some("16+".to_string()),
            is_featured: true,
            category_id: drama.id,
            tmdb_id: Some(1396),
            ..NewSeries::default()
        })
        .await?;
    report.series = vec![stranger_things.id, breaking_bad.id];

    store
        .attach_series_genre(stranger_things.id, adventure.id)
        .await?;
    store
        .attach_series_genre(stranger_things.id, fantasy.id)
        .await?;
    store.attach_series_genre(breaking_bad.id, crime.id).await?;

    let st_s1 = store
        .create_season(
            stranger_things.id,
            NewSeason {
                season_number: 1,
                title: Some("Stranger Things: Saison 1".to_string()),
                release_date: Some("2016-07-15".to_string()),
                ..NewSeason::default()
            },
        )
        .await?;
    let bb_s1 = store
        .create_season(
            breaking_bad.id,
            NewSeason {
                season_number: 1,
                title: Some("Breaking Bad: Saison 1".to_string()),
                release_date: Some("2008-01-20".to_string()),
                ..NewSeason::default()
            },
        )
        .await?;
    report.seasons = vec![st_s1.id, bb_s1.id];

    let episodes = [
        (st_s1.id, 1, "La disparition de Will Byers", 48, "2016-07-15"),
        (st_s1.id, 2, "La folle de Maple Street", 45, "2016-07-15"),
        (bb_s1.id, 1, "Chute libre", 58, "2008-01-20"),
    ];
    for (season_id, number, title, minutes, aired) in episodes {
        let episode = store
            .create_episode(
                season_id,
                NewEpisode {
                    episode_number: number,
                    title: Some(title.to_string()),
                    description: None,
                    duration: Some(minutes),
                    release_date: Some(aired.to_string()),
                    ..NewEpisode::default()
                },
            )
            .await?;
        report.episodes.push(episode.id);
    }

    let assets = [
        (
            MediaParentKind::Movie,
            inception.id,
            AssetType::Poster,
            "https://m.media-amazon.com/images/M/MV5BMjAxMzY3NjcxNF5BMl5BanBnXkFtZTcwNTI5OTM0Mw@@._V1_.jpg",
            "Affiche Inception",
        ),
        (
            MediaParentKind::Movie,
            inception.id,
            AssetType::Backdrop,
            "https://i.imgur.com/rF44aiZ.jpg",
            "Backdrop Inception",
        ),
        (
            MediaParentKind::Series,
            stranger_things.id,
            AssetType::Poster,
            "https://m.media-amazon.com/images/M/MV5BMDZkYmVhNjMtNWU4MC00MDQxLWE3MjYtZGMzZWI1ZjhlOWJmXkEyXkFqcGdeQXVyMTkxNjUyNQ@@._V1_.jpg",
            "Affiche Stranger Things",
        ),
    ];
    for (parent_kind, parent_id, media_type, url, title) in assets {
        store
            .add_media(NewMedia {
                url: url.to_string(),
                media_type,
                title: Some(title.to_string()),
                description: None,
                parent_kind,
                parent_id,
                is_default: true,
            })
            .await?;
    }

    info!(
        movies = report.movies.len(),
        series = report.series.len(),
        episodes = report.episodes.len(),
        "Demo catalog seeded"
    );

    Ok(report)
}
