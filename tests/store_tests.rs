use reelhub::config::SecurityConfig;
use reelhub::db::{InsertOutcome, NewUser, Store};
use reelhub::domain::{
    ExternalRef, FavoriteTarget, HistoryClear, MediaType, NewWatchlistItem, RatingInput, Role,
    UserId, WatchProgressInput,
};
use std::path::PathBuf;

struct TempStore {
    store: Store,
    path: PathBuf,
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn temp_store() -> TempStore {
    let path = std::env::temp_dir().join(format!("reelhub-store-{}.db", uuid::Uuid::new_v4()));
    let store = Store::new(&format!("sqlite:{}", path.display()))
        .await
        .expect("Failed to open store");
    TempStore { store, path }
}

async fn user(store: &Store, email: &str) -> UserId {
    let created = store
        .create_user(
            NewUser {
                name: "Store Tester".to_string(),
                email: email.to_string(),
                password: "hunter2-hunter2".to_string(),
                role: Role::User,
                avatar: None,
            },
            &SecurityConfig::default(),
        )
        .await
        .unwrap()
        .unwrap();
    UserId::new(created.id)
}

fn progress(title: &str, progress: i32, completed: bool) -> WatchProgressInput {
    WatchProgressInput {
        title: title.to_string(),
        poster_path: None,
        progress,
        duration: Some(3000),
        completed,
    }
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let db = temp_store().await;
    user(&db.store, "dup@reelhub.test").await;

    let again = db
        .store
        .create_user(
            NewUser {
                name: "Other".to_string(),
                email: "dup@reelhub.test".to_string(),
                password: "another-password".to_string(),
                role: Role::User,
                avatar: None,
            },
            &SecurityConfig::default(),
        )
        .await
        .unwrap();
    assert!(again.is_none());

    let verified = db
        .store
        .verify_user_password("dup@reelhub.test", "hunter2-hunter2")
        .await
        .unwrap();
    assert!(verified.is_some());
    let rejected = db
        .store
        .verify_user_password("dup@reelhub.test", "wrong")
        .await
        .unwrap();
    assert!(rejected.is_none());
}

#[tokio::test]
async fn test_favorite_unique_per_target() {
    let db = temp_store().await;
    let report = reelhub::db::seed::seed_demo_catalog(&db.store).await.unwrap();
    let viewer = user(&db.store, "fav@reelhub.test").await;
    let target = FavoriteTarget::Movie(report.movies[0]);

    let first = db.store.add_favorite(viewer, target).await.unwrap();
    let InsertOutcome::Created(created) = first else {
        panic!("first insert must create a row");
    };

    let second = db.store.add_favorite(viewer, target).await.unwrap();
    let InsertOutcome::Existing(existing) = second else {
        panic!("second insert must hit the unique constraint");
    };
    assert_eq!(existing.id, created.id);
    assert_eq!(db.store.count_favorites(viewer).await.unwrap(), 1);

    // Ownership is part of the delete predicate
    let stranger = user(&db.store, "stranger@reelhub.test").await;
    assert!(!db.store.remove_favorite(stranger, created.id).await.unwrap());
    assert!(db.store.remove_favorite(viewer, created.id).await.unwrap());
}

#[tokio::test]
async fn test_watchlist_insert_reports_existing_row() {
    let db = temp_store().await;
    let viewer = user(&db.store, "wl@reelhub.test").await;
    let item = NewWatchlistItem {
        tmdb_id: 550,
        media_type: MediaType::Movie,
        title: "Fight Club".to_string(),
        poster_path: None,
    };

    assert!(matches!(
        db.store.add_to_watchlist(viewer, item.clone()).await.unwrap(),
        InsertOutcome::Created(_)
    ));
    assert!(matches!(
        db.store.add_to_watchlist(viewer, item).await.unwrap(),
        InsertOutcome::Existing(_)
    ));

    // Same tmdbId under another media type is a different item
    let tv = NewWatchlistItem {
        tmdb_id: 550,
        media_type: MediaType::Tv,
        title: "Not Fight Club".to_string(),
        poster_path: None,
    };
    assert!(matches!(
        db.store.add_to_watchlist(viewer, tv).await.unwrap(),
        InsertOutcome::Created(_)
    ));
    assert_eq!(db.store.count_watchlist(viewer).await.unwrap(), 2);
}

#[tokio::test]
async fn test_rating_upsert_overwrites_in_place() {
    let db = temp_store().await;
    let viewer = user(&db.store, "rate@reelhub.test").await;
    let content = ExternalRef::new(27205, MediaType::Movie, None, None).unwrap();

    let first = db
        .store
        .upsert_rating(
            viewer,
            &content,
            RatingInput {
                rating: 9,
                comment: Some("Loved it".to_string()),
                title: "Inception".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(first.created);

    let second = db
        .store
        .upsert_rating(
            viewer,
            &content,
            RatingInput {
                rating: 7,
                comment: None,
                title: "Inception".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.model.id, first.model.id);
    assert_eq!(second.model.rating, 7);
    assert_eq!(db.store.count_ratings(viewer).await.unwrap(), 1);

    let distribution = db.store.rating_distribution(viewer).await.unwrap();
    assert_eq!(distribution, vec![(7, 1)]);
}

#[tokio::test]
async fn test_continue_watching_and_clear_by_type() {
    let db = temp_store().await;
    let viewer = user(&db.store, "cw@reelhub.test").await;

    let movie = ExternalRef::new(1, MediaType::Movie, None, None).unwrap();
    let finished = ExternalRef::new(2, MediaType::Movie, None, None).unwrap();
    let unstarted = ExternalRef::new(3, MediaType::Movie, None, None).unwrap();
    let episode = ExternalRef::new(4, MediaType::Episode, Some(1), Some(3)).unwrap();

    db.store
        .record_progress(viewer, &movie, progress("Movie", 100, false))
        .await
        .unwrap();
    db.store
        .record_progress(viewer, &finished, progress("Finished", 3000, true))
        .await
        .unwrap();
    db.store
        .record_progress(viewer, &unstarted, progress("Unstarted", 0, false))
        .await
        .unwrap();
    db.store
        .record_progress(viewer, &episode, progress("Episode", 900, false))
        .await
        .unwrap();

    let resumable = db.store.continue_watching(viewer, 10).await.unwrap();
    let titles: Vec<&str> = resumable.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Episode", "Movie"]);

    let summary = db.store.history_summary(viewer).await.unwrap();
    assert_eq!(summary.total_entries(), 4);
    assert_eq!(summary.completed.entries, 1);

    let removed = db
        .store
        .clear_history(
            viewer,
            HistoryClear {
                media_type: Some(MediaType::Movie),
                before: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(removed, 3);

    let left = db.store.continue_watching(viewer, 10).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].media_type, "episode");
}
