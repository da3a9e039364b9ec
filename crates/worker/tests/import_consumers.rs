//! Integration tests for the import consumers and the polling loop.

use std::collections::HashMap;
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::NaiveDate;
use plotwist_core::enums::{
    ImportItemStatus, ImportProvider, ImportStatus, Language, MediaType, UserItemStatus,
};
use plotwist_core::imports::matching::TmdbCandidate;
use plotwist_core::imports::{
    DecodedImport, ImportMessage, ImportMovieDraft, ImportSeriesDraft, IMPORT_MOVIES_QUEUE,
};
use plotwist_core::stats::breakdown::CastCredit;
use plotwist_core::types::{DbId, TmdbId};
use plotwist_db::models::import::DetailedImport;
use plotwist_db::models::user::CreateUser;
use plotwist_db::repositories::{ImportQueueRepo, ImportRepo, UserItemRepo, UserRepo};
use plotwist_providers::my_anime_list::{AnimeLookup, MalError};
use plotwist_providers::tmdb::{MetadataProvider, TitleDetails, TmdbError};
use plotwist_worker::consumer::{ImportConsumer, ItemOutcome};
use plotwist_worker::queue::{ImportQueue, PgImportQueue};
use plotwist_worker::runner;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Stub providers
// ---------------------------------------------------------------------------

/// Search results keyed by title. The title "Outage" fails with an API error.
#[derive(Default)]
struct StubTmdb {
    results: HashMap<String, Vec<TmdbCandidate>>,
}

impl StubTmdb {
    fn with(mut self, name: &str, candidates: &[(TmdbId, &str)]) -> Self {
        self.results.insert(
            name.to_string(),
            candidates
                .iter()
                .map(|(id, date)| TmdbCandidate {
                    id: *id,
                    release_date: Some(date.to_string()),
                })
                .collect(),
        );
        self
    }
}

#[async_trait]
impl MetadataProvider for StubTmdb {
    async fn search(&self, query: &str, _: MediaType) -> Result<Vec<TmdbCandidate>, TmdbError> {
        if query == "Outage" {
            return Err(TmdbError::Api {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }

    async fn details(&self, _: TmdbId, _: MediaType, _: Language) -> Result<TitleDetails, TmdbError> {
        Err(TmdbError::NotConfigured)
    }

    async fn credits(&self, _: TmdbId, _: MediaType, _: Language) -> Result<Vec<CastCredit>, TmdbError> {
        Err(TmdbError::NotConfigured)
    }
}

#[derive(Default)]
struct StubMal {
    start_dates: HashMap<i64, NaiveDate>,
}

#[async_trait]
impl AnimeLookup for StubMal {
    async fn start_date(&self, anime_id: i64) -> Result<Option<NaiveDate>, MalError> {
        Ok(self.start_dates.get(&anime_id).copied())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool) -> DbId {
    let input = CreateUser {
        username: "importer".to_string(),
        email: "importer@example.com".to_string(),
        password_hash: "hash".to_string(),
        display_name: None,
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

fn letterboxd_movie(name: &str, year: &str) -> ImportMovieDraft {
    ImportMovieDraft {
        name: name.to_string(),
        end_date: None,
        item_status: UserItemStatus::Watched,
        metadata: json!({"Name": name, "Year": year}),
    }
}

async fn letterboxd_import(pool: &PgPool, user_id: DbId, movies: Vec<ImportMovieDraft>) -> DetailedImport {
    let decoded = DecodedImport {
        provider: ImportProvider::Letterboxd,
        movies,
        series: vec![],
    };
    ImportRepo::create_with_items(pool, user_id, &decoded).await.unwrap()
}

fn message(id: DbId, name: &str, provider: ImportProvider, user_id: DbId) -> ImportMessage {
    ImportMessage {
        id,
        name: name.to_string(),
        provider,
        user_id,
    }
}

fn movies_consumer(pool: &PgPool, tmdb: StubTmdb) -> ImportConsumer {
    ImportConsumer::movies(pool.clone(), Arc::new(tmdb), Arc::new(StubMal::default()))
}

// ---------------------------------------------------------------------------
// Consumer
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_single_candidate_is_added_to_collection(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let import = letterboxd_import(&pool, user_id, vec![letterboxd_movie("Heat", "1995")]).await;
    let movie = &import.movies[0];

    let consumer = movies_consumer(&pool, StubTmdb::default().with("Heat", &[(949, "1995-12-15")]));
    let outcome = consumer
        .process(&message(movie.id, "Heat", ImportProvider::Letterboxd, user_id))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ItemOutcome::Matched {
            tmdb_id: 949,
            import_status: Some(ImportStatus::Completed),
        }
    );

    let stored = ImportRepo::find_movie(&pool, movie.id).await.unwrap().unwrap();
    assert_eq!(stored.import_status, ImportItemStatus::Completed);
    assert_eq!(stored.tmdb_id, Some(949));

    let item = UserItemRepo::find_by_media(&pool, user_id, 949, MediaType::Movie)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.status, UserItemStatus::Watched);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_release_year_disambiguates(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let import = letterboxd_import(&pool, user_id, vec![letterboxd_movie("Solaris", "2002")]).await;
    let movie = &import.movies[0];

    let tmdb = StubTmdb::default().with("Solaris", &[(593, "1972-03-20"), (2103, "2002-11-27")]);
    let outcome = movies_consumer(&pool, tmdb)
        .process(&message(movie.id, "Solaris", ImportProvider::Letterboxd, user_id))
        .await
        .unwrap();

    assert_matches!(outcome, ItemOutcome::Matched { tmdb_id: 2103, .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unmatched_item_fails_and_import_goes_partial(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let import = letterboxd_import(
        &pool,
        user_id,
        vec![letterboxd_movie("Nothing Like It", "2001"), letterboxd_movie("Heat", "1995")],
    )
    .await;
    let first = &import.movies[0];

    let outcome = movies_consumer(&pool, StubTmdb::default())
        .process(&message(first.id, &first.name, ImportProvider::Letterboxd, user_id))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ItemOutcome::Unmatched {
            import_status: Some(ImportStatus::Partial),
        }
    );
    let stored = ImportRepo::find_movie(&pool, first.id).await.unwrap().unwrap();
    assert_eq!(stored.import_status, ImportItemStatus::Failed);
    assert_eq!(stored.tmdb_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_anime_start_date_disambiguates_series(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let decoded = DecodedImport {
        provider: ImportProvider::MyAnimeList,
        movies: vec![],
        series: vec![ImportSeriesDraft {
            name: "Hunter x Hunter".to_string(),
            start_date: None,
            end_date: None,
            watched_episodes: Some(148),
            series_episodes: Some(148),
            item_status: UserItemStatus::Watching,
            metadata: json!({"series_animedb_id": "11061"}),
        }],
    };
    let import = ImportRepo::create_with_items(&pool, user_id, &decoded).await.unwrap();
    let series = &import.series[0];

    let tmdb = StubTmdb::default().with(
        "Hunter x Hunter",
        &[(12447, "1999-10-16"), (46298, "2011-10-02")],
    );
    let mal = StubMal {
        start_dates: HashMap::from([(11061, NaiveDate::from_ymd_opt(2011, 10, 2).unwrap())]),
    };
    let consumer = ImportConsumer::series(pool.clone(), Arc::new(tmdb), Arc::new(mal));

    let outcome = consumer
        .process(&message(series.id, &series.name, ImportProvider::MyAnimeList, user_id))
        .await
        .unwrap();

    assert_matches!(outcome, ItemOutcome::Matched { tmdb_id: 46298, .. });
    let item = UserItemRepo::find_by_media(&pool, user_id, 46298, MediaType::TvShow)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.status, UserItemStatus::Watching);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_item_is_missing(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let outcome = movies_consumer(&pool, StubTmdb::default())
        .process(&message(uuid::Uuid::now_v7(), "Ghost", ImportProvider::Letterboxd, user_id))
        .await
        .unwrap();
    assert_eq!(outcome, ItemOutcome::Missing);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_redelivered_item_is_not_processed_twice(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let import = letterboxd_import(&pool, user_id, vec![letterboxd_movie("Heat", "1995")]).await;
    let movie = &import.movies[0];
    let msg = message(movie.id, "Heat", ImportProvider::Letterboxd, user_id);

    let consumer = movies_consumer(&pool, StubTmdb::default().with("Heat", &[(949, "1995-12-15")]));
    consumer.process(&msg).await.unwrap();

    let again = consumer.process(&msg).await.unwrap();
    assert_eq!(
        again,
        ItemOutcome::AlreadyResolved {
            import_status: Some(ImportStatus::Completed),
        }
    );
}

// ---------------------------------------------------------------------------
// Polling loop
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_run_once_acks_processed_messages(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let import = letterboxd_import(
        &pool,
        user_id,
        vec![letterboxd_movie("Heat", "1995"), letterboxd_movie("Unknown Film", "1990")],
    )
    .await;

    let queue = PgImportQueue::new(pool.clone());
    let messages: Vec<ImportMessage> = import
        .movies
        .iter()
        .map(|m| message(m.id, &m.name, ImportProvider::Letterboxd, user_id))
        .collect();
    assert_eq!(queue.publish(IMPORT_MOVIES_QUEUE, &messages).await.unwrap(), 2);

    let consumer = movies_consumer(&pool, StubTmdb::default().with("Heat", &[(949, "1995-12-15")]));
    let summary = runner::run_once(&queue, &consumer).await.unwrap();

    assert_eq!(summary.received, 2);
    assert_eq!(summary.acknowledged, 2);
    assert_eq!(summary.retried, 0);
    assert_eq!(ImportQueueRepo::depth(&pool, IMPORT_MOVIES_QUEUE).await.unwrap(), 0);

    let stored = ImportRepo::find_by_id(&pool, import.import.id).await.unwrap().unwrap();
    assert_eq!(stored.import_status, ImportStatus::Completed);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_run_once_leaves_failed_messages_for_redelivery(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let import = letterboxd_import(&pool, user_id, vec![letterboxd_movie("Outage", "2020")]).await;
    let movie = &import.movies[0];

    let queue = PgImportQueue::new(pool.clone());
    queue
        .publish(
            IMPORT_MOVIES_QUEUE,
            &[message(movie.id, "Outage", ImportProvider::Letterboxd, user_id)],
        )
        .await
        .unwrap();

    let summary = runner::run_once(&queue, &movies_consumer(&pool, StubTmdb::default()))
        .await
        .unwrap();

    assert_eq!(summary.retried, 1);
    assert_eq!(ImportQueueRepo::depth(&pool, IMPORT_MOVIES_QUEUE).await.unwrap(), 1);
    let stored = ImportRepo::find_movie(&pool, movie.id).await.unwrap().unwrap();
    assert_eq!(stored.import_status, ImportItemStatus::NotStarted);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_messages_are_dropped(pool: PgPool) {
    ImportQueueRepo::enqueue(&pool, IMPORT_MOVIES_QUEUE, &json!({"unexpected": true}))
        .await
        .unwrap();

    let queue = PgImportQueue::new(pool.clone());
    let summary = runner::run_once(&queue, &movies_consumer(&pool, StubTmdb::default()))
        .await
        .unwrap();

    assert_eq!(summary.acknowledged, 1);
    assert_eq!(ImportQueueRepo::depth(&pool, IMPORT_MOVIES_QUEUE).await.unwrap(), 0);
}
