use chrono::Duration;
use quiz_core::model::{LearnerId, QuestionId, ReviewItem, TopicSnapshot};
use quiz_core::time::fixed_now;
use quiz_core::{MasteryInput, MasteryModel};
use quiz_core::model::Difficulty;
use storage::demo::{demo_questions, seed_demo_questions};
use storage::repository::{ProgressRepository, QuestionBank, Storage};
use storage::sqlite::SqliteRepository;

async fn fresh_repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_questions_with_options() {
    let repo = fresh_repo("memdb_questions").await;

    let seeded = seed_demo_questions(&repo).await.unwrap();
    assert_eq!(seeded, demo_questions().len());

    let listed = repo.list_questions().await.unwrap();
    assert_eq!(listed, demo_questions());

    let first = repo
        .get_question(QuestionId::new(1))
        .await
        .unwrap()
        .expect("question 1");
    assert_eq!(first.topic_id.as_str(), "articles");
    assert!(first.options.contains(&first.correct_answer));
    assert!(repo.get_question(QuestionId::new(999)).await.unwrap().is_none());

    // Seeding twice overwrites instead of duplicating.
    seed_demo_questions(&repo).await.unwrap();
    assert_eq!(repo.list_questions().await.unwrap().len(), demo_questions().len());
}

#[tokio::test]
async fn sqlite_migrate_is_idempotent() {
    let repo = fresh_repo("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    assert!(repo.list_questions().await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_snapshots_keep_streaks_and_order() {
    let repo = fresh_repo("memdb_snapshots").await;
    let learner = LearnerId::from("learner-1");
    let now = fixed_now();

    let model = MasteryModel::default();
    let articles = model.update(
        &TopicSnapshot::seeded("articles", 50.0).unwrap(),
        &MasteryInput::at(true, Difficulty::HARD, now),
    );
    let tenses = TopicSnapshot::seeded("past_simple", 10.0).unwrap();

    repo.save_snapshot(&learner, &articles).await.unwrap();
    repo.save_snapshot(&learner, &tenses).await.unwrap();

    let loaded = repo.load_snapshots(&learner).await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0], articles);
    assert_eq!(loaded[0].correct_streak(), 1);
    assert_eq!(loaded[0].last_seen(), Some(now));
    assert_eq!(loaded[1].topic_id().as_str(), "past_simple");
    assert!(loaded[1].is_new());

    let updated = model.update(
        &loaded[0],
        &MasteryInput::at(false, Difficulty::EASY, now + Duration::hours(1)),
    );
    repo.save_snapshot(&learner, &updated).await.unwrap();

    let reloaded = repo.load_snapshots(&learner).await.unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded[0].topic_id().as_str(), "articles");
    assert_eq!(reloaded[0].wrong_streak(), 1);
    assert_eq!(reloaded[0].correct_streak(), 0);

    assert!(
        repo.load_snapshots(&LearnerId::from("someone-else"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn sqlite_reviews_upsert_per_topic() {
    let repo = fresh_repo("memdb_reviews").await;
    let learner = LearnerId::from("learner-2");
    let now = fixed_now();

    repo.upsert_review(&learner, &ReviewItem::new("articles", now))
        .await
        .unwrap();
    repo.upsert_review(&learner, &ReviewItem::new("articles", now + Duration::days(3)))
        .await
        .unwrap();

    let reviews = repo.load_reviews(&learner).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].next_review_at, now + Duration::days(3));
    assert!(!reviews[0].is_due(now));
}

#[tokio::test]
async fn sqlite_storage_keeps_sessions_in_memory() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    seed_demo_questions(storage.questions.as_ref()).await.unwrap();
    assert_eq!(
        storage.questions.list_questions().await.unwrap().len(),
        demo_questions().len()
    );
}
