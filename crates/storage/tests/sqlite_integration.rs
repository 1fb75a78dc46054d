use chrono::{Duration, NaiveDate};
use quiz_core::model::{
    AnswerKey, DailyBundle, DailyCacheKey, Difficulty, DifficultyCounts, DifficultyRatio, Question,
    QuestionDraft, QuestionId, UserId,
};
use quiz_core::time::fixed_now;
use storage::repository::{
    ActivityLogRepository, ActivityRecord, DailyCacheRepository, ProfileRepository,
    QuestionRepository, StorageError,
};
use storage::sqlite::SqliteRepository;
use uuid::Uuid;

fn build_question(id: u128, difficulty: Difficulty, minutes: i64) -> Question {
    QuestionDraft {
        subject: "Chemistry".into(),
        difficulty,
        prompt: format!("Question {id}"),
        options: ["H2O".into(), "CO2".into(), "NaCl".into(), "O2".into()],
        correct_answer: AnswerKey::A,
        reasoning: Some("Water is H2O.".into()),
    }
    .validate(
        QuestionId::new(Uuid::from_u128(id)),
        fixed_now() + Duration::minutes(minutes),
    )
    .unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_questions_round_trip_by_band() {
    let repo = connect("memdb_questions").await;

    repo.insert_question(&build_question(2, Difficulty::Easy, 2)).await.unwrap();
    repo.insert_question(&build_question(1, Difficulty::Easy, 1)).await.unwrap();
    repo.insert_question(&build_question(3, Difficulty::Difficult, 3)).await.unwrap();

    let easy = repo.questions_by_difficulty(Difficulty::Easy, 50).await.unwrap();
    assert_eq!(easy.len(), 2);
    assert_eq!(easy[0], build_question(1, Difficulty::Easy, 1));
    assert_eq!(easy[1].reasoning(), Some("Water is H2O."));

    let limited = repo.questions_by_difficulty(Difficulty::Easy, 1).await.unwrap();
    assert_eq!(limited.len(), 1);

    let moderate = repo.questions_by_difficulty(Difficulty::Moderate, 50).await.unwrap();
    assert!(moderate.is_empty());

    let err = repo
        .insert_question(&build_question(1, Difficulty::Easy, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_profile_ratio_upserts() {
    let repo = connect("memdb_profiles").await;
    let user = UserId::new(Uuid::from_u128(1));

    assert_eq!(repo.difficulty_ratio(user).await.unwrap(), None);

    repo.save_difficulty_ratio(user, &DifficultyRatio::new(0.5, 0.5, 0.0))
        .await
        .unwrap();
    repo.save_difficulty_ratio(user, &DifficultyRatio::new(0.3, 0.3, 0.4))
        .await
        .unwrap();

    assert_eq!(
        repo.difficulty_ratio(user).await.unwrap(),
        Some(DifficultyRatio::new(0.3, 0.3, 0.4))
    );
}

#[tokio::test]
async fn sqlite_profile_ratio_reads_partial_json() {
    let repo = connect("memdb_partial_ratio").await;
    let user = UserId::new(Uuid::from_u128(5));

    sqlx::query("INSERT INTO profiles (id, difficulty_ratio, updated_at) VALUES (?1, ?2, ?3)")
        .bind(user.to_string())
        .bind(r#"{"moderate":1.0}"#)
        .bind(fixed_now())
        .execute(repo.pool())
        .await
        .unwrap();

    assert_eq!(
        repo.difficulty_ratio(user).await.unwrap(),
        Some(DifficultyRatio::new(0.0, 1.0, 0.0))
    );
}

#[tokio::test]
async fn sqlite_cache_stores_bundle_per_day() {
    let repo = connect("memdb_cache").await;
    let user = UserId::new(Uuid::from_u128(2));
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let key = DailyCacheKey::new(user, date);

    assert_eq!(repo.get_bundle(&key).await.unwrap(), None);

    let bundle = DailyBundle {
        date,
        counts: DifficultyCounts::new(8, 2, 0),
        questions: vec![build_question(10, Difficulty::Easy, 0)],
    };
    repo.put_bundle(&key, &bundle).await.unwrap();
    assert_eq!(repo.get_bundle(&key).await.unwrap(), Some(bundle.clone()));

    let next_day = DailyCacheKey::new(user, date.succ_opt().unwrap());
    assert_eq!(repo.get_bundle(&next_day).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_activity_log_keeps_details() {
    let repo = connect("memdb_activity").await;
    let user = UserId::new(Uuid::from_u128(3));

    let record = ActivityRecord {
        user_id: user,
        event_type: "daily_questions_selected".into(),
        details: serde_json::json!({ "counts": { "easy": 8 }, "ids": ["a", "b"] }),
        recorded_at: fixed_now(),
    };
    repo.append_activity(&record).await.unwrap();

    let other = UserId::new(Uuid::from_u128(4));
    let logs = repo.activities_for_user(user).await.unwrap();
    assert_eq!(logs, vec![record]);
    assert!(repo.activities_for_user(other).await.unwrap().is_empty());
}
