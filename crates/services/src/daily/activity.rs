use chrono::{DateTime, Utc};
use quiz_core::model::{DailyBundle, UserId};
use serde_json::json;
use storage::repository::ActivityRecord;

/// Event type appended to the activity log when a fresh bundle is selected.
pub const DAILY_SELECTION_EVENT: &str = "daily_questions_selected";

/// Activity entry describing a newly selected bundle.
///
/// Details carry the per-band counts and the ids in bundle order.
#[must_use]
pub fn selection_record(
    user_id: UserId,
    bundle: &DailyBundle,
    recorded_at: DateTime<Utc>,
) -> ActivityRecord {
    let ids: Vec<String> = bundle
        .question_ids()
        .iter()
        .map(ToString::to_string)
        .collect();
    ActivityRecord {
        user_id,
        event_type: DAILY_SELECTION_EVENT.to_string(),
        details: json!({
            "counts": bundle.counts,
            "ids": ids,
        }),
        recorded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{
        AnswerKey, Difficulty, DifficultyCounts, QuestionDraft, QuestionId,
    };
    use quiz_core::time::fixed_now;
    use uuid::Uuid;

    #[test]
    fn record_lists_counts_and_ids_in_order() {
        let questions = [7_u128, 3]
            .into_iter()
            .map(|n| {
                QuestionDraft {
                    subject: "Math".into(),
                    difficulty: Difficulty::Easy,
                    prompt: format!("Q{n}"),
                    options: ["1".into(), "2".into(), "3".into(), "4".into()],
                    correct_answer: AnswerKey::B,
                    reasoning: None,
                }
                .validate(QuestionId::new(Uuid::from_u128(n)), fixed_now())
                .unwrap()
            })
            .collect();
        let bundle = DailyBundle {
            date: fixed_now().date_naive(),
            counts: DifficultyCounts::new(2, 0, 0),
            questions,
        };
        let user = UserId::new(Uuid::from_u128(1));
        let at = fixed_now() + Duration::minutes(5);

        let record = selection_record(user, &bundle, at);

        assert_eq!(record.user_id, user);
        assert_eq!(record.event_type, "daily_questions_selected");
        assert_eq!(record.recorded_at, at);
        assert_eq!(
            record.details,
            json!({
                "counts": { "easy": 2, "moderate": 0, "difficult": 0 },
                "ids": [
                    "00000000-0000-0000-0000-000000000007",
                    "00000000-0000-0000-0000-000000000003",
                ],
            })
        );
    }
}
