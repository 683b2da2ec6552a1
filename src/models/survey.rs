use rand::Rng;
use serde::{Deserialize, Serialize};

/// Question kinds. Exactly one validation parameter group on
/// [`QuestionPayload`] is relevant per type:
/// - mcq / checkbox: `options`
/// - rating / scale: `min_value` / `max_value`
/// - text / textarea: `max_length`
/// - yes_no: none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Rating,
    Scale,
    Mcq,
    Checkbox,
    YesNo,
    Text,
    Textarea,
}

/// A survey question as stored server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    pub position: u32,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub min_value: Option<i32>,
    #[serde(default)]
    pub max_value: Option<i32>,
    #[serde(default)]
    pub max_length: Option<u32>,
}

/// Create/edit form payload for a question. Same pattern as offers: the form
/// may leave stale values behind, [`normalize`](Self::normalize) nulls
/// everything the selected type does not use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    pub position: u32,
    pub options: Option<Vec<String>>,
    pub min_value: Option<i32>,
    pub max_value: Option<i32>,
    pub max_length: Option<u32>,
}

impl QuestionPayload {
    pub fn normalize(&mut self) {
        match self.question_type {
            QuestionType::Mcq | QuestionType::Checkbox => {
                self.min_value = None;
                self.max_value = None;
                self.max_length = None;
            }
            QuestionType::Rating | QuestionType::Scale => {
                self.options = None;
                self.max_length = None;
            }
            QuestionType::Text | QuestionType::Textarea => {
                self.options = None;
                self.min_value = None;
                self.max_value = None;
            }
            QuestionType::YesNo => {
                self.options = None;
                self.min_value = None;
                self.max_value = None;
                self.max_length = None;
            }
        }
    }
}

/// Client-generated identifier attached to a full survey submission.
/// Correlation/idempotency only — generated once, never re-derived.
pub fn new_submission_id() -> String {
    let suffix: u32 = rand::thread_rng().gen();
    format!("{}-{:08x}", chrono::Utc::now().timestamp_millis(), suffix)
}

/// Aggregated per-question response stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: i64,
    pub response_count: u64,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub option_counts: Option<std::collections::HashMap<String, u64>>,
}

/// Survey metadata plus its ordered questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// The merged result of the two independent stats calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyStats {
    pub survey: Survey,
    pub total_responses: u64,
    pub question_stats: Vec<QuestionStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fully_populated(question_type: QuestionType) -> QuestionPayload {
        QuestionPayload {
            question_text: "How was your meal?".to_string(),
            question_type,
            required: true,
            position: 0,
            options: Some(vec!["Great".to_string(), "Okay".to_string()]),
            min_value: Some(1),
            max_value: Some(5),
            max_length: Some(280),
        }
    }

    #[test]
    fn mcq_keeps_only_options() {
        let mut q = fully_populated(QuestionType::Mcq);
        q.normalize();
        assert!(q.options.is_some());
        assert_eq!(q.min_value, None);
        assert_eq!(q.max_value, None);
        assert_eq!(q.max_length, None);
    }

    #[test]
    fn rating_keeps_only_bounds() {
        let mut q = fully_populated(QuestionType::Rating);
        q.normalize();
        assert_eq!(q.options, None);
        assert_eq!(q.min_value, Some(1));
        assert_eq!(q.max_value, Some(5));
        assert_eq!(q.max_length, None);
    }

    #[test]
    fn textarea_keeps_only_max_length() {
        let mut q = fully_populated(QuestionType::Textarea);
        q.normalize();
        assert_eq!(q.options, None);
        assert_eq!(q.min_value, None);
        assert_eq!(q.max_length, Some(280));
    }

    #[test]
    fn yes_no_keeps_nothing() {
        let mut q = fully_populated(QuestionType::YesNo);
        q.normalize();
        assert_eq!(q.options, None);
        assert_eq!(q.min_value, None);
        assert_eq!(q.max_value, None);
        assert_eq!(q.max_length, None);
    }

    #[test]
    fn normalize_holds_for_every_type() {
        for question_type in [
            QuestionType::Rating,
            QuestionType::Scale,
            QuestionType::Mcq,
            QuestionType::Checkbox,
            QuestionType::YesNo,
            QuestionType::Text,
            QuestionType::Textarea,
        ] {
            let mut q = fully_populated(question_type);
            q.normalize();

            let groups = [
                q.options.is_some(),
                q.min_value.is_some() || q.max_value.is_some(),
                q.max_length.is_some(),
            ]
            .iter()
            .filter(|&&p| p)
            .count();

            let expected = if question_type == QuestionType::YesNo { 0 } else { 1 };
            assert_eq!(groups, expected, "one group at most for {:?}", question_type);
        }
    }

    #[test]
    fn submission_ids_are_distinct() {
        let a = new_submission_id();
        let b = new_submission_id();
        assert_ne!(a, b);
        // timestamp prefix, dash, hex suffix
        let (ts, suffix) = a.split_once('-').unwrap();
        assert!(ts.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 8);
    }
}
