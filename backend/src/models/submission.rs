use crate::models::AssessmentDetail;
use serde::{Deserialize, Serialize};

/// `submissions` 테이블 한 행. 만들어진 뒤에는 바뀌지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub student_id: String,
    pub assessment_id: String,
    pub score: i64,
    pub total_questions: i64,
    pub percentage: f64,
    pub submitted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAnswer {
    pub submission_id: String,
    pub question_id: String,
    pub choice_id: Option<String>,
    pub is_correct: bool,
}

/// 클라이언트가 보낸 답안 하나. 형태 검사 전이므로 문항 ID도 Option입니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: Option<String>,
    pub choice_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

/// 제출 직후 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub id: String,
    pub score: i64,
    pub total_questions: i64,
    pub percentage: f64,
    pub submitted_at: String,
}

impl From<Submission> for SubmissionResult {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            score: submission.score,
            total_questions: submission.total_questions,
            percentage: submission.percentage,
            submitted_at: submission.submitted_at,
        }
    }
}

/// 제출 후 리뷰. 이때만 정답이 공개됩니다.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReview {
    pub submission: Submission,
    pub answers: Vec<SubmissionAnswer>,
    pub assessment: AssessmentDetail,
}
