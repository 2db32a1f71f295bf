//! # 평가(Assessment) 모델
//!
//! 테스트(시간 제한 있음)와 숙제(시간 제한 없음)는 같은 구조를 가집니다.
//!
//! ```text
//! Assessment ─┬─ Passage (지문) ─┬─ Question (문항) ─── Choice × 4 (정답 1개)
//!             └─ Passage ...     └─ Question ...
//! ```
//!
//! 생성 요청은 `validator`로 검사합니다. 길이/범위 같은 필드 규칙은 derive 속성으로,
//! "선택지 4개 중 정답 정확히 1개" 같은 구조 규칙은 아래의 custom 함수로 표현합니다.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AssessmentKind {
    Test,
    Homework,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub kind: AssessmentKind,
    pub title: String,
    pub instructions: String,
    /// 분 단위. None이면 시간 제한 없음
    pub duration: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Passage {
    pub id: String,
    pub assessment_id: String,
    pub title: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub passage_id: String,
    pub question_text: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    pub question_id: String,
    pub choice_text: String,
    pub is_correct: bool,
    pub sort_order: i64,
}

/// 목록 조회용 요약
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub id: String,
    pub kind: AssessmentKind,
    pub title: String,
    pub duration: Option<i64>,
    pub question_count: i64,
    pub created_at: String,
}

// ── 조회용 트리 ──

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassageDetail {
    #[serde(flatten)]
    pub passage: Passage,
    pub questions: Vec<QuestionDetail>,
}

/// 평가 전체 트리 (정답 포함). 관리자 조회와 제출 후 리뷰에서만 내보냅니다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDetail {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub passages: Vec<PassageDetail>,
}

impl AssessmentDetail {
    /// 지문 구분 없이 모든 문항을 순서대로 순회합니다.
    pub fn questions(&self) -> impl Iterator<Item = &QuestionDetail> {
        self.passages.iter().flat_map(|p| p.questions.iter())
    }

    pub fn question_count(&self) -> usize {
        self.passages.iter().map(|p| p.questions.len()).sum()
    }

    /// 응시용 사본. 선택지에서 정답 표시를 아예 뺍니다.
    pub fn without_answers(&self) -> StudentAssessment {
        StudentAssessment {
            assessment: self.assessment.clone(),
            passages: self
                .passages
                .iter()
                .map(|p| StudentPassage {
                    passage: p.passage.clone(),
                    questions: p
                        .questions
                        .iter()
                        .map(|q| StudentQuestion {
                            question: q.question.clone(),
                            choices: q
                                .choices
                                .iter()
                                .map(|c| StudentChoice {
                                    id: c.id.clone(),
                                    choice_text: c.choice_text.clone(),
                                    sort_order: c.sort_order,
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

// ── 응시용 트리 (정답 없음) ──

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentChoice {
    pub id: String,
    pub choice_text: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuestion {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<StudentChoice>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPassage {
    #[serde(flatten)]
    pub passage: Passage,
    pub questions: Vec<StudentQuestion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAssessment {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub passages: Vec<StudentPassage>,
}

// ── 생성 요청 ──

/// `POST /admin/assessments` 본문
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_duration_for_kind", skip_on_field_errors = false))]
pub struct CreateAssessmentRequest {
    pub kind: AssessmentKind,
    #[validate(length(min = 3, max = 255, message = "Title must be between 3 and 255 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Instructions must be at most 2000 characters"))]
    pub instructions: String,
    #[validate(range(min = 1, max = 300, message = "Duration must be between 1 and 300 minutes"))]
    pub duration: Option<i64>,
    #[validate(length(min = 1, message = "At least one passage is required"), nested)]
    pub passages: Vec<NewPassage>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPassage {
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Passage content is required"))]
    pub content: String,
    pub image_url: Option<String>,
    #[validate(length(min = 1, message = "Each passage needs at least one question"), nested)]
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    #[validate(length(min = 1, message = "Question text is required"))]
    pub question_text: String,
    #[validate(
        length(equal = 4, message = "Each question must have exactly 4 choices"),
        custom(function = "exactly_one_correct"),
        nested
    )]
    pub choices: Vec<NewChoice>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewChoice {
    #[validate(length(min = 1, message = "Choice text is required"))]
    pub choice_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

#[allow(clippy::ptr_arg)]
fn exactly_one_correct(choices: &Vec<NewChoice>) -> Result<(), ValidationError> {
    match choices.iter().filter(|c| c.is_correct).count() {
        1 => Ok(()),
        0 => Err(violation(
            "single_correct_choice",
            "Each question must have exactly 1 correct choice (found none)",
        )),
        _ => Err(violation(
            "single_correct_choice",
            "Each question must have exactly 1 correct choice (found several)",
        )),
    }
}

/// 숙제는 시간 제한을 가질 수 없습니다.
fn validate_duration_for_kind(req: &CreateAssessmentRequest) -> Result<(), ValidationError> {
    if req.kind == AssessmentKind::Homework && req.duration.is_some() {
        return Err(violation(
            "homework_duration",
            "Homework is untimed and cannot have a duration",
        ));
    }
    Ok(())
}
