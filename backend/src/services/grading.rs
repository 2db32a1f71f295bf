//! # 자동 채점(Auto-Grading)
//!
//! 제출된 답안을 평가의 정답과 비교해 점수와 백분율을 계산합니다.
//!
//! - 총 문항 수는 모든 지문(passage)의 문항을 합친 값입니다.
//! - 문항마다 제출한 선택지가 그 문항의 정답(`is_correct`)이면 1점.
//! - 미응답(`choiceId: null`)이나 다른 문항의 선택지는 오답으로 처리하고,
//!   제출 전체를 실패시키지 않습니다.
//! - 백분율은 반올림하지 않습니다 (표시 계층에서 처리).

use crate::models::AssessmentDetail;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GradingError {
    #[error("Assessment has no questions to grade")]
    NoQuestions,
}

/// 형식 검사를 통과한 답안 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub choice_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub question_id: String,
    pub choice_id: Option<String>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub score: i64,
    pub total_questions: i64,
    pub percentage: f64,
    /// 평가의 모든 문항에 대한 채점 결과 (제출하지 않은 문항은 미응답)
    pub answers: Vec<GradedAnswer>,
}

pub fn grade(
    assessment: &AssessmentDetail,
    answers: &[SubmittedAnswer],
) -> Result<GradeReport, GradingError> {
    let submitted: HashMap<&str, Option<&str>> = answers
        .iter()
        .map(|a| (a.question_id.as_str(), a.choice_id.as_deref()))
        .collect();

    let mut graded = Vec::new();
    for question in assessment.questions() {
        let choice_id = submitted
            .get(question.question.id.as_str())
            .copied()
            .flatten();
        // 이 문항에 속한 선택지일 때만 정답 여부를 봅니다.
        let is_correct = choice_id
            .and_then(|id| question.choices.iter().find(|c| c.id == id))
            .is_some_and(|c| c.is_correct);

        graded.push(GradedAnswer {
            question_id: question.question.id.clone(),
            choice_id: choice_id.map(str::to_string),
            is_correct,
        });
    }

    if graded.is_empty() {
        return Err(GradingError::NoQuestions);
    }

    let total_questions = graded.len() as i64;
    let score = graded.iter().filter(|a| a.is_correct).count() as i64;

    Ok(GradeReport {
        score,
        total_questions,
        percentage: score as f64 / total_questions as f64 * 100.0,
        answers: graded,
    })
}
