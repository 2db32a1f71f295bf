//! # 제출 검사(Submission Guard)
//!
//! 채점 전에 답안 목록의 형태를 검사합니다. 검사 순서:
//! 1. 같은 (학생, 평가) 제출이 이미 있으면 거절: DB 트랜잭션 안에서 확인 (`db::submissions`)
//! 2. 답안이 비어 있으면 거절
//! 3. 문항 ID가 없거나 형식이 틀리거나 평가에 없는 문항이면 거절
//!
//! 통과한 답안만 `grading::grade`로 넘어갑니다.

use crate::models::{AnswerInput, AssessmentDetail};
use crate::services::grading::SubmittedAnswer;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionRejection {
    #[error("A submission for this assessment already exists")]
    DuplicateSubmission,

    #[error("At least one answer is required")]
    EmptyAnswers,

    #[error("Invalid answer: {0}")]
    InvalidAnswerShape(String),
}

pub fn check_answers(
    assessment: &AssessmentDetail,
    answers: &[AnswerInput],
) -> Result<Vec<SubmittedAnswer>, SubmissionRejection> {
    if answers.is_empty() {
        return Err(SubmissionRejection::EmptyAnswers);
    }

    let known: HashSet<&str> = assessment
        .questions()
        .map(|q| q.question.id.as_str())
        .collect();
    let mut seen = HashSet::new();
    let mut checked = Vec::with_capacity(answers.len());

    for (index, answer) in answers.iter().enumerate() {
        let question_id = answer.question_id.as_deref().ok_or_else(|| {
            SubmissionRejection::InvalidAnswerShape(format!("answers[{index}] has no questionId"))
        })?;

        if uuid::Uuid::parse_str(question_id).is_err() {
            return Err(SubmissionRejection::InvalidAnswerShape(format!(
                "answers[{index}].questionId is not a valid id"
            )));
        }
        if !known.contains(question_id) {
            return Err(SubmissionRejection::InvalidAnswerShape(format!(
                "question {question_id} is not part of this assessment"
            )));
        }
        if !seen.insert(question_id) {
            return Err(SubmissionRejection::InvalidAnswerShape(format!(
                "question {question_id} is answered more than once"
            )));
        }

        checked.push(SubmittedAnswer {
            question_id: question_id.to_string(),
            choice_id: answer.choice_id.clone(),
        });
    }

    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assessment, AssessmentKind, Passage, PassageDetail, Question, QuestionDetail};

    const Q1: &str = "01950000-0000-7000-8000-000000000001";
    const Q2: &str = "01950000-0000-7000-8000-000000000002";
    const OTHER: &str = "01950000-0000-7000-8000-0000000000ff";

    fn detail() -> AssessmentDetail {
        let question = |id: &str, order| QuestionDetail {
            question: Question {
                id: id.to_string(),
                passage_id: "p".to_string(),
                question_text: "?".to_string(),
                sort_order: order,
            },
            choices: vec![],
        };
        AssessmentDetail {
            assessment: Assessment {
                id: "a".to_string(),
                kind: AssessmentKind::Test,
                title: "Mock".to_string(),
                instructions: String::new(),
                duration: Some(60),
                created_at: "2026-01-01T00:00:00.000Z".to_string(),
            },
            passages: vec![PassageDetail {
                passage: Passage {
                    id: "p".to_string(),
                    assessment_id: "a".to_string(),
                    title: None,
                    content: "text".to_string(),
                    image_url: None,
                    sort_order: 0,
                },
                questions: vec![question(Q1, 0), question(Q2, 1)],
            }],
        }
    }

    fn input(question_id: Option<&str>, choice_id: Option<&str>) -> AnswerInput {
        AnswerInput {
            question_id: question_id.map(str::to_string),
            choice_id: choice_id.map(str::to_string),
        }
    }

    #[test]
    fn empty_answers_are_rejected() {
        assert_eq!(
            check_answers(&detail(), &[]),
            Err(SubmissionRejection::EmptyAnswers)
        );
    }

    #[test]
    fn missing_or_malformed_question_id_is_rejected() {
        assert!(matches!(
            check_answers(&detail(), &[input(None, Some("x"))]),
            Err(SubmissionRejection::InvalidAnswerShape(_))
        ));
        assert!(matches!(
            check_answers(&detail(), &[input(Some("not-a-uuid"), None)]),
            Err(SubmissionRejection::InvalidAnswerShape(_))
        ));
    }

    #[test]
    fn unknown_question_is_rejected() {
        assert!(matches!(
            check_answers(&detail(), &[input(Some(OTHER), None)]),
            Err(SubmissionRejection::InvalidAnswerShape(_))
        ));
    }

    #[test]
    fn repeated_question_is_rejected() {
        assert!(matches!(
            check_answers(&detail(), &[input(Some(Q1), None), input(Some(Q1), Some("c"))]),
            Err(SubmissionRejection::InvalidAnswerShape(_))
        ));
    }

    #[test]
    fn valid_answers_pass_through_with_nulls() {
        let checked =
            check_answers(&detail(), &[input(Some(Q1), Some("c1")), input(Some(Q2), None)]).unwrap();
        assert_eq!(checked.len(), 2);
        assert_eq!(checked[1].choice_id, None);
    }
}
