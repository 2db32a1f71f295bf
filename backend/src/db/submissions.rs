//! # 제출 데이터베이스 쿼리 모듈
//!
//! 한 학생은 한 평가에 한 번만 제출할 수 있습니다.
//! 트랜잭션 밖의 존재 확인은 빠른 거절용이고, 실제 보장은 `UNIQUE(student_id, assessment_id)`가 합니다.
//! 동시에 두 번 제출하면 늦게 INSERT한 쪽이 제약 위반으로 실패하고 `DuplicateSubmission`을 받습니다.

use crate::db::assessments::get_assessment_detail;
use crate::db::is_unique_violation;
use crate::error::AppError;
use crate::models::*;
use crate::services::grading;
use crate::services::submission_guard::{self, SubmissionRejection};
use sqlx::{SqliteExecutor, SqlitePool};

const SUBMISSION_COLUMNS: &str =
    "id, student_id, assessment_id, score, total_questions, percentage, submitted_at";

pub async fn find_submission<'e, E>(
    executor: E,
    student_id: &str,
    assessment_id: &str,
) -> Result<Option<Submission>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let submission = sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE student_id = ? AND assessment_id = ?"
    ))
    .bind(student_id)
    .bind(assessment_id)
    .fetch_optional(executor)
    .await?;

    Ok(submission)
}

/// 답안을 검사하고 채점한 뒤 제출과 답안 전체를 한 트랜잭션으로 저장합니다.
pub async fn create_submission(
    pool: &SqlitePool,
    student_id: &str,
    assessment_id: &str,
    answers: &[AnswerInput],
) -> Result<Submission, AppError> {
    let assessment = get_assessment_detail(pool, assessment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Assessment"))?;

    if find_submission(pool, student_id, assessment_id).await?.is_some() {
        return Err(SubmissionRejection::DuplicateSubmission.into());
    }

    let checked = submission_guard::check_answers(&assessment, answers)?;
    let report = grading::grade(&assessment, &checked)?;

    let id = uuid::Uuid::now_v7().to_string();
    let mut tx = pool.begin().await?;

    // 첫 문장이 INSERT라서 중복 여부가 곧바로 제약으로 판정됩니다.
    let inserted = sqlx::query_as::<_, Submission>(&format!(
        r#"
        INSERT INTO submissions (id, student_id, assessment_id, score, total_questions, percentage)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {SUBMISSION_COLUMNS}
        "#
    ))
    .bind(&id)
    .bind(student_id)
    .bind(assessment_id)
    .bind(report.score)
    .bind(report.total_questions)
    .bind(report.percentage)
    .fetch_one(&mut *tx)
    .await;

    let submission = match inserted {
        Ok(submission) => submission,
        Err(e) if is_unique_violation(&e) => {
            return Err(SubmissionRejection::DuplicateSubmission.into())
        }
        Err(e) => return Err(e.into()),
    };

    for answer in &report.answers {
        sqlx::query(
            r#"
            INSERT INTO submission_answers (submission_id, question_id, choice_id, is_correct)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&answer.question_id)
        .bind(answer.choice_id.as_deref())
        .bind(answer.is_correct)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Submission {} by {} scored {}/{}",
        submission.id,
        student_id,
        submission.score,
        submission.total_questions
    );

    Ok(submission)
}

pub async fn list_submission_answers(
    pool: &SqlitePool,
    submission_id: &str,
) -> Result<Vec<SubmissionAnswer>, AppError> {
    let answers = sqlx::query_as::<_, SubmissionAnswer>(
        r#"
        SELECT submission_id, question_id, choice_id, is_correct
        FROM submission_answers
        WHERE submission_id = ?
        "#,
    )
    .bind(submission_id)
    .fetch_all(pool)
    .await?;

    Ok(answers)
}

/// 제출 후 리뷰. 제출이 없으면 `Ok(None)`
pub async fn get_review(
    pool: &SqlitePool,
    student_id: &str,
    assessment_id: &str,
) -> Result<Option<SubmissionReview>, AppError> {
    let Some(submission) = find_submission(pool, student_id, assessment_id).await? else {
        return Ok(None);
    };

    let assessment = get_assessment_detail(pool, assessment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Assessment"))?;

    // 문항 순서대로 답안을 정렬
    let mut answers = list_submission_answers(pool, &submission.id).await?;
    let position: std::collections::HashMap<&str, usize> = assessment
        .questions()
        .enumerate()
        .map(|(index, q)| (q.question.id.as_str(), index))
        .collect();
    answers.sort_by_key(|a| position.get(a.question_id.as_str()).copied().unwrap_or(usize::MAX));

    Ok(Some(SubmissionReview {
        submission,
        answers,
        assessment,
    }))
}

/// 관리자용 평가별 제출 목록 (높은 점수 먼저)
pub async fn list_submissions(
    pool: &SqlitePool,
    assessment_id: &str,
) -> Result<Vec<Submission>, AppError> {
    let submissions = sqlx::query_as::<_, Submission>(&format!(
        r#"
        SELECT {SUBMISSION_COLUMNS}
        FROM submissions
        WHERE assessment_id = ?
        ORDER BY score DESC, submitted_at
        "#
    ))
    .bind(assessment_id)
    .fetch_all(pool)
    .await?;

    Ok(submissions)
}
