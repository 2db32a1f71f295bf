//! # 평가 데이터베이스 쿼리 모듈
//!
//! 평가 → 지문 → 문항 → 선택지 트리를 한 트랜잭션으로 저장하고,
//! 조회할 때는 테이블별로 한 번씩 읽어 메모리에서 트리를 다시 조립합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;
use std::collections::HashMap;

pub async fn list_assessments(pool: &SqlitePool) -> Result<Vec<AssessmentSummary>, AppError> {
    let assessments = sqlx::query_as::<_, AssessmentSummary>(
        r#"
        SELECT a.id, a.kind, a.title, a.duration, a.created_at,
               (SELECT COUNT(*)
                FROM questions q
                JOIN passages p ON p.id = q.passage_id
                WHERE p.assessment_id = a.id) AS question_count
        FROM assessments a
        ORDER BY a.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(assessments)
}

/// 검증을 통과한 요청을 저장합니다. 순서(`sort_order`)는 요청 안의 위치를 따릅니다.
pub async fn create_assessment(
    pool: &SqlitePool,
    req: &CreateAssessmentRequest,
) -> Result<AssessmentDetail, AppError> {
    let assessment_id = uuid::Uuid::now_v7().to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO assessments (id, kind, title, instructions, duration)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&assessment_id)
    .bind(req.kind)
    .bind(req.title.trim())
    .bind(req.instructions.trim())
    .bind(req.duration)
    .execute(&mut *tx)
    .await?;

    for (p_index, passage) in req.passages.iter().enumerate() {
        let passage_id = uuid::Uuid::now_v7().to_string();
        sqlx::query(
            r#"
            INSERT INTO passages (id, assessment_id, title, content, image_url, sort_order)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&passage_id)
        .bind(&assessment_id)
        .bind(passage.title.as_deref())
        .bind(&passage.content)
        .bind(passage.image_url.as_deref())
        .bind(p_index as i64)
        .execute(&mut *tx)
        .await?;

        for (q_index, question) in passage.questions.iter().enumerate() {
            let question_id = uuid::Uuid::now_v7().to_string();
            sqlx::query(
                r#"
                INSERT INTO questions (id, passage_id, question_text, sort_order)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&question_id)
            .bind(&passage_id)
            .bind(&question.question_text)
            .bind(q_index as i64)
            .execute(&mut *tx)
            .await?;

            for (c_index, choice) in question.choices.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO choices (id, question_id, choice_text, is_correct, sort_order)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(uuid::Uuid::now_v7().to_string())
                .bind(&question_id)
                .bind(&choice.choice_text)
                .bind(choice.is_correct)
                .bind(c_index as i64)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;

    tracing::info!(
        "Assessment {} created ({} passages)",
        assessment_id,
        req.passages.len()
    );

    get_assessment_detail(pool, &assessment_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created assessment".to_string()))
}

/// 정답 표시까지 포함한 전체 트리. 평가가 없으면 `Ok(None)`
pub async fn get_assessment_detail(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<AssessmentDetail>, AppError> {
    let Some(assessment) = sqlx::query_as::<_, Assessment>(
        "SELECT id, kind, title, instructions, duration, created_at FROM assessments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let passages = sqlx::query_as::<_, Passage>(
        r#"
        SELECT id, assessment_id, title, content, image_url, sort_order
        FROM passages
        WHERE assessment_id = ?
        ORDER BY sort_order
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT q.id, q.passage_id, q.question_text, q.sort_order
        FROM questions q
        JOIN passages p ON p.id = q.passage_id
        WHERE p.assessment_id = ?
        ORDER BY q.sort_order
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let choices = sqlx::query_as::<_, Choice>(
        r#"
        SELECT c.id, c.question_id, c.choice_text, c.is_correct, c.sort_order
        FROM choices c
        JOIN questions q ON q.id = c.question_id
        JOIN passages p ON p.id = q.passage_id
        WHERE p.assessment_id = ?
        ORDER BY c.sort_order
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    // 부모 ID별로 묶은 뒤 위에서부터 조립 (각 묶음은 sort_order 순서 유지)
    let mut choices_by_question: HashMap<String, Vec<Choice>> = HashMap::new();
    for choice in choices {
        choices_by_question
            .entry(choice.question_id.clone())
            .or_default()
            .push(choice);
    }

    let mut questions_by_passage: HashMap<String, Vec<QuestionDetail>> = HashMap::new();
    for question in questions {
        let choices = choices_by_question.remove(&question.id).unwrap_or_default();
        questions_by_passage
            .entry(question.passage_id.clone())
            .or_default()
            .push(QuestionDetail { question, choices });
    }

    let passages = passages
        .into_iter()
        .map(|passage| PassageDetail {
            questions: questions_by_passage.remove(&passage.id).unwrap_or_default(),
            passage,
        })
        .collect();

    Ok(Some(AssessmentDetail {
        assessment,
        passages,
    }))
}

/// 반환값: 삭제되었으면 true. 지문, 문항, 제출 기록은 CASCADE로 함께 삭제됩니다.
pub async fn delete_assessment(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM assessments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
