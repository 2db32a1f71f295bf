//! # 강좌 및 세션 데이터베이스 쿼리 모듈
//!
//! `courses`와 `sessions` 테이블을 다룹니다.
//!
//! 세션의 `sort_order`는 항상 `0..n-1`로 빈틈없이 유지됩니다.
//! 세션을 추가하거나 삭제하면 같은 트랜잭션 안에서 날짜순으로 번호를 다시 매깁니다.

use crate::error::AppError;
use crate::models::*;
use crate::services::session_ordering::SessionOrdering;
use chrono::SecondsFormat;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, course_type, price, status, created_at, updated_at
        FROM courses
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(courses)
}

/// ID로 강좌 하나를 조회합니다. 트랜잭션 안에서도 쓸 수 있도록 executor를 받습니다.
pub async fn get_course<'e, E>(executor: E, id: &str) -> Result<Option<Course>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let course = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, course_type, price, status, created_at, updated_at
        FROM courses
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(course)
}

pub async fn create_course(pool: &SqlitePool, req: &CreateCourseRequest) -> Result<Course, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    let status = req.status.unwrap_or(CourseStatus::Draft);

    sqlx::query(
        r#"
        INSERT INTO courses (id, title, course_type, price, status)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(req.title.trim())
    .bind(req.course_type)
    .bind(req.price)
    .bind(status)
    .execute(pool)
    .await?;

    get_course(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created course".to_string()))
}

/// 보낸 필드만 업데이트합니다. 강좌가 없으면 `Ok(None)`
pub async fn update_course(
    pool: &SqlitePool,
    id: &str,
    req: &UpdateCourseRequest,
) -> Result<Option<Course>, AppError> {
    if get_course(pool, id).await?.is_none() {
        return Ok(None);
    }

    // COALESCE: 요청에 없는 필드(NULL)는 기존 값을 유지
    sqlx::query(
        r#"
        UPDATE courses
        SET title = COALESCE(?, title),
            price = COALESCE(?, price),
            status = COALESCE(?, status),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(req.title.as_deref().map(str::trim))
    .bind(req.price)
    .bind(req.status)
    .bind(id)
    .execute(pool)
    .await?;

    get_course(pool, id).await
}

// ── 세션 ──

pub async fn list_sessions<'e, E>(executor: E, course_id: &str) -> Result<Vec<Session>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let sessions = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, course_id, title, session_date, sort_order, created_at
        FROM sessions
        WHERE course_id = ?
        ORDER BY sort_order, session_date
        "#,
    )
    .bind(course_id)
    .fetch_all(executor)
    .await?;

    Ok(sessions)
}

pub async fn session_ordering<'e, E>(executor: E, course_id: &str) -> Result<SessionOrdering, AppError>
where
    E: SqliteExecutor<'e>,
{
    Ok(SessionOrdering::new(list_sessions(executor, course_id).await?))
}

pub async fn get_session(pool: &SqlitePool, id: &str) -> Result<Option<Session>, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, course_id, title, session_date, sort_order, created_at
        FROM sessions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// 새 순서를 DB에 반영합니다. 호출자가 트랜잭션을 열어 둔 상태여야 합니다.
async fn apply_order(conn: &mut SqliteConnection, sessions: &[Session]) -> Result<(), AppError> {
    for session in sessions {
        sqlx::query("UPDATE sessions SET sort_order = ? WHERE id = ?")
            .bind(session.sort_order)
            .bind(&session.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// 세션을 추가하고 날짜순으로 번호를 다시 매깁니다.
pub async fn add_session(
    pool: &SqlitePool,
    course_id: &str,
    req: &CreateSessionRequest,
) -> Result<Session, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    // 밀리초까지 고정된 형식이라 문자열 정렬 = 시간 정렬
    let date = req.date.to_rfc3339_opts(SecondsFormat::Millis, true);
    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let mut tx = pool.begin().await?;

    // 우선 맨 뒤에 넣고, 아래에서 날짜순으로 다시 정렬합니다.
    sqlx::query(
        r#"
        INSERT INTO sessions (id, course_id, title, session_date, sort_order)
        VALUES (?, ?, ?, ?, (SELECT COUNT(*) FROM sessions WHERE course_id = ?))
        "#,
    )
    .bind(&id)
    .bind(course_id)
    .bind(title)
    .bind(&date)
    .bind(course_id)
    .execute(&mut *tx)
    .await?;

    let renumbered = session_ordering(&mut *tx, course_id).await?.renumbered();
    apply_order(&mut tx, &renumbered).await?;
    tx.commit().await?;

    renumbered
        .into_iter()
        .find(|s| s.id == id)
        .ok_or(AppError::Internal("Failed to retrieve created session".to_string()))
}

/// 세션을 삭제하고 남은 세션의 번호를 `0..n-1`로 다시 매깁니다.
///
/// 접근 구간의 시작/끝으로 쓰이는 세션은 지울 수 없습니다 (409).
/// 전체 수강 권한이 있는 강좌의 마지막 세션도 마찬가지입니다.
/// 반환값: 삭제되었으면 true, 세션이 없으면 false
pub async fn delete_session(pool: &SqlitePool, session_id: &str) -> Result<bool, AppError> {
    let Some(session) = get_session(pool, session_id).await? else {
        return Ok(false);
    };

    let mut tx = pool.begin().await?;

    // 강좌 행을 먼저 갱신해 같은 강좌의 세션 변경을 직렬화합니다.
    sqlx::query("UPDATE courses SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?")
        .bind(&session.course_id)
        .execute(&mut *tx)
        .await?;

    let references: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM access_windows
        WHERE start_session_id = ? OR end_session_id = ?
        "#,
    )
    .bind(session_id)
    .bind(session_id)
    .fetch_one(&mut *tx)
    .await?;

    if references > 0 {
        return Err(AppError::Conflict(format!(
            "Session is a boundary of {references} access window(s)"
        )));
    }

    let ordering = session_ordering(&mut *tx, &session.course_id).await?;
    let remaining = ordering.without(session_id)?;

    // 전체 수강 권한은 세션 ID를 저장하지 않으므로 마지막 세션만은 따로 막습니다.
    if remaining.is_empty() {
        let full_grants: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM access_windows w
            JOIN enrollments e ON e.id = w.enrollment_id
            WHERE e.course_id = ? AND w.access_type = 'full'
            "#,
        )
        .bind(&session.course_id)
        .fetch_one(&mut *tx)
        .await?;

        if full_grants > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete the last session while {full_grants} full access grant(s) exist"
            )));
        }
    }

    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(&mut *tx)
        .await?;
    apply_order(&mut tx, &remaining).await?;

    tx.commit().await?;
    Ok(true)
}
