//! # 접근 구간 데이터베이스 쿼리 모듈
//!
//! 구간을 쓰는 모든 작업은 같은 순서를 따릅니다.
//!
//! 1. 트랜잭션을 열고 **가장 먼저** `claim_enrollment`로 수강 신청 행을 갱신합니다.
//!    SQLite는 첫 쓰기에서 쓰기 잠금을 잡으므로, 같은 수강 신청에 대한 다른 쓰기 요청은
//!    여기서 기다리게 됩니다.
//! 2. 잠금을 잡은 상태에서 기존 구간을 읽어 충돌을 검사합니다.
//! 3. 저장하고 커밋합니다. 중간에 실패하면 트랜잭션이 drop되며 롤백됩니다.
//!
//! 이렇게 하면 겹치는 두 요청이 동시에 와도 하나만 성공하고 나머지는 409를 받습니다.

use crate::db::courses::{get_course, session_ordering};
use crate::db::enrollments::{claim_enrollment, get_enrollment};
use crate::error::AppError;
use crate::models::*;
use crate::services::access_window::{self, AccessGrant, AccessType};
use crate::services::pricing::PricingTemplate;
use crate::services::session_ordering::{IndexRange, SessionOrdering};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const WINDOW_COLUMNS: &str =
    "id, enrollment_id, access_type, start_session_id, end_session_id, pricing_template, created_at, updated_at";

pub async fn list_windows<'e, E>(executor: E, enrollment_id: &str) -> Result<Vec<AccessWindow>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let windows = sqlx::query_as::<_, AccessWindow>(&format!(
        "SELECT {WINDOW_COLUMNS} FROM access_windows WHERE enrollment_id = ? ORDER BY created_at, id"
    ))
    .bind(enrollment_id)
    .fetch_all(executor)
    .await?;

    Ok(windows)
}

pub async fn get_window<'e, E>(executor: E, id: &str) -> Result<Option<AccessWindow>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let window = sqlx::query_as::<_, AccessWindow>(&format!(
        "SELECT {WINDOW_COLUMNS} FROM access_windows WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(window)
}

/// 같은 수강 신청의 기존 구간을 인덱스 범위로 풉니다. `exclude`는 수정 중인 구간 자신
pub(crate) async fn existing_ranges(
    conn: &mut SqliteConnection,
    enrollment_id: &str,
    ordering: &SessionOrdering,
    exclude: Option<&str>,
) -> Result<Vec<IndexRange>, AppError> {
    let windows = list_windows(&mut *conn, enrollment_id).await?;

    windows
        .iter()
        .filter(|w| Some(w.id.as_str()) != exclude)
        .map(|w| -> Result<IndexRange, AppError> { Ok(w.grant()?.resolve(ordering)?) })
        .collect()
}

/// 계산이 끝난 권한을 저장합니다. 충돌 검사는 호출자가 이미 끝낸 상태여야 합니다.
pub(crate) async fn insert_window(
    conn: &mut SqliteConnection,
    enrollment_id: &str,
    grant: &AccessGrant,
    template: PricingTemplate,
) -> Result<AccessWindow, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    let window = sqlx::query_as::<_, AccessWindow>(&format!(
        r#"
        INSERT INTO access_windows (id, enrollment_id, access_type, start_session_id, end_session_id, pricing_template)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {WINDOW_COLUMNS}
        "#
    ))
    .bind(&id)
    .bind(enrollment_id)
    .bind(grant.access_type())
    .bind(grant.start_session_id())
    .bind(grant.stored_end_session_id())
    .bind(template)
    .fetch_one(&mut *conn)
    .await?;

    Ok(window)
}

/// 라이브 강좌만 구간을 가질 수 있습니다.
fn ensure_live(course: &Course) -> Result<(), AppError> {
    if course.course_type != CourseType::Live {
        return Err(AppError::Validation(
            "Access windows apply to live courses only".to_string(),
        ));
    }
    Ok(())
}

/// 저장된 구간 하나를 응답 형태로 다시 계산합니다.
pub(crate) fn window_view(
    window: &AccessWindow,
    course: &Course,
    ordering: &SessionOrdering,
) -> Result<AccessWindowView, AppError> {
    let grant = window.grant()?;
    let computation =
        access_window::compute(ordering, &grant, course.price, Some(window.pricing_template))?;
    Ok(AccessWindowView::new(window, &grant, ordering, &computation))
}

/// 수강 신청에 구간을 추가합니다.
pub async fn create_window(
    pool: &SqlitePool,
    enrollment_id: &str,
    req: &CreateAccessWindowRequest,
) -> Result<AccessWindowView, AppError> {
    let mut tx = pool.begin().await?;

    let enrollment = claim_enrollment(&mut tx, enrollment_id).await?;
    if enrollment.status == EnrollmentStatus::Rejected {
        return Err(AppError::Validation(
            "Cannot grant access to a rejected enrollment".to_string(),
        ));
    }

    let course = get_course(&mut *tx, &enrollment.course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    ensure_live(&course)?;

    let ordering = session_ordering(&mut *tx, &course.id).await?;
    let grant = AccessGrant::from_parts(
        req.access_type.unwrap_or(AccessType::Partial),
        req.start_session_id.clone(),
        req.end_session_id.clone(),
    )?;
    let existing = existing_ranges(&mut tx, enrollment_id, &ordering, None).await?;
    let computation = access_window::calculate(
        &ordering,
        &grant,
        course.price,
        req.pricing_template,
        &existing,
    )?;

    let window = insert_window(&mut tx, enrollment_id, &grant, computation.quote.template).await?;
    tx.commit().await?;

    tracing::info!(
        "Access window {} created for enrollment {} (sessions {}..={})",
        window.id,
        enrollment_id,
        computation.range.start,
        computation.range.end
    );

    Ok(AccessWindowView::new(&window, &grant, &ordering, &computation))
}

/// 보낸 값만 바꾼 뒤 충돌 검사와 가격 계산을 다시 합니다.
/// 구간이 없으면 `Ok(None)`
pub async fn update_window(
    pool: &SqlitePool,
    id: &str,
    req: &UpdateAccessWindowRequest,
) -> Result<Option<AccessWindowView>, AppError> {
    let Some(window) = get_window(pool, id).await? else {
        return Ok(None);
    };

    let mut tx = pool.begin().await?;
    claim_enrollment(&mut tx, &window.enrollment_id).await?;

    // 잠금을 잡기 전에 지워졌을 수 있음
    let Some(window) = get_window(&mut *tx, id).await? else {
        return Ok(None);
    };

    let enrollment = get_enrollment(&mut *tx, &window.enrollment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Enrollment"))?;
    let course = get_course(&mut *tx, &enrollment.course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    let ordering = session_ordering(&mut *tx, &course.id).await?;

    let grant = match window.grant()? {
        AccessGrant::Full => {
            if req.start_session_id.is_some() || req.end_session_id.is_some() {
                return Err(AppError::Validation(
                    "A full access window has no sessions to change".to_string(),
                ));
            }
            AccessGrant::Full
        }
        AccessGrant::Partial {
            start_session_id,
            end_session_id,
        } => AccessGrant::Partial {
            start_session_id: req.start_session_id.clone().unwrap_or(start_session_id),
            end_session_id: req.end_session_id.clone().unwrap_or(end_session_id),
        },
        AccessGrant::LateJoin { start_session_id } => {
            if req.end_session_id.is_some() {
                tracing::debug!("Ignoring endSessionId for late_join window {}", id);
            }
            AccessGrant::LateJoin {
                start_session_id: req.start_session_id.clone().unwrap_or(start_session_id),
            }
        }
    };
    let template = req.pricing_template.unwrap_or(window.pricing_template);

    let existing = existing_ranges(&mut tx, &window.enrollment_id, &ordering, Some(id)).await?;
    let computation =
        access_window::calculate(&ordering, &grant, course.price, Some(template), &existing)?;

    let updated = sqlx::query_as::<_, AccessWindow>(&format!(
        r#"
        UPDATE access_windows
        SET start_session_id = ?,
            end_session_id = ?,
            pricing_template = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        RETURNING {WINDOW_COLUMNS}
        "#
    ))
    .bind(grant.start_session_id())
    .bind(grant.stored_end_session_id())
    .bind(computation.quote.template)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(AccessWindowView::new(&updated, &grant, &ordering, &computation)))
}

/// 반환값: 삭제되었으면 true, 구간이 없으면 false
pub async fn delete_window(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let Some(window) = get_window(pool, id).await? else {
        return Ok(false);
    };

    let mut tx = pool.begin().await?;
    claim_enrollment(&mut tx, &window.enrollment_id).await?;

    let result = sqlx::query("DELETE FROM access_windows WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

/// 수강 신청의 구간 목록. 세션 수, 접근 가능한 세션, 가격이 채워져 있습니다.
pub async fn list_window_views(
    pool: &SqlitePool,
    enrollment: &Enrollment,
) -> Result<Vec<AccessWindowView>, AppError> {
    let course = get_course(pool, &enrollment.course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    let ordering = session_ordering(pool, &course.id).await?;

    list_windows(pool, &enrollment.id)
        .await?
        .iter()
        .map(|window| window_view(window, &course, &ordering))
        .collect()
}

/// 저장 없이 가격만 계산합니다. 충돌 검사는 하지 않습니다.
pub async fn quote(
    pool: &SqlitePool,
    course_id: &str,
    req: &QuoteRequest,
) -> Result<Option<AccessQuoteView>, AppError> {
    let Some(course) = get_course(pool, course_id).await? else {
        return Ok(None);
    };
    ensure_live(&course)?;

    let ordering = session_ordering(pool, course_id).await?;
    let grant = AccessGrant::from_parts(
        req.access_type,
        req.start_session_id.clone(),
        req.end_session_id.clone(),
    )?;
    let computation = access_window::compute(&ordering, &grant, course.price, req.pricing_template)?;

    Ok(Some(AccessQuoteView::new(&ordering, &computation)))
}
