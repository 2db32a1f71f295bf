//! # 수강 신청 데이터베이스 쿼리 모듈
//!
//! 학생이 신청하면 `pending`, 관리자가 승인하면 `approved`가 됩니다.
//! 라이브 강좌는 승인과 동시에 접근 권한(전체/부분/중도 합류)이 같은 트랜잭션에서 저장됩니다.

use crate::db::access_windows::{existing_ranges, insert_window, list_window_views, list_windows};
use crate::db::courses::{get_course, session_ordering};
use crate::db::is_unique_violation;
use crate::error::AppError;
use crate::models::*;
use crate::services::access_window::{self, AccessGrant, AccessType};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const ENROLLMENT_COLUMNS: &str =
    "id, student_id, course_id, status, window_version, created_at, updated_at";

pub async fn get_enrollment<'e, E>(executor: E, id: &str) -> Result<Option<Enrollment>, AppError>
where
    E: SqliteExecutor<'e>,
{
    let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(enrollment)
}

/// 상태로 거를 수 있는 목록 (최근 신청 먼저)
pub async fn list_enrollments(
    pool: &SqlitePool,
    status: Option<EnrollmentStatus>,
) -> Result<Vec<Enrollment>, AppError> {
    let enrollments = sqlx::query_as::<_, Enrollment>(&format!(
        r#"
        SELECT {ENROLLMENT_COLUMNS}
        FROM enrollments
        WHERE (?1 IS NULL OR status = ?1)
        ORDER BY created_at DESC
        "#
    ))
    .bind(status)
    .fetch_all(pool)
    .await?;

    Ok(enrollments)
}

/// 학생의 수강 신청. 같은 강좌에 두 번 신청하면 409
pub async fn create_enrollment(
    pool: &SqlitePool,
    student_id: &str,
    course_id: &str,
) -> Result<Enrollment, AppError> {
    let course = get_course(pool, course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    if course.status != CourseStatus::Published {
        return Err(AppError::Validation(
            "Only published courses accept enrollments".to_string(),
        ));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let inserted = sqlx::query_as::<_, Enrollment>(&format!(
        r#"
        INSERT INTO enrollments (id, student_id, course_id)
        VALUES (?, ?, ?)
        RETURNING {ENROLLMENT_COLUMNS}
        "#
    ))
    .bind(&id)
    .bind(student_id)
    .bind(course_id)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(enrollment) => Ok(enrollment),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(
            "Student is already enrolled in this course".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// 트랜잭션의 첫 문장으로 호출해 수강 신청 행에 쓰기 잠금을 잡습니다.
///
/// `window_version`을 올리면서 행을 돌려주므로, 잠금을 잡은 뒤의 최신 상태를 바로 쓸 수 있습니다.
pub(crate) async fn claim_enrollment(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Enrollment, AppError> {
    sqlx::query_as::<_, Enrollment>(&format!(
        r#"
        UPDATE enrollments
        SET window_version = window_version + 1,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        RETURNING {ENROLLMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Enrollment"))
}

async fn set_status(
    conn: &mut SqliteConnection,
    id: &str,
    status: EnrollmentStatus,
) -> Result<Enrollment, AppError> {
    let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
        r#"
        UPDATE enrollments
        SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        RETURNING {ENROLLMENT_COLUMNS}
        "#
    ))
    .bind(status)
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(enrollment)
}

fn ensure_pending(enrollment: &Enrollment) -> Result<(), AppError> {
    if enrollment.status != EnrollmentStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Enrollment is already {:?}",
            enrollment.status
        )));
    }
    Ok(())
}

/// 수강 신청을 승인합니다.
///
/// - 완료 강좌: 강좌 유형 자체가 전체 수강이므로 구간을 만들지 않습니다.
/// - 라이브 강좌: 요청한 권한을 계산해 저장합니다. 유형을 생략하면 전체 수강이지만,
///   승인 전에 이미 만들어 둔 구간이 있으면 그 구간만 유지합니다.
pub async fn approve_enrollment(
    pool: &SqlitePool,
    id: &str,
    req: &ApproveEnrollmentRequest,
) -> Result<EnrollmentView, AppError> {
    let mut tx = pool.begin().await?;

    let enrollment = claim_enrollment(&mut tx, id).await?;
    ensure_pending(&enrollment)?;

    let course = get_course(&mut *tx, &enrollment.course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;

    match course.course_type {
        CourseType::Finished => {
            if req.access_type.is_some() {
                tracing::debug!("Finished course {} ignores requested access type", course.id);
            }
        }
        CourseType::Live => {
            let prepared = !list_windows(&mut *tx, id).await?.is_empty();
            let access_type = match req.access_type {
                Some(access_type) => Some(access_type),
                None if prepared => None,
                None => Some(AccessType::Full),
            };

            if let Some(access_type) = access_type {
                let ordering = session_ordering(&mut *tx, &course.id).await?;
                let grant = AccessGrant::from_parts(
                    access_type,
                    req.start_session_id.clone(),
                    req.end_session_id.clone(),
                )?;
                let existing = existing_ranges(&mut tx, id, &ordering, None).await?;
                let computation = access_window::calculate(
                    &ordering,
                    &grant,
                    course.price,
                    req.pricing_template,
                    &existing,
                )?;
                insert_window(&mut tx, id, &grant, computation.quote.template).await?;
            }
        }
    }

    let enrollment = set_status(&mut tx, id, EnrollmentStatus::Approved).await?;
    tx.commit().await?;

    tracing::info!("Enrollment {} approved", id);

    let access_windows = list_window_views(pool, &enrollment).await?;
    Ok(EnrollmentView {
        enrollment,
        access_windows,
    })
}

/// 대기 중인 신청만 거절할 수 있습니다. 만들어 둔 구간은 함께 지웁니다.
pub async fn reject_enrollment(pool: &SqlitePool, id: &str) -> Result<Enrollment, AppError> {
    let mut tx = pool.begin().await?;

    let enrollment = claim_enrollment(&mut tx, id).await?;
    ensure_pending(&enrollment)?;

    sqlx::query("DELETE FROM access_windows WHERE enrollment_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let enrollment = set_status(&mut tx, id, EnrollmentStatus::Rejected).await?;

    tx.commit().await?;
    Ok(enrollment)
}

/// 학생이 볼 수 있는 세션 목록.
///
/// 완료 강좌는 모든 세션, 라이브 강좌는 구간들의 합집합입니다.
/// 같은 수강 신청의 구간은 겹치지 않으므로 인덱스 순으로 이어 붙이기만 하면 됩니다.
pub async fn accessible_sessions(
    pool: &SqlitePool,
    enrollment: &Enrollment,
) -> Result<Vec<SessionView>, AppError> {
    if enrollment.status != EnrollmentStatus::Approved {
        return Err(AppError::Forbidden(
            "Enrollment has not been approved".to_string(),
        ));
    }

    let course = get_course(pool, &enrollment.course_id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    let ordering = session_ordering(pool, &course.id).await?;

    if course.course_type == CourseType::Finished {
        return Ok(session_views(&ordering, None));
    }

    let mut ranges = list_windows(pool, &enrollment.id)
        .await?
        .iter()
        .map(|w| -> Result<_, AppError> { Ok(w.grant()?.resolve(&ordering)?) })
        .collect::<Result<Vec<_>, _>>()?;
    ranges.sort_by_key(|range| range.start);

    Ok(ranges
        .into_iter()
        .flat_map(|range| session_views(&ordering, Some(range)))
        .collect())
}
