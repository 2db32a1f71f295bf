//! # 강좌와 세션 모델
//!
//! 강좌는 `live`(세션 일정이 있는 라이브 강좌)와 `finished`(녹화 완료 강좌) 두 종류입니다.
//! 세션은 라이브 강좌에서만 의미가 있고, `sort_order`로 순서가 정해집니다.

use crate::services::session_ordering::{IndexRange, SessionOrdering};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CourseType {
    Live,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CourseStatus {
    Draft,
    Published,
    Archived,
}

/// 강좌 엔티티: `courses` 테이블 한 행
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub course_type: CourseType,
    /// 라이브 강좌는 비어 있을 수 있음. 완료 강좌는 항상 있음
    pub price: Option<f64>,
    pub status: CourseStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// 세션 엔티티: `sessions` 테이블 한 행
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub course_id: String,
    pub title: Option<String>,
    /// ISO 8601 UTC (밀리초까지). 문자열 비교가 곧 시간 비교가 되도록 형식을 고정합니다.
    pub session_date: String,
    pub sort_order: i64,
    pub created_at: String,
}

/// API 응답용 세션. 인덱스와 표시용 제목이 채워져 있습니다.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub index: usize,
    pub title: String,
    pub date: String,
}

/// 범위 안의 세션을 응답용으로 바꿉니다. 범위가 None이면 전체 세션
pub fn session_views(ordering: &SessionOrdering, range: Option<IndexRange>) -> Vec<SessionView> {
    let Some(range) = range.or_else(|| ordering.full_range()) else {
        return Vec::new();
    };
    ordering
        .slice(range)
        .iter()
        .enumerate()
        .map(|(offset, session)| {
            let index = range.start + offset;
            SessionView {
                id: session.id.clone(),
                index,
                title: ordering.display_title(index),
                date: session.session_date.clone(),
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub course_type: CourseType,
    pub price: Option<f64>,
    pub status: Option<CourseStatus>,
}

/// PATCH: 보낸 필드만 변경
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub status: Option<CourseStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub date: DateTime<Utc>,
    pub title: Option<String>,
}
