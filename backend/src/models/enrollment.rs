use crate::models::AccessWindowView;
use crate::services::access_window::AccessType;
use crate::services::pricing::PricingTemplate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub status: EnrollmentStatus,
    /// 접근 구간을 쓸 때마다 1씩 증가
    pub window_version: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// 승인 요청. 라이브 강좌는 여기서 접근 권한도 함께 정합니다.
/// `accessType`을 생략하면 전체 수강입니다.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveEnrollmentRequest {
    pub access_type: Option<AccessType>,
    pub start_session_id: Option<String>,
    pub end_session_id: Option<String>,
    pub pricing_template: Option<PricingTemplate>,
}

#[derive(Debug, Deserialize)]
pub struct ListEnrollmentsQuery {
    pub status: Option<EnrollmentStatus>,
}

/// 수강 신청과 그 접근 구간을 함께 보여주는 응답
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub access_windows: Vec<AccessWindowView>,
}

