//! # 접근 구간 모델
//!
//! DB에는 구간의 시작/끝 세션 ID와 유형만 저장합니다.
//! 세션 수, 접근 가능한 세션 목록, 가격은 읽을 때마다 계산해서
//! `AccessWindowView`로 돌려줍니다.

use crate::error::AppError;
use crate::models::{session_views, SessionView};
use crate::services::access_window::{AccessComputation, AccessGrant, AccessType};
use crate::services::pricing::PricingTemplate;
use crate::services::session_ordering::SessionOrdering;
use serde::{Deserialize, Serialize};

/// `access_windows` 테이블 한 행.
/// 전체 수강(`full`)은 세션 ID 없이, 중도 합류(`late_join`)는 시작 세션만 저장합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccessWindow {
    pub id: String,
    pub enrollment_id: String,
    pub access_type: AccessType,
    pub start_session_id: Option<String>,
    pub end_session_id: Option<String>,
    pub pricing_template: PricingTemplate,
    pub created_at: String,
    pub updated_at: String,
}

impl AccessWindow {
    /// 저장된 행을 명시적인 권한 값으로 되돌립니다.
    pub fn grant(&self) -> Result<AccessGrant, AppError> {
        let corrupt =
            || AppError::Internal(format!("Access window {} is missing its sessions", self.id));
        match self.access_type {
            AccessType::Full => Ok(AccessGrant::Full),
            AccessType::Partial => Ok(AccessGrant::Partial {
                start_session_id: self.start_session_id.clone().ok_or_else(corrupt)?,
                end_session_id: self.end_session_id.clone().ok_or_else(corrupt)?,
            }),
            AccessType::LateJoin => Ok(AccessGrant::LateJoin {
                start_session_id: self.start_session_id.clone().ok_or_else(corrupt)?,
            }),
        }
    }
}

fn date_span(computation: &AccessComputation) -> (Option<String>, Option<String>) {
    match computation.date_span() {
        Some((start, end)) => (Some(start.to_string()), Some(end.to_string())),
        None => (None, None),
    }
}

/// 계산된 필드가 채워진 응답
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessWindowView {
    pub id: String,
    pub enrollment_id: String,
    pub access_type: AccessType,
    pub start_session_id: Option<String>,
    pub end_session_id: Option<String>,
    pub start_index: usize,
    pub end_index: usize,
    pub session_count: usize,
    /// 첫 세션과 마지막 세션의 날짜
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub accessible_sessions: Vec<SessionView>,
    pub pricing_template: PricingTemplate,
    pub price_per_session: f64,
    pub calculated_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl AccessWindowView {
    pub fn new(
        window: &AccessWindow,
        grant: &AccessGrant,
        ordering: &SessionOrdering,
        computation: &AccessComputation,
    ) -> Self {
        let (start_date, end_date) = date_span(computation);
        Self {
            id: window.id.clone(),
            enrollment_id: window.enrollment_id.clone(),
            access_type: window.access_type,
            start_session_id: grant.start_session_id().map(str::to_string),
            end_session_id: grant.end_session_id(ordering).map(str::to_string),
            start_index: computation.range.start,
            end_index: computation.range.end,
            session_count: computation.session_count(),
            start_date,
            end_date,
            accessible_sessions: session_views(ordering, Some(computation.range)),
            pricing_template: computation.quote.template,
            price_per_session: computation.quote.price_per_session,
            calculated_price: computation.quote.calculated_price,
            advisory: computation.advisory.clone(),
            created_at: window.created_at.clone(),
            updated_at: window.updated_at.clone(),
        }
    }
}

/// 저장하지 않은 가격 견적
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessQuoteView {
    pub access_type: AccessType,
    pub start_index: usize,
    pub end_index: usize,
    pub session_count: usize,
    pub total_sessions: usize,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub accessible_sessions: Vec<SessionView>,
    pub pricing_template: PricingTemplate,
    pub price_per_session: f64,
    pub calculated_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

impl AccessQuoteView {
    pub fn new(ordering: &SessionOrdering, computation: &AccessComputation) -> Self {
        let (start_date, end_date) = date_span(computation);
        Self {
            access_type: computation.access_type,
            start_index: computation.range.start,
            end_index: computation.range.end,
            session_count: computation.session_count(),
            total_sessions: ordering.len(),
            start_date,
            end_date,
            accessible_sessions: session_views(ordering, Some(computation.range)),
            pricing_template: computation.quote.template,
            price_per_session: computation.quote.price_per_session,
            calculated_price: computation.quote.calculated_price,
            advisory: computation.advisory.clone(),
        }
    }
}

/// `POST /enrollments/{id}/access-windows` 본문. 유형을 생략하면 부분 구간입니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccessWindowRequest {
    pub access_type: Option<AccessType>,
    pub start_session_id: Option<String>,
    pub end_session_id: Option<String>,
    pub pricing_template: Option<PricingTemplate>,
}

/// `PUT /access-windows/{id}` 본문. 보낸 값만 바꾸고 충돌 검사와 가격을 다시 계산합니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccessWindowRequest {
    pub start_session_id: Option<String>,
    pub end_session_id: Option<String>,
    pub pricing_template: Option<PricingTemplate>,
}

/// 저장 없이 가격만 미리 계산하는 요청
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub access_type: AccessType,
    pub start_session_id: Option<String>,
    pub end_session_id: Option<String>,
    pub pricing_template: Option<PricingTemplate>,
}
