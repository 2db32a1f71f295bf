//! # 접근 구간(Access Window) 계산
//!
//! 수강 신청 하나가 라이브 강좌의 어떤 세션들을 볼 수 있는지 계산합니다.
//!
//! ## 접근 유형
//! - `Full`: 전체 세션. 가격은 강좌 기본 가격 그대로
//! - `Partial { start, end }`: 두 세션 사이 (양끝 포함)
//! - `LateJoin { start }`: 시작 세션부터 **항상 마지막 세션까지**. 끝 세션은 고를 수 없음
//!
//! 같은 수강 신청의 구간끼리는 인덱스 범위가 겹치면 안 됩니다.
//! 다른 수강 신청의 구간과는 비교하지 않습니다.

use crate::models::Session;
use crate::services::pricing::{self, PriceQuote, PricingError, PricingTemplate};
use crate::services::session_ordering::{IndexRange, OrderingError, SessionOrdering};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 구간이 강좌 세션의 이 비율을 넘으면 전체 수강을 권합니다 (차단하지 않음).
pub const FULL_ACCESS_ADVISORY_RATIO: f64 = 0.8;

#[derive(Debug, Error, PartialEq)]
pub enum AccessError {
    #[error("{0} is required for this access type")]
    MissingSession(&'static str),

    #[error("Course has no sessions to grant access to")]
    NoSessions,

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Sessions {start}..={end} overlap an existing access window for this enrollment")]
    Conflict { start: usize, end: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AccessType {
    Full,
    Partial,
    LateJoin,
}

/// 명시적인 접근 권한. "구간 행이 없으면 전체 수강" 같은 암묵 규칙 대신 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessGrant {
    Full,
    Partial {
        start_session_id: String,
        end_session_id: String,
    },
    LateJoin {
        start_session_id: String,
    },
}

impl AccessGrant {
    /// 요청 값으로 권한을 만듭니다.
    /// 중도 합류는 끝 세션을 받더라도 무시합니다 (항상 마지막 세션까지).
    pub fn from_parts(
        access_type: AccessType,
        start_session_id: Option<String>,
        end_session_id: Option<String>,
    ) -> Result<Self, AccessError> {
        match access_type {
            AccessType::Full => Ok(AccessGrant::Full),
            AccessType::Partial => Ok(AccessGrant::Partial {
                start_session_id: start_session_id
                    .ok_or(AccessError::MissingSession("startSessionId"))?,
                end_session_id: end_session_id.ok_or(AccessError::MissingSession("endSessionId"))?,
            }),
            AccessType::LateJoin => {
                if end_session_id.is_some() {
                    tracing::debug!("Ignoring endSessionId for late_join grant");
                }
                Ok(AccessGrant::LateJoin {
                    start_session_id: start_session_id
                        .ok_or(AccessError::MissingSession("startSessionId"))?,
                })
            }
        }
    }

    pub fn access_type(&self) -> AccessType {
        match self {
            AccessGrant::Full => AccessType::Full,
            AccessGrant::Partial { .. } => AccessType::Partial,
            AccessGrant::LateJoin { .. } => AccessType::LateJoin,
        }
    }

    /// 템플릿을 따로 지정하지 않았을 때 쓰는 가격 템플릿
    pub fn default_template(&self) -> PricingTemplate {
        match self {
            AccessGrant::LateJoin { .. } => PricingTemplate::LateJoin,
            _ => PricingTemplate::Standard,
        }
    }

    pub fn start_session_id(&self) -> Option<&str> {
        match self {
            AccessGrant::Full => None,
            AccessGrant::Partial { start_session_id, .. }
            | AccessGrant::LateJoin { start_session_id } => Some(start_session_id),
        }
    }

    /// 저장하는 끝 세션 ID. 부분 구간만 끝을 저장합니다.
    pub fn stored_end_session_id(&self) -> Option<&str> {
        match self {
            AccessGrant::Partial { end_session_id, .. } => Some(end_session_id),
            _ => None,
        }
    }

    /// 실제 끝 세션 ID. 중도 합류는 읽는 시점의 마지막 세션
    pub fn end_session_id<'a>(&'a self, ordering: &'a SessionOrdering) -> Option<&'a str> {
        match self {
            AccessGrant::Full => None,
            AccessGrant::Partial { end_session_id, .. } => Some(end_session_id),
            AccessGrant::LateJoin { .. } => ordering.sessions().last().map(|s| s.id.as_str()),
        }
    }

    /// 세션 순서 위에서 인덱스 범위로 풀어냅니다.
    pub fn resolve(&self, ordering: &SessionOrdering) -> Result<IndexRange, AccessError> {
        let last = ordering.last_index().ok_or(AccessError::NoSessions)?;
        match self {
            AccessGrant::Full => Ok(IndexRange { start: 0, end: last }),
            AccessGrant::Partial {
                start_session_id,
                end_session_id,
            } => Ok(ordering.range_of(start_session_id, end_session_id)?),
            AccessGrant::LateJoin { start_session_id } => {
                let start = ordering.index_of(start_session_id)?;
                Ok(IndexRange::new(start, last)?)
            }
        }
    }
}

/// 후보 구간이 기존 구간 중 하나라도 겹치면 true
pub fn has_conflict(candidate: IndexRange, existing: &[IndexRange]) -> bool {
    existing.iter().any(|other| candidate.overlaps(other))
}

/// 계산된 접근 구간 (저장하지 않고 읽을 때마다 다시 계산하는 값들)
#[derive(Debug, Clone)]
pub struct AccessComputation {
    pub access_type: AccessType,
    pub range: IndexRange,
    pub accessible_sessions: Vec<Session>,
    pub quote: PriceQuote,
    pub advisory: Option<String>,
}

impl AccessComputation {
    pub fn session_count(&self) -> usize {
        self.range.session_count()
    }

    /// 구간의 날짜 범위: (첫 세션 날짜, 마지막 세션 날짜)
    pub fn date_span(&self) -> Option<(&str, &str)> {
        let first = self.accessible_sessions.first()?;
        let last = self.accessible_sessions.last()?;
        Some((first.session_date.as_str(), last.session_date.as_str()))
    }
}

/// 충돌 검사 없이 구간과 가격만 계산합니다. 저장된 구간을 다시 읽을 때 사용합니다.
pub fn compute(
    ordering: &SessionOrdering,
    grant: &AccessGrant,
    base_price: Option<f64>,
    template: Option<PricingTemplate>,
) -> Result<AccessComputation, AccessError> {
    let range = grant.resolve(ordering)?;
    let total = ordering.len();
    let template = template.unwrap_or_else(|| grant.default_template());

    let quote = match grant {
        AccessGrant::Full => pricing::quote_full(base_price, total)?,
        _ => pricing::quote_window(base_price, total, range.session_count(), template)?,
    };

    let advisory = match grant {
        AccessGrant::Full => None,
        _ if range.session_count() as f64 / total as f64 > FULL_ACCESS_ADVISORY_RATIO => Some(format!(
            "Window covers {} of {} sessions; consider full access",
            range.session_count(),
            total
        )),
        _ => None,
    };

    Ok(AccessComputation {
        access_type: grant.access_type(),
        range,
        accessible_sessions: ordering.slice(range).to_vec(),
        quote,
        advisory,
    })
}

/// 새 구간을 계산하고 같은 수강 신청의 기존 구간과 겹치는지 검사합니다.
pub fn calculate(
    ordering: &SessionOrdering,
    grant: &AccessGrant,
    base_price: Option<f64>,
    template: Option<PricingTemplate>,
    existing: &[IndexRange],
) -> Result<AccessComputation, AccessError> {
    let computation = compute(ordering, grant, base_price, template)?;
    if has_conflict(computation.range, existing) {
        return Err(AccessError::Conflict {
            start: computation.range.start,
            end: computation.range.end,
        });
    }
    if let Some(advisory) = &computation.advisory {
        tracing::warn!("{}", advisory);
    }
    Ok(computation)
}
