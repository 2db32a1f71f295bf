//! # 가격 산정(Pricing)
//!
//! 강좌 기본 가격과 세션 수로 세션당 가격을 구하고, 접근 구간 가격을 계산합니다.
//!
//! ```text
//! pricePerSession = round(coursePrice / totalSessions)
//! pricePerSession = round(pricePerSession × 템플릿 할인율)
//! windowPrice     = pricePerSession × sessionCount
//! ```
//!
//! 반올림은 각 단계마다 "0.5 올림"으로 하고, 반드시 **먼저 반올림한 뒤 곱합니다**.
//! 곱한 뒤 반올림하면 결과가 달라지므로 순서를 바꾸면 안 됩니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("Course has no base price")]
    MissingBasePrice,

    #[error("Course price must be a non-negative number, got {0}")]
    InvalidBasePrice(f64),

    #[error("Cannot price a course with no sessions")]
    NoSessions,
}

/// 가격 템플릿. 템플릿마다 세션당 가격에 곱하는 할인율이 정해져 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PricingTemplate {
    Standard,
    LateJoin,
    Sample,
    Intensive,
}

impl PricingTemplate {
    /// 할인율(백분율). 정책이 바뀌면 이 표 한 줄만 고칩니다.
    pub fn percent(self) -> u32 {
        match self {
            PricingTemplate::Standard => 100,
            PricingTemplate::LateJoin => 85,
            PricingTemplate::Sample => 70,
            PricingTemplate::Intensive => 90,
        }
    }

    pub fn multiplier(self) -> f64 {
        f64::from(self.percent()) / 100.0
    }
}

/// 0.5를 올리는 반올림 (가격은 음수가 아님)
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn checked_base_price(base_price: Option<f64>) -> Result<f64, PricingError> {
    let price = base_price.ok_or(PricingError::MissingBasePrice)?;
    if !price.is_finite() || price < 0.0 {
        return Err(PricingError::InvalidBasePrice(price));
    }
    Ok(price)
}

/// `round(basePrice / totalSessions)`
pub fn price_per_session(base_price: Option<f64>, total_sessions: usize) -> Result<f64, PricingError> {
    let price = checked_base_price(base_price)?;
    if total_sessions == 0 {
        return Err(PricingError::NoSessions);
    }
    Ok(round_half_up(price / total_sessions as f64))
}

/// 템플릿 할인율을 적용한 세션당 가격.
///
/// 세션당 가격은 이미 정수이므로 백분율을 곱한 값도 정확한 정수이고,
/// 100으로 나눈 결과의 .5 경계가 부동소수 오차로 흔들리지 않습니다.
pub fn discounted_price_per_session(
    base_price: Option<f64>,
    total_sessions: usize,
    template: PricingTemplate,
) -> Result<f64, PricingError> {
    let per_session = price_per_session(base_price, total_sessions)?;
    Ok(round_half_up(per_session * f64::from(template.percent()) / 100.0))
}

/// 접근 구간 하나의 가격 계산 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub template: PricingTemplate,
    pub price_per_session: f64,
    pub session_count: usize,
    pub calculated_price: f64,
}

/// 부분/중도 합류 구간의 가격
pub fn quote_window(
    base_price: Option<f64>,
    total_sessions: usize,
    session_count: usize,
    template: PricingTemplate,
) -> Result<PriceQuote, PricingError> {
    let price_per_session = discounted_price_per_session(base_price, total_sessions, template)?;
    Ok(PriceQuote {
        template,
        price_per_session,
        session_count,
        calculated_price: price_per_session * session_count as f64,
    })
}

/// 전체 수강 가격은 기본 가격 그대로입니다 (세션당 가격 합과 맞추지 않음).
pub fn quote_full(base_price: Option<f64>, total_sessions: usize) -> Result<PriceQuote, PricingError> {
    let price = checked_base_price(base_price)?;
    Ok(PriceQuote {
        template: PricingTemplate::Standard,
        price_per_session: price_per_session(Some(price), total_sessions)?,
        session_count: total_sessions,
        calculated_price: price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_sessions_at_1000() {
        assert_eq!(price_per_session(Some(1000.0), 8), Ok(125.0));
        let quote = quote_window(Some(1000.0), 8, 4, PricingTemplate::Standard).unwrap();
        assert_eq!(quote.calculated_price, 500.0);
    }

    #[test]
    fn rounds_per_session_before_multiplying() {
        // 1000 / 3 = 333.33 → 333, × 3 = 999 (1000이 아님)
        let quote = quote_window(Some(1000.0), 3, 3, PricingTemplate::Standard).unwrap();
        assert_eq!(quote.price_per_session, 333.0);
        assert_eq!(quote.calculated_price, 999.0);
    }

    #[test]
    fn half_rounds_up() {
        // 1010 / 4 = 252.5 → 253
        assert_eq!(price_per_session(Some(1010.0), 4), Ok(253.0));
    }

    #[test]
    fn full_price_is_exact_base_price() {
        let quote = quote_full(Some(1000.0), 3).unwrap();
        assert_eq!(quote.calculated_price, 1000.0);
        assert_eq!(quote.session_count, 3);
    }

    #[test]
    fn template_discounts_apply_to_rounded_per_session_price() {
        let late = discounted_price_per_session(Some(1000.0), 8, PricingTemplate::LateJoin).unwrap();
        assert_eq!(late, 106.0); // 125 × 0.85 = 106.25
        let sample = discounted_price_per_session(Some(1000.0), 8, PricingTemplate::Sample).unwrap();
        assert_eq!(sample, 88.0); // 125 × 0.70 = 87.5 → 88
        let intensive =
            discounted_price_per_session(Some(1000.0), 8, PricingTemplate::Intensive).unwrap();
        assert_eq!(intensive, 113.0); // 125 × 0.90 = 112.5 → 113
    }

    #[test]
    fn missing_or_bad_price_is_an_error() {
        assert_eq!(price_per_session(None, 8), Err(PricingError::MissingBasePrice));
        assert_eq!(
            price_per_session(Some(-5.0), 8),
            Err(PricingError::InvalidBasePrice(-5.0))
        );
        assert_eq!(price_per_session(Some(100.0), 0), Err(PricingError::NoSessions));
    }
}
