//! # 도메인 서비스
//!
//! DB에 의존하지 않는 순수한 비즈니스 규칙입니다. 입력을 받아 계산 결과나 타입이 있는
//! 에러를 돌려주고, 저장은 `db` 모듈이 트랜잭션 안에서 맡습니다.
//!
//! - `session_ordering`: 세션 순서와 인덱스 범위
//! - `access_window`: 접근 구간 계산과 충돌 검사
//! - `pricing`: 세션당 가격과 템플릿 할인
//! - `grading`: 자동 채점
//! - `submission_guard`: 제출 답안 형태 검사
//! - `assessment_validation`: 평가 생성 시 구조 검증

pub mod access_window;
pub mod assessment_validation;
pub mod grading;
pub mod pricing;
pub mod session_ordering;
pub mod submission_guard;
