//! # 데이터 모델 모듈
//!
//! DB 행(row)에 대응하는 구조체와 API 요청/응답 구조체를 정의합니다.
//! - `course`: 강좌와 세션
//! - `enrollment`: 수강 신청
//! - `access_window`: 접근 구간 요청/응답
//! - `assessment`: 평가(테스트/숙제) 트리와 생성 요청
//! - `submission`: 제출 기록과 답안
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Course`처럼 짧게 쓸 수 있습니다.

pub mod access_window;
pub mod assessment;
pub mod course;
pub mod enrollment;
pub mod submission;

pub use access_window::*;
pub use assessment::*;
pub use course::*;
pub use enrollment::*;
pub use submission::*;
