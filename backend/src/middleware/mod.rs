//! 요청 처리 전에 실행되는 추출기(extractor)들

pub mod auth;
