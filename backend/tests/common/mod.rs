#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use satprep::{
    db,
    middleware::auth::{create_access_token, Role},
    routes::{self, AppState},
};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tempfile::TempDir;
use tower::util::ServiceExt; // not axum::ServiceExt

const SECRET: &str = "test-secret";

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub admin: String,
    pub student: String,
    _dir: Option<TempDir>,
}

impl TestApp {
    /// 메모리 DB는 연결마다 따로 생기므로 연결을 하나로 고정합니다.
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        Self::with_pool(pool, None).await
    }

    /// 임시 파일 DB와 연결 여러 개. 요청이 실제로 동시에 트랜잭션을 열어야 하는 테스트용
    pub async fn on_disk(connections: u32) -> Self {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let pool = db::connect(&url, connections).await.unwrap();
        Self::with_pool(pool, Some(dir)).await
    }

    async fn with_pool(pool: SqlitePool, dir: Option<TempDir>) -> Self {
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let router = routes::app(AppState {
            pool: pool.clone(),
            jwt_secret: SECRET.to_string(),
        });

        Self {
            router,
            pool,
            admin: token("admin-1", Role::Admin),
            student: token("student-1", Role::Student),
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(format!("/api/v1{uri}"));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(method, uri, Some(&self.admin), body).await
    }

    pub async fn student(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(method, uri, Some(&self.student), body).await
    }

    /// 발행된 라이브 강좌와 날짜순 세션 `n`개. 반환값: (강좌 ID, 세션 ID 목록)
    pub async fn live_course(&self, sessions: usize, price: f64) -> (String, Vec<String>) {
        let (status, course) = self
            .admin(
                Method::POST,
                "/admin/courses",
                Some(json!({ "title": "SAT Math Live", "type": "live", "price": price, "status": "published" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{course}");
        let course_id = course["id"].as_str().unwrap().to_string();

        let mut ids = Vec::new();
        for day in 1..=sessions {
            let (status, body) = self
                .admin(
                    Method::POST,
                    &format!("/admin/courses/{course_id}/sessions"),
                    Some(json!({ "date": format!("2026-02-{day:02}T18:00:00Z") })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            ids.push(body["session"]["id"].as_str().unwrap().to_string());
        }
        (course_id, ids)
    }

    /// 기본 학생의 수강 신청 ID
    pub async fn enroll(&self, course_id: &str) -> String {
        self.enroll_as(&self.student, course_id).await
    }

    pub async fn enroll_as(&self, token: &str, course_id: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                &format!("/student/courses/{course_id}/enrollments"),
                Some(token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_window(&self, enrollment_id: &str, body: Value) -> (StatusCode, Value) {
        self.admin(
            Method::POST,
            &format!("/enrollments/{enrollment_id}/access-windows"),
            Some(body),
        )
        .await
    }
}

pub fn token(user_id: &str, role: Role) -> String {
    create_access_token(user_id, role, SECRET).unwrap()
}

/// 선택지 4개 중 `correct`번째만 정답인 문항
pub fn question(text: &str, correct: usize) -> Value {
    let choices: Vec<Value> = (0..4)
        .map(|i| json!({ "choiceText": format!("{text} option {i}"), "isCorrect": i == correct }))
        .collect();
    json!({ "questionText": text, "choices": choices })
}

pub fn test_assessment(questions: Vec<Value>) -> Value {
    json!({
        "kind": "test",
        "title": "Reading Practice 1",
        "instructions": "Read each passage carefully.",
        "duration": 30,
        "passages": [{ "title": "Passage A", "content": "The quick brown fox.", "questions": questions }]
    })
}

/// 생성 응답에서 문항별 (문항 ID, 정답 선택지 ID, 오답 선택지 ID)
pub fn answer_key(assessment: &Value) -> Vec<(String, String, String)> {
    assessment["passages"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|p| p["questions"].as_array().unwrap().iter())
        .map(|q| {
            let choices = q["choices"].as_array().unwrap();
            let correct = choices.iter().find(|c| c["isCorrect"] == true).unwrap();
            let wrong = choices.iter().find(|c| c["isCorrect"] == false).unwrap();
            (
                q["id"].as_str().unwrap().to_string(),
                correct["id"].as_str().unwrap().to_string(),
                wrong["id"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}
