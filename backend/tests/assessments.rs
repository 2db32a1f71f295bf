mod common;

use axum::http::{Method, StatusCode};
use common::{answer_key, question, test_assessment, token, TestApp};
use satprep::middleware::auth::Role;
use serde_json::{json, Value};
use std::sync::Arc;

async fn create(app: &TestApp, questions: Vec<Value>) -> Value {
    let (status, body) = app
        .admin(Method::POST, "/admin/assessments", Some(test_assessment(questions)))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn invalid_assessment_lists_every_violation() {
    let app = TestApp::new().await;
    let mut no_correct = question("Q1", 0);
    no_correct["choices"][0]["isCorrect"] = json!(false);
    let mut two_correct = question("Q2", 0);
    two_correct["choices"][1]["isCorrect"] = json!(true);

    let mut body = test_assessment(vec![no_correct, two_correct, question("Q3", 2)]);
    body["kind"] = json!("homework");
    body["title"] = json!("Hi");

    let (status, response) = app.admin(Method::POST, "/admin/assessments", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["error"]["code"], "invalid_assessment");
    let violations: Vec<&str> = response["error"]["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(violations.len(), 4, "{violations:?}");
    assert!(violations.iter().any(|v| v.starts_with("passages[0].questions[0].choices")));
    assert!(violations.iter().any(|v| v.starts_with("passages[0].questions[1].choices")));
    assert!(violations.iter().any(|v| v.starts_with("title")));
    assert!(violations.iter().any(|v| v.contains("Homework")));

    let (_, list) = app.admin(Method::GET, "/admin/assessments", None).await;
    assert!(list["assessments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn question_needs_exactly_four_choices() {
    let app = TestApp::new().await;
    let mut short = question("Q1", 0);
    short["choices"].as_array_mut().unwrap().pop();

    let (status, response) = app
        .admin(Method::POST, "/admin/assessments", Some(test_assessment(vec![short])))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response["error"]["violations"][0]
        .as_str()
        .unwrap()
        .contains("exactly 4 choices"));
}

#[tokio::test]
async fn attempt_never_reveals_correct_answers() {
    let app = TestApp::new().await;
    let assessment = create(&app, vec![question("Q1", 1), question("Q2", 3)]).await;
    let id = assessment["id"].as_str().unwrap();

    let (status, attempt) = app
        .student(Method::POST, &format!("/student/assessments/{id}/attempt"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let choices: Vec<&Value> = attempt["passages"][0]["questions"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|q| q["choices"].as_array().unwrap())
        .collect();
    assert_eq!(choices.len(), 8);
    assert!(choices.iter().all(|c| c.get("isCorrect").is_none()));
    assert!(!attempt.to_string().contains("isCorrect"));
}

#[tokio::test]
async fn all_correct_scores_full_marks() {
    let app = TestApp::new().await;
    let assessment = create(&app, vec![question("Q1", 0), question("Q2", 1)]).await;
    let id = assessment["id"].as_str().unwrap();
    let answers: Vec<Value> = answer_key(&assessment)
        .into_iter()
        .map(|(q, correct, _)| json!({ "questionId": q, "choiceId": correct }))
        .collect();

    let (status, result) = app
        .student(
            Method::POST,
            &format!("/student/assessments/{id}/submit"),
            Some(json!({ "answers": answers })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{result}");
    assert_eq!(result["score"], 2);
    assert_eq!(result["totalQuestions"], 2);
    assert_eq!(result["percentage"], 100.0);
}

#[tokio::test]
async fn mixed_answers_score_two_of_three() {
    let app = TestApp::new().await;
    let assessment = create(&app, vec![question("Q1", 0), question("Q2", 1), question("Q3", 2)]).await;
    let id = assessment["id"].as_str().unwrap();
    let key = answer_key(&assessment);
    let answers = json!([
        { "questionId": key[0].0, "choiceId": key[0].1 },
        { "questionId": key[1].0, "choiceId": key[1].2 },
        { "questionId": key[2].0, "choiceId": key[2].1 },
    ]);

    let (status, result) = app
        .student(
            Method::POST,
            &format!("/student/assessments/{id}/submit"),
            Some(json!({ "answers": answers })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(result["score"], 2);
    assert_eq!(result["totalQuestions"], 3);
    let percentage = result["percentage"].as_f64().unwrap();
    assert!((percentage - 66.67).abs() < 0.01, "{percentage}");
}

#[tokio::test]
async fn unanswered_questions_count_toward_total() {
    let app = TestApp::new().await;
    let assessment = create(&app, vec![question("Q1", 0), question("Q2", 1)]).await;
    let id = assessment["id"].as_str().unwrap();
    let key = answer_key(&assessment);
    let answers = json!([
        { "questionId": key[0].0, "choiceId": key[0].1 },
        { "questionId": key[1].0, "choiceId": null },
    ]);

    let (_, result) = app
        .student(
            Method::POST,
            &format!("/student/assessments/{id}/submit"),
            Some(json!({ "answers": answers })),
        )
        .await;

    assert_eq!(result["score"], 1);
    assert_eq!(result["totalQuestions"], 2);
    assert_eq!(result["percentage"], 50.0);
}

#[tokio::test]
async fn second_submission_is_rejected_and_first_score_kept() {
    let app = TestApp::new().await;
    let assessment = create(&app, vec![question("Q1", 0), question("Q2", 1)]).await;
    let id = assessment["id"].as_str().unwrap();
    let key = answer_key(&assessment);
    let uri = format!("/student/assessments/{id}/submit");

    let wrong = json!({ "answers": [
        { "questionId": key[0].0, "choiceId": key[0].2 },
        { "questionId": key[1].0, "choiceId": key[1].2 },
    ]});
    let right = json!({ "answers": [
        { "questionId": key[0].0, "choiceId": key[0].1 },
        { "questionId": key[1].0, "choiceId": key[1].1 },
    ]});

    let (status, first) = app.student(Method::POST, &uri, Some(wrong)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["score"], 0);

    let (status, body) = app.student(Method::POST, &uri, Some(right)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "duplicate_submission");

    let (_, review) = app
        .student(Method::GET, &format!("/student/assessments/{id}/submission"), None)
        .await;
    assert_eq!(review["submission"]["score"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_store_only_one() {
    let app = Arc::new(TestApp::on_disk(8).await);
    let assessment = create(&app, vec![question("Q1", 0)]).await;
    let id = assessment["id"].as_str().unwrap().to_string();
    let key = answer_key(&assessment);
    let uri = format!("/student/assessments/{id}/submit");
    let body = json!({ "answers": [{ "questionId": key[0].0, "choiceId": key[0].1 }] });

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let app = Arc::clone(&app);
            let uri = uri.clone();
            let body = body.clone();
            tokio::spawn(async move { app.student(Method::POST, &uri, Some(body)).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        if status == StatusCode::CREATED {
            created += 1;
        } else {
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(body["error"]["code"], "duplicate_submission");
        }
    }
    assert_eq!(created, 1);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE assessment_id = ?")
        .bind(&id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn malformed_answers_are_rejected() {
    let app = TestApp::new().await;
    let assessment = create(&app, vec![question("Q1", 0)]).await;
    let id = assessment["id"].as_str().unwrap();
    let uri = format!("/student/assessments/{id}/submit");

    let (status, body) = app
        .student(Method::POST, &uri, Some(json!({ "answers": [] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "empty_answers");

    let (status, body) = app
        .student(
            Method::POST,
            &uri,
            Some(json!({ "answers": [{ "questionId": "not-a-uuid", "choiceId": null }] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_answer_shape");

    let (status, _) = app
        .student(
            Method::POST,
            "/student/assessments/missing/submit",
            Some(json!({ "answers": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn review_reveals_answers_only_after_submission() {
    let app = TestApp::new().await;
    let assessment = create(&app, vec![question("Q1", 2), question("Q2", 3)]).await;
    let id = assessment["id"].as_str().unwrap();
    let key = answer_key(&assessment);
    let review_uri = format!("/student/assessments/{id}/submission");

    let (status, _) = app.student(Method::GET, &review_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.student(
        Method::POST,
        &format!("/student/assessments/{id}/submit"),
        Some(json!({ "answers": [{ "questionId": key[1].0, "choiceId": key[1].1 }] })),
    )
    .await;

    let (status, review) = app.student(Method::GET, &review_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["submission"]["score"], 1);
    assert_eq!(review["submission"]["totalQuestions"], 2);

    // 보내지 않은 문항도 미응답으로 남습니다 (문항 순서대로)
    let answers = review["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0]["questionId"], key[0].0.as_str());
    assert_eq!(answers[0]["choiceId"], Value::Null);
    assert_eq!(answers[1]["isCorrect"], true);

    let correct_flags = review["assessment"]["passages"][0]["questions"][0]["choices"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["isCorrect"] == true)
        .count();
    assert_eq!(correct_flags, 1);

    // 다른 학생에게는 이 제출이 보이지 않음
    let other = token("student-2", Role::Student);
    let (status, _) = app.request(Method::GET, &review_uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_manages_assessments_and_sees_submissions() {
    let app = TestApp::new().await;
    let assessment = create(&app, vec![question("Q1", 0)]).await;
    let id = assessment["id"].as_str().unwrap();
    let key = answer_key(&assessment);

    let (_, list) = app.admin(Method::GET, "/admin/assessments", None).await;
    assert_eq!(list["assessments"][0]["questionCount"], 1);

    let (status, detail) = app.admin(Method::GET, &format!("/admin/assessments/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["duration"], 30);

    app.student(
        Method::POST,
        &format!("/student/assessments/{id}/submit"),
        Some(json!({ "answers": [{ "questionId": key[0].0, "choiceId": key[0].1 }] })),
    )
    .await;

    let (_, submissions) = app
        .admin(Method::GET, &format!("/admin/assessments/{id}/submissions"), None)
        .await;
    assert_eq!(submissions["submissions"][0]["studentId"], "student-1");

    let (status, _) = app.admin(Method::DELETE, &format!("/admin/assessments/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.admin(Method::GET, &format!("/admin/assessments/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.student(Method::POST, "/admin/assessments", Some(test_assessment(vec![]))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
