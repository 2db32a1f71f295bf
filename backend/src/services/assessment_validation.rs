//! # 평가 생성 검증
//!
//! `CreateAssessmentRequest`의 `validator` 결과를 사람이 읽을 수 있는 위반 목록으로 펼칩니다.
//! 첫 번째 오류에서 멈추지 않고 **모든 위반**을 경로와 함께 돌려줍니다.
//!
//! 예: `passages[0].questions[2].choices: Each question must have exactly 1 correct choice (found none)`

use crate::models::CreateAssessmentRequest;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub fn validate_new_assessment(req: &CreateAssessmentRequest) -> Result<(), Vec<String>> {
    match req.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let mut violations = Vec::new();
            collect_violations("", &errors, &mut violations);
            violations.sort();
            Err(violations)
        }
    }
}

fn collect_violations(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        // 스키마(구조체 단위) 검증 오류는 "__all__" 키로 들어옵니다.
        let path = match (prefix.is_empty(), field.as_ref()) {
            (true, "__all__") => String::new(),
            (false, "__all__") => prefix.to_string(),
            (true, name) => name.to_string(),
            (false, name) => format!("{prefix}.{name}"),
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    if path.is_empty() {
                        out.push(message);
                    } else {
                        out.push(format!("{path}: {message}"));
                    }
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_violations(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_violations(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}
