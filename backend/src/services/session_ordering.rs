//! # 세션 순서(Session Ordering)
//!
//! 라이브 강좌의 세션들을 `sort_order` 기준으로 정렬된 목록으로 다룹니다.
//! 접근 구간 계산은 세션 ID가 아닌 **인덱스(0부터 시작하는 위치)**로 범위를 표현하므로,
//! ID → 인덱스 변환과 인덱스 범위 슬라이싱을 이 모듈이 담당합니다.
//!
//! 세션 삭제 후에는 남은 세션의 순서를 `0..n-1`로 다시 매깁니다.
//! 기존 목록을 고치지 않고, 새 순서가 반영된 목록을 반환합니다.

use crate::models::Session;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderingError {
    #[error("Session {0} does not belong to this course")]
    UnknownSession(String),

    #[error("Start session (index {start}) comes after end session (index {end})")]
    InvertedRange { start: usize, end: usize },
}

/// 양끝을 포함하는 세션 인덱스 범위 `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Result<Self, OrderingError> {
        if start > end {
            return Err(OrderingError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// `end - start + 1`
    pub fn session_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// 두 범위가 하나라도 같은 인덱스를 공유하면 true.
    /// 인접한 범위([0,2]와 [3,5])는 겹치지 않습니다.
    pub fn overlaps(&self, other: &IndexRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

/// 한 강좌의 세션을 순서대로 담은 목록
#[derive(Debug, Clone)]
pub struct SessionOrdering {
    sessions: Vec<Session>,
}

impl SessionOrdering {
    /// 세션 목록을 `sort_order` 기준으로 정렬하여 감쌉니다.
    /// 같은 순서값이 있으면 날짜로 한 번 더 정렬합니다.
    pub fn new(mut sessions: Vec<Session>) -> Self {
        sessions.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.session_date.cmp(&b.session_date))
        });
        Self { sessions }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// 마지막 세션의 인덱스. 세션이 없으면 None
    pub fn last_index(&self) -> Option<usize> {
        self.sessions.len().checked_sub(1)
    }

    /// 전체 세션을 덮는 범위. 세션이 없으면 None
    pub fn full_range(&self) -> Option<IndexRange> {
        self.last_index().map(|end| IndexRange { start: 0, end })
    }

    pub fn index_of(&self, session_id: &str) -> Result<usize, OrderingError> {
        self.sessions
            .iter()
            .position(|s| s.id == session_id)
            .ok_or_else(|| OrderingError::UnknownSession(session_id.to_string()))
    }

    /// 두 세션 ID 사이(양끝 포함)의 범위를 구합니다.
    pub fn range_of(&self, start_id: &str, end_id: &str) -> Result<IndexRange, OrderingError> {
        let start = self.index_of(start_id)?;
        let end = self.index_of(end_id)?;
        IndexRange::new(start, end)
    }

    /// 두 세션 ID 사이(양끝 포함)의 세션들을 순서대로 반환합니다.
    pub fn slice_by_ids(&self, start_id: &str, end_id: &str) -> Result<&[Session], OrderingError> {
        let range = self.range_of(start_id, end_id)?;
        Ok(self.slice(range))
    }

    /// 인덱스 범위에 해당하는 세션 슬라이스.
    /// 범위가 목록 밖으로 나가면 목록 끝에서 자릅니다.
    pub fn slice(&self, range: IndexRange) -> &[Session] {
        if range.start >= self.sessions.len() {
            return &[];
        }
        let end = range.end.min(self.sessions.len() - 1);
        &self.sessions[range.start..=end]
    }

    /// 표시용 제목. 제목이 없으면 "Session N" (N은 1부터)
    pub fn display_title(&self, index: usize) -> String {
        match self.sessions.get(index).and_then(|s| s.title.as_deref()) {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => format!("Session {}", index + 1),
        }
    }

    /// 날짜 순서를 유지하며 `sort_order`를 `0..n-1`로 다시 매긴 새 목록을 반환합니다.
    pub fn renumbered(&self) -> Vec<Session> {
        let mut sessions = self.sessions.clone();
        sessions.sort_by(|a, b| {
            a.session_date
                .cmp(&b.session_date)
                .then_with(|| a.sort_order.cmp(&b.sort_order))
        });
        for (index, session) in sessions.iter_mut().enumerate() {
            session.sort_order = index as i64;
        }
        sessions
    }

    /// 세션 하나를 뺀 뒤 다시 번호를 매긴 목록
    pub fn without(&self, session_id: &str) -> Result<Vec<Session>, OrderingError> {
        let index = self.index_of(session_id)?;
        let mut remaining = self.sessions.clone();
        remaining.remove(index);
        Ok(SessionOrdering::new(remaining).renumbered())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, date: &str, order: i64) -> Session {
        Session {
            id: id.to_string(),
            course_id: "course".to_string(),
            title: None,
            session_date: date.to_string(),
            sort_order: order,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn eight_sessions() -> SessionOrdering {
        SessionOrdering::new(
            (1..=8)
                .map(|n| session(&format!("s{n}"), &format!("2026-02-0{n}T18:00:00.000Z"), n - 1))
                .collect(),
        )
    }

    #[test]
    fn index_of_unknown_session_fails() {
        let ordering = eight_sessions();
        assert_eq!(ordering.index_of("s3"), Ok(2));
        assert_eq!(
            ordering.index_of("nope"),
            Err(OrderingError::UnknownSession("nope".to_string()))
        );
    }

    #[test]
    fn slice_by_ids_is_inclusive() {
        let ordering = eight_sessions();
        let ids: Vec<_> = ordering
            .slice_by_ids("s3", "s6")
            .unwrap()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["s3", "s4", "s5", "s6"]);
    }

    #[test]
    fn slice_by_ids_rejects_inverted_range() {
        let ordering = eight_sessions();
        assert_eq!(
            ordering.slice_by_ids("s6", "s3").unwrap_err(),
            OrderingError::InvertedRange { start: 5, end: 2 }
        );
    }

    #[test]
    fn new_sorts_by_order_not_input_position() {
        let ordering = SessionOrdering::new(vec![
            session("b", "2026-02-02T00:00:00.000Z", 1),
            session("a", "2026-02-01T00:00:00.000Z", 0),
        ]);
        assert_eq!(ordering.index_of("a"), Ok(0));
        assert_eq!(ordering.last_index(), Some(1));
    }

    #[test]
    fn without_renumbers_contiguously_by_date() {
        let ordering = eight_sessions();
        let remaining = ordering.without("s4").unwrap();
        let orders: Vec<_> = remaining.iter().map(|s| s.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(remaining[3].id, "s5");
        // 원래 목록은 그대로
        assert_eq!(ordering.len(), 8);
    }

    #[test]
    fn renumbered_follows_dates_after_gaps() {
        let ordering = SessionOrdering::new(vec![
            session("late", "2026-03-01T00:00:00.000Z", 7),
            session("early", "2026-01-01T00:00:00.000Z", 2),
        ]);
        let renumbered = ordering.renumbered();
        assert_eq!(renumbered[0].id, "early");
        assert_eq!(renumbered[0].sort_order, 0);
        assert_eq!(renumbered[1].sort_order, 1);
    }

    #[test]
    fn display_title_falls_back_to_position() {
        let mut sessions = vec![session("a", "2026-01-01T00:00:00.000Z", 0)];
        sessions.push(Session {
            title: Some("Algebra review".to_string()),
            ..session("b", "2026-01-02T00:00:00.000Z", 1)
        });
        let ordering = SessionOrdering::new(sessions);
        assert_eq!(ordering.display_title(0), "Session 1");
        assert_eq!(ordering.display_title(1), "Algebra review");
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let a = IndexRange::new(0, 2).unwrap();
        let b = IndexRange::new(3, 5).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&IndexRange::new(2, 4).unwrap()));
    }
}
