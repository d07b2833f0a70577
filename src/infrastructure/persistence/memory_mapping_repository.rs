//! In-process implementation of mapping repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

/// Mapping store backed by process-local hash maps.
///
/// Both uniqueness checks and the insert happen under one lock, which gives
/// the same atomic constraint enforcement as the database unique indexes.
/// Contents are lost when the process exits.
#[derive(Default)]
pub struct InMemoryMappingRepository {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    mappings: Vec<Mapping>,
    by_original_url: HashMap<String, usize>,
    by_short_code: HashMap<String, usize>,
}

impl InMemoryMappingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::internal("In-memory store is unavailable", json!({})))
    }
}

#[async_trait]
impl MappingRepository for InMemoryMappingRepository {
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<Mapping>, AppError> {
        let state = self.lock()?;
        Ok(state
            .by_original_url
            .get(original_url)
            .map(|&i| state.mappings[i].clone()))
    }

    async fn find_by_short_code(&self, short_code: &str) -> Result<Option<Mapping>, AppError> {
        let state = self.lock()?;
        Ok(state
            .by_short_code
            .get(short_code)
            .map(|&i| state.mappings[i].clone()))
    }

    async fn save(&self, new_mapping: NewMapping) -> Result<Mapping, AppError> {
        let mut state = self.lock()?;

        if state.by_original_url.contains_key(&new_mapping.original_url) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "uk_mappings_original_url" }),
            ));
        }
        if state.by_short_code.contains_key(&new_mapping.short_code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "uk_mappings_short_code" }),
            ));
        }

        let index = state.mappings.len();
        let mapping = Mapping::new(
            index as i64 + 1,
            new_mapping.original_url,
            new_mapping.short_code,
            Utc::now(),
        );

        state
            .by_original_url
            .insert(mapping.original_url.clone(), index);
        state.by_short_code.insert(mapping.short_code.clone(), index);
        state.mappings.push(mapping.clone());

        Ok(mapping)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.lock()?.mappings.len() as i64)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Mapping>, AppError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .lock()?
            .mappings
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_assigns_identity() {
        let repo = InMemoryMappingRepository::new();

        let first = repo
            .save(NewMapping::new("https://example.com/1", "code1"))
            .await
            .unwrap();
        let second = repo
            .save(NewMapping::new("https://example.com/2", "code2"))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.created_at >= first.created_at);
    }

    #[tokio::test]
    async fn test_find_by_both_keys() {
        let repo = InMemoryMappingRepository::new();
        repo.save(NewMapping::new("https://example.com", "abc123"))
            .await
            .unwrap();

        let by_url = repo.find_by_original_url("https://example.com").await.unwrap();
        let by_code = repo.find_by_short_code("abc123").await.unwrap();

        assert_eq!(by_url, by_code);
        assert!(by_url.is_some());
        assert!(repo.find_by_short_code("missing").await.unwrap().is_none());
        assert!(
            repo.find_by_original_url("https://other.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_original_url_conflicts() {
        let repo = InMemoryMappingRepository::new();
        repo.save(NewMapping::new("https://example.com", "code1"))
            .await
            .unwrap();

        let result = repo
            .save(NewMapping::new("https://example.com", "code2"))
            .await;

        let err = result.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(
            err.to_error_info().details["constraint"],
            "uk_mappings_original_url"
        );
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_short_code_conflicts() {
        let repo = InMemoryMappingRepository::new();
        repo.save(NewMapping::new("https://example.com/a", "same"))
            .await
            .unwrap();

        let err = repo
            .save(NewMapping::new("https://example.com/b", "same"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_error_info().details["constraint"],
            "uk_mappings_short_code"
        );
        assert!(repo.find_by_original_url("https://example.com/b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let repo = InMemoryMappingRepository::new();
        for i in 1..=5 {
            repo.save(NewMapping::new(format!("https://example.com/{i}"), format!("c{i}")))
                .await
                .unwrap();
        }

        let recent = repo.list_recent(3).await.unwrap();
        let codes: Vec<_> = recent.iter().map(|m| m.short_code.as_str()).collect();

        assert_eq!(codes, vec!["c5", "c4", "c3"]);
        assert!(repo.list_recent(-1).await.unwrap().is_empty());
    }
}
