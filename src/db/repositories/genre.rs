use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{genres, prelude::*};

pub struct GenreRepository {
    conn: DatabaseConnection,
}

impl GenreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<genres::Model>> {
        let rows = Genres::find()
            .order_by_asc(genres::Column::Name)
            .order_by_asc(genres::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list genres")?;

        Ok(rows)
    }

    /// Case-insensitive lookup by name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<genres::Model>> {
        let row = Genres::find()
            .filter(genres::Column::NameKey.eq(name_key(name)))
            .one(&self.conn)
            .await
            .context("Failed to query genre by name")?;

        Ok(row)
    }

    pub async fn create(&self, name: &str) -> Result<genres::Model> {
        let model = genres::ActiveModel {
            name: Set(name.to_string()),
            name_key: Set(name_key(name)),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert genre")?;

        Ok(model)
    }

    /// The subset of `ids` with no genre row.
    pub async fn missing_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<i32> = Genres::find()
            .filter(genres::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect();

        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }
}

/// Key two genre names share exactly when they differ only in case.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_key_folds_non_ascii_case() {
        assert_eq!(name_key("Émotion"), name_key("émotion"));
        assert_eq!(name_key("SCI-FI"), "sci-fi");
        assert_ne!(name_key("Drama"), name_key("Dramas"));
    }
}
