use crate::entities::{movies, prelude::*};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use tracing::info;

/// Repository for watchlist entries
pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: movies::Model) -> Movie {
        Movie {
            id: m.id,
            title: m.title,
            year: m.year,
        }
    }

    /// Inserts as given; trimming and length checks belong to the caller.
    pub async fn create(&self, title: &str, year: &str) -> Result<i32> {
        let active_model = movies::ActiveModel {
            title: Set(title.to_string()),
            year: Set(year.to_string()),
            ..Default::default()
        };

        let res = Movies::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert movie")?;

        info!("Added movie {}: {} ({})", res.last_insert_id, title, year);
        Ok(res.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Movie>> {
        let result = Movies::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query movie")?;

        Ok(result.map(Self::map_model))
    }

    /// Returns `false` when no movie has this id.
    pub async fn update(&self, id: i32, title: &str, year: &str) -> Result<bool> {
        let Some(movie) = Movies::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query movie for update")?
        else {
            return Ok(false);
        };

        let mut active: movies::ActiveModel = movie.into();
        active.title = Set(title.to_string());
        active.year = Set(year.to_string());
        active
            .update(&self.conn)
            .await
            .context("Failed to update movie")?;

        info!("Updated movie {}: {} ({})", id, title, year);
        Ok(true)
    }

    /// Returns `false` when no movie has this id.
    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Movies::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete movie")?;

        if result.rows_affected > 0 {
            info!("Deleted movie {}", id);
        }
        Ok(result.rows_affected > 0)
    }

    /// Every row, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<Movie>> {
        let rows = Movies::find()
            .order_by_asc(movies::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list movies")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Movies::find()
            .count(&self.conn)
            .await
            .context("Failed to count movies")
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: String,
}
