// src/db/repository.rs
// DOCUMENTATION: Database access layer for places
// PURPOSE: PostgreSQL/PostGIS implementation of PlaceStore

use crate::db::PlaceStore;
use crate::errors::PlacesError;
use crate::models::{NewPlace, Place};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

/// Columns selected for every place query
/// DOCUMENTATION: PostGIS POINT is split back into coordinates via ST_X() and ST_Y()
const PLACE_COLUMNS: &str = r#"
    p.id, p.google_place_id, p.name, p.url,
    ST_X(p.location) AS longitude, ST_Y(p.location) AS latitude,
    p.photo_url
"#;

/// Internal struct for mapping database rows to Place struct
#[derive(Debug, FromRow)]
struct PlaceRow {
    pub id: i64,
    pub google_place_id: String,
    pub name: String,
    pub url: String,
    pub longitude: f64, // From ST_X(location)
    pub latitude: f64,  // From ST_Y(location)
    pub photo_url: Option<String>,
}

impl PlaceRow {
    fn to_place(self) -> Place {
        Place {
            id: self.id,
            google_place_id: self.google_place_id,
            name: self.name,
            url: self.url,
            latitude: self.latitude,
            longitude: self.longitude,
            photo_url: self.photo_url,
        }
    }
}

/// PlaceRepository: All database operations for places
#[derive(Clone)]
pub struct PlaceRepository {
    pool: PgPool,
}

impl PlaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaceStore for PlaceRepository {
    async fn find_by_external_ids(
        &self,
        google_place_ids: &[String],
    ) -> Result<Vec<Place>, PlacesError> {
        if google_place_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM place p WHERE p.google_place_id = ANY($1)",
            PLACE_COLUMNS
        );
        let rows = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(google_place_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                log::error!(
                    "Failed to load places for {} google ids: {}",
                    google_place_ids.len(),
                    e
                );
                PlacesError::DatabaseError(e.to_string())
            })?;

        Ok(rows.into_iter().map(PlaceRow::to_place).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Place, PlacesError> {
        let sql = format!("SELECT {} FROM place p WHERE p.id = $1", PLACE_COLUMNS);
        let row = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Database error fetching place {}: {}", id, e);
                PlacesError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| {
                log::warn!("Place not found: {}", id);
                PlacesError::NotFound(id.to_string())
            })?;

        Ok(row.to_place())
    }

    async fn insert(&self, place: &NewPlace) -> Result<Place, PlacesError> {
        let inserted: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO place (google_place_id, name, url, location, photo_url)
            VALUES ($1, $2, $3, ST_SetSRID(ST_MakePoint($4, $5), 4326), $6)
            RETURNING id
            "#,
        )
        .bind(&place.google_place_id) // $1
        .bind(&place.name) // $2
        .bind(&place.url) // $3
        .bind(place.longitude) // $4
        .bind(place.latitude) // $5
        .bind(&place.photo_url) // $6
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create place {}: {}", place.google_place_id, e);
            PlacesError::DatabaseError(e.to_string())
        })?;

        let place = self.find_by_id(inserted.0).await?;
        log::info!("Created place with id: {}", place.id);
        Ok(place)
    }

    async fn insert_batch(&self, places: &[NewPlace]) -> Result<Vec<Place>, PlacesError> {
        if places.is_empty() {
            return Ok(Vec::new());
        }

        // Single multi-row statement. A row already inserted by a concurrent backfill
        // is kept as is and read back below.
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO place (google_place_id, name, url, location, photo_url) ",
        );
        builder.push_values(places, |mut row, place| {
            row.push_bind(&place.google_place_id)
                .push_bind(&place.name)
                .push_bind(&place.url)
                .push("ST_SetSRID(ST_MakePoint(")
                .push_bind_unseparated(place.longitude)
                .push_unseparated(", ")
                .push_bind_unseparated(place.latitude)
                .push_unseparated("), 4326)")
                .push_bind(&place.photo_url);
        });
        builder.push(" ON CONFLICT (google_place_id) DO NOTHING");

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            log::error!("Failed to save {} places: {}", places.len(), e);
            PlacesError::DatabaseError(e.to_string())
        })?;
        log::info!(
            "Saved {} new places ({} submitted)",
            result.rows_affected(),
            places.len()
        );

        let google_place_ids: Vec<String> = places
            .iter()
            .map(|p| p.google_place_id.clone())
            .collect();
        self.find_by_external_ids(&google_place_ids).await
    }

    async fn exists_by_external_id(&self, google_place_id: &str) -> Result<bool, PlacesError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM place WHERE google_place_id = $1)")
                .bind(google_place_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists.0)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, PlacesError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM place WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists.0)
    }

    async fn find_liked_by_device(&self, device_id: &str) -> Result<Vec<Place>, PlacesError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM place p
            JOIN "like" l ON l.place_id = p.id
            WHERE l.device_id = $1 AND l.is_liked = true
            "#,
            PLACE_COLUMNS
        );
        let rows = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(device_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Failed to load liked places for device {}: {}", device_id, e);
                PlacesError::DatabaseError(e.to_string())
            })?;

        Ok(rows.into_iter().map(PlaceRow::to_place).collect())
    }
}
