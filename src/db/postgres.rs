use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::{
    postgres::{PgArguments, PgPoolOptions, PgRow},
    query::Query,
    types::Json,
    Executor, Pool, Postgres, Row, Transaction,
};
use uuid::Uuid;

use super::{Store, StoreError, StoreTransaction};
use crate::entities::{Place, PlaceWithCreator, User, UserWithPlaces};

type Database = Postgres;

pub struct PgStore {
    pool: Pool<Database>,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::connect", skip_all)]
    pub async fn connect(db_uri: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        pool.execute("CREATE TABLE IF NOT EXISTS users (id UUID PRIMARY KEY, email VARCHAR NOT NULL UNIQUE, data JSONB NOT NULL)")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS places (id UUID PRIMARY KEY, creator UUID NOT NULL, data JSONB NOT NULL)")
            .await?;

        tracing::info!("connected to database");

        Ok(Self { pool })
    }
}

fn decode<T: DeserializeOwned>(row: PgRow) -> Result<T, StoreError> {
    let Json(document): Json<T> = row.try_get("data")?;

    Ok(document)
}

fn upsert_place(place: &Place) -> Query<'_, Database, PgArguments> {
    sqlx::query(
        "INSERT INTO places (id, creator, data) VALUES ($1, $2, $3) ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
    )
    .bind(place.id)
    .bind(place.creator)
    .bind(Json(place))
}

fn upsert_user(user: &User) -> Query<'_, Database, PgArguments> {
    sqlx::query(
        "INSERT INTO users (id, email, data) VALUES ($1, $2, $3) ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, data = EXCLUDED.data",
    )
    .bind(user.id)
    .bind(user.email.as_str())
    .bind(Json(user))
}

#[async_trait]
impl Store for PgStore {
    #[tracing::instrument(skip(self))]
    async fn find_place(&self, id: Uuid) -> Result<Option<Place>, StoreError> {
        self.pool
            .fetch_optional(sqlx::query("SELECT data FROM places WHERE id = $1").bind(id))
            .await?
            .map(decode)
            .transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find_place_with_creator(
        &self,
        id: Uuid,
    ) -> Result<Option<PlaceWithCreator>, StoreError> {
        let place = match self.find_place(id).await? {
            Some(place) => place,
            None => return Ok(None),
        };

        let creator = self.find_user(place.creator).await?;

        Ok(Some(PlaceWithCreator { place, creator }))
    }

    #[tracing::instrument(skip(self))]
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.pool
            .fetch_optional(sqlx::query("SELECT data FROM users WHERE id = $1").bind(id))
            .await?
            .map(decode)
            .transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find_user_with_places(
        &self,
        id: Uuid,
    ) -> Result<Option<UserWithPlaces>, StoreError> {
        let user = match self.find_user(id).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        let rows = self
            .pool
            .fetch_all(
                sqlx::query("SELECT data FROM places WHERE id = ANY($1)").bind(user.places.clone()),
            )
            .await?;

        let mut by_id = HashMap::new();
        for row in rows {
            let place: Place = decode(row)?;
            by_id.insert(place.id, place);
        }

        let places = user
            .places
            .iter()
            .filter_map(|place_id| by_id.remove(place_id))
            .collect();

        Ok(Some(UserWithPlaces { user, places }))
    }

    #[tracing::instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.pool
            .fetch_optional(sqlx::query("SELECT data FROM users WHERE email = $1").bind(email))
            .await?
            .map(decode)
            .transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.pool
            .fetch_all(sqlx::query("SELECT data FROM users"))
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn save_place(&self, place: &Place) -> Result<(), StoreError> {
        self.pool.execute(upsert_place(place)).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.pool.execute(upsert_user(user)).await?;

        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        let tx = self.pool.begin().await?;

        Ok(Box::new(PgTransaction { tx }))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

struct PgTransaction {
    tx: Transaction<'static, Database>,
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    #[tracing::instrument(skip(self))]
    async fn save_place(&mut self, place: &Place) -> Result<(), StoreError> {
        self.tx.execute(upsert_place(place)).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn save_user(&mut self, user: &User) -> Result<(), StoreError> {
        self.tx.execute(upsert_user(user)).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_place(&mut self, place: &Place) -> Result<(), StoreError> {
        self.tx
            .execute(sqlx::query("DELETE FROM places WHERE id = $1").bind(place.id))
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let PgTransaction { tx } = *self;
        tx.commit().await?;

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let PgTransaction { tx } = *self;
        tx.rollback().await?;

        Ok(())
    }
}
