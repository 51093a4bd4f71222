use {
    crate::{
        api::RestError,
        kernel::{
            db::{
                map_db_error,
                PgTransaction,
            },
            entities::Version,
            versioning::VersionedTable,
        },
        tender::entities,
    },
    axum::async_trait,
    sqlx::FromRow,
    tracing::instrument,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "tender_status", rename_all = "UPPERCASE")]
pub enum TenderStatus {
    Created,
    Published,
    Closed,
}

impl From<TenderStatus> for entities::TenderStatus {
    fn from(status: TenderStatus) -> Self {
        match status {
            TenderStatus::Created => entities::TenderStatus::Created,
            TenderStatus::Published => entities::TenderStatus::Published,
            TenderStatus::Closed => entities::TenderStatus::Closed,
        }
    }
}

impl From<entities::TenderStatus> for TenderStatus {
    fn from(status: entities::TenderStatus) -> Self {
        match status {
            entities::TenderStatus::Created => TenderStatus::Created,
            entities::TenderStatus::Published => TenderStatus::Published,
            entities::TenderStatus::Closed => TenderStatus::Closed,
        }
    }
}

/// A row of `tender`, or of `tender_history` with `tender_id` selected as `id`.
#[derive(Clone, Debug, FromRow)]
pub struct Tender {
    pub id:               i32,
    pub name:             String,
    pub description:      String,
    pub service_type:     String,
    pub status:           TenderStatus,
    pub organization_id:  i32,
    pub creator_username: String,
    pub version:          i32,
}

impl From<Tender> for entities::Tender {
    fn from(tender: Tender) -> Self {
        entities::Tender {
            id:               tender.id,
            name:             tender.name,
            description:      tender.description,
            service_type:     tender.service_type,
            status:           tender.status.into(),
            organization_id:  tender.organization_id,
            creator_username: tender.creator_username,
            version:          tender.version,
        }
    }
}

const TENDER_COLUMNS: &str =
    "id, name, description, service_type, status, organization_id, creator_username, version";
const TENDER_HISTORY_COLUMNS: &str = "tender_id AS id, name, description, service_type, status, \
                                      organization_id, creator_username, version";

#[async_trait]
pub trait TenderTable: VersionedTable<entities::Tender> {
    /// Stores a new tender with status CREATED and version 1.
    async fn add_tender(
        &mut self,
        tender: &entities::TenderCreate,
    ) -> Result<entities::Tender, RestError>;
    async fn get_tender(
        &mut self,
        id: entities::TenderId,
    ) -> Result<Option<entities::Tender>, RestError>;
    async fn get_published_tenders(
        &mut self,
        service_type: Option<String>,
    ) -> Result<Vec<entities::Tender>, RestError>;
    async fn get_tenders_by_creator(
        &mut self,
        username: &str,
    ) -> Result<Vec<entities::Tender>, RestError>;
    /// Returns the updated tender, or `None` if it does not exist.
    async fn update_tender_status(
        &mut self,
        id: entities::TenderId,
        status: entities::TenderStatus,
    ) -> Result<Option<entities::Tender>, RestError>;
}

#[async_trait]
impl TenderTable for PgTransaction {
    #[instrument(
        target = "metrics",
        name = "db_add_tender",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_tender",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_tender(
        &mut self,
        tender: &entities::TenderCreate,
    ) -> Result<entities::Tender, RestError> {
        let query = format!(
            "INSERT INTO tender (name, description, service_type, status, organization_id, creator_username, version) \
             VALUES ($1, $2, $3, $4, $5, $6, 1) RETURNING {}",
            TENDER_COLUMNS
        );
        let row = sqlx::query_as::<_, Tender>(&query)
            .bind(&tender.name)
            .bind(&tender.description)
            .bind(&tender.service_type)
            .bind(TenderStatus::Created)
            .bind(tender.organization_id)
            .bind(&tender.creator_username)
            .fetch_one(&mut *self.0)
            .await
            .map_err(map_db_error("insert tender"))?;
        Ok(row.into())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_tender",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_tender",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_tender(
        &mut self,
        id: entities::TenderId,
    ) -> Result<Option<entities::Tender>, RestError> {
        let query = format!("SELECT {} FROM tender WHERE id = $1", TENDER_COLUMNS);
        let row = sqlx::query_as::<_, Tender>(&query)
            .bind(id)
            .fetch_optional(&mut *self.0)
            .await
            .map_err(map_db_error("get tender"))?;
        Ok(row.map(Into::into))
    }

    #[instrument(
        target = "metrics",
        name = "db_get_published_tenders",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_published_tenders",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_published_tenders(
        &mut self,
        service_type: Option<String>,
    ) -> Result<Vec<entities::Tender>, RestError> {
        let query = format!(
            "SELECT {} FROM tender WHERE status = $1 AND ($2::text IS NULL OR service_type = $2) ORDER BY id ASC",
            TENDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, Tender>(&query)
            .bind(TenderStatus::Published)
            .bind(service_type)
            .fetch_all(&mut *self.0)
            .await
            .map_err(map_db_error("get published tenders"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_tenders_by_creator",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_tenders_by_creator",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_tenders_by_creator(
        &mut self,
        username: &str,
    ) -> Result<Vec<entities::Tender>, RestError> {
        let query = format!(
            "SELECT {} FROM tender WHERE creator_username = $1 ORDER BY id ASC",
            TENDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, Tender>(&query)
            .bind(username)
            .fetch_all(&mut *self.0)
            .await
            .map_err(map_db_error("get tenders by creator"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(
        target = "metrics",
        name = "db_update_tender_status",
        fields(
            category = "db_queries",
            result = "success",
            name = "update_tender_status",
            tracing_enabled
        ),
        skip_all
    )]
    async fn update_tender_status(
        &mut self,
        id: entities::TenderId,
        status: entities::TenderStatus,
    ) -> Result<Option<entities::Tender>, RestError> {
        let query = format!(
            "UPDATE tender SET status = $2 WHERE id = $1 RETURNING {}",
            TENDER_COLUMNS
        );
        let row = sqlx::query_as::<_, Tender>(&query)
            .bind(id)
            .bind(TenderStatus::from(status))
            .fetch_optional(&mut *self.0)
            .await
            .map_err(map_db_error("update tender status"))?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl VersionedTable<entities::Tender> for PgTransaction {
    #[instrument(
        target = "metrics",
        name = "db_get_live_tender",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_live_tender",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_live(
        &mut self,
        id: entities::TenderId,
    ) -> Result<Option<entities::Tender>, RestError> {
        self.get_tender(id).await
    }

    #[instrument(
        target = "metrics",
        name = "db_add_tender_history",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_tender_history",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_history(&mut self, snapshot: &entities::Tender) -> Result<(), RestError> {
        sqlx::query(
            "INSERT INTO tender_history (tender_id, name, description, service_type, status, organization_id, creator_username, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (tender_id, version) DO UPDATE SET name = EXCLUDED.name, description = EXCLUDED.description, \
             service_type = EXCLUDED.service_type, status = EXCLUDED.status, organization_id = EXCLUDED.organization_id, \
             creator_username = EXCLUDED.creator_username",
        )
        .bind(snapshot.id)
        .bind(&snapshot.name)
        .bind(&snapshot.description)
        .bind(&snapshot.service_type)
        .bind(TenderStatus::from(snapshot.status))
        .bind(snapshot.organization_id)
        .bind(&snapshot.creator_username)
        .bind(snapshot.version)
        .execute(&mut *self.0)
        .await
        .map_err(map_db_error("insert tender history"))?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_tender_history",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_tender_history",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_history(
        &mut self,
        id: entities::TenderId,
        version: Version,
    ) -> Result<Option<entities::Tender>, RestError> {
        let query = format!(
            "SELECT {} FROM tender_history WHERE tender_id = $1 AND version = $2",
            TENDER_HISTORY_COLUMNS
        );
        let row = sqlx::query_as::<_, Tender>(&query)
            .bind(id)
            .bind(version)
            .fetch_optional(&mut *self.0)
            .await
            .map_err(map_db_error("get tender history"))?;
        Ok(row.map(Into::into))
    }

    #[instrument(
        target = "metrics",
        name = "db_update_tender",
        fields(
            category = "db_queries",
            result = "success",
            name = "update_tender",
            tracing_enabled
        ),
        skip_all
    )]
    async fn update_if_version(
        &mut self,
        tender: &entities::Tender,
        expected_version: Version,
    ) -> Result<bool, RestError> {
        let result = sqlx::query(
            "UPDATE tender SET name = $3, description = $4, service_type = $5, status = $6, \
             organization_id = $7, creator_username = $8, version = $9 WHERE id = $1 AND version = $2",
        )
        .bind(tender.id)
        .bind(expected_version)
        .bind(&tender.name)
        .bind(&tender.description)
        .bind(&tender.service_type)
        .bind(TenderStatus::from(tender.status))
        .bind(tender.organization_id)
        .bind(&tender.creator_username)
        .bind(tender.version)
        .execute(&mut *self.0)
        .await
        .map_err(map_db_error("update tender"))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(
        target = "metrics",
        name = "db_remove_tender_history",
        fields(
            category = "db_queries",
            result = "success",
            name = "remove_tender_history",
            tracing_enabled
        ),
        skip_all
    )]
    async fn remove_history_after(
        &mut self,
        id: entities::TenderId,
        version: Version,
    ) -> Result<u64, RestError> {
        let result = sqlx::query("DELETE FROM tender_history WHERE tender_id = $1 AND version > $2")
            .bind(id)
            .bind(version)
            .execute(&mut *self.0)
            .await
            .map_err(map_db_error("remove tender history"))?;
        Ok(result.rows_affected())
    }
}
