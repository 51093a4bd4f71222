use {
    crate::{
        api::RestError,
        bid::entities,
        kernel::{
            db::{
                map_db_error,
                PgTransaction,
            },
            entities::Version,
            versioning::VersionedTable,
        },
        tender::entities::TenderId,
    },
    axum::async_trait,
    sqlx::FromRow,
    time::OffsetDateTime,
    tracing::instrument,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "bid_status", rename_all = "UPPERCASE")]
pub enum BidStatus {
    Created,
    Published,
    Canceled,
    Submitted,
    Declined,
}

impl From<BidStatus> for entities::BidStatus {
    fn from(status: BidStatus) -> Self {
        match status {
            BidStatus::Created => entities::BidStatus::Created,
            BidStatus::Published => entities::BidStatus::Published,
            BidStatus::Canceled => entities::BidStatus::Canceled,
            BidStatus::Submitted => entities::BidStatus::Submitted,
            BidStatus::Declined => entities::BidStatus::Declined,
        }
    }
}

impl From<entities::BidStatus> for BidStatus {
    fn from(status: entities::BidStatus) -> Self {
        match status {
            entities::BidStatus::Created => BidStatus::Created,
            entities::BidStatus::Published => BidStatus::Published,
            entities::BidStatus::Canceled => BidStatus::Canceled,
            entities::BidStatus::Submitted => BidStatus::Submitted,
            entities::BidStatus::Declined => BidStatus::Declined,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "decision", rename_all = "UPPERCASE")]
pub enum DecisionStatus {
    Submitted,
    Declined,
}

impl From<DecisionStatus> for entities::DecisionStatus {
    fn from(status: DecisionStatus) -> Self {
        match status {
            DecisionStatus::Submitted => entities::DecisionStatus::Submitted,
            DecisionStatus::Declined => entities::DecisionStatus::Declined,
        }
    }
}

impl From<entities::DecisionStatus> for DecisionStatus {
    fn from(status: entities::DecisionStatus) -> Self {
        match status {
            entities::DecisionStatus::Submitted => DecisionStatus::Submitted,
            entities::DecisionStatus::Declined => DecisionStatus::Declined,
        }
    }
}

/// A row of `bid`, or of `bid_history` with `bid_id` selected as `id`.
#[derive(Clone, Debug, FromRow)]
pub struct Bid {
    pub id:               i32,
    pub name:             String,
    pub description:      String,
    pub status:           BidStatus,
    pub tender_id:        i32,
    pub organization_id:  Option<i32>,
    pub creator_username: String,
    pub version:          i32,
}

impl From<Bid> for entities::Bid {
    fn from(bid: Bid) -> Self {
        entities::Bid {
            id:               bid.id,
            name:             bid.name,
            description:      bid.description,
            status:           bid.status.into(),
            tender_id:        bid.tender_id,
            organization_id:  bid.organization_id,
            creator_username: bid.creator_username,
            version:          bid.version,
        }
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct BidDecision {
    pub bid_id:          i32,
    pub username:        String,
    pub decision_status: DecisionStatus,
    pub decision_time:   OffsetDateTime,
}

impl From<BidDecision> for entities::BidDecision {
    fn from(decision: BidDecision) -> Self {
        entities::BidDecision {
            bid_id:        decision.bid_id,
            username:      decision.username,
            decision:      decision.decision_status.into(),
            decision_time: decision.decision_time,
        }
    }
}

const BID_COLUMNS: &str =
    "id, name, description, status, tender_id, organization_id, creator_username, version";
const BID_HISTORY_COLUMNS: &str = "bid_id AS id, name, description, status, tender_id, \
                                   organization_id, creator_username, version";

#[async_trait]
pub trait BidTable: VersionedTable<entities::Bid> {
    /// Stores a new bid with status CREATED and version 1.
    async fn add_bid(&mut self, bid: &entities::BidCreate) -> Result<entities::Bid, RestError>;
    async fn get_bid(&mut self, id: entities::BidId) -> Result<Option<entities::Bid>, RestError>;
    /// Reads the bid and locks its row until the end of the transaction.
    async fn get_bid_for_update(
        &mut self,
        id: entities::BidId,
    ) -> Result<Option<entities::Bid>, RestError>;
    async fn get_bids_by_tender(
        &mut self,
        tender_id: TenderId,
    ) -> Result<Vec<entities::Bid>, RestError>;
    async fn get_bids_by_creator(
        &mut self,
        username: &str,
    ) -> Result<Vec<entities::Bid>, RestError>;
    /// Returns the updated bid, or `None` if it does not exist.
    async fn update_bid_status(
        &mut self,
        id: entities::BidId,
        status: entities::BidStatus,
    ) -> Result<Option<entities::Bid>, RestError>;
}

#[async_trait]
pub trait DecisionTable: Send {
    /// Records the decision of the user, replacing any earlier decision of the same user on the bid.
    async fn upsert_decision(
        &mut self,
        bid_id: entities::BidId,
        username: &str,
        decision: entities::DecisionStatus,
    ) -> Result<entities::BidDecision, RestError>;
    async fn count_decisions(
        &mut self,
        bid_id: entities::BidId,
        decision: entities::DecisionStatus,
    ) -> Result<i64, RestError>;
}

#[async_trait]
impl BidTable for PgTransaction {
    #[instrument(
        target = "metrics",
        name = "db_add_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_bid(&mut self, bid: &entities::BidCreate) -> Result<entities::Bid, RestError> {
        let query = format!(
            "INSERT INTO bid (name, description, status, tender_id, organization_id, creator_username, version) \
             VALUES ($1, $2, $3, $4, $5, $6, 1) RETURNING {}",
            BID_COLUMNS
        );
        let row = sqlx::query_as::<_, Bid>(&query)
            .bind(&bid.name)
            .bind(&bid.description)
            .bind(BidStatus::Created)
            .bind(bid.tender_id)
            .bind(bid.organization_id)
            .bind(&bid.creator_username)
            .fetch_one(&mut *self.0)
            .await
            .map_err(map_db_error("insert bid"))?;
        Ok(row.into())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_bid(&mut self, id: entities::BidId) -> Result<Option<entities::Bid>, RestError> {
        let query = format!("SELECT {} FROM bid WHERE id = $1", BID_COLUMNS);
        let row = sqlx::query_as::<_, Bid>(&query)
            .bind(id)
            .fetch_optional(&mut *self.0)
            .await
            .map_err(map_db_error("get bid"))?;
        Ok(row.map(Into::into))
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bid_for_update",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bid_for_update",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_bid_for_update(
        &mut self,
        id: entities::BidId,
    ) -> Result<Option<entities::Bid>, RestError> {
        let query = format!("SELECT {} FROM bid WHERE id = $1 FOR UPDATE", BID_COLUMNS);
        let row = sqlx::query_as::<_, Bid>(&query)
            .bind(id)
            .fetch_optional(&mut *self.0)
            .await
            .map_err(map_db_error("lock bid"))?;
        Ok(row.map(Into::into))
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bids_by_tender",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bids_by_tender",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_bids_by_tender(
        &mut self,
        tender_id: TenderId,
    ) -> Result<Vec<entities::Bid>, RestError> {
        let query = format!(
            "SELECT {} FROM bid WHERE tender_id = $1 ORDER BY id ASC",
            BID_COLUMNS
        );
        let rows = sqlx::query_as::<_, Bid>(&query)
            .bind(tender_id)
            .fetch_all(&mut *self.0)
            .await
            .map_err(map_db_error("get bids by tender"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bids_by_creator",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bids_by_creator",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_bids_by_creator(
        &mut self,
        username: &str,
    ) -> Result<Vec<entities::Bid>, RestError> {
        let query = format!(
            "SELECT {} FROM bid WHERE creator_username = $1 ORDER BY id ASC",
            BID_COLUMNS
        );
        let rows = sqlx::query_as::<_, Bid>(&query)
            .bind(username)
            .fetch_all(&mut *self.0)
            .await
            .map_err(map_db_error("get bids by creator"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(
        target = "metrics",
        name = "db_update_bid_status",
        fields(
            category = "db_queries",
            result = "success",
            name = "update_bid_status",
            tracing_enabled
        ),
        skip_all
    )]
    async fn update_bid_status(
        &mut self,
        id: entities::BidId,
        status: entities::BidStatus,
    ) -> Result<Option<entities::Bid>, RestError> {
        let query = format!(
            "UPDATE bid SET status = $2 WHERE id = $1 RETURNING {}",
            BID_COLUMNS
        );
        let row = sqlx::query_as::<_, Bid>(&query)
            .bind(id)
            .bind(BidStatus::from(status))
            .fetch_optional(&mut *self.0)
            .await
            .map_err(map_db_error("update bid status"))?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl VersionedTable<entities::Bid> for PgTransaction {
    #[instrument(
        target = "metrics",
        name = "db_get_live_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_live_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_live(&mut self, id: entities::BidId) -> Result<Option<entities::Bid>, RestError> {
        self.get_bid(id).await
    }

    #[instrument(
        target = "metrics",
        name = "db_add_bid_history",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_bid_history",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_history(&mut self, snapshot: &entities::Bid) -> Result<(), RestError> {
        sqlx::query(
            "INSERT INTO bid_history (bid_id, name, description, status, tender_id, organization_id, creator_username, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (bid_id, version) DO UPDATE SET name = EXCLUDED.name, description = EXCLUDED.description, \
             status = EXCLUDED.status, tender_id = EXCLUDED.tender_id, organization_id = EXCLUDED.organization_id, \
             creator_username = EXCLUDED.creator_username",
        )
        .bind(snapshot.id)
        .bind(&snapshot.name)
        .bind(&snapshot.description)
        .bind(BidStatus::from(snapshot.status))
        .bind(snapshot.tender_id)
        .bind(snapshot.organization_id)
        .bind(&snapshot.creator_username)
        .bind(snapshot.version)
        .execute(&mut *self.0)
        .await
        .map_err(map_db_error("insert bid history"))?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bid_history",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bid_history",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_history(
        &mut self,
        id: entities::BidId,
        version: Version,
    ) -> Result<Option<entities::Bid>, RestError> {
        let query = format!(
            "SELECT {} FROM bid_history WHERE bid_id = $1 AND version = $2",
            BID_HISTORY_COLUMNS
        );
        let row = sqlx::query_as::<_, Bid>(&query)
            .bind(id)
            .bind(version)
            .fetch_optional(&mut *self.0)
            .await
            .map_err(map_db_error("get bid history"))?;
        Ok(row.map(Into::into))
    }

    #[instrument(
        target = "metrics",
        name = "db_update_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "update_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn update_if_version(
        &mut self,
        bid: &entities::Bid,
        expected_version: Version,
    ) -> Result<bool, RestError> {
        let result = sqlx::query(
            "UPDATE bid SET name = $3, description = $4, status = $5, tender_id = $6, \
             organization_id = $7, creator_username = $8, version = $9 WHERE id = $1 AND version = $2",
        )
        .bind(bid.id)
        .bind(expected_version)
        .bind(&bid.name)
        .bind(&bid.description)
        .bind(BidStatus::from(bid.status))
        .bind(bid.tender_id)
        .bind(bid.organization_id)
        .bind(&bid.creator_username)
        .bind(bid.version)
        .execute(&mut *self.0)
        .await
        .map_err(map_db_error("update bid"))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(
        target = "metrics",
        name = "db_remove_bid_history",
        fields(
            category = "db_queries",
            result = "success",
            name = "remove_bid_history",
            tracing_enabled
        ),
        skip_all
    )]
    async fn remove_history_after(
        &mut self,
        id: entities::BidId,
        version: Version,
    ) -> Result<u64, RestError> {
        let result = sqlx::query("DELETE FROM bid_history WHERE bid_id = $1 AND version > $2")
            .bind(id)
            .bind(version)
            .execute(&mut *self.0)
            .await
            .map_err(map_db_error("remove bid history"))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl DecisionTable for PgTransaction {
    #[instrument(
        target = "metrics",
        name = "db_upsert_decision",
        fields(
            category = "db_queries",
            result = "success",
            name = "upsert_decision",
            tracing_enabled
        ),
        skip_all
    )]
    async fn upsert_decision(
        &mut self,
        bid_id: entities::BidId,
        username: &str,
        decision: entities::DecisionStatus,
    ) -> Result<entities::BidDecision, RestError> {
        let row = sqlx::query_as::<_, BidDecision>(
            "INSERT INTO bid_decisions (bid_id, username, decision_status, decision_time) VALUES ($1, $2, $3, now()) \
             ON CONFLICT (bid_id, username) DO UPDATE SET decision_status = EXCLUDED.decision_status, \
             decision_time = EXCLUDED.decision_time \
             RETURNING bid_id, username, decision_status, decision_time",
        )
        .bind(bid_id)
        .bind(username)
        .bind(DecisionStatus::from(decision))
        .fetch_one(&mut *self.0)
        .await
        .map_err(map_db_error("upsert decision"))?;
        Ok(row.into())
    }

    #[instrument(
        target = "metrics",
        name = "db_count_decisions",
        fields(
            category = "db_queries",
            result = "success",
            name = "count_decisions",
            tracing_enabled
        ),
        skip_all
    )]
    async fn count_decisions(
        &mut self,
        bid_id: entities::BidId,
        decision: entities::DecisionStatus,
    ) -> Result<i64, RestError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bid_decisions WHERE bid_id = $1 AND decision_status = $2",
        )
        .bind(bid_id)
        .bind(DecisionStatus::from(decision))
        .fetch_one(&mut *self.0)
        .await
        .map_err(map_db_error("count decisions"))
    }
}
