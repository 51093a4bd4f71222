use {
    super::entities::{
        OrganizationId,
        UserId,
    },
    crate::{
        api::RestError,
        bid::entities::BidId,
        kernel::db::{
            map_db_error,
            PgTransaction,
        },
        tender::entities::TenderId,
    },
    axum::async_trait,
    tracing::instrument,
};

/// Read access to the employee and organization tables, which are owned by another system.
#[async_trait]
pub trait IdentityTable: Send {
    async fn get_user_id(&mut self, username: &str) -> Result<Option<UserId>, RestError>;
    /// Rows linking exactly this user to exactly this organization.
    async fn count_responsibilities(
        &mut self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<i64, RestError>;
    /// Rows naming either this user or this organization.
    async fn count_loose_responsibilities(
        &mut self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<i64, RestError>;
    async fn count_organization_responsibles(
        &mut self,
        organization_id: OrganizationId,
    ) -> Result<i64, RestError>;
    /// Rows of the bid joined with the responsibles of its organization where the user is the bid
    /// author or one of those responsibles.
    async fn count_bid_permissions(
        &mut self,
        bid_id: BidId,
        username: &str,
        user_id: UserId,
    ) -> Result<i64, RestError>;
    /// Same as `count_bid_permissions` over every bid of the tender.
    async fn count_tender_permissions(
        &mut self,
        tender_id: TenderId,
        username: &str,
        user_id: UserId,
    ) -> Result<i64, RestError>;
}

#[async_trait]
impl IdentityTable for PgTransaction {
    #[instrument(
        target = "metrics",
        name = "db_get_user_id",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_user_id",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_user_id(&mut self, username: &str) -> Result<Option<UserId>, RestError> {
        sqlx::query_scalar::<_, UserId>("SELECT id FROM employee WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *self.0)
            .await
            .map_err(map_db_error("get user id"))
    }

    #[instrument(
        target = "metrics",
        name = "db_count_responsibilities",
        fields(
            category = "db_queries",
            result = "success",
            name = "count_responsibilities",
            tracing_enabled
        ),
        skip_all
    )]
    async fn count_responsibilities(
        &mut self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<i64, RestError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM organization_responsible WHERE user_id = $1 AND organization_id = $2",
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_one(&mut *self.0)
        .await
        .map_err(map_db_error("count responsibilities"))
    }

    #[instrument(
        target = "metrics",
        name = "db_count_loose_responsibilities",
        fields(
            category = "db_queries",
            result = "success",
            name = "count_loose_responsibilities",
            tracing_enabled
        ),
        skip_all
    )]
    async fn count_loose_responsibilities(
        &mut self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<i64, RestError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM organization_responsible WHERE user_id = $1 OR organization_id = $2",
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_one(&mut *self.0)
        .await
        .map_err(map_db_error("count loose responsibilities"))
    }

    #[instrument(
        target = "metrics",
        name = "db_count_organization_responsibles",
        fields(
            category = "db_queries",
            result = "success",
            name = "count_organization_responsibles",
            tracing_enabled
        ),
        skip_all
    )]
    async fn count_organization_responsibles(
        &mut self,
        organization_id: OrganizationId,
    ) -> Result<i64, RestError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM organization_responsible WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_one(&mut *self.0)
        .await
        .map_err(map_db_error("count organization responsibles"))
    }

    #[instrument(
        target = "metrics",
        name = "db_count_bid_permissions",
        fields(
            category = "db_queries",
            result = "success",
            name = "count_bid_permissions",
            tracing_enabled
        ),
        skip_all
    )]
    async fn count_bid_permissions(
        &mut self,
        bid_id: BidId,
        username: &str,
        user_id: UserId,
    ) -> Result<i64, RestError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bid \
             JOIN organization_responsible ON bid.organization_id = organization_responsible.organization_id \
             WHERE bid.id = $1 AND (bid.creator_username = $2 OR organization_responsible.user_id = $3)",
        )
        .bind(bid_id)
        .bind(username)
        .bind(user_id)
        .fetch_one(&mut *self.0)
        .await
        .map_err(map_db_error("count bid permissions"))
    }

    #[instrument(
        target = "metrics",
        name = "db_count_tender_permissions",
        fields(
            category = "db_queries",
            result = "success",
            name = "count_tender_permissions",
            tracing_enabled
        ),
        skip_all
    )]
    async fn count_tender_permissions(
        &mut self,
        tender_id: TenderId,
        username: &str,
        user_id: UserId,
    ) -> Result<i64, RestError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bid \
             JOIN organization_responsible ON bid.organization_id = organization_responsible.organization_id \
             WHERE bid.tender_id = $1 AND (bid.creator_username = $2 OR organization_responsible.user_id = $3)",
        )
        .bind(tender_id)
        .bind(username)
        .bind(user_id)
        .fetch_one(&mut *self.0)
        .await
        .map_err(map_db_error("count tender permissions"))
    }
}
