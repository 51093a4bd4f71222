use {
    super::{
        entities,
        service::{
            create_bid::CreateBidInput,
            edit_bid::EditBidInput,
            get_bid::GetBidInput,
            get_bids_for_tender::GetBidsForTenderInput,
            get_my_bids::GetMyBidsInput,
            make_decision::MakeDecisionInput,
            rollback_bid::RollbackBidInput,
            set_bid_status::SetBidStatusInput,
        },
    },
    crate::{
        api::{
            require_non_empty,
            RestError,
            WrappedRouter,
        },
        kernel::entities::Version,
        state::Store,
    },
    axum::{
        extract::{
            Path,
            Query,
            State,
        },
        Json,
        Router,
    },
    procurement_api_types::{
        bid::{
            Bid,
            BidCreate,
            BidDecisionCreate,
            BidDecisionResult,
            BidDecisionStatus,
            BidEdit,
            BidId,
            BidStatus,
            BidStatusUpdate,
            Route,
        },
        tender::{
            TenderId,
            UsernameQueryParams,
        },
        ErrorBodyResponse,
    },
    std::sync::Arc,
};

/// List the bids placed on a tender, ordered by id.
#[utoipa::path(get, path = "/api/bids/{id}/list",
    params(("id" = i32, Path, description = "Tender id")),
    responses(
    (status = 200, body = Vec<Bid>),
    (status = 500, response = ErrorBodyResponse),
),)]
pub async fn get_bids_for_tender(
    State(store): State<Arc<Store>>,
    Path(tender_id): Path<TenderId>,
) -> Result<Json<Vec<Bid>>, RestError> {
    let bids = store
        .bid_service
        .get_bids_for_tender(GetBidsForTenderInput { tender_id })
        .await?;
    Ok(Json(bids.into_iter().map(Into::into).collect()))
}

/// List the bids created by a user.
#[utoipa::path(get, path = "/api/bids/my", params(UsernameQueryParams), responses(
    (status = 200, body = Vec<Bid>),
    (status = 400, response = ErrorBodyResponse),
),)]
pub async fn get_my_bids(
    State(store): State<Arc<Store>>,
    Query(params): Query<UsernameQueryParams>,
) -> Result<Json<Vec<Bid>>, RestError> {
    require_non_empty("username", &params.username)?;
    let bids = store
        .bid_service
        .get_my_bids(GetMyBidsInput {
            username: params.username,
        })
        .await?;
    Ok(Json(bids.into_iter().map(Into::into).collect()))
}

/// Place a new bid on a published tender.
///
/// When an organization is given, the author must be linked to it. The bid starts in CREATED status with version 1.
#[utoipa::path(post, path = "/api/bids/new", request_body = BidCreate, responses(
    (status = 200, description = "Bid was created successfully", body = Bid),
    (status = 400, description = "The tender is not published", body = ErrorBodyResponse),
    (status = 403, response = ErrorBodyResponse),
    (status = 404, description = "Tender or user was not found", body = ErrorBodyResponse),
),)]
pub async fn post_bid(
    State(store): State<Arc<Store>>,
    Json(bid_create): Json<BidCreate>,
) -> Result<Json<Bid>, RestError> {
    require_non_empty("name", &bid_create.name)?;
    require_non_empty("description", &bid_create.description)?;
    require_non_empty("creatorUsername", &bid_create.creator_username)?;
    let bid = store
        .bid_service
        .create_bid(CreateBidInput {
            bid: bid_create.into(),
        })
        .await?;
    Ok(Json(bid.into()))
}

/// Get a bid by id.
#[utoipa::path(get, path = "/api/bids/{id}",
    params(("id" = i32, Path, description = "Bid id")),
    responses(
    (status = 200, body = Bid),
    (status = 404, description = "Bid was not found", body = ErrorBodyResponse),
),)]
pub async fn get_bid(
    State(store): State<Arc<Store>>,
    Path(bid_id): Path<BidId>,
) -> Result<Json<Bid>, RestError> {
    let bid = store.bid_service.get_bid(GetBidInput { bid_id }).await?;
    Ok(Json(bid.into()))
}

/// Change the status of a bid.
///
/// Only PUBLISHED and CANCELED can be set. Setting the current status again is a no-op.
#[utoipa::path(patch, path = "/api/bids/status/{id}",
    params(("id" = i32, Path, description = "Bid id")),
    request_body = BidStatusUpdate,
    responses(
    (status = 200, body = Bid),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Bid was not found", body = ErrorBodyResponse),
),)]
pub async fn patch_bid_status(
    State(store): State<Arc<Store>>,
    Path(bid_id): Path<BidId>,
    Json(update): Json<BidStatusUpdate>,
) -> Result<Json<Bid>, RestError> {
    let bid = store
        .bid_service
        .set_bid_status(SetBidStatusInput {
            bid_id,
            status: update.status.into(),
        })
        .await?;
    Ok(Json(bid.into()))
}

/// Edit a bid. Only the author and the responsibles of the bid organization may edit it.
#[utoipa::path(patch, path = "/api/bids/{id}/edit",
    params(("id" = i32, Path, description = "Bid id"), UsernameQueryParams),
    request_body = BidEdit,
    responses(
    (status = 200, body = Bid),
    (status = 403, response = ErrorBodyResponse),
    (status = 404, description = "Bid was not found", body = ErrorBodyResponse),
    (status = 409, description = "The bid was edited concurrently", body = ErrorBodyResponse),
),)]
pub async fn patch_bid_edit(
    State(store): State<Arc<Store>>,
    Path(bid_id): Path<BidId>,
    Query(params): Query<UsernameQueryParams>,
    Json(edit): Json<BidEdit>,
) -> Result<Json<Bid>, RestError> {
    require_non_empty("username", &params.username)?;
    let bid = store
        .bid_service
        .edit_bid(EditBidInput {
            bid_id,
            username: params.username,
            changes: edit.into(),
        })
        .await?;
    Ok(Json(bid.into()))
}

/// Roll a bid back to a previous version.
///
/// The bid takes the restored version number and the history recorded after it is deleted.
#[utoipa::path(put, path = "/api/bids/{id}/rollback/{version}",
    params(
    ("id" = i32, Path, description = "Bid id"),
    ("version" = i32, Path, description = "Version to restore"),
    UsernameQueryParams,
    ),
    responses(
    (status = 200, body = Bid),
    (status = 403, response = ErrorBodyResponse),
    (status = 404, description = "Bid or version was not found", body = ErrorBodyResponse),
    (status = 409, description = "The bid was edited concurrently", body = ErrorBodyResponse),
),)]
pub async fn put_bid_rollback(
    State(store): State<Arc<Store>>,
    Path((bid_id, version)): Path<(BidId, Version)>,
    Query(params): Query<UsernameQueryParams>,
) -> Result<Json<Bid>, RestError> {
    require_non_empty("username", &params.username)?;
    let bid = store
        .bid_service
        .rollback_bid(RollbackBidInput {
            bid_id,
            username: params.username,
            version,
        })
        .await?;
    Ok(Json(bid.into()))
}

/// Approve a bid.
///
/// The bid is accepted once enough responsibles of its organization approved it. Accepting a bid closes its tender.
#[utoipa::path(patch, path = "/api/bids/{id}/submit_decision",
    params(("id" = i32, Path, description = "Bid id")),
    request_body = BidDecisionCreate,
    responses(
    (status = 200, body = BidDecisionResult),
    (status = 400, description = "The bid is not published", body = ErrorBodyResponse),
    (status = 403, response = ErrorBodyResponse),
    (status = 404, description = "User was not found", body = ErrorBodyResponse),
),)]
pub async fn patch_submit_decision(
    State(store): State<Arc<Store>>,
    Path(bid_id): Path<BidId>,
    Json(decision): Json<BidDecisionCreate>,
) -> Result<Json<BidDecisionResult>, RestError> {
    decide(store, bid_id, decision, BidDecisionStatus::Submitted).await
}

/// Decline a bid. A declined bid can not be accepted anymore.
#[utoipa::path(patch, path = "/api/bids/{id}/decline_decision",
    params(("id" = i32, Path, description = "Bid id")),
    request_body = BidDecisionCreate,
    responses(
    (status = 200, body = BidDecisionResult),
    (status = 400, description = "The bid is not published", body = ErrorBodyResponse),
    (status = 403, response = ErrorBodyResponse),
    (status = 404, description = "User was not found", body = ErrorBodyResponse),
),)]
pub async fn patch_decline_decision(
    State(store): State<Arc<Store>>,
    Path(bid_id): Path<BidId>,
    Json(decision): Json<BidDecisionCreate>,
) -> Result<Json<BidDecisionResult>, RestError> {
    decide(store, bid_id, decision, BidDecisionStatus::Declined).await
}

async fn decide(
    store: Arc<Store>,
    bid_id: BidId,
    decision: BidDecisionCreate,
    status: BidDecisionStatus,
) -> Result<Json<BidDecisionResult>, RestError> {
    require_non_empty("username", &decision.username)?;
    let bid = store
        .bid_service
        .make_decision(MakeDecisionInput {
            bid_id,
            username: decision.username,
            decision: status.into(),
        })
        .await?;
    Ok(Json(BidDecisionResult {
        message: "Decision recorded".to_string(),
        bid:     bid.into(),
    }))
}

pub fn get_routes() -> Router<Arc<Store>> {
    WrappedRouter::new()
        .route(Route::GetBidsForTender, get_bids_for_tender)
        .route(Route::GetMyBids, get_my_bids)
        .route(Route::PostBid, post_bid)
        .route(Route::GetBid, get_bid)
        .route(Route::PatchBidStatus, patch_bid_status)
        .route(Route::PatchBidEdit, patch_bid_edit)
        .route(Route::PutBidRollback, put_bid_rollback)
        .route(Route::PatchSubmitDecision, patch_submit_decision)
        .route(Route::PatchDeclineDecision, patch_decline_decision)
        .router
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

impl From<BidDecisionStatus> for entities::DecisionStatus {
    fn from(status: BidDecisionStatus) -> Self {
        match status {
            BidDecisionStatus::Submitted => entities::DecisionStatus::Submitted,
            BidDecisionStatus::Declined => entities::DecisionStatus::Declined,
        }
    }
}

impl From<entities::Bid> for Bid {
    fn from(bid: entities::Bid) -> Self {
        Bid {
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

impl From<BidCreate> for entities::BidCreate {
    fn from(bid: BidCreate) -> Self {
        entities::BidCreate {
            name:             bid.name,
            description:      bid.description,
            tender_id:        bid.tender_id,
            organization_id:  bid.organization_id,
            creator_username: bid.creator_username,
        }
    }
}

impl From<BidEdit> for entities::BidChanges {
    fn from(edit: BidEdit) -> Self {
        entities::BidChanges {
            name:        edit.name,
            description: edit.description,
        }
    }
}
