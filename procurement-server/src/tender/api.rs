use {
    super::{
        entities,
        service::{
            create_tender::CreateTenderInput,
            edit_tender::EditTenderInput,
            get_my_tenders::GetMyTendersInput,
            get_tender::GetTenderInput,
            get_tenders::GetTendersInput,
            rollback_tender::RollbackTenderInput,
            set_tender_status::SetTenderStatusInput,
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
        tender::{
            GetTendersQueryParams,
            Route,
            Tender,
            TenderCreate,
            TenderCreated,
            TenderEdit,
            TenderId,
            TenderStatus,
            TenderStatusUpdate,
            Tenders,
            UsernameQueryParams,
        },
        ErrorBodyResponse,
    },
    std::sync::Arc,
};

/// List published tenders.
///
/// Tenders are ordered by id. Use `serviceType` to only get tenders of one service type.
#[utoipa::path(get, path = "/api/tenders", params(GetTendersQueryParams), responses(
    (status = 200, body = Tenders),
    (status = 500, response = ErrorBodyResponse),
),)]
pub async fn get_tenders(
    State(store): State<Arc<Store>>,
    Query(params): Query<GetTendersQueryParams>,
) -> Result<Json<Tenders>, RestError> {
    let tenders = store
        .tender_service
        .get_tenders(GetTendersInput {
            service_type: params.service_type.filter(|s| !s.is_empty()),
        })
        .await?;
    Ok(Json(Tenders {
        message: "List of tenders".to_string(),
        tenders: tenders.into_iter().map(Into::into).collect(),
    }))
}

/// List the tenders created by a user.
#[utoipa::path(get, path = "/api/tenders/my", params(UsernameQueryParams), responses(
    (status = 200, body = Tenders),
    (status = 400, response = ErrorBodyResponse),
),)]
pub async fn get_my_tenders(
    State(store): State<Arc<Store>>,
    Query(params): Query<UsernameQueryParams>,
) -> Result<Json<Tenders>, RestError> {
    require_non_empty("username", &params.username)?;
    let tenders = store
        .tender_service
        .get_my_tenders(GetMyTendersInput {
            username: params.username,
        })
        .await?;
    Ok(Json(Tenders {
        message: "List of user tenders".to_string(),
        tenders: tenders.into_iter().map(Into::into).collect(),
    }))
}

/// Create a new tender.
///
/// The creator must be responsible for the organization. The tender starts in CREATED status with version 1.
#[utoipa::path(post, path = "/api/tenders/new", request_body = TenderCreate, responses(
    (status = 200, description = "Tender was created successfully", body = TenderCreated),
    (status = 400, response = ErrorBodyResponse),
    (status = 403, description = "The creator is not responsible for the organization", body = ErrorBodyResponse),
),)]
pub async fn post_tender(
    State(store): State<Arc<Store>>,
    Json(tender_create): Json<TenderCreate>,
) -> Result<Json<TenderCreated>, RestError> {
    require_non_empty("name", &tender_create.name)?;
    require_non_empty("description", &tender_create.description)?;
    require_non_empty("serviceType", &tender_create.service_type)?;
    require_non_empty("creatorUsername", &tender_create.creator_username)?;
    let tender = store
        .tender_service
        .create_tender(CreateTenderInput {
            tender: tender_create.into(),
        })
        .await?;
    Ok(Json(TenderCreated {
        message: "Tender created successfully".to_string(),
        tender:  tender.into(),
    }))
}

/// Get a tender by id.
#[utoipa::path(get, path = "/api/tenders/{id}",
    params(("id" = i32, Path, description = "Tender id")),
    responses(
    (status = 200, body = Tender),
    (status = 404, description = "Tender was not found", body = ErrorBodyResponse),
),)]
pub async fn get_tender(
    State(store): State<Arc<Store>>,
    Path(tender_id): Path<TenderId>,
) -> Result<Json<Tender>, RestError> {
    let tender = store
        .tender_service
        .get_tender(GetTenderInput { tender_id })
        .await?;
    Ok(Json(tender.into()))
}

/// Change the status of a tender.
///
/// Only PUBLISHED and CLOSED can be set. Setting the current status again is a no-op.
#[utoipa::path(patch, path = "/api/tenders/status/{id}",
    params(("id" = i32, Path, description = "Tender id")),
    request_body = TenderStatusUpdate,
    responses(
    (status = 200, body = Tender),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Tender was not found", body = ErrorBodyResponse),
),)]
pub async fn patch_tender_status(
    State(store): State<Arc<Store>>,
    Path(tender_id): Path<TenderId>,
    Json(update): Json<TenderStatusUpdate>,
) -> Result<Json<Tender>, RestError> {
    let tender = store
        .tender_service
        .set_tender_status(SetTenderStatusInput {
            tender_id,
            status: update.status.into(),
        })
        .await?;
    Ok(Json(tender.into()))
}

/// Edit a tender.
///
/// The previous state is kept in the history and the version is incremented.
#[utoipa::path(patch, path = "/api/tenders/{id}/edit",
    params(("id" = i32, Path, description = "Tender id")),
    request_body = TenderEdit,
    responses(
    (status = 200, body = Tender),
    (status = 404, description = "Tender was not found", body = ErrorBodyResponse),
    (status = 409, description = "The tender was edited concurrently", body = ErrorBodyResponse),
),)]
pub async fn patch_tender_edit(
    State(store): State<Arc<Store>>,
    Path(tender_id): Path<TenderId>,
    Json(edit): Json<TenderEdit>,
) -> Result<Json<Tender>, RestError> {
    let tender = store
        .tender_service
        .edit_tender(EditTenderInput {
            tender_id,
            changes: edit.into(),
        })
        .await?;
    Ok(Json(tender.into()))
}

/// Roll a tender back to a previous version.
///
/// The restored state is stored as a new version, so versions keep increasing.
#[utoipa::path(put, path = "/api/tenders/{id}/rollback/{version}",
    params(
    ("id" = i32, Path, description = "Tender id"),
    ("version" = i32, Path, description = "Version to restore"),
    ),
    responses(
    (status = 200, body = Tender),
    (status = 404, description = "Tender or version was not found", body = ErrorBodyResponse),
    (status = 409, description = "The tender was edited concurrently", body = ErrorBodyResponse),
),)]
pub async fn put_tender_rollback(
    State(store): State<Arc<Store>>,
    Path((tender_id, version)): Path<(TenderId, Version)>,
) -> Result<Json<Tender>, RestError> {
    let tender = store
        .tender_service
        .rollback_tender(RollbackTenderInput { tender_id, version })
        .await?;
    Ok(Json(tender.into()))
}

pub fn get_routes() -> Router<Arc<Store>> {
    WrappedRouter::new()
        .route(Route::GetTenders, get_tenders)
        .route(Route::GetMyTenders, get_my_tenders)
        .route(Route::PostTender, post_tender)
        .route(Route::GetTender, get_tender)
        .route(Route::PatchTenderStatus, patch_tender_status)
        .route(Route::PatchTenderEdit, patch_tender_edit)
        .route(Route::PutTenderRollback, put_tender_rollback)
        .router
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

impl From<TenderStatus> for entities::TenderStatus {
    fn from(status: TenderStatus) -> Self {
        match status {
            TenderStatus::Created => entities::TenderStatus::Created,
            TenderStatus::Published => entities::TenderStatus::Published,
            TenderStatus::Closed => entities::TenderStatus::Closed,
        }
    }
}

impl From<entities::Tender> for Tender {
    fn from(tender: entities::Tender) -> Self {
        Tender {
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

impl From<TenderCreate> for entities::TenderCreate {
    fn from(tender: TenderCreate) -> Self {
        entities::TenderCreate {
            name:             tender.name,
            description:      tender.description,
            service_type:     tender.service_type,
            organization_id:  tender.organization_id,
            creator_username: tender.creator_username,
        }
    }
}

impl From<TenderEdit> for entities::TenderChanges {
    fn from(edit: TenderEdit) -> Self {
        entities::TenderChanges {
            name:         edit.name,
            description:  edit.description,
            service_type: edit.service_type,
        }
    }
}
