use {
    super::{
        entities::{
            BidCreationCheck,
            OrganizationId,
            UserId,
        },
        repository::IdentityTable,
    },
    crate::{
        api::RestError,
        bid::entities::BidId,
        tender::entities::TenderId,
    },
};

pub async fn resolve_user_id<T>(table: &mut T, username: &str) -> Result<UserId, RestError>
where
    T: IdentityTable + ?Sized,
{
    table
        .get_user_id(username)
        .await?
        .ok_or(RestError::UserNotFound)
}

pub async fn is_responsible_for<T>(
    table: &mut T,
    user_id: UserId,
    organization_id: OrganizationId,
) -> Result<bool, RestError>
where
    T: IdentityTable + ?Sized,
{
    Ok(table.count_responsibilities(user_id, organization_id).await? > 0)
}

/// The user is the bid author or responsible for the bid organization.
///
/// A bid without an organization grants no permission, not even to its author.
pub async fn has_bid_permission<T>(
    table: &mut T,
    bid_id: BidId,
    username: &str,
) -> Result<bool, RestError>
where
    T: IdentityTable + ?Sized,
{
    let user_id = resolve_user_id(table, username).await?;
    Ok(table.count_bid_permissions(bid_id, username, user_id).await? > 0)
}

/// The user authored, or is responsible for the organization of, at least one bid on the tender.
pub async fn has_tender_permission<T>(
    table: &mut T,
    tender_id: TenderId,
    username: &str,
) -> Result<bool, RestError>
where
    T: IdentityTable + ?Sized,
{
    let user_id = resolve_user_id(table, username).await?;
    Ok(table
        .count_tender_permissions(tender_id, username, user_id)
        .await?
        > 0)
}

pub async fn passes_bid_creation_check<T>(
    table: &mut T,
    user_id: UserId,
    organization_id: OrganizationId,
    check: BidCreationCheck,
) -> Result<bool, RestError>
where
    T: IdentityTable + ?Sized,
{
    let count = match check {
        BidCreationCheck::Loose => {
            table
                .count_loose_responsibilities(user_id, organization_id)
                .await?
        }
        BidCreationCheck::Strict => {
            table
                .count_responsibilities(user_id, organization_id)
                .await?
        }
    };
    Ok(count > 0)
}
