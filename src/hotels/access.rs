// Hotel-scoped access checks shared by every handler under
// /organizations/:org_id/hotels/:hotel_id

use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::hotels::HotelDirectory;

/// Ensure the caller may act on the hotel.
///
/// A token from another organization is Forbidden; a hotel that is not part
/// of the organization is NotFound.
pub async fn authorize_hotel(
    directory: &dyn HotelDirectory,
    user: &AuthenticatedUser,
    organization_id: Uuid,
    hotel_id: Uuid,
) -> ApiResult<()> {
    user.require_organization(organization_id)?;

    if !directory.hotel_in_organization(organization_id, hotel_id).await? {
        return Err(ApiError::not_found("Hotel", hotel_id));
    }
    Ok(())
}

/// Same as `authorize_hotel`, additionally requiring ADMIN or MANAGER
pub async fn authorize_hotel_mutation(
    directory: &dyn HotelDirectory,
    user: &AuthenticatedUser,
    organization_id: Uuid,
    hotel_id: Uuid,
) -> ApiResult<()> {
    authorize_hotel(directory, user, organization_id, hotel_id).await?;
    user.require_manager()?;
    Ok(())
}
