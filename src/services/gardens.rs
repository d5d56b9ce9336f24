use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::entities::{gardens, users};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::garden::{
    CreateGardenRequest, GardenLocation, GardenSearchQuery, UpdateGardenRequest,
};
use crate::models::user::UserRole;
use crate::repositories::{GardenSearch, GardenUpdate, NewGarden, Store};

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "is required"));
    }
    Ok(name.to_string())
}

fn validate_location(location: GardenLocation) -> Result<serde_json::Value, ValidationError> {
    if location.address.trim().is_empty() {
        return Err(ValidationError::new("location.address", "is required"));
    }
    if let Some(lat) = location.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::new("location.latitude", "must be within -90..90"));
        }
    }
    if let Some(lng) = location.longitude {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ValidationError::new("location.longitude", "must be within -180..180"));
        }
    }
    Ok(json!(location))
}

fn validate_size(size: Option<Decimal>) -> Result<Option<Decimal>, ValidationError> {
    match size {
        Some(s) if s <= Decimal::ZERO => {
            Err(ValidationError::new("size_sqm", "must be greater than zero"))
        }
        other => Ok(other),
    }
}

pub async fn create_garden(
    store: &dyn Store,
    owner: &users::Model,
    request: CreateGardenRequest,
) -> AppResult<gardens::Model> {
    if owner.role != UserRole::GardenOwner.as_str() {
        return Err(AppError::Forbidden(
            "only garden owners can register gardens".to_string(),
        ));
    }

    let garden = store
        .create_garden(NewGarden {
            owner_id: owner.id,
            name: validate_name(&request.name)?,
            description: request.description,
            location: validate_location(request.location)?,
            garden_type: request.garden_type,
            size_sqm: validate_size(request.size_sqm)?,
            image_urls: request.image_urls,
        })
        .await?;

    tracing::info!("Garden {} registered by {}", garden.id, owner.id);
    Ok(garden)
}

/// Gardens owned by someone else are reported as missing
pub async fn get_owned_garden(
    store: &dyn Store,
    owner_id: Uuid,
    id: Uuid,
) -> AppResult<gardens::Model> {
    match store.find_garden(id).await? {
        Some(g) if g.owner_id == owner_id => Ok(g),
        _ => Err(AppError::NotFound("garden".to_string())),
    }
}

pub async fn list_gardens(store: &dyn Store, owner_id: Uuid) -> AppResult<Vec<gardens::Model>> {
    Ok(store.list_gardens_by_owner(owner_id).await?)
}

pub async fn update_garden(
    store: &dyn Store,
    owner_id: Uuid,
    id: Uuid,
    request: UpdateGardenRequest,
) -> AppResult<gardens::Model> {
    get_owned_garden(store, owner_id, id).await?;

    let update = GardenUpdate {
        name: request.name.as_deref().map(validate_name).transpose()?,
        description: request.description,
        location: request.location.map(validate_location).transpose()?,
        garden_type: request.garden_type,
        size_sqm: validate_size(request.size_sqm)?,
        image_urls: request.image_urls,
        status: request.status,
    };

    Ok(store.update_garden(id, update).await?)
}

pub async fn delete_garden(store: &dyn Store, owner_id: Uuid, id: Uuid) -> AppResult<()> {
    get_owned_garden(store, owner_id, id).await?;
    if !store.delete_garden(id).await? {
        return Err(AppError::NotFound("garden".to_string()));
    }
    tracing::info!("Garden {} deleted by {}", id, owner_id);
    Ok(())
}

pub async fn search_gardens(
    store: &dyn Store,
    query: GardenSearchQuery,
) -> AppResult<Vec<gardens::Model>> {
    if let (Some(min), Some(max)) = (query.min_size, query.max_size) {
        if min > max {
            return Err(ValidationError::new("min_size", "must not exceed max_size").into());
        }
    }

    Ok(store
        .search_gardens(GardenSearch {
            garden_type: query.garden_type,
            location: query
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            min_size: query.min_size,
            max_size: query.max_size,
        })
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::garden::{GardenStatus, GardenType};
    use crate::repositories::{InMemoryStore, NewUser, UserRepository};
    use rust_decimal_macros::dec;

    async fn owner(store: &InMemoryStore, role: UserRole) -> users::Model {
        let id = Uuid::new_v4();
        store
            .create_user(NewUser {
                id,
                email: format!("{id}@example.org"),
                full_name: None,
                role,
                organization_name: None,
                phone: None,
            })
            .await
            .unwrap()
    }

    fn request(name: &str, address: &str, size: Decimal) -> CreateGardenRequest {
        CreateGardenRequest {
            name: name.to_string(),
            description: None,
            location: GardenLocation {
                address: address.to_string(),
                latitude: Some(52.5),
                longitude: Some(13.4),
            },
            garden_type: GardenType::Community,
            size_sqm: Some(size),
            image_urls: vec![],
        }
    }

    #[tokio::test]
    async fn test_only_garden_owners_register_gardens() {
        let store = InMemoryStore::new();
        let ngo = owner(&store, UserRole::Ngo).await;

        let err = create_garden(&store, &ngo, request("Roof", "Berlin", dec!(40)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_garden_validation() {
        let store = InMemoryStore::new();
        let user = owner(&store, UserRole::GardenOwner).await;

        let err = create_garden(&store, &user, request(" ", "Berlin", dec!(40)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref v) if v.field == "name"));

        let err = create_garden(&store, &user, request("Roof", "", dec!(40)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref v) if v.field == "location.address"));
    }

    #[tokio::test]
    async fn test_gardens_are_private_to_their_owner() {
        let store = InMemoryStore::new();
        let user = owner(&store, UserRole::GardenOwner).await;
        let other = owner(&store, UserRole::GardenOwner).await;
        let garden = create_garden(&store, &user, request("Roof", "Berlin", dec!(40)))
            .await
            .unwrap();

        assert!(get_owned_garden(&store, user.id, garden.id).await.is_ok());
        let err = get_owned_garden(&store, other.id, garden.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = delete_garden(&store, other.id, garden.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        delete_garden(&store, user.id, garden.id).await.unwrap();
        assert!(list_gardens(&store, user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_filters_active_gardens() {
        let store = InMemoryStore::new();
        let user = owner(&store, UserRole::GardenOwner).await;
        let small = create_garden(&store, &user, request("Small", "12 Oak St, Berlin", dec!(10)))
            .await
            .unwrap();
        let large = create_garden(&store, &user, request("Large", "3 Elm Rd, Hamburg", dec!(500)))
            .await
            .unwrap();
        let hidden = create_garden(&store, &user, request("Hidden", "Berlin Mitte", dec!(50)))
            .await
            .unwrap();
        update_garden(
            &store,
            user.id,
            hidden.id,
            UpdateGardenRequest {
                status: Some(GardenStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let found = search_gardens(
            &store,
            GardenSearchQuery {
                location: Some("berlin".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(found.iter().map(|g| g.id).collect::<Vec<_>>(), vec![small.id]);

        let found = search_gardens(
            &store,
            GardenSearchQuery {
                min_size: Some(dec!(100)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(found.iter().map(|g| g.id).collect::<Vec<_>>(), vec![large.id]);
    }
}
