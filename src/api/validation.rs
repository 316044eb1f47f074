use super::ApiError;
use crate::services::is_plausible_postcode;

pub fn validate_business_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid business ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_radius(radius_m: u32) -> Result<u32, ApiError> {
    const MAX_RADIUS_M: u32 = 500_000;
    const MIN_RADIUS_M: u32 = 1;

    if !(MIN_RADIUS_M..=MAX_RADIUS_M).contains(&radius_m) {
        return Err(ApiError::validation(format!(
            "Invalid radius: {}. Radius must be between {} and {} meters",
            radius_m, MIN_RADIUS_M, MAX_RADIUS_M
        )));
    }
    Ok(radius_m)
}

pub fn validate_category(category: &str) -> Result<&str, ApiError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Category cannot be empty"));
    }
    if trimmed.len() > 100 {
        return Err(ApiError::validation(
            "Category must be 100 characters or less",
        ));
    }
    Ok(trimmed)
}

pub fn validate_postcode(postcode: &str) -> Result<&str, ApiError> {
    let trimmed = postcode.trim();
    if !is_plausible_postcode(trimmed) {
        return Err(ApiError::validation(format!(
            "Invalid postcode: '{}'. Postcode must be exactly 4 digits",
            postcode
        )));
    }
    Ok(trimmed)
}

pub fn validate_rating_ceiling(rating: f32) -> Result<f32, ApiError> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(ApiError::validation(format!(
            "Invalid rating: {}. Rating must be between 0 and 5",
            rating
        )));
    }
    Ok(rating)
}
