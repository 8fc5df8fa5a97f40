use validator::ValidationError;

/// Only images may be uploaded or recorded
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// Rejects MIME types outside `image/*`
pub fn validate_image_content_type(content_type: &str) -> Result<(), ValidationError> {
    if content_type.starts_with(IMAGE_CONTENT_TYPE_PREFIX) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_content_type"))
    }
}
