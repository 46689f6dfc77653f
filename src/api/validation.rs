use super::ApiError;
use crate::constants::limits::MAX_HISTORY_LIMIT;
use crate::domain::SearchId;

pub fn validate_search_id(id: i32) -> Result<SearchId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid search ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(SearchId::new(id))
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_HISTORY_LIMIT}"
        )));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_search_id() {
        assert_eq!(validate_search_id(1).unwrap(), SearchId::new(1));
        assert!(validate_search_id(0).is_err());
        assert!(validate_search_id(-4).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(500).is_ok());
        assert!(validate_limit(1000).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(1001).is_err());
    }
}
