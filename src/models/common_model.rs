use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_SKIP: u64 = 0;
pub const DEFAULT_TAKE: u64 = 20;
/// LIMIT and OFFSET are bound as signed 64-bit integers.
pub const MAX_WINDOW: u64 = i64::MAX as u64;

/// Raw `?skip=&take=` query.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(max = MAX_WINDOW, message = "must not be greater than 9223372036854775807"))]
    pub skip: Option<u64>,
    #[validate(range(max = MAX_WINDOW, message = "must not be greater than 9223372036854775807"))]
    pub take: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub take: u64,
}

impl Pagination {
    pub fn fits_sql(&self) -> bool {
        self.skip <= MAX_WINDOW && self.take <= MAX_WINDOW
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { skip: DEFAULT_SKIP, take: DEFAULT_TAKE }
    }
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self {
            skip: params.skip.unwrap_or(DEFAULT_SKIP),
            take: params.take.unwrap_or(DEFAULT_TAKE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindAllResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub take: u64,
    pub skip: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let pagination = Pagination::from(PaginationParams::default());
        assert_eq!(pagination, Pagination { skip: 0, take: 20 });
    }

    #[test]
    fn explicit_params_are_kept() {
        let pagination = Pagination::from(PaginationParams { skip: Some(5), take: Some(2) });
        assert_eq!(pagination, Pagination { skip: 5, take: 2 });
    }

    #[test]
    fn windows_beyond_i64_are_rejected() {
        let params = PaginationParams { skip: Some(u64::MAX), take: Some(MAX_WINDOW) };
        let errors = params.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("skip"));
        assert!(!errors.field_errors().contains_key("take"));

        assert!(Pagination { skip: MAX_WINDOW, take: 20 }.fits_sql());
        assert!(!Pagination { skip: 0, take: u64::MAX }.fits_sql());
    }
}
