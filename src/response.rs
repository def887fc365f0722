use serde::Serialize;
use utoipa::ToSchema;

/// Paging info attached to list responses.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    /// Unpaged lists report everything as page one.
    pub fn single_page(total: usize) -> Self {
        let total = total as i64;
        Self::new(1, total, total)
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

/// Envelope shared by every endpoint, errors included.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// Acknowledges a mutation that has nothing to return.
    pub fn done(message: impl Into<String>) -> Self {
        Self::success(message, serde_json::json!({}), Some(Meta::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_meta_mirrors_count() {
        let meta = Meta::single_page(3);
        assert_eq!(meta.page, Some(1));
        assert_eq!(meta.per_page, Some(3));
        assert_eq!(meta.total, Some(3));
    }

    #[test]
    fn done_carries_empty_object() {
        let resp = ApiResponse::done("Deleted");
        assert_eq!(resp.message, "Deleted");
        assert_eq!(resp.data, Some(serde_json::json!({})));
    }
}
