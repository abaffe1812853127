//! Access key validation.

use super::allow_list::AllowList;

/// True iff a key was presented and it is in the allow list.
///
/// Pure: safe to call from any number of requests at once.
pub fn validate(presented_key: Option<&str>, allow_list: &AllowList) -> bool {
    match presented_key {
        Some(key) if !key.is_empty() => allow_list.contains(key),
        _ => false,
    }
}

/// Validation strategy injected into the access-control layer.
///
/// The default implementation checks the shared allow list; tests and
/// embedders can swap in their own.
pub trait AccessKeyValidator: Send + Sync + 'static {
    fn validate(&self, presented_key: Option<&str>) -> bool;
}

impl<F> AccessKeyValidator for F
where
    F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
{
    fn validate(&self, presented_key: Option<&str>) -> bool {
        self(presented_key)
    }
}

impl AccessKeyValidator for super::SharedAllowList {
    fn validate(&self, presented_key: Option<&str>) -> bool {
        validate(presented_key, &self.snapshot())
    }
}
