//! Access keys: the allow list and the validator over it.

pub mod allow_list;
pub mod validator;

pub use allow_list::{AllowList, AllowListError, SharedAllowList};
pub use validator::{validate, AccessKeyValidator};
