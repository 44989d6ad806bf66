use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;
