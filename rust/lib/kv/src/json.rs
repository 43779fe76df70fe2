use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::KVError;
use crate::traits::KVStore;

/// Read a JSON-encoded value. A missing key reads as `None`.
pub fn get_json<T, S>(store: &S, key: &str) -> Result<Option<T>, KVError>
where
    T: DeserializeOwned,
    S: KVStore + ?Sized,
{
    match store.get(key)? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| KVError::Serialization(format!("{key}: {e}"))),
        None => Ok(None),
    }
}

/// Write a value as JSON, replacing whatever was stored under `key`.
pub fn set_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), KVError>
where
    T: Serialize + ?Sized,
    S: KVStore + ?Sized,
{
    let bytes =
        serde_json::to_vec(value).map_err(|e| KVError::Serialization(format!("{key}: {e}")))?;
    store.set(key, &bytes)
}
