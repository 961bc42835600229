//! Background worker that brings a remote asset's attributes in line with a desired state.
//!
//! The worker is safe to run more than once for the same job: it reads the
//! asset first and only issues an update when the attributes it was asked to
//! set differ from what the asset manager already holds. Jobs delivered twice
//! therefore cause at most one mutation.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::contract::{AssetManager, AssetResource, AttributeMap, ServiceError};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("asset URL {url:?} does not contain an /assets/ id")]
    MalformedAssetUrl { url: Option<String> },
}

/// What a single `perform` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { asset_id: String },
    Unchanged,
}

pub struct AssetManagerUpdateAssetWorker<'a, A: ?Sized> {
    asset_manager: &'a A,
}

impl<'a, A> AssetManagerUpdateAssetWorker<'a, A>
where
    A: AssetManager + ?Sized,
{
    pub fn new(asset_manager: &'a A) -> Self {
        Self { asset_manager }
    }

    /// Set `attributes` on the asset stored under `legacy_url_path`, unless they already hold.
    pub async fn perform(
        &self,
        legacy_url_path: &str,
        attributes: &AttributeMap,
    ) -> Result<UpdateOutcome, WorkerError> {
        let asset = self.asset_manager.whitehall_asset(legacy_url_path).await?;

        if attributes_already_hold(&asset, attributes) {
            debug!(legacy_url_path, "[ASSET] Remote attributes already match, skipping update");
            return Ok(UpdateOutcome::Unchanged);
        }

        let asset_id = asset_id_from_url(asset.self_url()).ok_or_else(|| {
            WorkerError::MalformedAssetUrl {
                url: asset.self_url().map(str::to_string),
            }
        })?;

        info!(
            legacy_url_path,
            asset_id = %asset_id,
            attributes = ?attributes,
            "[ASSET] Updating asset attributes"
        );
        self.asset_manager.update_asset(&asset_id, attributes).await?;
        Ok(UpdateOutcome::Updated { asset_id })
    }
}

/// Whether every desired attribute is present on the remote asset with the same value.
///
/// Numbers compare by value, so a remote `1.0` satisfies a desired `1`.
fn attributes_already_hold(asset: &AssetResource, desired: &AttributeMap) -> bool {
    desired.iter().all(|(key, wanted)| {
        asset
            .attributes
            .get(key)
            .is_some_and(|remote| same_value(remote, wanted))
    })
}

fn same_value(remote: &Value, wanted: &Value) -> bool {
    match (remote, wanted) {
        (Value::Number(a), Value::Number(b)) => a == b || a.as_f64() == b.as_f64(),
        _ => remote == wanted,
    }
}

/// Extract the asset id from a self URL such as `http://asset-manager/assets/asset-id`.
pub fn asset_id_from_url(url: Option<&str>) -> Option<String> {
    static ASSET_ID: OnceLock<Regex> = OnceLock::new();
    let re = ASSET_ID.get_or_init(|| Regex::new(r"/assets/(.*)").expect("static regex is valid"));
    re.captures(url?)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_the_id_after_assets() {
        assert_eq!(
            asset_id_from_url(Some("http://asset-manager/assets/asset-id")),
            Some("asset-id".to_string())
        );
        assert_eq!(asset_id_from_url(Some("http://asset-manager/media/x")), None);
        assert_eq!(asset_id_from_url(Some("http://asset-manager/assets/")), None);
        assert_eq!(asset_id_from_url(None), None);
    }

    fn asset(value: Value) -> AssetResource {
        AssetResource::new(value.as_object().cloned().unwrap())
    }

    fn desired(value: Value) -> AttributeMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn only_requested_keys_are_compared() {
        let remote = asset(json!({"id": "http://a/assets/1", "draft": true, "state": "uploaded"}));
        assert!(attributes_already_hold(&remote, &desired(json!({"draft": true}))));
        assert!(!attributes_already_hold(&remote, &desired(json!({"draft": false}))));
        assert!(attributes_already_hold(&remote, &AttributeMap::new()));
    }

    #[test]
    fn missing_remote_key_is_a_difference() {
        let remote = asset(json!({"id": "http://a/assets/1", "draft": true}));
        assert!(!attributes_already_hold(
            &remote,
            &desired(json!({"draft": true, "redirect_url": null}))
        ));
    }

    #[test]
    fn numbers_compare_by_value() {
        let remote = asset(json!({"id": "http://a/assets/1", "size": 1.0, "version": 3}));
        assert!(attributes_already_hold(&remote, &desired(json!({"size": 1}))));
        assert!(attributes_already_hold(&remote, &desired(json!({"version": 3.0}))));
        assert!(!attributes_already_hold(&remote, &desired(json!({"size": 2}))));
        assert!(!attributes_already_hold(&remote, &desired(json!({"version": "3"}))));
    }
}
