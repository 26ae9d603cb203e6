//! Asset library: an ordered catalog of uploaded files keyed by id.
//!
//! Assets are never collected automatically. Removing one does not touch
//! content that still references its URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Logo,
    Video,
}

impl std::str::FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(AssetKind::Image),
            "logo" => Ok(AssetKind::Logo),
            "video" => Ok(AssetKind::Video),
            other => Err(format!("unknown asset type {other:?} (expected image, logo or video)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub url: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Partial update merged into an existing asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub size: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl AssetPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("An asset with id {0:?} already exists")]
    DuplicateId(String),

    #[error("Asset not found: {0}")]
    NotFound(String),
}

/// Serialized as a plain array; repeated ids collapse on the way in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Asset>", into = "Vec<Asset>")]
pub struct AssetLibrary {
    assets: Vec<Asset>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library, keeping the first asset for any repeated id
    pub fn from_assets(assets: Vec<Asset>) -> Self {
        let mut library = Self::new();
        for asset in assets {
            if let Err(err) = library.add(asset) {
                tracing::warn!(%err, "dropping asset with repeated id");
            }
        }
        library
    }

    pub fn add(&mut self, asset: Asset) -> Result<(), AssetError> {
        if self.get(&asset.id).is_some() {
            return Err(AssetError::DuplicateId(asset.id));
        }
        self.assets.push(asset);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Asset> {
        let position = self.assets.iter().position(|a| a.id == id)?;
        Some(self.assets.remove(position))
    }

    pub fn update(&mut self, id: &str, patch: AssetPatch) -> Result<&Asset, AssetError> {
        let asset = self
            .assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AssetError::NotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            asset.name = name;
        }
        if let Some(url) = patch.url {
            asset.url = url;
        }
        if patch.size.is_some() {
            asset.size = patch.size;
        }
        if patch.width.is_some() {
            asset.width = patch.width;
        }
        if patch.height.is_some() {
            asset.height = patch.height;
        }

        Ok(asset)
    }

    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn of_kind(&self, kind: AssetKind) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(move |a| a.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl From<Vec<Asset>> for AssetLibrary {
    fn from(assets: Vec<Asset>) -> Self {
        Self::from_assets(assets)
    }
}

impl From<AssetLibrary> for Vec<Asset> {
    fn from(library: AssetLibrary) -> Self {
        library.assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn asset(id: &str, kind: AssetKind) -> Asset {
        Asset {
            id: id.to_string(),
            url: format!("https://cdn.test/{id}"),
            name: id.to_string(),
            kind,
            uploaded_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            size: Some(1024),
            width: None,
            height: None,
        }
    }

    #[test]
    fn test_add_keeps_order_and_rejects_duplicates() {
        let mut library = AssetLibrary::new();
        library.add(asset("a", AssetKind::Image)).unwrap();
        library.add(asset("b", AssetKind::Logo)).unwrap();

        let err = library.add(asset("a", AssetKind::Video)).unwrap_err();
        assert_eq!(err, AssetError::DuplicateId("a".into()));

        let ids: Vec<_> = library.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut library = AssetLibrary::from_assets(vec![
            asset("a", AssetKind::Image),
            asset("b", AssetKind::Image),
        ]);

        assert_eq!(library.remove("a").map(|a| a.id), Some("a".to_string()));
        assert!(library.remove("a").is_none());
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_update_merges_patch() {
        let mut library = AssetLibrary::from_assets(vec![asset("a", AssetKind::Image)]);

        let updated = library
            .update("a", AssetPatch { width: Some(640), ..AssetPatch::rename("Hero") })
            .unwrap();
        assert_eq!(updated.name, "Hero");
        assert_eq!(updated.width, Some(640));
        assert_eq!(updated.size, Some(1024));

        assert_eq!(
            library.update("zzz", AssetPatch::default()).unwrap_err(),
            AssetError::NotFound("zzz".into())
        );
    }

    #[test]
    fn test_of_kind_and_duplicate_collapse() {
        let library = AssetLibrary::from_assets(vec![
            asset("a", AssetKind::Image),
            asset("b", AssetKind::Logo),
            asset("a", AssetKind::Logo),
            asset("c", AssetKind::Image),
        ]);

        assert_eq!(library.len(), 3);
        let images: Vec<_> = library.of_kind(AssetKind::Image).map(|a| a.id.as_str()).collect();
        assert_eq!(images, vec!["a", "c"]);
    }

    #[test]
    fn test_asset_wire_shape() {
        let json = serde_json::to_value(asset("a", AssetKind::Logo)).unwrap();
        assert_eq!(json["type"], "logo");
        assert_eq!(json["uploadedAt"], "2024-05-01T12:00:00Z");
        assert!(json.get("width").is_none());
    }
}
