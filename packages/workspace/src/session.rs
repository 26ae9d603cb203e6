//! # Authoring Session
//!
//! The process-wide service object a UI talks to. It owns the
//! [`AuthoringState`], keeps a [`PreviewBridge`] in step with the draft and
//! writes a [`PersistedState`] snapshot after every change.
//!
//! Persistence is best effort: a failing write is logged and the in-memory
//! state stays authoritative. In [`SessionMode::EmbeddedPreview`] nothing is
//! read from or written to storage at all, so a preview instance can never
//! clobber the editor's saved state.

use crate::persistence::PersistedState;
use crate::preview::{Navigation, PreviewBridge, PreviewChannel, DEFAULT_SCROLL_DELAY};
use crate::uploads::{self, AssetUploader, DimensionProbe, UploadError, UploadRequest};
use serde::Serialize;
use sitedraft_common::{CommonError, MemoryStorage, StateStorage};
use sitedraft_editor::{
    Asset, AssetKind, AssetPatch, AuthoringState, ContentEdit, ContentStore, EditorError,
    ExportEnvelope, ImportError, LlmProfile, SectionConfigs, SeoRecord, TechnicalSeo, TemplateId,
};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_NAMESPACE: &str = "site-content-storage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Standalone,
    /// Running inside the preview frame; storage is never touched
    EmbeddedPreview,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Storage key the session snapshot lives under
    pub namespace: String,
    pub mode: SessionMode,
    pub scroll_delay: Duration,
    /// Template for a brand new site
    pub template: TemplateId,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            mode: SessionMode::Standalone,
            scroll_delay: DEFAULT_SCROLL_DELAY,
            template: TemplateId::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Stored state under {key:?} is unreadable: {message}")]
    CorruptState { key: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] CommonError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

pub struct AuthoringSession<S: StateStorage> {
    state: AuthoringState,
    is_authenticated: bool,
    storage: S,
    options: SessionOptions,
    preview: PreviewBridge,
}

impl AuthoringSession<MemoryStorage> {
    /// Session for the preview frame: default state, no persistence
    pub fn open_embedded(options: SessionOptions) -> Self {
        let options = SessionOptions {
            mode: SessionMode::EmbeddedPreview,
            ..options
        };
        Self::fresh(MemoryStorage::new(), options)
    }
}

impl<S: StateStorage> AuthoringSession<S> {
    /// Rehydrate from `storage`, or start from defaults if nothing is stored
    pub fn open(storage: S, options: SessionOptions) -> Result<Self, SessionError> {
        if options.mode == SessionMode::EmbeddedPreview {
            return Ok(Self::fresh(storage, options));
        }

        let Some(raw) = storage.load(&options.namespace)? else {
            tracing::debug!(namespace = %options.namespace, "no stored session, starting fresh");
            return Ok(Self::fresh(storage, options));
        };

        let persisted = PersistedState::from_json(&raw).map_err(|e| SessionError::CorruptState {
            key: options.namespace.clone(),
            message: e.to_string(),
        })?;
        let (state, is_authenticated) = persisted.restore();

        tracing::debug!(
            namespace = %options.namespace,
            dirty = state.content.has_unsaved_changes(),
            "session restored"
        );

        Ok(Self {
            state,
            is_authenticated,
            preview: PreviewBridge::new(options.scroll_delay),
            storage,
            options,
        })
    }

    fn fresh(storage: S, options: SessionOptions) -> Self {
        Self {
            state: AuthoringState::with_template(options.template),
            is_authenticated: false,
            preview: PreviewBridge::new(options.scroll_delay),
            storage,
            options,
        }
    }

    pub fn state(&self) -> &AuthoringState {
        &self.state
    }

    pub fn content(&self) -> &ContentStore {
        &self.state.content
    }

    pub fn sections(&self) -> &SectionConfigs {
        &self.state.sections
    }

    pub fn mode(&self) -> SessionMode {
        self.options.mode
    }

    pub fn namespace(&self) -> &str {
        &self.options.namespace
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ---- Content lifecycle ----

    pub fn update_draft<T: Serialize>(&mut self, path: &str, value: T) -> Result<(), SessionError> {
        self.state.content.update_draft(path, value)?;
        self.draft_changed();
        Ok(())
    }

    pub fn apply_edit(&mut self, edit: &ContentEdit) -> Result<(), SessionError> {
        self.state.content.apply(edit)?;
        self.draft_changed();
        Ok(())
    }

    pub fn publish(&mut self) {
        self.state.content.publish();
        self.persist();
    }

    pub fn revert(&mut self) {
        self.state.content.revert();
        self.draft_changed();
    }

    // ---- Sections ----

    pub fn toggle_section(&mut self, page: &str, section: &str) {
        self.state.sections.toggle(page, section);
        self.persist();
    }

    pub fn reorder_sections<C, O>(
        &mut self,
        page: &str,
        canonical: &[C],
        ordered: &[O],
    ) -> Result<(), SessionError>
    where
        C: AsRef<str>,
        O: AsRef<str>,
    {
        self.state
            .sections
            .reorder(page, canonical, ordered)
            .map_err(EditorError::from)?;
        self.persist();
        Ok(())
    }

    pub fn reset_sections<C: AsRef<str>>(&mut self, page: &str, canonical: &[C]) {
        self.state.sections.reset(page, canonical);
        self.persist();
    }

    pub fn reset_all_sections<C: AsRef<str>>(&mut self, canonical: &BTreeMap<String, Vec<C>>) {
        self.state.sections.reset_all(canonical);
        self.persist();
    }

    // ---- Assets ----

    pub fn add_asset(&mut self, asset: Asset) -> Result<(), SessionError> {
        self.state.assets.add(asset).map_err(EditorError::from)?;
        self.persist();
        Ok(())
    }

    pub fn remove_asset(&mut self, id: &str) -> Option<Asset> {
        let removed = self.state.assets.remove(id);
        if removed.is_some() {
            self.persist();
        }
        removed
    }

    pub fn update_asset(&mut self, id: &str, patch: AssetPatch) -> Result<Asset, SessionError> {
        let updated = self
            .state
            .assets
            .update(id, patch)
            .map_err(EditorError::from)?
            .clone();
        self.persist();
        Ok(updated)
    }

    /// Upload, then record the asset; nothing is recorded if the upload fails
    pub async fn upload_asset<U, P>(
        &mut self,
        uploader: &U,
        probe: &P,
        request: &UploadRequest,
        kind: AssetKind,
    ) -> Result<Asset, SessionError>
    where
        U: AssetUploader,
        P: DimensionProbe,
    {
        let asset = uploads::upload_asset(uploader, probe, request, kind).await?;
        self.add_asset(asset.clone())?;
        Ok(asset)
    }

    // ---- Site records ----

    pub fn set_template(&mut self, template: TemplateId) {
        self.state.template = template;
        self.persist();
    }

    pub fn set_seo(&mut self, page: impl Into<String>, record: SeoRecord) {
        self.state.seo.insert(page.into(), record);
        self.persist();
    }

    pub fn set_llm(&mut self, profile: LlmProfile) {
        self.state.llm = profile;
        self.persist();
    }

    pub fn set_technical_seo(&mut self, technical: TechnicalSeo) {
        self.state.technical_seo = technical;
        self.persist();
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.is_authenticated = authenticated;
        self.persist();
    }

    // ---- Import / export ----

    pub fn export(&self) -> ExportEnvelope {
        self.state.export()
    }

    pub fn import(&mut self, raw: &str) -> Result<(), ImportError> {
        self.state.import(raw)?;
        self.draft_changed();
        Ok(())
    }

    // ---- Preview ----

    pub fn attach_preview(&mut self, channel: impl PreviewChannel + 'static) {
        self.preview.attach(channel);
    }

    pub fn detach_preview(&mut self) {
        self.preview.detach();
    }

    /// The preview surface finished loading; it receives the draft right away
    pub fn preview_loaded(&mut self) {
        self.preview.mark_loaded(self.state.content.draft());
    }

    pub fn navigate_preview(&mut self, address: &str) -> Navigation {
        self.preview.navigate(address)
    }

    pub fn preview(&self) -> &PreviewBridge {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut PreviewBridge {
        &mut self.preview
    }

    // ---- Persistence ----

    /// Write the snapshot now, reporting failures
    pub fn save(&self) -> Result<(), SessionError> {
        if self.options.mode == SessionMode::EmbeddedPreview {
            return Ok(());
        }
        PersistedState::capture(&self.state, self.is_authenticated)
            .save(&self.storage, &self.options.namespace)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            tracing::warn!(namespace = %self.options.namespace, %err, "failed to persist session");
        }
    }

    fn draft_changed(&mut self) {
        self.persist();
        self.preview.push_content(self.state.content.draft());
    }
}

impl<S: StateStorage> std::fmt::Debug for AuthoringSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthoringSession")
            .field("namespace", &self.options.namespace)
            .field("mode", &self.options.mode)
            .field("state", &self.state.content.state())
            .field("preview", &self.preview)
            .finish()
    }
}
