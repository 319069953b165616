use entity::{Estado, User, UserDraft, UserPatch};
use platform_gateway::UserGateway;
use tracing::{error, info, instrument, warn};

use crate::{
    DirectoryError, Notice, PageInfo, ValidationError, filter_users, paginate,
    validation::{check_create, check_edit, check_unique_id},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Only users of this sector are listed.
    pub sector: i64,
    pub page_size: u32,
    /// 1-based page shown after a fresh load.
    pub default_page: u32,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            sector: 7000,
            page_size: 10,
            default_page: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Error(String),
}

/// Open create/edit form. `Edit` keeps the row as it was when opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Modal {
    Create,
    Edit(User),
}

impl Modal {
    /// Initial form contents.
    pub fn draft(&self) -> UserDraft {
        match self {
            Modal::Create => UserDraft::default(),
            Modal::Edit(user) => UserDraft::for_edit(user),
        }
    }
}

/// List state behind the usuarios admin screen.
///
/// Every operation runs to completion before the next one starts; the list is
/// only mutated through `&mut self`.
#[derive(Debug)]
pub struct UserDirectory<G> {
    gateway: G,
    config: DirectoryConfig,
    users: Vec<User>,
    status: LoadStatus,
    search: String,
    estado_filter: Option<Estado>,
    page: u32,
    total_records: u64,
    modal: Option<Modal>,
    pending_deactivation: Option<String>,
    notices: Vec<Notice>,
}

impl<G: UserGateway> UserDirectory<G> {
    pub fn new(gateway: G, config: DirectoryConfig) -> Self {
        Self {
            gateway,
            page: config.default_page.max(1),
            config,
            users: Vec::new(),
            status: LoadStatus::Loading,
            search: String::new(),
            estado_filter: None,
            total_records: 0,
            modal: None,
            pending_deactivation: None,
            notices: Vec::new(),
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Load every user of the configured sector.
    #[instrument(name = "directory.load", skip(self), fields(sector = self.config.sector))]
    pub async fn load(&mut self) -> Result<(), DirectoryError> {
        self.status = LoadStatus::Loading;
        match self.gateway.list_by_sector(self.config.sector).await {
            Ok(users) => {
                info!(count = users.len(), "users loaded");
                self.total_records = users.len() as u64;
                self.page = self.config.default_page.max(1);
                self.users = users;
                self.status = LoadStatus::Ready;
                Ok(())
            }
            Err(err) => Err(self.fail_load(err.into())),
        }
    }

    /// Load one page of the configured sector from the collection.
    #[instrument(name = "directory.load_page", skip(self), fields(sector = self.config.sector))]
    pub async fn load_page(&mut self, page: u32) -> Result<(), DirectoryError> {
        let page = page.max(1);
        self.status = LoadStatus::Loading;
        let result = self
            .gateway
            .list_by_page(self.config.sector, self.config.page_size, page)
            .await;
        match result {
            Ok(loaded) => {
                info!(
                    count = loaded.users.len(),
                    total_records = loaded.total_records,
                    "page loaded"
                );
                self.page = page;
                self.total_records = loaded.total_records;
                self.users = loaded.users;
                self.status = LoadStatus::Ready;
                Ok(())
            }
            Err(err) => Err(self.fail_load(err.into())),
        }
    }

    fn fail_load(&mut self, err: DirectoryError) -> DirectoryError {
        error!(%err, "failed to load users");
        self.status = LoadStatus::Error(err.to_string());
        self.notify(Notice::error("Could not load users", err.to_string()));
        err
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn estado_filter(&self) -> Option<Estado> {
        self.estado_filter
    }

    pub fn set_estado_filter(&mut self, estado: Option<Estado>) {
        self.estado_filter = estado;
    }

    /// Loaded users matching the current search text and status filter.
    pub fn filtered(&self) -> Vec<&User> {
        filter_users(&self.users, &self.search, self.estado_filter)
    }

    /// Paginator state of the last load.
    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(self.page, self.config.page_size, self.total_records)
    }

    /// Client-side page of the filtered rows.
    pub fn visible_page(&self, page: u32) -> (Vec<&User>, PageInfo) {
        let filtered = self.filtered();
        let info = PageInfo::new(page, self.config.page_size, filtered.len() as u64);
        let rows = paginate(&filtered, info.page, info.page_size).to_vec();
        (rows, info)
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn open_create(&mut self) -> UserDraft {
        let modal = Modal::Create;
        let draft = modal.draft();
        self.modal = Some(modal);
        draft
    }

    pub fn open_edit(&mut self, id: &str) -> Result<UserDraft, DirectoryError> {
        let user = self
            .find(id)
            .cloned()
            .ok_or_else(|| DirectoryError::UnknownUser(id.to_string()))?;
        let modal = Modal::Edit(user);
        let draft = modal.draft();
        self.modal = Some(modal);
        Ok(draft)
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Submit the open form. On success the form closes; on failure it stays
    /// open and an error notice is queued.
    #[instrument(name = "directory.submit", skip_all)]
    pub async fn submit(&mut self, draft: UserDraft) -> Result<User, DirectoryError> {
        let Some(modal) = self.modal.clone() else {
            let err = DirectoryError::NoActiveForm;
            self.notify(Notice::error("Could not save user", err.to_string()));
            return Err(err);
        };
        let result = match &modal {
            Modal::Create => self.create(draft).await,
            Modal::Edit(original) => self.edit(original, draft).await,
        };
        match result {
            Ok(user) => {
                self.modal = None;
                let summary = match modal {
                    Modal::Create => "User created",
                    Modal::Edit(_) => "User updated",
                };
                info!(id = %user.id, "{summary}");
                self.notify(Notice::success(summary, format!("{} ({})", user.usuario, user.id)));
                Ok(user)
            }
            Err(err) => {
                warn!(%err, code = err.code(), "could not save user");
                self.notify(Notice::error("Could not save user", err.to_string()));
                Err(err)
            }
        }
    }

    async fn create(&mut self, mut draft: UserDraft) -> Result<User, DirectoryError> {
        // New users start out active unless the form says otherwise.
        draft.estado.get_or_insert(Estado::Activo);
        let user = draft.complete().map_err(ValidationError::MissingFields)?;
        // Only the id is checked locally; names need the whole collection.
        check_unique_id(&user, &self.users)?;
        let all = self.gateway.list_all().await?;
        check_create(&user, &all)?;
        let created = self.gateway.create(&user).await?;
        self.merge(created.clone());
        Ok(created)
    }

    async fn edit(&mut self, original: &User, mut draft: UserDraft) -> Result<User, DirectoryError> {
        draft.id = Some(original.id.clone());
        let user = draft.complete().map_err(ValidationError::MissingFields)?;
        check_edit(&user, &self.users)?;
        let all = self.gateway.list_all().await?;
        check_edit(&user, &all)?;
        let updated = self.gateway.update(&original.id, &UserPatch::from(&user)).await?;
        self.merge(updated.clone());
        Ok(updated)
    }

    /// Replace or append `user`, then drop rows outside the configured sector.
    fn merge(&mut self, user: User) {
        match self.users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => *slot = user,
            None => {
                self.users.push(user);
                self.total_records += 1;
            }
        }
        let sector = self.config.sector;
        let before = self.users.len();
        self.users.retain(|u| u.sector == Some(sector));
        self.total_records = self
            .total_records
            .saturating_sub((before - self.users.len()) as u64);
    }

    pub fn can_deactivate(user: &User) -> bool {
        user.estado.is_active()
    }

    /// First step of a deactivation; nothing is written until
    /// [`confirm_deactivation`](Self::confirm_deactivation).
    pub fn request_deactivation(&mut self, id: &str) -> Result<User, DirectoryError> {
        let user = self
            .find(id)
            .cloned()
            .ok_or_else(|| DirectoryError::UnknownUser(id.to_string()))?;
        if !Self::can_deactivate(&user) {
            return Err(DirectoryError::DeactivationDisabled {
                id: user.id,
                estado: user.estado,
            });
        }
        self.pending_deactivation = Some(user.id.clone());
        Ok(user)
    }

    pub fn pending_deactivation(&self) -> Option<&User> {
        self.pending_deactivation.as_deref().and_then(|id| self.find(id))
    }

    pub fn cancel_deactivation(&mut self) {
        self.pending_deactivation = None;
    }

    /// Write `estado = INACTIVO` for the pending user.
    ///
    /// The whole record is sent: json-server style collections replace the
    /// stored object on `PUT`.
    #[instrument(name = "directory.deactivate", skip(self))]
    pub async fn confirm_deactivation(&mut self) -> Result<User, DirectoryError> {
        let result = match self.pending_deactivation.take() {
            Some(id) => self.deactivate(&id).await,
            None => Err(DirectoryError::NoPendingDeactivation),
        };
        match result {
            Ok(user) => {
                info!(id = %user.id, "user deactivated");
                self.notify(Notice::success("User deactivated", format!("{} ({})", user.usuario, user.id)));
                Ok(user)
            }
            Err(err) => {
                warn!(%err, code = err.code(), "could not deactivate user");
                self.notify(Notice::error("Could not deactivate user", err.to_string()));
                Err(err)
            }
        }
    }

    async fn deactivate(&mut self, id: &str) -> Result<User, DirectoryError> {
        let user = self
            .find(id)
            .cloned()
            .ok_or_else(|| DirectoryError::UnknownUser(id.to_string()))?;
        if !Self::can_deactivate(&user) {
            return Err(DirectoryError::DeactivationDisabled {
                id: user.id,
                estado: user.estado,
            });
        }
        let patch = UserPatch {
            estado: Some(Estado::Inactivo),
            ..UserPatch::from(&user)
        };
        let updated = self.gateway.update(id, &patch).await?;
        self.merge(updated.clone());
        Ok(updated)
    }

    /// Most recent user of the whole collection, by id.
    pub async fn latest(&mut self) -> Result<Option<User>, DirectoryError> {
        match self.gateway.latest().await {
            Ok(user) => Ok(user),
            Err(err) => {
                let err = DirectoryError::from(err);
                self.notify(Notice::error("Could not fetch the latest user", err.to_string()));
                Err(err)
            }
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
