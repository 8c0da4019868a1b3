//! Favorites as a storefront plugin

use crate::collection::Favorites;
use crate::error::FavoritesError;
use crate::item::FavoriteItem;
use crate::persist::{FavoritesConfig, load, persist};
use crate::queue::WriteQueue;
use iced::Task;
use std::sync::Arc;
use storefront::Plugin;
use storefront_store::{AppName, FileStorage, KeyValueStorage};

/// Storage group the favorites file belongs to
pub const STORE_GROUP: &str = "storefront";

/// Commands the application sends to the favorites plugin
#[derive(Clone, Debug)]
pub enum FavoritesInput {
    /// Append a product to the favorites
    Add(FavoriteItem),
    /// Remove every favorite with this id
    Remove(String),
    /// Remove the product if it is a favorite, add it otherwise
    Toggle(FavoriteItem),
    /// Remove all favorites
    Clear,
}

/// Internal messages that the favorites plugin handles
///
/// Applications should send [`FavoritesInput`] instead.
#[derive(Clone, Debug)]
pub enum FavoritesMessage {
    Input(FavoritesInput),
    /// Startup load finished
    Loaded(Result<Option<Vec<FavoriteItem>>, FavoritesError>),
    /// A write finished; carries the number of items written
    Persisted(Result<usize, FavoritesError>),
}

impl From<FavoritesInput> for FavoritesMessage {
    fn from(input: FavoritesInput) -> Self {
        Self::Input(input)
    }
}

/// Events emitted to listeners after a change
#[derive(Clone, Debug)]
pub enum FavoritesOutput {
    /// Stored favorites are in memory; `count` entries
    Hydrated { count: usize },
    Added { id: String },
    Removed { id: String },
    Cleared { count: usize },
    /// A write of `count` entries reached storage
    Saved { count: usize },
    /// Storage failed; the in-memory collection is unaffected
    Failed(FavoritesError),
}

/// Plugin state: the collection plus persistence bookkeeping
#[derive(Debug)]
pub struct FavoritesState {
    favorites: Favorites,
    queue: WriteQueue,
    hydrated: bool,
    last_error: Option<FavoritesError>,
}

impl FavoritesState {
    fn new() -> Self {
        Self {
            favorites: Favorites::new(),
            queue: WriteQueue::held(),
            hydrated: false,
            last_error: None,
        }
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn items(&self) -> &[FavoriteItem] {
        self.favorites.items()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.is_favorite(id)
    }

    /// Whether the startup load has finished
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Whether a write is running or waiting to run
    pub fn is_saving(&self) -> bool {
        self.queue.is_in_flight() || self.queue.has_pending()
    }

    /// Most recent storage failure, cleared by the next successful write
    pub fn last_error(&self) -> Option<&FavoritesError> {
        self.last_error.as_ref()
    }
}

/// Plugin holding the shopper's favorites, persisted to one storage key
///
/// The collection is hydrated by the plugin's init task, so the composition
/// root must run the task returned by `PluginManagerBuilder::build`.
/// Mutations apply immediately; writes happen in the background, one at a
/// time, always with the latest collection.
///
/// # Example
///
/// ```ignore
/// use storefront::PluginManagerBuilder;
/// use storefront_favorites::{FavoritesInput, FavoritesPlugin, FavoriteItem};
/// use storefront_store::AppName;
///
/// let mut builder = PluginManagerBuilder::new();
/// let favorites = builder.install(FavoritesPlugin::for_app(&AppName::new("com", "lenscraft", "camera_shop")));
/// let (plugins, init_task) = builder.build();
///
/// let task = favorites.dispatch(FavoritesInput::Toggle(FavoriteItem::from_listing(&camera)));
/// ```
#[derive(Debug)]
pub struct FavoritesPlugin<S = FileStorage> {
    storage: Arc<S>,
    config: FavoritesConfig,
}

impl FavoritesPlugin<FileStorage> {
    /// Favorites stored in the application's platform config directory
    pub fn for_app(app_name: &AppName) -> Self {
        Self::new(FileStorage::new(app_name, STORE_GROUP))
    }
}

impl<S: KeyValueStorage> FavoritesPlugin<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, FavoritesConfig::default())
    }

    pub fn with_config(storage: S, config: FavoritesConfig) -> Self {
        Self {
            storage: Arc::new(storage),
            config,
        }
    }

    pub fn config(&self) -> &FavoritesConfig {
        &self.config
    }

    /// Read the configured key; the work behind the init task
    fn load_stored(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<FavoriteItem>>, FavoritesError>> + Send + use<S> {
        let storage = Arc::clone(&self.storage);
        let key = self.config.key.clone();
        async move { load(&*storage, &key).await }
    }

    /// Write a snapshot of `favorites`, resolving to the number of items written
    fn write_stored(
        &self,
        favorites: &Favorites,
    ) -> impl Future<Output = Result<usize, FavoritesError>> + Send + use<S> {
        let storage = Arc::clone(&self.storage);
        let key = self.config.key.clone();
        let items = favorites.items().to_vec();
        async move {
            let count = items.len();
            persist(&*storage, &key, &items).await.map(|()| count)
        }
    }

    fn load_task(&self) -> Task<FavoritesMessage> {
        Task::perform(self.load_stored(), FavoritesMessage::Loaded)
    }

    fn persist_task(&self, favorites: &Favorites) -> Task<FavoritesMessage> {
        Task::perform(self.write_stored(favorites), FavoritesMessage::Persisted)
    }

    /// Schedule a write of the current collection through the queue
    fn request_write(&self, state: &mut FavoritesState) -> Task<FavoritesMessage> {
        if state.queue.request() {
            self.persist_task(&state.favorites)
        } else {
            Task::none()
        }
    }

    fn handle_input(
        &self,
        state: &mut FavoritesState,
        input: FavoritesInput,
    ) -> (Task<FavoritesMessage>, Option<FavoritesOutput>) {
        match input {
            FavoritesInput::Add(item) => {
                let id = item.id.clone();
                state.favorites.add(item);
                (self.request_write(state), Some(FavoritesOutput::Added { id }))
            }

            FavoritesInput::Remove(id) => {
                if state.favorites.remove(&id) == 0 {
                    return (Task::none(), None);
                }
                (self.request_write(state), Some(FavoritesOutput::Removed { id }))
            }

            FavoritesInput::Toggle(item) => {
                let id = item.id.clone();
                let output = if state.favorites.toggle(item) {
                    FavoritesOutput::Added { id }
                } else {
                    FavoritesOutput::Removed { id }
                };
                (self.request_write(state), Some(output))
            }

            FavoritesInput::Clear => {
                let count = state.favorites.clear();
                (self.request_write(state), Some(FavoritesOutput::Cleared { count }))
            }
        }
    }

    fn handle_loaded(
        &self,
        state: &mut FavoritesState,
        result: Result<Option<Vec<FavoriteItem>>, FavoritesError>,
    ) -> (Task<FavoritesMessage>, Option<FavoritesOutput>) {
        state.hydrated = true;

        let (flush, output) = match result {
            Ok(Some(items)) => {
                state.favorites = Favorites::from(items);
                tracing::debug!(count = state.favorites.len(), "favorites hydrated");
                (false, FavoritesOutput::Hydrated { count: state.favorites.len() })
            }
            Ok(None) => (true, FavoritesOutput::Hydrated { count: state.favorites.len() }),
            Err(err) => {
                tracing::error!(error = %err, "error loading favorites");
                state.last_error = Some(err.clone());
                (true, FavoritesOutput::Failed(err))
            }
        };

        let task = if state.queue.release(flush) {
            self.persist_task(&state.favorites)
        } else {
            Task::none()
        };

        (task, Some(output))
    }

    fn handle_persisted(
        &self,
        state: &mut FavoritesState,
        result: Result<usize, FavoritesError>,
    ) -> (Task<FavoritesMessage>, Option<FavoritesOutput>) {
        let task = if state.queue.complete() {
            self.persist_task(&state.favorites)
        } else {
            Task::none()
        };

        let output = match result {
            Ok(count) => {
                tracing::debug!(count, "favorites saved");
                state.last_error = None;
                FavoritesOutput::Saved { count }
            }
            Err(err) => {
                tracing::error!(error = %err, "error saving favorites");
                state.last_error = Some(err.clone());
                FavoritesOutput::Failed(err)
            }
        };

        (task, Some(output))
    }
}

impl<S: KeyValueStorage> Plugin for FavoritesPlugin<S> {
    type Input = FavoritesInput;
    type Message = FavoritesMessage;
    type State = FavoritesState;
    type Output = FavoritesOutput;

    fn name(&self) -> &'static str {
        "favorites"
    }

    fn init(&self) -> (Self::State, Task<Self::Message>) {
        (FavoritesState::new(), self.load_task())
    }

    fn update(
        &self,
        state: &mut Self::State,
        message: Self::Message,
    ) -> (Task<Self::Message>, Option<Self::Output>) {
        match message {
            FavoritesMessage::Input(input) => self.handle_input(state, input),
            FavoritesMessage::Loaded(result) => self.handle_loaded(state, result),
            FavoritesMessage::Persisted(result) => self.handle_persisted(state, result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::persist::DEFAULT_KEY;
    use storefront_store::{MemoryStorage, StoreError, group_path};

    fn item(id: &str) -> FavoriteItem {
        FavoriteItem::new(id, format!("Product {}", id), format!("{}.png", id))
    }

    fn ids(state: &FavoritesState) -> Vec<&str> {
        state.items().iter().map(|i| i.id.as_str()).collect()
    }

    fn input<S: KeyValueStorage>(
        plugin: &FavoritesPlugin<S>,
        state: &mut FavoritesState,
        input: FavoritesInput,
    ) -> Option<FavoritesOutput> {
        plugin.update(state, input.into()).1
    }

    /// Plugin whose startup load already found nothing stored
    fn hydrated() -> (FavoritesPlugin<MemoryStorage>, FavoritesState) {
        let plugin = FavoritesPlugin::new(MemoryStorage::new());
        let (mut state, _load) = plugin.init();
        let _ = plugin.update(&mut state, FavoritesMessage::Loaded(Ok(None)));
        (plugin, state)
    }

    fn storage_error() -> FavoritesError {
        FavoritesError::Persist(Arc::new(StoreError::Unavailable("disk full".to_string())))
    }

    #[test]
    fn test_starts_empty_and_unhydrated() {
        let plugin = FavoritesPlugin::new(MemoryStorage::new());
        let (state, _load) = plugin.init();

        assert!(!state.is_hydrated());
        assert!(state.items().is_empty());
        assert!(!state.is_saving());
        assert_eq!(plugin.name(), "favorites");
        assert_eq!(plugin.config().key, "favorites");
    }

    #[test]
    fn test_hydrate_replaces_collection() {
        let plugin = FavoritesPlugin::new(MemoryStorage::new());
        let (mut state, _load) = plugin.init();

        let (_task, output) = plugin.update(
            &mut state,
            FavoritesMessage::Loaded(Ok(Some(vec![item("c1"), item("c2")]))),
        );

        assert!(matches!(output, Some(FavoritesOutput::Hydrated { count: 2 })));
        assert!(state.is_hydrated());
        assert_eq!(ids(&state), ["c1", "c2"]);
        assert!(!state.is_saving());
    }

    #[test]
    fn test_load_failure_leaves_collection_empty() {
        let plugin = FavoritesPlugin::new(MemoryStorage::new());
        let (mut state, _load) = plugin.init();
        let err = FavoritesError::Load(Arc::new(StoreError::Unavailable("locked".to_string())));

        let (_task, output) = plugin.update(&mut state, FavoritesMessage::Loaded(Err(err)));

        assert!(matches!(output, Some(FavoritesOutput::Failed(FavoritesError::Load(_)))));
        assert!(state.is_hydrated());
        assert!(state.items().is_empty());
        assert!(matches!(state.last_error(), Some(FavoritesError::Load(_))));
    }

    #[test]
    fn test_add_remove_scenario() {
        let (plugin, mut state) = hydrated();

        input(&plugin, &mut state, FavoritesInput::Add(item("a1")));
        assert_eq!(ids(&state), ["a1"]);
        input(&plugin, &mut state, FavoritesInput::Add(item("a2")));
        assert_eq!(ids(&state), ["a1", "a2"]);
        let output = input(&plugin, &mut state, FavoritesInput::Remove("a1".to_string()));

        assert!(matches!(output, Some(FavoritesOutput::Removed { ref id }) if id == "a1"));
        assert_eq!(ids(&state), ["a2"]);
        assert!(!state.is_favorite("a1"));
        assert!(state.is_favorite("a2"));
    }

    #[test]
    fn test_remove_absent_emits_nothing_and_schedules_no_write() {
        let (plugin, mut state) = hydrated();

        let output = input(&plugin, &mut state, FavoritesInput::Remove("zz".to_string()));

        assert!(output.is_none());
        assert!(!state.is_saving());
    }

    #[test]
    fn test_toggle_reports_direction() {
        let (plugin, mut state) = hydrated();

        let added = input(&plugin, &mut state, FavoritesInput::Toggle(item("c9")));
        assert!(matches!(added, Some(FavoritesOutput::Added { .. })));
        assert!(state.is_favorite("c9"));

        let removed = input(&plugin, &mut state, FavoritesInput::Toggle(item("c9")));
        assert!(matches!(removed, Some(FavoritesOutput::Removed { .. })));
        assert!(!state.is_favorite("c9"));
    }

    #[test]
    fn test_clear_reports_count() {
        let (plugin, mut state) = hydrated();
        input(&plugin, &mut state, FavoritesInput::Add(item("c1")));
        input(&plugin, &mut state, FavoritesInput::Add(item("c2")));

        let output = input(&plugin, &mut state, FavoritesInput::Clear);

        assert!(matches!(output, Some(FavoritesOutput::Cleared { count: 2 })));
        assert!(!state.is_favorite("c1"));
        assert!(!state.is_favorite("c2"));
    }

    #[test]
    fn test_mutations_during_write_coalesce() {
        let (plugin, mut state) = hydrated();

        input(&plugin, &mut state, FavoritesInput::Add(item("c1")));
        assert!(state.queue.is_in_flight());
        assert!(!state.queue.has_pending());

        input(&plugin, &mut state, FavoritesInput::Add(item("c2")));
        input(&plugin, &mut state, FavoritesInput::Add(item("c3")));
        assert!(state.queue.has_pending());

        // First write lands; one follow-up starts for the latest state
        let (_task, output) = plugin.update(&mut state, FavoritesMessage::Persisted(Ok(1)));
        assert!(matches!(output, Some(FavoritesOutput::Saved { count: 1 })));
        assert!(state.queue.is_in_flight());
        assert!(!state.queue.has_pending());

        let _ = plugin.update(&mut state, FavoritesMessage::Persisted(Ok(3)));
        assert!(!state.is_saving());
    }

    #[test]
    fn test_writes_held_until_hydrated() {
        let plugin = FavoritesPlugin::new(MemoryStorage::new());
        let (mut state, _load) = plugin.init();

        input(&plugin, &mut state, FavoritesInput::Add(item("early")));
        assert!(state.is_favorite("early"));
        assert!(!state.queue.is_in_flight());
        assert!(state.queue.has_pending());

        // Nothing stored: the early mutation is flushed
        let _ = plugin.update(&mut state, FavoritesMessage::Loaded(Ok(None)));
        assert!(state.queue.is_in_flight());
        assert!(state.is_favorite("early"));
    }

    #[test]
    fn test_stored_favorites_win_over_pre_hydration_mutations() {
        let plugin = FavoritesPlugin::new(MemoryStorage::new());
        let (mut state, _load) = plugin.init();

        input(&plugin, &mut state, FavoritesInput::Add(item("early")));
        let _ = plugin.update(
            &mut state,
            FavoritesMessage::Loaded(Ok(Some(vec![item("stored")]))),
        );

        assert_eq!(ids(&state), ["stored"]);
        assert!(!state.is_saving());
    }

    #[test]
    fn test_persist_failure_keeps_memory_and_clears_on_success() {
        let (plugin, mut state) = hydrated();
        input(&plugin, &mut state, FavoritesInput::Add(item("c1")));

        let (_task, output) =
            plugin.update(&mut state, FavoritesMessage::Persisted(Err(storage_error())));

        assert!(matches!(output, Some(FavoritesOutput::Failed(FavoritesError::Persist(_)))));
        assert!(state.is_favorite("c1"));
        assert!(state.last_error().is_some());
        assert!(!state.is_saving());

        input(&plugin, &mut state, FavoritesInput::Add(item("c2")));
        let _ = plugin.update(&mut state, FavoritesMessage::Persisted(Ok(2)));
        assert!(state.last_error().is_none());
    }

    #[tokio::test]
    async fn test_storage_round_trip_through_plugin_state() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = FavoritesPlugin::new(FileStorage::in_dir(dir.path(), STORE_GROUP));
        let (mut state, _load) = plugin.init();

        let loaded = plugin.load_stored().await;
        let _ = plugin.update(&mut state, FavoritesMessage::Loaded(loaded));
        input(&plugin, &mut state, FavoritesInput::Add(item("c1")));
        input(&plugin, &mut state, FavoritesInput::Add(item("a2")));

        let written = plugin.write_stored(state.favorites()).await;
        assert!(matches!(written, Ok(2)));

        let on_disk = std::fs::read_to_string(group_path(dir.path(), STORE_GROUP)).unwrap();
        let group: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&on_disk).unwrap();
        assert!(group.contains_key(DEFAULT_KEY));

        // A fresh plugin on the same directory hydrates what was written
        let reopened = FavoritesPlugin::new(FileStorage::in_dir(dir.path(), STORE_GROUP));
        let (mut fresh, _load) = reopened.init();
        let loaded = reopened.load_stored().await;
        let (_task, output) = reopened.update(&mut fresh, FavoritesMessage::Loaded(loaded));

        assert!(matches!(output, Some(FavoritesOutput::Hydrated { count: 2 })));
        assert_eq!(ids(&fresh), ["c1", "a2"]);
    }

    #[tokio::test]
    async fn test_configured_key_is_the_one_written() {
        let storage = MemoryStorage::new();
        let plugin = FavoritesPlugin::with_config(
            storage.clone(),
            FavoritesConfig::with_key("art_favorites"),
        );
        let mut state = FavoritesState::new();
        state.favorites.add(item("a1"));

        plugin.write_stored(&state.favorites).await.unwrap();

        assert!(storage.peek("art_favorites").is_some());
        assert!(storage.peek(DEFAULT_KEY).is_none());
        assert_eq!(plugin.load_stored().await.unwrap().map(|items| items.len()), Some(1));
    }
}
