//! Favorites Plugin for the storefront
//!
//! Keeps the shopper's favorite products in memory and mirrors them into a
//! single key of a [`KeyValueStorage`](storefront_store::KeyValueStorage)
//! backend.
//!
//! # Features
//!
//! - Add, remove, toggle and clear favorites; `is_favorite` lookups
//! - Hydration from storage once, driven by the plugin's init task
//! - Background writes, one at a time, coalesced to the latest collection
//! - Storage failures logged and reported, never blocking the UI
//!
//! # Example
//!
//! ```ignore
//! use storefront::PluginManagerBuilder;
//! use storefront_favorites::{FavoriteItem, FavoritesInput, FavoritesOutput, FavoritesPlugin};
//! use storefront_store::AppName;
//!
//! fn new() -> (Shop, Task<Message>) {
//!     let app_name = AppName::new("com", "lenscraft", "camera_shop");
//!     let mut builder = PluginManagerBuilder::new();
//!     let favorites = builder.install(FavoritesPlugin::for_app(&app_name));
//!     let (plugins, init_task) = builder.build();
//!
//!     // Running the init task loads the stored favorites
//!     (Shop { plugins, favorites }, init_task.map(Message::Plugin))
//! }
//! ```

mod collection;
mod error;
mod item;
mod persist;
mod plugin;
mod queue;

pub use collection::Favorites;
pub use error::{FavoritesError, Result};
pub use item::FavoriteItem;
pub use persist::{DEFAULT_KEY, FavoritesConfig, load, persist};
pub use plugin::{
    FavoritesInput, FavoritesMessage, FavoritesOutput, FavoritesPlugin, FavoritesState,
    STORE_GROUP,
};
