//! Storefront
//!
//! Plugin host for the storefront's iced application, plus the catalog types
//! shared by the camera and art-supply shops.

pub mod catalog;
mod plugin;

pub use catalog::{ArtSupply, Camera, Catalog, CatalogError, Feedback, Listing};
pub use plugin::{
    Plugin, PluginHandle, PluginManager, PluginManagerBuilder, PluginMessage, PluginOutput,
};
