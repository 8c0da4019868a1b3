//! Camera shop demo
//!
//! Wires the favorites plugin into an iced application: the catalog on the
//! left, favorites on the right. Favorites survive restarts.
//!
//! Run with `RUST_LOG=storefront_favorites=debug` to watch writes.

use iced::widget::{Column, button, column, container, row, scrollable, text};
use iced::{Element, Length, Task};
use storefront::{Camera, Catalog, Listing, PluginHandle, PluginManager, PluginManagerBuilder, PluginMessage};
use storefront_favorites::{FavoriteItem, FavoritesInput, FavoritesOutput, FavoritesPlugin, FavoritesState};
use storefront_store::AppName;
use tracing_subscriber::EnvFilter;

const CATALOG: &str = include_str!("data/cameras.json");

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let catalog = match Catalog::<Camera>::from_json(CATALOG) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(error = %e, "bundled catalog is invalid");
            return Ok(());
        }
    };

    iced::application(move || Shop::new(catalog.clone()), Shop::update, Shop::view)
        .subscription(subscription)
        .run()
}

struct Shop {
    plugins: PluginManager,
    favorites: PluginHandle<FavoritesPlugin>,
    catalog: Catalog<Camera>,
    selected: Option<String>,
    status: String,
}

#[derive(Debug, Clone)]
enum Message {
    Plugin(PluginMessage),
    Favorites(FavoritesOutput),
    Select(String),
    ToggleFavorite(String),
    RemoveFavorite(String),
    ClearFavorites,
}

impl Shop {
    fn new(catalog: Catalog<Camera>) -> (Self, Task<Message>) {
        let app_name = AppName::new("com", "lenscraft", "camera_shop");
        let mut builder = PluginManagerBuilder::new();
        let favorites = builder.install(FavoritesPlugin::for_app(&app_name));
        let (plugins, init_task) = builder.build();

        let shop = Self {
            plugins,
            favorites,
            catalog,
            selected: None,
            status: "Loading favorites...".to_string(),
        };

        (shop, init_task.map(Message::Plugin))
    }

    fn favorites_state(&self) -> Option<&FavoritesState> {
        self.plugins.get_plugin_state::<FavoritesPlugin>()
    }

    fn is_favorite(&self, id: &str) -> bool {
        self.favorites_state().is_some_and(|state| state.is_favorite(id))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Plugin(plugin_msg) => {
                return self.plugins.update(plugin_msg).map(Message::Plugin);
            }

            Message::Favorites(output) => {
                self.status = match output {
                    FavoritesOutput::Hydrated { count } => format!("{} favorites loaded", count),
                    FavoritesOutput::Added { id } => format!("Added {}", id),
                    FavoritesOutput::Removed { id } => format!("Removed {}", id),
                    FavoritesOutput::Cleared { count } => format!("Cleared {} favorites", count),
                    FavoritesOutput::Saved { .. } => return Task::none(),
                    FavoritesOutput::Failed(err) => format!("Favorites not saved: {}", err),
                };
            }

            Message::Select(id) => {
                self.selected = Some(id);
            }

            Message::ToggleFavorite(id) => {
                if let Some(camera) = self.catalog.get(&id) {
                    let item = FavoriteItem::from_listing(camera);
                    return self
                        .favorites
                        .dispatch(FavoritesInput::Toggle(item))
                        .map(Message::Plugin);
                }
            }

            Message::RemoveFavorite(id) => {
                return self
                    .favorites
                    .dispatch(FavoritesInput::Remove(id))
                    .map(Message::Plugin);
            }

            Message::ClearFavorites => {
                return self
                    .favorites
                    .dispatch(FavoritesInput::Clear)
                    .map(Message::Plugin);
            }
        }

        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let products = Column::with_children(self.catalog.iter().map(|camera| {
            let heart = if self.is_favorite(&camera.id) { "Unfavorite" } else { "Favorite" };
            row![
                button(text(camera.name.as_str())).on_press(Message::Select(camera.id.clone())),
                button(heart).on_press(Message::ToggleFavorite(camera.id.clone())),
            ]
            .spacing(10)
            .into()
        }))
        .spacing(8);

        let favorites: Element<'_, Message> = match self.favorites_state() {
            Some(state) if !state.items().is_empty() => Column::with_children(state.items().iter().map(|item| {
                let price = item.price.map(|p| format!("${:.2}", p)).unwrap_or_default();
                row![
                    text(format!("{} {}", item.name, price)),
                    button("Delete").on_press(Message::RemoveFavorite(item.id.clone())),
                ]
                .spacing(10)
                .into()
            }))
            .spacing(8)
            .into(),
            _ => text("No favorites yet").into(),
        };

        let detail: Element<'_, Message> = match self.selected.as_deref().and_then(|id| self.catalog.get(id)) {
            Some(camera) => {
                let rating = camera
                    .average_rating()
                    .map(|r| format!("{:.1} / 5 from {} reviews", r, camera.feedbacks.len()))
                    .unwrap_or_else(|| "No reviews yet".to_string());
                column![
                    text(camera.name.as_str()).size(24),
                    text(format!("${:.2}", camera.price)),
                    text(camera.description.as_str()),
                    text(format!("Sensor: {}", camera.sensor)),
                    text(format!("Resolution: {}", camera.resolution)),
                    text(format!("ISO Range: {}", camera.iso_range)),
                    text(format!("Shutter Speed: {}", camera.shutter_speed)),
                    text(rating),
                ]
                .spacing(6)
                .into()
            }
            None => text("Select a camera").into(),
        };

        let content = column![
            text("Camera Shop").size(32),
            text(format!("Status: {}", self.status)).size(14),
            row![
                scrollable(products).width(Length::FillPortion(2)),
                container(detail).width(Length::FillPortion(2)),
                column![
                    text("Favorites").size(20),
                    favorites,
                    button("Clear all").on_press(Message::ClearFavorites),
                ]
                .spacing(10)
                .width(Length::FillPortion(1)),
            ]
            .spacing(20),
        ]
        .spacing(10)
        .padding(20);

        content.into()
    }
}

fn subscription(shop: &Shop) -> iced::Subscription<Message> {
    iced::Subscription::batch([
        shop.plugins.subscriptions().map(Message::Plugin),
        shop.favorites.listen().map(Message::Favorites),
    ])
}
