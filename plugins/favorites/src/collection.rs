//! In-memory favorites collection

use crate::item::FavoriteItem;

/// Ordered list of favorites, in the order they were added
///
/// `add` does not look for an existing entry with the same id, so adding a
/// product twice keeps two entries; `remove` drops all of them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Favorites {
    items: Vec<FavoriteItem>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` to the end
    pub fn add(&mut self, item: FavoriteItem) {
        self.items.push(item);
    }

    /// Remove every entry with `id`, returning how many were dropped
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before - self.items.len()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Remove everything, returning how many entries were dropped
    pub fn clear(&mut self) -> usize {
        let count = self.items.len();
        self.items.clear();
        count
    }

    /// Remove `item` if it is a favorite, add it otherwise.
    /// Returns whether it is a favorite afterwards.
    pub fn toggle(&mut self, item: FavoriteItem) -> bool {
        if self.remove(&item.id) > 0 {
            false
        } else {
            self.add(item);
            true
        }
    }

    /// First entry with `id`
    pub fn get(&self, id: &str) -> Option<&FavoriteItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[FavoriteItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<FavoriteItem>> for Favorites {
    fn from(items: Vec<FavoriteItem>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Favorites {
    type Item = &'a FavoriteItem;
    type IntoIter = std::slice::Iter<'a, FavoriteItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> FavoriteItem {
        FavoriteItem::new(id, format!("Product {}", id), format!("{}.png", id))
    }

    fn ids(favorites: &Favorites) -> Vec<&str> {
        favorites.items().iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_add_then_is_favorite() {
        let mut favorites = Favorites::new();
        favorites.add(item("c1"));
        assert!(favorites.is_favorite("c1"));
        assert!(!favorites.is_favorite("c2"));
    }

    #[test]
    fn test_add_then_remove() {
        let mut favorites = Favorites::new();
        favorites.add(item("c1"));

        assert_eq!(favorites.remove("c1"), 1);
        assert!(!favorites.is_favorite("c1"));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut favorites = Favorites::from(vec![item("c1"), item("c2")]);
        let before = favorites.clone();

        assert_eq!(favorites.remove("zz"), 0);
        assert_eq!(favorites, before);
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut favorites = Favorites::from(vec![item("c1"), item("c2"), item("c3")]);

        assert_eq!(favorites.clear(), 3);
        for id in ["c1", "c2", "c3"] {
            assert!(!favorites.is_favorite(id));
        }
    }

    #[test]
    fn test_add_remove_scenario_keeps_order() {
        let mut favorites = Favorites::new();

        favorites.add(item("a1"));
        assert_eq!(ids(&favorites), ["a1"]);
        favorites.add(item("a2"));
        assert_eq!(ids(&favorites), ["a1", "a2"]);
        favorites.remove("a1");
        assert_eq!(ids(&favorites), ["a2"]);

        assert!(!favorites.is_favorite("a1"));
        assert!(favorites.is_favorite("a2"));
    }

    #[test]
    fn test_duplicate_add_keeps_both_and_remove_drops_both() {
        let mut favorites = Favorites::new();
        favorites.add(item("c1"));
        favorites.add(item("c1"));
        assert_eq!(favorites.len(), 2);

        assert_eq!(favorites.remove("c1"), 2);
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut favorites = Favorites::from(vec![item("c1")]);

        assert!(favorites.toggle(item("c2")));
        assert_eq!(ids(&favorites), ["c1", "c2"]);

        assert!(!favorites.toggle(item("c1")));
        assert_eq!(ids(&favorites), ["c2"]);
    }
}
