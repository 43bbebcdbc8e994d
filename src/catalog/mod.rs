//! Menu catalog: image asset storage and the category partitioning used by
//! the diner menu page.

pub mod images;

pub use images::ImageStore;

use std::collections::HashMap;

use crate::models::MenuItemEntity;

/// Partitions menu items by the configured category labels, preserving the
/// configured order. Items whose category is not configured are not listed;
/// the admin panel still shows every item.
pub fn group_by_category(
    categories: &[String],
    items: Vec<MenuItemEntity>,
) -> Vec<(String, Vec<MenuItemEntity>)> {
    let mut group: HashMap<String, Vec<MenuItemEntity>> = HashMap::new();
    for item in items {
        group.entry(item.category.clone()).or_default().push(item);
    }

    categories
        .iter()
        .map(|category| {
            (
                category.clone(),
                group.remove(category).unwrap_or_default(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, name: &str, category: &str) -> MenuItemEntity {
        MenuItemEntity {
            id,
            name: name.to_string(),
            description: String::new(),
            price: 10.0,
            customizable: false,
            category: category.to_string(),
            image_filename: None,
            display_date: None,
        }
    }

    #[test]
    fn test_groups_preserve_configured_order() {
        let categories = vec!["Soups".to_string(), "Drinks".to_string()];
        let items = vec![
            item(1, "Cola", "Drinks"),
            item(2, "Tomato soup", "Soups"),
            item(3, "Tea", "Drinks"),
        ];

        let grouped = group_by_category(&categories, items);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "Soups");
        assert_eq!(grouped[0].1.len(), 1);
        assert_eq!(grouped[1].0, "Drinks");
        assert_eq!(grouped[1].1.len(), 2);
    }

    #[test]
    fn test_unconfigured_categories_are_not_listed() {
        let categories = vec!["Soups".to_string()];
        let items = vec![item(1, "Mystery dish", "Specials")];

        let grouped = group_by_category(&categories, items);

        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].1.is_empty());
    }

    #[test]
    fn test_empty_categories_still_appear() {
        let categories = vec!["Soups".to_string(), "Desserts".to_string()];
        let grouped = group_by_category(&categories, vec![]);

        assert_eq!(grouped.len(), 2);
        assert!(grouped.iter().all(|(_, items)| items.is_empty()));
    }
}
