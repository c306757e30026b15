//! Sample catalogue loaded into a fresh store.

use ruralcart_common::category::Category;
use ruralcart_common::identity::{CategoryId, ProductId, UserId};
use ruralcart_common::product::Product;
use ruralcart_common::user::{Address, User};

use super::Snapshot;

const IMAGE_HOST: &str = "https://images.unsplash.com";

fn image(photo: &str, w: u32, h: u32) -> Option<String> {
    Some(format!(
        "{IMAGE_HOST}/{photo}?ixlib=rb-4.0.3&auto=format&fit=crop&w={w}&h={h}"
    ))
}

fn category(id: &str, name: &str, slug: &str, description: &str, photo: &str) -> Category {
    Category {
        id: CategoryId::from(id),
        name: name.to_string(),
        slug: slug.to_string(),
        description: Some(description.to_string()),
        image_url: image(photo, 200, 120),
    }
}

fn grocery(
    id: &str,
    name: &str,
    description: &str,
    price: u64,
    original_price: Option<u64>,
    unit: &str,
    photo: &str,
) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_string(),
        description: Some(description.to_string()),
        price,
        original_price,
        unit: unit.to_string(),
        image_url: image(photo, 200, 140),
        category_id: CategoryId::from("cat-1"),
        in_stock: true,
    }
}

/// Four categories, six groceries and one sample customer, with fixed ids.
pub fn sample_data() -> Snapshot {
    let categories = vec![
        category("cat-1", "Groceries", "groceries", "Fresh & Daily Needs", "photo-1542838132-92c53300491e"),
        category("cat-2", "Medicines", "medicines", "Health & Wellness", "photo-1584308666744-24d5c474f2ae"),
        category("cat-3", "Household", "household", "Cleaning & Daily Use", "photo-1556075798-4825dfaaf498"),
        category("cat-4", "Personal Care", "personal-care", "Beauty & Hygiene", "photo-1596462502278-27bfdc403348"),
    ];

    let products = vec![
        grocery("prod-1", "Onions", "Fresh local onions", 3_000, Some(3_500), "kg", "photo-1618512496248-a07fe83aa8cb"),
        grocery("prod-2", "Potatoes", "Farm fresh potatoes", 2_500, None, "kg", "photo-1518977676601-b53f82aba655"),
        grocery("prod-3", "Bananas", "Sweet ripe bananas", 4_000, None, "dozen", "photo-1571771894821-ce9b6c11b08e"),
        grocery("prod-4", "Apples", "Crisp red apples", 12_000, Some(14_000), "kg", "photo-1560806887-1e4cd0b6cbd6"),
        grocery("prod-5", "Tomatoes", "Fresh local tomatoes", 4_000, None, "kg", "photo-1592924357228-91a4daadcfea"),
        grocery("prod-6", "Milk", "Fresh dairy milk", 2_500, None, "liter", "photo-1550583724-b2692b85b150"),
    ];

    let users = vec![User {
        id: UserId::from("user-1"),
        name: "Rajesh Kumar".to_string(),
        phone: "+919876543210".to_string(),
        address: Some(Address {
            label: "Home".to_string(),
            full: "Village Center, Near Post Office\nMainpur, Dist - 123456".to_string(),
            phone: "+919876543210".to_string(),
        }),
    }];

    Snapshot {
        users,
        categories,
        products,
        orders: Vec::new(),
    }
}
