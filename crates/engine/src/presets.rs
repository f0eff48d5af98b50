//! Static catalog of categories: the bootstrap set and the preset groups
//! offered when creating categories in bulk.

use crate::{Bucket, Category, settings::DEFAULT_CURRENCY};

/// One subcategory of a preset group with its typical monthly limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresetItem {
    pub name: &'static str,
    pub avg_limit: f64,
}

/// A group of related categories sharing icon, colour and bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresetGroup {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub bucket: Bucket,
    pub items: &'static [PresetItem],
}

impl PresetGroup {
    pub fn avg_limit_total(&self) -> f64 {
        self.items.iter().map(|item| item.avg_limit).sum()
    }
}

const fn item(name: &'static str, avg_limit: f64) -> PresetItem {
    PresetItem { name, avg_limit }
}

pub const CATEGORY_PRESETS: &[PresetGroup] = &[
    PresetGroup {
        name: "Bills & Essentials",
        icon: "Home",
        color: "blue",
        bucket: Bucket::Essentials,
        items: &[
            item("Rent/Mortgage", 800.0),
            item("Utilities", 120.0),
            item("Insurance", 150.0),
            item("Phone", 45.0),
            item("Internet", 50.0),
            item("Groceries", 400.0),
        ],
    },
    PresetGroup {
        name: "Transportation",
        icon: "Car",
        color: "green",
        bucket: Bucket::Essentials,
        items: &[
            item("Fuel/Gas", 120.0),
            item("Public Transport", 80.0),
            item("Car Maintenance", 100.0),
            item("Parking", 60.0),
            item("Uber/Taxi", 80.0),
        ],
    },
    PresetGroup {
        name: "Shopping & Personal",
        icon: "ShoppingCart",
        color: "purple",
        bucket: Bucket::Fun,
        items: &[
            item("Clothing", 150.0),
            item("Electronics", 200.0),
            item("Home & Garden", 100.0),
            item("Personal Care", 80.0),
            item("Gifts", 100.0),
        ],
    },
    PresetGroup {
        name: "Food & Dining",
        icon: "Utensils",
        color: "orange",
        bucket: Bucket::Fun,
        items: &[
            item("Restaurants", 200.0),
            item("Fast Food", 80.0),
            item("Coffee & Drinks", 60.0),
            item("Delivery", 120.0),
            item("Snacks & Treats", 50.0),
        ],
    },
    PresetGroup {
        name: "Entertainment",
        icon: "Gamepad2",
        color: "pink",
        bucket: Bucket::Fun,
        items: &[
            item("Movies & Shows", 40.0),
            item("Gaming", 60.0),
            item("Sports & Events", 100.0),
            item("Hobbies", 80.0),
            item("Subscriptions", 50.0),
            item("Books & Media", 30.0),
        ],
    },
    PresetGroup {
        name: "Work & Business",
        icon: "Briefcase",
        color: "indigo",
        bucket: Bucket::Investments,
        items: &[
            item("Office Supplies", 50.0),
            item("Software & Tools", 80.0),
            item("Business Meals", 100.0),
            item("Travel & Hotels", 200.0),
            item("Education & Courses", 150.0),
        ],
    },
    PresetGroup {
        name: "Health & Wellness",
        icon: "Heart",
        color: "red",
        bucket: Bucket::Essentials,
        items: &[
            item("Medical & Doctor", 100.0),
            item("Pharmacy & Meds", 60.0),
            item("Fitness & Gym", 50.0),
            item("Beauty & Spa", 80.0),
            item("Mental Health", 120.0),
        ],
    },
];

/// Looks up a preset group by name, ignoring case.
pub fn preset_group(name: &str) -> Option<&'static PresetGroup> {
    let name = name.trim();
    CATEGORY_PRESETS
        .iter()
        .find(|group| group.name.eq_ignore_ascii_case(name))
}

/// The ten categories a fresh snapshot starts with.
pub fn default_categories() -> Vec<Category> {
    let rows: [(&str, &str, &str, &str, f64, Bucket); 10] = [
        ("1", "Groceries", "ShoppingCart", "#22C55E", 400.0, Bucket::Essentials),
        ("2", "Transportation", "Car", "#3B82F6", 150.0, Bucket::Essentials),
        ("3", "Utilities", "Zap", "#F59E0B", 120.0, Bucket::Essentials),
        ("4", "Entertainment", "Film", "#EF4444", 200.0, Bucket::Fun),
        ("5", "Dining Out", "UtensilsCrossed", "#8B5CF6", 180.0, Bucket::Fun),
        ("6", "Shopping", "ShoppingBag", "#EC4899", 150.0, Bucket::Fun),
        ("7", "Healthcare", "Heart", "#10B981", 100.0, Bucket::Essentials),
        ("8", "Education", "BookOpen", "#06B6D4", 80.0, Bucket::Investments),
        ("9", "Savings & Investments", "TrendingUp", "#84CC16", 500.0, Bucket::Investments),
        ("10", "Subscriptions", "Repeat", "#F97316", 60.0, Bucket::Fun),
    ];
    rows.into_iter()
        .map(|(id, name, icon, color, limit, bucket)| Category {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            limit,
            currency: DEFAULT_CURRENCY.to_string(),
            allocation_bucket: bucket,
        })
        .collect()
}
