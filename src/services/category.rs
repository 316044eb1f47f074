//! Translates user-facing category tokens into the upstream place-type
//! vocabulary. Unmapped input passes through unchanged.

const CATEGORY_TABLE: &[(&str, &str)] = &[
    ("hotel", "lodging"),
    ("hotels", "lodging"),
    ("motel", "lodging"),
    ("shopping", "shopping_mall"),
    ("shops", "shopping_mall"),
    ("coffee", "cafe"),
    ("pub", "bar"),
    ("mechanic", "car_repair"),
    ("hairdresser", "hair_care"),
    ("takeaway", "meal_takeaway"),
];

#[must_use]
pub fn map_category(user_category: &str) -> String {
    let trimmed = user_category.trim();
    let needle = trimmed.to_lowercase();

    CATEGORY_TABLE
        .iter()
        .find(|(from, _)| *from == needle)
        .map_or_else(|| trimmed.to_string(), |(_, to)| (*to).to_string())
}
