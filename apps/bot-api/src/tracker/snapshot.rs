//! Validated, immutable view of one read of both upstream sources.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::error::TrackerError;

pub const DEFAULT_CONDITION: &str = "Unknown";
pub const DEFAULT_ICON: &str = "🌤️";
pub const DEFAULT_CROP_BONUS: &str = "None";

/// Shop categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Gear,
    Seed,
    Egg,
    Honey,
    Cosmetics,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Gear,
        Category::Seed,
        Category::Egg,
        Category::Honey,
        Category::Cosmetics,
    ];

    /// Key used by the upstream stock payload.
    pub fn key(self) -> &'static str {
        match self {
            Category::Gear => "gear",
            Category::Seed => "seed",
            Category::Egg => "egg",
            Category::Honey => "honey",
            Category::Cosmetics => "cosmetics",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(deserialize_with = "quantity")]
    pub quantity: u64,
}

impl Item {
    pub fn new(name: impl Into<String>, quantity: u64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weather {
    pub condition: String,
    pub icon: String,
    pub crop_bonus: String,
}

impl Weather {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            icon: DEFAULT_ICON.to_string(),
            crop_bonus: DEFAULT_CROP_BONUS.to_string(),
        }
    }
}

impl Default for Weather {
    fn default() -> Self {
        Self::new(DEFAULT_CONDITION)
    }
}

/// One fully validated read of the stock and weather sources.
///
/// Every category is always present (possibly empty). Fields are private so a
/// snapshot cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    categories: BTreeMap<Category, Vec<Item>>,
    weather: Weather,
}

impl Snapshot {
    pub fn new(categories: impl IntoIterator<Item = (Category, Vec<Item>)>, weather: Weather) -> Self {
        let mut map: BTreeMap<Category, Vec<Item>> =
            Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
        map.extend(categories);
        Self {
            categories: map,
            weather,
        }
    }

    /// Build a snapshot from raw upstream payloads, failing closed on any
    /// shape mismatch.
    pub fn from_payloads(stock: &Value, weather: &Value) -> Result<Self, TrackerError> {
        let envelope = StockEnvelope::deserialize(stock)
            .map_err(|e| TrackerError::FetchFailed(format!("malformed stock payload: {e}")))?;

        if !weather.is_object() {
            return Err(TrackerError::FetchFailed(
                "malformed weather payload: expected an object".to_string(),
            ));
        }
        let raw_weather = WeatherPayload::deserialize(weather)
            .map_err(|e| TrackerError::FetchFailed(format!("malformed weather payload: {e}")))?;

        let groups = envelope.data;
        Ok(Self::new(
            [
                (Category::Gear, groups.gear.items),
                (Category::Seed, groups.seed.items),
                (Category::Egg, groups.egg.items),
                (Category::Honey, groups.honey.items),
                (Category::Cosmetics, groups.cosmetics.items),
            ],
            Weather {
                condition: text_or(raw_weather.current_weather, DEFAULT_CONDITION),
                icon: text_or(raw_weather.icon, DEFAULT_ICON),
                crop_bonus: text_or(raw_weather.crop_bonuses, DEFAULT_CROP_BONUS),
            },
        ))
    }

    pub fn items(&self, category: Category) -> &[Item] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Categories in display order.
    pub fn categories(&self) -> impl Iterator<Item = (Category, &[Item])> {
        self.categories.iter().map(|(c, items)| (*c, items.as_slice()))
    }

    pub fn weather(&self) -> &Weather {
        &self.weather
    }
}

// ---------------------------------------------------------------------------
// Upstream wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StockEnvelope {
    data: StockGroups,
}

#[derive(Deserialize)]
struct StockGroups {
    gear: ItemGroup,
    seed: ItemGroup,
    egg: ItemGroup,
    honey: ItemGroup,
    cosmetics: ItemGroup,
}

#[derive(Deserialize)]
struct ItemGroup {
    items: Vec<Item>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherPayload {
    #[serde(default)]
    current_weather: Option<Value>,
    #[serde(default)]
    icon: Option<Value>,
    #[serde(default)]
    crop_bonuses: Option<Value>,
}

/// Empty or non-text values fall back to the placeholder.
fn text_or(value: Option<Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        _ => fallback.to_string(),
    }
}

/// Accepts a non-negative integer, an integral float, or a numeric string.
fn quantity<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };
    parsed.ok_or_else(|| de::Error::custom(format!("invalid quantity {value}")))
}

fn integral(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stock_payload() -> Value {
        json!({
            "data": {
                "gear": { "items": [{ "name": "Trowel", "quantity": 2 }] },
                "seed": { "items": [
                    { "name": "Carrot", "quantity": "14" },
                    { "name": "Corn", "quantity": 3.0 }
                ] },
                "egg": { "items": [] },
                "honey": { "items": [{ "name": "Flower Seed Pack", "quantity": 1 }] },
                "cosmetics": { "items": [{ "name": "Sign Crate", "quantity": "1" }] }
            }
        })
    }

    #[test]
    fn parses_and_coerces_quantities() {
        let weather = json!({ "currentWeather": "Rain", "icon": "🌧️", "cropBonuses": "Wet" });
        let snapshot = Snapshot::from_payloads(&stock_payload(), &weather).unwrap();

        assert_eq!(snapshot.items(Category::Gear), &[Item::new("Trowel", 2)]);
        assert_eq!(
            snapshot.items(Category::Seed),
            &[Item::new("Carrot", 14), Item::new("Corn", 3)]
        );
        assert!(snapshot.items(Category::Egg).is_empty());
        assert_eq!(snapshot.items(Category::Cosmetics), &[Item::new("Sign Crate", 1)]);
        assert_eq!(snapshot.weather().condition, "Rain");
        assert_eq!(snapshot.weather().icon, "🌧️");
        assert_eq!(snapshot.weather().crop_bonus, "Wet");
    }

    #[test]
    fn weather_fields_default_when_absent_or_empty() {
        let snapshot = Snapshot::from_payloads(&stock_payload(), &json!({ "icon": "" })).unwrap();
        assert_eq!(snapshot.weather(), &Weather::default());
    }

    #[test]
    fn categories_iterate_in_display_order() {
        let snapshot = Snapshot::from_payloads(&stock_payload(), &json!({})).unwrap();
        let order: Vec<Category> = snapshot.categories().map(|(c, _)| c).collect();
        assert_eq!(order, Category::ALL);
    }

    #[test]
    fn missing_category_is_fetch_failure() {
        let mut stock = stock_payload();
        stock["data"].as_object_mut().unwrap().remove("honey");
        let err = Snapshot::from_payloads(&stock, &json!({})).unwrap_err();
        assert!(matches!(err, TrackerError::FetchFailed(msg) if msg.contains("honey")));
    }

    #[test]
    fn items_must_be_an_array() {
        let mut stock = stock_payload();
        stock["data"]["egg"]["items"] = json!("none");
        assert!(Snapshot::from_payloads(&stock, &json!({})).is_err());
    }

    #[test]
    fn non_numeric_quantity_is_rejected() {
        let mut stock = stock_payload();
        stock["data"]["gear"]["items"][0]["quantity"] = json!("lots");
        assert!(Snapshot::from_payloads(&stock, &json!({})).is_err());

        stock["data"]["gear"]["items"][0]["quantity"] = json!(-1);
        assert!(Snapshot::from_payloads(&stock, &json!({})).is_err());

        stock["data"]["gear"]["items"][0]["quantity"] = json!(1.5);
        assert!(Snapshot::from_payloads(&stock, &json!({})).is_err());
    }

    #[test]
    fn weather_must_be_an_object() {
        assert!(Snapshot::from_payloads(&stock_payload(), &json!(["Rain"])).is_err());
        assert!(Snapshot::from_payloads(&stock_payload(), &Value::Null).is_err());
    }

    #[test]
    fn missing_data_envelope_is_rejected() {
        let stock = json!({ "gear": { "items": [] } });
        assert!(Snapshot::from_payloads(&stock, &json!({})).is_err());
    }
}
