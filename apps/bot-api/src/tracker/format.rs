//! User-facing text for tracker notifications.

use chrono::DateTime;
use chrono_tz::Tz;
use gagstock_common::RestockTimers;

use super::snapshot::{Category, Item, Snapshot};

const RULE: &str = "-----------------------------------";

/// Outcome of rendering a snapshot for one session's filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Something to show.
    Update(String),
    /// Filters are set and nothing in the snapshot matched them.
    NoMatch(String),
}

pub fn render(
    snapshot: &Snapshot,
    filters: &[String],
    timers: &RestockTimers,
    now: &DateTime<Tz>,
) -> Rendered {
    let mut body = String::new();
    let mut found = 0;

    for (category, items) in snapshot.categories() {
        let shown: Vec<&Item> = items
            .iter()
            .filter(|item| matches_filters(&item.name, filters))
            .collect();
        if shown.is_empty() {
            continue;
        }
        found += shown.len();

        body.push_str(&format!(
            "{} (Restocks in {})\n",
            section_title(category),
            restock_in(category, timers)
        ));
        let lines: Vec<String> = shown
            .iter()
            .map(|item| {
                format!(
                    "› {} {}: {}",
                    item_emoji(&item.name),
                    item.name,
                    format_quantity(item.quantity)
                )
            })
            .collect();
        body.push_str(&lines.join("\n"));
        body.push_str("\n\n");
    }

    if !filters.is_empty() && found == 0 {
        return Rendered::NoMatch(no_match_notice(filters));
    }

    let weather = snapshot.weather();
    Rendered::Update(format!(
        "✨ *Gʀᴏᴡ A Gᴀʀᴅᴇɴ Sᴛᴏᴄᴋ Tʀᴀᴄᴋᴇʀ* ✨\n\n\
         {body}\
         {RULE}\n\
         🌦️ *Weather: {} {}*\n\
         🌾 Crop Bonus: {}\n\
         {RULE}\n\
         🕒 Last Updated ({}): {}",
        weather.icon,
        weather.condition,
        weather.crop_bonus,
        now.timezone().name(),
        now.format("%-I:%M %p"),
    ))
}

/// Case-insensitive substring match against any filter. Filters are already
/// lowercase.
pub fn matches_filters(name: &str, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    let name = name.to_lowercase();
    filters.iter().any(|f| name.contains(f.as_str()))
}

pub fn no_match_notice(filters: &[String]) -> String {
    format!(
        "🔍 *Nothing Found*\nNo items matched your filter: \"{}\". Try a broader term.",
        filters.join(", ")
    )
}

pub fn failure_notice() -> String {
    "⚠️ *Tracking Stopped.*\nThe stock service could not be reached, so your session was ended.\n\
     Send `gagstock on` to start again."
        .to_string()
}

/// `x12`, `x1.5K`, `x2.3M`.
pub fn format_quantity(quantity: u64) -> String {
    if quantity >= 1_000_000 {
        format!("x{:.1}M", quantity as f64 / 1e6)
    } else if quantity >= 1_000 {
        format!("x{:.1}K", quantity as f64 / 1e3)
    } else {
        format!("x{quantity}")
    }
}

fn section_title(category: Category) -> &'static str {
    match category {
        Category::Gear => "🛠️ *Gears*",
        Category::Seed => "🌱 *Seeds*",
        Category::Egg => "🥚 *Eggs*",
        Category::Honey => "🍯 *Honey*",
        Category::Cosmetics => "🎨 *Cosmetics*",
    }
}

fn restock_in(category: Category, timers: &RestockTimers) -> &str {
    match category {
        Category::Gear => &timers.gear,
        Category::Seed => &timers.seed,
        Category::Egg => &timers.egg,
        Category::Honey => &timers.honey,
        Category::Cosmetics => &timers.cosmetics,
    }
}

pub fn item_emoji(name: &str) -> &'static str {
    match name {
        "Common Egg" => "🥚",
        "Uncommon Egg" => "🐣",
        "Rare Egg" => "🍳",
        "Legendary Egg" => "🪺",
        "Mythical Egg" => "🌟",
        "Bug Egg" => "🪲",
        "Watering Can" => "🚿",
        "Trowel" => "🛠️",
        "Recall Wrench" => "🔧",
        "Basic Sprinkler" => "💧",
        "Advanced Sprinkler" => "💦",
        "Godly Sprinkler" => "⛲",
        "Lightning Rod" => "⚡",
        "Master Sprinkler" => "🌊",
        "Favorite Tool" => "❤️",
        "Harvest Tool" => "🌾",
        "Carrot" => "🥕",
        "Strawberry" => "🍓",
        "Blueberry" => "🫐",
        "Orange Tulip" => "🌷",
        "Tomato" => "🍅",
        "Corn" => "🌽",
        "Daffodil" => "🌼",
        "Watermelon" => "🍉",
        "Pumpkin" => "🎃",
        "Apple" => "🍎",
        "Bamboo" => "🎍",
        "Coconut" => "🥥",
        "Cactus" => "🌵",
        "Dragon Fruit" => "🍈",
        "Mango" => "🥭",
        "Grape" => "🍇",
        "Mushroom" => "🍄",
        "Pepper" => "🌶️",
        "Cacao" => "🍫",
        "Beanstalk" => "🌱",
        _ => "▫️",
    }
}
