use super::PREFIX;

/// Command list sent in reply to `help`.
pub fn text() -> String {
    format!(
        "✨ *Here's what I can do!* ✨\n\n\
         *Core Commands*\n\
         `{PREFIX}help` - Shows this help message.\n\n\
         *Tool Commands*\n\
         `{PREFIX}gagstock on` - Starts tracking Grow A Garden stock.\n\
         `{PREFIX}gagstock on [item]` - Tracks a specific item (e.g., `{PREFIX}gagstock on carrot`).\n\
         `{PREFIX}gagstock off` - Stops the stock tracker.\n\n\
         Just type a command to get started!"
    )
}
