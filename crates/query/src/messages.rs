//! Fixed reply texts.

pub const INVALID_INPUT: &str = "Invalid input. Tell me what you need and where, \
for example \"oxygen in Mumbai\" or \"/hospital Pune\". Send /help for the full list.";

pub const NOTHING_FOUND: &str = "I'm sorry, I couldn't find anything. \
Try a nearby district or check the spelling.";

pub const SOURCE_UNAVAILABLE: &str = "Sorry, I couldn't reach the resource database \
right now. Please try again in a little while.";

pub const NO_MORE: &str = "No more information is available for your last search. \
Send a new query to search again.";

pub const GENERIC_ERROR: &str = "Sorry, an error occurred while handling your message. \
Please try again.";

pub const RESULTS_HEADER: &str = "Here's what I've found -";

pub const MORE_INVITE: &str = "Send /more for more results.";
