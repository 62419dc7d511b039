//! Server reply text.
//!
//! Every line the server sends is built here so that the server, its tests
//! and any client agree on the exact wording.

/// Header line of a `#displayChannels` listing.
pub const CHANNEL_LIST_HEADER: &str = "Available Channels:";
/// First line of a `#retrieve` replay.
pub const AWAY_START: &str = "====Start Away Messages====";
/// Last line of a `#retrieve` replay.
pub const AWAY_END: &str = "====End Away Messages====";
/// Sent before the server closes a connection whose password did not match.
pub const AUTH_REJECTED: &str = "Invalid username/password...disconnecting";
/// Sent before the server closes a flooding connection.
pub const EXCESS_FLOOD: &str = "Error. Excess flood";

/// `{login_id} has logged on.`
pub fn logged_on(login_id: &str) -> String {
    format!("{} has logged on.", login_id)
}

/// Broadcast chat line.
pub fn says(login_id: &str, text: &str) -> String {
    format!("{} says: {}", login_id, text)
}

/// Echo of a private message to its sender.
pub fn private_to(target: &str, text: &str) -> String {
    format!("To {}:> {}", target, text)
}

/// A private message as delivered to its recipient (and queued while away).
pub fn private_from(sender: &str, text: &str) -> String {
    format!("From {}:> {}", sender, text)
}

/// A private message as forwarded to the recipient's monitor.
pub fn monitored_message(target: &str, sender: &str, text: &str) -> String {
    format!("Message for: {} from {}> {}", target, sender, text)
}

/// A message relayed inside a channel.
pub fn channel_says(channel: &str, sender: &str, text: &str) -> String {
    format!("Channel: {}> {} says: {}", channel, sender, text)
}

/// Acknowledgement of `#create`.
pub fn channel_created(channel: &str) -> String {
    format!("You've joined channel {}", channel)
}

/// Acknowledgement of `#join`.
pub fn channel_joined(channel: &str) -> String {
    format!("You've successfully joined {}", channel)
}

/// Acknowledgement of `#leave`.
pub fn channel_left(channel: &str) -> String {
    format!("You've left {}", channel)
}

/// Notice to a user that someone started monitoring them.
pub fn monitor_started(monitor: &str) -> String {
    format!("{} is now monitoring your messages", monitor)
}

/// Acknowledgement of `#select` to the monitor.
pub fn monitoring(target: &str) -> String {
    format!("You are now monitoring {}", target)
}

/// Notice to a monitee that its monitor issued `#back` (or moved on).
pub fn monitor_released(monitor: &str) -> String {
    format!("{} is back; you are no longer being monitored", monitor)
}

/// Acknowledgement of `#back` to the monitor.
pub fn monitoring_stopped(target: &str) -> String {
    format!("You are no longer monitoring {}", target)
}

/// Notice to a monitee that its monitor disconnected.
pub fn monitor_logged_off(monitor: &str) -> String {
    format!("Your monitor, {}, has logged off", monitor)
}

/// Notice to a monitor that its monitee disconnected.
pub fn monitee_logged_off(target: &str) -> String {
    format!("{} has logged off; monitoring ended", target)
}

/// Generic error line.
pub fn error(text: impl std::fmt::Display) -> String {
    format!("Error. {}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_relay_format() {
        assert_eq!(
            channel_says("lobby", "alice", "hi all"),
            "Channel: lobby> alice says: hi all"
        );
    }

    #[test]
    fn test_private_formats() {
        assert_eq!(private_to("alice", "hello"), "To alice:> hello");
        assert_eq!(private_from("carol", "hello"), "From carol:> hello");
        assert_eq!(
            monitored_message("alice", "carol", "hello"),
            "Message for: alice from carol> hello"
        );
    }

    #[test]
    fn test_error_prefix() {
        assert_eq!(error("Channel name taken"), "Error. Channel name taken");
    }
}
