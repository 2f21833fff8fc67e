//! Known controller commands.

/// Identification string (manufacturer, model, serial, firmware).
pub const IDENTIFY: &str = "*IDN?";

/// Comma-separated values of every output channel.
pub const GET_OUTPUT: &str = "getOutput?";

/// Comma-separated names of every output channel, in `getOutput?` order.
pub const GET_OUTPUT_NAMES: &str = "getOutputNames?";

/// Token the controller sends in place of a value when it has no data.
pub const NAN_TOKEN: &str = "NaN";

/// Build the single-channel query for a channel name.
///
/// Display names may contain spaces; the controller's channel syntax
/// does not, so they are removed.
pub fn channel_query(channel: &str) -> String {
    let mut query: String = channel.chars().filter(|c| *c != ' ').collect();
    query.push('?');
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_query_strips_spaces() {
        assert_eq!(channel_query("3A"), "3A?");
        assert_eq!(channel_query("Out 1"), "Out1?");
        assert_eq!(channel_query(" Heater  Out "), "HeaterOut?");
    }
}
