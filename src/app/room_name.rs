const MAX_ROOM_NAME_LEN: usize = 64;
pub const DEFAULT_ROOM: &str = "main";

/// Keeps the URL-safe part of a requested room name, falling back to the
/// default room when nothing usable is left.
pub fn sanitize_room_name(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .take(MAX_ROOM_NAME_LEN)
        .collect();
    if cleaned.is_empty() {
        DEFAULT_ROOM.to_string()
    } else {
        cleaned
    }
}
