//! Small formatting helpers for the display

/// Format seconds as `MM:SS`; minutes are not wrapped at the hour
pub fn clock_face(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse `#rrggbb` into its channels
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return None;
    }
    let n = u32::from_str_radix(digits, 16).ok()?;
    Some((((n >> 16) & 255) as u8, ((n >> 8) & 255) as u8, (n & 255) as u8))
}

/// CSS `rgba()` colour for a hex colour at the given opacity
pub fn rgba(hex: &str, opacity: f64) -> Option<String> {
    let (r, g, b) = hex_to_rgb(hex)?;
    Some(format!("rgba({},{},{},{})", r, g, b, opacity))
}
