//! Media types that bypass capacity packing and live in a fixed area.

/// Media type code to override bin code. Every other code, including the
/// standard LP code and an absent code, goes through normal packing.
pub const OVERRIDE_CODES: &[(i64, &str)] = &[
    (11, "OF"),
    (14, "MR"),
    (15, "MC"),
    (17, "SS"),
    (20, "SC"),
    (21, "SC"),
];

/// The fixed bin code for `media_type_code`, or `None` for normal flow.
pub fn override_code(media_type_code: Option<i64>) -> Option<&'static str> {
    let code = media_type_code.unwrap_or(0);
    OVERRIDE_CODES
        .iter()
        .find(|(media_type, _)| *media_type == code)
        .map(|(_, bin_code)| *bin_code)
}
