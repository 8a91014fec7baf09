/// Axis tags and the names people actually call them
///
/// Fonts speak in packed 4-byte codes; the detail panel speaks in words.
/// This module converts between the two and keeps the small dictionary of
/// registered (and popular parametric) axes that earn a human label.
///
/// Made with curiosity at FontLab https://www.fontlab.com/
use read_fonts::types::Tag;

/// Render a packed 32-bit tag as four characters, most-significant byte first.
///
/// Every byte becomes exactly one character; bytes outside printable ASCII
/// are shown as `?` so the result is always four characters long.
pub fn tag_to_string(raw: u32) -> String {
    raw.to_be_bytes()
        .iter()
        .map(|&b| {
            if (0x20..=0x7E).contains(&b) {
                b as char
            } else {
                '?'
            }
        })
        .collect()
}

/// Pack a read-fonts `Tag` into its 32-bit big-endian value.
pub fn tag_value(tag: Tag) -> u32 {
    u32::from_be_bytes(tag.to_be_bytes())
}

const AXIS_LABELS: &[(&str, &str)] = &[
    ("wght", "Weight"),
    ("wdth", "Width"),
    ("slnt", "Slant"),
    ("ital", "Italic"),
    ("opsz", "Optical Size"),
    ("GRAD", "Grade"),
    ("XTRA", "X Transparent"),
    ("XOPQ", "X Opaque"),
    ("YOPQ", "Y Opaque"),
    ("YTLC", "Lowercase Height"),
    ("YTUC", "Uppercase Height"),
    ("YTAS", "Ascender Height"),
    ("YTDE", "Descender Depth"),
    ("YTFI", "Figure Height"),
    ("CASL", "Casual"),
    ("CRSV", "Cursive"),
    ("MONO", "Monospace"),
    ("FILL", "Fill"),
    ("SOFT", "Softness"),
    ("WONK", "Wonky"),
    ("ELGR", "Element Grid"),
    ("ELSH", "Element Shape"),
    ("BLED", "Bleed"),
    ("SCAN", "Scanlines"),
];

/// Human-readable label for an axis tag; unknown tags have none.
pub fn axis_label(tag: &str) -> Option<&'static str> {
    AXIS_LABELS
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, label)| *label)
}
