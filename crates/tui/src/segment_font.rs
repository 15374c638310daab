use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Rows per rendered glyph.
pub const FONT_HEIGHT: usize = 3;
const GLYPH_WIDTH: usize = 3;
const SPACING: usize = 1;

const SEG_A: u8 = 0x01;
const SEG_B: u8 = 0x02;
const SEG_C: u8 = 0x04;
const SEG_D: u8 = 0x08;
const SEG_E: u8 = 0x10;
const SEG_F: u8 = 0x20;
const SEG_G: u8 = 0x40;

// Segment masks as the clock's own display approximates them.
static SEGMENTS: Lazy<HashMap<char, u8>> = Lazy::new(|| {
    HashMap::from([
        ('0', 0x3f),
        ('1', 0x06),
        ('2', 0x5b),
        ('3', 0x4f),
        ('4', 0x66),
        ('5', 0x6d),
        ('6', 0x7d),
        ('7', 0x07),
        ('8', 0x7f),
        ('9', 0x6f),
        ('A', 0x77),
        ('B', 0x7c),
        ('C', 0x39),
        ('D', 0x5e),
        ('E', 0x79),
        ('F', 0x71),
        ('G', 0x3d),
        ('H', 0x76),
        ('I', 0x30),
        ('J', 0x1e),
        ('K', 0x75),
        ('L', 0x38),
        ('M', 0x37),
        ('N', 0x54),
        ('O', 0x3f),
        ('P', 0x73),
        ('Q', 0x67),
        ('R', 0x50),
        ('S', 0x6d),
        ('T', 0x78),
        ('U', 0x3e),
        ('V', 0x1c),
        ('W', 0x2a),
        ('X', 0x76),
        ('Y', 0x6e),
        ('Z', 0x5b),
        ('-', SEG_G),
        ('_', SEG_D),
        ('=', SEG_G | SEG_D),
        ('\'', SEG_F),
        ('"', SEG_F | SEG_B),
        (' ', 0x00),
    ])
});

/// Render `text` as three rows of seven-segment digits.
///
/// Letters are case-insensitive; characters without a segment pattern are blank.
pub fn render(text: &str) -> Vec<String> {
    let mut rows = vec![String::new(); FONT_HEIGHT];
    for (index, ch) in text.chars().enumerate() {
        let mask = SEGMENTS
            .get(&ch.to_ascii_uppercase())
            .copied()
            .unwrap_or_default();
        for (row, line) in rows.iter_mut().enumerate() {
            if index > 0 {
                line.push_str(&" ".repeat(SPACING));
            }
            line.push_str(&glyph_row(mask, row));
        }
    }
    rows
}

/// Terminal columns needed to render `len` characters.
pub fn width(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    len * GLYPH_WIDTH + (len - 1) * SPACING
}

fn glyph_row(mask: u8, row: usize) -> String {
    let on = |segment: u8, symbol: char| if mask & segment != 0 { symbol } else { ' ' };
    match row {
        0 => [' ', on(SEG_A, '_'), ' '].iter().collect(),
        1 => [on(SEG_F, '|'), on(SEG_G, '_'), on(SEG_B, '|')].iter().collect(),
        _ => [on(SEG_E, '|'), on(SEG_D, '_'), on(SEG_C, '|')].iter().collect(),
    }
}
