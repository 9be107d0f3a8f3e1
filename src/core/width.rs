//! Visible width helpers that ignore ANSI control sequences.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB_WIDTH: usize = 3;

/// Byte length of the CSI sequence starting at `pos`, if any.
fn csi_len(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&0x1b) || bytes.get(pos + 1) != Some(&b'[') {
        return None;
    }

    let mut idx = pos + 2;
    while idx < bytes.len() {
        if (0x40..=0x7e).contains(&bytes[idx]) {
            return Some(idx + 1 - pos);
        }
        idx += 1;
    }
    None
}

/// Removes CSI escape sequences (colors, cursor moves) from `input`.
pub fn strip_ansi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;

    while idx < input.len() {
        if let Some(length) = csi_len(input, idx) {
            idx += length;
            continue;
        }

        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }

    clean
}

/// Terminal columns occupied by `input` once escapes are stripped.
pub fn visible_width(input: &str) -> usize {
    strip_ansi(input)
        .graphemes(true)
        .map(|grapheme| {
            if grapheme == "\t" {
                TAB_WIDTH
            } else {
                UnicodeWidthStr::width(grapheme)
            }
        })
        .sum()
}
