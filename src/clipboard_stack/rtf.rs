//! Minimal RTF to plain text conversion for previews.
//!
//! Only extracts the visible text: control words are dropped, ignorable
//! destinations (`{\*...}`, font/color tables, pictures, ...) are skipped,
//! and the common character escapes (`\'hh`, `\uN`, `\par`, `\tab`, quotes
//! and dashes) are mapped to their characters.

/// Destinations whose content is never visible text.
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "expandedcolortbl",
    "stylesheet",
    "info",
    "pict",
    "object",
    "header",
    "footer",
    "listtable",
    "listoverridetable",
    "generator",
    "filetbl",
    "rsidtbl",
    "xmlnstbl",
    "themedata",
    "colorschememapping",
    "latentstyles",
    "datastore",
    "fldinst",
];

/// Windows-1252 code points for 0x80..=0x9F (the rest matches Latin-1).
const CP1252_HIGH: [char; 32] = [
    '€', '\u{81}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{8D}', 'Ž',
    '\u{8F}', '\u{90}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ', '\u{9D}',
    'ž', 'Ÿ',
];

#[derive(Clone, Copy)]
struct GroupState {
    skip: bool,
    unicode_skip: usize,
}

/// Decode an RTF document to plain text.
///
/// Returns None when the input is not RTF (no `{\rtf` header).
pub fn rtf_to_plain_text(bytes: &[u8]) -> Option<String> {
    let source = String::from_utf8_lossy(bytes);
    if !source.trim_start().starts_with("{\\rtf") {
        return None;
    }

    let chars: Vec<char> = source.chars().collect();
    let mut out = String::new();
    let mut stack: Vec<GroupState> = Vec::new();
    let mut state = GroupState {
        skip: false,
        unicode_skip: 1,
    };
    // Fallback characters still to drop after a \uN escape
    let mut pending_fallback = 0usize;
    // Set right after `{`, so the first control word can mark a destination
    let mut group_start = false;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '{' => {
                stack.push(state);
                group_start = true;
                pending_fallback = 0;
                i += 1;
                continue;
            }
            '}' => {
                state = stack.pop().unwrap_or(state);
                group_start = false;
                pending_fallback = 0;
                i += 1;
                continue;
            }
            '\\' => {
                let at_group_start = group_start;
                group_start = false;
                i += 1;
                let Some(&next) = chars.get(i) else { break };

                if next.is_ascii_alphabetic() {
                    let word_start = i;
                    while i < chars.len() && chars[i].is_ascii_alphabetic() {
                        i += 1;
                    }
                    let word: String = chars[word_start..i].iter().collect();

                    let num_start = i;
                    if i < chars.len() && chars[i] == '-' {
                        i += 1;
                    }
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                    let param: Option<i32> = if i > num_start {
                        chars[num_start..i].iter().collect::<String>().parse().ok()
                    } else {
                        None
                    };
                    // A single space delimits the control word
                    if i < chars.len() && chars[i] == ' ' {
                        i += 1;
                    }

                    if at_group_start && SKIPPED_DESTINATIONS.contains(&word.as_str()) {
                        state.skip = true;
                        continue;
                    }
                    if word == "uc" {
                        state.unicode_skip = param.unwrap_or(1).max(0) as usize;
                        continue;
                    }
                    if word == "u" {
                        if let Some(code) = param {
                            let code = if code < 0 { code + 65536 } else { code } as u32;
                            if !state.skip {
                                if let Some(ch) = char::from_u32(code) {
                                    out.push(ch);
                                }
                            }
                            pending_fallback = state.unicode_skip;
                        }
                        continue;
                    }
                    if !state.skip {
                        if let Some(text) = control_word_text(&word) {
                            out.push_str(text);
                        }
                    }
                    continue;
                }

                match next {
                    '*' => {
                        state.skip = true;
                        i += 1;
                    }
                    '\'' => {
                        let hex: String = chars
                            .iter()
                            .skip(i + 1)
                            .take(2)
                            .take_while(|c| c.is_ascii_hexdigit())
                            .collect();
                        i += 1 + hex.len();
                        if pending_fallback > 0 {
                            pending_fallback -= 1;
                        } else if !state.skip {
                            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                                out.push(cp1252_char(byte));
                            }
                        }
                    }
                    '\\' | '{' | '}' => {
                        if !state.skip {
                            out.push(next);
                        }
                        i += 1;
                    }
                    '~' => {
                        if !state.skip {
                            out.push('\u{00A0}');
                        }
                        i += 1;
                    }
                    '_' => {
                        if !state.skip {
                            out.push('\u{2011}');
                        }
                        i += 1;
                    }
                    '\n' | '\r' => {
                        if !state.skip {
                            out.push('\n');
                        }
                        i += 1;
                    }
                    // \- optional hyphen, \| and others: no visible text
                    _ => i += 1,
                }
                continue;
            }
            '\n' | '\r' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        group_start = false;
        if pending_fallback > 0 {
            pending_fallback -= 1;
        } else if !state.skip {
            out.push(c);
        }
        i += 1;
    }

    Some(out)
}

fn control_word_text(word: &str) -> Option<&'static str> {
    let text = match word {
        "par" | "line" | "sect" | "page" | "row" => "\n",
        "tab" | "cell" => "\t",
        "emdash" => "—",
        "endash" => "–",
        "bullet" => "•",
        "lquote" => "‘",
        "rquote" => "’",
        "ldblquote" => "“",
        "rdblquote" => "”",
        _ => return None,
    };
    Some(text)
}

fn cp1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => CP1252_HIGH[(byte - 0x80) as usize],
        _ => byte as char,
    }
}
