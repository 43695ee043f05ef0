use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::{DaynoteError, Result};

/// Parse a key description such as `Ctrl+j`, `Cmd+k` or `Shift+Tab`.
pub fn parse_key(input: &str) -> Result<KeyEvent> {
    let parts: Vec<&str> = input.split('+').collect();
    let mut modifiers = KeyModifiers::NONE;
    let mut key_part = None;

    for (i, part) in parts.iter().enumerate() {
        let normalized = part.trim();
        match normalized.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" | "option" => modifiers |= KeyModifiers::ALT,
            "cmd" | "super" | "meta" => modifiers |= KeyModifiers::SUPER,
            _ => {
                if i == parts.len() - 1 {
                    key_part = Some(normalized);
                } else {
                    return Err(DaynoteError::Config(format!(
                        "Unknown modifier '{}' in key '{}'",
                        normalized, input
                    )));
                }
            }
        }
    }

    let key_str = key_part
        .filter(|k| !k.is_empty())
        .ok_or_else(|| DaynoteError::Config(format!("No key code found in '{}'", input)))?;

    let code = parse_key_code(key_str)?;

    Ok(KeyEvent::new(code, modifiers))
}

fn parse_key_code(s: &str) -> Result<KeyCode> {
    match s.to_lowercase().as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "tab" => Ok(KeyCode::Tab),
        "backspace" | "bs" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdn" => Ok(KeyCode::PageDown),
        "up" | "↑" => Ok(KeyCode::Up),
        "down" | "↓" => Ok(KeyCode::Down),
        "left" | "←" => Ok(KeyCode::Left),
        "right" | "→" => Ok(KeyCode::Right),
        "space" => Ok(KeyCode::Char(' ')),
        lower if lower.starts_with('f') && lower.len() > 1 => {
            let num: u8 = lower[1..]
                .parse()
                .map_err(|_| DaynoteError::Config(format!("Invalid function key: {}", s)))?;
            if !(1..=12).contains(&num) {
                return Err(DaynoteError::Config(format!(
                    "Function key out of range: F{}",
                    num
                )));
            }
            Ok(KeyCode::F(num))
        }
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Ok(KeyCode::Char(ch)),
                _ => Err(DaynoteError::Config(format!("Unknown key: {}", s))),
            }
        }
    }
}
