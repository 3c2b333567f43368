use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{error, warn};
use serde::Deserialize;

use super::keymap::{KeyBinding, KeyPattern, Keymap};
use super::layer::Layer;
use super::KeyCode;

/// Raw TOML structure for the keybindings config file
#[derive(Deserialize, Default)]
struct KeybindingConfig {
    #[allow(dead_code)]
    #[serde(default)]
    version: u32,
    #[serde(default)]
    layers: HashMap<String, LayerConfig>,
}

#[derive(Deserialize)]
struct LayerConfig {
    #[serde(default = "default_transparent")]
    transparent: bool,
    bindings: Vec<RawBinding>,
}

fn default_transparent() -> bool {
    true
}

/// A single binding entry from TOML
#[derive(Deserialize)]
struct RawBinding {
    key: String,
    action: String,
    description: String,
}

/// Intern a String into a &'static str.
/// These are loaded once at startup and never freed.
fn intern(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

/// Parse a key notation string into a KeyPattern.
///
/// Supported formats:
/// - `"q"` → Char('q')
/// - `"Up"` → Key(KeyCode::Up)
/// - `"Ctrl+s"` → Ctrl('s')
/// - `"Alt+x"` → Alt('x')
/// - `"Ctrl+Left"` → CtrlKey(KeyCode::Left)
/// - `"Shift+Right"` → ShiftKey(KeyCode::Right)
/// - `"F1"` → Key(KeyCode::F(1))
fn parse_key(s: &str) -> Option<KeyPattern> {
    if let Some(rest) = s.strip_prefix("Ctrl+") {
        match single_char(rest) {
            Some(c) => Some(KeyPattern::Ctrl(c)),
            None => parse_named_key(rest).map(KeyPattern::CtrlKey),
        }
    } else if let Some(rest) = s.strip_prefix("Alt+") {
        single_char(rest).map(KeyPattern::Alt)
    } else if let Some(rest) = s.strip_prefix("Shift+") {
        parse_named_key(rest).map(KeyPattern::ShiftKey)
    } else if let Some(c) = single_char(s) {
        Some(KeyPattern::Char(c))
    } else if s == "Space" {
        Some(KeyPattern::Char(' '))
    } else {
        parse_named_key(s).map(KeyPattern::Key)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Parse a named key string (e.g., "Up", "Enter", "F1") into a KeyCode
fn parse_named_key(s: &str) -> Option<KeyCode> {
    let code = match s {
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Enter" => KeyCode::Enter,
        "Escape" => KeyCode::Escape,
        "Backspace" => KeyCode::Backspace,
        "Tab" => KeyCode::Tab,
        "BackTab" => KeyCode::BackTab,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "Insert" => KeyCode::Insert,
        "Delete" => KeyCode::Delete,
        _ => return s.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()).map(KeyCode::F),
    };
    Some(code)
}

/// Embedded default keybindings TOML
const DEFAULT_KEYBINDINGS: &str = include_str!("../../keybindings.toml");

/// Mode layer names that are not pane layers
const MODE_LAYERS: &[&str] = &["global", "text_edit"];

/// Load keybindings: embedded default, optionally merged with user override.
/// Returns (Vec<Layer> for LayerStack, pane keymaps for pane construction).
pub fn load_keybindings() -> (Vec<Layer>, HashMap<String, Keymap>) {
    load_keybindings_with(user_keybindings_path().as_deref())
}

fn load_keybindings_with(user_path: Option<&Path>) -> (Vec<Layer>, HashMap<String, Keymap>) {
    let mut config: KeybindingConfig = toml::from_str(DEFAULT_KEYBINDINGS).unwrap_or_else(|e| {
        error!("embedded keybindings.toml is invalid: {}", e);
        KeybindingConfig::default()
    });

    if let Some(path) = user_path.filter(|p| p.exists()) {
        match std::fs::read_to_string(path).map(|c| toml::from_str::<KeybindingConfig>(&c)) {
            Ok(Ok(user_config)) => merge_config(&mut config, user_config),
            Ok(Err(e)) => warn!("ignoring {}: {}", path.display(), e),
            Err(e) => warn!("cannot read {}: {}", path.display(), e),
        }
    }

    let layers = build_layers(&config.layers);
    let pane_keymaps = build_pane_keymaps(&config.layers);

    (layers, pane_keymaps)
}

fn user_keybindings_path() -> Option<PathBuf> {
    lumen_core::settings::config_dir().map(|d| d.join("keybindings.toml"))
}

/// Merge user config into the base config.
/// User layer entries fully replace the default layer entries.
fn merge_config(base: &mut KeybindingConfig, user: KeybindingConfig) {
    for (layer_id, layer_config) in user.layers {
        base.layers.insert(layer_id, layer_config);
    }
}

fn build_bindings(raw: &[RawBinding]) -> Vec<KeyBinding> {
    raw.iter()
        .filter_map(|b| match parse_key(&b.key) {
            Some(pattern) => Some(KeyBinding {
                pattern,
                action: intern(b.action.clone()),
                description: intern(b.description.clone()),
            }),
            None => {
                warn!("unknown key '{}' bound to {}", b.key, b.action);
                None
            }
        })
        .collect()
}

fn build_layers(layers: &HashMap<String, LayerConfig>) -> Vec<Layer> {
    layers
        .iter()
        .map(|(name, config)| Layer {
            name: intern(name.clone()),
            keymap: Keymap::from_bindings(build_bindings(&config.bindings)),
            transparent: config.transparent,
        })
        .collect()
}

/// Build pane keymaps (excluding mode layers) for pane construction.
fn build_pane_keymaps(layers: &HashMap<String, LayerConfig>) -> HashMap<String, Keymap> {
    layers
        .iter()
        .filter(|(name, _)| !MODE_LAYERS.contains(&name.as_str()))
        .map(|(name, config)| (name.clone(), Keymap::from_bindings(build_bindings(&config.bindings))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_char() {
        assert_eq!(parse_key("q"), Some(KeyPattern::Char('q')));
        assert_eq!(parse_key("+"), Some(KeyPattern::Char('+')));
    }

    #[test]
    fn test_parse_key_named() {
        assert_eq!(parse_key("Up"), Some(KeyPattern::Key(KeyCode::Up)));
        assert_eq!(parse_key("Enter"), Some(KeyPattern::Key(KeyCode::Enter)));
        assert_eq!(parse_key("Space"), Some(KeyPattern::Char(' ')));
    }

    #[test]
    fn test_parse_key_modifiers() {
        assert_eq!(parse_key("Ctrl+s"), Some(KeyPattern::Ctrl('s')));
        assert_eq!(parse_key("Alt+x"), Some(KeyPattern::Alt('x')));
        assert_eq!(parse_key("Ctrl+Left"), Some(KeyPattern::CtrlKey(KeyCode::Left)));
        assert_eq!(parse_key("Shift+Right"), Some(KeyPattern::ShiftKey(KeyCode::Right)));
    }

    #[test]
    fn test_parse_key_f_keys() {
        assert_eq!(parse_key("F1"), Some(KeyPattern::Key(KeyCode::F(1))));
        assert_eq!(parse_key("F12"), Some(KeyPattern::Key(KeyCode::F(12))));
    }

    #[test]
    fn test_parse_key_unknown() {
        assert_eq!(parse_key("Hyper"), None);
        assert_eq!(parse_key("Ctrl+Nope"), None);
    }

    #[test]
    fn test_load_embedded_keybindings() {
        let config: KeybindingConfig = toml::from_str(DEFAULT_KEYBINDINGS).unwrap();
        for layer in config.layers.values() {
            for binding in &layer.bindings {
                assert!(parse_key(&binding.key).is_some(), "bad key {}", binding.key);
            }
        }
        let pane_keymaps = build_pane_keymaps(&config.layers);
        for pane in ["chains", "events", "live", "confirm", "help"] {
            assert!(pane_keymaps.contains_key(pane), "missing {}", pane);
        }
        assert!(!pane_keymaps.contains_key("text_edit"));
        let layers = build_layers(&config.layers);
        assert!(layers.iter().any(|l| l.name == "global"));
    }

    #[test]
    fn user_file_replaces_whole_layers() {
        use std::io::Write;
        use crate::ui::input::{InputEvent, Modifiers};

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[layers.live]\nbindings = [{{ key = \"x\", action = \"trigger\", description = \"Fire\" }}]"
        )
        .unwrap();

        let (_, keymaps) = load_keybindings_with(Some(file.path()));
        let live = &keymaps["live"];
        let x = InputEvent::new(KeyCode::Char('x'), Modifiers::default());
        let t = InputEvent::new(KeyCode::Char('t'), Modifiers::default());
        assert_eq!(live.lookup(&x), Some("trigger"));
        assert_eq!(live.lookup(&t), None);
        assert!(keymaps["chains"].lookup(&InputEvent::new(KeyCode::Char('a'), Modifiers::default())).is_some());
    }

    #[test]
    fn broken_user_file_is_ignored() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "layers = 3").unwrap();
        let (layers, keymaps) = load_keybindings_with(Some(file.path()));
        assert!(layers.iter().any(|l| l.name == "text_edit"));
        assert!(keymaps.contains_key("live"));
    }
}
