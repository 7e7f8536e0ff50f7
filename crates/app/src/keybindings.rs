use crate::app_menus::{MenuCommand, app_menus};

/// A parsed accelerator such as `CmdOrCtrl+Shift+S`.
///
/// `Cmd`, `Ctrl` and `CmdOrCtrl` all mean the platform's primary modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accelerator {
    primary: bool,
    shift: bool,
    alt: bool,
    key: String,
}

impl Accelerator {
    pub fn parse(text: &str) -> Option<Self> {
        let mut accelerator = Accelerator {
            primary: false,
            shift: false,
            alt: false,
            key: String::new(),
        };

        for part in text.split(['+', '-']).map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "" => return None,
                "cmd" | "command" | "ctrl" | "control" | "cmdorctrl" | "commandorcontrol" => {
                    accelerator.primary = true
                }
                "shift" => accelerator.shift = true,
                "alt" | "option" => accelerator.alt = true,
                key => {
                    if !accelerator.key.is_empty() {
                        return None;
                    }
                    accelerator.key = key.to_string();
                }
            }
        }

        (!accelerator.key.is_empty()).then_some(accelerator)
    }
}

#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub accelerator: Accelerator,
    pub command: MenuCommand,
}

/// Every accelerator declared in the menu bar, hidden items included.
pub fn keybindings() -> Vec<KeyBinding> {
    app_menus()
        .into_iter()
        .flat_map(|menu| menu.items)
        .filter_map(|item| {
            let accelerator = Accelerator::parse(item.accelerator?)?;
            Some(KeyBinding {
                accelerator,
                command: item.command,
            })
        })
        .collect()
}

pub fn lookup(keys: &str) -> Option<MenuCommand> {
    let pressed = Accelerator::parse(keys)?;
    keybindings()
        .into_iter()
        .find(|binding| binding.accelerator == pressed)
        .map(|binding| binding.command)
}
