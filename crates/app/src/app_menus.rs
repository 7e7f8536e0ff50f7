use serde::{Deserialize, Serialize};

/// Every command reachable from the menu bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuCommand {
    New,
    Open,
    Save,
    SaveAs,
    ReloadFxDefinitions,
    Close,
    Quit,
    Undo,
    Redo,
    OpenWebSocketServer,
    CloseWebSocketServer,
    About,
}

/// What triggering a menu command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Hand the named command to the editor.
    Forward(&'static str),
    /// Run the close protocol.
    CloseWindow,
    CloseListener,
}

impl MenuCommand {
    pub fn action(self) -> MenuAction {
        match self {
            MenuCommand::New => MenuAction::Forward("new"),
            MenuCommand::Open => MenuAction::Forward("open"),
            MenuCommand::Save => MenuAction::Forward("save"),
            MenuCommand::SaveAs => MenuAction::Forward("saveAs"),
            MenuCommand::ReloadFxDefinitions => MenuAction::Forward("reloadFxDefinitions"),
            MenuCommand::Undo => MenuAction::Forward("undo"),
            MenuCommand::Redo => MenuAction::Forward("redo"),
            MenuCommand::OpenWebSocketServer => MenuAction::Forward("showPortDialog"),
            MenuCommand::About => MenuAction::Forward("openAbout"),
            MenuCommand::Close | MenuCommand::Quit => MenuAction::CloseWindow,
            MenuCommand::CloseWebSocketServer => MenuAction::CloseListener,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub label: &'static str,
    pub command: MenuCommand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator: Option<&'static str>,
    /// Hidden items only exist for their accelerator.
    pub visible: bool,
}

impl MenuItem {
    fn action(label: &'static str, command: MenuCommand) -> Self {
        Self {
            label,
            command,
            accelerator: None,
            visible: true,
        }
    }

    fn accelerator(mut self, accelerator: &'static str) -> Self {
        self.accelerator = Some(accelerator);
        self
    }

    fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Menu {
    pub name: &'static str,
    pub items: Vec<MenuItem>,
}

pub fn app_menus() -> Vec<Menu> {
    vec![
        Menu {
            name: "File",
            items: vec![
                MenuItem::action("New", MenuCommand::New),
                MenuItem::action("Open", MenuCommand::Open),
                MenuItem::action("Save", MenuCommand::Save).accelerator("CmdOrCtrl+S"),
                MenuItem::action("Save As...", MenuCommand::SaveAs)
                    .accelerator("CmdOrCtrl+Shift+S"),
                MenuItem::action("Reload Fx Definitions", MenuCommand::ReloadFxDefinitions),
                MenuItem::action("Close", MenuCommand::Close).accelerator("CmdOrCtrl+W"),
                MenuItem::action("Quit", MenuCommand::Quit).accelerator("CmdOrCtrl+Q"),
            ],
        },
        Menu {
            name: "Edit",
            items: vec![
                MenuItem::action("Undo", MenuCommand::Undo).accelerator("CmdOrCtrl+Z"),
                MenuItem::action("Redo", MenuCommand::Redo).accelerator("CmdOrCtrl+Shift+Z"),
                MenuItem::action("Redo", MenuCommand::Redo)
                    .accelerator("CmdOrCtrl+Y")
                    .hidden(),
            ],
        },
        Menu {
            name: "Connect",
            items: vec![
                MenuItem::action("Open WebSocket Server", MenuCommand::OpenWebSocketServer),
                MenuItem::action("Close WebSocket Server", MenuCommand::CloseWebSocketServer),
            ],
        },
        Menu {
            name: "Help",
            items: vec![MenuItem::action("About", MenuCommand::About)],
        },
    ]
}
