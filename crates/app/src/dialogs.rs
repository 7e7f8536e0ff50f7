use async_trait::async_trait;
use automaton_core::{APP_TITLE, CANCEL_LABEL, Choice, DISCARD_LABEL, Dialogs, DocumentFilter, Prompt};
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageDialogResult, MessageLevel};
use std::path::PathBuf;

/// Native dialogs through `rfd`.
#[derive(Debug, Default)]
pub struct NativeDialogs;

#[async_trait]
impl Dialogs for NativeDialogs {
    async fn confirm_discard(&self, prompt: Prompt) -> Choice {
        let result = AsyncMessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(APP_TITLE)
            .set_description(prompt.message())
            .set_buttons(MessageButtons::OkCancelCustom(
                DISCARD_LABEL.to_string(),
                CANCEL_LABEL.to_string(),
            ))
            .show()
            .await;
        choice_from(result)
    }

    async fn pick_open_path(&self, filter: &DocumentFilter) -> Option<PathBuf> {
        AsyncFileDialog::new()
            .set_title("Open")
            .add_filter(filter.name, filter.extensions)
            .pick_file()
            .await
            .map(|file| file.path().to_path_buf())
    }

    async fn pick_save_path(&self, filter: &DocumentFilter) -> Option<PathBuf> {
        AsyncFileDialog::new()
            .set_title("Save As")
            .add_filter(filter.name, filter.extensions)
            .save_file()
            .await
            .map(|file| file.path().to_path_buf())
    }

    async fn show_error(&self, message: &str) {
        AsyncMessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(APP_TITLE)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show()
            .await;
    }
}

/// Backends report custom buttons either by label or as plain ok/cancel.
fn choice_from(result: MessageDialogResult) -> Choice {
    match result {
        MessageDialogResult::Ok | MessageDialogResult::Yes => Choice::Discard,
        MessageDialogResult::Custom(label) if label == DISCARD_LABEL => Choice::Discard,
        _ => Choice::Cancel,
    }
}
