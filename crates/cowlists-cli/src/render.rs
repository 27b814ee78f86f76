//! Render - ダイアログキーの英語の言い回し

use cowlists_core::domain::{Dialog, DialogKey, Reply, Speech};

fn template(key: DialogKey) -> &'static str {
    match key {
        DialogKey::ConfigNotFound => {
            "I can't find the API key and shared secret. Please add them to the configuration."
        }
        DialogKey::InAuthentication => {
            "Authentication is in progress. Open the link I sent you, then ask me to get a token."
        }
        DialogKey::NotAuthenticated => {
            "I'm not authenticated with Remember The Milk yet. Ask me to authenticate first."
        }
        DialogKey::RestResponseError => "Remember The Milk reported error {errorCode}: {errorText}",
        DialogKey::AddTaskToList => "Added {taskName} to your {listName} list.",
        DialogKey::AddTaskToListUndo => "Removed {taskName} from your {listName} list again.",
        DialogKey::AddTaskToListMismatch => {
            "I couldn't find a list called {listName}. Did you mean {bestMatch}?"
        }
        DialogKey::TokenValid => "You are already authenticated.",
        DialogKey::EmailSent => "I've sent you an authentication link.",
        DialogKey::AuthenticateBeforeToken => {
            "There is no authentication in progress. Ask me to authenticate first."
        }
        DialogKey::GotToken => "Got it. I'm now connected to Remember The Milk.",
        DialogKey::ReadList => "Your {listName} list has {nofTask} tasks.",
        DialogKey::ReadListOneItem => "Your {listName} list has one task.",
        DialogKey::GeneralError => "Something went wrong in the {functionName}, at line {lineNumber}.",
        DialogKey::NoConfirm => "Okay, I won't add it.",
    }
}

/// `{name}` のプレースホルダをダイアログのパラメータで埋める。
/// 知らないプレースホルダはそのまま残す
pub fn render_dialog(dialog: &Dialog) -> String {
    let mut text = template(dialog.key).to_string();
    for (name, value) in &dialog.params {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    text
}

/// 読み上げ項目ごとに 1 行
pub fn render_reply(reply: &Reply) -> Vec<String> {
    reply
        .speech
        .iter()
        .map(|speech| match speech {
            Speech::Dialog(dialog) => render_dialog(dialog),
            Speech::Text(text) => text.clone(),
        })
        .collect()
}
