use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Control or Alt held: a command, not text
fn is_chord(key: &KeyEvent) -> bool {
    key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Expand a leading `~` to the home directory
fn expand_path(input: &str) -> PathBuf {
    let input = input.trim();
    if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if input == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(input)
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await?,
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    app.notice = None;

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
        InputMode::FilePath => handle_file_path_mode(app, key).await,
    }

    Ok(())
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down((app.chat_height / 2).max(1));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up((app.chat_height / 2).max(1));
        }

        // Compose
        KeyCode::Char('i') | KeyCode::Enter => {
            app.cursor = app.draft().chars().count();
            app.input_mode = InputMode::Editing;
        }

        // File selection and upload
        KeyCode::Char('o') => {
            app.file_path_input.clear();
            app.input_mode = InputMode::FilePath;
        }
        KeyCode::Char('u') => app.upload_file(),
        KeyCode::Char('x') => app.controller.clear_file(),

        KeyCode::Char('t') => app.toggle_theme(),

        // Code blocks
        KeyCode::Tab => app.select_next_block(),
        KeyCode::BackTab => app.select_prev_block(),
        KeyCode::Char('y') | KeyCode::Char('c') => app.copy_selected_block(),
        KeyCode::Esc => app.selected_block = None,

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::Char('g') => app.scroll_up(u16::MAX),
        KeyCode::Char('G') => app.follow = true,

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_draft();
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                let draft = &mut app.controller.input_mut().text;
                let byte_idx = char_to_byte_index(draft, app.cursor - 1);
                draft.remove(byte_idx);
                app.cursor -= 1;
            }
        }
        KeyCode::Delete => {
            let draft = &mut app.controller.input_mut().text;
            if app.cursor < draft.chars().count() {
                let byte_idx = char_to_byte_index(draft, app.cursor);
                draft.remove(byte_idx);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            app.cursor = (app.cursor + 1).min(app.draft().chars().count());
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.draft().chars().count();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.controller.input_mut().text.clear();
            app.cursor = 0;
        }
        KeyCode::Char(c) if !is_chord(&key) => {
            let draft = &mut app.controller.input_mut().text;
            let byte_idx = char_to_byte_index(draft, app.cursor);
            draft.insert(byte_idx, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

async fn handle_file_path_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.file_path_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let path = expand_path(&app.file_path_input);
            app.input_mode = InputMode::Normal;
            if path.as_os_str().is_empty() {
                return;
            }
            app.load_file(&path).await;
            app.file_path_input.clear();
        }
        KeyCode::Backspace => {
            app.file_path_input.pop();
        }
        KeyCode::Char(c) if !is_chord(&key) => {
            app.file_path_input.push(c);
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{reply, test_app};
    use crate::app::Notice;
    use bedrock_chat_core::{ChatMessage, CodeBlockId, DisplayMode, Entry};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[test]
    fn char_to_byte_index_handles_multibyte() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 10), 6);
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_any_mode() {
        let (mut app, _) = test_app();
        app.input_mode = InputMode::FilePath;
        handle_event(&mut app, ctrl('c')).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn editing_inserts_at_cursor() {
        let (mut app, _) = test_app();
        type_text(&mut app, "hllo").await;
        for _ in 0..3 {
            handle_event(&mut app, key(KeyCode::Left)).await.unwrap();
        }
        type_text(&mut app, "é").await;
        handle_event(&mut app, key(KeyCode::End)).await.unwrap();
        handle_event(&mut app, key(KeyCode::Backspace)).await.unwrap();

        assert_eq!(app.draft(), "héll");
        assert_eq!(app.cursor, 4);
    }

    #[tokio::test]
    async fn modified_keys_do_not_type() {
        let (mut app, _) = test_app();
        type_text(&mut app, "ok").await;
        handle_event(&mut app, ctrl('d')).await.unwrap();
        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT)))
            .await
            .unwrap();
        assert_eq!(app.draft(), "ok");
        assert_eq!(app.cursor, 2);

        app.input_mode = InputMode::FilePath;
        handle_event(&mut app, ctrl('d')).await.unwrap();
        assert_eq!(app.file_path_input, "");

        // Shift is still text
        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)))
            .await
            .unwrap();
        assert_eq!(app.file_path_input, "A");
    }

    #[tokio::test]
    async fn enter_on_empty_draft_sends_nothing() {
        let (mut app, _) = test_app();
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert!(app.controller.conversation().is_empty());
        assert!(!app.is_waiting());
    }

    #[tokio::test]
    async fn enter_sends_draft() {
        let (mut app, _) = test_app();
        type_text(&mut app, "hi").await;
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert_eq!(
            app.controller.conversation().entries(),
            &[Entry::Message(ChatMessage::user("hi"))]
        );
        assert!(app.is_waiting());
        assert_eq!(app.draft(), "");
    }

    #[tokio::test]
    async fn theme_toggles_in_normal_mode_only() {
        let (mut app, _) = test_app();
        type_text(&mut app, "t").await;
        assert_eq!(app.display_mode(), DisplayMode::Light);

        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();
        handle_event(&mut app, key(KeyCode::Char('t'))).await.unwrap();
        assert_eq!(app.display_mode(), DisplayMode::Dark);
        handle_event(&mut app, key(KeyCode::Char('t'))).await.unwrap();
        assert_eq!(app.display_mode(), DisplayMode::Light);
    }

    #[tokio::test]
    async fn file_prompt_loads_and_upload_rejects_text_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"plain").unwrap();
        let (mut app, _) = test_app();
        app.input_mode = InputMode::Normal;

        handle_event(&mut app, key(KeyCode::Char('o'))).await.unwrap();
        assert_eq!(app.input_mode, InputMode::FilePath);
        type_text(&mut app, &file.path().display().to_string()).await;
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.input_mode, InputMode::Normal);
        let selected = app.controller.input().file.as_ref().unwrap();
        assert_eq!(selected.mime, "text/plain");

        handle_event(&mut app, key(KeyCode::Char('u'))).await.unwrap();
        assert_eq!(
            app.notice,
            Some(Notice::error("Unsupported file type: text/plain"))
        );
        assert!(app.controller.conversation().is_empty());
        assert!(app.controller.input().file.is_some());

        handle_event(&mut app, key(KeyCode::Char('x'))).await.unwrap();
        assert!(app.controller.input().file.is_none());
    }

    #[tokio::test]
    async fn missing_file_raises_notice() {
        let (mut app, _) = test_app();
        app.input_mode = InputMode::FilePath;
        type_text(&mut app, "/definitely/not/here.png").await;
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert!(app.notice.as_ref().is_some_and(|notice| notice.is_error));
        assert!(app.controller.input().file.is_none());
    }

    #[tokio::test]
    async fn notice_clears_on_next_key() {
        let (mut app, _) = test_app();
        app.input_mode = InputMode::Normal;
        app.notice = Some(Notice::info("hello"));
        handle_event(&mut app, key(KeyCode::Char('j'))).await.unwrap();
        assert_eq!(app.notice, None);
    }

    #[tokio::test]
    async fn tab_then_y_copies_block() {
        let (mut app, clipboard) = test_app();
        type_text(&mut app, "code please").await;
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        reply(&mut app, "```rust\nfn main() {}\n```");
        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();

        handle_event(&mut app, key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.selected_block, Some(CodeBlockId { entry: 1, block: 0 }));
        handle_event(&mut app, key(KeyCode::Char('y'))).await.unwrap();

        assert_eq!(*clipboard.0.lock().unwrap(), vec!["fn main() {}".to_string()]);
    }

    #[test]
    fn expand_path_resolves_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/a.png"), home.join("a.png"));
        }
        assert_eq!(expand_path(" /tmp/a.png "), PathBuf::from("/tmp/a.png"));
    }
}
