use futures_util::FutureExt;
use lynk_chat_core::{BackendStatus, ChatController, ControllerEvent, Message, MessageLog};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;

pub struct App {
    pub should_quit: bool,

    // Chat log (only mutated from the event loop)
    pub log: MessageLog,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    pub controller: ChatController,

    // In-flight send/reset requests
    pub pending: Vec<JoinHandle<()>>,
    pub health_task: Option<JoinHandle<BackendStatus>>,
    pub backend_status: BackendStatus,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // One-line notice shown in the footer (clipboard results)
    pub notice: Option<String>,

    // Areas for mouse hit-testing (updated during render)
    pub log_area: Option<Rect>,
    pub send_button: Option<Rect>,
    pub reset_button: Option<Rect>,
}

impl App {
    pub fn new(controller: ChatController) -> Self {
        Self {
            should_quit: false,
            log: MessageLog::new(),
            input: String::new(),
            cursor: 0,
            controller,
            pending: Vec::new(),
            health_task: None,
            backend_status: BackendStatus::Unknown,
            animation_frame: 0,
            notice: None,
            log_area: None,
            send_button: None,
            reset_button: None,
        }
    }

    /// Post the greeting and probe the backend in the background
    pub fn start(&mut self) {
        self.controller.activate();
        self.health_task = Some(self.controller.check_health());
    }

    /// A message produced by the controller
    pub fn receive(&mut self, message: Message) {
        self.log.push(message);
    }

    pub fn fire(&mut self, event: ControllerEvent) {
        if let Some(handle) = self.controller.dispatch(event, &mut self.input) {
            self.pending.push(handle);
        }
        self.cursor = self.cursor.min(self.input.chars().count());
        self.notice = None;
    }

    pub fn is_waiting(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Tick animation frame and reap finished tasks (called by Tick event)
    pub fn tick(&mut self) {
        self.pending.retain(|handle| !handle.is_finished());

        if self.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        } else {
            self.animation_frame = 0;
        }

        if self.health_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.health_task.take() {
                self.backend_status = match task.now_or_never() {
                    Some(Ok(status)) => status,
                    _ => BackendStatus::Offline,
                };
            }
        }
    }

    pub fn scroll_page(&self) -> usize {
        self.log.viewport_height().max(1)
    }

    /// Copy the most recent YAML block to the system clipboard
    pub fn copy_latest_yaml(&mut self) {
        self.notice = Some(match self.log.latest_formatted() {
            None => "No YAML block yet".to_string(),
            Some(message) => match copy_to_clipboard(&message.text) {
                Ok(()) => "Copied YAML to clipboard".to_string(),
                Err(e) => {
                    tracing::warn!(error = %e, "clipboard copy failed");
                    "Clipboard unavailable".to_string()
                }
            },
        });
    }
}

fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    use std::io::Write;
    use std::process::{Command, Stdio};

    const CANDIDATES: &[(&str, &[&str])] = &[
        ("pbcopy", &[]),
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
    ];

    for (program, args) in CANDIDATES {
        let Ok(mut child) = Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        else {
            continue;
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        if child.wait()?.success() {
            return Ok(());
        }
    }

    Err(anyhow::anyhow!("no clipboard program found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lynk_chat_core::controller::GREETING;
    use lynk_chat_core::{HttpTransport, Sender};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = ChatController::new(
            Arc::new(tx),
            Arc::new(HttpTransport::new("http://127.0.0.1:9")),
        );
        (App::new(controller), rx)
    }

    #[tokio::test]
    async fn test_start_posts_greeting() {
        let (mut app, mut rx) = test_app();
        app.start();

        let greeting = rx.try_recv().unwrap();
        assert_eq!(greeting, Message::bot(GREETING));
        app.receive(greeting);
        assert_eq!(app.log.len(), 1);
        assert!(app.health_task.is_some());
    }

    #[tokio::test]
    async fn test_fire_send_clears_input_and_tracks_request() {
        let (mut app, mut rx) = test_app();
        app.input = "formula".to_string();
        app.cursor = 7;

        app.fire(ControllerEvent::Send);

        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
        assert_eq!(app.pending.len(), 1);
        let echoed = rx.try_recv().unwrap();
        assert_eq!(echoed.sender, Sender::User);
        assert_eq!(echoed.text, "formula");
    }

    #[tokio::test]
    async fn test_fire_blank_send_is_ignored() {
        let (mut app, mut rx) = test_app();
        app.input = "   ".to_string();
        app.cursor = 3;

        app.fire(ControllerEvent::EnterKey);

        assert!(app.pending.is_empty());
        assert_eq!(app.input, "   ");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_copy_without_yaml_sets_notice() {
        let (mut app, _rx) = test_app();
        app.receive(Message::bot("no yaml here"));
        app.copy_latest_yaml();
        assert_eq!(app.notice.as_deref(), Some("No YAML block yet"));
    }
}
