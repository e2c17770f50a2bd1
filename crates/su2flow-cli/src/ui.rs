use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use su2flow::engine::progress::{Progress, ProgressCallback};
use tokio::sync::{mpsc, watch};
use tracing::warn;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Owns the terminal while a command runs; workflow phases become spinners,
/// solver sequences become bars.
pub struct UiManager {
    mp: Arc<MultiProgress>,
    state: PhaseState,
    event_receiver: mpsc::Receiver<UiEvent>,
    shutdown_receiver: watch::Receiver<bool>,
    _sentinel_bar: ProgressBar,
}

#[derive(Default)]
struct PhaseState {
    active_bar: Option<ProgressBar>,
    phase: String,
    started: Option<Instant>,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, event_receiver) = mpsc::channel(1024);
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let mp = Arc::new(MultiProgress::new());
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let _sentinel_bar = mp.add(ProgressBar::hidden());
        let manager = Self {
            mp,
            state: PhaseState::default(),
            event_receiver,
            shutdown_receiver,
            _sentinel_bar,
        };

        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.event_receiver.recv() => {
                    self.handle_event(event);
                }
                result = self.shutdown_receiver.changed() => {
                    if result.is_err() || *self.shutdown_receiver.borrow() {
                        break;
                    }
                }
            }
        }
        // Events queued before shutdown still reach the terminal.
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
        if let Some(bar) = self.state.active_bar.take() {
            bar.finish_and_clear();
        }
        self._sentinel_bar.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(msg) => {
                self.mp.println(msg).ok();
            }
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                if let Some(bar) = self.state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let pb = self.mp.add(ProgressBar::new_spinner());
                pb.enable_steady_tick(Duration::from_millis(80));
                pb.set_style(Self::spinner_style());
                pb.set_message(name.clone());

                self.state.active_bar = Some(pb);
                self.state.phase = name;
                self.state.started = Some(Instant::now());
            }
            Progress::PhaseFinish => {
                if let Some(bar) = self.state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let elapsed = self
                    .state
                    .started
                    .take()
                    .map(|t| t.elapsed().as_secs_f64())
                    .unwrap_or_default();
                self.mp
                    .println(format!("✓ {} ({:.1}s)", self.state.phase, elapsed))
                    .ok();

                self.state.phase.clear();
            }
            Progress::TaskStart { total } => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.set_style(Self::bar_style());
                    bar.set_length(total);
                    bar.set_position(0);
                    bar.disable_steady_tick();
                }
            }
            Progress::TaskIncrement { amount } => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.inc(amount);
                }
            }
            Progress::TaskFinish => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.finish();
                }
            }
            Progress::StatusUpdate { text } => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.set_message(format!("{} [{}]", self.state.phase, text));
                }
            }
            Progress::Message(msg) => {
                self.mp.println(format!("  {}", msg)).ok();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} {elapsed:.dim}")
            .expect("Invalid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<45} [{bar:30.cyan/blue}] {pos}/{len} runs ({elapsed_s})")
            .expect("Invalid template")
            .with_key(
                "elapsed_s",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    write!(w, "{:.1}s", state.elapsed().as_secs_f64()).unwrap();
                },
            )
            .progress_chars("━╸ ")
    }
}

/// Bridges core progress callbacks onto the UI channel.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Failed to send progress update to UI channel: {}", e);
            }
        })
    }

    /// Prints a line above the active bars.
    pub fn println(&self, msg: impl Into<String>) {
        if let Err(e) = self.sender.try_send(UiEvent::Log(msg.into())) {
            warn!("Failed to send message to UI channel: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_manager() -> (UiManager, mpsc::Sender<UiEvent>) {
        let (manager, sender, _shutdown) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        (manager, sender)
    }

    fn start_phase(manager: &mut UiManager, name: &str) {
        manager.handle_event(UiEvent::Progress(Progress::phase(name)));
    }

    #[test]
    fn phase_start_creates_spinner_named_after_phase() {
        let (mut manager, _) = setup_manager();
        assert!(manager.state.active_bar.is_none());

        start_phase(&mut manager, "Direct Solution");

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Direct Solution");
        assert_eq!(manager.state.phase, "Direct Solution");
        assert!(manager.state.started.is_some());
    }

    #[test]
    fn next_phase_replaces_active_spinner() {
        let (mut manager, _) = setup_manager();
        start_phase(&mut manager, "Direct Solution");
        start_phase(&mut manager, "Adjoint Solution");

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Adjoint Solution");
        assert_eq!(manager.state.phase, "Adjoint Solution");
    }

    #[test]
    fn phase_finish_clears_state() {
        let (mut manager, _) = setup_manager();
        start_phase(&mut manager, "Gradient Projection");

        manager.handle_event(UiEvent::Progress(Progress::PhaseFinish));

        assert!(manager.state.active_bar.is_none());
        assert!(manager.state.phase.is_empty());
        assert!(manager.state.started.is_none());
    }

    #[test]
    fn solver_sequence_drives_bar_position() {
        let (mut manager, _) = setup_manager();
        start_phase(&mut manager, "Direct Solution");

        manager.handle_event(UiEvent::Progress(Progress::TaskStart { total: 3 }));
        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.length(), Some(3));
        assert_eq!(bar.position(), 0);

        manager.handle_event(UiEvent::Progress(Progress::TaskIncrement { amount: 2 }));
        assert_eq!(manager.state.active_bar.as_ref().unwrap().position(), 2);

        manager.handle_event(UiEvent::Progress(Progress::TaskFinish));
        assert!(manager.state.active_bar.as_ref().unwrap().is_finished());
    }

    #[test]
    fn status_update_names_running_tool() {
        let (mut manager, _) = setup_manager();
        start_phase(&mut manager, "Direct Solution");

        manager.handle_event(UiEvent::Progress(Progress::status("SU2_CFD")));

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Direct Solution [SU2_CFD]");
    }

    #[test]
    fn events_without_active_phase_are_ignored() {
        let (mut manager, _) = setup_manager();
        manager.handle_event(UiEvent::Progress(Progress::TaskIncrement { amount: 1 }));
        manager.handle_event(UiEvent::Progress(Progress::status("SU2_GPC")));
        manager.handle_event(UiEvent::Log("DRAG = 0.0213".to_string()));
        manager.handle_event(UiEvent::Progress(Progress::Message("note".to_string())));
        assert!(manager.state.active_bar.is_none());
    }

    #[tokio::test]
    async fn progress_handler_forwards_events_and_lines() {
        let (sender, mut receiver) = mpsc::channel(4);
        let handler = CliProgressHandler::new(sender);
        let callback = handler.get_callback();

        callback(Progress::phase("Mesh Generation"));
        handler.println("Wrote channel.su2");

        match receiver.recv().await.unwrap() {
            UiEvent::Progress(Progress::PhaseStart { name }) => {
                assert_eq!(name, "Mesh Generation")
            }
            other => panic!("Unexpected event: {:?}", other),
        }
        match receiver.recv().await.unwrap() {
            UiEvent::Log(line) => assert_eq!(line, "Wrote channel.su2"),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn manager_exits_on_shutdown_signal() {
        let (manager, sender, shutdown) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        let handle = tokio::spawn(manager.run());

        sender
            .send(UiEvent::Log("before shutdown".to_string()))
            .await
            .unwrap();
        shutdown.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
