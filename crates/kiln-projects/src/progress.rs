//! Animated progress indicator.
//!
//! One indicator instance drives one terminal line: while active it is the
//! only writer of that line, so callers must [`ProgressIndicator::stop`] it
//! before printing anything else. Frames and interval come from an
//! [`IndicatorStyle`] given at construction.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use console::Term;
use kiln_core::config::{IndicatorConfig, IndicatorStyleName};
use kiln_core::{Error, Result};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

const DOTS_FRAMES: &[&str] = &[
    "⢀⠀", "⡀⠀", "⠄⠀", "⢂⠀", "⡂⠀", "⠅⠀", "⢃⠀", "⡃⠀", "⠍⠀", "⢋⠀", "⡋⠀", "⠍⠁", "⢋⠁", "⡋⠁",
    "⠍⠉", "⠋⠉", "⠋⠉", "⠉⠙", "⠉⠙", "⠉⠩", "⠈⢙", "⠈⡙", "⢈⠩", "⡀⢙", "⠄⡙", "⢂⠩", "⡂⢘", "⠅⡘",
    "⢃⠨", "⡃⢐", "⠍⡐", "⢋⠠", "⡋⢀", "⠍⡁", "⢋⠁", "⡋⠁", "⠍⠉", "⠋⠉", "⠋⠉", "⠉⠙", "⠉⠙", "⠉⠩",
    "⠈⢙", "⠈⡙", "⠈⠩", "⠀⢙", "⠀⡙", "⠀⠩", "⠀⢘", "⠀⡘", "⠀⠨", "⠀⢐", "⠀⡐", "⠀⠠", "⠀⢀", "⠀⡀",
];

const LINE_FRAMES: &[&str] = &["-", "\\", "|", "/"];

/// Frame sequence and tick interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorStyle {
    frames: Vec<String>,
    interval: Duration,
}

impl IndicatorStyle {
    /// Fails when `frames` is empty or `interval` is zero.
    pub fn new(frames: Vec<String>, interval: Duration) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::invalid_config("indicator needs at least one frame"));
        }
        if interval.is_zero() {
            return Err(Error::invalid_config("indicator interval must be positive"));
        }
        Ok(Self { frames, interval })
    }

    /// Braille dots, 80ms
    pub fn dots() -> Self {
        Self::builtin(DOTS_FRAMES, 80)
    }

    /// Classic `-\|/` spinner, 100ms
    pub fn line() -> Self {
        Self::builtin(LINE_FRAMES, 100)
    }

    fn builtin(frames: &[&str], interval_ms: u64) -> Self {
        Self {
            frames: frames.iter().map(|f| f.to_string()).collect(),
            interval: Duration::from_millis(interval_ms),
        }
    }

    /// Resolve the configured style, applying frame and interval overrides
    pub fn from_config(config: &IndicatorConfig) -> Result<Self> {
        let base = match config.style {
            IndicatorStyleName::Dots => Self::dots(),
            IndicatorStyleName::Line => Self::line(),
        };
        let frames = config.frames.clone().unwrap_or(base.frames);
        let interval = config
            .interval_ms
            .map(Duration::from_millis)
            .unwrap_or(base.interval);
        Self::new(frames, interval)
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for IndicatorStyle {
    fn default() -> Self {
        Self::dots()
    }
}

/// Where the indicator draws. Write errors are ignored; a broken terminal
/// must not fail the pipeline.
pub trait Surface: Send + Sync + 'static {
    fn hide_cursor(&self);
    fn show_cursor(&self);
    /// Write `line` and return the cursor to column 0
    fn draw(&self, line: &str);
    /// Blank the current line
    fn clear(&self);
}

/// Terminal surface on stdout. Draws nothing when stdout is not a terminal
/// or when created with [`TermSurface::disabled`].
#[derive(Debug, Clone)]
pub struct TermSurface {
    term: Term,
    enabled: bool,
}

impl TermSurface {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
            enabled: true,
        }
    }

    /// A surface that never touches the terminal, for verbose or quiet runs
    /// where other output owns the screen.
    pub fn disabled() -> Self {
        Self {
            term: Term::stdout(),
            enabled: false,
        }
    }

    fn attended(&self) -> bool {
        self.enabled && self.term.features().is_attended()
    }
}

impl Default for TermSurface {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Surface for TermSurface {
    fn hide_cursor(&self) {
        if self.attended() {
            let _ = self.term.hide_cursor();
        }
    }

    fn show_cursor(&self) {
        if self.enabled {
            let _ = self.term.show_cursor();
        }
    }

    fn draw(&self, line: &str) {
        if self.attended() {
            let _ = self.term.write_str(&format!("{}\r", line));
        }
    }

    fn clear(&self) {
        if self.attended() {
            let _ = self.term.clear_line();
        }
    }
}

#[derive(Debug, Default)]
struct IndicatorState {
    current_index: usize,
    title: String,
    ticks: u64,
}

impl IndicatorState {
    /// Produce the line for the current frame and advance
    fn tick(&mut self, frames: &[String]) -> String {
        if self.current_index >= frames.len() {
            self.current_index = 0;
        }
        let frame = &frames[self.current_index];
        let line = format!("{} {} {}", frame, self.title, frame);
        self.current_index = (self.current_index + 1) % frames.len();
        self.ticks += 1;
        line
    }
}

/// Repeating frame animation on a single terminal line
pub struct ProgressIndicator<S: Surface> {
    style: Arc<IndicatorStyle>,
    surface: Arc<S>,
    state: Arc<Mutex<IndicatorState>>,
    timer: Option<JoinHandle<()>>,
}

impl<S: Surface> ProgressIndicator<S> {
    pub fn new(style: IndicatorStyle, surface: S) -> Self {
        Self {
            style: Arc::new(style),
            surface: Arc::new(surface),
            state: Arc::new(Mutex::new(IndicatorState::default())),
            timer: None,
        }
    }

    /// Start animating `title`. A running cycle is stopped first, so there is
    /// never more than one timer. Must be called within a tokio runtime.
    pub async fn start(&mut self, title: &str) {
        if self.is_active() {
            self.stop().await;
        }

        self.surface.hide_cursor();
        {
            let mut state = lock(&self.state);
            state.title = title.to_string();
            state.current_index = 0;
            state.ticks = 0;
        }
        trace!("Indicator started: {}", title);

        let style = Arc::clone(&self.style);
        let surface = Arc::clone(&self.surface);
        let state = Arc::clone(&self.state);
        self.timer = Some(tokio::spawn(async move {
            let period = style.interval;
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let line = lock(&state).tick(&style.frames);
                surface.draw(&line);
            }
        }));
    }

    /// Cancel the timer, blank the line and show the cursor. No-op when idle.
    pub async fn stop(&mut self) {
        let Some(timer) = self.timer.take() else {
            return;
        };
        timer.abort();
        // Wait until the task is gone so no late frame lands after this point.
        let _ = timer.await;

        lock(&self.state).title.clear();
        self.surface.clear();
        self.surface.show_cursor();
        trace!("Indicator stopped");
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Index of the frame the next tick will draw
    pub fn current_index(&self) -> usize {
        lock(&self.state).current_index
    }

    /// Ticks since the last `start`
    pub fn tick_count(&self) -> u64 {
        lock(&self.state).ticks
    }

    pub fn title(&self) -> String {
        lock(&self.state).title.clone()
    }

    pub fn style(&self) -> &IndicatorStyle {
        &self.style
    }
}

impl<S: Surface> Drop for ProgressIndicator<S> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            self.surface.clear();
            self.surface.show_cursor();
        }
    }
}

fn lock(state: &Mutex<IndicatorState>) -> MutexGuard<'_, IndicatorState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Hide,
        Show,
        Draw(String),
        Clear,
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Event>>>);

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.0.lock().unwrap().clone()
        }

        fn draws(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Draw(line) => Some(line),
                    _ => None,
                })
                .collect()
        }

        fn cursor_visible(&self) -> bool {
            self.events()
                .iter()
                .rev()
                .find_map(|e| match e {
                    Event::Hide => Some(false),
                    Event::Show => Some(true),
                    _ => None,
                })
                .unwrap_or(true)
        }
    }

    impl Surface for Recorder {
        fn hide_cursor(&self) {
            self.0.lock().unwrap().push(Event::Hide);
        }
        fn show_cursor(&self) {
            self.0.lock().unwrap().push(Event::Show);
        }
        fn draw(&self, line: &str) {
            self.0.lock().unwrap().push(Event::Draw(line.to_string()));
        }
        fn clear(&self) {
            self.0.lock().unwrap().push(Event::Clear);
        }
    }

    fn abc_style() -> IndicatorStyle {
        IndicatorStyle::new(
            vec!["a".into(), "b".into(), "c".into()],
            Duration::from_millis(10),
        )
        .unwrap()
    }

    #[test]
    fn test_style_rejects_empty_frames() {
        assert!(IndicatorStyle::new(vec![], Duration::from_millis(10)).is_err());
        assert!(IndicatorStyle::new(vec!["x".into()], Duration::ZERO).is_err());
    }

    #[test]
    fn test_builtin_styles() {
        assert_eq!(IndicatorStyle::dots().frames().len(), 56);
        assert_eq!(IndicatorStyle::dots().interval(), Duration::from_millis(80));
        assert_eq!(IndicatorStyle::line().frames().len(), 4);
    }

    #[test]
    fn test_from_config_overrides() {
        let config = IndicatorConfig {
            style: IndicatorStyleName::Line,
            frames: None,
            interval_ms: Some(25),
        };
        let style = IndicatorStyle::from_config(&config).unwrap();
        assert_eq!(style.frames().len(), 4);
        assert_eq!(style.interval(), Duration::from_millis(25));

        let config = IndicatorConfig {
            frames: Some(vec![".".into(), "o".into()]),
            ..Default::default()
        };
        let style = IndicatorStyle::from_config(&config).unwrap();
        assert_eq!(style.frames(), &[".".to_string(), "o".to_string()]);
        assert_eq!(style.interval(), Duration::from_millis(80));
    }

    #[test]
    fn test_tick_wraps_modulo_frame_count() {
        let frames: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        for m in 0..10u64 {
            let mut state = IndicatorState::default();
            for _ in 0..m {
                state.tick(&frames);
            }
            assert_eq!(state.current_index as u64, m % 3);
        }
    }

    #[test]
    fn test_tick_recovers_from_out_of_range_index() {
        let frames: Vec<String> = vec!["a".into(), "b".into()];
        let mut state = IndicatorState {
            current_index: 7,
            title: "t".into(),
            ticks: 0,
        };
        assert_eq!(state.tick(&frames), "a t a");
        assert_eq!(state.current_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_frame_title_frame() {
        let recorder = Recorder::default();
        let mut indicator = ProgressIndicator::new(abc_style(), recorder.clone());

        indicator.start("Downloading files...").await;
        time::sleep(Duration::from_millis(45)).await;
        indicator.stop().await;

        assert_eq!(
            recorder.draws(),
            vec![
                "a Downloading files... a",
                "b Downloading files... b",
                "c Downloading files... c",
                "a Downloading files... a",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_index_after_m_ticks() {
        let recorder = Recorder::default();
        let mut indicator = ProgressIndicator::new(abc_style(), recorder);

        indicator.start("x").await;
        time::sleep(Duration::from_millis(75)).await;
        assert_eq!(indicator.tick_count(), 7);
        assert_eq!(indicator.current_index(), 7 % 3);
        indicator.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_single_timer() {
        let recorder = Recorder::default();
        let mut indicator = ProgressIndicator::new(abc_style(), recorder.clone());

        indicator.start("first").await;
        time::sleep(Duration::from_millis(15)).await;
        indicator.start("second").await;
        time::sleep(Duration::from_millis(35)).await;
        indicator.stop().await;

        let draws = recorder.draws();
        assert_eq!(draws.len(), 4);
        assert_eq!(draws[0], "a first a");
        assert!(draws[1..].iter().all(|l| l.contains("second")));
        assert_eq!(draws[1], "a second a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_draws_after_stop() {
        let recorder = Recorder::default();
        let mut indicator = ProgressIndicator::new(abc_style(), recorder.clone());

        indicator.start("x").await;
        time::sleep(Duration::from_millis(25)).await;
        indicator.stop().await;
        let drawn = recorder.draws().len();

        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(recorder.draws().len(), drawn);
        assert!(!indicator.is_active());
        assert_eq!(indicator.title(), "");
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let recorder = Recorder::default();
        let mut indicator = ProgressIndicator::new(abc_style(), recorder.clone());

        indicator.stop().await;
        indicator.stop().await;
        assert!(recorder.events().is_empty());

        indicator.start("x").await;
        indicator.stop().await;
        indicator.stop().await;
        assert!(recorder.cursor_visible());
    }

    #[tokio::test]
    async fn test_stop_without_ticks_restores_cursor() {
        let recorder = Recorder::default();
        let mut indicator = ProgressIndicator::new(abc_style(), recorder.clone());

        indicator.start("x").await;
        assert!(!recorder.cursor_visible());
        indicator.stop().await;

        assert!(recorder.cursor_visible());
        assert!(recorder.draws().is_empty());
    }

    #[tokio::test]
    async fn test_drop_restores_cursor() {
        let recorder = Recorder::default();
        {
            let mut indicator = ProgressIndicator::new(abc_style(), recorder.clone());
            indicator.start("x").await;
        }
        assert!(recorder.cursor_visible());
    }
}
