//! Auto-play sequencing.
//!
//! A run walks a queue of `(deck index, field)` pairs strictly in order:
//! speak, pause, bump familiarity, next. `stop()` raises a flag that the run
//! checks between items and asks the speech engine to abort the current
//! utterance. Cancellation is cooperative only.

use crate::familiarity::FamiliarityStore;
use crate::speech::{speak_item, SpeechEngine};
use crate::types::{Deck, DeckItem, Field, PlaybackOptions, SpeechParams};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Pause after each item at rate 1.0.
pub const BASE_PACING: Duration = Duration::from_millis(600);

/// Lowest rate used when computing the pause.
pub const MIN_PACING_RATE: f64 = 0.1;

/// Sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Playing,
    /// Stop requested; collapses to `Idle` once the run observes it.
    Stopping,
}

/// One unit of work in the playback queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueItem {
    pub index: usize,
    pub field: Field,
}

impl QueueItem {
    pub fn new(index: usize, field: Field) -> Self {
        Self { index, field }
    }
}

/// Item currently being spoken, published for row highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveItem {
    /// Position within the queue.
    pub position: usize,
    /// 1-based lap number.
    pub lap: usize,
    pub index: usize,
    pub field: Field,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackOutcome {
    /// Another run was active; nothing happened.
    AlreadyPlaying,
    /// The options and view produced no work; nothing happened.
    EmptyQueue,
    Finished { completed: usize, laps: usize },
    Cancelled { completed: usize, laps: usize },
}

/// Everything a run needs, captured when it starts.
#[derive(Debug, Clone)]
pub struct PlaybackJob {
    pub deck: Arc<Deck>,
    /// Display order the queue is built from.
    pub view: Vec<usize>,
    pub options: PlaybackOptions,
}

/// Build the queue for a view: per index, the word then the example, as enabled.
///
/// With `shuffle` the index order is a fresh uniform permutation; the
/// word/example pairing of each index stays together.
pub fn build_queue(view: &[usize], options: &PlaybackOptions) -> Vec<QueueItem> {
    build_queue_with_rng(view, options, &mut rand::thread_rng())
}

/// [`build_queue`] with a caller-supplied random source.
pub fn build_queue_with_rng<R: Rng + ?Sized>(
    view: &[usize],
    options: &PlaybackOptions,
    rng: &mut R,
) -> Vec<QueueItem> {
    let mut fields = Vec::with_capacity(2);
    if options.include_words {
        fields.push(Field::Word);
    }
    if options.include_examples {
        fields.push(Field::Example);
    }

    let mut order = view.to_vec();
    if options.shuffle {
        order.shuffle(rng);
    }

    order
        .into_iter()
        .flat_map(|index| fields.iter().map(move |&field| QueueItem::new(index, field)))
        .collect()
}

/// Pause between items; faster speech gets shorter pauses.
pub fn pacing_delay(rate: f64) -> Duration {
    let nanos = BASE_PACING.as_nanos() as f64 / rate.max(MIN_PACING_RATE);
    Duration::from_nanos(nanos.round() as u64)
}

struct SequencerInner {
    speech: Arc<dyn SpeechEngine>,
    familiarity: FamiliarityStore,
    state: Mutex<PlaybackState>,
    cancelled: AtomicBool,
    params: RwLock<SpeechParams>,
    active: watch::Sender<Option<ActiveItem>>,
}

/// Auto-play state machine.
///
/// Clone-able handle; clones share one state, so `stop()` may be called from
/// anywhere while a run is in progress.
#[derive(Clone)]
pub struct PlaybackSequencer {
    inner: Arc<SequencerInner>,
}

impl PlaybackSequencer {
    pub fn new(speech: Arc<dyn SpeechEngine>, familiarity: FamiliarityStore) -> Self {
        let (active, _) = watch::channel(None);
        Self {
            inner: Arc::new(SequencerInner {
                speech,
                familiarity,
                state: Mutex::new(PlaybackState::Idle),
                cancelled: AtomicBool::new(false),
                params: RwLock::new(SpeechParams::default()),
                active,
            }),
        }
    }

    pub fn state(&self) -> PlaybackState {
        *self.lock_state()
    }

    pub fn is_playing(&self) -> bool {
        self.state() != PlaybackState::Idle
    }

    /// Current speech parameters.
    pub fn speech_params(&self) -> SpeechParams {
        self.inner
            .params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace speech parameters. A running queue picks them up at its next item.
    pub fn set_speech_params(&self, params: SpeechParams) {
        *self
            .inner
            .params
            .write()
            .unwrap_or_else(PoisonError::into_inner) = params;
    }

    /// Receiver for the active item; `None` while idle.
    pub fn subscribe(&self) -> watch::Receiver<Option<ActiveItem>> {
        self.inner.active.subscribe()
    }

    pub fn active_item(&self) -> Option<ActiveItem> {
        *self.inner.active.borrow()
    }

    pub fn speech(&self) -> &Arc<dyn SpeechEngine> {
        &self.inner.speech
    }

    /// Spawn a run on the current tokio runtime.
    ///
    /// The sequencer leaves `Idle` before this returns, so a `stop()` issued
    /// right after is never lost.
    pub fn start(&self, job: PlaybackJob) -> JoinHandle<PlaybackOutcome> {
        let Some(guard) = self.begin() else {
            tracing::debug!("auto-play already running, ignoring start");
            return tokio::spawn(async { PlaybackOutcome::AlreadyPlaying });
        };
        let this = self.clone();
        tokio::spawn(async move { this.run(job, guard).await })
    }

    /// Run the queue to completion or cancellation.
    pub async fn play(&self, job: PlaybackJob) -> PlaybackOutcome {
        let Some(guard) = self.begin() else {
            tracing::debug!("auto-play already running, ignoring start");
            return PlaybackOutcome::AlreadyPlaying;
        };
        self.run(job, guard).await
    }

    async fn run(&self, job: PlaybackJob, _guard: RunGuard) -> PlaybackOutcome {
        let mut queue = build_queue(&job.view, &job.options);
        if queue.is_empty() {
            tracing::debug!("auto-play queue is empty");
            return PlaybackOutcome::EmptyQueue;
        }

        tracing::info!(
            deck = %job.deck.key,
            queue_len = queue.len(),
            looping = job.options.loop_playback,
            "auto-play started"
        );

        let mut completed = 0;
        let mut laps = 0;

        loop {
            laps += 1;

            for (position, &item) in queue.iter().enumerate() {
                if self.is_cancelled() {
                    return self.finish_cancelled(completed, laps);
                }
                let Some(row) = job.deck.get(item.index) else {
                    continue;
                };

                self.inner.active.send_replace(Some(ActiveItem {
                    position,
                    lap: laps,
                    index: item.index,
                    field: item.field,
                }));

                let params = self.speech_params();
                let finished = speak_item(
                    self.inner.speech.as_ref(),
                    row,
                    item.field,
                    &params,
                    job.options.include_translations,
                    || self.is_cancelled(),
                )
                .await;
                if !finished || self.is_cancelled() {
                    return self.finish_cancelled(completed, laps);
                }
                tokio::time::sleep(pacing_delay(self.speech_params().rate)).await;

                if self.is_cancelled() {
                    return self.finish_cancelled(completed, laps);
                }
                self.bump(&job.deck.key, row);
                completed += 1;
            }

            if self.is_cancelled() {
                return self.finish_cancelled(completed, laps);
            }
            if !job.options.loop_playback {
                break;
            }
            if job.options.shuffle && job.options.reshuffle_each_lap {
                queue = build_queue(&job.view, &job.options);
            }
        }

        tracing::info!(completed, laps, "auto-play finished");
        PlaybackOutcome::Finished { completed, laps }
    }

    /// Request cancellation. Returns whether a run was playing.
    pub fn stop(&self) -> bool {
        let mut state = self.lock_state();
        if *state != PlaybackState::Playing {
            return false;
        }
        *state = PlaybackState::Stopping;
        self.inner.cancelled.store(true, Ordering::SeqCst);
        drop(state);

        self.inner.speech.cancel();
        tracing::debug!("auto-play stop requested");
        true
    }

    /// Speak one cell outside the queue. A running auto-play is stopped
    /// first, then any current utterance is cut off. Familiarity is not
    /// touched.
    pub async fn speak_once(&self, item: &DeckItem, field: Field, include_translations: bool) {
        if !self.stop() {
            self.inner.speech.cancel();
        }
        let params = self.speech_params();
        speak_item(
            self.inner.speech.as_ref(),
            item,
            field,
            &params,
            include_translations,
            || false,
        )
        .await;
    }

    fn begin(&self) -> Option<RunGuard> {
        let mut state = self.lock_state();
        if *state != PlaybackState::Idle {
            return None;
        }
        *state = PlaybackState::Playing;
        self.inner.cancelled.store(false, Ordering::SeqCst);
        Some(RunGuard {
            inner: Arc::clone(&self.inner),
        })
    }

    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    fn finish_cancelled(&self, completed: usize, laps: usize) -> PlaybackOutcome {
        tracing::info!(completed, laps, "auto-play cancelled");
        PlaybackOutcome::Cancelled { completed, laps }
    }

    fn bump(&self, deck_key: &str, row: &DeckItem) {
        if let Err(e) = self
            .inner
            .familiarity
            .bump_autoplay(deck_key, row.id, row.familiarity_default)
        {
            tracing::warn!(item_id = row.id, error = %e, "failed to store familiarity bump");
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, PlaybackState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the sequencer to `Idle` when a run ends, including when its
/// future is dropped mid-flight.
struct RunGuard {
    inner: Arc<SequencerInner>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = PlaybackState::Idle;
        self.inner.cancelled.store(false, Ordering::SeqCst);
        self.inner.active.send_replace(None);
    }
}
