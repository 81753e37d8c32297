use super::chain::ChainController;
use super::constants::MIN_SEGMENT_VALUE;
use super::food::BonusSpawner;
use super::input::parse_direction;
use super::types::{ChainEvent, SegmentId};
use crate::config::EngineConfig;
use crate::protocol::{self, ClientMessage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// One chain shared by every session connected to the room.
#[derive(Debug)]
pub struct Room {
    state: Mutex<RoomState>,
    running: AtomicBool,
    fixed_tick: Duration,
    frame_tick: Duration,
}

#[derive(Debug)]
struct SessionEntry {
    sender: UnboundedSender<String>,
}

#[derive(Debug)]
struct RoomState {
    sessions: HashMap<String, SessionEntry>,
    chain: ChainController,
    spawner: BonusSpawner,
    events: UnboundedReceiver<ChainEvent>,
    rng: StdRng,
    fixed_dt: f64,
    score: i64,
    head: Option<SegmentId>,
}

#[derive(Debug, Clone, Copy)]
pub struct RoomStats {
    pub sessions: usize,
    pub segments: usize,
    pub score: i64,
    pub head: Option<SegmentId>,
    pub bonus: usize,
    pub merging: bool,
    pub path_points: usize,
}

impl Room {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            fixed_tick: Duration::from_millis(config.fixed_tick_ms),
            frame_tick: Duration::from_millis(config.frame_tick_ms),
            state: Mutex::new(RoomState::new(config, StdRng::from_entropy())),
            running: AtomicBool::new(false),
        }
    }

    pub async fn add_session(self: &Arc<Self>, sender: UnboundedSender<String>) -> String {
        let session_id = Uuid::new_v4().to_string();
        {
            let mut state = self.state.lock().await;
            state
                .sessions
                .insert(session_id.clone(), SessionEntry { sender });
        }
        self.ensure_loop();
        session_id
    }

    pub async fn remove_session(&self, session_id: &str) {
        let mut state = self.state.lock().await;
        state.sessions.remove(session_id);
    }

    pub async fn handle_text_message(&self, text: &str) {
        let Some(message) = protocol::decode_client_message(text) else { return };
        let mut state = self.state.lock().await;
        state.handle_client_message(message);
    }

    pub async fn stats(&self) -> RoomStats {
        let state = self.state.lock().await;
        RoomStats {
            sessions: state.sessions.len(),
            segments: state.chain.segments().len(),
            score: state.score,
            head: state.head,
            bonus: state.chain.bonus_items().len(),
            merging: state.chain.is_merging(),
            path_points: state.chain.path().len(),
        }
    }

    fn ensure_loop(self: &Arc<Self>) {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let room = Arc::clone(self);
        tokio::spawn(async move {
            let mut fixed = tokio::time::interval(room.fixed_tick);
            let mut frame = tokio::time::interval(room.frame_tick);
            let mut last_frame = Instant::now();
            loop {
                tokio::select! {
                    _ = fixed.tick() => {
                        let mut state = room.state.lock().await;
                        if state.sessions.is_empty() {
                            room.running.store(false, Ordering::SeqCst);
                            break;
                        }
                        state.fixed_tick();
                    }
                    _ = frame.tick() => {
                        let now = Instant::now();
                        let dt = now.duration_since(last_frame).as_secs_f64();
                        last_frame = now;
                        let mut state = room.state.lock().await;
                        if state.sessions.is_empty() {
                            room.running.store(false, Ordering::SeqCst);
                            break;
                        }
                        state.frame_tick(dt);
                    }
                }
            }
            tracing::debug!("room loop stopped");
        });
    }
}

impl RoomState {
    fn new(config: EngineConfig, mut rng: StdRng) -> Self {
        let fixed_dt = config.fixed_dt();
        let spawner = BonusSpawner::new(config.bonus_spawn_interval);
        let mut chain = ChainController::new(config);
        let events = chain.subscribe();
        if let Err(error) = chain.spawn_segment(MIN_SEGMENT_VALUE) {
            tracing::warn!(%error, "initial segment spawn failed");
        }
        if let Err(error) = chain.spawn_bonus(&mut rng) {
            tracing::debug!(%error, "initial bonus spawn skipped");
        }
        let head = chain.head_id();
        Self {
            sessions: HashMap::new(),
            chain,
            spawner,
            events,
            rng,
            fixed_dt,
            score: 0,
            head,
        }
    }

    fn handle_client_message(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::Direction { axis } => {
                if let Some(direction) = parse_direction(axis) {
                    self.chain.set_direction(direction);
                }
            }
            ClientMessage::Spawn => {
                if let Err(error) = self.chain.spawn_segment(MIN_SEGMENT_VALUE) {
                    tracing::warn!(%error, "requested spawn failed");
                }
            }
        }
    }

    fn fixed_tick(&mut self) {
        self.chain.fixed_tick(self.fixed_dt);
    }

    fn frame_tick(&mut self, dt: f64) {
        self.chain.frame_tick(dt);
        self.spawner.tick(dt, &mut self.chain, &mut self.rng);
        let events = self.drain_events();
        self.broadcast_state(&events);
    }

    /// Folds pending chain notifications into score and head tracking.
    fn drain_events(&mut self) -> Vec<ChainEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            match event {
                ChainEvent::Merged { value } => self.score += value as i64,
                ChainEvent::HeadChanged { head } => self.head = head,
                ChainEvent::Absorbed { .. } => {}
            }
            drained.push(event);
        }
        drained
    }

    fn broadcast_state(&mut self, events: &[ChainEvent]) {
        if self.sessions.is_empty() {
            return;
        }
        let snapshot = self.chain.snapshot();
        let payload = protocol::encode_state(self.score, events, &snapshot);
        let mut stale = Vec::new();
        for (session_id, session) in &self.sessions {
            if session.sender.send(payload.clone()).is_err() {
                stale.push(session_id.clone());
            }
        }
        for session_id in stale {
            self.sessions.remove(&session_id);
        }
    }
}
