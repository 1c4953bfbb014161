//! Single-writer actor that owns a [`Simulation`] on a dedicated thread.
//!
//! Callers on any thread submit requests over a channel and block on a
//! per-request reply channel. Between requests the actor advances the match
//! on a fixed real-time interval, passing the measured elapsed time as `dt`.

use std::{
    io,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam_channel::{bounded, select, tick, unbounded, Receiver, Sender};
use glam::Vec2;
use thiserror::Error;
use tracing::{debug, info, warn};
use wave_defence_core::{
    EnemySnapshot, PlayerId, PlayerSnapshot, TowerId, TowerSnapshot, WaveSnapshot,
};

use crate::Simulation;

/// Failures talking to a [`SimulationHost`].
#[derive(Debug, Error)]
pub enum HostError {
    /// The actor thread could not be started.
    #[error("failed to spawn simulation thread")]
    Spawn(#[source] io::Error),
    /// The actor thread is gone, either shut down or panicked.
    #[error("simulation host is no longer running")]
    Stopped,
    /// The actor thread panicked before it could hand the simulation back.
    #[error("simulation thread panicked")]
    Panicked,
}

type Job = Box<dyn FnOnce(&mut Simulation) + Send>;

enum Request {
    Run(Job),
    Shutdown,
}

/// Handle to a simulation running on its own thread.
#[derive(Debug)]
pub struct SimulationHost {
    requests: Sender<Request>,
    thread: Option<JoinHandle<Simulation>>,
}

impl SimulationHost {
    /// Moves `simulation` onto a new thread that ticks every `interval`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Spawn`] when the thread cannot be created.
    pub fn spawn(simulation: Simulation, interval: Duration) -> Result<Self, HostError> {
        let (requests, inbox) = unbounded();
        let thread = thread::Builder::new()
            .name("wave-defence-simulation".to_owned())
            .spawn(move || run(simulation, &inbox, interval))
            .map_err(HostError::Spawn)?;

        Ok(Self {
            requests,
            thread: Some(thread),
        })
    }

    /// Runs `job` against the simulation on the actor thread and returns its
    /// result.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn call<R, F>(&self, job: F) -> Result<R, HostError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Simulation) -> R + Send + 'static,
    {
        let (reply, response) = bounded(1);
        let job: Job = Box::new(move |simulation| {
            // The caller may have given up waiting.
            let _ = reply.send(job(simulation));
        });
        self.requests
            .send(Request::Run(job))
            .map_err(|_| HostError::Stopped)?;
        response.recv().map_err(|_| HostError::Stopped)
    }

    /// Opens an account for `player`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn setup_player(&self, player: PlayerId) -> Result<(), HostError> {
        self.call(move |simulation| simulation.setup_player(player))
    }

    /// Removes `player` and their towers.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn cleanup_player(&self, player: PlayerId) -> Result<(), HostError> {
        self.call(move |simulation| simulation.cleanup_player(player))
    }

    /// Places a tower, reporting whether it was built.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn place_tower(
        &self,
        player: PlayerId,
        archetype: &str,
        position: Vec2,
    ) -> Result<bool, HostError> {
        let archetype = archetype.to_owned();
        self.call(move |simulation| simulation.place_tower(player, &archetype, position))
    }

    /// Upgrades a tower, reporting whether it succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn upgrade_tower(&self, player: PlayerId, tower: TowerId) -> Result<bool, HostError> {
        self.call(move |simulation| simulation.upgrade_tower(player, tower))
    }

    /// Removes a tower, reporting whether it succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn remove_tower(&self, player: PlayerId, tower: TowerId) -> Result<bool, HostError> {
        self.call(move |simulation| simulation.remove_tower(player, tower))
    }

    /// Starts the wave director; `false` when it was already running.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn start_waves(&self) -> Result<bool, HostError> {
        self.call(Simulation::start_waves)
    }

    /// Stops the wave director.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn stop_waves(&self) -> Result<(), HostError> {
        self.call(Simulation::stop_waves)
    }

    /// Captures the state of `player`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn player_data(&self, player: PlayerId) -> Result<Option<PlayerSnapshot>, HostError> {
        self.call(move |simulation| simulation.player_data(player))
    }

    /// Captures every live enemy.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn enemies(&self) -> Result<Vec<EnemySnapshot>, HostError> {
        self.call(|simulation| simulation.enemies())
    }

    /// Captures every tower.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn towers(&self) -> Result<Vec<TowerSnapshot>, HostError> {
        self.call(|simulation| simulation.towers())
    }

    /// Captures the wave sequencing state.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] when the actor is no longer running.
    pub fn wave(&self) -> Result<WaveSnapshot, HostError> {
        self.call(|simulation| simulation.wave())
    }

    /// Stops the actor and hands the simulation back.
    ///
    /// The wave director is stopped before the thread exits, so no spawn or
    /// wave timer outlives the host.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Panicked`] when the actor thread panicked.
    pub fn shutdown(mut self) -> Result<Simulation, HostError> {
        let thread = self.thread.take().ok_or(HostError::Stopped)?;
        let _ = self.requests.send(Request::Shutdown);
        thread.join().map_err(|_| HostError::Panicked)
    }
}

impl Drop for SimulationHost {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.requests.send(Request::Shutdown);
            if thread.join().is_err() {
                warn!("simulation thread panicked during shutdown");
            }
        }
    }
}

fn run(mut simulation: Simulation, inbox: &Receiver<Request>, interval: Duration) -> Simulation {
    info!(?interval, "simulation host started");
    let ticker = tick(interval);
    let mut last_tick = Instant::now();

    loop {
        select! {
            recv(inbox) -> request => match request {
                Ok(Request::Run(job)) => job(&mut simulation),
                Ok(Request::Shutdown) | Err(_) => break,
            },
            recv(ticker) -> instant => {
                let now = instant.unwrap_or_else(|_| Instant::now());
                simulation.tick(now.saturating_duration_since(last_tick));
                last_tick = now;
            }
        }
    }

    simulation.stop_waves();
    debug!(clock = ?simulation.clock(), "simulation host stopped");
    simulation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchConfig;

    fn host() -> SimulationHost {
        let simulation =
            Simulation::new(&MatchConfig::default()).expect("builtin config is valid");
        SimulationHost::spawn(simulation, Duration::from_millis(5)).expect("thread spawns")
    }

    #[test]
    fn requests_are_served_between_ticks() {
        let host = host();
        let player = PlayerId::new(1);
        host.setup_player(player).expect("host running");

        assert!(host
            .place_tower(player, "Basic", Vec2::new(10.0, 5.0))
            .expect("host running"));
        let snapshot = host
            .player_data(player)
            .expect("host running")
            .expect("player exists");
        assert_eq!(snapshot.towers.len(), 1);
        assert_eq!(host.towers().expect("host running").len(), 1);
    }

    #[test]
    fn clock_advances_in_real_time() {
        let host = host();
        thread::sleep(Duration::from_millis(50));
        let clock = host.call(|simulation| simulation.clock()).expect("host running");
        assert!(clock > Duration::ZERO, "ticker advanced the clock");
    }

    #[test]
    fn shutdown_stops_waves_and_returns_the_simulation() {
        let host = host();
        assert!(host.start_waves().expect("host running"));
        assert!(!host.start_waves().expect("host running"));

        let simulation = host.shutdown().expect("clean shutdown");
        assert!(!simulation.waves_running());
        assert!(!simulation.wave().in_progress);
    }

    #[test]
    fn concurrent_callers_are_serialized() {
        let host = std::sync::Arc::new(host());
        let workers: Vec<_> = (1..=4)
            .map(|id| {
                let host = std::sync::Arc::clone(&host);
                thread::spawn(move || {
                    let player = PlayerId::new(id);
                    host.setup_player(player).expect("host running");
                    host.place_tower(player, "Basic", Vec2::new(10.0 * id as f32, 5.0))
                        .expect("host running")
                })
            })
            .collect();

        for worker in workers {
            assert!(worker.join().expect("worker finished"));
        }
        assert_eq!(host.towers().expect("host running").len(), 4);
    }
}
