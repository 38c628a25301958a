//! Room registry: session lookup, lifecycle, and the idle sweep.
//!
//! The registry owns every live `DuelSession` and the reverse index from
//! player to room. Both maps live under a single `RwLock` so they can
//! never disagree; each session sits behind its own `Mutex`, giving one
//! operation at a time exclusive access to a room without serializing
//! unrelated rooms.
//!
//! Lock order is registry, then session. The catalog is never called with
//! either lock held; a room evicted during a fetch surfaces as
//! `RoomNotFound` when the result is installed.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cards::{CardCatalog, CardInstance, InstanceId};
use crate::core::{DuelError, DuelRng, PlayerId, PlayerRole, Result, RoomId};
use crate::session::{BattleOutcome, DuelSession, Phase, SessionSnapshot};
use crate::zones::ZoneKind;

/// Rooms idle longer than this are evicted by `sweep_idle`.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Length of generated room tokens.
const ROOM_TOKEN_LEN: usize = 8;

/// Summary row for the room listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub players: Vec<PlayerId>,
    pub phase: Phase,
    pub current_turn: Option<PlayerRole>,
    pub turn_count: u32,
    pub finished: bool,
    pub created_at: DateTime<Utc>,
}

type SharedSession = Arc<Mutex<DuelSession>>;

#[derive(Default)]
struct RegistryInner {
    rooms: FxHashMap<RoomId, SharedSession>,
    players: FxHashMap<PlayerId, RoomId>,
}

/// Owner of all live duel rooms.
pub struct SessionRegistry {
    inner: RwLock<RegistryInner>,
    catalog: Arc<dyn CardCatalog>,
}

impl SessionRegistry {
    /// Create an empty registry backed by the given catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn CardCatalog>) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            catalog,
        }
    }

    // A poisoned lock means a panic mid-operation; the maps themselves
    // stay structurally valid, so we keep serving.
    fn read_inner(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_session(session: &SharedSession) -> MutexGuard<'_, DuelSession> {
        session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run an operation against a room with the session locked.
    ///
    /// The registry read guard is held until the session mutex is
    /// acquired: eviction takes the write lock, so it serializes fully
    /// with in-flight operations and a room can never be removed between
    /// lookup and lock. An operation arriving after eviction observes
    /// `RoomNotFound`.
    fn with_session<T>(
        &self,
        room_id: &RoomId,
        op: impl FnOnce(&mut DuelSession) -> Result<T>,
    ) -> Result<T> {
        let inner = self.read_inner();
        let session = inner
            .rooms
            .get(room_id)
            .cloned()
            .ok_or(DuelError::RoomNotFound)?;
        let mut guard = Self::lock_session(&session);
        drop(inner);
        op(&mut guard)
    }

    fn generate_room_id(inner: &RegistryInner) -> RoomId {
        loop {
            let token: String = Uuid::new_v4()
                .simple()
                .to_string()
                .chars()
                .take(ROOM_TOKEN_LEN)
                .collect();
            let candidate = RoomId::new(token);
            if !inner.rooms.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    // === Room lifecycle ===

    /// Open a new room with `player_id` seated as player one.
    pub fn create_room(&self, player_id: PlayerId) -> Result<(RoomId, SessionSnapshot)> {
        let mut inner = self.write_inner();
        if inner.players.contains_key(&player_id) {
            return Err(DuelError::AlreadyInRoom);
        }

        let room_id = Self::generate_room_id(&inner);
        let session = DuelSession::new(room_id.clone(), player_id.clone(), DuelRng::from_entropy());
        let snapshot = session.snapshot();

        inner
            .rooms
            .insert(room_id.clone(), Arc::new(Mutex::new(session)));
        inner.players.insert(player_id.clone(), room_id.clone());
        info!(room = %room_id, player = %player_id, "room created");
        Ok((room_id, snapshot))
    }

    /// Seat `player_id` as player two in an existing room.
    pub fn join_room(&self, room_id: &RoomId, player_id: PlayerId) -> Result<SessionSnapshot> {
        let mut inner = self.write_inner();
        if inner.players.contains_key(&player_id) {
            return Err(DuelError::AlreadyInRoom);
        }
        let session = inner
            .rooms
            .get(room_id)
            .cloned()
            .ok_or(DuelError::RoomNotFound)?;

        let mut guard = Self::lock_session(&session);
        guard.join(player_id.clone())?;
        inner.players.insert(player_id.clone(), room_id.clone());
        info!(room = %room_id, player = %player_id, "player joined");
        Ok(guard.snapshot())
    }

    /// Leave a room: forfeits a live duel and drops the room once empty.
    pub fn leave_room(&self, room_id: &RoomId, player_id: &PlayerId) -> Result<()> {
        let mut inner = self.write_inner();
        if !inner.rooms.contains_key(room_id) {
            return Err(DuelError::RoomNotFound);
        }
        match inner.players.get(player_id) {
            Some(mapped) if mapped == room_id => {
                inner.players.remove(player_id);
            }
            _ => return Err(DuelError::PlayerNotFound),
        }

        if let Some(session) = inner.rooms.get(room_id).cloned() {
            let mut guard = Self::lock_session(&session);
            // Session membership is a superset of the map; a missing
            // player here would mean the maps diverged.
            if let Err(err) = guard.forfeit(player_id) {
                warn!(room = %room_id, player = %player_id, %err, "forfeit on leave failed");
            }
        }

        let still_seated = inner.players.values().any(|r| r == room_id);
        if !still_seated {
            inner.rooms.remove(room_id);
            info!(room = %room_id, "room closed");
        }
        info!(room = %room_id, player = %player_id, "player left");
        Ok(())
    }

    /// Evict rooms idle past `timeout` as of `now`. Returns the count.
    pub fn sweep_idle(&self, now: Instant, timeout: Duration) -> usize {
        let mut inner = self.write_inner();
        let idle: Vec<RoomId> = inner
            .rooms
            .iter()
            .filter(|(_, session)| Self::lock_session(session).is_idle(now, timeout))
            .map(|(room_id, _)| room_id.clone())
            .collect();

        for room_id in &idle {
            inner.rooms.remove(room_id);
            inner.players.retain(|_, r| r != room_id);
            info!(room = %room_id, "idle room evicted");
        }
        idle.len()
    }

    /// Summary of every live room.
    #[must_use]
    pub fn list_rooms(&self) -> Vec<RoomInfo> {
        let inner = self.read_inner();
        let mut rooms: Vec<RoomInfo> = inner
            .rooms
            .values()
            .map(|session| {
                let guard = Self::lock_session(session);
                RoomInfo {
                    room_id: guard.room_id().clone(),
                    players: guard.player_ids(),
                    phase: guard.phase(),
                    current_turn: guard.current_turn(),
                    turn_count: guard.turn_count(),
                    finished: guard.winner().is_some(),
                    created_at: guard.created_at(),
                }
            })
            .collect();
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        rooms
    }

    /// Current view of a room. Counts as activity for the idle sweep.
    pub fn snapshot(&self, room_id: &RoomId) -> Result<SessionSnapshot> {
        self.with_session(room_id, |session| {
            session.touch();
            Ok(session.snapshot())
        })
    }

    // === Deck initialization ===

    /// Fetch a player's deck from the catalog and install it.
    ///
    /// The fetch runs without any lock held; if the room is evicted in the
    /// meantime the install fails with `RoomNotFound`.
    pub fn initialize_deck(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
    ) -> Result<SessionSnapshot> {
        // Reject unknown rooms and players before paying for a catalog
        // round trip.
        self.with_session(room_id, |session| {
            if session.role_of(player_id).is_none() {
                return Err(DuelError::PlayerNotFound);
            }
            Ok(())
        })?;

        let definitions = self.catalog.fetch_deck(player_id)?;
        let cards: Vec<CardInstance> = definitions.into_iter().map(CardInstance::fresh).collect();
        debug!(room = %room_id, player = %player_id, cards = cards.len(), "deck fetched");

        self.with_session(room_id, |session| {
            session.install_deck(player_id, cards)?;
            Ok(session.snapshot())
        })
    }

    /// Draw the opening hand.
    pub fn draw_initial_hand(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
    ) -> Result<SessionSnapshot> {
        self.with_session(room_id, |session| {
            session.draw_initial_hand(player_id)?;
            Ok(session.snapshot())
        })
    }

    // === Turn operations ===

    /// Draw one card. `None` inside the tuple signals deck-out.
    pub fn draw_card(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
    ) -> Result<(Option<InstanceId>, SessionSnapshot)> {
        self.with_session(room_id, |session| {
            let drawn = session.draw_card(player_id)?;
            Ok((drawn, session.snapshot()))
        })
    }

    /// Step the current player's phase.
    pub fn advance_phase(&self, room_id: &RoomId, player_id: &PlayerId) -> Result<Phase> {
        self.with_session(room_id, |session| session.advance_phase(player_id))
    }

    /// Pass the turn.
    pub fn end_turn(&self, room_id: &RoomId, player_id: &PlayerId) -> Result<SessionSnapshot> {
        self.with_session(room_id, |session| {
            session.end_turn(player_id)?;
            Ok(session.snapshot())
        })
    }

    // === Card operations ===

    /// Play a card from hand to its field.
    pub fn summon_card(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
        instance_id: &InstanceId,
    ) -> Result<SessionSnapshot> {
        self.with_session(room_id, |session| {
            session.summon_card(player_id, instance_id)?;
            Ok(session.snapshot())
        })
    }

    /// Tribute-summon a monster from hand.
    pub fn tribute_summon(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
        monster_id: &InstanceId,
        tribute_ids: &[InstanceId],
    ) -> Result<SessionSnapshot> {
        self.with_session(room_id, |session| {
            session.tribute_summon(player_id, monster_id, tribute_ids)?;
            Ok(session.snapshot())
        })
    }

    /// Move a fielded card to the graveyard.
    pub fn send_to_graveyard(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
        instance_id: &InstanceId,
        from_zone: ZoneKind,
    ) -> Result<SessionSnapshot> {
        self.with_session(room_id, |session| {
            session.send_to_graveyard(player_id, instance_id, from_zone)?;
            Ok(session.snapshot())
        })
    }

    /// Attack an opposing monster.
    pub fn attack(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
        attacker_id: &InstanceId,
        defender_id: &InstanceId,
    ) -> Result<(BattleOutcome, SessionSnapshot)> {
        self.with_session(room_id, |session| {
            let outcome = session.attack(player_id, attacker_id, defender_id)?;
            Ok((outcome, session.snapshot()))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use super::*;
    use crate::cards::{CardDefinition, CatalogId};

    struct StaticCatalog {
        deck_size: u32,
    }

    impl CardCatalog for StaticCatalog {
        fn fetch_deck(&self, _player: &PlayerId) -> Result<Vec<CardDefinition>> {
            Ok((0..self.deck_size)
                .map(|n| {
                    CardDefinition::monster(CatalogId::new(n), format!("M{n}"), 1000, 1000, 4)
                })
                .collect())
        }
    }

    struct DownCatalog;

    impl CardCatalog for DownCatalog {
        fn fetch_deck(&self, _player: &PlayerId) -> Result<Vec<CardDefinition>> {
            Err(DuelError::CatalogUnavailable("service down".into()))
        }
    }

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Arc::new(StaticCatalog { deck_size: 10 }))
    }

    fn alice() -> PlayerId {
        PlayerId::new("alice")
    }

    fn bob() -> PlayerId {
        PlayerId::new("bob")
    }

    #[test]
    fn test_create_room_generates_token() {
        let registry = registry();
        let (room_id, snapshot) = registry.create_room(alice()).unwrap();

        assert_eq!(room_id.as_str().len(), ROOM_TOKEN_LEN);
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.phase, Phase::Waiting);
    }

    #[test]
    fn test_create_room_while_seated_rejected() {
        let registry = registry();
        registry.create_room(alice()).unwrap();

        assert_eq!(registry.create_room(alice()), Err(DuelError::AlreadyInRoom));
    }

    #[test]
    fn test_join_room() {
        let registry = registry();
        let (room_id, _) = registry.create_room(alice()).unwrap();

        let snapshot = registry.join_room(&room_id, bob()).unwrap();
        assert_eq!(snapshot.players.len(), 2);

        assert_eq!(
            registry.join_room(&room_id, PlayerId::new("carol")),
            Err(DuelError::RoomFull)
        );
        assert_eq!(
            registry.join_room(&RoomId::new("missing"), PlayerId::new("carol")),
            Err(DuelError::RoomNotFound)
        );
    }

    #[test]
    fn test_join_while_seated_elsewhere_rejected() {
        let registry = registry();
        registry.create_room(alice()).unwrap();
        let (other, _) = registry.create_room(bob()).unwrap();

        assert_eq!(
            registry.join_room(&other, alice()),
            Err(DuelError::AlreadyInRoom)
        );
    }

    #[test]
    fn test_initialize_deck_starts_duel_when_both_ready() {
        let registry = registry();
        let (room_id, _) = registry.create_room(alice()).unwrap();
        registry.join_room(&room_id, bob()).unwrap();

        let snapshot = registry.initialize_deck(&room_id, &alice()).unwrap();
        assert_eq!(snapshot.phase, Phase::Waiting);
        assert!(snapshot.player(&alice()).unwrap().is_ready);
        assert_eq!(snapshot.player(&alice()).unwrap().deck_count, 10);

        let snapshot = registry.initialize_deck(&room_id, &bob()).unwrap();
        assert_eq!(snapshot.phase, Phase::Draw);
        assert_eq!(snapshot.turn_count, 1);
        assert!(snapshot.current_turn.is_some());
    }

    #[test]
    fn test_initialize_deck_catalog_down() {
        let registry = SessionRegistry::new(Arc::new(DownCatalog));
        let (room_id, _) = registry.create_room(alice()).unwrap();

        let err = registry.initialize_deck(&room_id, &alice()).unwrap_err();
        assert!(matches!(err, DuelError::CatalogUnavailable(_)));
        // The room survives a failed fetch.
        assert!(registry.snapshot(&room_id).is_ok());
    }

    /// Catalog that signals when a fetch starts and blocks until released,
    /// so a test can evict the room mid-fetch.
    struct GatedCatalog {
        started: mpsc::Sender<()>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl CardCatalog for GatedCatalog {
        fn fetch_deck(&self, _player: &PlayerId) -> Result<Vec<CardDefinition>> {
            let _ = self.started.send(());
            let release = self.release.lock().unwrap_or_else(|e| e.into_inner());
            let _ = release.recv();
            Ok(vec![CardDefinition::monster(
                CatalogId::new(1),
                "M1",
                1000,
                1000,
                4,
            )])
        }
    }

    #[test]
    fn test_room_evicted_during_fetch_is_room_not_found() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let registry = Arc::new(SessionRegistry::new(Arc::new(GatedCatalog {
            started: started_tx,
            release: Mutex::new(release_rx),
        })));
        let (room_id, _) = registry.create_room(alice()).unwrap();

        let worker = {
            let registry = Arc::clone(&registry);
            let room_id = room_id.clone();
            thread::spawn(move || registry.initialize_deck(&room_id, &alice()))
        };

        // The fetch is in flight with no lock held; pull the room out from
        // under it, then let it finish.
        started_rx.recv().unwrap();
        registry.leave_room(&room_id, &alice()).unwrap();
        release_tx.send(()).unwrap();

        assert_eq!(worker.join().unwrap(), Err(DuelError::RoomNotFound));
    }

    #[test]
    fn test_initialize_deck_unknown_player() {
        let registry = registry();
        let (room_id, _) = registry.create_room(alice()).unwrap();

        assert_eq!(
            registry.initialize_deck(&room_id, &bob()),
            Err(DuelError::PlayerNotFound)
        );
    }

    /// Both decks installed, duel started, with `alice` guaranteed on turn.
    fn started_room(registry: &SessionRegistry) -> RoomId {
        let (room_id, _) = registry.create_room(alice()).unwrap();
        registry.join_room(&room_id, bob()).unwrap();
        registry.initialize_deck(&room_id, &alice()).unwrap();
        let snapshot = registry.initialize_deck(&room_id, &bob()).unwrap();
        if !snapshot.player(&alice()).unwrap().is_my_turn {
            registry.end_turn(&room_id, &bob()).unwrap();
        }
        room_id
    }

    #[test]
    fn test_full_turn_through_registry() {
        let registry = registry();
        let room_id = started_room(&registry);

        registry.draw_initial_hand(&room_id, &alice()).unwrap();
        let (drawn, snapshot) = registry.draw_card(&room_id, &alice()).unwrap();
        let drawn = drawn.unwrap();
        assert_eq!(snapshot.phase, Phase::Main1);
        assert_eq!(snapshot.player(&alice()).unwrap().hand.len(), 6);

        let snapshot = registry.summon_card(&room_id, &alice(), &drawn).unwrap();
        assert_eq!(snapshot.player(&alice()).unwrap().monster_field.len(), 1);

        let snapshot = registry.end_turn(&room_id, &alice()).unwrap();
        assert!(snapshot.player(&bob()).unwrap().is_my_turn);
    }

    #[test]
    fn test_attack_through_registry() {
        let registry = registry();
        let room_id = started_room(&registry);

        let (a, _) = registry.draw_card(&room_id, &alice()).unwrap();
        let a = a.unwrap();
        registry.summon_card(&room_id, &alice(), &a).unwrap();
        registry.end_turn(&room_id, &alice()).unwrap();

        let (b, _) = registry.draw_card(&room_id, &bob()).unwrap();
        let b = b.unwrap();
        registry.summon_card(&room_id, &bob(), &b).unwrap();
        registry.end_turn(&room_id, &bob()).unwrap();
        registry.draw_card(&room_id, &alice()).unwrap();

        // Equal attack stats: mutual destruction, no damage.
        let (outcome, snapshot) = registry.attack(&room_id, &alice(), &a, &b).unwrap();
        assert!(outcome.tie);
        assert_eq!(snapshot.player(&alice()).unwrap().life_points, 8000);
        assert_eq!(snapshot.player(&bob()).unwrap().graveyard.len(), 1);
    }

    #[test]
    fn test_leave_room_forfeits_then_closes() {
        let registry = registry();
        let room_id = started_room(&registry);

        registry.leave_room(&room_id, &bob()).unwrap();
        let snapshot = registry.snapshot(&room_id).unwrap();
        assert_eq!(snapshot.winner, Some(PlayerRole::Player1));

        // Bob is free to start a new room immediately.
        registry.create_room(bob()).unwrap();

        registry.leave_room(&room_id, &alice()).unwrap();
        assert_eq!(registry.snapshot(&room_id), Err(DuelError::RoomNotFound));
        assert_eq!(
            registry.leave_room(&room_id, &alice()),
            Err(DuelError::RoomNotFound)
        );
    }

    #[test]
    fn test_sweep_idle_evicts_and_frees_players() {
        let registry = registry();
        let room_id = started_room(&registry);
        let timeout = Duration::from_secs(60);

        assert_eq!(registry.sweep_idle(Instant::now(), timeout), 0);

        let later = Instant::now() + Duration::from_secs(120);
        assert_eq!(registry.sweep_idle(later, timeout), 1);
        assert_eq!(registry.snapshot(&room_id), Err(DuelError::RoomNotFound));

        // Evicted players may create rooms again.
        registry.create_room(alice()).unwrap();
        registry.create_room(bob()).unwrap();
    }

    #[test]
    fn test_snapshot_counts_as_activity() {
        let registry = registry();
        let room_id = started_room(&registry);
        let timeout = Duration::from_secs(60);

        // A poll resets the idle clock relative to its own time; polling
        // now keeps the room alive for the next sweep at +30s.
        registry.snapshot(&room_id).unwrap();
        let soon = Instant::now() + Duration::from_secs(30);
        assert_eq!(registry.sweep_idle(soon, timeout), 0);
        assert!(registry.snapshot(&room_id).is_ok());
    }

    #[test]
    fn test_list_rooms() {
        let registry = registry();
        assert!(registry.list_rooms().is_empty());

        let (room_id, _) = registry.create_room(alice()).unwrap();
        registry.join_room(&room_id, bob()).unwrap();

        let rooms = registry.list_rooms();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room_id, room_id);
        assert_eq!(rooms[0].players, vec![alice(), bob()]);
        assert_eq!(rooms[0].phase, Phase::Waiting);
        assert!(!rooms[0].finished);
    }

    #[test]
    fn test_operations_on_missing_room() {
        let registry = registry();
        let missing = RoomId::new("missing");

        assert_eq!(registry.snapshot(&missing), Err(DuelError::RoomNotFound));
        assert_eq!(
            registry.end_turn(&missing, &alice()),
            Err(DuelError::RoomNotFound)
        );
        assert_eq!(
            registry.draw_card(&missing, &alice()),
            Err(DuelError::RoomNotFound)
        );
    }
}
