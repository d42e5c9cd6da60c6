//! The match state machine and public engine API.
//!
//! A `GameMatch` owns the board, the players and the rules. Every mutating
//! method either succeeds completely or returns a `RuleError` and leaves
//! the match exactly as it was. Events are emitted with `tracing`; the
//! host decides where they go.

use tracing::{info, warn};

use crate::board::{Board, Coord, Player, PlayerId, StructureKind, Unit, UnitId, UnitKind};
use crate::error::RuleError;
use crate::resolve::{
    self, check_winner, next_seat, reset_acted, run_economy, AttackReport, EconomyReport, Outcome,
    Target, UpgradeReport,
};
use crate::rules::Rules;
use crate::setup::SetupError;

/// Lifecycle of a match. `GameOver` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Running,
    GameOver { winner: Option<PlayerId> },
}

impl GameState {
    pub const fn is_over(self) -> bool {
        matches!(self, GameState::GameOver { .. })
    }
}

/// A single command issued by the current player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move { from: Coord, to: Coord },
    Attack { from: Coord, target: Target },
    Build { kind: StructureKind, at: Coord },
    Upgrade { at: Coord },
    Train { kind: UnitKind },
    Deploy { unit: UnitId, at: Coord },
    Merge { a: Coord, b: Coord },
    EndTurn,
}

/// What a successful `apply` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Moved,
    Attacked(AttackReport),
    Built,
    Upgraded(UpgradeReport),
    Trained(UnitId),
    Deployed,
    Merged(Unit),
    TurnPassed(TurnReport),
}

/// The result of `next_turn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Player whose turn it now is.
    pub player: PlayerId,
    pub turn: u32,
    /// Economy of the incoming player.
    pub economy: EconomyReport,
}

/// A running or finished match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMatch {
    rules: Rules,
    board: Board,
    players: Vec<Player>,
    current: PlayerId,
    state: GameState,
    turn: u32,
    next_unit_id: u32,
}

impl GameMatch {
    /// Seats one player per name on `board` with the configured starting
    /// resources. Player 0 moves first. Barracks already on the board count
    /// toward their owner's unit space.
    pub fn new<S: Into<String>>(
        rules: Rules,
        board: Board,
        names: impl IntoIterator<Item = S>,
    ) -> Result<GameMatch, SetupError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(SetupError::NoPlayers);
        }
        if names.len() > usize::from(u8::MAX) {
            return Err(SetupError::TooManyPlayers(names.len()));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(SetupError::DuplicateName(name.clone()));
            }
        }

        let players = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let id = PlayerId(i as u8);
                let grants: u32 = board
                    .structures_owned_by(id)
                    .map(|(_, s)| s.unit_space_grant())
                    .sum();
                Player::new(
                    id,
                    name,
                    rules.starting_gold,
                    rules.starting_food,
                    rules.base_unit_space + grants,
                )
            })
            .collect();

        let next_unit_id = board.units().map(|(_, u)| u.id.0 + 1).max().unwrap_or(1);
        Ok(GameMatch {
            rules,
            board,
            players,
            current: PlayerId(0),
            state: GameState::Running,
            turn: 1,
            next_unit_id,
        })
    }

    /// Reassembles a match from already-validated parts.
    pub(crate) fn from_parts(
        rules: Rules,
        board: Board,
        players: Vec<Player>,
        current: PlayerId,
        state: GameState,
        turn: u32,
    ) -> GameMatch {
        let deployed = board.units().map(|(_, u)| u.id.0);
        let reserved = players.iter().flat_map(|p| p.reserve.iter().map(|u| u.id.0));
        let next_unit_id = deployed.chain(reserved).max().map_or(1, |m| m + 1);
        GameMatch {
            rules,
            board,
            players,
            current,
            state,
            turn,
            next_unit_id,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }

    /// Looks a player up by name.
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn current_player(&self) -> PlayerId {
        self.current
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Round counter, starting at 1 and advancing each time the seating
    /// order wraps around.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Unit space `player` currently occupies (deployed plus reserve).
    pub fn unit_space_used(&self, player: PlayerId) -> u32 {
        self.player(player)
            .map_or(0, |p| self.board.deployed_space(player) + p.reserve_space())
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    fn ensure_running(&self, op: &'static str) -> Result<(), RuleError> {
        if self.state.is_over() {
            return Err(self.rejected(op, RuleError::GameAlreadyOver));
        }
        Ok(())
    }

    fn rejected(&self, op: &'static str, err: RuleError) -> RuleError {
        warn!(player = %self.current, op, error = err.code(), "action rejected");
        err
    }

    /// Runs the win check and ends the match if it is decided.
    fn settle(&mut self) {
        let Some(outcome) = check_winner(&self.board, &mut self.players) else {
            return;
        };
        let winner = outcome.winner();
        if let Some(w) = winner {
            if let Some(p) = self.players.get_mut(w.index()) {
                p.wins += 1;
            }
        }
        self.state = GameState::GameOver { winner };
        match outcome {
            Outcome::Winner(w) => info!(winner = %w, turn = self.turn, "game over"),
            Outcome::NoWinner => info!(turn = self.turn, "game over without a winner"),
        }
    }

    /// Moves the unit at `from` to `to`.
    pub fn move_unit(&mut self, from: Coord, to: Coord) -> Result<(), RuleError> {
        self.ensure_running("move")?;
        resolve::move_unit(&mut self.board, self.current, from, to)
            .map_err(|e| self.rejected("move", e))?;
        info!(player = %self.current, x = from.x, y = from.y, to_x = to.x, to_y = to.y, "unit moved");
        Ok(())
    }

    /// Attacks `target` with the unit at `from`.
    pub fn attack(&mut self, from: Coord, target: Target) -> Result<AttackReport, RuleError> {
        self.ensure_running("attack")?;
        let report = resolve::attack(&mut self.board, &mut self.players, &self.rules, self.current, from, target)
            .map_err(|e| self.rejected("attack", e))?;
        let at = target.coord();
        info!(
            player = %self.current,
            x = at.x,
            y = at.y,
            damage = report.primary.damage,
            destroyed = report.primary.destroyed,
            splash = report.splash.len(),
            "attack resolved"
        );
        if report.town_hall_destroyed() {
            self.settle();
        }
        Ok(report)
    }

    /// Builds a structure of `kind` for `player` at `at`.
    pub fn build_structure(&mut self, player: PlayerId, kind: StructureKind, at: Coord) -> Result<(), RuleError> {
        self.ensure_running("build")?;
        resolve::build_structure(&mut self.board, &mut self.players, &self.rules, self.current, player, kind, at)
            .map_err(|e| self.rejected("build", e))?;
        info!(player = %player, kind = kind.name(), x = at.x, y = at.y, "structure built");
        Ok(())
    }

    /// Upgrades the current player's structure at `at`.
    pub fn upgrade_structure(&mut self, at: Coord) -> Result<UpgradeReport, RuleError> {
        self.ensure_running("upgrade")?;
        let report = resolve::upgrade_structure(&mut self.board, &mut self.players, self.current, at)
            .map_err(|e| self.rejected("upgrade", e))?;
        info!(
            player = %self.current,
            kind = report.kind.name(),
            x = at.x,
            y = at.y,
            level = report.level,
            "structure upgraded"
        );
        Ok(report)
    }

    /// Trains a unit into `player`'s reserve and returns its id.
    pub fn train_unit(&mut self, player: PlayerId, kind: UnitKind) -> Result<UnitId, RuleError> {
        self.ensure_running("train")?;
        let id = UnitId(self.next_unit_id);
        resolve::train_unit(&self.board, &mut self.players, &self.rules, self.current, player, kind, id)
            .map_err(|e| self.rejected("train", e))?;
        self.next_unit_id += 1;
        info!(player = %player, kind = kind.name(), unit = id.0, "unit trained");
        Ok(id)
    }

    /// Places reserve unit `unit` on the board at `at`.
    pub fn deploy_unit(&mut self, player: PlayerId, unit: UnitId, at: Coord) -> Result<(), RuleError> {
        self.ensure_running("deploy")?;
        resolve::deploy_unit(&mut self.board, &mut self.players, self.current, player, unit, at)
            .map_err(|e| self.rejected("deploy", e))?;
        info!(player = %player, unit = unit.0, x = at.x, y = at.y, "unit deployed");
        Ok(())
    }

    /// Merges the units at `a` and `b` into one unit of the next tier at `a`.
    pub fn merge_units(&mut self, a: Coord, b: Coord) -> Result<Unit, RuleError> {
        self.ensure_running("merge")?;
        let id = UnitId(self.next_unit_id);
        let merged = resolve::merge_units(&mut self.board, &self.players, &self.rules, self.current, a, b, id)
            .map_err(|e| self.rejected("merge", e))?;
        self.next_unit_id += 1;
        info!(player = %self.current, kind = merged.kind.name(), x = a.x, y = a.y, unit = id.0, "units merged");
        Ok(merged)
    }

    /// Ends the current player's turn.
    ///
    /// Clears every acted flag, seats the next player still in the game and
    /// runs their economy. A player who loses their last town hall to
    /// unpaid maintenance is eliminated and skipped.
    pub fn next_turn(&mut self) -> Result<TurnReport, RuleError> {
        self.ensure_running("next_turn")?;
        reset_acted(&mut self.board);

        let mut economy = EconomyReport::default();
        for _ in 0..self.players.len() {
            let (next, wrapped) = next_seat(&self.players, self.current);
            if wrapped {
                self.turn += 1;
            }
            self.current = next;
            economy = run_economy(&mut self.board, &mut self.players, next);
            if !economy.paid {
                warn!(
                    player = %next,
                    maintenance = economy.maintenance,
                    deficit = economy.deficit,
                    damage = economy.damage_per_structure,
                    "maintenance unpaid"
                );
            }
            if economy.town_hall_destroyed() {
                self.settle();
            }
            let eliminated = self.players.get(next.index()).is_some_and(|p| p.eliminated);
            if self.state.is_over() || !eliminated {
                break;
            }
        }

        info!(player = %self.current, turn = self.turn, gold = economy.income.gold, food = economy.income.food, "turn started");
        Ok(TurnReport {
            player: self.current,
            turn: self.turn,
            economy,
        })
    }

    /// Applies `action` on behalf of the current player.
    pub fn apply(&mut self, action: Action) -> Result<ActionOutcome, RuleError> {
        let me = self.current;
        match action {
            Action::Move { from, to } => self.move_unit(from, to).map(|()| ActionOutcome::Moved),
            Action::Attack { from, target } => self.attack(from, target).map(ActionOutcome::Attacked),
            Action::Build { kind, at } => self.build_structure(me, kind, at).map(|()| ActionOutcome::Built),
            Action::Upgrade { at } => self.upgrade_structure(at).map(ActionOutcome::Upgraded),
            Action::Train { kind } => self.train_unit(me, kind).map(ActionOutcome::Trained),
            Action::Deploy { unit, at } => self.deploy_unit(me, unit, at).map(|()| ActionOutcome::Deployed),
            Action::Merge { a, b } => self.merge_units(a, b).map(ActionOutcome::Merged),
            Action::EndTurn => self.next_turn().map(ActionOutcome::TurnPassed),
        }
    }
}
