use std::{
    collections::BTreeMap,
    mem,
    sync::Arc,
};

use anyhow::Result;
use clash_data::{
    Fraction,
    Id,
    Loader,
    MoveData,
    Stat,
    TypeChart,
};
use clash_prng::{
    PseudoRandomNumberGenerator,
    rand_util,
};
use hashbrown::HashMap;
use serde_string_enum::{
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
};

use crate::{
    battle::{
        Battler,
        BattlerHandle,
        Command,
        CommandRequest,
        FieldOptions,
        ForcedMove,
        MonsterId,
        MoveChoice,
        MoveEffect,
        Participant,
        RequestKind,
        Side,
        Spot,
        SpotId,
        SpeedOrderable,
        speed_sort,
    },
    common::OrderKeySequence,
    effect::{
        DamageOrderKeys,
        DamageStage,
        EffectLibrary,
        EffectRegistry,
        Subject,
        apply_effect,
        discard_effects,
        events,
        remove_effect,
        reparent_effect,
    },
    error::{
        WrapOptionError,
        WrapResultError,
        illegal_usage,
    },
    messages::{
        BattlerLabel,
        EventLog,
        Message,
    },
    mons::Monster,
};

/// The state of a [`Field`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum FieldState {
    /// Built, but no battler has been sent out.
    #[string = "new"]
    New,
    /// Waiting for commands for the next turn.
    #[string = "waiting"]
    Waiting,
    /// Waiting for mandatory replacements of fainted battlers.
    #[string = "waiting_replacements"]
    WaitingReplacements,
    /// Every command is in. The turn is ready to run.
    #[string = "processing"]
    Processing,
    #[string = "finished"]
    Finished,
}

type Observer = Box<dyn FnMut(&Message) + Send>;

/// A value ordered by speed alone.
struct BySpeed<T> {
    value: T,
    speed: i64,
}

impl<T> SpeedOrderable for BySpeed<T> {
    fn order(&self) -> u32 {
        0
    }

    fn priority(&self) -> i32 {
        0
    }

    fn speed(&self) -> i64 {
        self.speed
    }
}

/// A command with its sort key for the turn.
struct OrderedCommand {
    command: Command,
    priority: i32,
    speed: i64,
}

impl SpeedOrderable for OrderedCommand {
    fn order(&self) -> u32 {
        self.command.kind() as u32
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn speed(&self) -> i64 {
        self.speed
    }
}

/// The whole encounter.
///
/// The field is the root effect subject. It owns the sides, the trainers and their teams, every
/// battler ever sent out, the effect registry, the turn state, and the random number generator.
/// No state is shared between fields.
///
/// A battle is driven by [`Field::run`], which sends the first battlers out and then asks every
/// spot for a command. Trainers answer synchronously by returning a command from
/// [`Trainer::request_command`][`crate::trainer::Trainer::request_command`], or later through
/// [`Field::select_command`]. The turn runs once every outstanding request is answered.
pub struct Field {
    loader: Arc<dyn Loader>,
    library: Arc<dyn EffectLibrary>,
    prng: Box<dyn PseudoRandomNumberGenerator>,
    allow_run: bool,
    state: FieldState,
    turn: u64,

    sides: Vec<Side>,
    participants: Vec<Participant>,
    battlers: Vec<Battler>,

    effects: EffectRegistry,
    order_keys: OrderKeySequence,
    damage_order_keys: DamageOrderKeys,

    requests: BTreeMap<SpotId, CommandRequest>,
    commands: BTreeMap<SpotId, Command>,
    soliciting: bool,

    struggle: Arc<MoveData>,
    type_chart: Arc<TypeChart>,

    log: EventLog,
    observers: Vec<Observer>,
}

#[cfg(test)]
impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field").finish_non_exhaustive()
    }
}

impl Field {
    /// Creates a new field.
    ///
    /// `format` lists the trainers owning each spot, side by side. Every participant must own
    /// at least one spot, and all of a participant's spots must be on the same side.
    pub fn new(
        loader: Arc<dyn Loader>,
        library: Arc<dyn EffectLibrary>,
        format: &[Vec<usize>],
        mut participants: Vec<Participant>,
        options: FieldOptions,
    ) -> Result<Self> {
        if format.len() < 2 {
            return Err(illegal_usage("a battle needs at least two sides"));
        }
        let mut owner = vec![None; participants.len()];
        for (side, trainers) in format.iter().enumerate() {
            if trainers.is_empty() {
                return Err(illegal_usage(format!("side {side} has no spots")));
            }
            for trainer in trainers {
                match owner.get_mut(*trainer) {
                    None => {
                        return Err(illegal_usage(format!(
                            "side {side} references trainer {trainer}, which does not exist"
                        )));
                    }
                    Some(Some(other)) if *other != side => {
                        return Err(illegal_usage(format!(
                            "trainer {trainer} is on sides {other} and {side}"
                        )));
                    }
                    Some(owner) => *owner = Some(side),
                }
            }
        }
        for (trainer, participant) in participants.iter_mut().enumerate() {
            participant.side = owner[trainer]
                .wrap_expectation_with_format(format_args!("trainer {trainer} has no spot"))?;
        }

        let struggle = loader
            .load_struggle()
            .wrap_error_with_message("failed to load struggle")?;
        let type_chart = loader
            .type_chart()
            .wrap_error_with_message("failed to load type chart")?;
        let mut order_keys = OrderKeySequence::new();
        let damage_order_keys = DamageOrderKeys::new(&mut order_keys);

        let mut field = Self {
            loader,
            library,
            prng: (options.rng_factory)(options.seed),
            allow_run: options.allow_run,
            state: FieldState::New,
            turn: 0,
            sides: format
                .iter()
                .enumerate()
                .map(|(index, trainers)| Side::new(index, trainers))
                .collect(),
            participants,
            battlers: Vec::new(),
            effects: EffectRegistry::new(),
            order_keys,
            damage_order_keys,
            requests: BTreeMap::new(),
            commands: BTreeMap::new(),
            soliciting: false,
            struggle,
            type_chart,
            log: EventLog::new(),
            observers: Vec::new(),
        };

        for stage in DamageStage::all(&field.damage_order_keys) {
            apply_effect(&mut field, Subject::Field, Arc::new(stage), Subject::Field)?;
        }
        log::debug!(
            "created field with seed {} and {} sides",
            field.prng.initial_seed(),
            field.sides.len()
        );
        Ok(field)
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    /// The current turn. Zero before the first turn starts.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn allow_run(&self) -> bool {
        self.allow_run
    }

    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    pub fn side(&self, side: usize) -> Result<&Side> {
        self.sides
            .get(side)
            .wrap_expectation_with_format(format_args!("side {side} does not exist"))
    }

    pub fn spot(&self, spot: SpotId) -> Result<&Spot> {
        self.side(spot.side)?
            .spots()
            .get(spot.spot)
            .wrap_expectation_with_format(format_args!("spot {spot} does not exist"))
    }

    fn spot_mut(&mut self, spot: SpotId) -> Result<&mut Spot> {
        self.sides
            .get_mut(spot.side)
            .and_then(|side| side.spot_mut(spot.spot))
            .wrap_expectation_with_format(format_args!("spot {spot} does not exist"))
    }

    /// Every spot on the field, side by side.
    pub fn spot_ids(&self) -> Vec<SpotId> {
        self.sides
            .iter()
            .flat_map(|side| side.spots().iter().map(|spot| spot.id()))
            .collect()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, trainer: usize) -> Result<&Participant> {
        self.participants
            .get(trainer)
            .wrap_expectation_with_format(format_args!("trainer {trainer} does not exist"))
    }

    fn participant_mut(&mut self, trainer: usize) -> Result<&mut Participant> {
        self.participants
            .get_mut(trainer)
            .wrap_expectation_with_format(format_args!("trainer {trainer} does not exist"))
    }

    pub fn monster(&self, monster: MonsterId) -> Result<&Monster> {
        self.participants
            .get(monster.trainer)
            .and_then(|participant| participant.team.get(monster.index))
            .wrap_expectation_with_format(format_args!("monster {monster} does not exist"))
    }

    pub(crate) fn monster_mut(&mut self, monster: MonsterId) -> Result<&mut Monster> {
        self.participants
            .get_mut(monster.trainer)
            .and_then(|participant| participant.team.get_mut(monster.index))
            .wrap_expectation_with_format(format_args!("monster {monster} does not exist"))
    }

    pub fn battler(&self, battler: BattlerHandle) -> Result<&Battler> {
        self.battlers
            .get(battler.index())
            .wrap_expectation_with_format(format_args!(
                "battler {} does not exist",
                battler.index()
            ))
    }

    pub(crate) fn battler_mut(&mut self, battler: BattlerHandle) -> Result<&mut Battler> {
        self.battlers
            .get_mut(battler.index())
            .wrap_expectation_with_format(format_args!(
                "battler {} does not exist",
                battler.index()
            ))
    }

    /// The battler standing on a spot, fainted or not.
    pub fn battler_at(&self, spot: SpotId) -> Result<Option<BattlerHandle>> {
        Ok(self.spot(spot)?.battler())
    }

    pub fn battler_hp(&self, battler: BattlerHandle) -> Result<u16> {
        Ok(self.monster(self.battler(battler)?.monster())?.hp())
    }

    pub fn battler_fainted(&self, battler: BattlerHandle) -> Result<bool> {
        Ok(self.battler_hp(battler)? == 0)
    }

    pub fn battler_label(&self, battler: BattlerHandle) -> Result<BattlerLabel> {
        let context = self.battler(battler)?;
        let position = context.position();
        Ok(BattlerLabel {
            name: context.name().to_owned(),
            side: position.side,
            spot: position.spot,
        })
    }

    /// Is the battler on the field and able to fight?
    fn is_live(&self, battler: BattlerHandle) -> bool {
        self.battler(battler).is_ok_and(|context| context.is_active())
            && self.battler_fainted(battler).is_ok_and(|fainted| !fainted)
    }

    /// Battlers on the field that have not fainted, in spot order.
    pub fn active_battlers(&self) -> Vec<BattlerHandle> {
        self.sides
            .iter()
            .flat_map(|side| side.battlers())
            .filter(|battler| self.is_live(*battler))
            .collect()
    }

    /// Live battlers on the same side as the battler, excluding itself.
    pub fn allies(&self, battler: BattlerHandle) -> Result<Vec<BattlerHandle>> {
        let side = self.battler(battler)?.position().side;
        Ok(self
            .side(side)?
            .battlers()
            .filter(|other| *other != battler && self.is_live(*other))
            .collect())
    }

    /// Live battlers on every other side.
    pub fn opponents(&self, battler: BattlerHandle) -> Result<Vec<BattlerHandle>> {
        let side = self.battler(battler)?.position().side;
        Ok(self
            .sides
            .iter()
            .filter(|other| other.index() != side)
            .flat_map(|other| other.battlers())
            .filter(|other| self.is_live(*other))
            .collect())
    }

    pub fn is_monster_active(&self, monster: MonsterId) -> bool {
        self.sides
            .iter()
            .flat_map(|side| side.battlers())
            .filter_map(|battler| self.battler(battler).ok())
            .any(|context| context.monster() == monster)
    }

    /// Can the monster be sent out?
    pub fn is_monster_available(&self, monster: MonsterId) -> bool {
        self.monster(monster)
            .is_ok_and(|context| !context.fainted() && !self.is_monster_active(monster))
    }

    /// Team members of a trainer that can be sent out, in team order.
    pub fn available_monsters(&self, trainer: usize) -> Vec<MonsterId> {
        let team = self
            .participants
            .get(trainer)
            .map(|participant| participant.team.len())
            .unwrap_or_default();
        (0..team)
            .map(|index| MonsterId::new(trainer, index))
            .filter(|monster| self.is_monster_available(*monster))
            .collect()
    }

    pub fn loader(&self) -> &Arc<dyn Loader> {
        &self.loader
    }

    pub fn library(&self) -> Arc<dyn EffectLibrary> {
        self.library.clone()
    }

    pub fn type_chart(&self) -> &Arc<TypeChart> {
        &self.type_chart
    }

    /// The move used when no other move is legal.
    pub fn struggle(&self) -> &Arc<MoveData> {
        &self.struggle
    }

    /// The battle's random number generator.
    ///
    /// Every random draw must go through this generator, so that a battle replays exactly from
    /// its seed.
    pub fn prng(&mut self) -> &mut dyn PseudoRandomNumberGenerator {
        self.prng.as_mut()
    }

    /// Rolls an event with the given probability.
    ///
    /// A zero denominator is illegal usage. Chances above one always succeed.
    pub fn flip_coin(&mut self, chance: Fraction) -> Result<bool> {
        if chance.denominator() == 0 {
            return Err(illegal_usage(format!("chance {chance} has a zero denominator")));
        }
        Ok(rand_util::chance(
            self.prng.as_mut(),
            chance.numerator(),
            chance.denominator(),
        ))
    }

    /// The order key sequence shared by every handler on this field.
    pub fn order_keys_mut(&mut self) -> &mut OrderKeySequence {
        &mut self.order_keys
    }

    pub fn damage_order_keys(&self) -> &DamageOrderKeys {
        &self.damage_order_keys
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    pub(crate) fn effects_mut(&mut self) -> &mut EffectRegistry {
        &mut self.effects
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut EventLog {
        &mut self.log
    }

    /// Registers a callback that receives every message from now on.
    pub fn add_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&Message) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Emits a message to every observer and appends it to the log.
    pub fn send_message(&mut self, message: Message) {
        for observer in &mut self.observers {
            observer(&message);
        }
        self.log.push(message);
    }

    /// Requests that have not been answered.
    pub fn requests(&self) -> impl Iterator<Item = &CommandRequest> {
        self.requests.values()
    }

    pub fn request(&self, spot: SpotId) -> Option<&CommandRequest> {
        self.requests.get(&spot)
    }

    /// Commands selected so far for the coming turn.
    pub fn selected_commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Subjects nested directly inside a subject.
    ///
    /// The field contains its sides, and a side contains the battlers standing on its spots.
    pub fn sub_subjects(&self, subject: Subject) -> Vec<Subject> {
        match subject {
            Subject::Field => (0..self.sides.len()).map(Subject::Side).collect(),
            Subject::Side(side) => self
                .sides
                .get(side)
                .map(|side| side.battlers().map(Subject::Battler).collect())
                .unwrap_or_default(),
            Subject::Battler(_) => Vec::new(),
        }
    }

    pub fn check_subject(&self, subject: Subject) -> Result<()> {
        match subject {
            Subject::Field => Ok(()),
            Subject::Side(side) => self.side(side).map(|_| ()),
            Subject::Battler(battler) => self.battler(battler).map(|_| ()),
        }
    }

    /// Names a subject in messages.
    pub fn subject_label(&self, subject: Subject) -> Result<String> {
        match subject {
            Subject::Field => Ok("field".to_owned()),
            Subject::Side(side) => Ok(format!("side:{}", self.side(side)?.index())),
            Subject::Battler(battler) => Ok(self.battler_label(battler)?.to_string()),
        }
    }

    fn expect_state(&self, states: &[FieldState]) -> Result<()> {
        if states.contains(&self.state) {
            Ok(())
        } else {
            Err(illegal_usage(format!(
                "field is in state {:?}, expected one of {states:?}",
                self.state
            )))
        }
    }

    /// Checks if a command is legal right now.
    ///
    /// Legality depends on commands other spots have already selected this turn: a monster
    /// claimed by one switch cannot be claimed by another, and an item cannot be used more
    /// times than the bag holds.
    pub fn command_allowed(&mut self, command: &Command) -> Result<bool> {
        match command {
            Command::Move {
                battler, choice, ..
            } => {
                if self.battler_fainted(*battler)? {
                    return Ok(false);
                }
                let MoveChoice::Slot(slot) = choice else {
                    return Ok(true);
                };
                match self.battler(*battler)?.moves().get(*slot) {
                    Some(battle_move) if battle_move.pp > 0 => (),
                    _ => return Ok(false),
                }
                Ok(!events::prevent_move_selection(self, command)?)
            }
            Command::Switch { spot, replacement } => {
                if replacement.trainer != self.spot(*spot)?.trainer()
                    || !self.is_monster_available(*replacement)
                {
                    return Ok(false);
                }
                let claimed = self.commands.iter().any(|(other, selected)| {
                    other != spot
                        && matches!(
                            selected,
                            Command::Switch { replacement: claimed, .. } if claimed == replacement
                        )
                });
                if claimed {
                    return Ok(false);
                }
                let current = self.spot(*spot)?.battler();
                match current {
                    Some(battler) if !self.battler_fainted(battler)? => {
                        Ok(!events::prevent_switch(self, command)?)
                    }
                    _ => Ok(true),
                }
            }
            Command::Item { spot, item } => {
                let trainer = self.spot(*spot)?.trainer();
                let owned = self
                    .participant(trainer)?
                    .items()
                    .iter()
                    .filter(|owned| *owned == item)
                    .count();
                let mut claimed = 0;
                for (other, selected) in &self.commands {
                    if other == spot || self.spot(*other)?.trainer() != trainer {
                        continue;
                    }
                    if matches!(selected, Command::Item { item: selected, .. } if selected == item) {
                        claimed += 1;
                    }
                }
                Ok(claimed < owned
                    && self
                        .loader
                        .load_item(item)
                        .is_ok_and(|data| data.usable_in_battle))
            }
            Command::Run { .. } => Ok(self.allow_run),
        }
    }

    /// Starts the battle.
    ///
    /// Sends out the first available monster of each spot's trainer, fastest first, and asks for
    /// the first turn's commands.
    pub fn run(&mut self) -> Result<()> {
        self.expect_state(&[FieldState::New])?;
        self.send_message(Message::BattleStart);

        let mut released = Vec::new();
        for spot in self.spot_ids() {
            let trainer = self.spot(spot)?.trainer();
            if let Some(monster) = self.available_monsters(trainer).first() {
                released.push(self.release_monster(spot, *monster)?);
            }
        }
        let mut ordered = Vec::with_capacity(released.len());
        for battler in released {
            let speed = Battler::stat(self, battler, Stat::Spe)? as i64;
            ordered.push(BySpeed {
                value: battler,
                speed,
            });
        }
        speed_sort(&mut ordered, self.prng.as_mut());
        for battler in ordered {
            self.init_monster(battler.value)?;
        }

        if self.check_win()? {
            return Ok(());
        }
        self.state = FieldState::Waiting;
        self.ask_for_commands()?;
        self.command_loop()
    }

    /// Selects a command for a spot with an outstanding request.
    ///
    /// Once every request is answered, the turn runs before this returns, unless the command
    /// was selected from inside a trainer's [`request_command`].
    ///
    /// Selecting a command that was not requested, or that the request does not accept, is
    /// illegal usage.
    ///
    /// [`request_command`]: crate::trainer::Trainer::request_command
    pub fn select_command(&mut self, command: Command) -> Result<()> {
        self.expect_state(&[FieldState::Waiting, FieldState::WaitingReplacements])?;
        let spot = command.spot();
        let request = self
            .requests
            .get(&spot)
            .cloned()
            .wrap_expectation_with_format(format_args!("no command was requested for {spot}"))?;
        if !request.accepts(self, &command)? {
            return Err(illegal_usage(format!(
                "{command:?} is not a legal command for {spot}"
            )));
        }
        log::debug!("selected {command:?} for {spot}");
        self.requests.remove(&spot);
        self.commands.insert(spot, command);
        if self.requests.is_empty() && self.state == FieldState::Waiting {
            self.state = FieldState::Processing;
        }
        if !self.soliciting {
            self.command_loop()?;
        }
        Ok(())
    }

    fn command_loop(&mut self) -> Result<()> {
        while self.requests.is_empty() {
            match self.state {
                FieldState::New => {
                    return Err(illegal_usage("battle has not started"));
                }
                FieldState::Finished => break,
                FieldState::WaitingReplacements => self.process_replacements()?,
                FieldState::Waiting => self.state = FieldState::Processing,
                FieldState::Processing => self.handle_turn()?,
            }
        }
        Ok(())
    }

    fn ask_for_commands(&mut self) -> Result<()> {
        self.requests.clear();
        self.commands.clear();

        let mut reserved = HashMap::<usize, usize>::new();
        let mut replacements = Vec::new();
        let mut turns = Vec::new();
        for spot in self.spot_ids() {
            let (trainer, battler) = {
                let spot = self.spot(spot)?;
                (spot.trainer(), spot.battler())
            };
            match battler {
                Some(battler) if !self.battler_fainted(battler)? => {
                    turns.push(CommandRequest::new(
                        spot,
                        trainer,
                        Some(battler),
                        RequestKind::Turn,
                    ));
                }
                _ => {
                    let available = self.available_monsters(trainer).len();
                    let count = reserved.entry(trainer).or_default();
                    if available > *count {
                        *count += 1;
                        replacements.push(CommandRequest::new(
                            spot,
                            trainer,
                            battler,
                            RequestKind::Replacement,
                        ));
                    }
                }
            }
        }

        let requests = if replacements.is_empty() {
            self.state = FieldState::Waiting;
            turns
        } else {
            self.state = FieldState::WaitingReplacements;
            replacements
        };
        log::debug!("asking for {} commands in {:?}", requests.len(), self.state);
        self.requests = requests
            .into_iter()
            .map(|request| (request.spot(), request))
            .collect();
        self.solicit_commands()
    }

    fn solicit_commands(&mut self) -> Result<()> {
        self.soliciting = true;
        let result = self.solicit_each();
        self.soliciting = false;
        result?;
        if self.requests.is_empty() && self.state == FieldState::Waiting {
            self.state = FieldState::Processing;
        }
        Ok(())
    }

    fn solicit_each(&mut self) -> Result<()> {
        let requests = self.requests.values().cloned().collect::<Vec<_>>();
        for request in requests {
            if !self.requests.contains_key(&request.spot()) {
                continue;
            }
            let trainer = request.trainer();
            let mut controller = self
                .participant_mut(trainer)?
                .controller
                .take()
                .wrap_expectation_with_format(format_args!(
                    "trainer {trainer} is already deciding a command"
                ))?;
            let command = controller.request_command(self, &request);
            self.participant_mut(trainer)?.controller = Some(controller);
            if let Some(command) = command? {
                self.select_command(command)?;
            }
        }
        Ok(())
    }

    fn process_replacements(&mut self) -> Result<()> {
        self.expect_state(&[FieldState::WaitingReplacements])?;
        let commands = mem::take(&mut self.commands);
        let mut released = Vec::with_capacity(commands.len());
        for command in commands.into_values() {
            let Command::Switch { spot, replacement } = command else {
                continue;
            };
            self.withdraw(spot)?;
            released.push(self.release_monster(spot, replacement)?);
        }
        for battler in released {
            self.init_monster(battler)?;
        }
        if self.check_win()? {
            return Ok(());
        }
        self.state = FieldState::Waiting;
        self.ask_for_commands()
    }

    fn handle_turn(&mut self) -> Result<()> {
        self.expect_state(&[FieldState::Processing])?;
        self.turn += 1;
        let turn = self.turn;
        log::debug!("turn {turn} starts");

        self.apply_forced_moves()?;
        for battler in &mut self.battlers {
            battler.moves_used.clear();
        }
        self.send_message(Message::TurnStart { turn });
        events::begin_turn(self, turn)?;

        let commands = self.sort_commands()?;
        let mut move_effects = Vec::new();
        for command in &commands {
            if let Command::Move {
                spot,
                battler,
                choice,
                target,
            } = command
            {
                let mut move_effect = MoveEffect::new(self, *battler, *choice, *target)?;
                move_effect.begin_turn(self)?;
                move_effects.push((*spot, move_effect));
            }
        }

        let result = self.execute_commands(commands, &mut move_effects);
        for (_, move_effect) in &mut move_effects {
            move_effect.end_turn(self)?;
        }
        result?;
        if self.state == FieldState::Finished {
            return Ok(());
        }

        events::end_turn(self, turn)?;
        self.send_message(Message::TurnEnd { turn });
        if self.check_win()? {
            return Ok(());
        }
        self.state = FieldState::Waiting;
        self.ask_for_commands()
    }

    fn apply_forced_moves(&mut self) -> Result<()> {
        for spot in self.spot_ids() {
            let Some(battler) = self.spot(spot)?.battler() else {
                continue;
            };
            if self.battler_fainted(battler)? {
                continue;
            }
            if let Some(forced) = self.battler(battler)?.forced_move().cloned() {
                log::debug!("{spot} is forced to use {:?}", forced.choice);
                self.commands.insert(
                    spot,
                    Command::Move {
                        spot,
                        battler,
                        choice: forced.choice,
                        target: forced.target,
                    },
                );
            }
        }
        Ok(())
    }

    fn speed_of(&mut self, battler: BattlerHandle) -> Result<i64> {
        let speed = Battler::stat(self, battler, Stat::Spe)? as i64;
        let factor = events::speed_factor(self, battler, 1)?;
        Ok(speed.saturating_mul(factor))
    }

    /// Takes the selected commands in execution order.
    ///
    /// Runs go first, then items, then switches, then moves. Moves order by priority and then
    /// by speed, with ties broken randomly. Every other kind keeps spot order, side by side.
    fn sort_commands(&mut self) -> Result<Vec<Command>> {
        let commands = mem::take(&mut self.commands);
        let spots = self.spot_ids();
        let mut ordered = Vec::with_capacity(commands.len());
        for command in commands.into_values() {
            let priority = match &command {
                Command::Move {
                    battler,
                    choice: MoveChoice::Slot(slot),
                    ..
                } => self
                    .battler(*battler)?
                    .moves()
                    .get(*slot)
                    .map(|battle_move| battle_move.data.priority)
                    .unwrap_or_default(),
                Command::Move {
                    choice: MoveChoice::Struggle,
                    ..
                } => self.struggle.priority,
                _ => 0,
            };
            let speed = match &command {
                Command::Move { .. } => match self.spot(command.spot())?.battler() {
                    Some(battler) if !self.battler_fainted(battler)? => self.speed_of(battler)?,
                    _ => 0,
                },
                // Earlier spots sort as faster.
                _ => {
                    let position = spots
                        .iter()
                        .position(|spot| *spot == command.spot())
                        .wrap_expectation_with_format(format_args!(
                            "spot {} does not exist",
                            command.spot()
                        ))?;
                    -(position as i64)
                }
            };
            ordered.push(OrderedCommand {
                command,
                priority: priority as i32,
                speed,
            });
        }
        speed_sort(&mut ordered, self.prng.as_mut());
        log::trace!(
            "command order: {:?}",
            ordered
                .iter()
                .map(|ordered| &ordered.command)
                .collect::<Vec<_>>()
        );
        Ok(ordered.into_iter().map(|ordered| ordered.command).collect())
    }

    /// The battler that acts for a move command.
    ///
    /// The battler must still stand on the spot and be able to fight. A battler rebuilt for a
    /// new form still acts for its monster.
    fn acting_battler(
        &self,
        spot: SpotId,
        battler: BattlerHandle,
    ) -> Result<Option<BattlerHandle>> {
        let monster = self.battler(battler)?.monster();
        match self.spot(spot)?.battler() {
            Some(current)
                if self.battler(current)?.monster() == monster
                    && !self.battler_fainted(current)? =>
            {
                Ok(Some(current))
            }
            _ => Ok(None),
        }
    }

    fn execute_commands(
        &mut self,
        commands: Vec<Command>,
        move_effects: &mut [(SpotId, MoveEffect)],
    ) -> Result<()> {
        for command in commands {
            match command {
                Command::Move { spot, battler, .. } => {
                    let Some(actor) = self.acting_battler(spot, battler)? else {
                        continue;
                    };
                    if let Some((_, move_effect)) =
                        move_effects.iter_mut().find(|(owner, _)| *owner == spot)
                    {
                        move_effect.user = actor;
                        let used = move_effect.attempt_use(self)?;
                        log::debug!("{} used by {spot}: {:?}", move_effect.id, used.outcome);
                    }
                }
                Command::Switch { spot, replacement } => {
                    if self.is_monster_available(replacement) {
                        self.switch(spot, replacement)?;
                    }
                }
                Command::Item { spot, item } => self.use_item(spot, &item)?,
                Command::Run { spot } => self.forfeit(spot)?,
            }
            if self.check_win()? {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Checks if the battle is over, finishing it if so.
    ///
    /// A side is still in the battle if none of its trainers forfeited, and it has a battler
    /// on the field that can fight or a monster left to send out.
    pub fn check_win(&mut self) -> Result<bool> {
        if self.state == FieldState::Finished {
            return Ok(true);
        }
        let mut surviving = Vec::new();
        for side in &self.sides {
            let trainers = side.trainers();
            let forfeited = trainers.iter().any(|trainer| {
                self.participants
                    .get(*trainer)
                    .is_some_and(|participant| participant.forfeited())
            });
            if forfeited {
                continue;
            }
            let on_field = side.battlers().any(|battler| self.is_live(battler));
            let in_reserve = trainers
                .iter()
                .any(|trainer| !self.available_monsters(*trainer).is_empty());
            if on_field || in_reserve {
                surviving.push(side.index());
            }
        }
        let message = match surviving.as_slice() {
            [] => Message::Draw,
            [side] => Message::Victory { side: *side },
            _ => return Ok(false),
        };
        log::debug!("battle finished: {message:?}");
        self.state = FieldState::Finished;
        self.requests.clear();
        self.commands.clear();
        self.send_message(message);
        Ok(true)
    }

    /// Switches the battler on a spot out for another team member.
    pub fn switch(&mut self, spot: SpotId, replacement: MonsterId) -> Result<()> {
        self.withdraw(spot)?;
        let battler = self.release_monster(spot, replacement)?;
        self.init_monster(battler)
    }

    /// Takes the battler on a spot off the field.
    ///
    /// Every effect attached to the battler is discarded with it.
    pub fn withdraw(&mut self, spot: SpotId) -> Result<()> {
        let Some(battler) = self.spot(spot)?.battler() else {
            return Ok(());
        };
        events::withdraw(self, battler)?;
        let label = self.battler_label(battler)?;
        self.send_message(Message::Withdraw { battler: label });
        discard_effects(self, Subject::Battler(battler))?;
        self.battler_mut(battler)?.leave_field();
        self.spot_mut(spot)?.battler = None;
        Ok(())
    }

    /// Puts a monster on an empty spot as a new battler.
    ///
    /// Nothing is announced and no effect is applied until [`Self::init_monster`].
    fn release_monster(&mut self, spot: SpotId, monster: MonsterId) -> Result<BattlerHandle> {
        let owner = self.spot(spot)?;
        if owner.battler().is_some() {
            return Err(illegal_usage(format!("{spot} is occupied")));
        }
        if owner.trainer() != monster.trainer {
            return Err(illegal_usage(format!(
                "monster {monster} does not belong to the trainer of {spot}"
            )));
        }
        if !self.is_monster_available(monster) {
            return Err(illegal_usage(format!("monster {monster} cannot be sent out")));
        }
        let handle = BattlerHandle::new(self.battlers.len());
        let battler = Battler::new(handle, monster, self.monster(monster)?, spot);
        self.battlers.push(battler);
        self.spot_mut(spot)?.battler = Some(handle);
        Ok(handle)
    }

    fn init_monster(&mut self, battler: BattlerHandle) -> Result<()> {
        let label = self.battler_label(battler)?;
        let trainer = self
            .participant(self.battler(battler)?.monster().trainer)?
            .name()
            .to_owned();
        self.send_message(Message::SendOut {
            battler: label,
            trainer,
        });

        let subject = Subject::Battler(battler);
        let ability = self.battler(battler)?.ability().clone();
        if let Some(effect) = self.library.ability_effect(&ability) {
            let handle = apply_effect(self, subject, effect, subject)?;
            self.battler_mut(battler)?.ability_effect = handle;
        }
        let item = self.battler(battler)?.item().cloned();
        if let Some(effect) = item.and_then(|item| self.library.item_effect(&item)) {
            let handle = apply_effect(self, subject, effect, subject)?;
            self.battler_mut(battler)?.item_effect = handle;
        }

        events::send_out(self, battler)
    }

    /// Deals damage to a battler.
    ///
    /// Damage never takes HP below zero. Returns the damage actually dealt.
    pub fn damage_battler(
        &mut self,
        battler: BattlerHandle,
        damage: u32,
        direct: bool,
    ) -> Result<u16> {
        if self.battler_fainted(battler)? {
            return Ok(0);
        }
        let monster = self.battler(battler)?.monster();
        let monster = self.monster_mut(monster)?;
        let dealt = damage.min(monster.hp() as u32) as u16;
        let hp = monster.hp() - dealt;
        monster.set_hp(hp);

        let label = self.battler_label(battler)?;
        self.send_message(Message::HpChange {
            battler: label.clone(),
            delta: -(dealt as i32),
            hp,
            direct,
        });
        if hp == 0 && dealt > 0 {
            self.send_message(Message::Fainted { battler: label });
        }
        events::damage_done(self, battler, dealt)?;
        Ok(dealt)
    }

    /// Restores a battler's HP, up to its maximum. Fainted battlers cannot be healed.
    ///
    /// Returns the HP actually restored.
    pub fn heal_battler(&mut self, battler: BattlerHandle, amount: u32) -> Result<u16> {
        if self.battler_fainted(battler)? {
            return Ok(0);
        }
        let monster = self.battler(battler)?.monster();
        let monster = self.monster_mut(monster)?;
        let missing = monster.max_hp().saturating_sub(monster.hp());
        let healed = amount.min(missing as u32) as u16;
        if healed == 0 {
            return Ok(0);
        }
        let hp = monster.hp() + healed;
        monster.set_hp(hp);
        let label = self.battler_label(battler)?;
        self.send_message(Message::HpChange {
            battler: label,
            delta: healed as i32,
            hp,
            direct: true,
        });
        Ok(healed)
    }

    /// Rebuilds a battler for a new form.
    ///
    /// The rebuilt battler takes a new handle and the old one leaves the field. Stages, moves,
    /// ability and item carry over, and every attached effect is reparented without being
    /// removed.
    pub fn change_form(&mut self, battler: BattlerHandle, form: &Id) -> Result<BattlerHandle> {
        let data = self
            .loader
            .load_form(form)
            .wrap_error_with_format(format_args!("failed to load form {form}"))?;
        let context = self.battler(battler)?;
        let spot = context.spot().wrap_expectation_with_format(format_args!(
            "battler {} is not on the field",
            battler.index()
        ))?;
        let stats = self.monster(context.monster())?.stats_for_form(&data);
        let handle = BattlerHandle::new(self.battlers.len());
        let rebuilt = context.rebuild_for_form(handle, form.clone(), data, stats);
        self.battlers.push(rebuilt);
        self.battler_mut(battler)?.leave_field();
        self.spot_mut(spot)?.battler = Some(handle);

        let attached = self.effects.attached(Subject::Battler(battler)).to_vec();
        for effect in attached {
            reparent_effect(self, effect, Subject::Battler(handle))?;
        }
        log::debug!("battler {} became {form} as {}", battler.index(), handle.index());
        Ok(handle)
    }

    /// Changes a battler's ability, swapping the effect backing it.
    pub fn set_ability(&mut self, battler: BattlerHandle, ability: Id) -> Result<()> {
        self.loader
            .load_ability(&ability)
            .wrap_error_with_format(format_args!("failed to load ability {ability}"))?;
        if let Some(old) = self.battler_mut(battler)?.ability_effect.take() {
            remove_effect(self, old)?;
        }
        let effect = self.library.ability_effect(&ability);
        self.battler_mut(battler)?.ability = ability;
        let subject = Subject::Battler(battler);
        let handle = match effect {
            Some(effect) => apply_effect(self, subject, effect, subject)?,
            None => None,
        };
        self.battler_mut(battler)?.ability_effect = handle;
        Ok(())
    }

    /// Changes a battler's held item for the rest of the battle, swapping the effect backing
    /// it.
    pub fn set_item(&mut self, battler: BattlerHandle, item: Option<Id>) -> Result<()> {
        if let Some(item) = &item {
            self.loader
                .load_item(item)
                .wrap_error_with_format(format_args!("failed to load item {item}"))?;
        }
        if let Some(old) = self.battler_mut(battler)?.item_effect.take() {
            remove_effect(self, old)?;
        }
        let effect = item
            .as_ref()
            .and_then(|item| self.library.item_effect(item));
        self.battler_mut(battler)?.item = item;
        let subject = Subject::Battler(battler);
        let handle = match effect {
            Some(effect) => apply_effect(self, subject, effect, subject)?,
            None => None,
        };
        self.battler_mut(battler)?.item_effect = handle;
        Ok(())
    }

    /// Forces a battler to use a move every turn, or lifts the restriction.
    pub fn set_forced_move(
        &mut self,
        battler: BattlerHandle,
        forced: Option<ForcedMove>,
    ) -> Result<()> {
        self.battler_mut(battler)?.forced_move = forced;
        Ok(())
    }

    fn use_item(&mut self, spot: SpotId, item: &Id) -> Result<()> {
        let trainer = self.spot(spot)?.trainer();
        let participant = self.participant_mut(trainer)?;
        let index = participant
            .items
            .iter()
            .position(|owned| owned == item)
            .wrap_expectation_with_format(format_args!("trainer {trainer} has no {item}"))?;
        participant.items.remove(index);
        let name = self.loader.load_item(item)?.name.clone();
        let trainer_name = self.participant(trainer)?.name().to_owned();
        self.send_message(Message::UseItem {
            trainer: trainer_name,
            item: name,
        });
        events::use_item(self, trainer, item)
    }

    fn forfeit(&mut self, spot: SpotId) -> Result<()> {
        let trainer = self.spot(spot)?.trainer();
        let participant = self.participant_mut(trainer)?;
        participant.forfeited = true;
        let message = Message::Forfeit {
            side: participant.side(),
            trainer: participant.name().to_owned(),
        };
        self.send_message(message);
        Ok(())
    }
}

#[cfg(test)]
mod field_test {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use clash_data::Fraction;
    use pretty_assertions::assert_eq;

    use crate::{
        battle::{
            Command,
            Field,
            FieldOptions,
            FieldState,
            MonsterId,
            SpotId,
        },
        effect::{
            MapEffectLibrary,
            Subject,
        },
        error::IllegalUsageError,
        test_util::{
            deferred_participant,
            empty_field,
            test_loader,
        },
    };

    #[test]
    fn needs_two_sides() {
        let result = Field::new(
            test_loader(),
            Arc::new(MapEffectLibrary::new()),
            &[vec![0]],
            vec![deferred_participant("Red", &["bulbasaur"])],
            FieldOptions::default(),
        );
        assert_matches!(result, Err(error) => {
            assert!(error.downcast_ref::<IllegalUsageError>().is_some());
        });
    }

    #[test]
    fn trainer_cannot_be_on_two_sides() {
        let result = Field::new(
            test_loader(),
            Arc::new(MapEffectLibrary::new()),
            &[vec![0], vec![0, 1]],
            vec![
                deferred_participant("Red", &["bulbasaur"]),
                deferred_participant("Blue", &["charmander"]),
            ],
            FieldOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn run_sends_out_and_waits_for_commands() {
        let field = empty_field();
        assert_eq!(field.state(), FieldState::Waiting);
        assert_eq!(field.turn(), 0);
        assert_eq!(field.active_battlers().len(), 2);
        assert_eq!(
            field
                .requests()
                .map(|request| request.spot())
                .collect::<Vec<_>>(),
            vec![SpotId::new(0, 0), SpotId::new(1, 0)]
        );
        let logs = field.log().logs().collect::<Vec<_>>();
        assert_eq!(logs[0], "battlestart");
        assert!(logs.contains(&"switch|mon:Bulbasaur,0,0|trainer:Red".to_owned()));
        assert!(logs.contains(&"switch|mon:Charmander,1,0|trainer:Blue".to_owned()));
    }

    #[test]
    fn cannot_run_twice() {
        let mut field = empty_field();
        assert_matches!(field.run(), Err(error) => {
            assert!(error.downcast_ref::<IllegalUsageError>().is_some());
        });
    }

    #[test]
    fn coin_with_zero_denominator_is_illegal() {
        let mut field = empty_field();
        assert_matches!(field.flip_coin(Fraction::new(1, 0)), Err(error) => {
            assert!(error.downcast_ref::<IllegalUsageError>().is_some());
        });
        assert_matches!(field.flip_coin(Fraction::new(0, 0)), Err(_));
        assert_matches!(field.flip_coin(Fraction::new(2, 1)), Ok(true));
        assert_matches!(field.flip_coin(Fraction::new(0, 1)), Ok(false));
    }

    #[test]
    fn nests_subjects() {
        let field = empty_field();
        let battlers = field.active_battlers();
        assert_eq!(
            field.sub_subjects(Subject::Field),
            vec![Subject::Side(0), Subject::Side(1)]
        );
        assert_eq!(
            field.sub_subjects(Subject::Side(1)),
            vec![Subject::Battler(battlers[1])]
        );
        assert_eq!(
            field.sub_subjects(Subject::Battler(battlers[0])),
            Vec::<Subject>::new()
        );
        assert_eq!(field.subject_label(Subject::Field).unwrap(), "field");
        assert_eq!(field.subject_label(Subject::Side(1)).unwrap(), "side:1");
        assert_eq!(
            field.subject_label(Subject::Battler(battlers[0])).unwrap(),
            "Bulbasaur,0,0"
        );
        assert!(field.check_subject(Subject::Side(2)).is_err());
    }

    #[test]
    fn rejects_command_for_unrequested_spot() {
        let mut field = empty_field();
        assert_matches!(
            field.select_command(Command::Run {
                spot: SpotId::new(0, 1)
            }),
            Err(error) => {
                assert!(error.downcast_ref::<IllegalUsageError>().is_some());
            }
        );
    }

    #[test]
    fn switch_needs_available_team_member() {
        let mut field = empty_field();
        // The only monster is already out.
        assert!(
            !field
                .command_allowed(&Command::Switch {
                    spot: SpotId::new(0, 0),
                    replacement: MonsterId::new(0, 0),
                })
                .unwrap()
        );
        // Monsters of other trainers never qualify.
        assert!(
            !field
                .command_allowed(&Command::Switch {
                    spot: SpotId::new(0, 0),
                    replacement: MonsterId::new(1, 0),
                })
                .unwrap()
        );
    }

    #[test]
    fn heals_up_to_max_hp() {
        let mut field = empty_field();
        let battler = field.active_battlers()[0];
        assert_eq!(field.damage_battler(battler, 30, true).unwrap(), 30);
        assert_eq!(field.heal_battler(battler, 100).unwrap(), 30);
        assert_eq!(field.heal_battler(battler, 100).unwrap(), 0);
        assert_eq!(
            field.log().logs().last().unwrap(),
            "heal|mon:Bulbasaur,0,0|delta:30|hp:120"
        );
    }

    #[test]
    fn damage_never_goes_below_zero() {
        let mut field = empty_field();
        let battler = field.active_battlers()[0];
        assert_eq!(field.damage_battler(battler, 500, true).unwrap(), 120);
        assert!(field.battler_fainted(battler).unwrap());
        assert_eq!(field.damage_battler(battler, 10, true).unwrap(), 0);
        assert_eq!(
            field.log().logs().last().unwrap(),
            "faint|mon:Bulbasaur,0,0"
        );
        assert_eq!(field.active_battlers().len(), 1);
    }
}
