use anyhow::Result;
use clash_data::MoveTarget;
use clash_prng::rand_util;

use crate::battle::{
    BattlerHandle,
    Field,
    SpotId,
};

/// Spots a move with a choosable target may be aimed at.
///
/// Targets that do not need choosing have no possible targets.
pub fn possible_targets(
    field: &Field,
    user: BattlerHandle,
    target: MoveTarget,
) -> Result<Vec<SpotId>> {
    let battlers = match target {
        MoveTarget::SelectedBattler => {
            let mut battlers = field.allies(user)?;
            battlers.extend(field.opponents(user)?);
            battlers
        }
        MoveTarget::Ally => field.allies(user)?,
        MoveTarget::UserOrAlly => {
            let mut battlers = Vec::from([user]);
            battlers.extend(field.allies(user)?);
            battlers
        }
        _ => Vec::new(),
    };
    let mut spots = Vec::with_capacity(battlers.len());
    for battler in battlers {
        if let Some(spot) = field.battler(battler)?.spot() {
            spots.push(spot);
        }
    }
    Ok(spots)
}

/// Resolves the battlers a move affects.
///
/// A chosen target that no longer holds a usable battler resolves to nothing. Area targets
/// affect sides or the field rather than battlers, so they resolve to nothing as well.
pub fn resolve_targets(
    field: &mut Field,
    user: BattlerHandle,
    target: MoveTarget,
    chosen: Option<SpotId>,
) -> Result<Vec<BattlerHandle>> {
    let targets = match target {
        MoveTarget::SelectedBattler | MoveTarget::Ally | MoveTarget::UserOrAlly => {
            let Some(spot) = chosen else {
                return Ok(Vec::new());
            };
            if !possible_targets(field, user, target)?.contains(&spot) {
                return Ok(Vec::new());
            }
            field.spot(spot)?.battler().into_iter().collect()
        }
        MoveTarget::User => Vec::from([user]),
        MoveTarget::RandomOpponent => {
            let opponents = field.opponents(user)?;
            rand_util::sample_slice(field.prng(), &opponents)
                .copied()
                .into_iter()
                .collect()
        }
        MoveTarget::AllOpponents => field.opponents(user)?,
        MoveTarget::AllOthers => {
            let mut battlers = field.allies(user)?;
            battlers.extend(field.opponents(user)?);
            battlers
        }
        MoveTarget::AllBattlers => {
            let mut battlers = Vec::from([user]);
            battlers.extend(field.allies(user)?);
            battlers.extend(field.opponents(user)?);
            battlers
        }
        MoveTarget::UsersSide | MoveTarget::OpponentsSide | MoveTarget::EntireField => Vec::new(),
    };
    Ok(targets)
}
