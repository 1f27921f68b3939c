use crate::battle::BattlerHandle;

/// Anything effects can attach to.
///
/// Subjects nest: the field contains its sides, and each side contains the battlers standing on
/// its spots. A dispatch over a subject also reaches the effects of everything nested inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    Field,
    Side(usize),
    Battler(BattlerHandle),
}

impl Subject {
    /// The battler behind the subject, if it is one.
    pub fn battler(&self) -> Option<BattlerHandle> {
        match self {
            Self::Battler(battler) => Some(*battler),
            _ => None,
        }
    }

    /// The side index behind the subject, if it is one.
    pub fn side(&self) -> Option<usize> {
        match self {
            Self::Side(side) => Some(*side),
            _ => None,
        }
    }
}

impl From<BattlerHandle> for Subject {
    fn from(value: BattlerHandle) -> Self {
        Self::Battler(value)
    }
}
