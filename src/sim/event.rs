/// Events emitted after every state change.
/// The input loop drains them and re-renders when any arrived.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved { x: usize, y: usize },
    CoinPicked { x: usize, y: usize },
    AllCoinsCollected,
    EnemyMoved { x: usize, y: usize },
    PlayerCaught,
    CoinDrifted { moved: usize },
    EnemyFrozen,
    FreezeExpired,
}
